use log::*;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use crate::{ChunkedWriter, Error, Processor};

const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

/// A source file to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    /// Size of the file when listed.
    pub size: u64,
}

/// Options for the `run_processors` function.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Number of worker threads.
    pub workers: usize,
    /// Process at most this number of files.
    pub max_files: Option<usize>,
    /// Size of the buffer used when reading files.
    pub read_buffer_size: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            max_files: None,
            read_buffer_size: 1024 * 1024,
        }
    }
}

/// Output from the `run_processors` function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of files successfully processed.
    pub files: usize,
    /// Number of bytes read from the successfully processed files.
    pub source_size: u64,
    /// Number of files which could not be read.
    pub skipped: usize,
}

struct Run<'a> {
    files: &'a [FileEntry],
    processors: &'a [Processor],
    read_buffer_size: usize,
    next_file: AtomicUsize,
    processed_files: AtomicUsize,
    processed_size: AtomicU64,
    skipped: AtomicUsize,
    failed: AtomicBool,
    last_progress: Mutex<Option<Instant>>,
}

impl Run<'_> {
    // Claim and process files until none are left or some worker failed.
    fn work(&self) -> Result<(), Error> {
        let mut buf = vec![0u8; self.read_buffer_size];
        while !self.failed.load(Ordering::Relaxed) {
            let index = self.next_file.fetch_add(1, Ordering::Relaxed);
            let Some(entry) = self.files.get(index) else {
                return Ok(());
            };
            self.report_progress(entry);
            match self.process_file(entry, &mut buf) {
                Ok(Some(size)) => {
                    self.processed_files.fetch_add(1, Ordering::Relaxed);
                    self.processed_size.fetch_add(size, Ordering::Relaxed);
                }
                Ok(None) => {
                    self.skipped.fetch_add(1, Ordering::Relaxed);
                }
                Err(err) => {
                    self.failed.store(true, Ordering::Relaxed);
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    fn report_progress(&self, entry: &FileEntry) {
        if let Ok(mut last_progress) = self.last_progress.try_lock() {
            let now = Instant::now();
            if last_progress.map_or(true, |last| now.duration_since(last) >= PROGRESS_INTERVAL) {
                info!(
                    "[{}/{}] Processing {}",
                    self.processed_files.load(Ordering::Relaxed) + 1,
                    self.files.len(),
                    entry.path.display()
                );
                *last_progress = Some(now);
            }
        }
    }

    // Feed a file through all processors. Returns the number of bytes read, or
    // None if the file could not be read.
    fn process_file(&self, entry: &FileEntry, buf: &mut [u8]) -> Result<Option<u64>, Error> {
        let mut file = match File::open(&entry.path) {
            Ok(file) => file,
            Err(err) => {
                warn!(
                    "Unable to open file, ignoring: {} ({})",
                    entry.path.display(),
                    err
                );
                return Ok(None);
            }
        };
        let mut writers: Vec<ChunkedWriter> =
            self.processors.iter().map(Processor::new_writer).collect();
        let mut source_size = 0u64;
        loop {
            let rc = match file.read(buf) {
                Ok(0) => break,
                Ok(rc) => rc,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    warn!(
                        "Unable to process file, ignoring: {} ({})",
                        entry.path.display(),
                        err
                    );
                    return Ok(None);
                }
            };
            source_size += rc as u64;
            for (writer, processor) in writers.iter_mut().zip(self.processors) {
                writer
                    .write(&buf[..rc])
                    .map_err(|err| err.processing(entry.path.clone(), processor.label()))?;
            }
        }
        for (writer, processor) in writers.into_iter().zip(self.processors) {
            let chunks = writer
                .close()
                .map_err(|err| err.processing(entry.path.clone(), processor.label()))?;
            trace!("{}: {} chunks ({})", entry.path.display(), chunks, processor);
        }
        Ok(Some(source_size))
    }
}

/// Feed every file through every processor.
///
/// Files are processed in parallel by `options.workers` threads, each thread
/// picking the next unprocessed file from the list. A file is read once and its
/// data given to all processors. Files which can't be opened or read are skipped.
pub fn run_processors(
    files: &[FileEntry],
    processors: &[Processor],
    options: &RunOptions,
) -> Result<RunSummary, Error> {
    let to_process = options
        .max_files
        .map_or(files.len(), |max_files| max_files.min(files.len()));
    let workers = options.workers.max(1);
    info!("Using {} workers", workers);

    let run = Run {
        files: &files[..to_process],
        processors,
        read_buffer_size: options.read_buffer_size.max(1),
        next_file: AtomicUsize::new(0),
        processed_files: AtomicUsize::new(0),
        processed_size: AtomicU64::new(0),
        skipped: AtomicUsize::new(0),
        failed: AtomicBool::new(false),
        last_progress: Mutex::new(None),
    };
    let results: Vec<Result<(), Error>> = thread::scope(|s| {
        let handles: Vec<_> = (0..workers).map(|_| s.spawn(|| run.work())).collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or(Err(Error::WorkerPanic)))
            .collect()
    });
    for result in results {
        result?;
    }

    Ok(RunSummary {
        files: run.processed_files.load(Ordering::Relaxed),
        source_size: run.processed_size.load(Ordering::Relaxed),
        skipped: run.skipped.load(Ordering::Relaxed),
    })
}
