use std::path::Path;

use deduper::chunker::{Config, FilterBits, GearConfig};
use deduper::{run_processors, Compression, Error, FileEntry, Processor, RunOptions};
use rand::{rngs::StdRng, Rng, SeedableRng};
use tempfile::TempDir;

const MIB: usize = 1 << 20;

fn random_data(len: usize, seed: u64) -> Vec<u8> {
    let mut data = vec![0u8; len];
    StdRng::seed_from_u64(seed).fill(&mut data[..]);
    data
}

fn write_file(dir: &Path, name: &str, data: &[u8]) -> FileEntry {
    let path = dir.join(name);
    std::fs::write(&path, data).unwrap();
    FileEntry {
        path,
        size: data.len() as u64,
    }
}

fn options(workers: usize) -> RunOptions {
    RunOptions {
        workers,
        max_files: None,
        read_buffer_size: 100_000,
    }
}

fn small_gear() -> Config {
    Config::Gear(GearConfig {
        filter_bits: FilterBits(14),
        min_chunk_size: 4096,
        max_chunk_size: 256 * 1024,
    })
}

#[test]
fn zero_file_per_chunker() {
    let dir = TempDir::new().unwrap();
    let files = [write_file(dir.path(), "zero.img", &vec![0u8; 3 * MIB])];
    let processors = [
        Processor::new(Config::None, None),
        Processor::new(Config::FixedSize(MIB), None),
    ];
    let summary = run_processors(&files, &processors, &options(2)).unwrap();
    assert_eq!(summary.files, 1);
    assert_eq!(summary.source_size, 3 * MIB as u64);

    let none = processors[0].stats();
    assert_eq!(none.total_chunks, 1);
    assert_eq!(none.unique_size, 3 * MIB as u64);

    let fixed = processors[1].stats();
    assert_eq!(fixed.total_chunks, 3);
    assert_eq!(fixed.unique_chunks, 1);
    assert_eq!(fixed.duplicate_chunks, 2);
    assert_eq!(fixed.unique_size, MIB as u64);
}

#[test]
fn identical_files_deduplicate() {
    let dir = TempDir::new().unwrap();
    let data = random_data(2 * MIB, 1);
    let files = [
        write_file(dir.path(), "a.img", &data),
        write_file(dir.path(), "b.img", &data),
    ];
    let processors = [
        Processor::new(Config::None, None),
        Processor::new(Config::FixedSize(MIB), None),
        Processor::new(small_gear(), None),
    ];
    let summary = run_processors(&files, &processors, &options(2)).unwrap();
    assert_eq!(summary.files, 2);
    assert_eq!(summary.source_size, 4 * MIB as u64);
    for processor in &processors {
        let stats = processor.stats();
        assert_eq!(stats.unique_size, 2 * MIB as u64, "{}", processor);
        assert_eq!(stats.total_chunks, 2 * stats.unique_chunks, "{}", processor);
        assert_eq!(stats.duplicate_chunks, stats.unique_chunks, "{}", processor);
        assert_eq!(stats.source_size, 4 * MIB as u64, "{}", processor);
    }
}

#[test]
fn shared_aligned_content_is_duplicate() {
    let dir = TempDir::new().unwrap();
    let shared = random_data(MIB, 2);
    let mut a = shared.clone();
    a.extend(random_data(MIB / 2, 3));
    let mut b = shared;
    b.extend(random_data(MIB / 3, 4));
    let files = [
        write_file(dir.path(), "a.img", &a),
        write_file(dir.path(), "b.img", &b),
    ];
    let processors = [Processor::new(Config::FixedSize(MIB), None)];
    run_processors(&files, &processors, &options(1)).unwrap();
    let stats = processors[0].stats();
    assert_eq!(stats.total_chunks, 4);
    assert_eq!(stats.unique_chunks, 3);
    assert_eq!(stats.duplicate_chunks, 1);
}

#[test]
fn empty_file_has_no_chunks() {
    let dir = TempDir::new().unwrap();
    let files = [write_file(dir.path(), "empty", &[])];
    let processors = [
        Processor::new(Config::None, None),
        Processor::new(small_gear(), Some(Compression::brotli(1).unwrap())),
    ];
    let summary = run_processors(&files, &processors, &options(1)).unwrap();
    assert_eq!(summary.files, 1);
    assert_eq!(summary.source_size, 0);
    for processor in &processors {
        assert_eq!(processor.stats(), Default::default());
    }
}

#[test]
fn unreadable_files_are_skipped() {
    let dir = TempDir::new().unwrap();
    let mut files = vec![write_file(dir.path(), "a.img", &random_data(10_000, 5))];
    files.push(FileEntry {
        path: dir.path().join("missing.img"),
        size: 1234,
    });
    let processors = [Processor::new(Config::None, None)];
    let summary = run_processors(&files, &processors, &options(4)).unwrap();
    assert_eq!(summary.files, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.source_size, 10_000);
    assert_eq!(processors[0].total_chunks(), 1);
}

#[test]
fn max_files_limits_run() {
    let dir = TempDir::new().unwrap();
    let files: Vec<FileEntry> = (0..5)
        .map(|i| write_file(dir.path(), &format!("{}.img", i), &random_data(1000, i)))
        .collect();
    let processors = [Processor::new(Config::None, None)];
    let summary = run_processors(
        &files,
        &processors,
        &RunOptions {
            max_files: Some(3),
            ..options(2)
        },
    )
    .unwrap();
    assert_eq!(summary.files, 3);
    assert_eq!(processors[0].unique_chunks(), 3);
}

#[test]
fn result_independent_of_worker_count() {
    let dir = TempDir::new().unwrap();
    let base = random_data(MIB, 6);
    let files: Vec<FileEntry> = (0..8)
        .map(|i| {
            let mut data = base.clone();
            data.extend(random_data(100_000, 100 + i));
            write_file(dir.path(), &format!("{}.img", i), &data)
        })
        .collect();
    let run = |workers| {
        let processors = [
            Processor::new(small_gear(), Some(Compression::brotli(1).unwrap())),
            Processor::new(Config::FixedSize(64 * 1024), None),
        ];
        run_processors(&files, &processors, &options(workers)).unwrap();
        processors.map(|p| p.stats())
    };
    let single = run(1);
    assert_eq!(run(4), single);
    assert_eq!(run(8), single);
}

#[test]
fn stats_stable_after_run() {
    let dir = TempDir::new().unwrap();
    let files = [write_file(dir.path(), "a.img", &random_data(MIB, 7))];
    let processors = [Processor::new(small_gear(), None)];
    run_processors(&files, &processors, &options(2)).unwrap();
    let stats = processors[0].stats();
    assert_eq!(processors[0].stats(), stats);
    assert_eq!(processors[0].unique_size(), stats.unique_size);
}

#[test]
fn fatal_error_names_file_and_processor() {
    let dir = TempDir::new().unwrap();
    let files = [write_file(dir.path(), "data", &random_data(1000, 11))];
    let processors = [
        Processor::new(Config::FixedSize(MIB), None),
        Processor::new(Config::FixedSize(0), None),
    ];
    let err = run_processors(&files, &processors, &options(1)).unwrap_err();
    match &err {
        Error::Processing {
            path,
            processor,
            source,
        } => {
            assert_eq!(path, &files[0].path);
            assert_eq!(processor, &processors[1].label());
            assert!(matches!(**source, Error::ZeroLengthSplit));
        }
        err => panic!("unexpected error {:?}", err),
    }
    let source = std::error::Error::source(&err).unwrap();
    assert_eq!(source.to_string(), "chunker requested a zero length chunk");
    assert_eq!(processors[1].total_chunks(), 0);
}
