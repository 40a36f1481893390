use log::*;
use std::collections::{hash_map::Entry, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::chunker;
use crate::{ChunkDigest, ChunkedWriter, Compression, HashSum};

/// Number of independently locked parts of the chunk ledger.
const LEDGER_SHARDS: usize = 64;

/// A chunking and compression configuration under test.
///
/// Keeps a ledger of every unique chunk seen, by hash, together with the
/// chunk's compressed size. The ledger is shared between all worker threads
/// feeding the processor.
pub struct Processor {
    chunker_config: chunker::Config,
    compression: Option<Compression>,
    shards: Vec<Mutex<HashMap<HashSum, u64>>>,
    duplicate_chunks: AtomicU64,
    total_chunks: AtomicU64,
    source_size: AtomicU64,
}

/// Snapshot of a processor's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessorStats {
    /// Sum of the compressed size of every unique chunk.
    pub unique_size: u64,
    pub unique_chunks: u64,
    /// Number of chunks which were already in the ledger when inserted.
    pub duplicate_chunks: u64,
    pub total_chunks: u64,
    /// Raw size of all chunks, duplicates included.
    pub source_size: u64,
}

impl Processor {
    pub fn new(chunker_config: chunker::Config, compression: Option<Compression>) -> Self {
        Self {
            chunker_config,
            compression,
            shards: (0..LEDGER_SHARDS)
                .map(|_| Mutex::new(HashMap::new()))
                .collect(),
            duplicate_chunks: AtomicU64::new(0),
            total_chunks: AtomicU64::new(0),
            source_size: AtomicU64::new(0),
        }
    }
    pub fn chunker_config(&self) -> &chunker::Config {
        &self.chunker_config
    }
    pub fn compression(&self) -> Option<Compression> {
        self.compression
    }
    /// Human readable name of the configuration.
    pub fn label(&self) -> String {
        self.to_string()
    }
    /// Create a writer to feed the content of a single source through.
    pub fn new_writer(&self) -> ChunkedWriter<'_> {
        ChunkedWriter::new(self)
    }
    /// Register a chunk in the ledger.
    ///
    /// Returns true if the chunk was not seen before. For an already known chunk
    /// the duplicate counter is increased and the stored size is kept.
    pub fn insert(&self, digest: &ChunkDigest) -> bool {
        self.total_chunks.fetch_add(1, Ordering::Relaxed);
        self.source_size
            .fetch_add(digest.source_size, Ordering::Relaxed);
        let shard = &self.shards[digest.hash.slice()[0] as usize % LEDGER_SHARDS];
        let mut ledger = shard.lock().unwrap_or_else(PoisonError::into_inner);
        match ledger.entry(digest.hash) {
            Entry::Vacant(v) => {
                v.insert(digest.compressed_size);
                true
            }
            Entry::Occupied(o) => {
                if cfg!(debug_assertions) && *o.get() != digest.compressed_size {
                    warn!(
                        "Chunk {} compressed to {} bytes, previously to {} bytes ({})",
                        digest.hash,
                        digest.compressed_size,
                        o.get(),
                        self
                    );
                }
                self.duplicate_chunks.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }
    /// Sum of the compressed size of every unique chunk.
    pub fn unique_size(&self) -> u64 {
        self.shards
            .iter()
            .map(|shard| {
                shard
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .values()
                    .sum::<u64>()
            })
            .sum()
    }
    pub fn unique_chunks(&self) -> u64 {
        self.shards
            .iter()
            .map(|shard| shard.lock().unwrap_or_else(PoisonError::into_inner).len() as u64)
            .sum()
    }
    pub fn duplicate_chunks(&self) -> u64 {
        self.duplicate_chunks.load(Ordering::Relaxed)
    }
    pub fn total_chunks(&self) -> u64 {
        self.total_chunks.load(Ordering::Relaxed)
    }
    pub fn source_size(&self) -> u64 {
        self.source_size.load(Ordering::Relaxed)
    }
    pub fn stats(&self) -> ProcessorStats {
        ProcessorStats {
            unique_size: self.unique_size(),
            unique_chunks: self.unique_chunks(),
            duplicate_chunks: self.duplicate_chunks(),
            total_chunks: self.total_chunks(),
            source_size: self.source_size(),
        }
    }
}

impl fmt::Display for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.compression {
            Some(compression) => write!(f, "{}, {}", self.chunker_config, compression),
            None => write!(f, "{}, uncompressed", self.chunker_config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn digest(data: &[u8], compressed_size: u64) -> ChunkDigest {
        ChunkDigest {
            hash: HashSum::b2_digest(data),
            compressed_size,
            source_size: data.len() as u64,
        }
    }

    #[test]
    fn first_insert_wins() {
        let processor = Processor::new(chunker::Config::None, None);
        assert!(processor.insert(&digest(b"a", 10)));
        assert!(!processor.insert(&digest(b"a", 10)));
        assert!(processor.insert(&digest(b"b", 5)));
        assert_eq!(
            processor.stats(),
            ProcessorStats {
                unique_size: 15,
                unique_chunks: 2,
                duplicate_chunks: 1,
                total_chunks: 3,
                source_size: 3,
            }
        );
    }

    #[test]
    fn repeated_insert_keeps_first_size() {
        let processor = Processor::new(chunker::Config::None, None);
        processor.insert(&digest(b"a", 10));
        processor.insert(&digest(b"a", 99));
        assert_eq!(processor.unique_size(), 10);
        assert_eq!(processor.duplicate_chunks(), 1);
    }

    #[test]
    fn concurrent_inserts() {
        let processor = Arc::new(Processor::new(chunker::Config::None, None));
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let processor = Arc::clone(&processor);
                thread::spawn(move || {
                    for i in 0..1000u32 {
                        processor.insert(&digest(&i.to_le_bytes(), 2));
                    }
                })
            })
            .collect();
        threads.into_iter().for_each(|t| t.join().unwrap());
        assert_eq!(processor.unique_chunks(), 1000);
        assert_eq!(processor.duplicate_chunks(), 7000);
        assert_eq!(processor.total_chunks(), 8000);
        assert_eq!(processor.unique_size(), 2000);
    }

    #[test]
    fn label() {
        let processor = Processor::new(
            chunker::Config::FixedSize(1 << 20),
            Some(Compression::brotli(1).unwrap()),
        );
        assert_eq!(processor.label(), "Fixed 1MiB, Brotli (level 1)");
        assert_eq!(
            Processor::new(chunker::Config::None, None).label(),
            "No chunking, uncompressed"
        );
    }
}
