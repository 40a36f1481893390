//! Measure how well a set of files deduplicates and compresses when split
//! into chunks.
//!
//! Every [`Processor`] is one chunking and compression configuration. Files are
//! fed through a [`ChunkedWriter`] of each processor which splits them into
//! chunks, hashes and compresses every chunk and records the unique chunks in
//! the processor's ledger.
mod chunk_sink;
mod chunked_writer;
mod compression;
mod error;
mod hashsum;
mod processor;
mod runner;

pub mod chunker;

pub use chunk_sink::{ChunkDigest, ChunkSink};
pub use chunked_writer::ChunkedWriter;
pub use compression::{
    Compression, CompressionAlgorithm, CompressionError, CompressionLevelOutOfRangeError,
};
pub use error::Error;
pub use hashsum::{HashSum, HASH_LENGTH};
pub use processor::{Processor, ProcessorStats};
pub use runner::{run_processors, FileEntry, RunOptions, RunSummary};
