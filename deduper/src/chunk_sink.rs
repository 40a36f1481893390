use blake2::Digest;
use std::io;

use crate::compression::Encoder;
use crate::hashsum::Blake2b256;
use crate::{Compression, CompressionError, HashSum};

/// Output which only counts the bytes written to it.
#[derive(Debug, Default)]
pub(crate) struct ByteCounter {
    written: u64,
}

impl io::Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written += buf.len() as u64;
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Hash and compressed size of a finished chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkDigest {
    /// Hash sum of the raw (uncompressed) chunk data.
    pub hash: HashSum,
    /// Size of the chunk when compressed.
    pub compressed_size: u64,
    /// Size of the raw chunk data.
    pub source_size: u64,
}

/// Sink for the data of a single chunk.
///
/// Calculates the hash sum of the raw data while feeding it through a
/// compressor which output is only counted, never stored.
pub struct ChunkSink {
    hasher: Blake2b256,
    encoder: Encoder<ByteCounter>,
    source_size: u64,
}

impl ChunkSink {
    pub fn new(compression: Option<Compression>) -> Result<Self, CompressionError> {
        Ok(Self {
            hasher: Blake2b256::new(),
            encoder: Encoder::new(compression, ByteCounter::default())?,
            source_size: 0,
        })
    }
    /// Append data to the chunk.
    pub fn write(&mut self, buf: &[u8]) -> Result<(), CompressionError> {
        self.hasher.update(buf);
        self.encoder.write_all(buf)?;
        self.source_size += buf.len() as u64;
        Ok(())
    }
    /// Number of raw bytes written to the chunk.
    pub fn source_size(&self) -> u64 {
        self.source_size
    }
    /// Close the compressor and get the chunk's hash and compressed size.
    pub fn finish(self) -> Result<ChunkDigest, CompressionError> {
        let counter = self.encoder.finish()?;
        Ok(ChunkDigest {
            hash: HashSum::from_hasher(self.hasher),
            compressed_size: counter.written,
            source_size: self.source_size,
        })
    }
}
