use crate::chunker::{AnyChunker, Chunker};
use crate::{ChunkDigest, ChunkSink, Error, Processor};

/// Splits a source, written in buffers of any size, into chunks.
///
/// Each chunk is hashed and compressed when complete. Completed chunks are held
/// in a per-source list by the writer, and registered in the processor's ledger, in source order, once the writer is
/// closed. A writer dropped without being closed leaves the ledger untouched.
pub struct ChunkedWriter<'a> {
    processor: &'a Processor,
    chunker: AnyChunker,
    sink: Option<ChunkSink>,
    chunks: Vec<ChunkDigest>,
}

impl<'a> ChunkedWriter<'a> {
    pub(crate) fn new(processor: &'a Processor) -> Self {
        Self {
            processor,
            chunker: processor.chunker_config().new_chunker(),
            sink: None,
            chunks: Vec::new(),
        }
    }
    /// Feed the next part of the source.
    ///
    /// A single buffer may complete several chunks.
    pub fn write(&mut self, mut buf: &[u8]) -> Result<(), Error> {
        while !buf.is_empty() {
            let boundary = self.chunker.next_boundary(buf);
            if boundary == Some(0) {
                return Err(Error::ZeroLengthSplit);
            }
            let mut sink = match self.sink.take() {
                Some(sink) => sink,
                None => ChunkSink::new(self.processor.compression())?,
            };
            match boundary {
                None => {
                    sink.write(buf)?;
                    self.sink = Some(sink);
                    return Ok(());
                }
                Some(offset) => {
                    sink.write(&buf[..offset])?;
                    self.chunks.push(sink.finish()?);
                    self.chunker = self.processor.chunker_config().new_chunker();
                    buf = &buf[offset..];
                }
            }
        }
        Ok(())
    }
    /// Chunks completed so far.
    pub fn chunks(&self) -> &[ChunkDigest] {
        &self.chunks
    }
    /// End of source. Completes the last chunk and registers all chunks of the
    /// source in the ledger.
    ///
    /// Returns the number of chunks in the source.
    pub fn close(mut self) -> Result<usize, Error> {
        if let Some(sink) = self.sink.take() {
            self.chunks.push(sink.finish()?);
        }
        for digest in &self.chunks {
            self.processor.insert(digest);
        }
        Ok(self.chunks.len())
    }
}
