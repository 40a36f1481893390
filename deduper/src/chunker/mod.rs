//! Chunker related functions and types.
mod config;
mod fixed_size;
mod gear;

pub use config::{Config, FilterBits, GearConfig, DEFAULT_FIXED_SIZE};
pub use fixed_size::FixedSizeChunker;
pub use gear::{gear_table, GearChunker, GearHasher, GEAR_TABLE};

pub trait Chunker {
    /// Scan for the next chunk boundary in the given buffer.
    ///
    /// Returns the number of bytes from the start of `buf` that completes the
    /// current chunk. If None is returned the whole buffer belongs to the current
    /// chunk and the caller is expected to call again with the following data.
    /// A chunker is only used for a single chunk, after a boundary has been
    /// returned the caller replaces it with a new one.
    fn next_boundary(&mut self, buf: &[u8]) -> Option<usize>;
}

/// Chunker which never splits.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoChunker;

impl Chunker for NoChunker {
    fn next_boundary(&mut self, _buf: &[u8]) -> Option<usize> {
        None
    }
}

/// Any of the available chunkers, as created from a [`Config`].
#[derive(Clone, Debug)]
pub enum AnyChunker {
    None(NoChunker),
    FixedSize(FixedSizeChunker),
    Gear(GearChunker),
}

impl Chunker for AnyChunker {
    #[inline]
    fn next_boundary(&mut self, buf: &[u8]) -> Option<usize> {
        match self {
            Self::None(c) => c.next_boundary(buf),
            Self::FixedSize(c) => c.next_boundary(buf),
            Self::Gear(c) => c.next_boundary(buf),
        }
    }
}
