use std::sync::LazyLock;

use super::{Chunker, GearConfig};
use crate::hashsum::Blake2b256;
use blake2::Digest;

/// Seed used to derive the gear table. Changing it changes every chunk boundary.
const GEAR_SEED: u64 = 42;

/// Initial value of the rolling hash sum.
const INITIAL_HASH: u32 = 0x2cf1_c4dc;

/// Gear table, maps every byte value to a pseudo random 32 bit value.
pub static GEAR_TABLE: LazyLock<[u32; 256]> = LazyLock::new(gear_table);

/// Derive the gear table from blake2 digests of the seed and each byte value.
///
/// The table is identical between runs and platforms.
pub fn gear_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    for (i, entry) in table.iter_mut().enumerate() {
        let mut b2 = Blake2b256::new();
        b2.update(GEAR_SEED.to_le_bytes());
        b2.update([i as u8]);
        let digest = b2.finalize();
        *entry = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]);
    }
    table
}

/// Gear rolling hash used to find content defined chunk boundaries.
///
/// Every input byte shifts the sum one step left and adds the byte's table value,
/// so a byte stops affecting the sum after 32 more inputs.
#[derive(Clone, Debug)]
pub struct GearHasher {
    sum: u32,
    written: usize,
    filter_mask: u32,
    min_chunk_size: usize,
    max_chunk_size: usize,
}

impl GearHasher {
    pub fn new(config: &GearConfig) -> Self {
        Self {
            sum: INITIAL_HASH,
            written: 0,
            filter_mask: config.filter_bits.mask(),
            min_chunk_size: config.min_chunk_size,
            max_chunk_size: config.max_chunk_size,
        }
    }
    #[inline]
    pub fn input(&mut self, value: u8) {
        self.sum = (self.sum << 1).wrapping_add(GEAR_TABLE[value as usize]);
        self.written += 1;
    }
    pub fn sum(&self) -> u32 {
        self.sum
    }
    /// Number of bytes hashed since the hasher was created.
    pub fn written(&self) -> usize {
        self.written
    }
    /// Scan for a chunk boundary in the given buffer.
    ///
    /// Returns the offset right after the byte which completed the chunk. If the
    /// whole buffer was consumed without finding a boundary None is returned and
    /// scanning continues where it left off with the next buffer.
    pub fn find_boundary(&mut self, buf: &[u8]) -> Option<usize> {
        for (i, &val) in buf.iter().enumerate() {
            self.input(val);
            if self.written >= self.max_chunk_size {
                return Some(i + 1);
            }
            if self.written >= self.min_chunk_size && self.sum & self.filter_mask == 0 {
                return Some(i + 1);
            }
        }
        None
    }
}

/// Content defined chunker built on the gear rolling hash.
#[derive(Clone, Debug)]
pub struct GearChunker {
    hasher: GearHasher,
}

impl GearChunker {
    pub fn new(config: &GearConfig) -> Self {
        Self {
            hasher: GearHasher::new(config),
        }
    }
}

impl Chunker for GearChunker {
    fn next_boundary(&mut self, buf: &[u8]) -> Option<usize> {
        self.hasher.find_boundary(buf)
    }
}
