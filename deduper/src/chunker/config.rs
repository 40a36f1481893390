use super::{AnyChunker, FixedSizeChunker, GearChunker, NoChunker};

/// Default chunk size of the fixed size chunker (1 MiB).
pub const DEFAULT_FIXED_SIZE: usize = 1 << 20;

/// Helper type for creating a bit mask to use while scanning for chunk boundaries.
///
/// The mask selects the topmost bits of the rolling hash sum. A boundary is found
/// when all of those bits are zero, `sum & mask == 0`. That is, with 1 bit set a
/// chunk will be found every 2nd byte on average, with 20 bits every 1 MiB.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterBits(pub u32);

impl FilterBits {
    /// Create new filter mask with an average target size of the given value.
    ///
    /// The actual target size will be the given size rounded down to the closest power of 2 value.
    pub fn from_size(size: u32) -> Self {
        Self((31 - size.max(2).leading_zeros()).min(31))
    }
    /// Create new filter mask from a number of bits.
    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }
    /// Get the bit mask value of the filter.
    pub fn mask(self) -> u32 {
        match self.0 {
            0 => 0,
            bits => !0u32 << (32 - bits.min(32)),
        }
    }
    /// Get the average target size from the filter.
    pub fn chunk_target_average(self) -> u64 {
        1 << self.0
    }
    /// Get number of bits set in the filter.
    pub fn bits(self) -> u32 {
        self.0
    }
}

/// Configuration of the content defined (gear) chunker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GearConfig {
    /// Bit mask filter resulting in an average chunk size.
    pub filter_bits: FilterBits,
    /// No chunks smaller than `min_chunk_size`, except for the last chunk of a source.
    pub min_chunk_size: usize,
    /// No chunks bigger than `max_chunk_size`.
    pub max_chunk_size: usize,
}

impl Default for GearConfig {
    fn default() -> Self {
        Self {
            filter_bits: FilterBits(20),
            min_chunk_size: 1 << 16,
            max_chunk_size: 1 << 24,
        }
    }
}

/// Algorithm and configuration to use while scanning for chunk boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Config {
    /// Never split, every source is a single chunk.
    None,
    FixedSize(usize),
    Gear(GearConfig),
}

impl Config {
    /// Create a fresh chunker, valid for a single chunk.
    pub fn new_chunker(&self) -> AnyChunker {
        match self {
            Self::None => AnyChunker::None(NoChunker),
            Self::FixedSize(size) => AnyChunker::FixedSize(FixedSizeChunker::new(*size)),
            Self::Gear(config) => AnyChunker::Gear(GearChunker::new(config)),
        }
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "No chunking"),
            Self::FixedSize(size) if size % (1 << 20) == 0 => {
                write!(f, "Fixed {}MiB", size >> 20)
            }
            Self::FixedSize(size) if size % (1 << 10) == 0 => {
                write!(f, "Fixed {}KiB", size >> 10)
            }
            Self::FixedSize(size) => write!(f, "Fixed {}B", size),
            Self::Gear(_) => write!(f, "Gear"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_bits_from_size() {
        assert_eq!(FilterBits::from_size(1 << 20).bits(), 20);
        assert_eq!(FilterBits::from_size((1 << 20) + 100).bits(), 20);
        assert_eq!(FilterBits::from_size(64 * 1024).bits(), 16);
        assert_eq!(FilterBits::from_size(1 << 20).chunk_target_average(), 1 << 20);
    }

    #[test]
    fn filter_mask_selects_top_bits() {
        assert_eq!(FilterBits(20).mask(), 0xffff_f000);
        assert_eq!(FilterBits(1).mask(), 0x8000_0000);
        assert_eq!(FilterBits(32).mask(), 0xffff_ffff);
        assert_eq!(FilterBits(0).mask(), 0);
    }

    #[test]
    fn display() {
        assert_eq!(Config::None.to_string(), "No chunking");
        assert_eq!(Config::FixedSize(1 << 20).to_string(), "Fixed 1MiB");
        assert_eq!(Config::FixedSize(64 * 1024).to_string(), "Fixed 64KiB");
        assert_eq!(Config::FixedSize(1000).to_string(), "Fixed 1000B");
        assert_eq!(Config::Gear(GearConfig::default()).to_string(), "Gear");
    }
}
