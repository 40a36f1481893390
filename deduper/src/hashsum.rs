use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use std::fmt;

/// Length in bytes of a chunk fingerprint.
pub const HASH_LENGTH: usize = 32;

pub(crate) type Blake2b256 = Blake2b<U32>;

/// A hash sum, used as the fingerprint of a chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HashSum([u8; HASH_LENGTH]);

impl HashSum {
    /// Create new hash sum using blake2 to digest the given data.
    pub fn b2_digest(data: &[u8]) -> Self {
        let mut b2 = Blake2b256::new();
        b2.update(data);
        Self::from_hasher(b2)
    }
    pub(crate) fn from_hasher(hasher: Blake2b256) -> Self {
        let mut sum = [0u8; HASH_LENGTH];
        sum.copy_from_slice(&hasher.finalize());
        Self(sum)
    }
    /// Returns the hash sum as a slice.
    pub fn slice(&self) -> &[u8] {
        &self.0[..]
    }
}

impl From<[u8; HASH_LENGTH]> for HashSum {
    fn from(v: [u8; HASH_LENGTH]) -> Self {
        Self(v)
    }
}

impl fmt::Display for HashSum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0[..] {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_data_same_sum() {
        assert_eq!(HashSum::b2_digest(b"abc"), HashSum::b2_digest(b"abc"));
    }

    #[test]
    fn order_sensitive() {
        assert_ne!(HashSum::b2_digest(b"abc"), HashSum::b2_digest(b"cba"));
    }

    #[test]
    fn incremental_equals_oneshot() {
        let mut b2 = Blake2b256::new();
        b2.update(b"hello ");
        b2.update(b"world");
        assert_eq!(
            HashSum::from_hasher(b2),
            HashSum::b2_digest(b"hello world")
        );
    }

    #[test]
    fn display_as_hex() {
        let sum = HashSum::from([0xab; HASH_LENGTH]);
        assert_eq!(format!("{}", sum), "ab".repeat(HASH_LENGTH));
    }
}
