use super::Chunker;

/// Chunker splitting every `chunk_size` bytes.
#[derive(Clone, Debug)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    written: usize,
}

impl FixedSizeChunker {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            written: 0,
        }
    }
}

impl Chunker for FixedSizeChunker {
    fn next_boundary(&mut self, buf: &[u8]) -> Option<usize> {
        if self.written + buf.len() >= self.chunk_size {
            return Some(self.chunk_size - self.written);
        }
        self.written += buf.len();
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_within_single_buffer() {
        let mut chunker = FixedSizeChunker::new(100);
        assert_eq!(chunker.next_boundary(&[0u8; 250]), Some(100));
    }

    #[test]
    fn boundary_across_buffers() {
        let mut chunker = FixedSizeChunker::new(100);
        assert_eq!(chunker.next_boundary(&[0u8; 30]), None);
        assert_eq!(chunker.next_boundary(&[0u8; 30]), None);
        assert_eq!(chunker.next_boundary(&[0u8; 70]), Some(40));
    }

    #[test]
    fn boundary_at_buffer_end() {
        let mut chunker = FixedSizeChunker::new(100);
        assert_eq!(chunker.next_boundary(&[0u8; 60]), None);
        assert_eq!(chunker.next_boundary(&[0u8; 40]), Some(40));
    }

    #[test]
    fn empty_buffer() {
        let mut chunker = FixedSizeChunker::new(100);
        assert_eq!(chunker.next_boundary(&[]), None);
    }
}
