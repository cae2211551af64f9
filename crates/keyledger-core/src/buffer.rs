//! Record buffer: fixed-capacity accumulator for block content.
//!
//! Serialized events are packed into the buffer until it is full, then the
//! owner seals the buffered bytes into a block and clears it.
//!
//! Clearing is logical. The backing storage is reused and previously buffered
//! bytes stay in memory until overwritten; they are never readable through
//! [`RecordBuffer::bytes`].

/// Canonical buffer capacity in bytes.
pub const RECORD_CAPACITY: usize = 512;

/// A fixed-capacity byte buffer.
#[derive(Debug, Clone)]
pub struct RecordBuffer {
    storage: Box<[u8]>,
    written: usize,
}

impl RecordBuffer {
    /// Create an empty buffer of [`RECORD_CAPACITY`] bytes.
    pub fn new() -> Self {
        Self::with_capacity(RECORD_CAPACITY)
    }

    /// Create an empty buffer of `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: vec![0u8; capacity].into_boxed_slice(),
            written: 0,
        }
    }

    /// Copy as much of `data` as fits. Returns the number of bytes consumed.
    ///
    /// Callers feed the unconsumed tail back in after sealing a full buffer.
    pub fn write_until_full(&mut self, data: &[u8]) -> usize {
        let count = data.len().min(self.remaining());
        self.storage[self.written..self.written + count].copy_from_slice(&data[..count]);
        self.written += count;
        count
    }

    /// Check if the buffer is full.
    pub fn is_full(&self) -> bool {
        self.written == self.storage.len()
    }

    /// Copy of exactly the written prefix.
    pub fn bytes(&self) -> Vec<u8> {
        self.storage[..self.written].to_vec()
    }

    /// Reset the write offset.
    pub fn clear(&mut self) {
        self.written = 0;
    }

    /// Number of bytes currently held.
    pub fn len(&self) -> usize {
        self.written
    }

    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    /// Bytes that can still be written before the buffer is full.
    pub fn remaining(&self) -> usize {
        self.storage.len() - self.written
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }
}

impl Default for RecordBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_buffer_is_empty() {
        let buffer = RecordBuffer::new();
        assert!(buffer.is_empty());
        assert!(!buffer.is_full());
        assert_eq!(buffer.capacity(), 512);
        assert_eq!(buffer.remaining(), 512);
        assert!(buffer.bytes().is_empty());
    }

    #[test]
    fn test_write_stops_at_capacity() {
        let mut buffer = RecordBuffer::with_capacity(8);
        assert_eq!(buffer.write_until_full(b"abcde"), 5);
        assert_eq!(buffer.write_until_full(b"fghij"), 3);
        assert!(buffer.is_full());
        assert_eq!(buffer.bytes(), b"abcdefgh");
        assert_eq!(buffer.write_until_full(b"k"), 0);
    }

    #[test]
    fn test_exact_capacity_is_full() {
        let mut buffer = RecordBuffer::new();
        assert_eq!(buffer.write_until_full(&[0xab; RECORD_CAPACITY]), RECORD_CAPACITY);
        assert!(buffer.is_full());
        assert_eq!(buffer.remaining(), 0);
    }

    #[test]
    fn test_clear_hides_old_bytes() {
        let mut buffer = RecordBuffer::with_capacity(8);
        buffer.write_until_full(b"secret!!");
        buffer.clear();
        assert!(buffer.bytes().is_empty());
        assert!(!buffer.is_full());

        buffer.write_until_full(b"ok");
        assert_eq!(buffer.bytes(), b"ok");
    }

    #[test]
    fn test_empty_write_consumes_nothing() {
        let mut buffer = RecordBuffer::new();
        assert_eq!(buffer.write_until_full(&[]), 0);
        assert!(buffer.is_empty());
    }

    proptest! {
        #[test]
        fn prop_buffer_returns_written_prefix(
            data in prop::collection::vec(any::<u8>(), 1..=RECORD_CAPACITY)
        ) {
            let mut buffer = RecordBuffer::new();
            prop_assert_eq!(buffer.write_until_full(&data), data.len());
            prop_assert_eq!(buffer.bytes(), data.clone());
            prop_assert_eq!(buffer.is_full(), data.len() == RECORD_CAPACITY);
        }

        #[test]
        fn prop_chunked_writes_lose_nothing(
            data in prop::collection::vec(any::<u8>(), 0..2048),
            capacity in 1usize..64,
        ) {
            let mut buffer = RecordBuffer::with_capacity(capacity);
            let mut sealed = Vec::new();
            let mut rest = &data[..];
            while !rest.is_empty() {
                let n = buffer.write_until_full(rest);
                rest = &rest[n..];
                if buffer.is_full() {
                    sealed.extend(buffer.bytes());
                    buffer.clear();
                }
            }
            sealed.extend(buffer.bytes());
            prop_assert_eq!(sealed, data);
        }
    }
}
