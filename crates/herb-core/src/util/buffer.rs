//! Text buffer backed by a byte-sized [`HbNarray`]

use crate::error::Result;
use crate::util::narray::HbNarray;

/// Growable UTF-8 text buffer
///
/// Only whole `str`s and ASCII bytes are ever appended, and every append
/// reserves its full length first, so the contents are always valid UTF-8.
#[repr(C)]
#[derive(Debug)]
pub struct HbBuffer {
    bytes: HbNarray,
}

impl HbBuffer {
    /// Create a buffer with room for `capacity` bytes (at least one)
    pub fn init(capacity: usize) -> Result<Self> {
        Ok(Self {
            bytes: HbNarray::init(1, capacity.max(1))?,
        })
    }

    /// A buffer in the state `deinit` leaves behind
    pub const fn released() -> Self {
        Self {
            bytes: HbNarray::released(),
        }
    }

    /// Append a string
    pub fn append_str(&mut self, text: &str) -> Result<()> {
        self.bytes.reserve(text.len())?;
        for byte in text.bytes() {
            self.bytes.append_bytes(&[byte])?;
        }
        Ok(())
    }

    /// Append one ASCII byte
    pub fn append_byte(&mut self, byte: u8) -> Result<()> {
        assert!(byte.is_ascii(), "HbBuffer only accepts ASCII bytes");
        self.bytes.append_bytes(&[byte])
    }

    /// Append `count` copies of an ASCII byte
    pub fn append_repeated(&mut self, byte: u8, count: usize) -> Result<()> {
        assert!(byte.is_ascii(), "HbBuffer only accepts ASCII bytes");
        self.bytes.reserve(count)?;
        for _ in 0..count {
            self.bytes.append_bytes(&[byte])?;
        }
        Ok(())
    }

    /// Buffer contents
    pub fn as_str(&self) -> &str {
        if self.is_released() {
            return "";
        }
        let bytes = self.bytes.as_slice::<u8>();
        // SAFETY: only complete UTF-8 strings and ASCII bytes are appended
        unsafe { std::str::from_utf8_unchecked(bytes) }
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    /// Last byte written, if any
    pub fn last_byte(&self) -> Option<u8> {
        self.bytes.last::<u8>().copied()
    }

    /// Release the backing storage; repeated calls are no-ops
    pub fn deinit(&mut self) {
        self.bytes.deinit();
    }

    /// Whether `deinit` has already run
    pub fn is_released(&self) -> bool {
        self.bytes.item_size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_read() {
        let mut buffer = HbBuffer::init(2).unwrap();
        buffer.append_str("<% if %>").unwrap();
        buffer.append_byte(b'\n').unwrap();
        buffer.append_repeated(b' ', 3).unwrap();
        buffer.append_str("héllo").unwrap();

        assert_eq!(buffer.as_str(), "<% if %>\n   héllo");
        assert_eq!(buffer.len(), "<% if %>\n   héllo".len());
        assert!(buffer.capacity() >= buffer.len());
        assert_eq!(buffer.last_byte(), Some(b'o'));
    }

    #[test]
    fn test_zero_capacity_is_bumped() {
        let buffer = HbBuffer::init(0).unwrap();
        assert_eq!(buffer.capacity(), 1);
        assert!(buffer.is_empty());
        assert_eq!(buffer.as_str(), "");
    }

    #[test]
    fn test_failed_append_keeps_valid_utf8() {
        let mut buffer = HbBuffer::init(1).unwrap();
        buffer.append_str("a").unwrap();

        crate::util::narray::fault::fail_next_allocation();
        assert!(buffer.append_str("ünïcode").is_err());
        assert_eq!(buffer.as_str(), "a");
    }

    #[test]
    fn test_deinit() {
        let mut buffer = HbBuffer::init(8).unwrap();
        buffer.append_str("x").unwrap();
        buffer.deinit();
        assert!(buffer.is_released());
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.as_str(), "");
        buffer.deinit();

        assert!(HbBuffer::released().is_released());
    }
}
