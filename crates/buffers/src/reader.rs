//! Byte sources: the [`InputStream`] contract and a reader over a byte slice.

use crate::{Error, Result};

/// Source of bytes with exact-length reads.
///
/// The wire format has no end marker, so [`bytes_available`] is the only way a
/// parser learns where its input stops.
///
/// [`bytes_available`]: InputStream::bytes_available
pub trait InputStream {
    /// Fills `data` completely, or fails with [`Error::OutOfSpace`] without
    /// consuming anything.
    fn read(&mut self, data: &mut [u8]) -> Result<()>;

    /// Discards exactly `n` bytes, or fails with [`Error::OutOfSpace`] without
    /// consuming anything.
    fn skip(&mut self, n: usize) -> Result<()>;

    /// Copies up to `data.len()` upcoming bytes without consuming them and
    /// returns how many were copied.
    ///
    /// `0` means either "no data" or "peeking unsupported"; callers must then
    /// fall back to [`read`](InputStream::read).
    fn peek(&mut self, _data: &mut [u8]) -> usize {
        0
    }

    /// Number of bytes that can still be read.
    fn bytes_available(&self) -> usize;
}

/// Reader over a byte slice with cursor tracking.
///
/// # Example
///
/// ```
/// use wirepb_buffers::{InputStream, SliceReader};
///
/// let data = [0x01, 0x02, 0x03];
/// let mut reader = SliceReader::new(&data);
///
/// let mut head = [0u8; 2];
/// assert_eq!(reader.peek(&mut head), 2);
/// reader.read(&mut head).unwrap();
/// assert_eq!(head, [0x01, 0x02]);
/// assert_eq!(reader.bytes_available(), 1);
/// ```
pub struct SliceReader<'a> {
    /// The underlying byte slice.
    pub uint8: &'a [u8],
    /// Current cursor position.
    pub x: usize,
}

impl<'a> SliceReader<'a> {
    /// Creates a reader positioned at the start of `uint8`.
    pub fn new(uint8: &'a [u8]) -> Self {
        Self { uint8, x: 0 }
    }

    /// Bytes consumed so far.
    pub fn bytes_used(&self) -> usize {
        self.x
    }

    /// The unread tail of the slice.
    pub fn remaining(&self) -> &'a [u8] {
        &self.uint8[self.x..]
    }

    /// Rewinds to the start of the slice.
    pub fn reset(&mut self) {
        self.x = 0;
    }
}

impl InputStream for SliceReader<'_> {
    fn read(&mut self, data: &mut [u8]) -> Result<()> {
        if data.len() > self.bytes_available() {
            return Err(Error::OutOfSpace);
        }
        let end = self.x + data.len();
        data.copy_from_slice(&self.uint8[self.x..end]);
        self.x = end;
        Ok(())
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        if n > self.bytes_available() {
            return Err(Error::OutOfSpace);
        }
        self.x += n;
        Ok(())
    }

    fn peek(&mut self, data: &mut [u8]) -> usize {
        let size = data.len().min(self.bytes_available());
        data[..size].copy_from_slice(&self.uint8[self.x..self.x + size]);
        size
    }

    fn bytes_available(&self) -> usize {
        self.uint8.len() - self.x
    }
}
