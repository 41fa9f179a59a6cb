//! Byte sinks: the [`OutputStream`] contract plus a fixed-capacity and a
//! growable backing.

use crate::{Error, Result};

/// Default minimum allocation step of a [`VecWriter`].
pub const DEFAULT_ALLOC_SIZE: usize = 1024;

/// Append-only byte sink that can patch bytes it has already committed.
pub trait OutputStream {
    /// Number of bytes committed so far. Never decreases.
    fn position(&self) -> usize;

    /// Appends `data`, failing without committing anything if it does not fit.
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Overwrites committed bytes in `[pos, pos + data.len())`.
    ///
    /// Fails with [`Error::InvalidPosition`] if the range reaches past
    /// [`position`](OutputStream::position); never extends the stream.
    fn write_at(&mut self, pos: usize, data: &[u8]) -> Result<()>;
}

/// Writer over a caller-provided fixed buffer.
///
/// # Example
///
/// ```
/// use wirepb_buffers::{OutputStream, SliceWriter};
///
/// let mut buf = [0u8; 4];
/// let mut writer = SliceWriter::new(&mut buf);
/// writer.write(&[0x01, 0x02]).unwrap();
/// writer.write_at(0, &[0x03]).unwrap();
/// assert_eq!(writer.written(), [0x03, 0x02]);
/// ```
pub struct SliceWriter<'a> {
    uint8: &'a mut [u8],
    x: usize,
}

impl<'a> SliceWriter<'a> {
    /// Creates a writer over the whole of `uint8`.
    pub fn new(uint8: &'a mut [u8]) -> Self {
        Self { uint8, x: 0 }
    }

    /// Bytes committed so far.
    pub fn bytes_used(&self) -> usize {
        self.x
    }

    /// Free capacity left in the buffer.
    pub fn bytes_available(&self) -> usize {
        self.uint8.len() - self.x
    }

    /// The committed prefix of the buffer.
    pub fn written(&self) -> &[u8] {
        &self.uint8[..self.x]
    }

    /// Forgets everything written; the buffer contents are left as they are.
    pub fn reset(&mut self) {
        self.x = 0;
    }
}

impl OutputStream for SliceWriter<'_> {
    fn position(&self) -> usize {
        self.x
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > self.bytes_available() {
            return Err(Error::OutOfSpace);
        }
        let end = self.x + data.len();
        self.uint8[self.x..end].copy_from_slice(data);
        self.x = end;
        Ok(())
    }

    fn write_at(&mut self, pos: usize, data: &[u8]) -> Result<()> {
        let end = pos.checked_add(data.len()).ok_or(Error::InvalidPosition)?;
        if end > self.x {
            return Err(Error::InvalidPosition);
        }
        self.uint8[pos..end].copy_from_slice(data);
        Ok(())
    }
}

/// Growable writer appending to a borrowed `Vec<u8>`.
///
/// Bytes already in the vector when the writer is created are never touched:
/// positions are relative to that base offset, and [`reset`](VecWriter::reset)
/// truncates back to it. Allocation failure is reported as
/// [`Error::General`].
///
/// # Example
///
/// ```
/// use wirepb_buffers::{OutputStream, VecWriter};
///
/// let mut buf = vec![0xaa];
/// let mut writer = VecWriter::new(&mut buf);
/// writer.write(&[0x01]).unwrap();
/// assert_eq!(writer.position(), 1);
/// assert_eq!(buf, [0xaa, 0x01]);
/// ```
pub struct VecWriter<'a> {
    uint8: &'a mut Vec<u8>,
    /// Length of the vector before this writer appended anything.
    x0: usize,
    /// Minimum growth step.
    alloc_size: usize,
}

impl<'a> VecWriter<'a> {
    /// Creates a writer with default allocation size that appends after the existing contents.
    pub fn new(uint8: &'a mut Vec<u8>) -> Self {
        Self::with_alloc_size(uint8, DEFAULT_ALLOC_SIZE)
    }

    /// Creates a writer that grows the vector by at least `alloc_size` bytes
    /// at a time.
    pub fn with_alloc_size(uint8: &'a mut Vec<u8>, alloc_size: usize) -> Self {
        let x0 = uint8.len();
        Self {
            uint8,
            x0,
            alloc_size,
        }
    }

    /// Bytes committed past the base offset.
    pub fn bytes_used(&self) -> usize {
        self.uint8.len() - self.x0
    }

    /// The bytes appended by this writer.
    pub fn written(&self) -> &[u8] {
        &self.uint8[self.x0..]
    }

    /// Drops everything this writer appended.
    pub fn reset(&mut self) {
        self.uint8.truncate(self.x0);
    }

    /// Ensures `additional` more bytes can be appended without reallocating.
    ///
    /// Requests up to `alloc_size` are rounded up to it; larger ones reserve
    /// twice the total this writer will then hold.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let remaining = self.uint8.capacity() - self.uint8.len();
        if remaining >= additional {
            return Ok(());
        }
        let required = self
            .bytes_used()
            .checked_add(additional)
            .ok_or(Error::General)?;
        let total = if required <= self.alloc_size {
            self.alloc_size
        } else {
            required.checked_mul(2).ok_or(Error::General)?
        };
        self.uint8
            .try_reserve_exact(total - self.bytes_used())
            .map_err(|_| Error::General)
    }
}

impl OutputStream for VecWriter<'_> {
    fn position(&self) -> usize {
        self.bytes_used()
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.reserve(data.len())?;
        self.uint8.extend_from_slice(data);
        Ok(())
    }

    fn write_at(&mut self, pos: usize, data: &[u8]) -> Result<()> {
        let end = pos.checked_add(data.len()).ok_or(Error::InvalidPosition)?;
        if end > self.bytes_used() {
            return Err(Error::InvalidPosition);
        }
        let start = self.x0 + pos;
        self.uint8[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }
}
