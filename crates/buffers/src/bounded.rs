//! Length-bounded view over a parent reader.

use crate::{Error, InputStream, Result};

/// Exposes at most `len` bytes of a parent reader.
///
/// The window is `min(len, parent.bytes_available())` at construction time.
/// Reads and skips are forwarded to the parent, so consuming through the view
/// advances the parent by the same amount. The view borrows the parent
/// mutably and therefore cannot outlive the call that created it.
///
/// # Example
///
/// ```
/// use wirepb_buffers::{BoundedReader, InputStream, SliceReader};
///
/// let data = [1, 2, 3, 4];
/// let mut parent = SliceReader::new(&data);
/// {
///     let mut view = BoundedReader::new(&mut parent, 2);
///     assert_eq!(view.bytes_available(), 2);
///     view.skip(2).unwrap();
///     assert!(view.skip(1).is_err());
/// }
/// assert_eq!(parent.bytes_available(), 2);
/// ```
pub struct BoundedReader<'p> {
    parent: &'p mut dyn InputStream,
    length: usize,
    position: usize,
}

impl<'p> BoundedReader<'p> {
    /// Creates a view over at most `len` bytes of `parent`.
    pub fn new(parent: &'p mut dyn InputStream, len: usize) -> Self {
        let length = len.min(parent.bytes_available());
        Self {
            parent,
            length,
            position: 0,
        }
    }

    /// Bytes consumed through this view.
    pub fn bytes_used(&self) -> usize {
        self.position
    }
}

impl InputStream for BoundedReader<'_> {
    fn read(&mut self, data: &mut [u8]) -> Result<()> {
        if data.len() > self.bytes_available() {
            return Err(Error::OutOfSpace);
        }
        self.parent.read(data)?;
        self.position += data.len();
        Ok(())
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        if n > self.bytes_available() {
            return Err(Error::OutOfSpace);
        }
        self.parent.skip(n)?;
        self.position += n;
        Ok(())
    }

    fn peek(&mut self, data: &mut [u8]) -> usize {
        let size = data.len().min(self.bytes_available());
        self.parent.peek(&mut data[..size])
    }

    fn bytes_available(&self) -> usize {
        self.length - self.position
    }
}
