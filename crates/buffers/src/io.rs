//! Adapter from [`std::io::Read`] to [`InputStream`].

use std::io::{self, Read};

use crate::{Error, InputStream, Result};

/// Reads a declared number of bytes from any [`Read`] implementation.
///
/// The wire format needs to know where input ends, so the caller supplies the
/// total length up front (a file size, a frame header, ...). Peeking is not
/// supported, which forces the codec onto its byte-at-a-time paths.
pub struct IoReader<R> {
    inner: R,
    length: usize,
    position: usize,
}

impl<R: Read> IoReader<R> {
    /// Wraps `inner`, which is expected to yield exactly `length` bytes.
    pub fn new(inner: R, length: usize) -> Self {
        Self {
            inner,
            length,
            position: 0,
        }
    }

    /// Bytes consumed so far.
    pub fn bytes_used(&self) -> usize {
        self.position
    }

    /// Returns the wrapped reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

fn map_io_error(err: io::Error) -> Error {
    match err.kind() {
        io::ErrorKind::UnexpectedEof => Error::OutOfSpace,
        _ => Error::General,
    }
}

impl<R: Read> InputStream for IoReader<R> {
    fn read(&mut self, data: &mut [u8]) -> Result<()> {
        if data.len() > self.bytes_available() {
            return Err(Error::OutOfSpace);
        }
        self.inner.read_exact(data).map_err(map_io_error)?;
        self.position += data.len();
        Ok(())
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        if n > self.bytes_available() {
            return Err(Error::OutOfSpace);
        }
        let copied = io::copy(&mut (&mut self.inner).take(n as u64), &mut io::sink())
            .map_err(map_io_error)?;
        if copied != n as u64 {
            return Err(Error::OutOfSpace);
        }
        self.position += n;
        Ok(())
    }

    fn bytes_available(&self) -> usize {
        self.length - self.position
    }
}
