//! Reader over a sequence of byte chunks.

use std::collections::VecDeque;

use crate::{Error, InputStream, Result};

/// A reader that consumes several chunks as one contiguous stream.
///
/// Chunks are never merged; reads, skips and peeks walk across chunk
/// boundaries as needed. Fully consumed chunks are dropped.
#[derive(Default)]
pub struct ChunkedReader {
    chunks: VecDeque<Vec<u8>>,
    /// Position within the front chunk.
    x: usize,
    /// Unread bytes across all chunks.
    size: usize,
}

impl ChunkedReader {
    /// Creates an empty reader; feed it with [`push`](Self::push).
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk to the end of the stream.
    pub fn push(&mut self, chunk: Vec<u8>) {
        if chunk.is_empty() {
            return;
        }
        self.size += chunk.len();
        self.chunks.push_back(chunk);
    }

    /// Copies `dst.len()` bytes starting at the cursor without consuming them.
    /// The caller guarantees that many bytes are available.
    fn copy_to(&self, dst: &mut [u8]) {
        let mut copied = 0;
        let mut local_x = self.x;
        for chunk in &self.chunks {
            if copied == dst.len() {
                break;
            }
            let to_copy = (chunk.len() - local_x).min(dst.len() - copied);
            dst[copied..copied + to_copy].copy_from_slice(&chunk[local_x..local_x + to_copy]);
            copied += to_copy;
            local_x = 0;
        }
    }

    fn advance(&mut self, mut n: usize) {
        self.size -= n;
        while n > 0 {
            let Some(front) = self.chunks.front() else {
                break;
            };
            let remaining = front.len() - self.x;
            if remaining > n {
                self.x += n;
                return;
            }
            n -= remaining;
            self.chunks.pop_front();
            self.x = 0;
        }
    }
}

impl InputStream for ChunkedReader {
    fn read(&mut self, data: &mut [u8]) -> Result<()> {
        if data.len() > self.size {
            return Err(Error::OutOfSpace);
        }
        self.copy_to(data);
        self.advance(data.len());
        Ok(())
    }

    fn skip(&mut self, n: usize) -> Result<()> {
        if n > self.size {
            return Err(Error::OutOfSpace);
        }
        self.advance(n);
        Ok(())
    }

    fn peek(&mut self, data: &mut [u8]) -> usize {
        let size = data.len().min(self.size);
        self.copy_to(&mut data[..size]);
        size
    }

    fn bytes_available(&self) -> usize {
        self.size
    }
}
