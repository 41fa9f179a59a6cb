//! Primitive encoder: varints, zigzag varints, tags and fixed-width values.

use wirepb_buffers::OutputStream;

use crate::wire::{encode_varint, make_tag, zigzag_encode, WireType, MAX_VARINT_LEN};
use crate::Result;

/// Writes primitive wire values to an [`OutputStream`].
///
/// Fixed-width values are always little-endian, independent of the host.
pub struct Encoder<'s> {
    stream: &'s mut dyn OutputStream,
}

impl<'s> Encoder<'s> {
    /// Creates an encoder writing to `stream`.
    pub fn new(stream: &'s mut dyn OutputStream) -> Self {
        Self { stream }
    }

    /// The underlying stream.
    pub fn stream(&mut self) -> &mut dyn OutputStream {
        &mut *self.stream
    }

    /// Bytes committed to the stream so far.
    pub fn position(&self) -> usize {
        self.stream.position()
    }

    #[inline]
    pub fn varint(&mut self, value: u64) -> Result<()> {
        let mut buf = [0u8; MAX_VARINT_LEN];
        let n = encode_varint(value, &mut buf);
        self.stream.write(&buf[..n])
    }

    #[inline]
    pub fn varint_signed(&mut self, value: i64) -> Result<()> {
        self.varint(zigzag_encode(value))
    }

    #[inline]
    pub fn tag(&mut self, field_id: u32, wire_type: WireType) -> Result<()> {
        self.varint(make_tag(field_id, wire_type))
    }

    #[inline]
    pub fn fixed32(&mut self, value: u32) -> Result<()> {
        self.stream.write(&value.to_le_bytes())
    }

    #[inline]
    pub fn fixed64(&mut self, value: u64) -> Result<()> {
        self.stream.write(&value.to_le_bytes())
    }

    #[inline]
    pub fn float(&mut self, value: f32) -> Result<()> {
        self.fixed32(value.to_bits())
    }

    #[inline]
    pub fn double(&mut self, value: f64) -> Result<()> {
        self.fixed64(value.to_bits())
    }

    /// Writes raw bytes.
    pub fn fixed(&mut self, data: &[u8]) -> Result<()> {
        self.stream.write(data)
    }

    /// Writes a varint length followed by `data`.
    pub fn blob(&mut self, data: &[u8]) -> Result<()> {
        self.varint(data.len() as u64)?;
        self.stream.write(data)
    }
}
