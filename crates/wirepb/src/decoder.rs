//! Primitive decoder: varints, zigzag varints, tags, fixed-width values and
//! per-wire-type skipping.

use wirepb_buffers::InputStream;

use crate::wire::{split_tag, zigzag_decode, WireType, MAX_VARINT_LEN};
use crate::{Error, Result};

/// Reads primitive wire values from an [`InputStream`].
pub struct Decoder<'s> {
    stream: &'s mut dyn InputStream,
}

impl<'s> Decoder<'s> {
    /// Creates a decoder reading from `stream`.
    pub fn new(stream: &'s mut dyn InputStream) -> Self {
        Self { stream }
    }

    /// The underlying stream.
    pub fn stream(&mut self) -> &mut dyn InputStream {
        &mut *self.stream
    }

    /// Bytes left in the underlying stream.
    pub fn bytes_available(&self) -> usize {
        self.stream.bytes_available()
    }

    /// Reads a varint of at most [`MAX_VARINT_LEN`] bytes.
    ///
    /// Peeks first and consumes only the bytes the varint occupies. When the
    /// stream cannot peek (or peeks short of a terminator) the rest is read a
    /// byte at a time. An empty stream fails with [`Error::OutOfSpace`]; a
    /// varint cut short by the end of input, or a tenth byte that still
    /// carries a continuation bit, fails with [`Error::InvalidInput`].
    pub fn varint(&mut self) -> Result<u64> {
        let mut buf = [0u8; MAX_VARINT_LEN];
        let peeked = self.stream.peek(&mut buf);
        let mut value = 0u64;
        for (i, byte) in buf[..peeked].iter().enumerate() {
            value |= u64::from(byte & 0x7f) << (i * 7);
            if byte & 0x80 == 0 {
                self.stream.skip(i + 1)?;
                return Ok(value);
            }
        }
        if peeked > 0 {
            self.stream.skip(peeked)?;
        }
        for i in peeked..MAX_VARINT_LEN {
            let mut byte = [0u8; 1];
            match self.stream.read(&mut byte) {
                Ok(()) => {}
                Err(Error::OutOfSpace) if i > 0 => {
                    tracing::debug!(read = i, "varint truncated by end of input");
                    return Err(Error::InvalidInput);
                }
                Err(err) => return Err(err),
            }
            value |= u64::from(byte[0] & 0x7f) << (i * 7);
            if byte[0] & 0x80 == 0 {
                return Ok(value);
            }
        }
        tracing::debug!("varint longer than {MAX_VARINT_LEN} bytes");
        Err(Error::InvalidInput)
    }

    /// Reads a zigzag varint.
    pub fn varint_signed(&mut self) -> Result<i64> {
        self.varint().map(zigzag_decode)
    }

    /// Reads a varint length and checks it fits in what remains of the input.
    pub fn length(&mut self) -> Result<usize> {
        let len = self.varint()?;
        match usize::try_from(len) {
            Ok(len) if len <= self.stream.bytes_available() => Ok(len),
            _ => {
                tracing::debug!(
                    len,
                    available = self.stream.bytes_available(),
                    "length-delimited field runs past end of input"
                );
                Err(Error::InvalidInput)
            }
        }
    }

    /// Reads and validates a field tag.
    pub fn tag(&mut self) -> Result<(u32, WireType)> {
        let tag = self.varint()?;
        split_tag(tag).inspect_err(|_| tracing::debug!(tag, "malformed field tag"))
    }

    /// Reads a little-endian `u32`.
    pub fn fixed32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.stream.read(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Reads a little-endian `u64`.
    pub fn fixed64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.stream.read(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    /// Reads an IEEE 754 single.
    pub fn float(&mut self) -> Result<f32> {
        self.fixed32().map(f32::from_bits)
    }

    /// Reads an IEEE 754 double.
    pub fn double(&mut self) -> Result<f64> {
        self.fixed64().map(f64::from_bits)
    }

    /// Fills `data` with raw bytes.
    pub fn fixed(&mut self, data: &mut [u8]) -> Result<()> {
        self.stream.read(data)
    }

    /// Reads a length-prefixed byte blob into a fresh vector.
    pub fn blob(&mut self) -> Result<Vec<u8>> {
        let len = self.length()?;
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| Error::General)?;
        data.resize(len, 0);
        self.stream.read(&mut data)?;
        Ok(data)
    }

    /// Reads a length-prefixed UTF-8 string.
    pub fn string(&mut self) -> Result<String> {
        String::from_utf8(self.blob()?).map_err(|_| Error::InvalidInput)
    }

    /// Discards one payload of the given wire type.
    pub fn skip_field(&mut self, wire_type: WireType) -> Result<()> {
        match wire_type {
            WireType::Varint => self.varint().map(|_| ()),
            WireType::Fixed64 => self.stream.skip(8),
            WireType::LengthBlob => {
                let len = self.length()?;
                self.stream.skip(len)
            }
            WireType::GroupStart | WireType::GroupEnd => {
                tracing::debug!(?wire_type, "group wire types are not supported");
                Err(Error::InvalidInput)
            }
            WireType::Fixed32 => self.stream.skip(4),
        }
    }

    /// True once the stream has nothing left.
    pub fn is_eof(&self) -> bool {
        self.stream.bytes_available() == 0
    }
}
