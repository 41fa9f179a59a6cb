//! Contract between the codec and message types, plus one-call helpers.

use wirepb_buffers::{SliceReader, SliceWriter, VecWriter};

use crate::{MessageBuilder, MessageParser, Result};

/// A message that can be written as a field sequence.
pub trait MessageWrite {
    /// Upper bound of the encoded body length, or `None` if unknown.
    ///
    /// Only the width of the varint holding this bound matters: the nested
    /// length prefix is reserved at that width and patched afterwards, so a
    /// loose bound costs a few prefix bytes while a bound that is too small
    /// makes the encode fail.
    fn estimate_size(&self) -> Option<usize> {
        None
    }

    /// Appends this message's own field records. The caller has already
    /// written any enclosing tag and length.
    fn encode(&self, b: &mut MessageBuilder<'_>) -> Result<()>;
}

/// A message that can be filled from a field sequence.
pub trait MessageRead {
    /// Consumes records until the parser runs out of input.
    ///
    /// The parser is bounded to this message's body; leaving fields unread
    /// is allowed and the enclosing parser skips whatever remains.
    fn decode(&mut self, p: &mut MessageParser<'_>) -> Result<()>;
}

impl<M: MessageWrite + ?Sized> MessageWrite for Box<M> {
    fn estimate_size(&self) -> Option<usize> {
        (**self).estimate_size()
    }

    fn encode(&self, b: &mut MessageBuilder<'_>) -> Result<()> {
        (**self).encode(b)
    }
}

impl<M: MessageWrite + ?Sized> MessageWrite for &M {
    fn estimate_size(&self) -> Option<usize> {
        (**self).estimate_size()
    }

    fn encode(&self, b: &mut MessageBuilder<'_>) -> Result<()> {
        (**self).encode(b)
    }
}

impl<M: MessageRead + ?Sized> MessageRead for Box<M> {
    fn decode(&mut self, p: &mut MessageParser<'_>) -> Result<()> {
        (**self).decode(p)
    }
}

/// Encodes `msg` into a new vector.
///
/// # Example
///
/// ```
/// use wirepb::{encode_to_vec, MessageBuilder, MessageWrite, Result};
///
/// struct Point(i32);
///
/// impl MessageWrite for Point {
///     fn encode(&self, b: &mut MessageBuilder<'_>) -> Result<()> {
///         b.sint32_field(1, self.0)
///     }
/// }
///
/// assert_eq!(encode_to_vec(&Point(-2)).unwrap(), [0x08, 0x03]);
/// ```
pub fn encode_to_vec<M: MessageWrite + ?Sized>(msg: &M) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_into_vec(msg, &mut buf)?;
    Ok(buf)
}

/// Appends the encoding of `msg` to `buf`, leaving existing bytes untouched.
///
/// On failure the partially written bytes are removed again.
pub fn encode_into_vec<M: MessageWrite + ?Sized>(msg: &M, buf: &mut Vec<u8>) -> Result<usize> {
    let mut stream = VecWriter::new(buf);
    let res = encode_with(msg, &mut MessageBuilder::new(&mut stream));
    match res {
        Ok(()) => Ok(stream.bytes_used()),
        Err(err) => {
            stream.reset();
            Err(err)
        }
    }
}

/// Encodes `msg` into a fixed buffer and returns the number of bytes used.
///
/// On failure the buffer holds whatever was committed before the error.
pub fn encode_to_slice<M: MessageWrite + ?Sized>(msg: &M, buf: &mut [u8]) -> Result<usize> {
    let mut stream = SliceWriter::new(buf);
    encode_with(msg, &mut MessageBuilder::new(&mut stream))?;
    Ok(stream.bytes_used())
}

fn encode_with<M: MessageWrite + ?Sized>(msg: &M, b: &mut MessageBuilder<'_>) -> Result<()> {
    msg.encode(b)?;
    b.last_error()
}

/// Decodes a whole buffer into a fresh `M`.
pub fn decode_from_slice<M: MessageRead + Default>(data: &[u8]) -> Result<M> {
    let mut msg = M::default();
    decode_into(data, &mut msg)?;
    Ok(msg)
}

/// Decodes a whole buffer into an existing message.
///
/// On failure `msg` may be partially populated.
pub fn decode_into<M: MessageRead + ?Sized>(data: &[u8], msg: &mut M) -> Result<()> {
    let mut stream = SliceReader::new(data);
    msg.decode(&mut MessageParser::new(&mut stream))
}
