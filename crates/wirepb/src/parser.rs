//! Field reader: iterates the field records of a message on top of [`Decoder`].

use wirepb_buffers::{BoundedReader, InputStream};

use crate::decoder::Decoder;
use crate::wire::WireType;
use crate::{Error, MessageRead, Result};

/// Nesting limit applied when no [`DecodeOptions`] are given.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Limits applied while parsing untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// How many nested message levels may be entered below the top-level
    /// message. Deeper input fails with [`Error::InvalidInput`].
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DecodeOptions {
    /// Sets the nesting limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Pull parser over the field records of one message.
///
/// [`next_field`](MessageParser::next_field) moves to the next record; if the
/// previous record was not read through a typed accessor its payload is
/// skipped first. Nested messages and packed runs are parsed by a child
/// parser over a [`BoundedReader`], after which the parent is re-aligned to
/// the end of the length-delimited region whatever the child consumed.
///
/// # Example
///
/// ```
/// use wirepb::{MessageParser, SliceReader};
///
/// let data = [0x08, 0x96, 0x01, 0x12, 0x01, b'x'];
/// let mut stream = SliceReader::new(&data);
/// let mut p = MessageParser::new(&mut stream);
/// let mut value = 0;
/// while p.next_field().unwrap() {
///     match p.field_id() {
///         1 => value = p.uint32_field().unwrap(),
///         _ => p.skip_field().unwrap(),
///     }
/// }
/// assert_eq!(value, 150);
/// ```
pub struct MessageParser<'s> {
    decoder: Decoder<'s>,
    field_id: u32,
    wire_type: WireType,
    field_read: bool,
    depth: usize,
    options: DecodeOptions,
}

impl<'s> MessageParser<'s> {
    /// Creates a top-level parser with default options.
    pub fn new(stream: &'s mut dyn InputStream) -> Self {
        Self::with_options(stream, DecodeOptions::default())
    }

    /// Creates a top-level parser with the given options.
    pub fn with_options(stream: &'s mut dyn InputStream, options: DecodeOptions) -> Self {
        Self::nested(stream, 0, options)
    }

    fn nested(stream: &'s mut dyn InputStream, depth: usize, options: DecodeOptions) -> Self {
        Self {
            decoder: Decoder::new(stream),
            field_id: 0,
            wire_type: WireType::Varint,
            field_read: true,
            depth,
            options,
        }
    }

    /// Advances to the next field record.
    ///
    /// Returns `Ok(false)` once the input is exhausted.
    pub fn next_field(&mut self) -> Result<bool> {
        if !self.field_read {
            self.field_read = true;
            self.decoder.skip_field(self.wire_type)?;
        }
        if self.decoder.is_eof() {
            return Ok(false);
        }
        let (field_id, wire_type) = self.decoder.tag()?;
        self.field_id = field_id;
        self.wire_type = wire_type;
        self.field_read = false;
        Ok(true)
    }

    /// Field number of the current record.
    pub fn field_id(&self) -> u32 {
        self.field_id
    }

    /// Wire type of the current record.
    pub fn wire_type(&self) -> WireType {
        self.wire_type
    }

    /// Nesting level of this parser; the top-level message is at 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// True once the input bounded to this parser is exhausted.
    pub fn is_eof(&self) -> bool {
        self.decoder.is_eof()
    }

    /// Discards the current field's payload. Does nothing if it was already
    /// read.
    pub fn skip_field(&mut self) -> Result<()> {
        if self.field_read {
            return Ok(());
        }
        self.field_read = true;
        self.decoder.skip_field(self.wire_type)
    }

    fn expect(&mut self, wire_type: WireType) -> Result<()> {
        if self.wire_type != wire_type {
            return Err(self.unexpected_wire_type());
        }
        self.field_read = true;
        Ok(())
    }

    fn unexpected_wire_type(&self) -> Error {
        tracing::debug!(
            field_id = self.field_id,
            wire_type = ?self.wire_type,
            "field has an unexpected wire type"
        );
        Error::InvalidInput
    }

    /// Reads a double; a fixed32 payload is widened from `f32`.
    pub fn double_field(&mut self) -> Result<f64> {
        match self.wire_type {
            WireType::Fixed64 => {
                self.field_read = true;
                self.decoder.double()
            }
            WireType::Fixed32 => {
                self.field_read = true;
                self.decoder.float().map(f64::from)
            }
            _ => Err(self.unexpected_wire_type()),
        }
    }

    /// Reads a float; a fixed64 payload is narrowed from `f64`.
    pub fn float_field(&mut self) -> Result<f32> {
        match self.wire_type {
            WireType::Fixed32 => {
                self.field_read = true;
                self.decoder.float()
            }
            WireType::Fixed64 => {
                self.field_read = true;
                self.decoder.double().map(|v| v as f32)
            }
            _ => Err(self.unexpected_wire_type()),
        }
    }

    fn varint_payload(&mut self) -> Result<u64> {
        self.expect(WireType::Varint)?;
        self.decoder.varint()
    }

    /// Reads an `int32`, truncating the varint to 32 bits.
    pub fn int32_field(&mut self) -> Result<i32> {
        self.varint_payload().map(|v| v as i32)
    }

    /// Reads an `int64`.
    pub fn int64_field(&mut self) -> Result<i64> {
        self.varint_payload().map(|v| v as i64)
    }

    /// Reads a `uint32`, truncating the varint to 32 bits.
    pub fn uint32_field(&mut self) -> Result<u32> {
        self.varint_payload().map(|v| v as u32)
    }

    /// Reads a `uint64`.
    pub fn uint64_field(&mut self) -> Result<u64> {
        self.varint_payload()
    }

    /// Reads a `bool`; any non-zero varint is `true`.
    pub fn bool_field(&mut self) -> Result<bool> {
        self.varint_payload().map(|v| v != 0)
    }

    /// Reads an enum value as its raw number.
    pub fn enum_field(&mut self) -> Result<i32> {
        self.int32_field()
    }

    /// Reads a zigzag `sint32`.
    pub fn sint32_field(&mut self) -> Result<i32> {
        self.expect(WireType::Varint)?;
        self.decoder.varint_signed().map(|v| v as i32)
    }

    /// Reads a zigzag `sint64`.
    pub fn sint64_field(&mut self) -> Result<i64> {
        self.expect(WireType::Varint)?;
        self.decoder.varint_signed()
    }

    /// Reads a `fixed32`.
    pub fn fixed32_field(&mut self) -> Result<u32> {
        self.expect(WireType::Fixed32)?;
        self.decoder.fixed32()
    }

    /// Reads an `sfixed32`.
    pub fn sfixed32_field(&mut self) -> Result<i32> {
        self.fixed32_field().map(|v| v as i32)
    }

    /// Reads a `fixed64`.
    pub fn fixed64_field(&mut self) -> Result<u64> {
        self.expect(WireType::Fixed64)?;
        self.decoder.fixed64()
    }

    /// Reads an `sfixed64`.
    pub fn sfixed64_field(&mut self) -> Result<i64> {
        self.fixed64_field().map(|v| v as i64)
    }

    /// Reads a UTF-8 string. Invalid UTF-8 is [`Error::InvalidInput`].
    pub fn string_field(&mut self) -> Result<String> {
        self.expect(WireType::LengthBlob)?;
        self.decoder.string()
    }

    /// Reads a length-delimited payload into a fresh vector.
    pub fn bytes_field(&mut self) -> Result<Vec<u8>> {
        self.expect(WireType::LengthBlob)?;
        self.decoder.blob()
    }

    /// Copies a length-delimited payload into `buf` without allocating.
    ///
    /// Bytes beyond `buf.len()` are skipped. Returns the full payload length,
    /// which exceeds `buf.len()` when the payload was cut.
    pub fn bytes_field_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.expect(WireType::LengthBlob)?;
        let len = self.decoder.length()?;
        let n = len.min(buf.len());
        self.decoder.fixed(&mut buf[..n])?;
        if len > n {
            self.decoder.stream().skip(len - n)?;
        }
        Ok(len)
    }

    /// Decodes a nested message from the current length-delimited field.
    pub fn message_field<M: MessageRead + ?Sized>(&mut self, msg: &mut M) -> Result<()> {
        self.expect(WireType::LengthBlob)?;
        if self.depth >= self.options.max_depth {
            tracing::debug!(
                max_depth = self.options.max_depth,
                "message nesting exceeds depth limit"
            );
            return Err(Error::InvalidInput);
        }
        let len = self.decoder.length()?;
        let remaining = self.decoder.bytes_available() - len;
        let (depth, options) = (self.depth + 1, self.options);
        {
            let mut body = BoundedReader::new(self.decoder.stream(), len);
            msg.decode(&mut MessageParser::nested(&mut body, depth, options))?;
        }
        let leftover = self.decoder.bytes_available() - remaining;
        if leftover > 0 {
            tracing::trace!(leftover, "skipping unread tail of nested message");
            self.decoder.stream().skip(leftover)?;
        }
        Ok(())
    }

    /// Appends one or more elements of a packable repeated field.
    ///
    /// A length-delimited payload is a packed run of `native` elements; any
    /// other wire type is a single unpacked element.
    fn repeated_packable<T, F>(&mut self, out: &mut Vec<T>, native: WireType, read: F) -> Result<()>
    where
        F: Fn(&mut MessageParser<'_>) -> Result<T>,
    {
        if self.wire_type != WireType::LengthBlob {
            let value = read(self)?;
            return push(out, value);
        }
        self.field_read = true;
        let len = self.decoder.length()?;
        let width = match native {
            WireType::Fixed32 => 4,
            WireType::Fixed64 => 8,
            _ => 1,
        };
        if len % width != 0 {
            tracing::debug!(len, width, "packed run ends inside an element");
            return Err(Error::InvalidInput);
        }
        let (depth, options) = (self.depth, self.options);
        let mut run = BoundedReader::new(self.decoder.stream(), len);
        let mut elements = MessageParser::nested(&mut run, depth, options);
        while !elements.is_eof() {
            elements.wire_type = native;
            elements.field_read = false;
            let value = read(&mut elements)?;
            push(out, value)?;
        }
        Ok(())
    }

    /// Appends packed or unpacked `double` values.
    pub fn repeated_double_field(&mut self, out: &mut Vec<f64>) -> Result<()> {
        self.repeated_packable(out, WireType::Fixed64, |p| p.double_field())
    }

    /// Appends packed or unpacked `float` values.
    pub fn repeated_float_field(&mut self, out: &mut Vec<f32>) -> Result<()> {
        self.repeated_packable(out, WireType::Fixed32, |p| p.float_field())
    }

    /// Appends packed or unpacked `int32` values.
    pub fn repeated_int32_field(&mut self, out: &mut Vec<i32>) -> Result<()> {
        self.repeated_packable(out, WireType::Varint, |p| p.int32_field())
    }

    /// Appends packed or unpacked `int64` values.
    pub fn repeated_int64_field(&mut self, out: &mut Vec<i64>) -> Result<()> {
        self.repeated_packable(out, WireType::Varint, |p| p.int64_field())
    }

    /// Appends packed or unpacked `uint32` values.
    pub fn repeated_uint32_field(&mut self, out: &mut Vec<u32>) -> Result<()> {
        self.repeated_packable(out, WireType::Varint, |p| p.uint32_field())
    }

    /// Appends packed or unpacked `uint64` values.
    pub fn repeated_uint64_field(&mut self, out: &mut Vec<u64>) -> Result<()> {
        self.repeated_packable(out, WireType::Varint, |p| p.uint64_field())
    }

    /// Appends packed or unpacked `sint32` values.
    pub fn repeated_sint32_field(&mut self, out: &mut Vec<i32>) -> Result<()> {
        self.repeated_packable(out, WireType::Varint, |p| p.sint32_field())
    }

    /// Appends packed or unpacked `sint64` values.
    pub fn repeated_sint64_field(&mut self, out: &mut Vec<i64>) -> Result<()> {
        self.repeated_packable(out, WireType::Varint, |p| p.sint64_field())
    }

    /// Appends packed or unpacked `bool` values.
    pub fn repeated_bool_field(&mut self, out: &mut Vec<bool>) -> Result<()> {
        self.repeated_packable(out, WireType::Varint, |p| p.bool_field())
    }

    /// Appends packed or unpacked enum values.
    pub fn repeated_enum_field(&mut self, out: &mut Vec<i32>) -> Result<()> {
        self.repeated_packable(out, WireType::Varint, |p| p.enum_field())
    }

    /// Appends packed or unpacked `fixed32` values.
    pub fn repeated_fixed32_field(&mut self, out: &mut Vec<u32>) -> Result<()> {
        self.repeated_packable(out, WireType::Fixed32, |p| p.fixed32_field())
    }

    /// Appends packed or unpacked `sfixed32` values.
    pub fn repeated_sfixed32_field(&mut self, out: &mut Vec<i32>) -> Result<()> {
        self.repeated_packable(out, WireType::Fixed32, |p| p.sfixed32_field())
    }

    /// Appends packed or unpacked `fixed64` values.
    pub fn repeated_fixed64_field(&mut self, out: &mut Vec<u64>) -> Result<()> {
        self.repeated_packable(out, WireType::Fixed64, |p| p.fixed64_field())
    }

    /// Appends packed or unpacked `sfixed64` values.
    pub fn repeated_sfixed64_field(&mut self, out: &mut Vec<i64>) -> Result<()> {
        self.repeated_packable(out, WireType::Fixed64, |p| p.sfixed64_field())
    }

    /// Appends one string occurrence.
    pub fn repeated_string_field(&mut self, out: &mut Vec<String>) -> Result<()> {
        let value = self.string_field()?;
        push(out, value)
    }

    /// Appends one blob occurrence.
    pub fn repeated_bytes_field(&mut self, out: &mut Vec<Vec<u8>>) -> Result<()> {
        let value = self.bytes_field()?;
        push(out, value)
    }

    /// Decodes one nested message occurrence and appends it.
    pub fn repeated_message_field<M: MessageRead + Default>(&mut self, out: &mut Vec<M>) -> Result<()> {
        let mut msg = M::default();
        self.message_field(&mut msg)?;
        push(out, msg)
    }
}

fn push<T>(out: &mut Vec<T>, value: T) -> Result<()> {
    out.try_reserve(1).map_err(|_| Error::General)?;
    out.push(value);
    Ok(())
}
