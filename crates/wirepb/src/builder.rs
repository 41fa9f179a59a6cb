//! Field writer: assembles a message field by field on top of [`Encoder`].

use wirepb_buffers::OutputStream;

use crate::encoder::Encoder;
use crate::scalar::{Fixed32, Fixed64, Varint, Zigzag};
use crate::wire::{encode_varint, varint_size, WireType, MAX_VARINT_LEN};
use crate::{Error, MessageWrite, Result};

/// Writes field records to an [`OutputStream`].
///
/// The first failure is remembered: every later field call returns that same
/// error without touching the stream, so a message can write all its fields
/// and check the outcome once through [`last_error`](MessageBuilder::last_error).
///
/// Nested messages and packed varint runs are written without buffering: a
/// placeholder length sized from an upper-bound estimate is written first and
/// patched in place once the real length is known. The patched varint keeps
/// the placeholder width, padding with continuation bytes where needed.
///
/// # Example
///
/// ```
/// use wirepb::{MessageBuilder, VecWriter};
///
/// let mut buf = Vec::new();
/// let mut stream = VecWriter::new(&mut buf);
/// let mut b = MessageBuilder::new(&mut stream);
/// let _ = b.string_field(1, "hi");
/// let _ = b.uint32_field(2, 150);
/// b.last_error().unwrap();
/// assert_eq!(buf, [0x0a, 0x02, b'h', b'i', 0x10, 0x96, 0x01]);
/// ```
pub struct MessageBuilder<'s> {
    encoder: Encoder<'s>,
    error: Option<Error>,
}

impl<'s> MessageBuilder<'s> {
    /// Creates a builder writing to `stream`.
    pub fn new(stream: &'s mut dyn OutputStream) -> Self {
        Self {
            encoder: Encoder::new(stream),
            error: None,
        }
    }

    /// The first error any field call ran into, or `Ok(())`.
    pub fn last_error(&self) -> Result<()> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Current stream position.
    pub fn position(&self) -> usize {
        self.encoder.position()
    }

    fn check(&self) -> Result<()> {
        self.last_error()
    }

    fn remember(&mut self, res: Result<()>) -> Result<()> {
        if let Err(err) = res {
            self.error.get_or_insert(err);
        }
        res
    }

    fn emit(&mut self, f: impl FnOnce(&mut Encoder<'s>) -> Result<()>) -> Result<()> {
        self.check()?;
        let res = f(&mut self.encoder);
        self.remember(res)
    }

    /// Writes a `double` field as fixed64.
    pub fn double_field(&mut self, field_id: u32, value: f64) -> Result<()> {
        self.emit(|e| {
            e.tag(field_id, WireType::Fixed64)?;
            e.double(value)
        })
    }

    /// Writes a `float` field as fixed32.
    pub fn float_field(&mut self, field_id: u32, value: f32) -> Result<()> {
        self.emit(|e| {
            e.tag(field_id, WireType::Fixed32)?;
            e.float(value)
        })
    }

    /// Writes an `int32` field; negative values take ten bytes.
    pub fn int32_field(&mut self, field_id: u32, value: i32) -> Result<()> {
        self.varint_scalar(field_id, value)
    }

    /// Writes an `int64` field.
    pub fn int64_field(&mut self, field_id: u32, value: i64) -> Result<()> {
        self.varint_scalar(field_id, value)
    }

    /// Writes a `uint32` field.
    pub fn uint32_field(&mut self, field_id: u32, value: u32) -> Result<()> {
        self.varint_scalar(field_id, value)
    }

    /// Writes a `uint64` field.
    pub fn uint64_field(&mut self, field_id: u32, value: u64) -> Result<()> {
        self.varint_scalar(field_id, value)
    }

    /// Writes a `bool` field as a one-byte varint.
    pub fn bool_field(&mut self, field_id: u32, value: bool) -> Result<()> {
        self.varint_scalar(field_id, value)
    }

    /// Writes an enum value; enums travel as plain int32 varints.
    pub fn enum_field(&mut self, field_id: u32, value: i32) -> Result<()> {
        self.varint_scalar(field_id, value)
    }

    /// Writes a `sint32` field with zigzag encoding.
    pub fn sint32_field(&mut self, field_id: u32, value: i32) -> Result<()> {
        self.zigzag_scalar(field_id, value)
    }

    /// Writes a `sint64` field with zigzag encoding.
    pub fn sint64_field(&mut self, field_id: u32, value: i64) -> Result<()> {
        self.zigzag_scalar(field_id, value)
    }

    /// Writes a `fixed32` field.
    pub fn fixed32_field(&mut self, field_id: u32, value: u32) -> Result<()> {
        self.fixed32_scalar(field_id, value)
    }

    /// Writes an `sfixed32` field.
    pub fn sfixed32_field(&mut self, field_id: u32, value: i32) -> Result<()> {
        self.fixed32_scalar(field_id, value)
    }

    /// Writes a `fixed64` field.
    pub fn fixed64_field(&mut self, field_id: u32, value: u64) -> Result<()> {
        self.fixed64_scalar(field_id, value)
    }

    /// Writes an `sfixed64` field.
    pub fn sfixed64_field(&mut self, field_id: u32, value: i64) -> Result<()> {
        self.fixed64_scalar(field_id, value)
    }

    /// Writes a `string` field.
    pub fn string_field(&mut self, field_id: u32, value: &str) -> Result<()> {
        self.bytes_field(field_id, value.as_bytes())
    }

    /// Writes a `bytes` field.
    pub fn bytes_field(&mut self, field_id: u32, value: &[u8]) -> Result<()> {
        self.emit(|e| {
            e.tag(field_id, WireType::LengthBlob)?;
            e.blob(value)
        })
    }

    fn varint_scalar(&mut self, field_id: u32, value: impl Varint) -> Result<()> {
        self.emit(|e| {
            e.tag(field_id, WireType::Varint)?;
            e.varint(value.to_varint())
        })
    }

    fn zigzag_scalar(&mut self, field_id: u32, value: impl Zigzag) -> Result<()> {
        self.emit(|e| {
            e.tag(field_id, WireType::Varint)?;
            e.varint(value.to_zigzag())
        })
    }

    fn fixed32_scalar(&mut self, field_id: u32, value: impl Fixed32) -> Result<()> {
        self.emit(|e| {
            e.tag(field_id, WireType::Fixed32)?;
            e.fixed32(value.to_bits32())
        })
    }

    fn fixed64_scalar(&mut self, field_id: u32, value: impl Fixed64) -> Result<()> {
        self.emit(|e| {
            e.tag(field_id, WireType::Fixed64)?;
            e.fixed64(value.to_bits64())
        })
    }

    /// Writes a nested message as a length-delimited field.
    ///
    /// The message's [`estimate_size`](MessageWrite::estimate_size) decides the
    /// placeholder width; `None` reserves the full ten bytes. A message that
    /// writes more than it estimated fails with [`Error::General`] and leaves
    /// the placeholder unpatched.
    pub fn message_field<M: MessageWrite + ?Sized>(&mut self, field_id: u32, msg: &M) -> Result<()> {
        self.check()?;
        let estimate = msg.estimate_size().map_or(u64::MAX, |size| size as u64);
        let res = self.encoder.tag(field_id, WireType::LengthBlob);
        self.remember(res)?;
        let (pos, placeholder) = self.reserve_length(estimate)?;
        let res = msg.encode(self);
        self.remember(res)?;
        self.patch_length(pos, placeholder, estimate)
    }

    /// Writes each message as its own length-delimited field occurrence.
    pub fn repeated_message_field<M: MessageWrite>(&mut self, field_id: u32, msgs: &[M]) -> Result<()> {
        for msg in msgs {
            self.message_field(field_id, msg)?;
        }
        self.check()
    }

    /// Writes each string as its own field occurrence.
    pub fn repeated_string_field<S: AsRef<str>>(&mut self, field_id: u32, values: &[S]) -> Result<()> {
        for value in values {
            self.string_field(field_id, value.as_ref())?;
        }
        self.check()
    }

    /// Writes each blob as its own field occurrence.
    pub fn repeated_bytes_field<B: AsRef<[u8]>>(&mut self, field_id: u32, values: &[B]) -> Result<()> {
        for value in values {
            self.bytes_field(field_id, value.as_ref())?;
        }
        self.check()
    }

    /// Writes 4-byte elements as one packed run. Empty slices write nothing.
    pub fn packed_fixed32_field<T: Fixed32>(&mut self, field_id: u32, values: &[T]) -> Result<()> {
        if values.is_empty() {
            return self.check();
        }
        self.emit(|e| {
            e.tag(field_id, WireType::LengthBlob)?;
            e.varint(values.len() as u64 * 4)?;
            values.iter().try_for_each(|v| e.fixed32(v.to_bits32()))
        })
    }

    /// Writes 8-byte elements as one packed run. Empty slices write nothing.
    pub fn packed_fixed64_field<T: Fixed64>(&mut self, field_id: u32, values: &[T]) -> Result<()> {
        if values.is_empty() {
            return self.check();
        }
        self.emit(|e| {
            e.tag(field_id, WireType::LengthBlob)?;
            e.varint(values.len() as u64 * 8)?;
            values.iter().try_for_each(|v| e.fixed64(v.to_bits64()))
        })
    }

    /// Writes varint elements as one packed run. Empty slices write nothing.
    pub fn packed_varint_field<T: Varint>(&mut self, field_id: u32, values: &[T]) -> Result<()> {
        self.packed_run(field_id, values.len(), |e| {
            values.iter().try_for_each(|v| e.varint(v.to_varint()))
        })
    }

    /// Writes zigzag varint elements as one packed run. Empty slices write
    /// nothing.
    pub fn packed_varint_signed_field<T: Zigzag>(&mut self, field_id: u32, values: &[T]) -> Result<()> {
        self.packed_run(field_id, values.len(), |e| {
            values.iter().try_for_each(|v| e.varint(v.to_zigzag()))
        })
    }

    fn packed_run(
        &mut self,
        field_id: u32,
        count: usize,
        body: impl FnOnce(&mut Encoder<'s>) -> Result<()>,
    ) -> Result<()> {
        self.check()?;
        if count == 0 {
            return Ok(());
        }
        let estimate = (count as u64).saturating_mul(MAX_VARINT_LEN as u64);
        let res = self.encoder.tag(field_id, WireType::LengthBlob);
        self.remember(res)?;
        let (pos, placeholder) = self.reserve_length(estimate)?;
        let res = body(&mut self.encoder);
        self.remember(res)?;
        self.patch_length(pos, placeholder, estimate)
    }

    /// Writes a zeroed placeholder wide enough for any length up to
    /// `estimate`, returning its position and width.
    fn reserve_length(&mut self, estimate: u64) -> Result<(usize, usize)> {
        let placeholder = varint_size(estimate);
        let pos = self.encoder.position();
        let res = self.encoder.fixed(&[0u8; MAX_VARINT_LEN][..placeholder]);
        self.remember(res)?;
        Ok((pos, placeholder))
    }

    /// Overwrites the placeholder at `pos` with the length of everything
    /// written after it, padded to exactly `placeholder` bytes.
    /// A body that swallowed its own field errors leaves the placeholder as is.
    fn patch_length(&mut self, pos: usize, placeholder: usize, estimate: u64) -> Result<()> {
        self.check()?;
        let real_size = (self.encoder.position() - (pos + placeholder)) as u64;
        if real_size > estimate {
            tracing::debug!(real_size, estimate, "nested payload exceeded its size estimate");
            return self.remember(Err(Error::General));
        }
        let mut buf = [0u8; MAX_VARINT_LEN];
        encode_varint(real_size, &mut buf);
        for byte in &mut buf[..placeholder - 1] {
            *byte |= 0x80;
        }
        let res = self.encoder.stream().write_at(pos, &buf[..placeholder]);
        self.remember(res)
    }
}
