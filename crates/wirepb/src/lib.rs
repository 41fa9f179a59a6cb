//! Protocol Buffers wire codec without generated runtime machinery.
//!
//! The crate is layered leaves first:
//!
//! - [`wire`]: wire types, tags, varint sizing, zigzag mapping.
//! - [`Encoder`] / [`Decoder`]: primitive values over a byte stream.
//! - [`MessageBuilder`]: field writer with a sticky error and in-place
//!   length patching for nested messages and packed varint runs.
//! - [`MessageParser`]: pull-style field reader that handles unknown fields,
//!   packed and unpacked repetition, and bounded nested decoding.
//!
//! Message types plug in through [`MessageWrite`] and [`MessageRead`],
//! normally implemented by generated code.
//!
//! # Example
//!
//! ```
//! use wirepb::{
//!     decode_from_slice, encode_to_vec, MessageBuilder, MessageParser, MessageRead,
//!     MessageWrite, Result,
//! };
//!
//! #[derive(Default, Debug, PartialEq)]
//! struct Greeting {
//!     text: String,
//!     ids: Vec<u32>,
//! }
//!
//! impl MessageWrite for Greeting {
//!     fn encode(&self, b: &mut MessageBuilder<'_>) -> Result<()> {
//!         b.string_field(1, &self.text)?;
//!         b.packed_varint_field(2, &self.ids)
//!     }
//! }
//!
//! impl MessageRead for Greeting {
//!     fn decode(&mut self, p: &mut MessageParser<'_>) -> Result<()> {
//!         while p.next_field()? {
//!             match p.field_id() {
//!                 1 => self.text = p.string_field()?,
//!                 2 => p.repeated_uint32_field(&mut self.ids)?,
//!                 _ => p.skip_field()?,
//!             }
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let msg = Greeting { text: "hi".into(), ids: vec![1, 300] };
//! let bytes = encode_to_vec(&msg).unwrap();
//! assert_eq!(decode_from_slice::<Greeting>(&bytes).unwrap(), msg);
//! ```

mod builder;
mod decoder;
mod encoder;
mod message;
mod parser;
mod scalar;
pub mod wire;

pub use builder::MessageBuilder;
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use message::{
    decode_from_slice, decode_into, encode_into_vec, encode_to_slice, encode_to_vec,
    MessageRead, MessageWrite,
};
pub use parser::{DecodeOptions, MessageParser, DEFAULT_MAX_DEPTH};
pub use scalar::{Fixed32, Fixed64, Varint, Zigzag};
pub use wire::{varint_size, zigzag_decode, zigzag_encode, WireType, MAX_VARINT_LEN};

pub use wirepb_buffers::{
    BoundedReader, ChunkedReader, Error, InputStream, IoReader, OutputStream, Result,
    SliceReader, SliceWriter, VecWriter,
};
