//! Wire-level vocabulary: wire types, tags, varint sizing and zigzag mapping.

use crate::{Error, Result};

/// Longest varint needed for a 64-bit value.
pub const MAX_VARINT_LEN: usize = 10;

/// Largest field number a tag can carry.
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Three-bit payload framing suffix of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WireType {
    #[default]
    Varint = 0,
    Fixed64 = 1,
    LengthBlob = 2,
    /// Deprecated group framing; recognised but never decoded.
    GroupStart = 3,
    GroupEnd = 4,
    Fixed32 = 5,
}

impl TryFrom<u8> for WireType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::LengthBlob),
            3 => Ok(WireType::GroupStart),
            4 => Ok(WireType::GroupEnd),
            5 => Ok(WireType::Fixed32),
            _ => Err(Error::InvalidInput),
        }
    }
}

/// Packs a field number and wire type into a tag value.
#[inline]
pub fn make_tag(field_id: u32, wire_type: WireType) -> u64 {
    (u64::from(field_id) << 3) | wire_type as u64
}

/// Splits a tag value into field number and wire type.
///
/// Field number 0, numbers above [`MAX_FIELD_NUMBER`] and wire types 6/7 are
/// rejected as [`Error::InvalidInput`].
pub fn split_tag(tag: u64) -> Result<(u32, WireType)> {
    let wire_type = WireType::try_from((tag & 0x7) as u8)?;
    let field_id = tag >> 3;
    if field_id == 0 || field_id > u64::from(MAX_FIELD_NUMBER) {
        return Err(Error::InvalidInput);
    }
    Ok((field_id as u32, wire_type))
}

/// Number of bytes the varint encoding of `value` occupies.
#[inline]
pub fn varint_size(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Number of bytes a tag for `field_id` occupies.
#[inline]
pub fn tag_size(field_id: u32) -> usize {
    varint_size(make_tag(field_id, WireType::Varint))
}

/// Writes the varint encoding of `value` into `buf`, returning its length.
#[inline]
pub fn encode_varint(mut value: u64, buf: &mut [u8; MAX_VARINT_LEN]) -> usize {
    let mut i = 0;
    loop {
        let low7 = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf[i] = low7;
            return i + 1;
        }
        buf[i] = low7 | 0x80;
        i += 1;
    }
}

/// Maps a signed value onto an unsigned one so small magnitudes stay short.
#[inline]
pub fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`zigzag_encode`].
#[inline]
pub fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}
