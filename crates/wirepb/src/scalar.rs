//! Element conversions used by the packed repeated-field writers.

/// Scalars stored as 4 raw little-endian bytes.
pub trait Fixed32: Copy {
    fn to_bits32(self) -> u32;
}

/// Scalars stored as 8 raw little-endian bytes.
pub trait Fixed64: Copy {
    fn to_bits64(self) -> u64;
}

/// Scalars stored as a plain varint.
pub trait Varint: Copy {
    fn to_varint(self) -> u64;
}

/// Signed scalars stored as a zigzag-mapped varint.
pub trait Zigzag: Copy {
    fn to_zigzag(self) -> u64;
}

impl Fixed32 for u32 {
    fn to_bits32(self) -> u32 {
        self
    }
}

impl Fixed32 for i32 {
    fn to_bits32(self) -> u32 {
        self as u32
    }
}

impl Fixed32 for f32 {
    fn to_bits32(self) -> u32 {
        self.to_bits()
    }
}

impl Fixed64 for u64 {
    fn to_bits64(self) -> u64 {
        self
    }
}

impl Fixed64 for i64 {
    fn to_bits64(self) -> u64 {
        self as u64
    }
}

impl Fixed64 for f64 {
    fn to_bits64(self) -> u64 {
        self.to_bits()
    }
}

impl Varint for u32 {
    fn to_varint(self) -> u64 {
        u64::from(self)
    }
}

impl Varint for u64 {
    fn to_varint(self) -> u64 {
        self
    }
}

// Negative int32 values are sign-extended to ten bytes like every other
// protobuf encoder; decoders truncate back to 32 bits.
impl Varint for i32 {
    fn to_varint(self) -> u64 {
        i64::from(self) as u64
    }
}

impl Varint for i64 {
    fn to_varint(self) -> u64 {
        self as u64
    }
}

impl Varint for bool {
    fn to_varint(self) -> u64 {
        u64::from(self)
    }
}

impl Zigzag for i32 {
    fn to_zigzag(self) -> u64 {
        crate::zigzag_encode(i64::from(self))
    }
}

impl Zigzag for i64 {
    fn to_zigzag(self) -> u64 {
        crate::zigzag_encode(self)
    }
}
