//! Result codes shared by streams and the field codec.

/// Failure raised by a stream, the primitive codec, or the field writer/reader.
///
/// Success is `Ok(..)`; every other outcome is one of these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Error {
    /// Internal failure: allocation failed, or a nested message outgrew the
    /// size estimate it promised.
    #[error("general error")]
    General,
    /// A fixed-capacity writer is full, or a reader was asked for more bytes
    /// than remain.
    #[error("out of space")]
    OutOfSpace,
    /// `write_at` addressed bytes that were never committed.
    #[error("invalid position")]
    InvalidPosition,
    /// Reserved. Growable writers report allocation failure as [`Error::General`].
    #[error("out of memory")]
    OutOfMemory,
    /// Malformed wire data: overlong varint, unsupported wire type, truncated
    /// length-delimited field.
    #[error("invalid input")]
    InvalidInput,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
