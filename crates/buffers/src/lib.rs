//! Byte streams for the wirepb codec.
//!
//! Writers implement [`OutputStream`]: append-only sinks that can patch bytes
//! they already committed, which is what lets the field writer emit a length
//! prefix before the length is known. Readers implement [`InputStream`]:
//! exact-length sources with optional peeking. [`BoundedReader`] restricts a
//! parent reader to a window so nested messages and packed runs are parsed
//! with the same logic as a top-level message.

mod bounded;
mod chunked;
mod error;
mod io;
mod reader;
mod writer;

pub use bounded::BoundedReader;
pub use chunked::ChunkedReader;
pub use error::{Error, Result};
pub use io::IoReader;
pub use reader::{InputStream, SliceReader};
pub use writer::{OutputStream, SliceWriter, VecWriter, DEFAULT_ALLOC_SIZE};
