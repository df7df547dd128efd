//! # Error Categories
//!
//! All fallible operations in flatbin return `eyre::Result`. The typed values
//! in this module are attached to the reports so callers can downcast a
//! failure to its category instead of matching on message text:
//!
//! - [`SchemaError`]: schema compilation rejected the record type. Fatal for
//!   that type; retrying with an unchanged definition fails identically.
//! - [`FormatError`]: a source image cannot be decoded. Never silently
//!   recovered; a decode either fully succeeds or fails.
//! - [`BoundsError`]: a destination buffer is smaller than the computed
//!   encoded size. Callers must size destinations via `byte_size` first.
//!
//! ```ignore
//! match codec.read(&buf, 0) {
//!     Err(report) if report.downcast_ref::<FormatError>().is_some() => { /* bad image */ }
//!     other => { /* ... */ }
//! }
//! ```

use thiserror::Error;

/// Schema compilation failures.
///
/// Unsupported field types, missing accessors, and missing default
/// constructors are rejected by rustc before this enum ever comes into play;
/// the remaining failure modes are properties of the field set itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The record declares more optional fields than the presence bitmask
    /// can track.
    #[error("record has {count} optional fields, presence bitmask holds at most {max}")]
    TooManyOptionalFields { count: usize, max: usize },

    /// Two properties share a name, so the layout would be ambiguous.
    #[error("duplicate field name '{name}'")]
    DuplicateField { name: &'static str },
}

/// Decode failures: the source bytes are not a valid image for this codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The image was encoded with a different format version.
    #[error("version mismatch: found {found}, expected {expected}")]
    VersionMismatch { found: u8, expected: u8 },

    /// The header or the declared variable-length payloads extend past the
    /// end of the source.
    #[error("image truncated: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    /// A string payload is not valid UTF-8.
    #[error("invalid UTF-8 in string field '{field}'")]
    InvalidUtf8 { field: &'static str },

    /// A char slot holds a value outside the valid code point range.
    #[error("invalid char code point {value:#x} in field '{field}'")]
    InvalidChar { field: &'static str, value: u32 },
}

/// The destination buffer cannot hold the encoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("destination too small: need {needed} bytes, have {available}")]
pub struct BoundsError {
    pub needed: usize,
    pub available: usize,
}
