//! # Image Header Prefix
//!
//! Every encoded image starts with a fixed 12-byte prefix:
//!
//! ```text
//! +----------+-----------+--------------------+
//! | version  | pad (0)   | presence bitmask   |
//! | u8       | [u8; 3]   | u64 LE             |
//! +----------+-----------+--------------------+
//! ```
//!
//! The prefix is read through a zerocopy `Unaligned` struct so decode can
//! validate the version and pull the bitmask without copying, at any source
//! offset.

use eyre::{Report, Result};
use zerocopy::little_endian::U64;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::error::FormatError;
use crate::schema::layout::HEADER_PREFIX_SIZE;

/// Version tag written into byte 0 of every image.
pub const FORMAT_VERSION: u8 = 1;

/// Byte offset of the presence bitmask within the image.
pub(crate) const PRESENCE_OFFSET: usize = 4;

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub(crate) struct ImageHeader {
    version: u8,
    reserved: [u8; 3],
    presence: U64,
}

const _: () = assert!(std::mem::size_of::<ImageHeader>() == HEADER_PREFIX_SIZE);

impl ImageHeader {
    /// Parses and validates the prefix of `bytes`.
    pub(crate) fn from_bytes(bytes: &[u8]) -> Result<&Self> {
        if bytes.len() < HEADER_PREFIX_SIZE {
            return Err(Report::new(FormatError::Truncated {
                needed: HEADER_PREFIX_SIZE,
                available: bytes.len(),
            }));
        }

        let header = Self::ref_from_bytes(&bytes[..HEADER_PREFIX_SIZE])
            .map_err(|e| eyre::eyre!("failed to parse image header: {:?}", e))?;

        if header.version != FORMAT_VERSION {
            return Err(Report::new(FormatError::VersionMismatch {
                found: header.version,
                expected: FORMAT_VERSION,
            }));
        }

        Ok(header)
    }

    pub(crate) fn presence(&self) -> u64 {
        self.presence.get()
    }
}
