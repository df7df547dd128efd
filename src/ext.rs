//! # Record Conveniences
//!
//! [`RecordExt`] gives every [`Record`] type instance-side serialization
//! methods, and the free functions decode without an explicit codec handle.
//! Everything here delegates through the process-wide registry, so the
//! first call on a type pays the one-time compilation and later calls hit
//! the cached codec.

use eyre::Result;

use crate::codec::MemoryRegion;
use crate::schema::field::Record;
use crate::schema::registry::codec_for;

/// Serialization conveniences available on every record type.
pub trait RecordExt: Record {
    /// Exact encoded size of `self`.
    fn byte_size(&self) -> Result<usize> {
        Ok(codec_for::<Self>()?.byte_size(self))
    }

    /// Encodes `self` into a fresh exact-size byte vector.
    fn to_bytes(&self) -> Result<Vec<u8>> {
        codec_for::<Self>()?.encode_to_bytes(self)
    }

    /// Encodes `self` into `dst` at `offset`.
    fn write_to(&self, dst: &mut [u8], offset: usize) -> Result<()> {
        codec_for::<Self>()?.write(self, dst, offset)
    }

    /// Encodes `self` into a raw memory region at `offset`.
    fn write_to_region(&self, dst: &mut MemoryRegion, offset: usize) -> Result<()> {
        codec_for::<Self>()?.write_region(self, dst, offset)
    }

    /// Encodes `self` into a fresh exact-size anonymous memory region.
    fn to_region(&self) -> Result<MemoryRegion> {
        codec_for::<Self>()?.encode_to_region(self)
    }
}

impl<T: Record> RecordExt for T {}

/// Decodes a `T` from `src` at `offset`.
pub fn from_bytes<T: Record>(src: &[u8], offset: usize) -> Result<T> {
    codec_for::<T>()?.read(src, offset)
}

/// Decodes a `T` from a raw memory region at `offset`.
pub fn from_region<T: Record>(src: &MemoryRegion, offset: usize) -> Result<T> {
    codec_for::<T>()?.read_region(src, offset)
}
