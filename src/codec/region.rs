//! # Raw Memory Backend
//!
//! [`MemoryRegion`] is the codec's second buffer backend: an owned,
//! exclusively-held region of anonymous mapped memory, allocated outside the
//! Rust heap. It is interchangeable with plain byte slices as an encode
//! destination or decode source, and the two backends produce byte-identical
//! images for the same value.
//!
//! Exclusivity is enforced by the borrow checker rather than guards:
//! `as_slice` borrows `&self`, `as_mut_slice` borrows `&mut self`, so a
//! reader can never observe a half-written region through safe code.

use eyre::{ensure, Result, WrapErr};
use memmap2::MmapMut;

/// An owned region of anonymous mapped memory.
///
/// The mapping is page-granular; `len` tracks the logical size requested by
/// the caller, and the slice accessors never expose the rounding slack.
#[derive(Debug)]
pub struct MemoryRegion {
    mmap: MmapMut,
    len: usize,
}

impl MemoryRegion {
    /// Allocates a zero-filled region of exactly `len` logical bytes.
    pub fn anonymous(len: usize) -> Result<Self> {
        ensure!(len > 0, "memory region length must be at least 1");

        let mmap = MmapMut::map_anon(len)
            .wrap_err_with(|| format!("failed to map {} anonymous bytes", len))?;

        Ok(Self { mmap, len })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.mmap[..self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.mmap[..self.len]
    }
}
