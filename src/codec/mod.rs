//! # Compiled Codec
//!
//! A [`Codec`] is the immutable encode/decode artifact the schema compiler
//! produces for one record type. It owns the sorted field descriptors and
//! the derived [`RecordLayout`], and executes the wire protocol against two
//! interchangeable buffer backends: caller-owned byte slices and
//! [`MemoryRegion`]s.
//!
//! ## Image Layout
//!
//! Offsets are relative to the record's start offset:
//!
//! ```text
//! +---------+--------+----------------+------------------+----------------+--------+
//! | version | pad    | presence mask  | length table     | fixed region   | tail   |
//! | u8      | [u8;3] | u64 LE         | [u32 LE; V]      | [u8; F]        | var    |
//! +---------+--------+----------------+------------------+----------------+--------+
//! 0         1        4                12                 12+4V            12+4V+F
//! ```
//!
//! | Component | Description |
//! |-----------|-------------|
//! | **version** | format tag, checked on every decode |
//! | **presence mask** | bit i is set exactly when the optional field assigned bit i is non-absent |
//! | **length table** | one u32 payload length per variable field, sorted-name order |
//! | **fixed region** | fixed-width slots packed contiguously, sorted-name order |
//! | **tail** | present variable payloads concatenated, sorted-name order |
//!
//! The image is self-describing given the record type: the tail carries no
//! separators, so decode reads every declared length up front.
//!
//! ## Hot-Path Allocation
//!
//! `write` into a caller-owned buffer performs no allocation for records
//! with up to 8 variable-length fields: payload slices borrowed from the
//! value are staged on the stack in a `SmallVec` between the length-table
//! pass and the tail pass. `byte_size` never allocates.
//!
//! ## Absent Fixed Slots
//!
//! An absent optional fixed field leaves its slot bytes unwritten; only its
//! presence bit is cleared. Decode gates exclusively on the bit and never
//! infers a value from slot bytes, so reusing a dirty buffer is safe.

pub mod header;
pub mod region;

#[cfg(test)]
mod tests;

use eyre::{ensure, Report, Result};
use smallvec::SmallVec;

use crate::error::{BoundsError, FormatError};
use crate::schema::field::{Access, FieldDescriptor, Record};
use crate::schema::layout::{RecordLayout, HEADER_PREFIX_SIZE};
use crate::types::Timestamp;

pub use header::FORMAT_VERSION;
pub use region::MemoryRegion;

use header::{ImageHeader, PRESENCE_OFFSET};

/// Inline staging capacity; records with more variable fields than this
/// spill to the heap during `write`.
const INLINE_VAR_FIELDS: usize = 8;

/// The compiled encoder/decoder for one record type.
///
/// Immutable after compilation and freely shared across threads; obtain one
/// via [`codec_for`](crate::codec_for).
pub struct Codec<T> {
    fields: Vec<FieldDescriptor<T>>,
    layout: RecordLayout,
}

impl<T> std::fmt::Debug for Codec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Codec")
            .field("field_count", &self.fields.len())
            .field("layout", &self.layout)
            .finish()
    }
}

impl<T: Record> Codec<T> {
    pub(crate) fn new(fields: Vec<FieldDescriptor<T>>, layout: RecordLayout) -> Self {
        Self { fields, layout }
    }

    /// The derived layout constants for this record type.
    pub fn layout(&self) -> RecordLayout {
        self.layout
    }

    /// The compiled field descriptors, in sorted-name order.
    pub fn fields(&self) -> &[FieldDescriptor<T>] {
        &self.fields
    }

    /// Exact encoded size of `value`: the tail base plus the byte length of
    /// every present variable payload.
    pub fn byte_size(&self, value: &T) -> usize {
        let mut tail = 0;
        if self.layout.var_count() != 0 {
            for field in &self.fields {
                match field.access {
                    Access::Str(get, _) => {
                        if let Some(s) = get(value) {
                            tail += s.len();
                        }
                    }
                    Access::Bytes(get, _) => {
                        if let Some(b) = get(value) {
                            tail += b.len();
                        }
                    }
                    _ => {}
                }
            }
        }
        self.layout.tail_base() + tail
    }

    /// Encodes `value` into `dst[offset..offset + byte_size(value)]`.
    ///
    /// The destination need not be zero-filled; every byte of the image
    /// except absent optional fixed slots is overwritten, and decode never
    /// reads those slots. Fails with [`BoundsError`] if the destination is
    /// too small.
    pub fn write(&self, value: &T, dst: &mut [u8], offset: usize) -> Result<()> {
        let total = self.byte_size(value);
        let end = offset.checked_add(total).ok_or(BoundsError {
            needed: usize::MAX,
            available: dst.len(),
        })?;
        if end > dst.len() {
            return Err(Report::new(BoundsError {
                needed: end,
                available: dst.len(),
            }));
        }
        self.write_image(value, &mut dst[offset..end])
    }

    /// Encodes `value` into a raw memory region at `offset`.
    pub fn write_region(&self, value: &T, dst: &mut MemoryRegion, offset: usize) -> Result<()> {
        self.write(value, dst.as_mut_slice(), offset)
    }

    /// Encodes `value` into a fresh exact-size byte vector.
    pub fn encode_to_bytes(&self, value: &T) -> Result<Vec<u8>> {
        let mut out = vec![0u8; self.byte_size(value)];
        self.write_image(value, &mut out)?;
        Ok(out)
    }

    /// Encodes `value` into a fresh exact-size anonymous memory region.
    pub fn encode_to_region(&self, value: &T) -> Result<MemoryRegion> {
        let mut region = MemoryRegion::anonymous(self.byte_size(value))?;
        self.write_image(value, region.as_mut_slice())?;
        Ok(region)
    }

    fn write_image(&self, value: &T, image: &mut [u8]) -> Result<()> {
        let mut presence = 0u64;

        image[0] = FORMAT_VERSION;
        image[1..PRESENCE_OFFSET].fill(0);

        // Variable pass: record lengths in the header, stage payload slices
        // borrowed from the value for the tail pass.
        let var_count = self.layout.var_count();
        let mut payloads: SmallVec<[Option<&[u8]>; INLINE_VAR_FIELDS]> =
            smallvec::smallvec![None; var_count];

        for field in &self.fields {
            let Some(var_index) = field.var_index else {
                continue;
            };
            let mask = field.presence_bit.map_or(0, |bit| 1u64 << bit);

            let payload: Option<&[u8]> = match field.access {
                Access::Str(get, _) => get(value).as_ref().map(|s| s.as_bytes()),
                Access::Bytes(get, _) => get(value).as_deref(),
                _ => None,
            };

            let len = match payload {
                Some(bytes) => {
                    payloads[var_index] = Some(bytes);
                    presence |= mask;
                    bytes.len()
                }
                None => 0,
            };
            ensure!(
                len <= u32::MAX as usize,
                "variable payload for field '{}' exceeds length-slot capacity",
                field.name
            );

            let slot = HEADER_PREFIX_SIZE + 4 * var_index;
            image[slot..slot + 4].copy_from_slice(&(len as u32).to_le_bytes());
        }

        // Fixed pass: non-optional slots always written; optional slots
        // written only when present, stale bytes left behind otherwise.
        let fixed_base = self.layout.header_size();
        for field in &self.fields {
            let Some(fixed_offset) = field.fixed_offset else {
                continue;
            };
            let at = fixed_base + fixed_offset;
            let mask = field.presence_bit.map_or(0, |bit| 1u64 << bit);

            match field.access {
                Access::Bool(get, _) => image[at] = *get(value) as u8,
                Access::I8(get, _) => image[at] = *get(value) as u8,
                Access::I16(get, _) => {
                    image[at..at + 4].copy_from_slice(&(*get(value) as i32).to_le_bytes());
                }
                Access::Char(get, _) => {
                    image[at..at + 4].copy_from_slice(&(*get(value) as u32).to_le_bytes());
                }
                Access::I32(get, _) => {
                    image[at..at + 4].copy_from_slice(&get(value).to_le_bytes());
                }
                Access::I64(get, _) => {
                    image[at..at + 8].copy_from_slice(&get(value).to_le_bytes());
                }
                Access::F32(get, _) => {
                    image[at..at + 4].copy_from_slice(&get(value).to_le_bytes());
                }
                Access::F64(get, _) => {
                    image[at..at + 8].copy_from_slice(&get(value).to_le_bytes());
                }
                Access::OptBool(get, _) => {
                    if let Some(v) = *get(value) {
                        presence |= mask;
                        image[at] = v as u8;
                    }
                }
                Access::OptI8(get, _) => {
                    if let Some(v) = *get(value) {
                        presence |= mask;
                        image[at] = v as u8;
                    }
                }
                Access::OptI16(get, _) => {
                    if let Some(v) = *get(value) {
                        presence |= mask;
                        image[at..at + 4].copy_from_slice(&(v as i32).to_le_bytes());
                    }
                }
                Access::OptChar(get, _) => {
                    if let Some(v) = *get(value) {
                        presence |= mask;
                        image[at..at + 4].copy_from_slice(&(v as u32).to_le_bytes());
                    }
                }
                Access::OptI32(get, _) => {
                    if let Some(v) = *get(value) {
                        presence |= mask;
                        image[at..at + 4].copy_from_slice(&v.to_le_bytes());
                    }
                }
                Access::OptI64(get, _) => {
                    if let Some(v) = *get(value) {
                        presence |= mask;
                        image[at..at + 8].copy_from_slice(&v.to_le_bytes());
                    }
                }
                Access::OptF32(get, _) => {
                    if let Some(v) = *get(value) {
                        presence |= mask;
                        image[at..at + 4].copy_from_slice(&v.to_le_bytes());
                    }
                }
                Access::OptF64(get, _) => {
                    if let Some(v) = *get(value) {
                        presence |= mask;
                        image[at..at + 8].copy_from_slice(&v.to_le_bytes());
                    }
                }
                Access::Time(get, _) => {
                    if let Some(ts) = *get(value) {
                        presence |= mask;
                        image[at..at + 8].copy_from_slice(&ts.secs().to_le_bytes());
                        image[at + 8..at + 12].copy_from_slice(&ts.subsec_nanos().to_le_bytes());
                    }
                }
                Access::Str(..) | Access::Bytes(..) => {}
            }
        }

        image[PRESENCE_OFFSET..PRESENCE_OFFSET + 8].copy_from_slice(&presence.to_le_bytes());

        // Tail: staged payloads, contiguous, in variable-index order.
        let mut cursor = self.layout.tail_base();
        for payload in payloads.iter().flatten() {
            image[cursor..cursor + payload.len()].copy_from_slice(payload);
            cursor += payload.len();
        }

        Ok(())
    }

    /// Decodes a fresh instance from `src[offset..]`.
    ///
    /// Fails with [`FormatError`] on a version mismatch or when the header's
    /// declared lengths extend past the end of the source. A decode either
    /// fully succeeds with every field set or fails; there is no partial
    /// result.
    pub fn read(&self, src: &[u8], offset: usize) -> Result<T> {
        let image = src.get(offset..).ok_or(FormatError::Truncated {
            needed: offset,
            available: src.len(),
        })?;

        let presence = ImageHeader::from_bytes(image)?.presence();

        let tail_base = self.layout.tail_base();
        if image.len() < tail_base {
            return Err(Report::new(FormatError::Truncated {
                needed: tail_base,
                available: image.len(),
            }));
        }

        // The tail carries no separators, so every declared length is read
        // up front and the whole payload span is bounds-checked before any
        // field decodes.
        let var_count = self.layout.var_count();
        let mut lens: SmallVec<[usize; INLINE_VAR_FIELDS]> = smallvec::smallvec![0; var_count];
        let mut needed = tail_base;
        for field in &self.fields {
            let Some(var_index) = field.var_index else {
                continue;
            };
            let slot = HEADER_PREFIX_SIZE + 4 * var_index;
            let len = u32::from_le_bytes(fixed_bytes::<4>(image, slot)?) as usize;
            lens[var_index] = len;
            if present(presence, field) {
                needed = needed.checked_add(len).ok_or(FormatError::Truncated {
                    needed: usize::MAX,
                    available: image.len(),
                })?;
            }
        }
        if image.len() < needed {
            return Err(Report::new(FormatError::Truncated {
                needed,
                available: image.len(),
            }));
        }

        let mut value = T::default();

        let fixed_base = self.layout.header_size();
        for field in &self.fields {
            let Some(fixed_offset) = field.fixed_offset else {
                continue;
            };
            let at = fixed_base + fixed_offset;
            let is_present = present(presence, field);

            match field.access {
                Access::Bool(_, set) => set(&mut value, image[at] != 0),
                Access::I8(_, set) => set(&mut value, image[at] as i8),
                Access::I16(_, set) => {
                    set(&mut value, i32::from_le_bytes(fixed_bytes(image, at)?) as i16)
                }
                Access::Char(_, set) => {
                    set(&mut value, decode_char(image, at, field.name)?);
                }
                Access::I32(_, set) => set(&mut value, i32::from_le_bytes(fixed_bytes(image, at)?)),
                Access::I64(_, set) => set(&mut value, i64::from_le_bytes(fixed_bytes(image, at)?)),
                Access::F32(_, set) => set(&mut value, f32::from_le_bytes(fixed_bytes(image, at)?)),
                Access::F64(_, set) => set(&mut value, f64::from_le_bytes(fixed_bytes(image, at)?)),
                Access::OptBool(_, set) => {
                    set(&mut value, is_present.then(|| image[at] != 0));
                }
                Access::OptI8(_, set) => {
                    set(&mut value, is_present.then(|| image[at] as i8));
                }
                Access::OptI16(_, set) => {
                    let v = if is_present {
                        Some(i32::from_le_bytes(fixed_bytes(image, at)?) as i16)
                    } else {
                        None
                    };
                    set(&mut value, v);
                }
                Access::OptChar(_, set) => {
                    let v = if is_present {
                        Some(decode_char(image, at, field.name)?)
                    } else {
                        None
                    };
                    set(&mut value, v);
                }
                Access::OptI32(_, set) => {
                    let v = if is_present {
                        Some(i32::from_le_bytes(fixed_bytes(image, at)?))
                    } else {
                        None
                    };
                    set(&mut value, v);
                }
                Access::OptI64(_, set) => {
                    let v = if is_present {
                        Some(i64::from_le_bytes(fixed_bytes(image, at)?))
                    } else {
                        None
                    };
                    set(&mut value, v);
                }
                Access::OptF32(_, set) => {
                    let v = if is_present {
                        Some(f32::from_le_bytes(fixed_bytes(image, at)?))
                    } else {
                        None
                    };
                    set(&mut value, v);
                }
                Access::OptF64(_, set) => {
                    let v = if is_present {
                        Some(f64::from_le_bytes(fixed_bytes(image, at)?))
                    } else {
                        None
                    };
                    set(&mut value, v);
                }
                Access::Time(_, set) => {
                    let v = if is_present {
                        let secs = i64::from_le_bytes(fixed_bytes(image, at)?);
                        let nanos = u32::from_le_bytes(fixed_bytes(image, at + 8)?);
                        Some(Timestamp::new(secs, nanos))
                    } else {
                        None
                    };
                    set(&mut value, v);
                }
                Access::Str(..) | Access::Bytes(..) => {}
            }
        }

        let mut cursor = tail_base;
        for field in &self.fields {
            let Some(var_index) = field.var_index else {
                continue;
            };
            if !present(presence, field) {
                match field.access {
                    Access::Str(_, set) => set(&mut value, None),
                    Access::Bytes(_, set) => set(&mut value, None),
                    _ => {}
                }
                continue;
            }

            let len = lens[var_index];
            let bytes = &image[cursor..cursor + len];
            match field.access {
                Access::Str(_, set) => {
                    let text = std::str::from_utf8(bytes)
                        .map_err(|_| FormatError::InvalidUtf8 { field: field.name })?;
                    set(&mut value, Some(text.to_owned()));
                }
                Access::Bytes(_, set) => set(&mut value, Some(bytes.to_vec())),
                _ => {}
            }
            cursor += len;
        }

        Ok(value)
    }

    /// Decodes a fresh instance from a raw memory region at `offset`.
    pub fn read_region(&self, src: &MemoryRegion, offset: usize) -> Result<T> {
        self.read(src.as_slice(), offset)
    }
}

fn present<T>(presence: u64, field: &FieldDescriptor<T>) -> bool {
    field
        .presence_bit
        .map_or(true, |bit| presence & (1u64 << bit) != 0)
}

fn fixed_bytes<const N: usize>(image: &[u8], at: usize) -> Result<[u8; N]> {
    image
        .get(at..at + N)
        .and_then(|s| <[u8; N]>::try_from(s).ok())
        .ok_or_else(|| {
            Report::new(FormatError::Truncated {
                needed: at + N,
                available: image.len(),
            })
        })
}

fn decode_char(image: &[u8], at: usize, field: &'static str) -> Result<char> {
    let raw = u32::from_le_bytes(fixed_bytes(image, at)?);
    char::from_u32(raw).ok_or_else(|| Report::new(FormatError::InvalidChar { field, value: raw }))
}
