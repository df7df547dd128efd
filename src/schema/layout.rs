//! # Layout Planning
//!
//! A single pass over the name-sorted field kinds assigns three independent
//! monotonic counters:
//!
//! - a presence-bit counter, one bit per optional field;
//! - a variable-length-index counter, one slot per variable-length field;
//! - a fixed-offset cursor, advanced by each fixed-width field's size.
//!
//! The pass emits a [`RecordLayout`] with the derived constants. Because the
//! input is sorted and the counters are deterministic, two independent
//! compilations of the same property set agree byte-for-byte.

use eyre::{Report, Result};

use crate::error::SchemaError;
use crate::schema::kind::FieldKind;

/// Bytes before the variable-length table: version byte, 3 pad bytes,
/// 64-bit presence bitmask.
pub(crate) const HEADER_PREFIX_SIZE: usize = 12;

/// Presence bitmask capacity; a record may declare at most this many
/// optional fields.
pub const MAX_OPTIONAL_FIELDS: usize = 64;

/// Derived layout constants for one record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    var_count: usize,
    header_size: usize,
    fixed_size: usize,
    tail_base: usize,
}

impl RecordLayout {
    /// Number of variable-length fields (length-table slots).
    pub fn var_count(&self) -> usize {
        self.var_count
    }

    /// Header bytes: prefix plus one u32 length per variable field.
    pub fn header_size(&self) -> usize {
        self.header_size
    }

    /// Total bytes of the packed fixed-width region.
    pub fn fixed_size(&self) -> usize {
        self.fixed_size
    }

    /// Offset where the variable-length tail begins.
    pub fn tail_base(&self) -> usize {
        self.tail_base
    }
}

/// Layout slots assigned to one field by the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Slot {
    pub presence_bit: Option<u32>,
    pub var_index: Option<usize>,
    pub fixed_offset: Option<usize>,
}

/// Assigns slots for the given kinds, which must already be in sorted-name
/// order. Fails if the optional-field count exceeds the bitmask capacity.
pub(crate) fn plan(kinds: &[FieldKind]) -> Result<(Vec<Slot>, RecordLayout)> {
    let mut slots = Vec::with_capacity(kinds.len());
    let mut bit = 0u32;
    let mut var_index = 0usize;
    let mut fixed_offset = 0usize;

    for kind in kinds {
        let presence_bit = if kind.is_optional() {
            let assigned = bit;
            bit += 1;
            Some(assigned)
        } else {
            None
        };

        let var = if kind.is_variable() {
            let assigned = var_index;
            var_index += 1;
            Some(assigned)
        } else {
            None
        };

        let fixed = kind.fixed_size().map(|size| {
            let assigned = fixed_offset;
            fixed_offset += size;
            assigned
        });

        slots.push(Slot {
            presence_bit,
            var_index: var,
            fixed_offset: fixed,
        });
    }

    if bit as usize > MAX_OPTIONAL_FIELDS {
        return Err(Report::new(SchemaError::TooManyOptionalFields {
            count: bit as usize,
            max: MAX_OPTIONAL_FIELDS,
        }));
    }

    let header_size = HEADER_PREFIX_SIZE + 4 * var_index;
    let layout = RecordLayout {
        var_count: var_index,
        header_size,
        fixed_size: fixed_offset,
        tail_base: header_size + fixed_offset,
    };

    Ok((slots, layout))
}
