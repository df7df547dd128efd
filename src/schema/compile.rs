//! # Schema Compilation
//!
//! Turns a record type's declared properties into a compiled [`Codec`]:
//! collect the specs, reject duplicate names, sort lexicographically, plan
//! the layout, and zip specs with their assigned slots into descriptors.
//!
//! The layout is a pure function of the property set. Declaration order is
//! discarded by the sort, so refactoring a struct's field order never
//! changes its wire format.

use eyre::{Report, Result, WrapErr};

use crate::codec::Codec;
use crate::error::SchemaError;
use crate::schema::field::{FieldDescriptor, FieldSpec, Record};
use crate::schema::layout;

/// Compiles a codec for `T`. Prefer [`codec_for`](crate::codec_for), which
/// memoizes the result process-wide; this entry point always builds fresh.
pub fn compile<T: Record>() -> Result<Codec<T>> {
    let (fields, record_layout) = compile_fields(T::fields())
        .wrap_err_with(|| format!("schema compilation failed for {}", std::any::type_name::<T>()))?;
    Ok(Codec::new(fields, record_layout))
}

pub(crate) fn compile_fields<T>(
    mut specs: Vec<FieldSpec<T>>,
) -> Result<(Vec<FieldDescriptor<T>>, layout::RecordLayout)> {
    specs.sort_by(|a, b| a.name().cmp(b.name()));

    for pair in specs.windows(2) {
        if pair[0].name() == pair[1].name() {
            return Err(Report::new(SchemaError::DuplicateField {
                name: pair[0].name(),
            }));
        }
    }

    let kinds: Vec<_> = specs.iter().map(|s| s.access().kind()).collect();
    let (slots, record_layout) = layout::plan(&kinds)?;

    let fields = specs
        .into_iter()
        .zip(kinds)
        .zip(slots)
        .map(|((spec, kind), slot)| FieldDescriptor {
            name: spec.name(),
            kind,
            access: spec.access(),
            presence_bit: slot.presence_bit,
            var_index: slot.var_index,
            fixed_offset: slot.fixed_offset,
        })
        .collect();

    Ok((fields, record_layout))
}
