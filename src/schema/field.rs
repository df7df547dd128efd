//! # Field Accessor Binding
//!
//! A record's properties are bound once, at language compile time, into
//! typed getter/setter pairs. The [`record!`](crate::record) macro produces a
//! [`FieldSpec`] per property from non-capturing closures, which coerce to
//! plain `fn` pointers: no boxing, no per-call dispatch cost beyond an
//! indirect call, and no reflective lookups anywhere.
//!
//! [`Access`] has one variant per supported declared type; a field whose type
//! implements neither side of [`FieldAccess`] cannot be declared at all, so
//! "unsupported field type" is a rustc error rather than a runtime one.
//!
//! Schema compilation turns sorted [`FieldSpec`]s into [`FieldDescriptor`]s
//! carrying the layout assignments. Descriptors are immutable and owned by
//! their codec for the life of the process.

use crate::schema::kind::FieldKind;
use crate::types::Timestamp;

/// Typed getter/setter pair for one record property.
///
/// Getters return a reference to the field in place; setters overwrite it.
/// Both are plain `fn` pointers produced by the [`record!`](crate::record)
/// macro.
pub enum Access<T> {
    Bool(fn(&T) -> &bool, fn(&mut T, bool)),
    I8(fn(&T) -> &i8, fn(&mut T, i8)),
    I16(fn(&T) -> &i16, fn(&mut T, i16)),
    Char(fn(&T) -> &char, fn(&mut T, char)),
    I32(fn(&T) -> &i32, fn(&mut T, i32)),
    I64(fn(&T) -> &i64, fn(&mut T, i64)),
    F32(fn(&T) -> &f32, fn(&mut T, f32)),
    F64(fn(&T) -> &f64, fn(&mut T, f64)),
    OptBool(fn(&T) -> &Option<bool>, fn(&mut T, Option<bool>)),
    OptI8(fn(&T) -> &Option<i8>, fn(&mut T, Option<i8>)),
    OptI16(fn(&T) -> &Option<i16>, fn(&mut T, Option<i16>)),
    OptChar(fn(&T) -> &Option<char>, fn(&mut T, Option<char>)),
    OptI32(fn(&T) -> &Option<i32>, fn(&mut T, Option<i32>)),
    OptI64(fn(&T) -> &Option<i64>, fn(&mut T, Option<i64>)),
    OptF32(fn(&T) -> &Option<f32>, fn(&mut T, Option<f32>)),
    OptF64(fn(&T) -> &Option<f64>, fn(&mut T, Option<f64>)),
    Str(fn(&T) -> &Option<String>, fn(&mut T, Option<String>)),
    Bytes(fn(&T) -> &Option<Vec<u8>>, fn(&mut T, Option<Vec<u8>>)),
    Time(fn(&T) -> &Option<Timestamp>, fn(&mut T, Option<Timestamp>)),
}

impl<T> Clone for Access<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Access<T> {}

impl<T> Access<T> {
    /// Classifies the declared type behind this accessor pair.
    pub fn kind(&self) -> FieldKind {
        match self {
            Access::Bool(..) => FieldKind::Bool,
            Access::I8(..) => FieldKind::I8,
            Access::I16(..) => FieldKind::I16,
            Access::Char(..) => FieldKind::Char,
            Access::I32(..) => FieldKind::I32,
            Access::I64(..) => FieldKind::I64,
            Access::F32(..) => FieldKind::F32,
            Access::F64(..) => FieldKind::F64,
            Access::OptBool(..) => FieldKind::OptBool,
            Access::OptI8(..) => FieldKind::OptI8,
            Access::OptI16(..) => FieldKind::OptI16,
            Access::OptChar(..) => FieldKind::OptChar,
            Access::OptI32(..) => FieldKind::OptI32,
            Access::OptI64(..) => FieldKind::OptI64,
            Access::OptF32(..) => FieldKind::OptF32,
            Access::OptF64(..) => FieldKind::OptF64,
            Access::Str(..) => FieldKind::Str,
            Access::Bytes(..) => FieldKind::Bytes,
            Access::Time(..) => FieldKind::Time,
        }
    }
}

/// Implemented for every declared type a record field may have.
///
/// The [`record!`](crate::record) macro calls [`FieldAccess::bind`] with the
/// field's getter and setter; the impl picks the matching [`Access`] variant.
/// A field type without an impl is rejected by rustc at the macro call site.
pub trait FieldAccess: Sized {
    fn bind<T>(get: fn(&T) -> &Self, set: fn(&mut T, Self)) -> Access<T>;
}

macro_rules! impl_field_access {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FieldAccess for $ty {
                fn bind<T>(get: fn(&T) -> &Self, set: fn(&mut T, Self)) -> Access<T> {
                    Access::$variant(get, set)
                }
            }
        )*
    };
}

impl_field_access! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    char => Char,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    Option<bool> => OptBool,
    Option<i8> => OptI8,
    Option<i16> => OptI16,
    Option<char> => OptChar,
    Option<i32> => OptI32,
    Option<i64> => OptI64,
    Option<f32> => OptF32,
    Option<f64> => OptF64,
    Option<String> => Str,
    Option<Vec<u8>> => Bytes,
    Option<Timestamp> => Time,
}

/// One declared property: its name and bound accessor pair.
pub struct FieldSpec<T> {
    name: &'static str,
    access: Access<T>,
}

impl<T> FieldSpec<T> {
    pub fn new(name: &'static str, access: Access<T>) -> Self {
        Self { name, access }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn access(&self) -> Access<T> {
        self.access
    }
}

/// A flat record type whose properties flatbin can compile into a codec.
///
/// Implement via the [`record!`](crate::record) macro; the `Default` bound
/// is the zero-argument constructor decode uses to produce fresh instances.
pub trait Record: Default + 'static {
    /// The declared properties, in declaration order. Schema compilation
    /// sorts them by name, so declaration order never affects the layout.
    fn fields() -> Vec<FieldSpec<Self>>
    where
        Self: Sized;
}

/// A compiled field: accessor pair plus the layout slots assigned to it.
///
/// Exactly one of `var_index` / `fixed_offset` is set, depending on whether
/// the kind is variable-length. `presence_bit` is set for every optional
/// kind.
pub struct FieldDescriptor<T> {
    pub(crate) name: &'static str,
    pub(crate) kind: FieldKind,
    pub(crate) access: Access<T>,
    pub(crate) presence_bit: Option<u32>,
    pub(crate) var_index: Option<usize>,
    pub(crate) fixed_offset: Option<usize>,
}

impl<T> FieldDescriptor<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn presence_bit(&self) -> Option<u32> {
        self.presence_bit
    }

    pub fn var_index(&self) -> Option<usize> {
        self.var_index
    }

    pub fn fixed_offset(&self) -> Option<usize> {
        self.fixed_offset
    }
}

impl<T> std::fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("presence_bit", &self.presence_bit)
            .field("var_index", &self.var_index)
            .field("fixed_offset", &self.fixed_offset)
            .finish()
    }
}
