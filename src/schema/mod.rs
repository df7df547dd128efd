//! # Schema Derivation
//!
//! This module turns a record type's declared properties into the compiled
//! layout a [`Codec`](crate::Codec) executes. Derivation happens once per
//! type, at first use, and the result is immutable for the life of the
//! process.
//!
//! ## Pipeline
//!
//! ```text
//! record! declaration
//!       | (rustc: typed accessor pairs, Default ctor)
//!       v
//! FieldSpec per property      field.rs
//!       | sort by name, reject duplicates
//!       v
//! FieldKind classification    kind.rs
//!       | presence bits / var indices / fixed offsets
//!       v
//! RecordLayout + descriptors  layout.rs, compile.rs
//!       | memoized by TypeId
//!       v
//! Arc<Codec<T>>               registry.rs
//! ```
//!
//! ## Determinism
//!
//! Layout is a pure function of the property set: fields are sorted
//! lexicographically by name before any counter is assigned, so declaration
//! order never leaks into the wire format, and two independent compilations
//! of the same type agree byte-for-byte.
//!
//! ## Module Structure
//!
//! - `kind`: storage kind enum and the per-kind layout properties
//! - `field`: accessor binding, `Record` trait, field specs and descriptors
//! - `layout`: the three-counter planning pass and `RecordLayout`
//! - `compile`: sort + classify + plan, producing a `Codec`
//! - `registry`: process-wide memoization keyed by `TypeId`

pub mod compile;
pub mod field;
pub mod kind;
pub mod layout;
pub mod registry;


pub use compile::compile;
pub use field::{Access, FieldAccess, FieldDescriptor, FieldSpec, Record};
pub use kind::FieldKind;
pub use layout::{RecordLayout, MAX_OPTIONAL_FIELDS};
pub use registry::codec_for;
