//! # flatbin - Schema-Compiled Binary Codec for Flat Records
//!
//! flatbin derives, at first use, a fixed binary layout for a flat record
//! type and produces a paired encoder/decoder that serializes instances
//! into a compact, self-describing image and reconstructs them from it:
//! hand-written packed-format throughput with the ergonomics of an ordinary
//! data struct.
//!
//! ## Quick Start
//!
//! ```ignore
//! use flatbin::{from_bytes, record, RecordExt};
//!
//! record! {
//!     pub struct User {
//!         pub age: i32,
//!         pub name: Option<String>,
//!         pub score: Option<f64>,
//!         pub tag: Option<Vec<u8>>,
//!     }
//! }
//!
//! let user = User { age: 30, name: Some("abc".into()), score: None, tag: None };
//! let bytes = user.to_bytes()?;
//! let back: User = from_bytes(&bytes, 0)?;
//! assert_eq!(back, user);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +-------------------------------------+
//! |  Record types (record! macro)       |
//! +-------------------------------------+
//! |  Schema derivation                  |
//! |  classify -> bind -> plan layout    |
//! +-------------------------------------+
//! |  Process-wide codec registry        |
//! |  (one immutable Codec per type)     |
//! +-------------------------------------+
//! |  Encode/decode protocol             |
//! |  header | fixed region | tail       |
//! +-------------------------------------+
//! |  Buffer backends                    |
//! |  byte slices | MemoryRegion (mmap)  |
//! +-------------------------------------+
//! ```
//!
//! ## Design Goals
//!
//! 1. **Deterministic layout**: a pure function of the property set, sorted
//!    by name, so declaration order never touches the wire.
//! 2. **Allocation-free hot path**: `byte_size` and `write` into a reused
//!    buffer allocate nothing for records with up to 8 variable fields.
//! 3. **Compile-time binding**: accessors are `fn` pointers generated by
//!    `record!`; there is no reflection and no per-call lookup.
//! 4. **Interchangeable backends**: byte slices and raw memory regions
//!    produce byte-identical images.
//!
//! ## Supported Field Types
//!
//! Flat records only: `bool`, `i8`, `i16`, `char`, `i32`, `i64`, `f32`,
//! `f64`, their `Option` counterparts, `Option<String>`, `Option<Vec<u8>>`
//! and `Option<Timestamp>`. No nesting, no collections, no references.
//!
//! ## Module Overview
//!
//! - [`schema`]: kind classification, accessor binding, layout planning,
//!   the process-wide registry
//! - [`codec`]: the compiled codec, image header, buffer backends
//! - [`types`]: the [`Timestamp`] value type
//! - [`error`]: typed error categories carried by `eyre` reports

#[macro_use]
mod macros;

pub mod codec;
pub mod error;
pub mod schema;
pub mod types;

mod ext;

pub use codec::{Codec, MemoryRegion, FORMAT_VERSION};
pub use error::{BoundsError, FormatError, SchemaError};
pub use ext::{from_bytes, from_region, RecordExt};
pub use schema::{codec_for, compile, FieldKind, Record, RecordLayout, MAX_OPTIONAL_FIELDS};
pub use types::Timestamp;
