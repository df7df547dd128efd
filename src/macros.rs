//! # Record Declaration Macro
//!
//! [`record!`](crate::record) declares a plain data struct and implements
//! [`Record`](crate::Record) for it in one step. The generated accessor
//! pairs are non-capturing closures coerced to `fn` pointers, so binding
//! happens entirely at language compile time.
//!
//! ## Usage
//!
//! ```ignore
//! record! {
//!     /// A user row as it travels between services.
//!     pub struct User {
//!         pub age: i32,
//!         pub name: Option<String>,
//!         pub score: Option<f64>,
//!         pub tag: Option<Vec<u8>>,
//!     }
//! }
//! ```
//!
//! Supported field types are exactly the impls of
//! [`FieldAccess`](crate::schema::FieldAccess): the eight scalar types,
//! their `Option` counterparts, `Option<String>`, `Option<Vec<u8>>` and
//! `Option<Timestamp>`. Any other type fails to compile at the macro call
//! site.
//!
//! The macro derives `Debug`, `Default`, `Clone` and `PartialEq`; `Default`
//! doubles as the zero-argument constructor decode uses.

/// Declares a record struct and implements `Record` for it.
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $field_ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Default, Clone, PartialEq)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $field_ty,
            )*
        }

        impl $crate::schema::Record for $name {
            fn fields() -> ::std::vec::Vec<$crate::schema::FieldSpec<Self>> {
                ::std::vec![
                    $(
                        $crate::schema::FieldSpec::new(
                            ::std::stringify!($field),
                            <$field_ty as $crate::schema::FieldAccess>::bind::<Self>(
                                |v| &v.$field,
                                |v, x| v.$field = x,
                            ),
                        ),
                    )*
                ]
            }
        }
    };
}
