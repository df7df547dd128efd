//! # Process-Wide Codec Registry
//!
//! Memoizes compiled codecs by `TypeId` so each record type is compiled at
//! most once per process. The build for a cache miss runs under the write
//! lock, so concurrent first use of an uncompiled type yields exactly one
//! materialized build whose result every caller observes.
//!
//! Compilation failures are not cached: a retry with an unchanged type
//! definition fails identically, and a (hypothetically) fixed definition
//! would be a different type anyway.

use std::any::{Any, TypeId};
use std::sync::{Arc, OnceLock};

use eyre::{eyre, Result};
use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::codec::Codec;
use crate::schema::compile::compile;
use crate::schema::field::Record;

type CodecMap = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

static REGISTRY: OnceLock<RwLock<CodecMap>> = OnceLock::new();

fn registry() -> &'static RwLock<CodecMap> {
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

fn downcast<T: Record>(entry: &Arc<dyn Any + Send + Sync>) -> Result<Arc<Codec<T>>> {
    entry
        .clone()
        .downcast::<Codec<T>>()
        .map_err(|_| eyre!("registry entry type mismatch for {}", std::any::type_name::<T>()))
}

/// Returns the process-wide codec for `T`, compiling it on first use.
pub fn codec_for<T: Record>() -> Result<Arc<Codec<T>>> {
    let key = TypeId::of::<T>();

    if let Some(entry) = registry().read().get(&key) {
        return downcast::<T>(entry);
    }

    let mut map = registry().write();
    // Double-check: another thread may have installed while we waited.
    if let Some(entry) = map.get(&key) {
        return downcast::<T>(entry);
    }

    let codec = Arc::new(compile::<T>()?);
    map.insert(key, codec.clone() as Arc<dyn Any + Send + Sync>);
    Ok(codec)
}
