//! Functionality relating to the process-wide scalar array cache
//!
//! A scalar array holds no references, anywhere. Interning one yields a
//! static, immutable array shared by every caller that interns an equal
//! array, so constant arrays are stored once per process.

use std::sync::{Arc, OnceLock};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::array::{Array, ArrayData};
use crate::config::config;
use crate::error::{ArrayError, Result};
use crate::repr::{dispatch, Representation};

/// Deduplicating store of static scalar arrays, keyed by canonical form.
#[derive(Debug)]
pub struct ScalarCache {
    map: DashMap<Arc<str>, Array>,
}

impl ScalarCache {
    pub(crate) fn new() -> Self {
        let map = match config().scalar_cache_shards {
            Some(n) if n > 1 && n.is_power_of_two() => DashMap::with_shard_amount(n),
            Some(n) => {
                tracing::warn!(shards = n, "scalar cache shard count must be a power of two above one");
                DashMap::new()
            }
            None => DashMap::new(),
        };
        Self { map }
    }

    /// Number of distinct arrays interned so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if nothing was interned yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the static array equal to `arr`, creating it on first use.
    ///
    /// `key` may carry a canonical form the caller already computed. Nested
    /// arrays are interned as well. Fails with [`ArrayError::NotScalar`] if
    /// `arr` holds references.
    pub fn intern_or_get(&self, arr: &Array, key: Option<&str>) -> Result<Array> {
        if arr.is_static() {
            return Ok(arr.clone());
        }
        let key: Arc<str> = match key {
            Some(key) => {
                debug_assert_eq!(arr.canonical_key().as_deref(), Ok(key));
                key.into()
            }
            None => arr.canonical_key()?.into(),
        };
        if let Some(found) = self.map.get(&*key) {
            return Ok(found.value().clone());
        }

        // Built before touching the shard: interning nested arrays re-enters
        // this map.
        let candidate = self.make_scalar(arr)?;
        match self.map.entry(key) {
            Entry::Occupied(e) => Ok(e.get().clone()),
            Entry::Vacant(e) => {
                tracing::debug!(id = %candidate.id(), len = candidate.len(), "interned scalar array");
                Ok(e.insert(candidate).value().clone())
            }
        }
    }

    fn make_scalar(&self, arr: &Array) -> Result<Array> {
        let mut body = dispatch!(&arr.body, r => r.copy());
        dispatch!(&mut body, r => r.on_set_eval_scalar(self))?;
        let body = dispatch!(&body, r => r.non_smart_copy())?;
        Ok(Array::from_data(ArrayData::new_static(body)))
    }
}

static SCALAR_CACHE: OnceLock<ScalarCache> = OnceLock::new();

/// Creates the process-wide cache with the installed configuration.
///
/// Calling it is optional; the first use creates the cache lazily. Fails
/// with [`ArrayError::AlreadyInitialized`] if the cache already exists.
pub fn init_scalar_cache() -> Result<()> {
    SCALAR_CACHE
        .set(ScalarCache::new())
        .map_err(|_| ArrayError::AlreadyInitialized)
}

/// The process-wide scalar array cache.
pub fn scalar_cache() -> &'static ScalarCache {
    SCALAR_CACHE.get_or_init(ScalarCache::new)
}

/// Interns `arr` in the process-wide cache. See [`ScalarCache::intern_or_get`].
pub fn intern_or_get(arr: &Array, key: Option<&str>) -> Result<Array> {
    scalar_cache().intern_or_get(arr, key)
}
