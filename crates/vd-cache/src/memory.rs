//! In-memory cache implementation.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use crate::{CacheStorage, CacheStore, CachedResponse};

/// In-process [`CacheStorage`].
///
/// Generations live in a map guarded by a lock; each generation is an
/// independent [`CacheStore`]. Deleting a generation drops it from the
/// registry, while handles opened earlier keep working on their own copy.
#[derive(Default)]
pub struct MemoryCacheStorage {
    generations: RwLock<BTreeMap<String, Arc<MemoryCacheStore>>>,
}

impl MemoryCacheStorage {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStorage for MemoryCacheStorage {
    fn open(&self, name: &str) -> Arc<dyn CacheStore> {
        let mut generations = self
            .generations
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let store = generations
            .entry(name.to_owned())
            .or_insert_with(|| Arc::new(MemoryCacheStore::default()));
        Arc::clone(store) as Arc<dyn CacheStore>
    }

    fn has(&self, name: &str) -> bool {
        self.generations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    fn delete(&self, name: &str) -> bool {
        self.generations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some()
    }

    fn keys(&self) -> Vec<String> {
        self.generations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

/// A single in-memory generation.
#[derive(Default)]
pub(crate) struct MemoryCacheStore {
    entries: RwLock<HashMap<String, CachedResponse>>,
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &str) -> Option<CachedResponse> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn put(&self, key: &str, response: &CachedResponse) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), response.clone());
    }

    fn delete(&self, key: &str) -> bool {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some()
    }

    fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}
