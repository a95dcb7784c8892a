//! Cache-store abstraction for the offline layer.
//!
//! Responses are kept in named *generations* (one precache and one runtime cache
//! per release). Two traits form the core API:
//!
//! - [`CacheStorage`]: Registry of named generations (open, list, delete)
//! - [`CacheStore`]: Keyed response map inside one generation
//!
//! Both are passed into consumers at construction, so tests can substitute an
//! in-memory store for the on-disk one.
//!
//! # Implementations
//!
//! - [`MemoryCacheStorage`]: In-process maps, lost on exit
//! - [`FileCacheStorage`]: One directory per generation, one file per entry
//! - [`NullCacheStorage`]: No-op implementation (always misses)
//!
//! # Example
//!
//! ```
//! use vd_cache::{CacheStorage, CachedResponse, MemoryCacheStorage};
//!
//! let storage = MemoryCacheStorage::new();
//! let runtime = storage.open("docs-runtime-v1");
//! runtime.put("GET https://docs.example/content/en/start.md", &CachedResponse::ok("# Start"));
//! assert!(runtime.get("GET https://docs.example/content/en/start.md").is_some());
//! assert_eq!(storage.keys(), vec!["docs-runtime-v1".to_owned()]);
//! ```

mod ext;
mod file;
mod memory;
mod record;

use std::sync::Arc;

pub use ext::CacheStoreExt;
pub use file::FileCacheStorage;
pub use memory::MemoryCacheStorage;
pub use record::CachedResponse;

/// One cache generation: a keyed map of stored responses.
///
/// Keys are opaque strings chosen by the caller (the offline layer uses
/// `"{METHOD} {url}"`). Writes overwrite; concurrent writers to the same key
/// race with last-write-wins.
pub trait CacheStore: Send + Sync {
    /// Look up a stored response.
    fn get(&self, key: &str) -> Option<CachedResponse>;

    /// Store a response, replacing any previous entry for `key`.
    ///
    /// Failures are swallowed: a cache that cannot be written behaves like a
    /// cache that forgot the entry.
    fn put(&self, key: &str, response: &CachedResponse);

    /// Remove an entry. Returns `true` if something was removed.
    fn delete(&self, key: &str) -> bool;

    /// List all keys currently stored.
    fn keys(&self) -> Vec<String>;
}

/// Registry of named cache generations.
pub trait CacheStorage: Send + Sync {
    /// Open (creating if needed) the generation called `name`.
    fn open(&self, name: &str) -> Arc<dyn CacheStore>;

    /// Whether a generation called `name` exists.
    fn has(&self, name: &str) -> bool;

    /// Delete a whole generation. Returns `true` if it existed.
    fn delete(&self, name: &str) -> bool;

    /// Names of all existing generations, sorted.
    fn keys(&self) -> Vec<String>;
}

/// No-op [`CacheStore`] that never stores or retrieves data.
pub struct NullCacheStore;

impl CacheStore for NullCacheStore {
    fn get(&self, _key: &str) -> Option<CachedResponse> {
        None
    }

    fn put(&self, _key: &str, _response: &CachedResponse) {}

    fn delete(&self, _key: &str) -> bool {
        false
    }

    fn keys(&self) -> Vec<String> {
        Vec::new()
    }
}

/// No-op [`CacheStorage`] that always hands out [`NullCacheStore`]s.
///
/// Use when caching is disabled: every lookup misses, so every strategy
/// degrades to its network path.
pub struct NullCacheStorage;

impl CacheStorage for NullCacheStorage {
    fn open(&self, _name: &str) -> Arc<dyn CacheStore> {
        Arc::new(NullCacheStore)
    }

    fn has(&self, _name: &str) -> bool {
        false
    }

    fn delete(&self, _name: &str) -> bool {
        false
    }

    fn keys(&self) -> Vec<String> {
        Vec::new()
    }
}
