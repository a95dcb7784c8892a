//! Extension trait for [`CacheStore`] with typed convenience methods.

use serde::de::DeserializeOwned;

use crate::CacheStore;

/// Typed read helpers for [`CacheStore`].
///
/// Implemented as default methods on an extension trait so that
/// [`CacheStore`] stays object-safe and implementors only handle records.
///
/// # Example
///
/// ```
/// use vd_cache::{CacheStorage, CacheStoreExt, CachedResponse, MemoryCacheStorage};
///
/// let storage = MemoryCacheStorage::new();
/// let store = storage.open("runtime");
/// store.put("GET /versions.json", &CachedResponse::ok(r#"["latest"]"#));
///
/// let versions: Option<Vec<String>> = store.get_json("GET /versions.json");
/// assert_eq!(versions, Some(vec!["latest".to_owned()]));
/// ```
pub trait CacheStoreExt: CacheStore {
    /// Body of a stored entry as UTF-8 text.
    ///
    /// Returns `None` on miss or invalid UTF-8.
    fn get_text(&self, key: &str) -> Option<String> {
        let record = self.get(key)?;
        String::from_utf8(record.body.to_vec()).ok()
    }

    /// Body of a stored entry deserialized from JSON.
    ///
    /// Returns `None` on miss or deserialization failure.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let record = self.get(key)?;
        serde_json::from_slice(&record.body).ok()
    }
}

impl<S: CacheStore + ?Sized> CacheStoreExt for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CacheStorage, CachedResponse, MemoryCacheStorage};

    #[test]
    fn test_get_text_rejects_invalid_utf8() {
        let storage = MemoryCacheStorage::new();
        let store = storage.open("runtime");
        store.put("bin", &CachedResponse::ok(vec![0xFF, 0xFE]));
        store.put("txt", &CachedResponse::ok("hello"));

        assert_eq!(store.get_text("bin"), None);
        assert_eq!(store.get_text("txt").as_deref(), Some("hello"));
    }

    #[test]
    fn test_get_json_malformed_is_none() {
        let storage = MemoryCacheStorage::new();
        let store = storage.open("runtime");
        store.put("bad", &CachedResponse::ok("{not json"));

        let value: Option<serde_json::Value> = store.get_json("bad");
        assert!(value.is_none());
    }
}
