//! File-based cache implementation.
//!
//! [`FileCacheStorage`] keeps each generation in its own subdirectory. Entries
//! are single files named by the SHA-256 of their key, with a binary header
//! followed by the body:
//!
//! ```text
//! [meta_len: u32 LE][meta JSON: key, status, headers][body bytes]
//! ```
//!
//! On read, the header is parsed first; the body is read only when the header
//! is intact.
//!
//! On construction, [`FileCacheStorage`] validates a `FORMAT` file in the root.
//! If the on-disk layout version mismatches or is missing, the whole root is
//! wiped and recreated, so entries written by an incompatible build are never
//! replayed.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::record::EntryMeta;
use crate::{CacheStorage, CacheStore, CachedResponse};

/// On-disk layout version. Bump when the entry format changes.
const FORMAT_VERSION: &str = "1";

/// File holding the real generation name inside each generation directory.
const NAME_FILE: &str = "NAME";

/// File-based [`CacheStorage`] rooted at a directory on disk.
///
/// Directory layout:
/// ```text
/// {root}/
/// +-- FORMAT                     # layout version
/// +-- vitte-docs-precache-v3/    # generation
/// |   +-- NAME                   # exact generation name
/// |   +-- 3f2a...e1              # entry (sha256 of key)
/// +-- vitte-docs-runtime-v3/
///     +-- ...
/// ```
pub struct FileCacheStorage {
    root: PathBuf,
}

impl FileCacheStorage {
    /// Create a file-based storage at `root`, validating the layout version.
    ///
    /// Errors during validation are logged but never fatal.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        validate_format(&root);
        Self { root }
    }

    /// Root directory of this storage.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn generation_dir(&self, name: &str) -> PathBuf {
        self.root.join(dir_name(name))
    }
}

impl CacheStorage for FileCacheStorage {
    fn open(&self, name: &str) -> Arc<dyn CacheStore> {
        let dir = self.generation_dir(name);
        if let Err(e) = fs::create_dir_all(&dir).and_then(|()| fs::write(dir.join(NAME_FILE), name))
        {
            tracing::warn!(generation = name, "failed to create cache generation: {e}");
        }
        Arc::new(FileCacheStore { dir })
    }

    fn has(&self, name: &str) -> bool {
        self.generation_dir(name).join(NAME_FILE).exists()
    }

    fn delete(&self, name: &str) -> bool {
        let dir = self.generation_dir(name);
        if !dir.exists() {
            return false;
        }
        match fs::remove_dir_all(&dir) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(generation = name, "failed to delete cache generation: {e}");
                false
            }
        }
    }

    fn keys(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| fs::read_to_string(entry.path().join(NAME_FILE)).ok())
            .collect();
        names.sort();
        names
    }
}

/// A single generation backed by a directory on disk.
struct FileCacheStore {
    dir: PathBuf,
}

impl FileCacheStore {
    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(hex::encode(Sha256::digest(key.as_bytes())))
    }
}

impl CacheStore for FileCacheStore {
    fn get(&self, key: &str) -> Option<CachedResponse> {
        let (meta, body) = read_entry(&self.entry_path(key))?;
        // Hash collisions are not worth handling beyond refusing the entry
        if meta.key != key {
            return None;
        }
        Some(meta.into_response(body))
    }

    fn put(&self, key: &str, response: &CachedResponse) {
        // Write failures leave the entry missing
        if fs::create_dir_all(&self.dir).is_err() {
            return;
        }
        let Ok(meta) = serde_json::to_vec(&response.meta(key)) else {
            return;
        };
        let Ok(meta_len) = u32::try_from(meta.len()) else {
            return;
        };

        let mut buf = Vec::with_capacity(4 + meta.len() + response.body.len());
        buf.extend_from_slice(&meta_len.to_le_bytes());
        buf.extend_from_slice(&meta);
        buf.extend_from_slice(&response.body);

        if let Err(e) = fs::write(self.entry_path(key), &buf) {
            tracing::debug!(key, "cache write skipped: {e}");
        }
    }

    fn delete(&self, key: &str) -> bool {
        fs::remove_file(self.entry_path(key)).is_ok()
    }

    fn keys(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        let mut keys: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name() != NAME_FILE)
            .filter_map(|entry| read_entry(&entry.path()).map(|(meta, _)| meta.key))
            .collect();
        keys.sort();
        keys
    }
}

/// Read and split one entry file into its header and body.
fn read_entry(path: &Path) -> Option<(EntryMeta, Vec<u8>)> {
    let mut file = File::open(path).ok()?;

    let mut len_buf = [0u8; 4];
    file.read_exact(&mut len_buf).ok()?;
    let meta_len = u32::from_le_bytes(len_buf) as usize;

    let mut meta_buf = vec![0u8; meta_len];
    file.read_exact(&mut meta_buf).ok()?;
    let meta: EntryMeta = serde_json::from_slice(&meta_buf).ok()?;

    let mut body = Vec::new();
    file.read_to_end(&mut body).ok()?;
    Some((meta, body))
}

/// Map a generation name to a safe directory name.
fn dir_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Validate the layout version, wiping the directory on mismatch.
fn validate_format(root: &Path) {
    let format_file = root.join("FORMAT");

    match fs::read_to_string(&format_file) {
        Ok(stored) if stored == FORMAT_VERSION => {
            tracing::debug!("cache format matches: {FORMAT_VERSION}");
            return;
        }
        Ok(stored) => {
            tracing::info!(
                "cache format mismatch (stored={stored}, current={FORMAT_VERSION}), wiping cache"
            );
        }
        Err(_) => {
            tracing::info!("no cache FORMAT file found, initializing cache");
        }
    }

    if root.exists()
        && let Err(e) = fs::remove_dir_all(root)
    {
        tracing::warn!("failed to remove cache directory: {e}");
    }
    if let Err(e) = fs::create_dir_all(root) {
        tracing::warn!("failed to create cache directory: {e}");
        return;
    }
    if let Err(e) = fs::write(&format_file, FORMAT_VERSION) {
        tracing::warn!("failed to write cache FORMAT file: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage(tmp: &TempDir) -> FileCacheStorage {
        FileCacheStorage::new(tmp.path().join("cache"))
    }

    #[test]
    fn test_put_and_get() {
        let tmp = TempDir::new().unwrap();
        let store = storage(&tmp).open("docs-runtime-v1");

        let record = CachedResponse::ok("# Start").with_header("content-type", "text/markdown");
        store.put("GET https://docs.example/content/en/start.md", &record);

        assert_eq!(
            store.get("GET https://docs.example/content/en/start.md"),
            Some(record)
        );
        assert_eq!(store.get("GET https://docs.example/other"), None);
    }

    #[test]
    fn test_binary_body() {
        let tmp = TempDir::new().unwrap();
        let store = storage(&tmp).open("runtime");

        let body: Vec<u8> = vec![0x00, 0x01, 0x0A, 0x0D, 0xFF, 0xFE, 0x80, 0x7F];
        store.put("bin", &CachedResponse::ok(body.clone()));
        assert_eq!(store.get("bin").unwrap().body, body);
    }

    #[test]
    fn test_keys_return_original_keys() {
        let tmp = TempDir::new().unwrap();
        let store = storage(&tmp).open("runtime");
        store.put("GET /b", &CachedResponse::ok("b"));
        store.put("GET /a", &CachedResponse::ok("a"));

        assert_eq!(store.keys(), vec!["GET /a".to_owned(), "GET /b".to_owned()]);
    }

    #[test]
    fn test_generation_names_survive_sanitizing() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);
        storage.open("docs precache/v1");
        storage.open("docs-runtime-v1");

        assert_eq!(
            storage.keys(),
            vec!["docs precache/v1".to_owned(), "docs-runtime-v1".to_owned()]
        );
        assert!(storage.has("docs precache/v1"));
    }

    #[test]
    fn test_delete_generation() {
        let tmp = TempDir::new().unwrap();
        let storage = storage(&tmp);
        storage.open("old").put("k", &CachedResponse::ok("v"));

        assert!(storage.delete("old"));
        assert!(!storage.has("old"));
        assert!(!storage.delete("old"));
        assert!(storage.keys().is_empty());
    }

    #[test]
    fn test_delete_entry() {
        let tmp = TempDir::new().unwrap();
        let store = storage(&tmp).open("runtime");
        store.put("k", &CachedResponse::ok("v"));

        assert!(store.delete("k"));
        assert!(store.get("k").is_none());
    }

    #[test]
    fn test_entries_persist_across_instances() {
        let tmp = TempDir::new().unwrap();
        storage(&tmp).open("runtime").put("k", &CachedResponse::ok("kept"));

        let reopened = storage(&tmp);
        assert_eq!(reopened.open("runtime").get("k").unwrap().body, "kept");
    }

    #[test]
    fn test_format_mismatch_wipes_cache() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");
        storage(&tmp).open("runtime").put("k", &CachedResponse::ok("stale"));

        fs::write(root.join("FORMAT"), "0").unwrap();
        let reopened = FileCacheStorage::new(root.clone());

        assert!(reopened.keys().is_empty());
        assert_eq!(fs::read_to_string(root.join("FORMAT")).unwrap(), FORMAT_VERSION);
    }

    #[test]
    fn test_truncated_entry_is_a_miss() {
        let tmp = TempDir::new().unwrap();
        let store = FileCacheStore {
            dir: tmp.path().join("gen"),
        };
        fs::create_dir_all(&store.dir).unwrap();
        fs::write(store.entry_path("k"), [0xFF, 0xFF, 0xFF, 0x00, b'{']).unwrap();

        assert!(store.get("k").is_none());
    }
}
