//! Stored response record.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A response as persisted in a [`CacheStore`](crate::CacheStore).
///
/// Only the parts needed to replay the response are kept: status, headers
/// (in order, duplicates allowed) and the body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedResponse {
    /// HTTP status code.
    pub status: u16,
    /// Header name/value pairs.
    pub headers: Vec<(String, String)>,
    /// Response body.
    pub body: Bytes,
}

impl CachedResponse {
    /// Create a record from its parts.
    #[must_use]
    pub fn new(status: u16, headers: Vec<(String, String)>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// A `200` record with no headers.
    #[must_use]
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(200, Vec::new(), body)
    }

    /// Attach a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First value of a header, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn meta(&self, key: &str) -> EntryMeta {
        EntryMeta {
            key: key.to_owned(),
            status: self.status,
            headers: self.headers.clone(),
        }
    }
}

/// Header block written in front of the body by the file store.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct EntryMeta {
    /// Original cache key (file names are hashed).
    pub(crate) key: String,
    pub(crate) status: u16,
    pub(crate) headers: Vec<(String, String)>,
}

impl EntryMeta {
    pub(crate) fn into_response(self, body: Vec<u8>) -> CachedResponse {
        CachedResponse::new(self.status, self.headers, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let record = CachedResponse::ok("x").with_header("Content-Type", "text/markdown");
        assert_eq!(record.header("content-type"), Some("text/markdown"));
        assert_eq!(record.header("etag"), None);
    }

    #[test]
    fn test_meta_round_trip_keeps_key_and_headers() {
        let record = CachedResponse::new(200, vec![("a".into(), "1".into())], "body");
        let meta = record.meta("GET https://x/");
        assert_eq!(meta.key, "GET https://x/");

        let json = serde_json::to_vec(&meta).unwrap();
        let back: EntryMeta = serde_json::from_slice(&json).unwrap();
        assert_eq!(back.into_response(b"body".to_vec()), record);
    }
}
