//! The network seam.

use async_trait::async_trait;

use crate::request::{Request, Response};

/// Errors from the network layer.
///
/// An HTTP error status is not a fetch error: it arrives as a [`Response`].
/// Only failures to obtain any response at all end up here.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("network unreachable: {0}")]
    Unreachable(String),

    #[error("request timed out")]
    Timeout,

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Source of fresh responses.
///
/// Implemented by the host (an HTTP client, a directory on disk, a test
/// double). The controller never talks to the network any other way.
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform the request.
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError>;

    /// Whether navigations can be preloaded in parallel with controller startup.
    fn supports_navigation_preload(&self) -> bool {
        false
    }

    /// Response to a navigation started ahead of time, if any.
    ///
    /// Only consulted after preload has been enabled during activation.
    async fn preload(&self, _request: &Request) -> Option<Response> {
        None
    }
}
