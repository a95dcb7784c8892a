//! Network implementations behind the offline controller.
//!
//! The controller sees the server's own origin (`scope`). Both networks map a
//! request URL under that scope onto their backing source: an upstream HTTP
//! origin or a site directory on disk.

use std::path::{Component, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONTENT_TYPE, HeaderName};
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use percent_encoding::percent_decode_str;
use ureq::Agent;
use url::Url;
use vd_offline::{CacheMode, FetchError, Network, Request, Response};

/// Response headers copied from the upstream.
const FORWARDED_RESPONSE_HEADERS: &[&str] = &[
    "content-type",
    "cache-control",
    "etag",
    "last-modified",
    "content-language",
];

/// Request path relative to `scope`, or `None` when the URL lies outside it.
fn scope_relative<'a>(scope: &Url, url: &'a Url) -> Option<&'a str> {
    if scope.origin() != url.origin() {
        return None;
    }
    url.path().strip_prefix(scope.path())
}

/// Fetches from an upstream origin with a blocking `ureq` agent.
pub struct HttpNetwork {
    agent: Agent,
    upstream: Url,
    scope: Url,
}

impl HttpNetwork {
    /// Create a network mirroring `upstream` under `scope`.
    #[must_use]
    pub fn new(upstream: Url, scope: Url, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            upstream,
            scope,
        }
    }

    /// Upstream URL for a request under the scope.
    fn target(&self, url: &Url) -> Result<Url, FetchError> {
        let relative = scope_relative(&self.scope, url)
            .ok_or_else(|| FetchError::InvalidRequest(format!("{url} is outside {}", self.scope)))?;
        // Keep a leading `name:` segment from parsing as a scheme
        let mut target = self
            .upstream
            .join(&format!("./{relative}"))
            .map_err(|e| FetchError::InvalidRequest(e.to_string()))?;
        target.set_query(url.query());
        Ok(target)
    }
}

/// Blocking half of [`HttpNetwork::fetch`].
fn call_upstream(
    agent: &Agent,
    method: &Method,
    target: &str,
    headers: &[(HeaderName, HeaderValue)],
) -> Result<Response, FetchError> {
    let mut builder = match *method {
        Method::HEAD => agent.head(target),
        _ => agent.get(target),
    };
    for (name, value) in headers {
        builder = builder.header(name, value);
    }

    let response = builder.call().map_err(|err| match err {
        ureq::Error::Timeout(_) => FetchError::Timeout,
        other => FetchError::Unreachable(other.to_string()),
    })?;

    let status = StatusCode::from_u16(response.status().as_u16())
        .map_err(|e| FetchError::Unreachable(e.to_string()))?;
    let mut forwarded = HeaderMap::new();
    for name in FORWARDED_RESPONSE_HEADERS {
        if let Some(value) = response.headers().get(*name)
            && let Ok(value) = HeaderValue::from_bytes(value.as_bytes())
        {
            forwarded.insert(HeaderName::from_static(*name), value);
        }
    }

    let body = response
        .into_body()
        .read_to_vec()
        .map_err(|e| FetchError::Unreachable(e.to_string()))?;

    let mut response = Response::new(status, Bytes::from(body));
    response.headers = forwarded;
    Ok(response)
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        if request.method != Method::GET && request.method != Method::HEAD {
            return Ok(Response::new(StatusCode::METHOD_NOT_ALLOWED, Bytes::new()));
        }
        let target = self.target(&request.url)?;

        let mut headers: Vec<(HeaderName, HeaderValue)> = [ACCEPT, ACCEPT_LANGUAGE]
            .into_iter()
            .filter_map(|name| {
                let value = request.headers.get(&name)?.clone();
                Some((name, value))
            })
            .collect();
        if request.cache_mode != CacheMode::Default {
            headers.push((CACHE_CONTROL, HeaderValue::from_static("no-cache")));
        }

        tracing::debug!(url = %target, "Fetching from upstream");
        let agent = self.agent.clone();
        let method = request.method.clone();
        tokio::task::spawn_blocking(move || {
            call_upstream(&agent, &method, target.as_str(), &headers)
        })
        .await
        .map_err(|e| FetchError::Unreachable(e.to_string()))?
    }
}

/// Serves files from a local site directory.
pub struct SiteDirNetwork {
    root: PathBuf,
    scope: Url,
}

impl SiteDirNetwork {
    #[must_use]
    pub fn new(root: PathBuf, scope: Url) -> Self {
        Self { root, scope }
    }

    /// File backing `url`, or `None` when the path cannot name a file under the root.
    fn file_for(&self, url: &Url) -> Option<PathBuf> {
        let relative = scope_relative(&self.scope, url)?;
        let decoded = percent_decode_str(relative).decode_utf8().ok()?;

        let mut path = self.root.clone();
        for component in std::path::Path::new(decoded.as_ref()).components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }
        if decoded.is_empty() || decoded.ends_with('/') {
            path.push("index.html");
        }
        Some(path)
    }
}

#[async_trait]
impl Network for SiteDirNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        if request.method != Method::GET && request.method != Method::HEAD {
            return Ok(Response::new(StatusCode::METHOD_NOT_ALLOWED, Bytes::new()));
        }
        let Some(path) = self.file_for(&request.url) else {
            return Ok(Response::new(StatusCode::NOT_FOUND, "Not Found"));
        };

        match tokio::fs::read(&path).await {
            Ok(body) => {
                let mut response = Response::ok(body);
                response.headers.insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static(mime_for(&path.to_string_lossy())),
                );
                if request.method == Method::HEAD {
                    response.body = Bytes::new();
                }
                Ok(response)
            }
            Err(_) if !self.root.is_dir() => Err(FetchError::Unreachable(format!(
                "site root {} is not available",
                self.root.display()
            ))),
            Err(err)
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::NotFound | std::io::ErrorKind::IsADirectory
                ) =>
            {
                Ok(Response::new(StatusCode::NOT_FOUND, "Not Found"))
            }
            Err(err) => Err(FetchError::Unreachable(format!(
                "{}: {err}",
                path.display()
            ))),
        }
    }
}

/// Content type for a file path, by extension.
pub(crate) fn mime_for(path: &str) -> &'static str {
    let ext = path.rsplit('.').next().unwrap_or("");
    match ext {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "application/javascript; charset=utf-8",
        "json" => "application/json",
        "md" | "markdown" => "text/markdown; charset=utf-8",
        "txt" => "text/plain; charset=utf-8",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> Url {
        Url::parse("http://127.0.0.1:7979/").unwrap()
    }

    fn site() -> (tempfile::TempDir, SiteDirNetwork) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        std::fs::create_dir_all(dir.path().join("content/en")).unwrap();
        std::fs::write(dir.path().join("content/en/start.md"), "# Start").unwrap();
        let network = SiteDirNetwork::new(dir.path().to_path_buf(), scope());
        (dir, network)
    }

    fn get(path: &str) -> Request {
        Request::get(scope().join(path).unwrap())
    }

    #[test]
    fn test_mime_for() {
        assert_eq!(mime_for("index.html"), "text/html; charset=utf-8");
        assert_eq!(mime_for("content/en/start.md"), "text/markdown; charset=utf-8");
        assert_eq!(mime_for("i18n/en.json"), "application/json");
        assert_eq!(mime_for("LICENSE"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_site_dir_reads_file() {
        let (_dir, network) = site();
        let response = network.fetch(&get("/content/en/start.md")).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, Bytes::from_static(b"# Start"));
        assert_eq!(response.content_type(), Some("text/markdown; charset=utf-8"));
    }

    #[tokio::test]
    async fn test_site_dir_serves_index_for_directory_paths() {
        let (_dir, network) = site();
        let response = network.fetch(&get("/")).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, Bytes::from_static(b"<html></html>"));
    }

    #[tokio::test]
    async fn test_site_dir_missing_file_is_not_found() {
        let (_dir, network) = site();
        let response = network.fetch(&get("/content/en/nope.md")).await.unwrap();
        assert_eq!(response.status, StatusCode::NOT_FOUND);

        let response = network.fetch(&get("/content")).await.unwrap();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_site_dir_without_root_is_unreachable() {
        let (dir, network) = site();
        std::fs::remove_dir_all(dir.path()).unwrap();
        let result = network.fetch(&get("/index.html")).await;
        assert!(matches!(result, Err(FetchError::Unreachable(_))));
    }

    #[tokio::test]
    async fn test_site_dir_rejects_other_origins() {
        let (_dir, network) = site();
        let request = Request::get(Url::parse("https://elsewhere.example/index.html").unwrap());
        let response = network.fetch(&request).await.unwrap();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_site_dir_decodes_percent_escapes() {
        let (dir, network) = site();
        std::fs::write(dir.path().join("a b.txt"), "spaced").unwrap();
        let response = network.fetch(&get("/a%20b.txt")).await.unwrap();
        assert_eq!(response.body, Bytes::from_static(b"spaced"));
    }

    #[tokio::test]
    async fn test_site_dir_rejects_encoded_traversal() {
        let (_dir, network) = site();
        let response = network.fetch(&get("/%2e%2e/secret")).await.unwrap();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_site_dir_rejects_non_get() {
        let (_dir, network) = site();
        let request = get("/index.html").with_method(Method::POST);
        let response = network.fetch(&request).await.unwrap();
        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_http_target_keeps_path_and_query() {
        let network = HttpNetwork::new(
            Url::parse("https://docs.example/vitte/").unwrap(),
            scope(),
            Duration::from_secs(5),
        );
        let target = network
            .target(&scope().join("/content/en/start.md?v=2").unwrap())
            .unwrap();
        assert_eq!(
            target.as_str(),
            "https://docs.example/vitte/content/en/start.md?v=2"
        );
    }

    #[test]
    fn test_http_target_keeps_colon_segment_under_upstream() {
        let network = HttpNetwork::new(
            Url::parse("https://docs.example/vitte/").unwrap(),
            scope(),
            Duration::from_secs(5),
        );
        let target = network
            .target(&scope().join("/c++:notes/intro.md").unwrap())
            .unwrap();
        assert_eq!(
            target.as_str(),
            "https://docs.example/vitte/c++:notes/intro.md"
        );
    }

    #[test]
    fn test_http_target_rejects_other_origins() {
        let network = HttpNetwork::new(
            Url::parse("https://docs.example/").unwrap(),
            scope(),
            Duration::from_secs(5),
        );
        let result = network.target(&Url::parse("https://elsewhere.example/x").unwrap());
        assert!(matches!(result, Err(FetchError::InvalidRequest(_))));
    }
}
