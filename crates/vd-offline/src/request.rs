//! Request and response values passed between the host and the controller.

use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use url::Url;
use vd_cache::CachedResponse;

/// How the request was initiated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RequestMode {
    /// Top-level page navigation.
    Navigate,
    SameOrigin,
    NoCors,
    #[default]
    Cors,
}

/// What the response will be used for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Destination {
    /// Programmatic fetch with no specific destination.
    #[default]
    Empty,
    Document,
    Script,
    Style,
    Image,
    Font,
    Other,
}

/// HTTP cache interaction requested by the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CacheMode {
    #[default]
    Default,
    /// Bypass any intermediate HTTP cache and go to the origin.
    Reload,
    NoStore,
}

/// An outbound request seen by the controller.
#[derive(Clone, Debug)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub mode: RequestMode,
    pub destination: Destination,
    pub headers: HeaderMap,
    pub cache_mode: CacheMode,
}

impl Request {
    /// A plain `GET` fetch.
    #[must_use]
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            mode: RequestMode::default(),
            destination: Destination::default(),
            headers: HeaderMap::new(),
            cache_mode: CacheMode::default(),
        }
    }

    /// A top-level navigation to `url`.
    #[must_use]
    pub fn navigate(url: Url) -> Self {
        Self {
            mode: RequestMode::Navigate,
            destination: Destination::Document,
            ..Self::get(url).with_header(ACCEPT, HeaderValue::from_static("text/html"))
        }
    }

    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_cache_mode(mut self, cache_mode: CacheMode) -> Self {
        self.cache_mode = cache_mode;
        self
    }

    /// Whether the `Accept` header asks for HTML.
    pub fn accepts_html(&self) -> bool {
        self.headers
            .get_all(ACCEPT)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .any(|value| value.contains("text/html"))
    }

    /// Key under which the response to this request is stored.
    pub fn cache_key(&self) -> String {
        cache_key(&self.method, &self.url)
    }
}

pub(crate) fn cache_key(method: &Method, url: &Url) -> String {
    format!("{method} {url}")
}

/// Response type as exposed to the page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResponseKind {
    /// Same-origin response, fully readable.
    #[default]
    Basic,
    /// Cross-origin response the server opted into sharing.
    Cors,
    /// Cross-origin `no-cors` response; status and body cannot be inspected.
    Opaque,
    /// Stand-in produced by the controller when neither network nor the
    /// requested cache entry answered.
    Fallback,
}

/// A response produced by the network, a cache or a fallback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub kind: ResponseKind,
}

impl Response {
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
            kind: ResponseKind::Basic,
        }
    }

    /// A `200 OK` basic response.
    #[must_use]
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: &'static str) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: ResponseKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE)?.to_str().ok()
    }

    /// Only complete `200` responses from the network that are not opaque
    /// may be stored.
    pub fn is_cacheable(&self) -> bool {
        self.status == StatusCode::OK && matches!(self.kind, ResponseKind::Basic | ResponseKind::Cors)
    }

    /// Whether the controller substituted this response for the one requested.
    pub fn is_fallback(&self) -> bool {
        self.kind == ResponseKind::Fallback
    }

    pub(crate) fn to_cached(&self) -> CachedResponse {
        let headers = self
            .headers
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((name.as_str().to_owned(), value.to_owned()))
            })
            .collect();
        CachedResponse::new(self.status.as_u16(), headers, self.body.clone())
    }

    pub(crate) fn from_cached(record: CachedResponse) -> Self {
        let mut headers = HeaderMap::with_capacity(record.headers.len());
        for (name, value) in &record.headers {
            // Entries were written from valid headers; skip anything that no longer parses
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.append(name, value);
            }
        }
        Self {
            status: StatusCode::from_u16(record.status).unwrap_or(StatusCode::OK),
            headers,
            body: record.body,
            kind: ResponseKind::Basic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_navigate_accepts_html() {
        let request = Request::navigate(url("https://docs.example/"));
        assert_eq!(request.mode, RequestMode::Navigate);
        assert!(request.accepts_html());
        assert!(!Request::get(url("https://docs.example/app.js")).accepts_html());
    }

    #[test]
    fn test_cache_key() {
        let request = Request::get(url("https://docs.example/content/en/start.md?v=2"));
        assert_eq!(
            request.cache_key(),
            "GET https://docs.example/content/en/start.md?v=2"
        );
    }

    #[test]
    fn test_is_cacheable() {
        assert!(Response::ok("x").is_cacheable());
        assert!(Response::ok("x").with_kind(ResponseKind::Cors).is_cacheable());
        assert!(!Response::ok("x").with_kind(ResponseKind::Opaque).is_cacheable());
        assert!(!Response::ok("x").with_kind(ResponseKind::Fallback).is_cacheable());
        assert!(!Response::new(StatusCode::NOT_FOUND, "x").is_cacheable());
        assert!(!Response::new(StatusCode::NO_CONTENT, "").is_cacheable());
    }

    #[test]
    fn test_cached_record_keeps_headers() {
        let response = Response::ok("# Hi").with_content_type("text/markdown; charset=utf-8");
        let restored = Response::from_cached(response.to_cached());
        assert_eq!(restored, response);
        assert_eq!(restored.content_type(), Some("text/markdown; charset=utf-8"));
    }
}
