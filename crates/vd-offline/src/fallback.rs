//! Last-resort responses synthesized when neither cache nor network answers.

use http::StatusCode;

use crate::request::Response;

const HTML: &str = "text/html; charset=utf-8";

/// Offline navigation with no cached shell.
pub(crate) fn navigation() -> Response {
    Response::new(
        StatusCode::SERVICE_UNAVAILABLE,
        "<h1>Offline</h1><p>No cached shell available.</p>",
    )
    .with_content_type(HTML)
}

/// Markdown placeholder when the offline document is not cached either.
pub(crate) fn markdown() -> Response {
    Response::ok("# Offline\nNo cached markdown.").with_content_type("text/markdown; charset=utf-8")
}

/// Degraded locale data.
pub(crate) fn locale() -> Response {
    Response::ok(r#"{"offline":true}"#).with_content_type("application/json; charset=utf-8")
}

/// Version list for an unavailable `versions.json`.
pub(crate) fn versions() -> Response {
    Response::ok(r#"["latest"]"#).with_content_type("application/json; charset=utf-8")
}

/// HTML asset with no offline page available.
pub(crate) fn html() -> Response {
    Response::ok("<h1>Offline</h1>").with_content_type(HTML)
}

/// Non-HTML asset that could not be fetched.
pub(crate) fn gateway_timeout() -> Response {
    Response::new(StatusCode::GATEWAY_TIMEOUT, "")
}
