//! Pages API endpoint.
//!
//! Loads a markdown document through the offline controller, renders it and
//! returns the title, table of contents and HTML content as JSON.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, header};
use axum::response::IntoResponse;
use serde::Serialize;
use vd_renderer::{MarkdownRenderer, TocEntry};

use crate::error::ServerError;
use crate::loader::DocumentStatus;
use crate::state::AppState;

/// Header identifying the page (tab) a request belongs to.
pub(crate) const CLIENT_HEADER: &str = "x-vd-client";

/// Response for GET /api/pages/{locale}/{slug}.
#[derive(Debug, Serialize)]
struct PageResponse {
    /// Plain text of the first level-1 heading.
    title: Option<String>,
    /// Level-2 and level-3 headings in document order.
    toc: Vec<TocEntry>,
    /// Rendered HTML content.
    content: String,
}

/// Handle GET /api/pages/{locale}/{slug}.
pub(crate) async fn get_page(
    Path((locale, slug)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ServerError> {
    validate(&locale, &slug)?;
    let client = headers
        .get(CLIENT_HEADER)
        .and_then(|value| value.to_str().ok());

    let document = state.loader.load(client, &locale, &slug).await?;
    if state.verbose {
        match document.status {
            DocumentStatus::Found => {}
            DocumentStatus::Offline => {
                tracing::warn!(path = %document.path, "Serving offline notice");
            }
            DocumentStatus::Missing => tracing::warn!(path = %document.path, "Document not found"),
        }
    }

    let result = MarkdownRenderer::new()
        .with_title_extraction()
        .render(&document.text);

    let response = PageResponse {
        title: result.title,
        toc: result.toc,
        content: result.html,
    };

    Ok((
        [(header::CACHE_CONTROL, "no-cache")],
        Json(response),
    ))
}

/// Locale usable as a single path segment.
pub(crate) fn valid_locale(locale: &str) -> bool {
    !locale.is_empty()
        && locale
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Slug that stays under its locale directory.
pub(crate) fn valid_slug(slug: &str) -> bool {
    slug.split('/').all(|segment| {
        !segment.is_empty() && segment != "." && segment != ".." && !segment.contains('\\')
    })
}

/// Reject locales and slugs that could step outside `content/`.
fn validate(locale: &str, slug: &str) -> Result<(), ServerError> {
    if valid_locale(locale) && valid_slug(slug) {
        Ok(())
    } else {
        Err(ServerError::InvalidPath(format!("{locale}/{slug}")))
    }
}
