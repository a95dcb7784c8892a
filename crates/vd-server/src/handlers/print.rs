//! Printable export endpoint.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{Html, IntoResponse};

use crate::error::ServerError;
use crate::handlers::pages::valid_locale;
use crate::print;
use crate::state::AppState;

/// Handle GET /api/print/{locale}.
pub(crate) async fn get_print(
    Path(locale): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServerError> {
    if !valid_locale(&locale) {
        return Err(ServerError::InvalidPath(locale));
    }
    let html = print::build(&state.loader, &locale)
        .await
        .ok_or(ServerError::LocaleUnavailable(locale))?;

    Ok(([(header::CACHE_CONTROL, "no-cache")], Html(html)))
}
