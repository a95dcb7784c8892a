//! Fallback route: every other request goes through the offline controller.
//!
//! The inbound request becomes a controller [`Request`] under the server's
//! scope. Requests the controller does not intercept go straight to the
//! network.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use url::Url;
use vd_offline::{Destination, Request, RequestMode};

use crate::error::ServerError;
use crate::state::AppState;

/// Create router that forwards everything else through the controller.
pub(crate) fn proxy_router() -> Router<Arc<AppState>> {
    Router::new().fallback(forward)
}

async fn forward(State(state): State<Arc<AppState>>, req: axum::extract::Request) -> Response {
    let request = match to_offline_request(&state.scope, &req) {
        Ok(request) => request,
        Err(err) => return err.into_response(),
    };

    let response = match state.controller.handle_fetch(&request).await {
        Some(response) => response,
        None => match state.network.fetch(&request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(url = %request.url, error = %err, "Bypassed request failed");
                return (StatusCode::BAD_GATEWAY, err.to_string()).into_response();
            }
        },
    };

    if state.verbose {
        tracing::info!(
            method = %request.method,
            url = %request.url,
            status = response.status.as_u16(),
            "Served"
        );
    }
    (response.status, response.headers, Body::from(response.body)).into_response()
}

/// Build the controller's view of an inbound request.
fn to_offline_request(
    scope: &Url,
    req: &axum::extract::Request,
) -> Result<Request, ServerError> {
    let target = req
        .uri()
        .path_and_query()
        .map_or("", |pq| pq.as_str())
        .trim_start_matches('/');
    // Keep a leading `name:` segment from parsing as a scheme
    let url = scope.join(&format!("./{target}"))?;

    let headers = req.headers();
    let mut request = Request::get(url).with_method(req.method().clone());
    request.mode = mode_of(headers);
    request.destination = destination_of(headers);
    request.headers = headers.clone();
    Ok(request)
}

fn fetch_metadata<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Request mode from `Sec-Fetch-Mode`.
fn mode_of(headers: &HeaderMap) -> RequestMode {
    match fetch_metadata(headers, "sec-fetch-mode") {
        Some("navigate") => RequestMode::Navigate,
        Some("same-origin") => RequestMode::SameOrigin,
        Some("no-cors") => RequestMode::NoCors,
        _ => RequestMode::Cors,
    }
}

/// Request destination from `Sec-Fetch-Dest`.
fn destination_of(headers: &HeaderMap) -> Destination {
    match fetch_metadata(headers, "sec-fetch-dest") {
        None | Some("empty") => Destination::Empty,
        Some("document") => Destination::Document,
        Some("script") => Destination::Script,
        Some("style") => Destination::Style,
        Some("image") => Destination::Image,
        Some("font") => Destination::Font,
        Some(_) => Destination::Other,
    }
}
