//! Control channel and status for the offline controller.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use vd_offline::ControlMessage;

use crate::state::AppState;

/// Response for GET /api/offline.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    version: String,
    state: String,
    waiting: bool,
    navigation_preload: bool,
    controls_clients: bool,
    pending_refreshes: usize,
}

/// Handle GET /api/offline.
pub(crate) async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let controller = &state.controller;
    Json(StatusResponse {
        version: controller.config().version.clone(),
        state: controller.state().to_string(),
        waiting: controller.is_waiting(),
        navigation_preload: controller.navigation_preload_enabled(),
        controls_clients: controller.controls_clients(),
        pending_refreshes: controller.pending_refreshes(),
    })
}

/// Handle POST /api/offline.
///
/// Messages with a reply answer `200` with the reply as JSON; the others
/// answer `204`.
pub(crate) async fn post_message(
    State(state): State<Arc<AppState>>,
    Json(message): Json<ControlMessage>,
) -> Response {
    tracing::debug!(?message, "Control message received");
    let reply = state.controller.handle_message(message);

    if message == ControlMessage::ClearRuntime {
        let forgotten = state.loader.clear();
        tracing::info!(documents = forgotten, "Cleared memoized documents");
    }

    match reply {
        Some(reply) => Json(reply).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
