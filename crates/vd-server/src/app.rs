//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::security;
use crate::proxy;
use crate::state::AppState;

/// Create the application router.
///
/// # Arguments
///
/// * `state` - Shared application state
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route(
            "/api/pages/{locale}/{*slug}",
            get(handlers::pages::get_page),
        )
        .route("/api/print/{locale}", get(handlers::print::get_print))
        .route(
            "/api/offline",
            get(handlers::offline::get_status).post(handlers::offline::post_message),
        );

    Router::new()
        .merge(api_routes)
        .merge(proxy::proxy_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(axum::middleware::from_fn(security::security_headers)),
        )
        .with_state(state)
}
