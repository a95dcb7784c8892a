//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::Arc;

use url::Url;
use vd_offline::{Network, OfflineController};

use crate::loader::DocumentLoader;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Offline controller every page request passes through.
    pub(crate) controller: Arc<OfflineController>,
    /// Network used for requests the controller does not intercept.
    pub(crate) network: Arc<dyn Network>,
    /// Markdown document loader for the pages API.
    pub(crate) loader: DocumentLoader,
    /// Origin and base path the server answers for.
    pub(crate) scope: Url,
    /// Enable verbose output.
    pub(crate) verbose: bool,
}

impl AppState {
    pub(crate) fn new(
        controller: Arc<OfflineController>,
        network: Arc<dyn Network>,
        scope: Url,
        verbose: bool,
    ) -> Self {
        let loader = DocumentLoader::new(
            Arc::clone(&controller),
            Arc::clone(&network),
            scope.clone(),
        );
        Self {
            controller,
            network,
            loader,
            scope,
            verbose,
        }
    }
}
