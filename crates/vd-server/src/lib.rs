//! HTTP host for the offline documentation layer.
//!
//! This crate serves a documentation site through the offline cache
//! controller, the way a browser would run it in front of the page:
//! - Every request not matched by an API route is handed to the controller;
//!   requests it does not intercept go straight to the network
//! - `GET /api/pages/{locale}/{slug}` renders a markdown document to JSON
//! - `GET /api/print/{locale}` renders every page of a locale into one HTML
//!   document
//! - `GET /api/offline` reports the controller status
//! - `POST /api/offline` carries control-channel messages
//!
//! The network is either an upstream origin ([`HttpNetwork`]) or a local site
//! directory ([`SiteDirNetwork`]).
//!
//! # Quick Start
//!
//! ```ignore
//! use vd_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         site_root: "site".into(),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum server (vd-server)
//!                        │
//!                        ├─► /api/pages ──► DocumentLoader ──► controller ──► vd-renderer
//!                        │
//!                        ├─► /api/print ──► locale nav + DocumentLoader ──► vd-renderer
//!                        │
//!                        ├─► /api/offline ──► controller control channel
//!                        │
//!                        └─► fallback ──► controller (precache / runtime cache)
//!                                              │
//!                                              └─► Network (upstream or site dir)
//! ```

mod app;
mod error;
mod handlers;
mod loader;
mod middleware;
mod network;
mod print;
mod proxy;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use error::ServerError;
use state::AppState;
use url::Url;
use vd_cache::{CacheStorage, FileCacheStorage, MemoryCacheStorage, NullCacheStorage};
use vd_offline::{Network, OfflineController};

pub use network::{HttpNetwork, SiteDirNetwork};

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Upstream origin to mirror (`None` serves `site_root`).
    pub upstream: Option<String>,
    /// Upstream request timeout.
    pub upstream_timeout: Duration,
    /// Local site directory.
    pub site_root: PathBuf,
    /// Enable response caching.
    pub cache_enabled: bool,
    /// Directory for persistent cache generations (`None` keeps them in memory).
    pub cache_dir: Option<PathBuf>,
    /// Offline controller settings.
    pub offline: vd_config::OfflineConfig,
    /// Enable verbose output.
    pub verbose: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7979,
            upstream: None,
            upstream_timeout: Duration::from_secs(30),
            site_root: PathBuf::from("site"),
            cache_enabled: true,
            cache_dir: None,
            offline: vd_config::OfflineConfig::default(),
            verbose: false,
        }
    }
}

impl ServerConfig {
    /// Origin and base path the server answers for.
    pub fn scope(&self) -> Result<Url, url::ParseError> {
        let host = if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        Url::parse(&format!("http://{host}:{}/", self.port))
    }

    /// Controller settings under `scope`.
    pub fn offline_config(&self, scope: Url) -> vd_offline::OfflineConfig {
        let offline = &self.offline;
        let mut config = vd_offline::OfflineConfig::new(scope)
            .with_version(offline.version.clone())
            .with_shell(offline.shell.clone());
        config.app_name.clone_from(&offline.app_name);
        config.entry_point.clone_from(&offline.entry_point);
        config.offline_page.clone_from(&offline.offline_page);
        config.offline_markdown.clone_from(&offline.offline_markdown);
        config.default_locale.clone_from(&offline.default_locale);
        config
    }

    /// Cache storage for the configured mode.
    pub fn cache_storage(&self) -> Arc<dyn CacheStorage> {
        match (self.cache_enabled, &self.cache_dir) {
            (false, _) => Arc::new(NullCacheStorage),
            (true, Some(dir)) => Arc::new(FileCacheStorage::new(dir.clone())),
            (true, None) => Arc::new(MemoryCacheStorage::new()),
        }
    }

    /// Network backing the controller.
    pub fn network(&self, scope: &Url) -> Result<Arc<dyn Network>, url::ParseError> {
        Ok(match &self.upstream {
            Some(upstream) => Arc::new(HttpNetwork::new(
                Url::parse(upstream)?,
                scope.clone(),
                self.upstream_timeout,
            )),
            None => Arc::new(SiteDirNetwork::new(self.site_root.clone(), scope.clone())),
        })
    }
}

/// Build the controller, install and activate it, and wrap it in app state.
///
/// A failed install leaves the controller redundant: the server still runs,
/// passing every request to the network.
async fn prepare(config: &ServerConfig) -> Result<Arc<AppState>, ServerError> {
    let scope = config.scope()?;
    let network = config.network(&scope)?;
    let controller = Arc::new(OfflineController::new(
        config.offline_config(scope.clone()),
        config.cache_storage(),
        Arc::clone(&network),
    ));

    match controller.install().await {
        Ok(()) => controller.activate()?,
        Err(err) => {
            tracing::warn!(error = %err, "Serving without offline cache");
        }
    }

    Ok(Arc::new(AppState::new(
        controller,
        network,
        scope,
        config.verbose,
    )))
}

/// Run the server.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = prepare(&config).await?;
    let app = app::create_router(Arc::clone(&state));

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))
        .or_else(|_| SocketAddr::from_str(&format!("[{}]:{}", config.host, config.port)))?;
    tracing::info!(address = %addr, scope = %state.scope, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.controller.settle().await;
    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from vd config.
///
/// # Arguments
///
/// * `config` - vd configuration
/// * `verbose` - Enable verbose output
#[must_use]
pub fn server_config_from_vd_config(config: &vd_config::Config, verbose: bool) -> ServerConfig {
    let cache = &config.cache_resolved;
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        upstream: config.upstream.url.clone(),
        upstream_timeout: Duration::from_secs(config.upstream.timeout_secs),
        site_root: config.site_resolved.root.clone(),
        cache_enabled: cache.enabled,
        cache_dir: cache.persistent.then(|| cache.dir.clone()),
        offline: config.offline.clone(),
        verbose,
    }
}
