//! Offline cache controller.
//!
//! Sits between a documentation page and the network. Every outbound request
//! is classified once ([`classify`]) and dispatched to a caching strategy
//! ([`strategy_for`]):
//!
//! | Class        | Strategy                                   |
//! |--------------|--------------------------------------------|
//! | Navigation   | network first, cached shell as fallback    |
//! | Shell asset  | precache first, network without write-back |
//! | Content      | stale-while-revalidate in the runtime cache|
//! | Locale       | stale-while-revalidate in the runtime cache|
//! | Other        | runtime cache first, network with write-back |
//!
//! Cache generations are versioned (`{app}-precache-{version}` and
//! `{app}-runtime-{version}`). Installing a version fills its precache;
//! activating it deletes every other generation.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use url::Url;
//! use vd_cache::MemoryCacheStorage;
//! use vd_offline::{Network, OfflineConfig, OfflineController, Request};
//!
//! async fn serve(network: Arc<dyn Network>) -> Result<(), Box<dyn std::error::Error>> {
//!     let config = OfflineConfig::new(Url::parse("https://docs.example/")?);
//!     let controller = OfflineController::new(config, Arc::new(MemoryCacheStorage::new()), network);
//!     controller.install().await?;
//!     controller.activate()?;
//!
//!     let request = Request::get(Url::parse("https://docs.example/content/en/start.md")?);
//!     let _response = controller.handle_fetch(&request).await;
//!     Ok(())
//! }
//! ```

mod classify;
mod config;
mod controller;
mod fallback;
mod lifecycle;
mod message;
mod network;
mod request;
#[cfg(test)]
mod testing;

pub use classify::{RequestClass, ShellManifest, Strategy, classify, should_intercept, strategy_for};
pub use config::{OfflineConfig, defaults};
pub use controller::OfflineController;
pub use lifecycle::{LifecycleError, LifecycleState};
pub use message::{ControlMessage, ControlReply};
pub use network::{FetchError, Network};
pub use request::{CacheMode, Destination, Request, RequestMode, Response, ResponseKind};
