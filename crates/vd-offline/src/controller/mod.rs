//! The offline cache controller.

mod strategy;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use vd_cache::{CacheStorage, CacheStore};

use crate::classify::{ShellManifest, Strategy, classify, should_intercept, strategy_for};
use crate::config::OfflineConfig;
use crate::lifecycle::{LifecycleError, LifecycleState};
use crate::message::{ControlMessage, ControlReply};
use crate::network::Network;
use crate::request::{CacheMode, Request, Response, ResponseKind};

/// Decides per request how to trade freshness for availability.
///
/// The controller owns no global state: cache generations live in the
/// injected [`CacheStorage`] and fresh responses come from the injected
/// [`Network`]. A version goes through [`install`](Self::install) and
/// [`activate`](Self::activate) before [`handle_fetch`](Self::handle_fetch)
/// intercepts anything.
pub struct OfflineController {
    config: OfflineConfig,
    manifest: ShellManifest,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    state: RwLock<LifecycleState>,
    skip_waiting: AtomicBool,
    preload_enabled: AtomicBool,
    clients_claimed: AtomicBool,
    /// Outstanding background refreshes, awaited by [`settle`](Self::settle).
    refreshes: Mutex<Vec<JoinHandle<()>>>,
}

impl OfflineController {
    pub fn new(
        config: OfflineConfig,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
    ) -> Self {
        let manifest = ShellManifest::new(&config);
        Self {
            config,
            manifest,
            storage,
            network,
            state: RwLock::new(LifecycleState::Parsed),
            skip_waiting: AtomicBool::new(false),
            preload_enabled: AtomicBool::new(false),
            clients_claimed: AtomicBool::new(false),
            refreshes: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &OfflineConfig {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Installed but not yet allowed to take over.
    pub fn is_waiting(&self) -> bool {
        self.state() == LifecycleState::Installed && !self.skip_waiting.load(Ordering::SeqCst)
    }

    pub fn navigation_preload_enabled(&self) -> bool {
        self.preload_enabled.load(Ordering::SeqCst)
    }

    /// Whether open pages are routed through this controller.
    pub fn controls_clients(&self) -> bool {
        self.clients_claimed.load(Ordering::SeqCst)
    }

    /// Fetch the whole shell into this version's precache.
    ///
    /// Every entry is requested with [`CacheMode::Reload`]. Nothing is written
    /// unless every entry succeeded; on failure the controller becomes
    /// [`LifecycleState::Redundant`]. On success it asks to skip waiting.
    pub async fn install(&self) -> Result<(), LifecycleError> {
        self.transition(LifecycleState::Parsed, LifecycleState::Installing, "install")?;

        let entries = match self.fetch_shell().await {
            Ok(entries) => entries,
            Err(err) => {
                warn!(version = %self.config.version, error = %err, "Install failed");
                self.set_state(LifecycleState::Redundant);
                return Err(err);
            }
        };

        let precache = self.precache();
        for (key, response) in &entries {
            precache.put(key, &response.to_cached());
        }
        self.set_state(LifecycleState::Installed);
        self.skip_waiting.store(true, Ordering::SeqCst);

        info!(
            cache = %self.config.precache_name(),
            entries = entries.len(),
            "Precached shell"
        );
        Ok(())
    }

    async fn fetch_shell(&self) -> Result<Vec<(String, Response)>, LifecycleError> {
        let mut entries = Vec::with_capacity(self.config.shell.len());
        for path in &self.config.shell {
            let url = self
                .config
                .resolve(path)
                .ok_or_else(|| LifecycleError::InvalidShellPath { path: path.clone() })?;
            let request = Request::get(url).with_cache_mode(CacheMode::Reload);

            let response =
                self.network
                    .fetch(&request)
                    .await
                    .map_err(|err| LifecycleError::Precache {
                        url: request.url.to_string(),
                        reason: err.to_string(),
                    })?;
            if !response.status.is_success() || response.kind == ResponseKind::Opaque {
                return Err(LifecycleError::Precache {
                    url: request.url.to_string(),
                    reason: format!("unexpected status {}", response.status),
                });
            }
            entries.push((request.cache_key(), response));
        }
        Ok(entries)
    }

    /// Retire every generation that does not belong to this version and take
    /// control of open pages.
    pub fn activate(&self) -> Result<(), LifecycleError> {
        self.transition(
            LifecycleState::Installed,
            LifecycleState::Activating,
            "activate",
        )?;

        let current = [self.config.precache_name(), self.config.runtime_name()];
        for name in self.storage.keys() {
            if !current.contains(&name) && self.storage.delete(&name) {
                info!(cache = %name, "Deleted stale cache generation");
            }
        }

        if self.network.supports_navigation_preload() {
            self.preload_enabled.store(true, Ordering::SeqCst);
            debug!("Enabled navigation preload");
        }
        self.clients_claimed.store(true, Ordering::SeqCst);
        self.set_state(LifecycleState::Activated);

        info!(version = %self.config.version, "Offline controller activated");
        Ok(())
    }

    /// Answer a request, or `None` to leave it to the default network path.
    ///
    /// Requests are only intercepted once activated, and only same-origin
    /// `GET`s. Network failures never surface: every strategy ends in a
    /// fallback response.
    pub async fn handle_fetch(&self, request: &Request) -> Option<Response> {
        if self.state() != LifecycleState::Activated
            || !should_intercept(request, &self.config.scope)
        {
            return None;
        }

        let class = classify(request, &self.manifest);
        let strategy = strategy_for(class);
        debug!(url = %request.url, ?class, ?strategy, "Intercepted fetch");

        let response = match strategy {
            Strategy::NetworkFirst => self.network_first(request).await,
            Strategy::CacheFirst => self.cache_first(request).await,
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(request, class).await,
            Strategy::ReadThrough => self.read_through(request).await,
        };
        Some(response)
    }

    /// Handle a control-channel message. Returns the reply to post, if any.
    pub fn handle_message(&self, message: ControlMessage) -> Option<ControlReply> {
        match message {
            ControlMessage::SkipWaiting => {
                self.skip_waiting.store(true, Ordering::SeqCst);
                if self.state() == LifecycleState::Installed
                    && let Err(err) = self.activate()
                {
                    warn!(error = %err, "Skip waiting could not activate");
                }
                None
            }
            ControlMessage::GetVersion => Some(ControlReply::Version {
                cache: self.config.version.clone(),
            }),
            ControlMessage::ClearRuntime => {
                let name = self.config.runtime_name();
                let existed = self.storage.delete(&name);
                info!(cache = %name, existed, "Cleared runtime cache");
                Some(ControlReply::Cleared { cleared: true })
            }
        }
    }

    /// Wait for every background refresh started so far.
    pub async fn settle(&self) {
        loop {
            let handles = std::mem::take(&mut *self.lock_refreshes());
            if handles.is_empty() {
                break;
            }
            for handle in handles {
                if let Err(err) = handle.await {
                    warn!(error = %err, "Background refresh task failed");
                }
            }
        }
    }

    /// Number of background refreshes not yet awaited.
    pub fn pending_refreshes(&self) -> usize {
        self.lock_refreshes()
            .iter()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    fn lock_refreshes(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.refreshes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(
        &self,
        from: LifecycleState,
        to: LifecycleState,
        action: &'static str,
    ) -> Result<(), LifecycleError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if *state != from {
            return Err(LifecycleError::InvalidState {
                action,
                state: *state,
            });
        }
        *state = to;
        Ok(())
    }

    fn set_state(&self, to: LifecycleState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = to;
    }

    fn precache(&self) -> Arc<dyn CacheStore> {
        self.storage.open(&self.config.precache_name())
    }

    fn runtime(&self) -> Arc<dyn CacheStore> {
        self.storage.open(&self.config.runtime_name())
    }
}
