//! Strategy implementations and their fallback chains.

use std::sync::Arc;

use tracing::debug;
use vd_cache::CacheStore;

use super::OfflineController;
use crate::classify::{RequestClass, is_version_list};
use crate::fallback;
use crate::request::{Request, Response, ResponseKind};

impl OfflineController {
    /// Network (or preloaded response) first. A successful answer refreshes
    /// the cached entry point; failure falls back to the entry point, the
    /// offline page, then an inline 503.
    pub(super) async fn network_first(&self, request: &Request) -> Response {
        let preloaded = if self.navigation_preload_enabled() {
            self.network.preload(request).await
        } else {
            None
        };
        let fetched = match preloaded {
            Some(response) => Ok(response),
            None => self.network.fetch(request).await,
        };

        let precache = self.precache();
        match fetched {
            Ok(response) => {
                if let Some(key) = self.config.key_for(&self.config.entry_point) {
                    store(&*precache, &key, &response);
                }
                response
            }
            Err(err) => {
                debug!(url = %request.url, error = %err, "Navigation offline");
                self.cached(&*precache, &self.config.entry_point)
                    .or_else(|| self.cached(&*precache, &self.config.offline_page))
                    .unwrap_or_else(fallback::navigation)
                    .with_kind(ResponseKind::Fallback)
            }
        }
    }

    /// Precache first, network otherwise. Never writes back.
    pub(super) async fn cache_first(&self, request: &Request) -> Response {
        if let Some(record) = self.precache().get(&request.cache_key()) {
            return Response::from_cached(record);
        }
        match self.network.fetch(request).await {
            Ok(response) => response,
            Err(err) => {
                debug!(url = %request.url, error = %err, "Shell asset offline");
                self.offline_asset(request)
            }
        }
    }

    pub(super) async fn stale_while_revalidate(
        &self,
        request: &Request,
        class: RequestClass,
    ) -> Response {
        let runtime = self.runtime();
        let key = request.cache_key();

        if let Some(record) = runtime.get(&key) {
            self.spawn_refresh(runtime, key, request.clone());
            return Response::from_cached(record);
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                store(&*runtime, &key, &response);
                response
            }
            Err(err) => {
                debug!(url = %request.url, error = %err, "Document offline");
                self.offline_document(request, class)
            }
        }
    }

    /// Runtime cache first, then network with write-back.
    pub(super) async fn read_through(&self, request: &Request) -> Response {
        let runtime = self.runtime();
        let key = request.cache_key();

        if let Some(record) = runtime.get(&key) {
            return Response::from_cached(record);
        }
        match self.network.fetch(request).await {
            Ok(response) => {
                store(&*runtime, &key, &response);
                response
            }
            Err(err) => {
                debug!(url = %request.url, error = %err, "Asset offline");
                self.offline_asset(request)
            }
        }
    }

    fn spawn_refresh(&self, store_to: Arc<dyn CacheStore>, key: String, request: Request) {
        let network = Arc::clone(&self.network);
        let handle = tokio::spawn(async move {
            match network.fetch(&request).await {
                Ok(response) => store(&*store_to, &key, &response),
                Err(err) => debug!(url = %request.url, error = %err, "Background refresh failed"),
            }
        });

        let mut refreshes = self.lock_refreshes();
        refreshes.retain(|handle| !handle.is_finished());
        refreshes.push(handle);
    }

    fn offline_document(&self, request: &Request, class: RequestClass) -> Response {
        let precache = self.precache();
        let response = if is_version_list(&request.url) {
            fallback::versions()
        } else if class == RequestClass::Locale {
            self.cached(&*precache, &self.config.default_locale_path())
                .unwrap_or_else(fallback::locale)
        } else {
            self.cached(&*precache, &self.config.offline_markdown)
                .unwrap_or_else(fallback::markdown)
        };
        response.with_kind(ResponseKind::Fallback)
    }

    fn offline_asset(&self, request: &Request) -> Response {
        if !request.accepts_html() {
            return fallback::gateway_timeout().with_kind(ResponseKind::Fallback);
        }
        let precache = self.precache();
        self.cached(&*precache, &self.config.offline_page)
            .or_else(|| self.cached(&*precache, &self.config.entry_point))
            .unwrap_or_else(fallback::html)
            .with_kind(ResponseKind::Fallback)
    }

    /// Cached `GET` of a scope-relative path.
    fn cached(&self, store: &dyn CacheStore, path: &str) -> Option<Response> {
        let key = self.config.key_for(path)?;
        store.get(&key).map(Response::from_cached)
    }
}

/// Persist `response` if it may be cached; skip it silently otherwise.
fn store(cache: &dyn CacheStore, key: &str, response: &Response) {
    if response.is_cacheable() {
        cache.put(key, &response.to_cached());
    } else {
        debug!(
            key,
            status = %response.status,
            kind = ?response.kind,
            "Not caching response"
        );
    }
}
