//! Scripted network double for controller tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use http::StatusCode;

use crate::network::{FetchError, Network};
use crate::request::{CacheMode, Request, Response};

/// Serves canned responses by absolute URL and records every request.
#[derive(Default)]
pub(crate) struct ScriptedNetwork {
    routes: Mutex<HashMap<String, Response>>,
    preload: Mutex<Option<Response>>,
    offline: AtomicBool,
    requests: Mutex<Vec<(String, CacheMode)>>,
}

impl ScriptedNetwork {
    pub(crate) fn route(&self, url: &str, response: Response) {
        self.routes.lock().unwrap().insert(url.to_owned(), response);
    }

    pub(crate) fn set_preload(&self, response: Response) {
        *self.preload.lock().unwrap() = Some(response);
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub(crate) fn requests(&self) -> Vec<(String, CacheMode)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, FetchError> {
        self.requests
            .lock()
            .unwrap()
            .push((request.url.to_string(), request.cache_mode));
        if self.offline.load(Ordering::SeqCst) {
            return Err(FetchError::Unreachable("offline".to_owned()));
        }
        let routes = self.routes.lock().unwrap();
        Ok(routes
            .get(request.url.as_str())
            .cloned()
            .unwrap_or_else(|| Response::new(StatusCode::NOT_FOUND, "missing")))
    }

    fn supports_navigation_preload(&self) -> bool {
        self.preload.lock().unwrap().is_some()
    }

    async fn preload(&self, _request: &Request) -> Option<Response> {
        self.preload.lock().unwrap().clone()
    }
}
