//! Markdown document loading for the pages API.
//!
//! Documents live at `content/{locale}/{slug}.md` under the scope and are
//! fetched through the offline controller like any page request. Loaded text
//! is memoized by path; offline stand-ins never are. Each client has one
//! active route: starting a load aborts that client's previous in-flight load.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use http::header::{ACCEPT, HeaderValue};
use tokio::sync::watch;
use url::Url;
use vd_offline::{Network, OfflineController, Request, Response};

/// Markdown rendered for documents that cannot be loaded.
pub(crate) const NOT_FOUND_MARKDOWN: &str = "# 404\n\nPage not found.";

const MARKDOWN_ACCEPT: &str = "text/markdown, text/plain;q=0.9";

/// Where a document's text came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DocumentStatus {
    /// The document itself.
    Found,
    /// Offline notice served by the controller in its place.
    Offline,
    /// The not-found placeholder.
    Missing,
}

/// A loaded document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Document {
    /// Scope-relative document path.
    pub(crate) path: String,
    /// Markdown source.
    pub(crate) text: Arc<str>,
    pub(crate) status: DocumentStatus,
}

/// Load outcome for a route that lost to a newer one.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("load of {path} superseded by a newer route")]
pub(crate) struct Superseded {
    pub(crate) path: String,
}

/// Loads documents through the controller.
pub(crate) struct DocumentLoader {
    controller: Arc<OfflineController>,
    network: Arc<dyn Network>,
    scope: Url,
    documents: RwLock<HashMap<String, Arc<str>>>,
    /// Latest route ticket per client with a load in flight.
    routes: Mutex<HashMap<String, watch::Sender<u64>>>,
    /// Source of route tickets, unique across clients.
    tickets: AtomicU64,
}

/// Releases a client's route entry when its newest load ends.
struct RouteGuard<'a> {
    loader: &'a DocumentLoader,
    client: &'a str,
    ticket: u64,
}

impl Drop for RouteGuard<'_> {
    fn drop(&mut self) {
        let mut routes = self
            .loader
            .routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if routes
            .get(self.client)
            .is_some_and(|sender| *sender.borrow() == self.ticket)
        {
            routes.remove(self.client);
        }
    }
}

impl DocumentLoader {
    pub(crate) fn new(
        controller: Arc<OfflineController>,
        network: Arc<dyn Network>,
        scope: Url,
    ) -> Self {
        Self {
            controller,
            network,
            scope,
            documents: RwLock::new(HashMap::new()),
            routes: Mutex::new(HashMap::new()),
            tickets: AtomicU64::new(0),
        }
    }

    /// Scope-relative path of a document.
    pub(crate) fn document_path(locale: &str, slug: &str) -> String {
        format!("content/{locale}/{slug}.md")
    }

    /// Load a document on behalf of `client`.
    ///
    /// Requests without a client id never supersede each other.
    pub(crate) async fn load(
        &self,
        client: Option<&str>,
        locale: &str,
        slug: &str,
    ) -> Result<Document, Superseded> {
        let Some(client) = client else {
            return Ok(self.load_unrouted(locale, slug).await);
        };
        let path = Self::document_path(locale, slug);

        let (guard, mut route) = self.claim_route(client);
        tokio::select! {
            document = self.load_path(path.clone()) => Ok(document),
            () = superseded(&mut route, guard.ticket) => {
                tracing::debug!(client, path = %path, "Document load superseded");
                Err(Superseded { path })
            }
        }
    }

    /// Load a document with no client, bypassing route tracking.
    pub(crate) async fn load_unrouted(&self, locale: &str, slug: &str) -> Document {
        self.load_path(Self::document_path(locale, slug)).await
    }

    /// Text of a scope-relative resource, offline stand-ins included.
    ///
    /// Not memoized.
    pub(crate) async fn fetch_resource(&self, path: &str) -> Option<String> {
        match self.fetch_text(path, "application/json, text/plain;q=0.9").await? {
            Fetched::Document(text) | Fetched::StandIn(text) => Some(text),
        }
    }

    /// Forget every memoized document.
    pub(crate) fn clear(&self) -> usize {
        let mut documents = self
            .documents
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let count = documents.len();
        documents.clear();
        count
    }

    /// Start a new route for `client`, returning a guard holding its ticket
    /// and a receiver that observes later routes.
    fn claim_route<'a>(&'a self, client: &'a str) -> (RouteGuard<'a>, watch::Receiver<u64>) {
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        let sender = routes
            .entry(client.to_owned())
            .or_insert_with(|| watch::channel(0).0);
        let ticket = self.tickets.fetch_add(1, Ordering::Relaxed) + 1;
        sender.send_replace(ticket);
        let guard = RouteGuard {
            loader: self,
            client,
            ticket,
        };
        (guard, sender.subscribe())
    }

    async fn load_path(&self, path: String) -> Document {
        if let Some(text) = self.memoized(&path) {
            return Document {
                path,
                text,
                status: DocumentStatus::Found,
            };
        }

        match self.fetch_text(&path, MARKDOWN_ACCEPT).await {
            Some(Fetched::Document(text)) => {
                let text: Arc<str> = Arc::from(text);
                self.documents
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(path.clone(), Arc::clone(&text));
                Document {
                    path,
                    text,
                    status: DocumentStatus::Found,
                }
            }
            Some(Fetched::StandIn(text)) => Document {
                path,
                text: Arc::from(text),
                status: DocumentStatus::Offline,
            },
            None => Document {
                path,
                text: Arc::from(NOT_FOUND_MARKDOWN),
                status: DocumentStatus::Missing,
            },
        }
    }

    fn memoized(&self, path: &str) -> Option<Arc<str>> {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    /// Text of a successful response, through the controller when it intercepts.
    async fn fetch_text(&self, path: &str, accept: &'static str) -> Option<Fetched> {
        let url = self.scope.join(path).ok()?;
        let request = Request::get(url).with_header(ACCEPT, HeaderValue::from_static(accept));

        let response = match self.controller.handle_fetch(&request).await {
            Some(response) => response,
            None => match self.network.fetch(&request).await {
                Ok(response) => response,
                Err(err) => {
                    tracing::warn!(path, error = %err, "Document fetch failed");
                    return None;
                }
            },
        };
        text_of(response, path)
    }
}

/// Text fetched for a document path.
enum Fetched {
    Document(String),
    /// Offline notice the controller substituted for the document.
    StandIn(String),
}

fn text_of(response: Response, path: &str) -> Option<Fetched> {
    if !response.status.is_success() {
        tracing::debug!(path, status = %response.status, "Document not available");
        return None;
    }
    let fallback = response.is_fallback();
    match String::from_utf8(response.body.to_vec()) {
        Ok(text) if fallback => {
            tracing::debug!(path, "Serving offline stand-in");
            Some(Fetched::StandIn(text))
        }
        Ok(text) => Some(Fetched::Document(text)),
        Err(err) => {
            tracing::warn!(path, error = %err, "Document is not valid UTF-8");
            None
        }
    }
}

/// Resolves once a route newer than `ticket` has been claimed.
async fn superseded(route: &mut watch::Receiver<u64>, ticket: u64) {
    loop {
        if *route.borrow_and_update() != ticket {
            return;
        }
        if route.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
