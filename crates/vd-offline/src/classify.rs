//! Pure request classification and the strategy dispatch table.

use std::collections::HashSet;
use std::sync::LazyLock;

use http::Method;
use regex::Regex;
use url::Url;

use crate::config::OfflineConfig;
use crate::request::{Destination, Request, RequestMode};

static MARKDOWN_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)/content/.+\.(md|markdown)$").expect("valid markdown path regex")
});
static LOCALE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)/i18n/.+\.json$").expect("valid locale path regex"));

/// Category of an intercepted request. Every request has exactly one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestClass {
    /// Page navigation, or an untyped fetch asking for HTML.
    Navigation,
    /// Path listed in the shell manifest.
    ShellAsset,
    /// Markdown document under `content/`.
    Content,
    /// Locale strings under `i18n/`, or the `versions.json` list.
    Locale,
    /// Anything else on the same origin.
    Other,
}

/// How a class of request is satisfied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Network, then cached entry point, offline page, inline notice.
    NetworkFirst,
    /// Precache, then network without write-back.
    CacheFirst,
    /// Cached copy now, refresh in the background; network when nothing is cached.
    StaleWhileRevalidate,
    /// Cache, then network with write-back.
    ReadThrough,
}

/// Strategy dispatch table.
pub fn strategy_for(class: RequestClass) -> Strategy {
    match class {
        RequestClass::Navigation => Strategy::NetworkFirst,
        RequestClass::ShellAsset => Strategy::CacheFirst,
        RequestClass::Content | RequestClass::Locale => Strategy::StaleWhileRevalidate,
        RequestClass::Other => Strategy::ReadThrough,
    }
}

/// Set of shell paths, resolved against the controller scope.
#[derive(Clone, Debug, Default)]
pub struct ShellManifest {
    paths: HashSet<String>,
}

impl ShellManifest {
    /// Resolve every configured shell entry. Entries that do not form a valid
    /// URL are ignored.
    pub fn new(config: &OfflineConfig) -> Self {
        let paths = config
            .shell
            .iter()
            .filter_map(|path| config.resolve(path))
            .map(|url| url.path().to_owned())
            .collect();
        Self { paths }
    }

    /// Whether the URL path is a shell asset. Query strings are ignored.
    pub fn contains(&self, url: &Url) -> bool {
        self.paths.contains(url.path())
    }
}

/// Whether `url` names the published version list.
pub(crate) fn is_version_list(url: &Url) -> bool {
    url.path().ends_with("/versions.json")
}

/// Whether the controller should handle `request` at all.
///
/// Anything but same-origin `GET` is left to the default network path.
pub fn should_intercept(request: &Request, scope: &Url) -> bool {
    request.method == Method::GET && request.url.origin() == scope.origin()
}

/// Classify an intercepted request.
///
/// Checked in order: navigation, shell asset, markdown content, locale data,
/// then everything else.
pub fn classify(request: &Request, manifest: &ShellManifest) -> RequestClass {
    let is_navigation = request.mode == RequestMode::Navigate
        || (request.destination == Destination::Empty && request.accepts_html());
    if is_navigation {
        return RequestClass::Navigation;
    }
    if manifest.contains(&request.url) {
        return RequestClass::ShellAsset;
    }

    let path = request.url.path();
    if MARKDOWN_PATH.is_match(path) {
        RequestClass::Content
    } else if LOCALE_PATH.is_match(path) || is_version_list(&request.url) {
        RequestClass::Locale
    } else {
        RequestClass::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use http::header::ACCEPT;

    fn config() -> OfflineConfig {
        OfflineConfig::new(Url::parse("https://docs.example/").unwrap())
    }

    fn get(path: &str) -> Request {
        Request::get(Url::parse("https://docs.example/").unwrap().join(path).unwrap())
    }

    fn class_of(request: &Request) -> RequestClass {
        classify(request, &ShellManifest::new(&config()))
    }

    #[test]
    fn test_navigation_wins() {
        let request = Request::navigate(Url::parse("https://docs.example/app.js").unwrap());
        assert_eq!(class_of(&request), RequestClass::Navigation);

        let html_fetch = get("/anything").with_header(ACCEPT, HeaderValue::from_static("text/html"));
        assert_eq!(class_of(&html_fetch), RequestClass::Navigation);
    }

    #[test]
    fn test_shell_asset_matches_exact_path() {
        assert_eq!(class_of(&get("/styles.css")), RequestClass::ShellAsset);
        assert_eq!(class_of(&get("/styles.css?v=3")), RequestClass::ShellAsset);
        assert_eq!(class_of(&get("/content/en/start.md")), RequestClass::ShellAsset);
        assert_eq!(class_of(&get("/theme/styles.css")), RequestClass::Other);
    }

    #[test]
    fn test_content_and_locale() {
        assert_eq!(class_of(&get("/content/fr/guide.md")), RequestClass::Content);
        assert_eq!(class_of(&get("/content/fr/a/b.MARKDOWN")), RequestClass::Content);
        assert_eq!(class_of(&get("/i18n/fr.json")), RequestClass::Locale);
        assert_eq!(class_of(&get("/i18n/fr.json?x=1")), RequestClass::Locale);
        assert_eq!(class_of(&get("/content/.md")), RequestClass::Other);
        assert_eq!(class_of(&get("/img/logo.svg")), RequestClass::Other);
    }

    #[test]
    fn test_versions_list_outside_shell_is_locale_data() {
        let manifest = ShellManifest::new(&config().with_shell(vec!["./index.html".to_owned()]));
        assert_eq!(
            classify(&get("/versions.json"), &manifest),
            RequestClass::Locale
        );
    }

    #[test]
    fn test_should_intercept() {
        let scope = Url::parse("https://docs.example/").unwrap();
        assert!(should_intercept(&get("/x"), &scope));
        assert!(!should_intercept(&get("/x").with_method(Method::POST), &scope));

        let cross = Request::get(Url::parse("https://cdn.example/x.js").unwrap());
        assert!(!should_intercept(&cross, &scope));
        let other_port = Request::get(Url::parse("https://docs.example:8443/x").unwrap());
        assert!(!should_intercept(&other_port, &scope));
    }

    #[test]
    fn test_strategy_table() {
        assert_eq!(strategy_for(RequestClass::Navigation), Strategy::NetworkFirst);
        assert_eq!(strategy_for(RequestClass::ShellAsset), Strategy::CacheFirst);
        assert_eq!(strategy_for(RequestClass::Content), Strategy::StaleWhileRevalidate);
        assert_eq!(strategy_for(RequestClass::Locale), Strategy::StaleWhileRevalidate);
        assert_eq!(strategy_for(RequestClass::Other), Strategy::ReadThrough);
    }
}
