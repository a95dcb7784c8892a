//! Controller configuration.

use url::Url;

use crate::request::cache_key;

/// Versioned settings for one controller release.
///
/// Paths are relative to `scope` (for example `./index.html`), the same way
/// the shell list is written for a deployment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OfflineConfig {
    /// Origin and base path the controller is responsible for.
    pub scope: Url,
    /// Prefix of every cache generation name.
    pub app_name: String,
    /// Release token; bump it to retire old generations on activation.
    pub version: String,
    /// Shell assets fetched at install time.
    pub shell: Vec<String>,
    /// Cached entry point served to offline navigations.
    pub entry_point: String,
    /// Offline page for navigations and HTML requests.
    pub offline_page: String,
    /// Markdown placeholder for content requests.
    pub offline_markdown: String,
    /// Locale whose strings stand in for an unavailable locale file.
    pub default_locale: String,
}

/// Release defaults for the documentation shell.
pub mod defaults {
    /// Prefix of every cache generation name.
    pub const APP_NAME: &str = "vitte-docs";
    /// Release token.
    pub const VERSION: &str = "v3";
    pub const DEFAULT_LOCALE: &str = "en";
    pub const ENTRY_POINT: &str = "./index.html";
    pub const OFFLINE_PAGE: &str = "./offline.html";
    pub const OFFLINE_MARKDOWN: &str = "./content/offline.md";

    /// Shell assets precached at install time, offline documents included.
    pub const SHELL: &[&str] = &[
        "./",
        ENTRY_POINT,
        "./styles.css",
        "./app.js",
        "./search-index.json",
        "./versions.json",
        "./i18n/en.json",
        "./content/en/start.md",
        OFFLINE_PAGE,
        OFFLINE_MARKDOWN,
    ];

    /// [`SHELL`] as owned paths.
    #[must_use]
    pub fn shell() -> Vec<String> {
        SHELL.iter().map(|path| (*path).to_owned()).collect()
    }
}

impl OfflineConfig {
    /// Defaults for the documentation shell under `scope`.
    #[must_use]
    pub fn new(scope: Url) -> Self {
        Self {
            scope,
            app_name: defaults::APP_NAME.to_owned(),
            version: defaults::VERSION.to_owned(),
            shell: defaults::shell(),
            entry_point: defaults::ENTRY_POINT.to_owned(),
            offline_page: defaults::OFFLINE_PAGE.to_owned(),
            offline_markdown: defaults::OFFLINE_MARKDOWN.to_owned(),
            default_locale: defaults::DEFAULT_LOCALE.to_owned(),
        }
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    #[must_use]
    pub fn with_shell(mut self, shell: Vec<String>) -> Self {
        self.shell = shell;
        self
    }

    /// Name of the generation holding the shell for this version.
    pub fn precache_name(&self) -> String {
        format!("{}-precache-{}", self.app_name, self.version)
    }

    /// Name of the generation filled while browsing.
    pub fn runtime_name(&self) -> String {
        format!("{}-runtime-{}", self.app_name, self.version)
    }

    /// Resolve a scope-relative path.
    pub fn resolve(&self, path: &str) -> Option<Url> {
        self.scope.join(path).ok()
    }

    pub(crate) fn default_locale_path(&self) -> String {
        format!("./i18n/{}.json", self.default_locale)
    }

    /// Cache key of a scope-relative `GET`.
    pub(crate) fn key_for(&self, path: &str) -> Option<String> {
        self.resolve(path)
            .map(|url| cache_key(&http::Method::GET, &url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OfflineConfig {
        OfflineConfig::new(Url::parse("https://docs.example/vitte/").unwrap())
    }

    #[test]
    fn test_generation_names() {
        let config = config();
        assert_eq!(config.precache_name(), "vitte-docs-precache-v3");
        assert_eq!(config.runtime_name(), "vitte-docs-runtime-v3");
        assert_eq!(
            config.with_version("v4").runtime_name(),
            "vitte-docs-runtime-v4"
        );
    }

    #[test]
    fn test_default_shell_includes_offline_documents() {
        let config = config();
        assert_eq!(config.shell.len(), 10);
        assert!(config.shell.contains(&"./offline.html".to_owned()));
        assert!(config.shell.contains(&"./content/offline.md".to_owned()));
    }

    #[test]
    fn test_paths_resolve_against_scope() {
        let config = config();
        assert_eq!(
            config.key_for("./index.html").as_deref(),
            Some("GET https://docs.example/vitte/index.html")
        );
        assert_eq!(config.default_locale_path(), "./i18n/en.json");
    }
}
