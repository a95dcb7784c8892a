//! Configuration management for vd.
//!
//! Parses `vd.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `upstream.url`
//! - `offline.version`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use vd_offline::defaults;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override upstream origin.
    pub upstream: Option<String>,
    /// Override local site directory.
    pub site_root: Option<PathBuf>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "vd.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Upstream origin configuration.
    pub upstream: UpstreamConfig,
    /// Local site configuration (paths are relative strings from TOML).
    site: SiteConfigRaw,
    /// Offline controller configuration.
    pub offline: OfflineConfig,
    /// Cache configuration (as parsed).
    cache: CacheConfigRaw,

    /// Resolved site configuration (set after loading).
    #[serde(skip)]
    pub site_resolved: SiteConfig,
    /// Resolved cache configuration (set after loading).
    #[serde(skip)]
    pub cache_resolved: CacheConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7979,
        }
    }
}

impl ServerConfig {
    /// Public base URL of the server, used as the offline scope.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}:{}/", self.host, self.port)
    }
}

/// Upstream origin mirrored by the server.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Origin URL. When unset, the local site directory is served.
    pub url: Option<String>,
    /// Overall timeout for one upstream request, in seconds.
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SiteConfigRaw {
    root: Option<String>,
}

/// Resolved site configuration with absolute paths.
#[derive(Debug, Default)]
pub struct SiteConfig {
    /// Directory holding `index.html`, `content/`, `i18n/` and the other shell files.
    pub root: PathBuf,
    /// Project directory for vd data (.vd/).
    pub project_dir: PathBuf,
}

/// Offline controller settings.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct OfflineConfig {
    /// Prefix of cache generation names.
    pub app_name: String,
    /// Release token; bump it on every deployment.
    pub version: String,
    /// Locale used when a locale file is unavailable.
    pub default_locale: String,
    /// Shell paths fetched at install time, relative to the site root.
    pub shell: Vec<String>,
    /// Entry point served to offline navigations.
    pub entry_point: String,
    /// Offline HTML page.
    pub offline_page: String,
    /// Offline markdown placeholder.
    pub offline_markdown: String,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            app_name: defaults::APP_NAME.to_owned(),
            version: defaults::VERSION.to_owned(),
            default_locale: defaults::DEFAULT_LOCALE.to_owned(),
            shell: defaults::shell(),
            entry_point: defaults::ENTRY_POINT.to_owned(),
            offline_page: defaults::OFFLINE_PAGE.to_owned(),
            offline_markdown: defaults::OFFLINE_MARKDOWN.to_owned(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CacheConfigRaw {
    enabled: Option<bool>,
    persistent: Option<bool>,
}

/// Resolved cache configuration.
#[derive(Debug, Default)]
pub struct CacheConfig {
    /// Whether responses are cached at all.
    pub enabled: bool,
    /// Keep cache generations on disk between runs.
    pub persistent: bool,
    /// Directory for persistent generations (.vd/cache/).
    pub dir: PathBuf,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`upstream.url`").
        field: String,
        /// Error message (e.g., "${`DOCS_ORIGIN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `vd.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, then the
    /// result is validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the merged configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(upstream) = &settings.upstream {
            self.upstream.url = Some(upstream.clone());
        }
        if let Some(site_root) = &settings.site_root {
            self.site_resolved.root.clone_from(site_root);
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.cache_resolved.enabled = cache_enabled;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        let project_dir = base.join(".vd");
        Self {
            server: ServerConfig::default(),
            upstream: UpstreamConfig::default(),
            site: SiteConfigRaw::default(),
            offline: OfflineConfig::default(),
            cache: CacheConfigRaw::default(),
            site_resolved: SiteConfig {
                root: base.join("site"),
                project_dir: project_dir.clone(),
            },
            cache_resolved: CacheConfig {
                enabled: true,
                persistent: false,
                dir: project_dir.join("cache"),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_upstream()?;
        self.validate_offline()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 would bind a random port the offline scope cannot name
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_upstream(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.upstream.url {
            require_non_empty(url, "upstream.url")?;
            require_http_url(url, "upstream.url")?;
        }
        if self.upstream.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "upstream.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_offline(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.offline.app_name, "offline.app_name")?;
        require_non_empty(&self.offline.version, "offline.version")?;
        require_non_empty(&self.offline.default_locale, "offline.default_locale")?;
        require_non_empty(&self.offline.entry_point, "offline.entry_point")?;
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        if let Some(url) = &self.upstream.url {
            self.upstream.url = Some(expand::expand_env(url, "upstream.url")?);
        }

        self.offline.version = expand::expand_env(&self.offline.version, "offline.version")?;

        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let project_dir = config_dir.join(".vd");

        self.site_resolved = SiteConfig {
            root: config_dir.join(self.site.root.as_deref().unwrap_or("site")),
            project_dir: project_dir.clone(),
        };
        self.cache_resolved = CacheConfig {
            enabled: self.cache.enabled.unwrap_or(true),
            persistent: self.cache.persistent.unwrap_or(false),
            dir: project_dir.join("cache"),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7979);
        assert_eq!(config.server.base_url(), "http://127.0.0.1:7979/");
        assert_eq!(config.site_resolved.root, PathBuf::from("/test/site"));
        assert_eq!(config.cache_resolved.dir, PathBuf::from("/test/.vd/cache"));
        assert!(config.cache_resolved.enabled);
        assert!(!config.cache_resolved.persistent);
        assert_eq!(config.upstream.url, None);
        assert_eq!(config.offline.version, "v3");
        assert_eq!(config.offline.shell.len(), 10);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 7979);
        assert_eq!(config.offline.app_name, "vitte-docs");
        assert_eq!(config.upstream.timeout_secs, 30);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "0.0.0.0"
port = 9000

[upstream]
url = "https://docs.example.com/"
timeout_secs = 5

[site]
root = "public"

[offline]
app_name = "handbook"
version = "2026-10"
shell = ["./", "./index.html"]

[cache]
enabled = true
persistent = true
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.upstream.url.as_deref(), Some("https://docs.example.com/"));
        assert_eq!(config.upstream.timeout_secs, 5);
        assert_eq!(config.site_resolved.root, PathBuf::from("/project/public"));
        assert_eq!(config.offline.app_name, "handbook");
        assert_eq!(config.offline.shell, vec!["./", "./index.html"]);
        // Unset keys inside a present section keep their defaults
        assert_eq!(config.offline.default_locale, "en");
        assert!(config.cache_resolved.persistent);
        assert_eq!(config.cache_resolved.dir, PathBuf::from("/project/.vd/cache"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            port: Some(9000),
            upstream: Some("https://mirror.example/".to_owned()),
            site_root: Some(PathBuf::from("/srv/docs")),
            cache_enabled: Some(false),
            ..Default::default()
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.server.host, "127.0.0.1"); // Unchanged
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.upstream.url.as_deref(), Some("https://mirror.example/"));
        assert_eq!(config.site_resolved.root, PathBuf::from("/srv/docs"));
        assert!(!config.cache_resolved.enabled);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.server.port, 7979);
        assert!(config.cache_resolved.enabled);
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("VD_TEST_ORIGIN", "https://docs.test.com");
            std::env::remove_var("VD_TEST_RELEASE");
        }

        let toml = r#"
[upstream]
url = "${VD_TEST_ORIGIN}/"

[offline]
version = "${VD_TEST_RELEASE:-dev}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.upstream.url.as_deref(), Some("https://docs.test.com/"));
        assert_eq!(config.offline.version, "dev");

        unsafe {
            std::env::remove_var("VD_TEST_ORIGIN");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MISSING_VAR_VD_CONFIG_TEST");
        }

        let toml = r#"
[server]
host = "${MISSING_VAR_VD_CONFIG_TEST}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("MISSING_VAR_VD_CONFIG_TEST"));
        assert!(err.to_string().contains("server.host"));
    }

    #[test]
    fn test_validate_default_config_passes() {
        Config::default_with_base(Path::new("/test")).validate().unwrap();
    }

    #[test]
    fn test_validate_server_port_zero() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.server.port = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: server.port cannot be 0");
    }

    #[test]
    fn test_validate_upstream_scheme() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.upstream.url = Some("ftp://docs.example".to_owned());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("upstream.url must start with http://"));

        config.upstream.url = Some("http://docs.example".to_owned());
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_offline_version_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.offline.version = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("offline.version cannot be empty"));
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/vd.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file_resolves_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vd.toml");
        std::fs::write(&path, "[site]\nroot = \"www\"\n[cache]\npersistent = true\n").unwrap();

        let settings = CliSettings {
            host: Some("0.0.0.0".to_owned()),
            ..Default::default()
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.site_resolved.root, dir.path().join("www"));
        assert_eq!(config.cache_resolved.dir, dir.path().join(".vd").join("cache"));
        assert!(config.cache_resolved.persistent);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_load_rejects_invalid_cli_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vd.toml");
        std::fs::write(&path, "").unwrap();

        let settings = CliSettings {
            upstream: Some("docs.example".to_owned()),
            ..Default::default()
        };
        let err = Config::load(Some(&path), Some(&settings)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
