//! `vd serve` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use vd_config::{CliSettings, Config};
use vd_server::{run_server, server_config_from_vd_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover vd.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Upstream origin to mirror (overrides config).
    #[arg(short, long, env = "VD_UPSTREAM")]
    upstream: Option<String>,

    /// Local site directory, used when no upstream is set (overrides config).
    #[arg(short, long)]
    site_root: Option<PathBuf>,

    /// Enable verbose output (log every served request).
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable caching (default: enabled).
    #[arg(long)]
    cache: Option<bool>,

    /// Disable caching.
    #[arg(long, conflicts_with = "cache")]
    no_cache: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            upstream: self.upstream,
            site_root: self.site_root,
            cache_enabled: self.no_cache.then_some(false).or(self.cache),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.info(&format!(
            "Starting server on {}",
            config.server.base_url()
        ));
        if let Some(upstream) = &config.upstream.url {
            output.info(&format!("Upstream: {upstream}"));
        } else {
            let root = &config.site_resolved.root;
            output.info(&format!("Site directory: {}", root.display()));
            if !root.is_dir() {
                output.warning(&format!(
                    "Site directory {} does not exist; serving without offline cache",
                    root.display()
                ));
            }
        }

        let cache = &config.cache_resolved;
        if !cache.enabled {
            output.info("Cache: disabled");
        } else if cache.persistent {
            ensure_project_dir(&config.site_resolved.project_dir)?;
            output.info(&format!("Cache directory: {}", cache.dir.display()));
        } else {
            output.info("Cache: in memory");
        }
        output.info(&format!(
            "Offline version: {}",
            config.offline.version
        ));

        let server_config = server_config_from_vd_config(&config, self.verbose);
        run_server(server_config)
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}

/// Ensure the `.vd/` project directory exists with a `.gitignore`.
pub(crate) fn ensure_project_dir(project_dir: &Path) -> Result<(), CliError> {
    std::fs::create_dir_all(project_dir)
        .map_err(|e| CliError::Server(format!("Failed to create project directory: {e}")))?;

    let gitignore_path = project_dir.join(".gitignore");
    if !gitignore_path.exists() {
        let _ = std::fs::write(&gitignore_path, "# Automatically created by vd\n*\n");
    }

    Ok(())
}
