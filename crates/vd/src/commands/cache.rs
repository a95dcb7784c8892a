//! `vd cache` commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use vd_cache::{CacheStorage, FileCacheStorage};
use vd_config::Config;

use crate::error::CliError;
use crate::output::Output;

/// Persistent cache commands.
#[derive(Subcommand)]
pub(crate) enum CacheCommand {
    /// Delete the runtime cache generation of the configured version.
    Clear(ClearArgs),
}

impl CacheCommand {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        match self {
            Self::Clear(args) => args.execute(),
        }
    }
}

/// Arguments for the cache clear command.
#[derive(Args)]
pub(crate) struct ClearArgs {
    /// Path to configuration file (default: auto-discover vd.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ClearArgs {
    fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.config.as_deref(), None)?;

        let cache = &config.cache_resolved;
        if !cache.persistent {
            output.warning("Persistent cache is disabled; nothing to clear");
            return Ok(());
        }

        let name = runtime_generation(&config);
        if clear_generation(&FileCacheStorage::new(cache.dir.clone()), &name) {
            output.success(&format!("Cleared {name}"));
        } else {
            output.info(&format!("No cached responses in {name}"));
        }
        Ok(())
    }
}

/// Runtime generation name the server uses for the configured version.
fn runtime_generation(config: &Config) -> String {
    let server = vd_server::server_config_from_vd_config(config, false);
    match server.scope() {
        Ok(scope) => server.offline_config(scope).runtime_name(),
        Err(_) => format!(
            "{}-runtime-{}",
            config.offline.app_name, config.offline.version
        ),
    }
}

fn clear_generation(storage: &dyn CacheStorage, name: &str) -> bool {
    tracing::info!(generation = name, "Clearing cache generation");
    storage.delete(name)
}
