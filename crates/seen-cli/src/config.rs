//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use seen_core::DEFAULT_STORAGE_KEY;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the SQLite store file.
    pub storage_path: PathBuf,
    /// Key of the persisted last-seen entry.
    pub storage_key: String,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            storage_path: data_dir.join("seen.db"),
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (SEEN_*)
        figment = figment.merge(Env::prefixed("SEEN_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for seen.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("seen"))
}

/// Returns the platform-specific data directory for seen.
///
/// On Linux: `~/.local/share/seen`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("seen"))
}
