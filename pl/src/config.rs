//! Configuration for promptlib

use eyre::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Project-local config file name
pub const LOCAL_CONFIG_FILE: &str = ".promptlib.yml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Path to the base dataset file
    #[serde(default = "default_dataset")]
    pub dataset: PathBuf,

    /// Directory scanned for plugin packs
    #[serde(default = "default_plugins")]
    pub plugins: PathBuf,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(default)]
    pub log_level: Option<String>,

    /// Number of prompts `generate` produces when no count is given
    #[serde(default = "default_count")]
    pub default_count: usize,
}

fn default_dataset() -> PathBuf {
    PathBuf::from(crate::DEFAULT_DATASET_PATH)
}

fn default_plugins() -> PathBuf {
    PathBuf::from(crate::DEFAULT_PLUGIN_DIR)
}

fn default_count() -> usize {
    crate::DEFAULT_PROMPT_COUNT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset: default_dataset(),
            plugins: default_plugins(),
            log_level: None,
            default_count: default_count(),
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    ///
    /// Checks in order:
    /// 1. Explicit path (must exist)
    /// 2. `.promptlib.yml` in the working directory
    /// 3. `~/.config/promptlib/promptlib.yml`
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            debug!(?config_path, "Config::load: explicit path");
            return Self::load_from_file(config_path)
                .context(format!("Failed to load config from {}", config_path.display()));
        }

        for path in Self::default_paths() {
            if path.exists() {
                debug!(?path, "Config::load: found config");
                return Self::load_from_file(&path).context(format!("Failed to load config from {}", path.display()));
            }
        }

        debug!("Config::load: no config file, using defaults");
        Ok(Config::default())
    }

    /// Read just the log level, ignoring any errors
    ///
    /// Used before logging is set up, so a broken config file is reported
    /// later by [`Config::load`] instead.
    pub fn load_log_level(path: Option<&PathBuf>) -> Option<String> {
        Self::load(path).ok().and_then(|c| c.log_level)
    }

    fn default_paths() -> Vec<PathBuf> {
        [
            Some(PathBuf::from(LOCAL_CONFIG_FILE)),
            dirs::config_dir().map(|p| p.join("promptlib").join("promptlib.yml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}
