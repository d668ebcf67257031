//! Application configuration
//!
//! Loaded from `~/.gauntlet/config.toml` when present; every field has a
//! default so a missing or partial file is fine.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::util::paths::config_path;

/// Application configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Catalog file to load when the CLI is not given one explicitly
    pub catalog_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    catalog_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    /// Load configuration from a specific path. A missing file yields
    /// defaults; a malformed file is logged and ignored.
    pub fn load_from(path: &Path) -> Self {
        let Ok(raw) = fs::read_to_string(path) else {
            return Self::default();
        };

        match toml::from_str::<RawConfig>(&raw) {
            Ok(parsed) => Self {
                catalog_path: parsed.catalog_path,
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring malformed config file");
                Self::default()
            }
        }
    }
}
