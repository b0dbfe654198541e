//! Settings for bootstrap installation.
//!
//! Loaded from `plgen.toml` in the working directory, falling back to the
//! user config directory. The database URL can always be overridden with
//! `PLGEN_DATABASE_URL`.
//!
//! ```toml
//! database_url = "postgres://localhost/mydb"
//! base_dir = "/srv/myproject"
//! python_lib = "/usr/lib/python3.11/site-packages"
//! django_settings_module = "myproject.settings"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{PlGenError, PlGenResult};

/// Environment variable overriding the configured database URL.
pub const DATABASE_URL_VAR: &str = "PLGEN_DATABASE_URL";

const CONFIG_FILE: &str = "plgen.toml";

/// Project settings consumed by the bootstrap routines.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Connection URL; `PLGEN_DATABASE_URL` wins over this.
    #[serde(default)]
    pub database_url: Option<String>,
    /// Project base directory, passed verbatim to the interpreter.
    pub base_dir: String,
    /// The interpreter's own library path, passed verbatim.
    pub python_lib: String,
    /// Settings module for Django initialization, when used.
    #[serde(default)]
    pub django_settings_module: Option<String>,
}

impl Settings {
    /// Load settings from the first `plgen.toml` found.
    pub fn load() -> PlGenResult<Self> {
        let path = Self::locate().ok_or_else(|| {
            PlGenError::config("plgen.toml not found in the working directory or user config dir")
        })?;
        Self::from_path(&path)
    }

    /// Load settings from an explicit file path.
    pub fn from_path(path: &Path) -> PlGenResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML text.
    pub fn from_toml(content: &str) -> PlGenResult<Self> {
        toml::from_str(content).map_err(|e| PlGenError::config(e.to_string()))
    }

    /// `plgen.toml` in the working directory, else `<config dir>/plgen/`.
    pub fn locate() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            return Some(local);
        }
        let global = dirs::config_dir()?.join("plgen").join(CONFIG_FILE);
        global.exists().then_some(global)
    }

    /// Effective database URL: environment override, then the config value.
    pub fn database_url(&self) -> Option<String> {
        std::env::var(DATABASE_URL_VAR)
            .ok()
            .or_else(|| self.database_url.clone())
    }
}
