//! TOML-based configuration for wfs-search.
//!
//! Supports a config file (wfs-search.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! log_level = "debug"
//!
//! [search]
//! page_size = 1000
//! concurrency = 4
//! default_max_results = 5000
//!
//! [worker]
//! path = "${HOME}/bin/wfs-worker"
//! timeout_seconds = 60
//! args = ["-url", "https://www.dov.vlaanderen.be/geoserver/wfs"]
//!
//! [catalog]
//! cache_enabled = true
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Default tracing filter, overridden by `RUST_LOG`.
    pub log_level: String,

    /// Pagination settings.
    pub search: SearchSettings,

    /// Worker configuration.
    pub worker: WorkerSettings,

    /// Catalog configuration.
    pub catalog: CatalogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            search: SearchSettings::default(),
            worker: WorkerSettings::default(),
            catalog: CatalogSettings::default(),
        }
    }
}

/// Pagination settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Records requested per page.
    pub page_size: usize,

    /// Maximum pages in flight; 1 fetches sequentially.
    pub concurrency: usize,

    /// Cap applied when a search does not set one.
    pub default_max_results: Option<usize>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            page_size: 1000,
            concurrency: 1,
            default_max_results: None,
        }
    }
}

/// Worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerSettings {
    /// Path to the worker binary (supports ${ENV_VAR} expansion).
    pub path: Option<String>,

    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,

    /// Extra command-line arguments for the worker.
    pub args: Vec<String>,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            path: None,
            timeout_seconds: 30,
            args: Vec::new(),
        }
    }
}

impl WorkerSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Arguments with environment variables expanded.
    pub fn resolved_args(&self) -> Result<Vec<String>, SettingsError> {
        self.args.iter().map(|a| expand_env_vars(a)).collect()
    }
}

/// Catalog configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Keep loaded catalogs for the lifetime of a session.
    pub cache_enabled: bool,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            cache_enabled: true,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `WFS_SEARCH_CONFIG`
    /// 2. `./wfs-search.toml`
    /// 3. `~/.config/wfs-search/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("WFS_SEARCH_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("wfs-search.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("wfs-search").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Reject values the assembler cannot work with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.search.page_size == 0 {
            return Err(SettingsError::InvalidConfig(
                "search.page_size must be at least 1".to_string(),
            ));
        }
        if self.search.concurrency == 0 {
            return Err(SettingsError::InvalidConfig(
                "search.concurrency must be at least 1".to_string(),
            ));
        }
        if self.search.default_max_results == Some(0) {
            return Err(SettingsError::InvalidConfig(
                "search.default_max_results must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the worker binary path.
    ///
    /// Returns the configured path, or searches common locations and `PATH`.
    pub fn worker_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.worker.path {
            let expanded = expand_env_vars(path).ok()?;
            return Some(PathBuf::from(expanded));
        }

        let candidates = ["wfs-worker", "./wfs-worker", "./worker/wfs-worker"];

        for candidate in candidates {
            let path = PathBuf::from(candidate);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(output) = std::process::Command::new("which")
            .arg("wfs-worker")
            .output()
        {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    return Some(PathBuf::from(path));
                }
            }
        }

        None
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name = if chars.peek() == Some(&'{') {
            chars.next();
            let mut name = String::new();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                name.push(ch);
            }
            name
        } else {
            let mut name = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_alphanumeric() || ch == '_' {
                    name.push(ch);
                    chars.next();
                } else {
                    break;
                }
            }
            if name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
            name
        };

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
