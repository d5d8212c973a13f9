//! Configuration module for wfs-search.
//!
//! Handles the TOML settings file and environment variable expansion.

mod settings;

pub use settings::{
    expand_env_vars, CatalogSettings, SearchSettings, Settings, SettingsError, WorkerSettings,
};
