//! Application configuration module.
//!
//! Manages the TOML config file holding catalog credentials, the
//! search-count store connection and search tunables.

#[allow(clippy::module_inception)]
mod config;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use config::{AppConfig, StoreConfig, TmdbConfig};
pub use paths::{resolve_config_path, resolve_log_path};
