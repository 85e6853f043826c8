//! `AppConfig` struct and TOML read/write.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use cinefind_core::{ControllerConfig, DEFAULT_TRENDING_LIMIT, StaleResponsePolicy};
use serde::{Deserialize, Serialize};

/// Default TMDB API base URL.
pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3/";

/// Top-level application configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Movie catalog settings.
    #[serde(default)]
    pub tmdb: TmdbConfig,
    /// Search-count store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Search behaviour.
    #[serde(default)]
    pub search: SearchConfig,
}

/// TMDB catalog configuration.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TmdbConfig {
    /// v4 read access token. `TMDB_API_TOKEN` overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// API base URL.
    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,
    /// Response language.
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: default_tmdb_base_url(),
            language: default_language(),
        }
    }
}

/// Appwrite document store configuration.
///
/// All of `endpoint`, `project_id`, `database_id` and `collection_id` must
/// be set for trending and search counting to be enabled.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// API endpoint, e.g. `https://cloud.appwrite.io/v1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Project ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Database ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_id: Option<String>,
    /// Collection holding the search counts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    /// Server API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl StoreConfig {
    /// Returns `true` when every required field is set.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [
            &self.endpoint,
            &self.project_id,
            &self.database_id,
            &self.collection_id,
        ]
        .iter()
        .all(|v| v.as_deref().is_some_and(|s| !s.is_empty()))
    }
}

/// Search behaviour configuration.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchConfig {
    /// Debounce window in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Number of trending searches shown.
    #[serde(default = "default_trending_limit")]
    pub trending_limit: u32,
    /// Ignore responses to superseded requests.
    #[serde(default = "default_discard_stale")]
    pub discard_stale: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            trending_limit: default_trending_limit(),
            discard_stale: default_discard_stale(),
        }
    }
}

impl SearchConfig {
    /// Converts to the core controller settings.
    #[must_use]
    pub const fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            debounce: Duration::from_millis(self.debounce_ms),
            trending_limit: self.trending_limit,
            stale_policy: if self.discard_stale {
                StaleResponsePolicy::DiscardSuperseded
            } else {
                StaleResponsePolicy::LastCompletion
            },
        }
    }
}

fn default_tmdb_base_url() -> String {
    String::from(DEFAULT_TMDB_BASE_URL)
}

fn default_language() -> String {
    String::from("en-US")
}

const fn default_debounce_ms() -> u64 {
    500
}

const fn default_trending_limit() -> u32 {
    DEFAULT_TRENDING_LIMIT
}

const fn default_discard_stale() -> bool {
    true
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Saves config to a TOML file, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("failed to serialize config to TOML")?;
        std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Overrides file values with environment variables.
    ///
    /// `lookup` is `std::env::var(..).ok()` in production. Empty values
    /// are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());
        let overrides = [
            ("TMDB_API_TOKEN", &mut self.tmdb.api_token),
            ("APPWRITE_ENDPOINT", &mut self.store.endpoint),
            ("APPWRITE_PROJECT_ID", &mut self.store.project_id),
            ("APPWRITE_DATABASE_ID", &mut self.store.database_id),
            ("APPWRITE_COLLECTION_ID", &mut self.store.collection_id),
            ("APPWRITE_API_KEY", &mut self.store.api_key),
        ];
        for (name, slot) in overrides {
            if let Some(value) = var(name) {
                *slot = Some(value);
            }
        }
    }
}
