use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Literals shipped in sample configs that must never reach the Trakt API
const PLACEHOLDER_VALUES: &[&str] = &[
    "YOUR_CLIENT_ID",
    "YOUR_TRAKT_CLIENT_ID",
    "YOUR_USERNAME",
    "YOUR_TRAKT_USERNAME",
    "changeme",
];

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Trakt API client id, sent as `trakt-api-key`
    pub trakt_client_id: String,

    /// Trakt user whose history is published
    pub trakt_username: String,

    /// Number of history entries requested per fetch
    #[serde(default = "default_history_limit")]
    pub history_limit: u32,

    /// TMDB API key. Poster enrichment is skipped when unset
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// Trakt API base URL
    #[serde(default = "default_trakt_api_url")]
    pub trakt_api_url: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// CDN prefix prepended to TMDB poster paths
    #[serde(default = "default_tmdb_image_base")]
    pub tmdb_image_base: String,

    /// Per-request timeout for both upstream APIs
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum poster lookups in flight at once
    #[serde(default = "default_enrich_concurrency")]
    pub enrich_concurrency: usize,

    /// Where the build-time publisher writes its JSON
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_history_limit() -> u32 {
    12
}

fn default_trakt_api_url() -> String {
    "https://api.trakt.tv".to_string()
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_base() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_enrich_concurrency() -> usize {
    4
}

fn default_output_path() -> PathBuf {
    PathBuf::from("data/trakt.json")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        Ok(config.normalized())
    }

    /// Treats a blank TMDB key the same as a missing one
    fn normalized(mut self) -> Self {
        if self
            .tmdb_api_key
            .as_deref()
            .is_some_and(|key| key.trim().is_empty())
        {
            self.tmdb_api_key = None;
        }
        self
    }

    /// Rejects credentials and limits that would only produce upstream errors
    pub fn validate(&self) -> AppResult<()> {
        if is_placeholder(&self.trakt_client_id) {
            return Err(AppError::Config(
                "TRAKT_CLIENT_ID is not configured".to_string(),
            ));
        }
        if is_placeholder(&self.trakt_username) {
            return Err(AppError::Config(
                "TRAKT_USERNAME is not configured".to_string(),
            ));
        }
        if self.history_limit == 0 {
            return Err(AppError::Config(
                "HISTORY_LIMIT must be a positive integer".to_string(),
            ));
        }
        if self.enrich_concurrency == 0 {
            return Err(AppError::Config(
                "ENRICH_CONCURRENCY must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn posters_enabled(&self) -> bool {
        self.tmdb_api_key.is_some()
    }
}

fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.is_empty()
        || PLACEHOLDER_VALUES
            .iter()
            .any(|placeholder| placeholder.eq_ignore_ascii_case(value))
}
