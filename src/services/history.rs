/// Trakt watch-history client
///
/// API Flow:
/// 1. Profile (optional): /users/{username} → confirms the account exists
/// 2. History: /users/{username}/history?limit={n} → reverse-chronological entries
///
/// Every request carries the `trakt-api-version` and `trakt-api-key` headers.
use reqwest::{header::CONTENT_TYPE, Client as HttpClient, RequestBuilder, StatusCode, Url};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{HistoryItem, UserProfile},
};

pub const TRAKT_API_VERSION: &str = "2";

/// Source of a user's watch history
#[async_trait::async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Fetch the `limit` most recent history entries, newest first
    async fn fetch_history(&self, username: &str, limit: u32) -> AppResult<Vec<HistoryItem>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

#[derive(Clone)]
pub struct TraktClient {
    http_client: HttpClient,
    api_url: String,
    client_id: String,
}

impl TraktClient {
    pub fn new(
        http_client: HttpClient,
        api_url: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            api_url: api_url.into(),
            client_id: client_id.into(),
        }
    }

    pub fn from_config(http_client: HttpClient, config: &Config) -> Self {
        Self::new(
            http_client,
            config.trakt_api_url.clone(),
            config.trakt_client_id.clone(),
        )
    }

    /// Joins path segments onto the API base, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| AppError::Config(format!("Invalid TRAKT_API_URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Config("TRAKT_API_URL cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get(&self, url: Url) -> RequestBuilder {
        self.http_client
            .get(url)
            .header(CONTENT_TYPE, "application/json")
            .header("trakt-api-version", TRAKT_API_VERSION)
            .header("trakt-api-key", &self.client_id)
    }

    /// Confirms the user exists before publishing their history
    pub async fn fetch_profile(&self, username: &str) -> AppResult<UserProfile> {
        let url = self.endpoint(&["users", username])?;
        let response = self.get(url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::warn!(username = %username, "Trakt user not found");
            return Err(AppError::UserNotFound(username.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                username = %username,
                status = %status,
                body = %body,
                "Trakt profile request failed"
            );
            return Err(AppError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let profile: UserProfile = response.json().await?;
        tracing::info!(
            username = %profile.username,
            private = profile.private,
            "Trakt profile verified"
        );
        Ok(profile)
    }
}

#[async_trait::async_trait]
impl HistoryProvider for TraktClient {
    async fn fetch_history(&self, username: &str, limit: u32) -> AppResult<Vec<HistoryItem>> {
        let url = self.endpoint(&["users", username, "history"])?;

        tracing::info!(username = %username, limit = limit, "Fetching Trakt history");

        let response = self
            .get(url)
            .query(&[("limit", limit.to_string())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                username = %username,
                status = %status,
                body = %body,
                "Trakt history request failed"
            );
            return Err(AppError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let items: Vec<HistoryItem> = response.json().await?;

        tracing::info!(
            username = %username,
            items = items.len(),
            provider = self.name(),
            "Trakt history fetched"
        );

        Ok(items)
    }

    fn name(&self) -> &'static str {
        "trakt"
    }
}
