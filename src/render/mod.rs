//! Recently-watched feed rendering
//!
//! The feed is fetched from the same-origin proxy endpoint (or read from the
//! published JSON file), rendered to a single HTML fragment and written into
//! the page's feed container in one replacement.

use reqwest::Client as HttpClient;

use crate::{
    error::{AppError, AppResult},
    models::EnrichedItem,
};

pub mod html;
pub mod page;

pub use html::{detail_url, placeholder_poster, render_error, render_feed, type_label};
pub use page::{inject_into_container, DEFAULT_CONTAINER_ID};

pub const DEFAULT_SITE_URL: &str = "https://trakt.tv";

pub struct FeedRenderer {
    http_client: HttpClient,
    endpoint: String,
    site_url: String,
}

impl FeedRenderer {
    pub fn new(
        http_client: HttpClient,
        endpoint: impl Into<String>,
        site_url: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
            site_url: site_url.into(),
        }
    }

    /// Fetches the published feed from the proxy endpoint
    pub async fn fetch(&self) -> AppResult<Vec<EnrichedItem>> {
        let response = self.http_client.get(&self.endpoint).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let items: Vec<EnrichedItem> = response.json().await?;
        tracing::debug!(endpoint = %self.endpoint, items = items.len(), "Feed fetched");
        Ok(items)
    }

    /// Fetches and renders; a failed fetch renders the error block
    pub async fn render(&self) -> String {
        render_result(self.fetch().await, &self.site_url)
    }
}

/// Turns a settled fetch into markup, never leaving the loading state behind
pub fn render_result(result: AppResult<Vec<EnrichedItem>>, site_url: &str) -> String {
    match result {
        Ok(items) => render_feed(&items, site_url),
        Err(e) => {
            tracing::error!(error = %e, "Error fetching Trakt data");
            let message = match &e {
                AppError::Upstream { status, body } if !body.is_empty() => {
                    format!("HTTP error! status: {} - {}", status, body)
                }
                AppError::Upstream { status, .. } => format!("HTTP error! status: {}", status),
                other => other.to_string(),
            };
            render_error(&message)
        }
    }
}
