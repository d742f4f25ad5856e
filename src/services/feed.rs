use std::sync::Arc;

use crate::{
    config::Config,
    error::AppResult,
    models::EnrichedItem,
    services::{build_http_client, Enricher, HistoryProvider, TraktClient},
};

/// History fetch followed by poster enrichment
///
/// Both the HTTP endpoint and the build-time publisher go through this type,
/// so the two always publish the same shape.
pub struct RecentlyWatched {
    history: Arc<dyn HistoryProvider>,
    enricher: Enricher,
    username: String,
    limit: u32,
}

impl RecentlyWatched {
    pub fn new(
        history: Arc<dyn HistoryProvider>,
        enricher: Enricher,
        username: impl Into<String>,
        limit: u32,
    ) -> Self {
        Self {
            history,
            enricher,
            username: username.into(),
            limit,
        }
    }

    /// Wires the Trakt and TMDB clients from configuration
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let http_client = build_http_client(config)?;
        let trakt = TraktClient::from_config(http_client.clone(), config);
        let enricher = Enricher::from_config(http_client, config);

        if !config.posters_enabled() {
            tracing::info!("TMDB_API_KEY not set, posters will not be resolved");
        }

        Ok(Self::new(
            Arc::new(trakt),
            enricher,
            config.trakt_username.clone(),
            config.history_limit,
        ))
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub async fn load(&self) -> AppResult<Vec<EnrichedItem>> {
        self.load_with_limit(self.limit).await
    }

    pub async fn load_with_limit(&self, limit: u32) -> AppResult<Vec<EnrichedItem>> {
        let items = self.history.fetch_history(&self.username, limit).await?;
        Ok(self.enricher.enrich(items).await)
    }
}
