use std::sync::Arc;
use std::time::Duration;

use futures::{stream, StreamExt};
use reqwest::Client as HttpClient;

use crate::{
    config::Config,
    models::{EnrichedItem, HistoryItem},
    services::posters::{PosterResolver, TmdbPosterResolver},
};

/// Attaches poster URLs to history entries
///
/// Lookups run with at most `concurrency` in flight and results come back in
/// input order. Each lookup is bounded by `timeout`; a lookup that runs out
/// of time leaves the entry without a poster.
pub struct Enricher {
    resolver: Arc<dyn PosterResolver>,
    concurrency: usize,
    timeout: Duration,
}

impl Enricher {
    pub fn new(resolver: Arc<dyn PosterResolver>, concurrency: usize, timeout: Duration) -> Self {
        Self {
            resolver,
            concurrency: concurrency.max(1),
            timeout,
        }
    }

    pub fn from_config(http_client: HttpClient, config: &Config) -> Self {
        let resolver = TmdbPosterResolver::from_config(http_client, config);
        Self::new(
            Arc::new(resolver),
            config.enrich_concurrency,
            config.request_timeout(),
        )
    }

    pub async fn enrich(&self, items: Vec<HistoryItem>) -> Vec<EnrichedItem> {
        if !self.resolver.is_enabled() {
            tracing::debug!(items = items.len(), "Poster enrichment disabled");
            return items.into_iter().map(EnrichedItem::unenriched).collect();
        }

        let total = items.len();
        let enriched: Vec<EnrichedItem> = stream::iter(items)
            .map(|item| self.enrich_one(item))
            .buffered(self.concurrency)
            .collect()
            .await;

        tracing::info!(
            items = total,
            posters = enriched.iter().filter(|e| e.poster_url.is_some()).count(),
            "Poster enrichment complete"
        );

        enriched
    }

    async fn enrich_one(&self, item: HistoryItem) -> EnrichedItem {
        let catalog_id = item.catalog_id();
        let lookup = self.resolver.resolve(catalog_id, item.media_kind());

        let poster_url = match tokio::time::timeout(self.timeout, lookup).await {
            Ok(poster_url) => poster_url,
            Err(_) => {
                tracing::warn!(
                    catalog_id = ?catalog_id,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Poster lookup timed out"
                );
                None
            }
        };

        EnrichedItem::new(item, poster_url)
    }
}
