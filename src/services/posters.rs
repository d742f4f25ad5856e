/// TMDB poster lookup
///
/// A missing poster is cosmetic, so resolution never fails: every error path
/// collapses into `None` after being logged.
use reqwest::{Client as HttpClient, Url};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{MediaKind, TmdbDetails},
};

/// Resolves a catalog id to a fully qualified poster URL
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PosterResolver: Send + Sync {
    /// Whether lookups can happen at all (an image API key is configured)
    fn is_enabled(&self) -> bool;

    /// Returns `None` for a missing id, a missing poster or any lookup failure
    async fn resolve(&self, catalog_id: Option<u64>, kind: MediaKind) -> Option<String>;
}

#[derive(Clone)]
pub struct TmdbPosterResolver {
    http_client: HttpClient,
    api_url: String,
    image_base: String,
    api_key: Option<String>,
}

impl TmdbPosterResolver {
    pub fn new(
        http_client: HttpClient,
        api_url: impl Into<String>,
        image_base: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            http_client,
            api_url: api_url.into(),
            image_base: image_base.into(),
            api_key,
        }
    }

    pub fn from_config(http_client: HttpClient, config: &Config) -> Self {
        Self::new(
            http_client,
            config.tmdb_api_url.clone(),
            config.tmdb_image_base.clone(),
            config.tmdb_api_key.clone(),
        )
    }

    fn poster_url(&self, poster_path: &str) -> String {
        let base = self.image_base.trim_end_matches('/');
        if poster_path.starts_with('/') {
            format!("{}{}", base, poster_path)
        } else {
            format!("{}/{}", base, poster_path)
        }
    }

    async fn fetch_poster_path(
        &self,
        api_key: &str,
        catalog_id: u64,
        kind: MediaKind,
    ) -> AppResult<Option<String>> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| AppError::Config(format!("Invalid TMDB_API_URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Config("TMDB_API_URL cannot be a base URL".to_string()))?
            .pop_if_empty()
            .push(kind.tmdb_segment())
            .push(&catalog_id.to_string());

        let response = self
            .http_client
            .get(url)
            .query(&[("api_key", api_key)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let details: TmdbDetails = response.json().await?;
        Ok(details.poster_path.filter(|path| !path.trim().is_empty()))
    }
}

#[async_trait::async_trait]
impl PosterResolver for TmdbPosterResolver {
    fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn resolve(&self, catalog_id: Option<u64>, kind: MediaKind) -> Option<String> {
        let api_key = self.api_key.as_deref()?;
        let catalog_id = catalog_id?;

        match self.fetch_poster_path(api_key, catalog_id, kind).await {
            Ok(Some(path)) => Some(self.poster_url(&path)),
            Ok(None) => {
                tracing::debug!(catalog_id = catalog_id, kind = ?kind, "TMDB has no poster");
                None
            }
            Err(e) => {
                tracing::warn!(
                    catalog_id = catalog_id,
                    kind = ?kind,
                    error = %e,
                    "TMDB poster lookup failed"
                );
                None
            }
        }
    }
}
