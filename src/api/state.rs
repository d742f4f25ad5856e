use std::sync::Arc;

use crate::{config::Config, error::AppResult, services::RecentlyWatched};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<RecentlyWatched>,
}

impl AppState {
    pub fn new(feed: RecentlyWatched) -> Self {
        Self {
            feed: Arc::new(feed),
        }
    }

    /// Builds the Trakt/TMDB pipeline from configuration
    pub fn from_config(config: &Config) -> AppResult<Self> {
        Ok(Self::new(RecentlyWatched::from_config(config)?))
    }
}
