use reqwest::Client as HttpClient;

use crate::{config::Config, error::AppResult};

pub mod enrichment;
pub mod feed;
pub mod history;
pub mod posters;

pub use enrichment::Enricher;
pub use feed::RecentlyWatched;
pub use history::{HistoryProvider, TraktClient};
pub use posters::{PosterResolver, TmdbPosterResolver};

/// Builds the HTTP client shared by the Trakt and TMDB clients
///
/// Every request carries the configured timeout so a stalled upstream fails
/// the fetch instead of holding the caller forever.
pub fn build_http_client(config: &Config) -> AppResult<HttpClient> {
    let client = HttpClient::builder()
        .timeout(config.request_timeout())
        .user_agent(concat!("trakt-feed/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}
