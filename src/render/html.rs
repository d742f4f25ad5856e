use maud::{html, Markup};
use reqwest::Url;

use crate::models::{EnrichedItem, HistoryItem, HistoryType};

pub const PLACEHOLDER_POSTER_BASE: &str = "https://via.placeholder.com/300x450/cccccc/666666";

const EMPTY_MESSAGE: &str = "No recently watched content found.";
const ERROR_HINT: &str = "Check the console (F12) for more details.";

/// "Movie", "S<season>E<number>" for episodes, "TV Show" for bare show entries
pub fn type_label(item: &HistoryItem) -> String {
    match (item.kind(), item.episode()) {
        (HistoryType::Movie, _) => "Movie".to_string(),
        (_, Some(episode)) => format!("S{}E{}", episode.season, episode.number),
        (_, None) => "TV Show".to_string(),
    }
}

/// Trakt detail page for the movie or show, when it has a slug
///
/// The slug is pushed as a percent-encoded path segment.
pub fn detail_url(site_url: &str, item: &HistoryItem) -> Option<String> {
    let slug = item.media()?.ids.slug.as_deref()?;
    let mut url = Url::parse(site_url).ok()?;
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .push(item.media_kind().trakt_segment())
        .push(slug);
    Some(url.to_string())
}

/// Generated placeholder image carrying the title as its text
pub fn placeholder_poster(title: &str) -> String {
    let text = if title.is_empty() { "No Poster" } else { title };
    match Url::parse_with_params(PLACEHOLDER_POSTER_BASE, &[("text", text)]) {
        Ok(url) => url.to_string(),
        Err(_) => PLACEHOLDER_POSTER_BASE.to_string(),
    }
}

fn render_item(site_url: &str, enriched: &EnrichedItem) -> Option<Markup> {
    let item = &enriched.item;
    let Some(media) = item.media() else {
        tracing::debug!(kind = ?item.kind(), "Skipping history entry without media descriptor");
        return None;
    };

    let title = media.title.as_deref().unwrap_or_default();
    let placeholder = placeholder_poster(title);
    let poster = enriched.poster_url.as_deref().unwrap_or(&placeholder);
    let onerror = format!("this.onerror=null;this.src='{}'", placeholder);
    let href = detail_url(site_url, item);
    // The URL only ever reaches script through the escaped data attribute
    let onclick = href
        .is_some()
        .then_some("window.open(this.dataset.href, '_blank')");
    let episode_title = item.episode().and_then(|e| e.title.as_deref());

    Some(html! {
        div.trakt-item data-href=[href.as_deref()] onclick=[onclick] {
            img.trakt-poster src=(poster) alt=(title) loading="lazy" onerror=(onerror);
            div.trakt-info {
                div.trakt-title { (title) }
                @if let Some(episode_title) = episode_title {
                    div.trakt-episode { (episode_title) }
                }
                div.trakt-meta {
                    span.trakt-type { (type_label(item)) }
                    @if let Some(year) = media.year {
                        span.trakt-year { (year) }
                    }
                }
            }
        }
    })
}

/// Renders the whole feed as one fragment, items in input order
pub fn render_feed(items: &[EnrichedItem], site_url: &str) -> String {
    if items.is_empty() {
        return render_empty();
    }

    html! {
        @for item in items {
            @if let Some(markup) = render_item(site_url, item) {
                (markup)
            }
        }
    }
    .into_string()
}

pub fn render_empty() -> String {
    html! {
        div.loading { (EMPTY_MESSAGE) }
    }
    .into_string()
}

pub fn render_error(message: &str) -> String {
    html! {
        div.error-message {
            p { "Unable to load recently watched content." }
            p { "Error: " (message) }
            p { (ERROR_HINT) }
        }
    }
    .into_string()
}
