use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod tmdb;

pub use tmdb::TmdbDetails;

/// The `type` discriminator on a Trakt history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryType {
    Movie,
    Episode,
    Show,
}

/// Which catalog a title lives in, independent of the history entry shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    /// Path segment of the TMDB detail endpoint
    pub fn tmdb_segment(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }

    /// Path segment of the Trakt website detail page
    pub fn trakt_segment(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movies",
            MediaKind::Tv => "shows",
        }
    }
}

impl From<HistoryType> for MediaKind {
    fn from(kind: HistoryType) -> Self {
        match kind {
            HistoryType::Movie => MediaKind::Movie,
            HistoryType::Episode | HistoryType::Show => MediaKind::Tv,
        }
    }
}

// ============================================================================
// Trakt API Types
// ============================================================================

/// External identifiers attached to a Trakt movie, show or episode
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MediaIds {
    #[serde(default)]
    pub trakt: Option<u64>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub imdb: Option<String>,
    /// TMDB catalog id, used for poster lookups
    #[serde(default)]
    pub tmdb: Option<u64>,
    #[serde(default)]
    pub tvdb: Option<u64>,
}

/// Movie or show descriptor
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Media {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub ids: MediaIds,
}

/// Episode descriptor on `type: "episode"` entries
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Episode {
    pub season: u32,
    pub number: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub ids: Option<MediaIds>,
}

/// The parts of a history entry this crate reads
#[derive(Debug, Clone, PartialEq, Deserialize)]
struct HistoryFields {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    watched_at: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    kind: HistoryType,
    #[serde(default)]
    movie: Option<Media>,
    #[serde(default)]
    show: Option<Media>,
    #[serde(default)]
    episode: Option<Episode>,
}

/// One entry of `GET /users/{username}/history`
///
/// The entry is kept as the exact JSON object Trakt returned and serializes
/// back to it unchanged; the typed fields are a read-only view of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct HistoryItem {
    fields: HistoryFields,
    raw: Map<String, Value>,
}

impl TryFrom<Map<String, Value>> for HistoryItem {
    type Error = serde_json::Error;

    fn try_from(raw: Map<String, Value>) -> Result<Self, Self::Error> {
        let fields = serde_json::from_value(Value::Object(raw.clone()))?;
        Ok(Self { fields, raw })
    }
}

impl From<HistoryItem> for Map<String, Value> {
    fn from(item: HistoryItem) -> Self {
        item.raw
    }
}

impl HistoryItem {
    pub fn id(&self) -> Option<u64> {
        self.fields.id
    }

    pub fn watched_at(&self) -> Option<DateTime<Utc>> {
        self.fields.watched_at
    }

    pub fn kind(&self) -> HistoryType {
        self.fields.kind
    }

    pub fn episode(&self) -> Option<&Episode> {
        self.fields.episode.as_ref()
    }

    /// The movie for movie entries, the parent show otherwise
    pub fn media(&self) -> Option<&Media> {
        match self.fields.kind {
            HistoryType::Movie => self.fields.movie.as_ref(),
            HistoryType::Episode | HistoryType::Show => self.fields.show.as_ref(),
        }
    }

    pub fn media_kind(&self) -> MediaKind {
        self.fields.kind.into()
    }

    /// TMDB id of the movie or show, if Trakt knows it
    pub fn catalog_id(&self) -> Option<u64> {
        self.media().and_then(|media| media.ids.tmdb)
    }

    /// The entry exactly as Trakt returned it
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }
}

/// A history entry with its resolved poster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedItem {
    #[serde(flatten)]
    pub item: HistoryItem,
    #[serde(
        rename = "posterUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub poster_url: Option<String>,
}

impl EnrichedItem {
    pub fn new(item: HistoryItem, poster_url: Option<String>) -> Self {
        Self { item, poster_url }
    }

    pub fn unenriched(item: HistoryItem) -> Self {
        Self::new(item, None)
    }
}

/// Response of `GET /users/{username}`
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub private: bool,
}
