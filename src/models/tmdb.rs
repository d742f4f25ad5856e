use serde::Deserialize;

/// The slice of `GET /3/{movie|tv}/{id}` this crate reads
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbDetails {
    pub id: Option<u64>,
    #[serde(default)]
    pub poster_path: Option<String>,
}
