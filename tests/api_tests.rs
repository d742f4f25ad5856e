use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use trakt_feed::api::{create_router, AppState, FEED_PATH};
use trakt_feed::config::Config;
use trakt_feed::error::{AppError, AppResult};
use trakt_feed::models::{HistoryItem, MediaKind};
use trakt_feed::services::{Enricher, HistoryProvider, PosterResolver, RecentlyWatched};

enum Outcome {
    Items(Value),
    Upstream(u16, &'static str),
    Internal,
}

struct StubHistory {
    outcome: Outcome,
    calls: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl HistoryProvider for StubHistory {
    async fn fetch_history(&self, _username: &str, _limit: u32) -> AppResult<Vec<HistoryItem>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Outcome::Items(value) => Ok(serde_json::from_value(value.clone())?),
            Outcome::Upstream(status, body) => Err(AppError::Upstream {
                status: *status,
                body: body.to_string(),
            }),
            Outcome::Internal => Err(AppError::Internal("connection reset".to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// Posters keyed by catalog id: `https://posters.test/{kind}/{id}.jpg`
struct StubPosters {
    enabled: bool,
}

#[async_trait::async_trait]
impl PosterResolver for StubPosters {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn resolve(&self, catalog_id: Option<u64>, kind: MediaKind) -> Option<String> {
        catalog_id.map(|id| format!("https://posters.test/{}/{}.jpg", kind.tmdb_segment(), id))
    }
}

fn history_fixture() -> Value {
    json!([
        {
            "id": 3,
            "watched_at": "2024-06-03T20:00:00.000Z",
            "type": "movie",
            "movie": { "title": "Dune", "year": 2021, "ids": { "slug": "dune-2021", "tmdb": 438631 } }
        },
        {
            "id": 2,
            "watched_at": "2024-06-02T20:00:00.000Z",
            "type": "episode",
            "episode": { "season": 2, "number": 5, "title": "The Bells" },
            "show": { "title": "Some Show", "year": 2019, "ids": { "slug": "some-show", "tmdb": 1399 } }
        },
        {
            "id": 1,
            "watched_at": "2024-06-01T20:00:00.000Z",
            "type": "movie",
            "movie": { "title": "Obscure", "year": 1970, "ids": { "slug": "obscure-1970" } }
        }
    ])
}

fn create_test_server(outcome: Outcome, posters_enabled: bool) -> (TestServer, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let history = StubHistory {
        outcome,
        calls: calls.clone(),
    };
    let enricher = Enricher::new(
        Arc::new(StubPosters {
            enabled: posters_enabled,
        }),
        2,
        Duration::from_secs(1),
    );
    let feed = RecentlyWatched::new(Arc::new(history), enricher, "alice", 12);
    let app = create_router(AppState::new(feed));
    (TestServer::new(app).unwrap(), calls)
}

#[tokio::test]
async fn test_health_check() {
    let (server, _) = create_test_server(Outcome::Items(json!([])), false);
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "healthy");
}

#[tokio::test]
async fn test_feed_enriched_in_order_with_cache_header() {
    let (server, calls) = create_test_server(Outcome::Items(history_fixture()), true);

    let response = server.get(FEED_PATH).await;

    response.assert_status_ok();
    assert_eq!(response.header("cache-control"), "public, max-age=300");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let items: Vec<Value> = response.json();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["id"], 3);
    assert_eq!(items[0]["posterUrl"], "https://posters.test/movie/438631.jpg");
    assert_eq!(items[1]["id"], 2);
    assert_eq!(items[1]["posterUrl"], "https://posters.test/tv/1399.jpg");
    assert_eq!(items[1]["episode"]["title"], "The Bells");
    assert_eq!(items[2]["id"], 1);
    assert!(items[2].get("posterUrl").is_none());
    assert_eq!(items[2]["movie"]["title"], "Obscure");
}

#[tokio::test]
async fn test_feed_without_image_key_is_unenriched() {
    let (server, _) = create_test_server(Outcome::Items(history_fixture()), false);

    let response = server.get(FEED_PATH).await;

    response.assert_status_ok();
    let items: Vec<Value> = response.json();
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|item| item.get("posterUrl").is_none()));
}

#[tokio::test]
async fn test_non_get_methods_rejected_without_fetching() {
    let (server, calls) = create_test_server(Outcome::Upstream(500, "boom"), true);

    for method in [
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::PATCH,
        Method::OPTIONS,
    ] {
        let response = server.method(method, FEED_PATH).await;
        response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.json::<Value>()["error"], "Method not allowed");
    }

    let response = server.method(Method::HEAD, FEED_PATH).await;
    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_cors_preflight_on_feed_is_rejected() {
    let (server, calls) = create_test_server(Outcome::Items(json!([])), false);

    let response = server
        .method(Method::OPTIONS, FEED_PATH)
        .add_header(
            HeaderName::from_static("origin"),
            HeaderValue::from_static("https://example.com"),
        )
        .add_header(
            HeaderName::from_static("access-control-request-method"),
            HeaderValue::from_static("GET"),
        )
        .await;

    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_feed_get_allows_any_origin() {
    let (server, _) = create_test_server(Outcome::Items(json!([])), false);

    let response = server
        .get(FEED_PATH)
        .add_header(
            HeaderName::from_static("origin"),
            HeaderValue::from_static("https://example.com"),
        )
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("access-control-allow-origin"), "*");
}

#[tokio::test]
async fn test_rate_limit_forwarded_verbatim() {
    let (server, _) = create_test_server(Outcome::Upstream(429, "Rate Limit Exceeded"), true);

    let response = server.get(FEED_PATH).await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body: Value = response.json();
    assert_eq!(body["error"], "Trakt API error: 429");
    assert_eq!(body["details"], "Rate Limit Exceeded");
}

#[tokio::test]
async fn test_upstream_server_error_forwarded() {
    let (server, _) = create_test_server(Outcome::Upstream(500, "Internal Server Error"), true);

    let response = server.get(FEED_PATH).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json::<Value>()["error"], "Trakt API error: 500");
}

#[tokio::test]
async fn test_unexpected_failure_is_generic_500() {
    let (server, _) = create_test_server(Outcome::Internal, true);

    let response = server.get(FEED_PATH).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Failed to fetch Trakt data");
    assert!(body["message"].as_str().unwrap().contains("connection reset"));
}

#[tokio::test]
async fn test_request_id_echoed() {
    let (server, _) = create_test_server(Outcome::Items(json!([])), false);

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("req-42"),
        )
        .await;

    assert_eq!(response.header("x-request-id"), "req-42");
}

#[tokio::test]
async fn test_end_to_end_against_mock_upstreams() {
    let mut trakt = mockito::Server::new_async().await;
    let mut tmdb = mockito::Server::new_async().await;

    let history_mock = trakt
        .mock("GET", "/users/alice/history")
        .match_query(mockito::Matcher::UrlEncoded("limit".into(), "2".into()))
        .match_header("trakt-api-version", "2")
        .match_header("trakt-api-key", "client-abc")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([
                { "type": "movie", "movie": { "title": "Dune", "year": 2021, "ids": { "slug": "dune-2021", "tmdb": 438631 } } },
                { "type": "movie", "movie": { "title": "Heat", "year": 1995, "ids": { "slug": "heat-1995", "tmdb": 949 } } }
            ])
            .to_string(),
        )
        .create_async()
        .await;
    let dune_mock = tmdb
        .mock("GET", "/movie/438631")
        .match_query(mockito::Matcher::UrlEncoded("api_key".into(), "tmdb-key".into()))
        .with_status(200)
        .with_body(r#"{"id":438631,"poster_path":"/dune.jpg"}"#)
        .create_async()
        .await;
    let heat_mock = tmdb
        .mock("GET", "/movie/949")
        .match_query(mockito::Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let config = Config {
        trakt_client_id: "client-abc".to_string(),
        trakt_username: "alice".to_string(),
        history_limit: 2,
        tmdb_api_key: Some("tmdb-key".to_string()),
        trakt_api_url: trakt.url(),
        tmdb_api_url: tmdb.url(),
        tmdb_image_base: "https://image.tmdb.org/t/p/w500".to_string(),
        request_timeout_secs: 5,
        enrich_concurrency: 2,
        output_path: PathBuf::from("data/trakt.json"),
        host: "127.0.0.1".to_string(),
        port: 0,
    };
    let server = TestServer::new(create_router(AppState::from_config(&config).unwrap())).unwrap();

    let response = server.get(FEED_PATH).await;

    response.assert_status_ok();
    history_mock.assert_async().await;
    dune_mock.assert_async().await;
    heat_mock.assert_async().await;

    let items: Vec<Value> = response.json();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["posterUrl"], "https://image.tmdb.org/t/p/w500/dune.jpg");
    assert_eq!(items[1]["movie"]["title"], "Heat");
    assert!(items[1].get("posterUrl").is_none());
}
