use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use likesync::config::{Config, SyncSettings};
use likesync::error::{AuthError, RetrievalError, SyncError, WriteChunkError};
use likesync::management::TokenManager;
use likesync::spotify::{LikedTracksApi, SpotifyClient, auth};
use likesync::sync::SyncEngine;
use likesync::types::{Account, SaveTracksRequest, SyncSummary, Token, TrackId};
use serde_json::json;

// Liked libraries keyed by bearer token; `None` entries mimic tracks that are
// no longer available.
#[derive(Default)]
struct MockState {
    base_url: String,
    libraries: HashMap<String, Vec<Option<String>>>,
    fail_offset: Option<usize>,
    saved: Vec<(String, Vec<String>)>,
}

type Shared = Arc<Mutex<MockState>>;

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

async fn liked_tracks(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let state = state.lock().unwrap();
    let Some(library) = bearer(&headers).and_then(|t| state.libraries.get(&t).cloned()) else {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "invalid token"}))).into_response();
    };

    let limit: usize = params["limit"].parse().unwrap();
    let offset: usize = params.get("offset").map_or(0, |o| o.parse().unwrap());
    if state.fail_offset == Some(offset) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let end = (offset + limit).min(library.len());
    let items: Vec<_> = library[offset..end]
        .iter()
        .map(|id| match id {
            Some(id) => json!({"added_at": "2024-01-01T00:00:00Z", "track": {"id": id, "name": "song"}}),
            None => json!({"added_at": "2024-01-01T00:00:00Z", "track": null}),
        })
        .collect();
    let next = (end < library.len())
        .then(|| format!("{}/me/tracks?limit={}&offset={}", state.base_url, limit, end));

    Json(json!({"items": items, "next": next, "total": library.len()})).into_response()
}

async fn save_tracks(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<SaveTracksRequest>,
) -> Response {
    let mut state = state.lock().unwrap();
    let Some(token) = bearer(&headers).filter(|t| state.libraries.contains_key(t)) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    if body.ids.len() > 50 {
        return StatusCode::BAD_REQUEST.into_response();
    }

    state.saved.push((token.clone(), body.ids.clone()));
    let library = state.libraries.get_mut(&token).unwrap();
    for id in body.ids.into_iter().rev() {
        if !library.contains(&Some(id.clone())) {
            library.insert(0, Some(id));
        }
    }
    StatusCode::OK.into_response()
}

async fn token(Form(form): Form<HashMap<String, String>>) -> Response {
    match form.get("grant_type").map(String::as_str) {
        Some("authorization_code")
            if form.get("code").map(String::as_str) == Some("good-code")
                && form.get("code_verifier").is_some() =>
        {
            Json(json!({
                "access_token": "access-1",
                "token_type": "Bearer",
                "scope": "user-library-read user-library-modify",
                "expires_in": 3600,
                "refresh_token": "refresh-1"
            }))
            .into_response()
        }
        Some("refresh_token") if form.get("refresh_token").map(String::as_str) == Some("refresh-1") => {
            Json(json!({
                "access_token": "access-2",
                "token_type": "Bearer",
                "scope": "user-library-read user-library-modify",
                "expires_in": 3600
            }))
            .into_response()
        }
        _ => (StatusCode::BAD_REQUEST, Json(json!({"error": "invalid_grant"}))).into_response(),
    }
}

async fn start_mock(libraries: HashMap<String, Vec<Option<String>>>) -> (SocketAddr, Shared) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let state: Shared = Arc::new(Mutex::new(MockState {
        base_url: format!("http://{}/v1", addr),
        libraries,
        ..MockState::default()
    }));

    let app = Router::new()
        .route("/v1/me/tracks", get(liked_tracks).put(save_tracks))
        .route("/api/token", post(token))
        .with_state(Arc::clone(&state));

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

fn library(prefix: &str, n: usize) -> Vec<Option<String>> {
    (0..n).map(|i| Some(format!("{}{:04}", prefix, i))).collect()
}

fn client(addr: SocketAddr) -> SpotifyClient {
    SpotifyClient::with_base_url(format!("http://{}/v1/", addr))
}

fn config(addr: SocketAddr) -> Config {
    let vars: HashMap<&str, String> = HashMap::from([
        ("SPOTIFY_API_AUTH_CLIENT_ID", "client".to_string()),
        ("SPOTIFY_API_TOKEN_URL", format!("http://{}/api/token", addr)),
        ("SPOTIFY_API_URL", format!("http://{}/v1", addr)),
    ]);
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

async fn fetch_all(client: &SpotifyClient, token: &str) -> Result<Vec<TrackId>, RetrievalError> {
    likesync::sync::fetch_liked_collection(
        client,
        token,
        Account::Source,
        50,
        &likesync::sync::NoProgress,
    )
    .await
}

#[tokio::test]
async fn test_fetch_follows_next_urls() {
    let (addr, _) = start_mock(HashMap::from([("tok".to_string(), library("s", 120))])).await;
    let client = client(addr);
    assert_eq!(client.api_url(), format!("http://{}/v1", addr));

    let first = client.fetch_liked_page("tok", None, 50).await.unwrap();
    assert_eq!(first.track_ids.len(), 50);
    assert_eq!(
        first.next.as_deref(),
        Some(format!("http://{}/v1/me/tracks?limit=50&offset=50", addr).as_str())
    );

    let all = fetch_all(&client, "tok").await.unwrap();
    let expected: Vec<TrackId> = library("s", 120).into_iter().flatten().map(TrackId::new).collect();
    assert_eq!(all, expected);
}

#[tokio::test]
async fn test_fetch_skips_unavailable_tracks() {
    let lib = vec![Some("a".to_string()), None, Some("b".to_string())];
    let (addr, _) = start_mock(HashMap::from([("tok".to_string(), lib)])).await;

    let all = fetch_all(&client(addr), "tok").await.unwrap();

    assert_eq!(all, vec![TrackId::from("a"), TrackId::from("b")]);
}

#[tokio::test]
async fn test_fetch_reports_failing_page() {
    let (addr, state) = start_mock(HashMap::from([("tok".to_string(), library("s", 120))])).await;
    state.lock().unwrap().fail_offset = Some(50);

    let err = fetch_all(&client(addr), "tok").await.unwrap_err();

    match err {
        RetrievalError::Status { url, status } => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert!(url.ends_with("offset=50"), "{url}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_fetch_rejected_token() {
    let (addr, _) = start_mock(HashMap::new()).await;

    let err = client(addr).fetch_liked_page("nope", None, 50).await.unwrap_err();

    assert!(matches!(err, RetrievalError::Status { status, .. } if status == StatusCode::UNAUTHORIZED));
}

#[tokio::test]
async fn test_fetch_unreachable_server() {
    let client = SpotifyClient::with_base_url("http://127.0.0.1:9/v1");

    let err = client.fetch_liked_page("tok", None, 50).await.unwrap_err();

    assert!(matches!(err, RetrievalError::Transport { .. }));
    assert_eq!(err.url(), "http://127.0.0.1:9/v1/me/tracks?limit=50&offset=0");
}

#[tokio::test]
async fn test_save_batch_puts_ids() {
    let (addr, state) = start_mock(HashMap::from([("tok".to_string(), Vec::new())])).await;
    let ids = vec![TrackId::from("a"), TrackId::from("b")];

    client(addr).save_liked_batch("tok", &ids).await.unwrap();

    let saved = state.lock().unwrap().saved.clone();
    assert_eq!(saved, vec![("tok".to_string(), vec!["a".to_string(), "b".to_string()])]);
}

#[tokio::test]
async fn test_save_batch_reports_status() {
    let (addr, _) = start_mock(HashMap::from([("tok".to_string(), Vec::new())])).await;
    let ids: Vec<TrackId> = (0..51).map(|i| TrackId::new(format!("x{}", i))).collect();

    let err = client(addr).save_liked_batch("tok", &ids).await.unwrap_err();

    assert!(matches!(err, WriteChunkError::Status { size: 51, status } if status == StatusCode::BAD_REQUEST));
}

#[tokio::test]
async fn test_sync_end_to_end() {
    let (addr, state) = start_mock(HashMap::from([
        ("src".to_string(), library("s", 120)),
        ("dst".to_string(), library("s", 10)),
    ]))
    .await;
    let client = client(addr);
    let settings = SyncSettings {
        pacing: Duration::from_millis(1),
        ..SyncSettings::default()
    };
    let engine = SyncEngine::new(&client, settings);

    let summary = engine.sync("src", "dst").await.unwrap();
    assert_eq!(summary.added, 110);
    assert_eq!(summary.source_songs, Some(120));
    assert_eq!(summary.target_songs, Some(120));

    let sizes: Vec<usize> = state.lock().unwrap().saved.iter().map(|(_, ids)| ids.len()).collect();
    assert_eq!(sizes, vec![50, 50, 10]);

    let again = engine.sync("src", "dst").await.unwrap();
    assert_eq!(again, SyncSummary::already_in_sync());
}

#[tokio::test]
async fn test_sync_fails_on_unauthorized_target() {
    let (addr, state) = start_mock(HashMap::from([("src".to_string(), library("s", 3))])).await;
    let client = client(addr);

    let err = SyncEngine::new(&client, SyncSettings::default())
        .sync("src", "expired")
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Retrieval { .. }));
    assert!(state.lock().unwrap().saved.is_empty());
}

#[tokio::test]
async fn test_exchange_code_and_refresh() {
    let (addr, _) = start_mock(HashMap::new()).await;
    let config = config(addr);

    let token = auth::exchange_code(&config, "good-code", "verifier").await.unwrap();
    assert_eq!(token.access_token, "access-1");
    assert_eq!(token.refresh_token, "refresh-1");
    assert_eq!(token.expires_in, 3600);

    // Refresh responses without a refresh token keep the old one
    let refreshed = auth::refresh_access_token(&config, &token.refresh_token)
        .await
        .unwrap();
    assert_eq!(refreshed.access_token, "access-2");
    assert_eq!(refreshed.refresh_token, "refresh-1");
}

#[tokio::test]
async fn test_exchange_code_rejected() {
    let (addr, _) = start_mock(HashMap::new()).await;
    let config = config(addr);

    let err = auth::exchange_code(&config, "bad-code", "verifier").await.unwrap_err();

    match err {
        AuthError::Rejected { status, body } => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body.contains("invalid_grant"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn expired_token(refresh_token: &str) -> Token {
    Token {
        access_token: "stale".to_string(),
        refresh_token: refresh_token.to_string(),
        scope: "user-library-read user-library-modify".to_string(),
        expires_in: 3600,
        obtained_at: 0,
    }
}

#[tokio::test]
async fn test_get_valid_token_refreshes_and_persists() {
    let (addr, _) = start_mock(HashMap::new()).await;
    let config = config(addr);
    let dir = tempfile::tempdir().unwrap();

    let mut token_mgr = TokenManager::new(Account::Target, expired_token("refresh-1")).with_dir(dir.path());
    let access_token = token_mgr.get_valid_token(&config).await.unwrap();
    assert_eq!(access_token, "access-2");

    let stored = TokenManager::load_from(dir.path(), Account::Target).await.unwrap();
    assert_eq!(stored.current_token().access_token, "access-2");
    assert_eq!(stored.current_token().refresh_token, "refresh-1");
    assert!(!stored.is_expired());
    assert!(!dir.path().join("source.json").exists());
}

#[tokio::test]
async fn test_get_valid_token_rejected_refresh_keeps_store() {
    let (addr, _) = start_mock(HashMap::new()).await;
    let config = config(addr);
    let dir = tempfile::tempdir().unwrap();

    let token_mgr = TokenManager::new(Account::Source, expired_token("revoked")).with_dir(dir.path());
    token_mgr.persist().await.unwrap();

    let mut token_mgr = TokenManager::load_from(dir.path(), Account::Source).await.unwrap();
    let err = token_mgr.get_valid_token(&config).await.unwrap_err();
    assert!(matches!(err, AuthError::Rejected { status, .. } if status == StatusCode::BAD_REQUEST));

    let stored = TokenManager::load_from(dir.path(), Account::Source).await.unwrap();
    assert_eq!(stored.current_token().access_token, "stale");
}

#[tokio::test]
async fn test_load_missing_token_is_not_authenticated() {
    let dir = tempfile::tempdir().unwrap();

    let err = TokenManager::load_from(dir.path(), Account::Target).await.err().unwrap();

    assert!(matches!(err, AuthError::NotAuthenticated(Account::Target)));
}
