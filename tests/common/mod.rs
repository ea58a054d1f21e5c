//! In-process mock of the Spotify Web API and a scripted playback engine

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tempfile::TempDir;
use tokio::sync::{Mutex, mpsc};

use medmusic::model::{AppModel, PlaybackState};
use medmusic::playback::{
    EventReceiver, PlaybackProvider, PlayerOptions, ProviderEvent, TokenCallback,
};
use medmusic::session::{LocalStorage, SessionStore, TOKEN_STORAGE_KEY};

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
    pub body: String,
}

#[derive(Default)]
pub struct MockState {
    pub requests: StdMutex<Vec<RecordedRequest>>,
    pub unauthorized: AtomicBool,
    /// Artificial latency per search query, in milliseconds
    pub search_delays: StdMutex<HashMap<String, u64>>,
}

impl MockState {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().expect("requests lock").len()
    }

    pub fn hits_for(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| r.path == path).count()
    }
}

pub struct MockSpotify {
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl MockSpotify {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server");
        });

        Self {
            base_url: format!("http://{}/v1", addr),
            state,
        }
    }

    pub fn delay_search(&self, query: &str, millis: u64) {
        self.state
            .search_delays
            .lock()
            .expect("delays lock")
            .insert(query.to_string(), millis);
    }

    pub fn reject_all(&self) {
        self.state.unauthorized.store(true, Ordering::SeqCst);
    }
}

pub fn track_json(id: &str, name: &str, artist_id: &str, artist: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "uri": format!("spotify:track:{id}"),
        "artists": [{ "id": artist_id, "name": artist }],
        "album": { "images": [{ "url": format!("https://i.scdn.co/{id}") }] },
        "preview_url": null,
        "duration_ms": 200000
    })
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    headers: axum::http::HeaderMap,
    body: String,
) -> Response {
    let path = uri.path().to_string();
    state.requests.lock().expect("requests lock").push(RecordedRequest {
        method: method.to_string(),
        path: path.clone(),
        query: query.clone(),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    if state.unauthorized.load(Ordering::SeqCst) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "status": 401, "message": "The access token expired" } })),
        )
            .into_response();
    }

    let segments: Vec<&str> = path.trim_start_matches("/v1/").split('/').collect();
    match (method.as_str(), segments.as_slice()) {
        ("GET", ["me"]) => Json(json!({ "id": "user1", "display_name": "Ada" })).into_response(),
        ("GET", ["me", "playlists"]) => Json(json!({
            "items": [
                { "id": "p1", "name": "Road Trip", "images": [{ "url": "https://i.scdn.co/p1" }] },
                { "id": "p2", "name": "Focus", "images": null }
            ]
        }))
        .into_response(),
        ("GET", ["playlists", id, "tracks"]) => Json(json!({
            "items": [
                { "track": track_json(&format!("{id}-t1"), "Get Lucky", "a1", "Daft Punk") },
                { "track": null },
                { "track": track_json(&format!("{id}-t2"), "Harder Better", "a1", "Daft Punk") }
            ]
        }))
        .into_response(),
        ("GET", ["search"]) => {
            let q = query.get("q").cloned().unwrap_or_default();
            let delay = state
                .search_delays
                .lock()
                .expect("delays lock")
                .get(&q)
                .copied();
            if let Some(millis) = delay {
                tokio::time::sleep(Duration::from_millis(millis)).await;
            }
            Json(json!({
                "tracks": { "items": [track_json(&format!("s-{q}"), &format!("Result for {q}"), "a2", "Someone")] }
            }))
            .into_response()
        }
        ("GET", ["artists", _id]) => {
            Json(json!({ "id": "a1", "name": "Daft Punk", "genres": ["french house", "electro"] }))
                .into_response()
        }
        ("GET", ["me", "player"]) => StatusCode::NO_CONTENT.into_response(),
        ("PUT", ["me", "player", ..]) | ("POST", ["me", "player", ..]) => {
            StatusCode::NO_CONTENT.into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Playback engine double: probes fail a configurable number of times and
/// notifications are pushed by the test through [`FakeProvider::emit`].
#[derive(Default)]
pub struct FakeProvider {
    pub failing_probes: u32,
    pub probes: AtomicU32,
    pub connects: AtomicU32,
    pub sender: Mutex<Option<mpsc::UnboundedSender<ProviderEvent>>>,
    pub state: Mutex<Option<PlaybackState>>,
    pub token_seen: Mutex<Option<String>>,
    pub token_callback: Mutex<Option<TokenCallback>>,
}

impl FakeProvider {
    pub fn new(failing_probes: u32) -> Self {
        Self { failing_probes, ..Self::default() }
    }

    pub async fn emit(&self, event: ProviderEvent) {
        let sender = self.sender.lock().await;
        sender
            .as_ref()
            .expect("player connected")
            .send(event)
            .expect("listener alive");
    }

    /// Ask the connected player's token callback for a token right now.
    pub async fn current_token(&self) -> Option<String> {
        let callback = self.token_callback.lock().await;
        (callback.as_ref().expect("player connected"))()
    }
}

#[async_trait]
impl PlaybackProvider for FakeProvider {
    async fn probe(&self) -> Result<()> {
        let attempt = self.probes.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failing_probes {
            anyhow::bail!("engine not loaded");
        }
        Ok(())
    }

    async fn connect(&self, options: PlayerOptions) -> Result<EventReceiver> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        *self.token_seen.lock().await = (options.token)();
        *self.token_callback.lock().await = Some(options.token.clone());
        let (tx, rx) = mpsc::unbounded_channel();
        *self.sender.lock().await = Some(tx);
        Ok(rx)
    }

    async fn current_state(&self) -> Option<PlaybackState> {
        self.state.lock().await.clone()
    }

    async fn disconnect(&self) {
        self.sender.lock().await.take();
    }
}

/// Storage file inside a test's temp directory
pub fn storage_file(dir: &TempDir) -> PathBuf {
    dir.path().join("local_storage.json")
}

/// Model with an optional token already in storage. The directory holding
/// the storage file lives as long as the returned guard.
pub fn model_with_token(token: Option<&str>) -> (TempDir, Arc<Mutex<AppModel>>) {
    let dir = TempDir::new().expect("temp dir");
    let mut storage = LocalStorage::open(storage_file(&dir));
    if let Some(token) = token {
        storage.set_item(TOKEN_STORAGE_KEY, token).expect("seed storage");
    }
    let model = AppModel::new(SessionStore::restore(storage), "https://accounts.example/authorize".into());
    (dir, Arc::new(Mutex::new(model)))
}

/// Poll `check` until it holds or two seconds pass.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..200 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
