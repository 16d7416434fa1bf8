//! Local stand-in for the Genius API and the reference table downloads
//!
//! Each test spawns its own server on a random port. It is shut down when the
//! `MockServer` is dropped.

use super::constants::*;
use super::fixtures::{genre_table_text, match_list_text, zip_text};
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

struct MockState {
    base_url: String,
    /// Searches for [`FLAKY_TITLE`] still to be answered with a 503.
    flaky_failures: AtomicU32,
    search_calls: AtomicU32,
    file_downloads: AtomicU32,
    matches_zip: Vec<u8>,
    genres_zip: Vec<u8>,
}

pub struct MockServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,
    state: Arc<MockState>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl MockServer {
    pub async fn spawn() -> Self {
        Self::spawn_with_flaky_failures(0).await
    }

    /// Spawns a server whose first `failures` searches for [`FLAKY_TITLE`] fail with 503.
    pub async fn spawn_with_flaky_failures(failures: u32) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to read local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let state = Arc::new(MockState {
            base_url: base_url.clone(),
            flaky_failures: AtomicU32::new(failures),
            search_calls: AtomicU32::new(0),
            file_downloads: AtomicU32::new(0),
            matches_zip: zip_text("mxm_779k_matches.txt", &match_list_text()),
            genres_zip: zip_text("msd_tagtraum_cd2c.cls", &genre_table_text()),
        });

        let app = Router::new()
            .route("/search", get(search))
            .route("/songs/{id}", get(song))
            .route("/lyrics/{id}", get(lyrics_page))
            .route("/files/{name}", get(file))
            .with_state(state.clone());

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Mock server failed");
        });

        Self {
            base_url,
            state,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    pub fn search_calls(&self) -> u32 {
        self.state.search_calls.load(Ordering::SeqCst)
    }

    pub fn file_downloads(&self) -> u32 {
        self.state.file_downloads.load(Ordering::SeqCst)
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value == format!("Bearer {}", TEST_TOKEN))
        .unwrap_or(false)
}

fn api_response(status: StatusCode, response: Value) -> Response {
    (
        status,
        Json(json!({ "meta": { "status": status.as_u16() }, "response": response })),
    )
        .into_response()
}

fn song_hit(id: u64, title: &str) -> Value {
    json!({ "type": "song", "index": "song", "result": { "id": id, "title": title } })
}

async fn search(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.search_calls.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return api_response(StatusCode::UNAUTHORIZED, Value::Null);
    }

    let query = params.get("q").cloned().unwrap_or_default();
    let hits = if query.starts_with(LYRICS_TITLE) {
        vec![
            json!({ "type": "artist", "result": { "id": 99, "name": "Western Addiction" } }),
            song_hit(2, "A Poor Recipe For Civic Cohesion (Live)"),
            song_hit(1, LYRICS_TITLE),
        ]
    } else if query.starts_with(INSTRUMENTAL_TITLE) {
        vec![song_hit(3, INSTRUMENTAL_TITLE)]
    } else if query.starts_with(FLAKY_TITLE) {
        let failing = state
            .flaky_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return (StatusCode::SERVICE_UNAVAILABLE, "try again later").into_response();
        }
        vec![song_hit(4, FLAKY_TITLE)]
    } else {
        Vec::new()
    };

    api_response(StatusCode::OK, json!({ "hits": hits }))
}

async fn song(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response {
    if !authorized(&headers) {
        return api_response(StatusCode::UNAUTHORIZED, Value::Null);
    }

    let (title, artist, lyrics_state, instrumental) = match id {
        1 => (LYRICS_TITLE, "Western Addiction", "complete", false),
        2 => (
            "A Poor Recipe For Civic Cohesion (Live)",
            "Western Addiction",
            "complete",
            false,
        ),
        3 => (INSTRUMENTAL_TITLE, "The Box Tops", "complete", true),
        4 => (FLAKY_TITLE, "Adam Ant", "unreleased", false),
        _ => return api_response(StatusCode::NOT_FOUND, Value::Null),
    };

    api_response(
        StatusCode::OK,
        json!({
            "song": {
                "id": id,
                "title": title,
                "url": format!("{}/lyrics/{}", state.base_url, id),
                "lyrics_state": lyrics_state,
                "instrumental": instrumental,
                "primary_artist": { "id": 100 + id, "name": artist }
            }
        }),
    )
}

async fn lyrics_page(Path(id): Path<u64>) -> Response {
    if id != 1 {
        return (StatusCode::NOT_FOUND, "not found").into_response();
    }
    Html(
        r#"<html><body>
<div class="SongHeader">A Poor Recipe For Civic Cohesion</div>
<div data-lyrics-container="true" class="Lyrics__Container"><div data-exclude-from-selection="true">3 Contributors</div>[Verse 1]<br/>Tick tock, tick tock<br/><a href="/annotation"><span>The clock</span></a> is ticking</div>
</body></html>"#,
    )
    .into_response()
}

async fn file(State(state): State<Arc<MockState>>, Path(name): Path<String>) -> Response {
    let bytes = match name.as_str() {
        "mxm_779k_matches.txt.zip" => state.matches_zip.clone(),
        "msd_tagtraum_cd2c.cls.zip" => state.genres_zip.clone(),
        _ => return (StatusCode::NOT_FOUND, "not found").into_response(),
    };
    state.file_downloads.fetch_add(1, Ordering::SeqCst);
    ([(header::CONTENT_TYPE, "application/zip")], bytes).into_response()
}
