//! Genius API client.
//!
//! A lookup is three requests: a search for "title artist", the full song info of the
//! best hit, and the public song page, which is the only place the lyrics text lives.

use super::page::{extract_lyrics, strip_section_headers};
use super::{LookupError, LyricsSearch};
use crate::config::AppConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// HTTP client for the Genius API, holding its own access token.
pub struct GeniusClient {
    client: reqwest::Client,
    api_base: String,
    access_token: String,
    remove_section_headers: bool,
}

#[derive(Deserialize)]
struct ApiEnvelope {
    response: Option<Value>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    #[serde(rename = "type")]
    hit_type: Option<String>,
    result: Option<Value>,
}

impl GeniusClient {
    /// Create a new Genius client.
    ///
    /// # Arguments
    /// * `api_base` - Base URL of the API (e.g., "https://api.genius.com")
    /// * `access_token` - Client access token sent as a bearer token
    /// * `timeout_secs` - Per-request timeout in seconds
    /// * `remove_section_headers` - Strip `[Chorus]`-style headers from the lyrics
    pub fn new(
        api_base: &str,
        access_token: &str,
        timeout_secs: u64,
        remove_section_headers: bool,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            remove_section_headers,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            &config.genius_api_base,
            config.require_genius_token()?,
            config.request_timeout_secs,
            config.remove_section_headers,
        )
    }

    async fn get_api(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, LookupError> {
        let url = format!("{}{}", self.api_base, path);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await?;

        check_status(path, response.status())?;

        let envelope: ApiEnvelope = response
            .json()
            .await
            .map_err(|e| LookupError::Parse(format!("{}: {}", path, e)))?;
        envelope
            .response
            .ok_or_else(|| LookupError::Parse(format!("{}: missing response object", path)))
    }

    /// Song hits for a free-text query, in the order the API ranks them.
    async fn search_hits(&self, query: &str) -> Result<Vec<Value>, LookupError> {
        let response = self.get_api("/search", &[("q", query)]).await?;
        let search: SearchResponse = serde_json::from_value(response)
            .map_err(|e| LookupError::Parse(format!("/search: {}", e)))?;

        Ok(search
            .hits
            .into_iter()
            .filter(|hit| hit.hit_type.as_deref() == Some("song"))
            .filter_map(|hit| hit.result)
            .collect())
    }

    async fn song_info(&self, song_id: u64) -> Result<Value, LookupError> {
        let path = format!("/songs/{}", song_id);
        let mut response = self
            .get_api(&path, &[("text_format", "plain")])
            .await?;
        response
            .get_mut("song")
            .map(Value::take)
            .ok_or_else(|| LookupError::Parse(format!("{}: missing song object", path)))
    }

    async fn lyrics_text(&self, page_url: &str) -> Result<String, LookupError> {
        let response = self.client.get(page_url).send().await?;
        check_status(page_url, response.status())?;
        let html = response.text().await?;

        let lyrics = extract_lyrics(&html);
        if self.remove_section_headers {
            Ok(strip_section_headers(&lyrics))
        } else {
            Ok(lyrics)
        }
    }
}

#[async_trait]
impl LyricsSearch for GeniusClient {
    async fn search_song(&self, title: &str, artist: &str) -> Result<Option<Value>, LookupError> {
        let query = format!("{} {}", title, artist);
        let hits = self.search_hits(&query).await?;

        let Some(hit) = pick_hit(&hits, title) else {
            debug!("No Genius hit for {:?} by {:?}", title, artist);
            return Ok(None);
        };
        let song_id = hit
            .get("id")
            .and_then(Value::as_u64)
            .ok_or_else(|| LookupError::Parse("search hit without numeric id".to_string()))?;

        let mut song = self.song_info(song_id).await?;

        let lyrics = if has_lyrics(&song) {
            let page_url = song
                .get("url")
                .and_then(Value::as_str)
                .ok_or_else(|| LookupError::Parse(format!("song {} has no url", song_id)))?
                .to_string();
            self.lyrics_text(&page_url).await?
        } else {
            String::new()
        };

        let primary_artist = song
            .pointer("/primary_artist/name")
            .cloned()
            .unwrap_or(Value::Null);

        let Some(record) = song.as_object_mut() else {
            return Err(LookupError::Parse(format!(
                "song {} is not a JSON object",
                song_id
            )));
        };
        record.insert("artist".to_string(), primary_artist);
        record.insert("lyrics".to_string(), Value::String(lyrics));

        Ok(Some(song))
    }
}

fn check_status(endpoint: &str, status: reqwest::StatusCode) -> Result<(), LookupError> {
    if status.is_success() {
        return Ok(());
    }
    let status = status.as_u16();
    if status == 401 || status == 403 {
        return Err(LookupError::Unauthorized { status });
    }
    Err(LookupError::Status {
        endpoint: endpoint.to_string(),
        status,
    })
}

/// First hit whose title matches the requested one, falling back to the top hit.
fn pick_hit<'a>(hits: &'a [Value], title: &str) -> Option<&'a Value> {
    let wanted = normalize_title(title);
    hits.iter()
        .find(|hit| {
            hit.get("title")
                .and_then(Value::as_str)
                .map(|t| normalize_title(t) == wanted)
                .unwrap_or(false)
        })
        .or_else(|| hits.first())
}

/// Instrumentals and songs with unfinished transcriptions have no lyrics worth fetching.
fn has_lyrics(song: &Value) -> bool {
    let complete = song.get("lyrics_state").and_then(Value::as_str) == Some("complete");
    let instrumental = song
        .get("instrumental")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    complete && !instrumental
}

fn normalize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
