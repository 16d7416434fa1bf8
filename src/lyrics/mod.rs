//! Lyrics lookup against the Genius API.
//!
//! - [`LyricsSearch`]: the lookup seam the fetch pipeline depends on
//! - [`GeniusClient`]: its HTTP implementation
//! - [`RetryPolicy`]: backoff for transient lookup failures

mod genius;
mod page;
mod retry_policy;

pub use genius::GeniusClient;
pub use page::{extract_lyrics, strip_section_headers};
pub use retry_policy::RetryPolicy;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors returned by a lyrics lookup.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {endpoint}")]
    Status { endpoint: String, status: u16 },

    #[error("Request rejected with status {status}, check the access token")]
    Unauthorized { status: u16 },

    #[error("Malformed response: {0}")]
    Parse(String),
}

impl LookupError {
    /// Returns true for failures that may go away when the same request is repeated.
    pub fn is_retryable(&self) -> bool {
        match self {
            LookupError::Http(_) | LookupError::Parse(_) => true,
            LookupError::Status { status, .. } => *status == 429 || *status >= 500,
            LookupError::Unauthorized { .. } => false,
        }
    }
}

/// Looks up the lyrics record of a song.
///
/// `Ok(None)` is a definitive "no match", distinct from a failed lookup.
#[async_trait]
pub trait LyricsSearch: Send + Sync {
    async fn search_song(&self, title: &str, artist: &str) -> Result<Option<Value>, LookupError>;
}
