//! Download of the remote reference tables, with first-run caching.

use std::io::{Cursor, Read, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur while fetching a remote resource.
#[derive(Debug, Error)]
pub enum RemoteFetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} fetching {url}")]
    Status { url: String, status: u16 },

    #[error("Zip extraction error: {0}")]
    Zip(String),

    #[error("Archive contains no entries")]
    EmptyArchive,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Downloads `url` to `target`.
///
/// With `is_zip` the body is treated as a zip archive and the text of its first
/// entry is written, otherwise the body is written as is.
pub async fn fetch_remote(
    client: &reqwest::Client,
    url: &str,
    target: &Path,
    is_zip: bool,
) -> Result<(), RemoteFetchError> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(RemoteFetchError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let content = if is_zip {
        let bytes = response.bytes().await?;
        extract_first_entry(&bytes)?
    } else {
        response.text().await?
    };

    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    write_atomically(target, content.as_bytes())?;
    Ok(())
}

/// Writes `content` to a temp file beside `target`, then renames it into place.
fn write_atomically(target: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(content)?;
    temp.flush()?;
    temp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

/// Fetches `url` into `target` unless `target` already exists.
pub async fn ensure_cached(
    client: &reqwest::Client,
    url: &str,
    target: &Path,
    is_zip: bool,
) -> anyhow::Result<()> {
    if target.exists() {
        debug!("Using cached copy of {} at {:?}", url, target);
        return Ok(());
    }

    info!("Fetching {} into {:?}...", url, target);
    fetch_remote(client, url, target, is_zip)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to fetch {}: {}", url, e))?;

    if !target.exists() {
        anyhow::bail!("{:?} is still missing after fetching {}", target, url);
    }
    Ok(())
}

/// Decodes the first entry of a zip archive as UTF-8 text, replacing invalid sequences.
pub fn extract_first_entry(bytes: &[u8]) -> Result<String, RemoteFetchError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| RemoteFetchError::Zip(e.to_string()))?;
    if archive.len() == 0 {
        return Err(RemoteFetchError::EmptyArchive);
    }

    let mut entry = archive
        .by_index(0)
        .map_err(|e| RemoteFetchError::Zip(e.to_string()))?;
    let mut content = Vec::new();
    entry
        .read_to_end(&mut content)
        .map_err(|e| RemoteFetchError::Zip(e.to_string()))?;
    // A few artist names in the match list are not valid UTF-8.
    Ok(String::from_utf8_lossy(&content).into_owned())
}
