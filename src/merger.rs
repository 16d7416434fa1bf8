//! Metadata merge stage.
//!
//! Joins the cleaned MSD to musiXmatch mapping with the full (noisier) match list for
//! its title/artist metadata, then with the tagtraum CD2C genre annotations, which carry
//! exactly one genre per track.

use crate::config::AppConfig;
use crate::remote::ensure_cached;
use crate::table::{
    read_csv, read_genre_table, read_match_table, write_csv, EnrichedRecord, GenreRow,
    IdentifierMapping, MatchRow,
};
use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{info, warn};

// The match list archive is tens of megabytes.
const ARCHIVE_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// A mapping row together with the match list row sharing its `msd_tid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedTrack {
    pub mapping: IdentifierMapping,
    pub matched: MatchRow,
}

/// Inner join of the mapping with the match list on `msd_tid`.
///
/// The mapping's own `mxm_tid` and `is_test` are kept; output follows the mapping's order.
pub fn join_reference(mappings: &[IdentifierMapping], matches: Vec<MatchRow>) -> Vec<MatchedTrack> {
    let by_id = index_first(matches, |row| row.msd_tid.clone(), "match list");

    mappings
        .iter()
        .filter_map(|mapping| {
            by_id.get(&mapping.msd_tid).map(|matched| MatchedTrack {
                mapping: mapping.clone(),
                matched: matched.clone(),
            })
        })
        .collect()
}

/// Inner join with the genre annotations, producing the final column layout.
///
/// The MSD title/artist columns are dropped in favour of the musiXmatch ones, which do
/// not reference a specific release of the song.
pub fn join_genres(tracks: Vec<MatchedTrack>, genres: Vec<GenreRow>) -> Vec<EnrichedRecord> {
    let by_id = index_first(genres, |row| row.msd_tid.clone(), "genre table");

    tracks
        .into_iter()
        .filter_map(|track| {
            let genre = by_id.get(&track.mapping.msd_tid)?;
            Some(EnrichedRecord {
                msd_tid: track.mapping.msd_tid,
                mxm_tid: track.mapping.mxm_tid,
                title: track.matched.mxm_title,
                artist: track.matched.mxm_artist_name,
                genre: genre.genre.clone(),
                is_test: track.mapping.is_test,
            })
        })
        .collect()
}

/// Runs the merge stage: `msd_to_mxm.csv` plus the two reference tables in,
/// `data_no_lyrics.csv` out. Reference tables are downloaded on first run.
pub async fn run_merge(config: &AppConfig) -> Result<usize> {
    let mapping_path = config.msd_to_mxm_path();
    if !mapping_path.exists() {
        bail!(
            "Could not load mapping of MSD track IDs to musiXmatch track IDs. \
             Make sure you've stored it in {:?} (run extract-ids first)",
            mapping_path
        );
    }
    let mappings: Vec<IdentifierMapping> = read_csv(&mapping_path)?;
    info!(
        "Loaded {} MSD to musiXmatch mappings extracted from the SQLite dataset",
        mappings.len()
    );

    let client = reqwest::Client::builder()
        .timeout(ARCHIVE_DOWNLOAD_TIMEOUT)
        .build()
        .context("Failed to create HTTP client")?;

    let matches_path = config.mxm_matches_path();
    ensure_cached(&client, &config.mxm_matches_url, &matches_path, true).await?;
    let matches = read_match_table(&matches_path)?;
    info!("Loaded full match list with {} rows", matches.len());

    let matched = join_reference(&mappings, matches);
    info!("Merged mappings: {} rows", matched.len());

    let genres_path = config.tagtraum_path();
    ensure_cached(&client, &config.tagtraum_url, &genres_path, true).await?;
    let genres = read_genre_table(&genres_path)?;
    info!("Loaded {} genre annotations", genres.len());

    let records = join_genres(matched, genres);
    info!("Merged track mappings with genre annotations: {} rows", records.len());

    let out_path = config.data_no_lyrics_path();
    info!("Writing data to {:?}", out_path);
    write_csv(&out_path, &records)?;

    Ok(records.len())
}

/// Indexes rows by key, keeping the first row for each key.
fn index_first<T, F>(rows: Vec<T>, key: F, table_name: &str) -> HashMap<String, T>
where
    F: Fn(&T) -> String,
{
    let mut index = HashMap::with_capacity(rows.len());
    let mut duplicates = 0usize;

    for row in rows {
        let k = key(&row);
        if index.contains_key(&k) {
            duplicates += 1;
            continue;
        }
        index.insert(k, row);
    }

    if duplicates > 0 {
        warn!(
            "Ignored {} duplicate msd_tid rows in the {} (kept the first of each)",
            duplicates, table_name
        );
    }

    index
}
