//! Fetch stage driver: validates the window, then fetches and persists one range at a
//! time. Ranges already on disk from an earlier run are only skipped if the caller picks
//! a window that excludes them.

use super::fetcher::{fetch_range, OutcomeCounts, RangeResult};
use super::window::FetchWindow;
use crate::config::AppConfig;
use crate::lyrics::{GeniusClient, LyricsSearch, RetryPolicy};
use crate::table::{read_csv, EnrichedRecord};
use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Raw window arguments of the fetch stage, validated against the input table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchArgs {
    pub chunk_size: i64,
    pub start: i64,
    /// Defaults to the last row index of the input table.
    pub end: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub ranges_written: usize,
    pub counts: OutcomeCounts,
    /// Positions stored as `null` because their lookup never succeeded.
    pub unresolved_rows: Vec<usize>,
}

/// Writes a fetched range to `dir/{first}-{last}.json`, creating `dir` if needed.
pub fn persist_range(dir: &Path, result: RangeResult) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create chunk directory: {:?}", dir))?;

    let path = dir.join(result.range.file_name());
    result.into_chunk().save(&path)?;
    Ok(path)
}

/// Fetches `window` of `rows` range by range, writing each range before starting the next.
pub async fn run_fetch(
    lookup: &dyn LyricsSearch,
    policy: &RetryPolicy,
    rows: &[EnrichedRecord],
    window: FetchWindow,
    concurrency: usize,
    out_dir: &Path,
) -> Result<FetchSummary> {
    if window.end > rows.len() {
        bail!(
            "Fetch window ends at row {} but the table only has {} rows",
            window.end,
            rows.len()
        );
    }

    let ranges = window.partition();
    info!(
        "Fetching rows {}..{} in {} range(s) of up to {} rows, {} lookups in flight",
        window.start,
        window.end,
        ranges.len(),
        window.chunk_size,
        concurrency
    );

    let mut summary = FetchSummary::default();
    for range in ranges {
        let started = Instant::now();
        let progress = range_progress_bar(range.len() as u64, &range.file_name());

        let result = fetch_range(lookup, policy, rows, range, concurrency, &progress).await;
        progress.finish_and_clear();

        let counts = result.counts();
        summary.unresolved_rows.extend(result.unresolved_positions());
        let path = persist_range(out_dir, result)?;
        summary.counts.add(counts);
        summary.ranges_written += 1;

        info!(
            "Wrote {:?} in {:.1?}: {} found, {} no match, {} unresolved",
            path,
            started.elapsed(),
            counts.found,
            counts.no_match,
            counts.unresolved
        );
    }

    Ok(summary)
}

/// Runs the fetch stage against the Genius API with the configured credentials.
///
/// Fails before any network or file activity when the input table is missing or the
/// window is invalid.
pub async fn run_fetch_stage(config: &AppConfig, args: FetchArgs) -> Result<FetchSummary> {
    let input_path = config.data_no_lyrics_path();
    if !input_path.exists() {
        bail!(
            "Could not find {:?}. Run merge-metadata first",
            input_path
        );
    }
    let rows: Vec<EnrichedRecord> = read_csv(&input_path)?;
    info!("Loaded {} rows from {:?}", rows.len(), input_path);

    let end = args.end.unwrap_or(rows.len() as i64 - 1);
    let window = FetchWindow::validate(args.chunk_size, args.start, end, rows.len())
        .context("Invalid fetch window")?;

    let client = GeniusClient::from_config(config)?;
    let policy = RetryPolicy::new(&config.fetch);

    let summary = run_fetch(
        &client,
        &policy,
        &rows,
        window,
        config.concurrency,
        &config.lyric_chunks_dir(),
    )
    .await?;

    info!(
        "Fetch complete: {} range(s) written, {} found, {} no match, {} unresolved",
        summary.ranges_written,
        summary.counts.found,
        summary.counts.no_match,
        summary.counts.unresolved
    );
    if !summary.unresolved_rows.is_empty() {
        warn!(
            "Unresolved rows stored as null, re-fetch them with a narrower window: {:?}",
            summary.unresolved_rows
        );
    }
    Ok(summary)
}

fn range_progress_bar(len: u64, label: &str) -> ProgressBar {
    let progress = ProgressBar::new(len);
    progress.set_style(
        ProgressStyle::with_template("{msg} {bar:40.cyan/blue} {pos}/{len} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    progress.set_message(label.to_string());
    progress
}
