//! Per-row lyrics lookups with bounded retries, fanned out over a row range.

use super::chunk_file::ChunkFile;
use super::window::RowRange;
use crate::lyrics::{LyricsSearch, RetryPolicy};
use crate::table::EnrichedRecord;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use serde_json::Value;
use tracing::{debug, warn};

/// Final state of one row's lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The lookup returned a record, tagged with the row's `msd_tid`.
    Found(Value),
    /// The lookup answered, and there is no such song.
    NoMatch,
    /// Retries ran out, or the failure was not one that retrying can fix.
    Unresolved { attempts: u32, last_error: String },
}

impl FetchOutcome {
    /// The value persisted for the row; rows without a record are stored as `null`.
    pub fn into_record(self) -> Option<Value> {
        match self {
            FetchOutcome::Found(record) => Some(record),
            FetchOutcome::NoMatch | FetchOutcome::Unresolved { .. } => None,
        }
    }
}

/// Looks up one row, retrying transient failures with backoff until `policy` gives up.
pub async fn fetch_one(
    lookup: &dyn LyricsSearch,
    policy: &RetryPolicy,
    record: &EnrichedRecord,
) -> FetchOutcome {
    let mut retries = 0u32;

    loop {
        match lookup.search_song(&record.title, &record.artist).await {
            Ok(Some(mut found)) => {
                if let Some(fields) = found.as_object_mut() {
                    fields.insert(
                        "msd_tid".to_string(),
                        Value::String(record.msd_tid.clone()),
                    );
                }
                return FetchOutcome::Found(found);
            }
            Ok(None) => return FetchOutcome::NoMatch,
            Err(e) if policy.should_retry(&e, retries) => {
                let delay = policy.backoff(retries);
                debug!(
                    "Lookup for {} failed ({}), retry {} in {:?}",
                    record.msd_tid,
                    e,
                    retries + 1,
                    delay
                );
                tokio::time::sleep(delay).await;
                retries += 1;
            }
            Err(e) => {
                return FetchOutcome::Unresolved {
                    attempts: retries + 1,
                    last_error: e.to_string(),
                }
            }
        }
    }
}

/// Outcomes of every row of a range, ordered by row position.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeResult {
    pub range: RowRange,
    pub rows: Vec<(usize, FetchOutcome)>,
}

/// Row counts per outcome kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub found: usize,
    pub no_match: usize,
    pub unresolved: usize,
}

impl OutcomeCounts {
    pub fn add(&mut self, other: OutcomeCounts) {
        self.found += other.found;
        self.no_match += other.no_match;
        self.unresolved += other.unresolved;
    }
}

impl RangeResult {
    pub fn counts(&self) -> OutcomeCounts {
        let mut counts = OutcomeCounts::default();
        for (_, outcome) in &self.rows {
            match outcome {
                FetchOutcome::Found(_) => counts.found += 1,
                FetchOutcome::NoMatch => counts.no_match += 1,
                FetchOutcome::Unresolved { .. } => counts.unresolved += 1,
            }
        }
        counts
    }

    pub fn unresolved_positions(&self) -> Vec<usize> {
        self.rows
            .iter()
            .filter(|(_, outcome)| matches!(outcome, FetchOutcome::Unresolved { .. }))
            .map(|(position, _)| *position)
            .collect()
    }

    /// Logs every unresolved row, then drops the distinction between no-match and
    /// unresolved rows: both become `null`.
    pub fn into_chunk(self) -> ChunkFile {
        for (position, outcome) in &self.rows {
            if let FetchOutcome::Unresolved {
                attempts,
                last_error,
            } = outcome
            {
                warn!(
                    "Row {} unresolved after {} attempt(s): {}",
                    position, attempts, last_error
                );
            }
        }

        self.rows
            .into_iter()
            .map(|(position, outcome)| (position, outcome.into_record()))
            .collect()
    }
}

/// Fetches every row of `range` with at most `concurrency` lookups in flight.
///
/// `rows` is the whole table; positions outside it are skipped. Completion order has
/// no effect on the result.
pub async fn fetch_range(
    lookup: &dyn LyricsSearch,
    policy: &RetryPolicy,
    rows: &[EnrichedRecord],
    range: RowRange,
    concurrency: usize,
    progress: &ProgressBar,
) -> RangeResult {
    let mut outcomes: Vec<(usize, FetchOutcome)> = stream::iter(
        rows.iter()
            .enumerate()
            .skip(range.start)
            .take(range.len()),
    )
    .map(|(position, record)| async move {
        let outcome = fetch_one(lookup, policy, record).await;
        progress.inc(1);
        (position, outcome)
    })
    .buffer_unordered(concurrency.max(1))
    .collect()
    .await;

    outcomes.sort_by_key(|(position, _)| *position);

    RangeResult {
        range,
        rows: outcomes,
    }
}
