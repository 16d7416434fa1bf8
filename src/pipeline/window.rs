//! Row window validation and partitioning into chunk-sized ranges.

use std::ops::Range;
use thiserror::Error;

/// Invalid fetch window arguments. Raised before any file or network activity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("chunk size must be at least 1, got {0}")]
    ZeroChunkSize(i64),

    #[error("start index must be >= 0, got {0}")]
    NegativeStart(i64),

    #[error("end index must be >= 1, got {0}")]
    EndTooSmall(i64),

    #[error("start index ({start}) must not be greater than end index ({end})")]
    StartAfterEnd { start: i64, end: i64 },

    #[error("end index ({end}) must not exceed the number of rows ({total})")]
    EndBeyondTable { end: i64, total: usize },

    #[error("chunk size ({chunk_size}) must not exceed the number of rows ({total})")]
    ChunkLargerThanTable { chunk_size: i64, total: usize },
}

/// A validated `[start, end)` row window together with its chunk size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub chunk_size: usize,
    pub start: usize,
    pub end: usize,
}

impl FetchWindow {
    /// Checks raw command line values against a table of `total` rows.
    ///
    /// Values are taken signed so that negative input is reported as such instead of
    /// failing to parse.
    pub fn validate(
        chunk_size: i64,
        start: i64,
        end: i64,
        total: usize,
    ) -> Result<Self, WindowError> {
        if chunk_size < 1 {
            return Err(WindowError::ZeroChunkSize(chunk_size));
        }
        if start < 0 {
            return Err(WindowError::NegativeStart(start));
        }
        if end < 1 {
            return Err(WindowError::EndTooSmall(end));
        }
        if start > end {
            return Err(WindowError::StartAfterEnd { start, end });
        }
        if end as u64 > total as u64 {
            return Err(WindowError::EndBeyondTable { end, total });
        }
        if chunk_size as u64 > total as u64 {
            return Err(WindowError::ChunkLargerThanTable { chunk_size, total });
        }

        Ok(Self {
            chunk_size: chunk_size as usize,
            start: start as usize,
            end: end as usize,
        })
    }

    /// Number of rows in the window.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Consecutive ranges of at most `chunk_size` rows covering exactly `[start, end)`.
    pub fn partition(&self) -> Vec<RowRange> {
        (self.start..self.end)
            .step_by(self.chunk_size)
            .map(|start| RowRange {
                start,
                end: (start + self.chunk_size).min(self.end),
            })
            .collect()
    }
}

/// Contiguous rows `[start, end)` fetched and persisted as one chunk file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
}

impl RowRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn positions(&self) -> Range<usize> {
        self.start..self.end
    }

    /// `{first}-{last}.json`, both bounds inclusive.
    pub fn file_name(&self) -> String {
        format!("{}-{}.json", self.start, self.end.saturating_sub(1))
    }

    /// Inverse of [`RowRange::file_name`]; `None` for anything that is not a chunk file.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(".json")?;
        let (first, last) = stem.split_once('-')?;
        let first: usize = first.parse().ok()?;
        let last: usize = last.parse().ok()?;
        if last < first {
            return None;
        }
        Some(Self {
            start: first,
            end: last + 1,
        })
    }
}
