//! Chunked lyrics fetch pipeline and chunk merge.
//!
//! The merged table is split into fixed-size row ranges. Each range is fetched with a
//! bounded number of concurrent lookups and written to its own file named after its
//! bounds, so an interrupted run loses at most the range in flight.

mod chunk_file;
mod fetcher;
mod merge;
mod runner;
mod window;

pub use chunk_file::ChunkFile;
pub use fetcher::{fetch_one, fetch_range, FetchOutcome, OutcomeCounts, RangeResult};
pub use merge::{list_chunk_files, merge_chunks, run_merge_chunks};
pub use runner::{persist_range, run_fetch, run_fetch_stage, FetchArgs, FetchSummary};
pub use window::{FetchWindow, RowRange, WindowError};
