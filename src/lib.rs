//! Lyrics/genre dataset builder library
//!
//! The four dataset stages (id extraction, metadata merge, chunked lyrics fetch and
//! chunk merge) live here; each binary is a thin wrapper around one of them.

pub mod config;
pub mod extractor;
pub mod logging;
pub mod lyrics;
pub mod merger;
pub mod pipeline;
pub mod remote;
pub mod table;

// Re-export commonly used types for convenience
pub use config::{AppConfig, CliConfig, FileConfig};
pub use lyrics::{GeniusClient, LookupError, LyricsSearch, RetryPolicy};
pub use pipeline::{ChunkFile, FetchOutcome, FetchWindow, RowRange};
pub use table::{EnrichedRecord, IdentifierMapping};
