//! Lyrics fetch tool
//!
//! Looks up every row of `data_no_lyrics.csv` in the `[start, end)` window on Genius,
//! writing one file per chunk of rows to `lyric_chunks/`. Re-run with a later window to
//! resume after an interruption.

use anyhow::Result;
use clap::Parser;
use lyrics_genre_dataset::config::{AppConfig, CliConfig};
use lyrics_genre_dataset::logging::init_logging;
use lyrics_genre_dataset::pipeline::{run_fetch_stage, FetchArgs};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fetch-lyrics")]
#[command(about = "Fetch Genius lyrics records in resumable chunks")]
struct Args {
    /// Number of rows per chunk file.
    #[arg(
        short = 'c',
        long = "chunksize",
        default_value_t = 100,
        allow_negative_numbers = true
    )]
    chunk_size: i64,

    /// First row to fetch.
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    start: i64,

    /// Row to stop at (exclusive). Defaults to the last row index.
    #[arg(short, long, allow_negative_numbers = true)]
    end: Option<i64>,

    /// Maximum number of lookups in flight. Defaults to the number of cores.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Directory holding the dataset files.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Path to a TOML config file. Its values take precedence over the flags.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Genius API client access token.
    #[arg(
        long = "genius-token",
        env = "GENIUS_ACCESS_TOKEN",
        hide_env_values = true
    )]
    genius_token: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging()?;

    let cli = CliConfig {
        data_dir: args.data_dir,
        genius_access_token: args.genius_token,
        concurrency: args.concurrency,
    };
    let config = AppConfig::load(&cli, args.config.as_deref())?;

    run_fetch_stage(
        &config,
        FetchArgs {
            chunk_size: args.chunk_size,
            start: args.start,
            end: args.end,
        },
    )
    .await?;
    Ok(())
}
