//! Chunk merge tool
//!
//! Concatenates every chunk file in `lyric_chunks/` into `genius_api_data.json`.

use anyhow::Result;
use clap::Parser;
use lyrics_genre_dataset::config::{AppConfig, CliConfig};
use lyrics_genre_dataset::logging::init_logging;
use lyrics_genre_dataset::pipeline::run_merge_chunks;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "merge-chunks")]
#[command(about = "Merge fetched lyrics chunks into one dataset file")]
struct Args {
    /// Directory holding the dataset files.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Path to a TOML config file. Its values take precedence over the flags.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging()?;

    let cli = CliConfig {
        data_dir: args.data_dir,
        ..Default::default()
    };
    let config = AppConfig::load(&cli, args.config.as_deref())?;

    run_merge_chunks(&config)?;
    Ok(())
}
