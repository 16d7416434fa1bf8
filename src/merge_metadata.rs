//! Metadata merge tool
//!
//! Joins `msd_to_mxm.csv` with the musiXmatch match list and the tagtraum genre
//! annotations, downloading both on first use, and writes `data_no_lyrics.csv`.

use anyhow::Result;
use clap::Parser;
use lyrics_genre_dataset::config::{AppConfig, CliConfig};
use lyrics_genre_dataset::logging::init_logging;
use lyrics_genre_dataset::merger::run_merge;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "merge-metadata")]
#[command(about = "Merge track id mappings with title, artist and genre metadata")]
struct Args {
    /// Directory holding the dataset files.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Path to a TOML config file. Its values take precedence over the flags.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging()?;

    let cli = CliConfig {
        data_dir: args.data_dir,
        ..Default::default()
    };
    let config = AppConfig::load(&cli, args.config.as_deref())?;

    let written = run_merge(&config).await?;
    info!("Wrote {} tracks with metadata", written);
    Ok(())
}
