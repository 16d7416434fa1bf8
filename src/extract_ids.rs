//! ID extraction tool
//!
//! Reads the musiXmatch SQLite dataset and writes the deduplicated mapping of MSD track
//! ids to musiXmatch track ids as `msd_to_mxm.csv`.

use anyhow::Result;
use clap::Parser;
use lyrics_genre_dataset::config::{AppConfig, CliConfig};
use lyrics_genre_dataset::extractor::run_extract;
use lyrics_genre_dataset::logging::init_logging;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "extract-ids")]
#[command(about = "Extract MSD to musiXmatch track id mappings from the SQLite dataset")]
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

    let written = run_extract(&config)?;
    info!("Extracted {} track id mappings", written);
    Ok(())
}
