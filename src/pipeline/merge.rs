//! Chunk merge stage: every chunk file of `lyric_chunks/` into one dataset file.

use super::chunk_file::ChunkFile;
use super::window::RowRange;
use crate::config::AppConfig;
use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Chunk files of `dir`, ordered by their first row.
///
/// Files whose name is not `{first}-{last}.json` are ignored. The order is numeric, so
/// `900-999.json` comes before `1000-1099.json`.
pub fn list_chunk_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!(
            "Could not find the lyric chunks directory {:?}. Run fetch-lyrics first",
            dir
        );
    }

    let mut chunks: Vec<(RowRange, PathBuf)> = Vec::new();
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("Failed to list directory: {:?}", dir))?
    {
        let entry = entry.with_context(|| format!("Failed to list directory: {:?}", dir))?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        match RowRange::from_file_name(name) {
            Some(range) if path.is_file() => chunks.push((range, path)),
            _ => debug!("Skipping {:?}, not a chunk file", path),
        }
    }

    if chunks.is_empty() {
        bail!("No chunk files found in {:?}", dir);
    }

    chunks.sort_by_key(|(range, _)| *range);
    Ok(chunks.into_iter().map(|(_, path)| path).collect())
}

/// Concatenates chunk files in the given order.
///
/// Rows are renumbered from 0; each record gains an `index` field holding the row
/// position it had in its chunk file. `null` rows stay `null`.
pub fn merge_chunks(paths: &[PathBuf]) -> Result<ChunkFile> {
    let mut merged = ChunkFile::new();
    let mut next = 0usize;

    for path in paths {
        let chunk = ChunkFile::load(path)?;
        debug!("Merging {:?} ({} rows)", path, chunk.len());

        for (position, record) in chunk.into_rows() {
            let record = record.map(|mut value| {
                if let Some(fields) = value.as_object_mut() {
                    fields.insert("index".to_string(), Value::from(position));
                }
                value
            });
            merged.insert(next, record);
            next += 1;
        }
    }

    Ok(merged)
}

/// Runs the merge stage and returns the number of rows written.
pub fn run_merge_chunks(config: &AppConfig) -> Result<usize> {
    let paths = list_chunk_files(&config.lyric_chunks_dir())?;
    info!("Merging {} chunk files", paths.len());

    let merged = merge_chunks(&paths)?;
    let out_path = config.merged_lyrics_path();
    merged.save(&out_path)?;

    info!(
        "Wrote {} rows ({} with lyrics records) to {:?}",
        merged.len(),
        merged.found(),
        out_path
    );
    Ok(merged.len())
}
