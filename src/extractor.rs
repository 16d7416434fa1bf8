//! Extracts the MSD to musiXmatch id mapping from the musiXmatch SQLite dataset.
//!
//! The `lyrics` table holds one bag-of-words row per (track, word), so the same id
//! triple shows up many times; only the ids and the split flag are kept.

use crate::config::AppConfig;
use crate::table::{write_csv, IdentifierMapping};
use anyhow::{bail, Context, Result};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

const SELECT_MAPPINGS: &str = "SELECT DISTINCT track_id, mxm_tid, is_test FROM lyrics";

/// Reads the raw (track_id, mxm_tid, is_test) rows, `track_id` becoming `msd_tid`.
pub fn load_mappings(db_path: &Path) -> Result<Vec<IdentifierMapping>> {
    if !db_path.exists() {
        bail!(
            "Could not find musiXmatch SQLite DB file at {:?}. Download mxm_dataset.db from the \
             Million Song Dataset additional files and store it there",
            db_path
        );
    }

    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("Failed to open SQLite database: {:?}", db_path))?;

    let mut stmt = conn
        .prepare(SELECT_MAPPINGS)
        .context("Failed to prepare lyrics table query")?;
    let mappings = stmt
        .query_map([], |row| {
            Ok(IdentifierMapping {
                msd_tid: row.get(0)?,
                mxm_tid: value_to_text(row.get_ref(1)?),
                is_test: row.get::<_, i64>(2)? != 0,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to read lyrics table")?;

    Ok(mappings)
}

/// Drops duplicate rows keeping the first occurrence, then makes `msd_tid` unique.
///
/// Rows sharing an `msd_tid` but disagreeing on the other columns keep the first one.
pub fn dedup_mappings(rows: Vec<IdentifierMapping>) -> Vec<IdentifierMapping> {
    let mut seen_rows = HashSet::new();
    let mut seen_ids = HashSet::new();
    let mut unique = Vec::new();
    let mut conflicts = 0usize;

    for row in rows {
        if !seen_rows.insert(row.clone()) {
            continue;
        }
        if !seen_ids.insert(row.msd_tid.clone()) {
            conflicts += 1;
            continue;
        }
        unique.push(row);
    }

    if conflicts > 0 {
        warn!(
            "Dropped {} rows whose msd_tid was already mapped to a different mxm_tid/is_test",
            conflicts
        );
    }

    unique
}

/// Runs the extraction stage: SQLite dataset in, `msd_to_mxm.csv` out.
pub fn run_extract(config: &AppConfig) -> Result<usize> {
    let db_path = config.mxm_db_path();

    info!("Loading lyrics table from {:?}...", db_path);
    let raw = load_mappings(&db_path)?;
    info!("Loaded {} distinct id rows", raw.len());

    let mappings = dedup_mappings(raw);
    info!("Kept {} unique MSD to musiXmatch mappings", mappings.len());

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create data dir: {:?}", config.data_dir))?;

    let out_path = config.msd_to_mxm_path();
    info!("Writing mappings to {:?}", out_path);
    write_csv(&out_path, &mappings)?;

    Ok(mappings.len())
}

fn value_to_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).into_owned(),
    }
}
