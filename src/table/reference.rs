//! Readers for the two downloaded reference tables.
//!
//! Both files start with a fixed-size comment header which is skipped by line count,
//! not by inspecting the lines.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::warn;

/// Header lines at the top of `mxm_779k_matches.txt`.
pub const MATCH_TABLE_SKIP_LINES: usize = 18;
/// Header lines at the top of `msd_tagtraum_cd2c.cls`.
pub const GENRE_TABLE_SKIP_LINES: usize = 7;

const MATCH_TABLE_SEPARATOR: &str = "<SEP>";
const GENRE_TABLE_SEPARATOR: &str = "\t";

/// One line of the full MSD to musiXmatch match list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRow {
    pub msd_tid: String,
    pub msd_artist_name: String,
    pub msd_title: String,
    pub mxm_tid: String,
    pub mxm_artist_name: String,
    pub mxm_title: String,
}

/// One line of the tagtraum genre annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreRow {
    pub msd_tid: String,
    pub genre: String,
}

pub fn read_match_table(path: &Path) -> Result<Vec<MatchRow>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open match table: {:?}", path))?;
    parse_match_table(BufReader::new(file))
        .with_context(|| format!("Failed to read match table: {:?}", path))
}

pub fn read_genre_table(path: &Path) -> Result<Vec<GenreRow>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open genre table: {:?}", path))?;
    parse_genre_table(BufReader::new(file))
        .with_context(|| format!("Failed to read genre table: {:?}", path))
}

pub fn parse_match_table<R: BufRead>(reader: R) -> Result<Vec<MatchRow>> {
    let rows = split_lines(
        reader,
        MATCH_TABLE_SKIP_LINES,
        MATCH_TABLE_SEPARATOR,
        6,
        "match table",
    )?;
    Ok(rows
        .into_iter()
        .map(|mut fields| {
            // Field order on disk: msd_tid, msd_artist, msd_title, mxm_tid, mxm_artist, mxm_title
            let mxm_title = fields.pop().unwrap_or_default();
            let mxm_artist_name = fields.pop().unwrap_or_default();
            let mxm_tid = fields.pop().unwrap_or_default();
            let msd_title = fields.pop().unwrap_or_default();
            let msd_artist_name = fields.pop().unwrap_or_default();
            let msd_tid = fields.pop().unwrap_or_default();
            MatchRow {
                msd_tid,
                msd_artist_name,
                msd_title,
                mxm_tid,
                mxm_artist_name,
                mxm_title,
            }
        })
        .collect())
}

pub fn parse_genre_table<R: BufRead>(reader: R) -> Result<Vec<GenreRow>> {
    let rows = split_lines(
        reader,
        GENRE_TABLE_SKIP_LINES,
        GENRE_TABLE_SEPARATOR,
        2,
        "genre table",
    )?;
    Ok(rows
        .into_iter()
        .map(|mut fields| {
            let genre = fields.pop().unwrap_or_default();
            let msd_tid = fields.pop().unwrap_or_default();
            GenreRow { msd_tid, genre }
        })
        .collect())
}

/// Splits every line after the header into exactly `field_count` fields.
/// Blank lines are ignored; lines with any other field count are dropped and reported once.
fn split_lines<R: BufRead>(
    reader: R,
    skip: usize,
    separator: &str,
    field_count: usize,
    table_name: &str,
) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    let mut malformed = 0usize;

    for (line_number, line) in reader.lines().enumerate().skip(skip) {
        let line = line.with_context(|| format!("Failed to read line {}", line_number + 1))?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<String> = line.split(separator).map(str::to_string).collect();
        if fields.len() != field_count {
            malformed += 1;
            continue;
        }
        rows.push(fields);
    }

    if malformed > 0 {
        warn!(
            "Skipped {} malformed lines in {} (expected {} fields)",
            malformed, table_name, field_count
        );
    }

    Ok(rows)
}
