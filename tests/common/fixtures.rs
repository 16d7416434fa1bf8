//! Dataset fixtures written to temporary directories

use super::constants::*;
use anyhow::Result;
use lyrics_genre_dataset::config::{AppConfig, CliConfig, FetchConfig, FileConfig};
use rusqlite::Connection;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;

/// Creates a musiXmatch style SQLite dataset at `path`.
pub fn create_mxm_db(path: &Path) -> Result<()> {
    let conn = Connection::open(path)?;
    conn.execute_batch(
        "CREATE TABLE words (word TEXT PRIMARY KEY);
         CREATE TABLE lyrics (
             track_id TEXT,
             mxm_tid INT,
             word TEXT,
             count INT,
             is_test INT,
             FOREIGN KEY(word) REFERENCES words(word)
         );",
    )?;

    for word in ["i", "the", "you"] {
        conn.execute("INSERT INTO words (word) VALUES (?1)", [word])?;
        for (track_id, mxm_tid, is_test) in DB_MAPPINGS {
            conn.execute(
                "INSERT INTO lyrics (track_id, mxm_tid, word, count, is_test) \
                 VALUES (?1, ?2, ?3, 1, ?4)",
                rusqlite::params![track_id, mxm_tid, word, is_test],
            )?;
        }
    }
    Ok(())
}

/// The match list with its 18 line comment header.
pub fn match_list_text() -> String {
    let mut text = String::new();
    for i in 0..18 {
        text.push_str(&format!("# header line {}\n", i + 1));
    }
    for (i, (msd_tid, artist, title)) in MATCH_ROWS.iter().enumerate() {
        let mxm_tid = 900_000 + i;
        text.push_str(&format!(
            "{msd_tid}<SEP>{artist} (MSD)<SEP>{title} (Album Version)<SEP>{mxm_tid}<SEP>{artist}<SEP>{title}\n"
        ));
    }
    text
}

/// The genre annotations with their 7 line comment header.
pub fn genre_table_text() -> String {
    let mut text = String::new();
    for i in 0..7 {
        text.push_str(&format!("# tagtraum header {}\n", i + 1));
    }
    for (msd_tid, genre) in GENRE_ROWS {
        text.push_str(&format!("{}\t{}\n", msd_tid, genre));
    }
    text
}

/// Zip archive holding `text` as its only entry.
pub fn zip_text(name: &str, text: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(name, SimpleFileOptions::default())
        .expect("Failed to start zip entry");
    writer
        .write_all(text.as_bytes())
        .expect("Failed to write zip entry");
    writer
        .finish()
        .expect("Failed to finish zip archive")
        .into_inner()
}

/// Configuration pointing every remote source at `base_url`, with millisecond backoff.
pub fn test_config(data_dir: &Path, base_url: &str) -> AppConfig {
    let cli = CliConfig {
        data_dir: Some(data_dir.to_path_buf()),
        genius_access_token: Some(TEST_TOKEN.to_string()),
        concurrency: Some(4),
    };
    let file = FileConfig {
        mxm_matches_url: Some(format!("{}/files/mxm_779k_matches.txt.zip", base_url)),
        tagtraum_url: Some(format!("{}/files/msd_tagtraum_cd2c.cls.zip", base_url)),
        genius_api_base: Some(base_url.to_string()),
        request_timeout_secs: Some(5),
        fetch: Some(FetchConfig {
            max_retries: Some(3),
            initial_backoff_ms: Some(1),
            max_backoff_ms: Some(5),
            backoff_multiplier: Some(2.0),
        }),
        ..Default::default()
    };
    AppConfig::resolve(&cli, Some(file)).expect("Failed to resolve test config")
}
