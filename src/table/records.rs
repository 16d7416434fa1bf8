use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Row of `msd_to_mxm.csv`: a Million Song Dataset track id paired with its
/// musiXmatch id and the train/test split flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentifierMapping {
    pub msd_tid: String,
    pub mxm_tid: String,
    #[serde(with = "int_flag")]
    pub is_test: bool,
}

/// Row of `data_no_lyrics.csv`, the input of the lyrics fetch stage.
/// Field order is the column order of the written file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub msd_tid: String,
    pub mxm_tid: String,
    pub title: String,
    pub artist: String,
    pub genre: String,
    #[serde(with = "int_flag")]
    pub is_test: bool,
}

/// Reads every row of a headed CSV file.
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .with_context(|| format!("Failed to parse CSV file: {:?}", path))
}

/// Writes rows to a headed CSV file, replacing any existing file.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {:?}", path))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write CSV row to {:?}", path))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush CSV file: {:?}", path))
}

/// `is_test` is stored as `0`/`1`, as it comes out of the SQLite source.
mod int_flag {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" => Ok(true),
            "0" | "false" => Ok(false),
            other => Err(D::Error::custom(format!("invalid is_test flag: {:?}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(msd_tid: &str, is_test: bool) -> EnrichedRecord {
        EnrichedRecord {
            msd_tid: msd_tid.to_string(),
            mxm_tid: "4418550".to_string(),
            title: "Face the Ashes".to_string(),
            artist: "Gob".to_string(),
            genre: "Rock".to_string(),
            is_test,
        }
    }

    #[test]
    fn test_enriched_record_column_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data_no_lyrics.csv");

        write_csv(&path, &[record("TRAAAAV128F421A322", false)]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next(),
            Some("msd_tid,mxm_tid,title,artist,genre,is_test")
        );
        assert_eq!(
            lines.next(),
            Some("TRAAAAV128F421A322,4418550,Face the Ashes,Gob,Rock,0")
        );
    }

    #[test]
    fn test_read_accepts_textual_flags() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("msd_to_mxm.csv");
        std::fs::write(
            &path,
            "msd_tid,mxm_tid,is_test\nTRA,1,1\nTRB,2,false\nTRC,3,True\n",
        )
        .unwrap();

        let rows: Vec<IdentifierMapping> = read_csv(&path).unwrap();
        let flags: Vec<bool> = rows.iter().map(|r| r.is_test).collect();
        assert_eq!(flags, vec![true, false, true]);
    }

    #[test]
    fn test_read_rejects_bad_flag() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("msd_to_mxm.csv");
        std::fs::write(&path, "msd_tid,mxm_tid,is_test\nTRA,1,maybe\n").unwrap();

        let result: Result<Vec<IdentifierMapping>> = read_csv(&path);
        assert!(result.is_err());
    }

    #[test]
    fn test_quoted_fields_survive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data_no_lyrics.csv");
        let mut row = record("TRA", true);
        row.title = "Hello, \"World\"".to_string();

        write_csv(&path, &[row.clone()]).unwrap();
        let back: Vec<EnrichedRecord> = read_csv(&path).unwrap();
        assert_eq!(back, vec![row]);
    }

    #[test]
    fn test_read_missing_file() {
        let result: Result<Vec<EnrichedRecord>> = read_csv(Path::new("/nonexistent/file.csv"));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to open CSV file"));
    }
}
