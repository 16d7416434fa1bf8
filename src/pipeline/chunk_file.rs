use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Keyed-record file: row position to lyrics record, or `null` when the row has none.
///
/// Positions are written as string keys in numeric order, which is also the layout of
/// the consolidated dataset file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkFile {
    rows: BTreeMap<usize, Option<Value>>,
}

impl ChunkFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, position: usize, record: Option<Value>) {
        self.rows.insert(position, record);
    }

    pub fn get(&self, position: usize) -> Option<&Option<Value>> {
        self.rows.get(&position)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows carrying a record.
    pub fn found(&self) -> usize {
        self.rows.values().filter(|record| record.is_some()).count()
    }

    pub fn into_rows(self) -> impl Iterator<Item = (usize, Option<Value>)> {
        self.rows.into_iter()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read chunk file: {:?}", path))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse chunk file: {:?}", path))
    }

    /// Writes the file through a temporary sibling that is renamed into place, so
    /// `path` either holds the previous content or the complete new one.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut temp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {:?}", dir))?;
        serde_json::to_writer(&mut temp, self)
            .with_context(|| format!("Failed to serialize chunk file: {:?}", path))?;
        temp.flush()
            .with_context(|| format!("Failed to write chunk file: {:?}", path))?;
        temp.persist(path)
            .with_context(|| format!("Failed to move chunk file into place: {:?}", path))?;
        Ok(())
    }
}

impl FromIterator<(usize, Option<Value>)> for ChunkFile {
    fn from_iter<I: IntoIterator<Item = (usize, Option<Value>)>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}
