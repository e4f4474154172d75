//! Mountain dataset loading and append-only ingestion.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::DataLoadError;
use crate::model::{Dataset, DatasetMetadata, Mountain};

#[derive(Debug, Clone)]
pub struct MountainStore {
    path: PathBuf,
    metadata: DatasetMetadata,
    mountains: Vec<Mountain>,
}

impl MountainStore {
    pub fn load(path: &Path) -> Result<Self, DataLoadError> {
        let dataset = read_dataset(path)?;
        if dataset.mountains.is_empty() {
            return Err(DataLoadError::Empty(path.to_path_buf()));
        }
        validate_records(&dataset.mountains)?;
        info!(
            "loaded {} mountains from {}",
            dataset.mountains.len(),
            path.display()
        );
        Ok(Self {
            path: path.to_path_buf(),
            metadata: dataset.metadata,
            mountains: dataset.mountains,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata(&self) -> &DatasetMetadata {
        &self.metadata
    }

    /// Records in dataset order.
    pub fn all(&self) -> &[Mountain] {
        &self.mountains
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Mountain> {
        self.mountains.iter().find(|mountain| mountain.id == id)
    }

    pub fn len(&self) -> usize {
        self.mountains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mountains.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub added: Vec<String>,
    pub skipped: Vec<String>,
    pub total: usize,
}

/// Appends records whose ids are not yet present and rewrites the dataset file
/// with an updated `total_mountains`. Existing records are never modified.
/// A missing dataset file is created.
pub fn append_mountains(
    path: &Path,
    incoming: Vec<Mountain>,
    updated_at: &str,
) -> Result<IngestSummary, DataLoadError> {
    let mut dataset = if path.exists() {
        read_dataset(path)?
    } else {
        Dataset::default()
    };
    validate_records(&dataset.mountains)?;
    validate_records(&incoming)?;

    let mut known: HashSet<String> = dataset
        .mountains
        .iter()
        .map(|mountain| mountain.id.clone())
        .collect();
    let mut summary = IngestSummary::default();
    for mountain in incoming {
        if known.insert(mountain.id.clone()) {
            summary.added.push(mountain.id.clone());
            dataset.mountains.push(mountain);
        } else {
            summary.skipped.push(mountain.id);
        }
    }

    dataset.metadata.total_mountains = dataset.mountains.len();
    if dataset.metadata.version.is_empty() {
        dataset.metadata.version = "1.0".to_string();
    }
    if !summary.added.is_empty() {
        dataset.metadata.last_updated = Some(updated_at.to_string());
    }
    summary.total = dataset.mountains.len();

    let encoded = serde_json::to_string_pretty(&dataset).map_err(|source| {
        DataLoadError::Malformed {
            path: path.to_path_buf(),
            source,
        }
    })?;
    fs::write(path, format!("{encoded}\n")).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(summary)
}

/// Parses a file holding either a full dataset or a bare array of mountains.
pub fn read_mountain_records(path: &Path) -> Result<Vec<Mountain>, DataLoadError> {
    let raw = read_file(path)?;
    let value: serde_json::Value =
        serde_json::from_str(&raw).map_err(|source| DataLoadError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
    let records = if value.is_array() {
        serde_json::from_value::<Vec<Mountain>>(value)
    } else {
        serde_json::from_value::<Dataset>(value).map(|dataset| dataset.mountains)
    };
    records.map_err(|source| DataLoadError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

fn read_dataset(path: &Path) -> Result<Dataset, DataLoadError> {
    let raw = read_file(path)?;
    serde_json::from_str(&raw).map_err(|source| DataLoadError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

fn read_file(path: &Path) -> Result<String, DataLoadError> {
    fs::read_to_string(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn validate_records(mountains: &[Mountain]) -> Result<(), DataLoadError> {
    let mut seen = HashSet::new();
    for (index, mountain) in mountains.iter().enumerate() {
        if mountain.id.trim().is_empty() {
            return Err(DataLoadError::MissingKey { index, field: "id" });
        }
        if mountain.name.trim().is_empty() {
            return Err(DataLoadError::MissingKey {
                index,
                field: "name",
            });
        }
        if !seen.insert(mountain.id.as_str()) {
            return Err(DataLoadError::DuplicateId(mountain.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).expect("write dataset");
        path
    }

    const TWO: &str = r#"{
        "metadata": {"total_mountains": 2, "version": "1.0"},
        "mountains": [
            {"id": "mt_takao_tokyo", "name": "高尾山", "elevation": 599},
            {"id": "mt_tsukuba_ibaraki", "name": "筑波山", "elevation": 877}
        ]
    }"#;

    #[test]
    fn load_exposes_records_in_order() {
        let dir = TempDir::new().expect("tempdir");
        let store = MountainStore::load(&write(&dir, "m.json", TWO)).expect("load");
        assert_eq!(store.len(), 2);
        assert_eq!(store.all()[0].name, "高尾山");
        assert_eq!(store.metadata().version, "1.0");
        assert_eq!(
            store.get_by_id("mt_tsukuba_ibaraki").map(|m| m.elevation),
            Some(Some(877))
        );
        assert!(store.get_by_id("mt_missing").is_none());
    }

    #[test]
    fn missing_file_is_data_load_error() {
        let dir = TempDir::new().expect("tempdir");
        let err = MountainStore::load(&dir.path().join("nope.json")).expect_err("expected error");
        assert!(matches!(err, DataLoadError::Io { .. }));
    }

    #[test]
    fn malformed_json_is_data_load_error() {
        let dir = TempDir::new().expect("tempdir");
        let err = MountainStore::load(&write(&dir, "m.json", "{\"mountains\": [")).expect_err("expected error");
        assert!(matches!(err, DataLoadError::Malformed { .. }));
    }

    #[test]
    fn empty_dataset_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let err = MountainStore::load(&write(&dir, "m.json", "{\"mountains\": []}"))
            .expect_err("expected error");
        assert!(err.to_string().contains("no mountains"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let dir = TempDir::new().expect("tempdir");
        let raw = r#"{"mountains": [{"id": "a", "name": "A"}, {"id": "a", "name": "B"}]}"#;
        let err = MountainStore::load(&write(&dir, "m.json", raw)).expect_err("expected error");
        assert!(err.to_string().contains("duplicate mountain id: a"));
    }

    #[test]
    fn append_skips_known_ids_and_updates_total() {
        let dir = TempDir::new().expect("tempdir");
        let path = write(&dir, "m.json", TWO);
        let incoming = vec![
            Mountain {
                id: "mt_takao_tokyo".to_string(),
                name: "高尾山".to_string(),
                ..Mountain::default()
            },
            Mountain {
                id: "mt_oyama_kanagawa".to_string(),
                name: "大山".to_string(),
                elevation: Some(1252),
                ..Mountain::default()
            },
        ];
        let summary = append_mountains(&path, incoming, "2026-01-01").expect("append");
        assert_eq!(summary.added, vec!["mt_oyama_kanagawa"]);
        assert_eq!(summary.skipped, vec!["mt_takao_tokyo"]);
        assert_eq!(summary.total, 3);

        let store = MountainStore::load(&path).expect("reload");
        assert_eq!(store.metadata().total_mountains, 3);
        assert_eq!(store.metadata().last_updated.as_deref(), Some("2026-01-01"));
        assert_eq!(store.all()[0].elevation, Some(599));
        assert_eq!(store.all()[2].name, "大山");
    }

    #[test]
    fn records_file_accepts_bare_array() {
        let dir = TempDir::new().expect("tempdir");
        let path = write(&dir, "new.json", r#"[{"id": "b", "name": "B"}]"#);
        let records = read_mountain_records(&path).expect("read");
        assert_eq!(records.len(), 1);
    }
}
