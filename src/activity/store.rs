use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::UserId;

/// Durable part of the activity log. Open voice sessions are never stored here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub message_counts: BTreeMap<UserId, u64>,
    #[serde(default)]
    pub reaction_counts: BTreeMap<UserId, i64>,
    #[serde(default)]
    pub voice_times: BTreeMap<UserId, f64>,
}

impl Snapshot {
    /// Number of distinct users with any recorded activity.
    pub fn user_count(&self) -> usize {
        let mut ids: Vec<&UserId> = self
            .message_counts
            .keys()
            .chain(self.reaction_counts.keys())
            .chain(self.voice_times.keys())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("snapshot at {} is not valid JSON: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to encode snapshot: {0}")]
    Encode(serde_json::Error),
}

/// JSON file holding a [`Snapshot`].
#[derive(Clone, Debug)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `Ok(None)` when the file does not exist yet.
    pub fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })
    }

    /// Writes the snapshot to a sibling temp file and renames it over the
    /// target, so a crash mid-write leaves the previous file intact.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let payload = encode(snapshot)?;
        let temp_path = self.temp_path();
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&payload)?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("activity_data.json"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn encode(snapshot: &Snapshot) -> Result<Vec<u8>, StoreError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    snapshot
        .serialize(&mut serializer)
        .map_err(StoreError::Encode)?;
    buf.push(b'\n');
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        let mut snapshot = Snapshot::default();
        snapshot.message_counts.insert("42".to_string(), 7);
        snapshot.reaction_counts.insert("42".to_string(), -2);
        snapshot.voice_times.insert("99".to_string(), 90.5);
        snapshot
    }

    #[test]
    fn test_missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("activity_data.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_restores_mappings() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("activity_data.json"));

        store.save(&sample()).unwrap();
        let loaded = store.load().unwrap().unwrap();

        assert_eq!(loaded, sample());
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("data").join("activity.json"));

        store.save(&sample()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_file_layout_uses_named_fields_and_indentation() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("activity_data.json"));
        store.save(&sample()).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.starts_with("{\n    \"message_counts\": {\n        \"42\": 7"));
        assert!(raw.contains("\"reaction_counts\""));
        assert!(raw.contains("\"voice_times\""));
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("activity_data.json"));
        fs::write(store.path(), r#"{"message_counts": {"1": 3}}"#).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.message_counts.get("1"), Some(&3));
        assert!(loaded.reaction_counts.is_empty());
        assert!(loaded.voice_times.is_empty());
    }

    #[test]
    fn test_integer_voice_times_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("activity_data.json"));
        fs::write(store.path(), r#"{"voice_times": {"5": 60}}"#).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.voice_times.get("5"), Some(&60.0));
    }

    #[test]
    fn test_corrupt_file_is_reported_and_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("activity_data.json"));
        fs::write(store.path(), "{ not json").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "{ not json");
    }

    #[test]
    fn test_user_count_deduplicates_across_mappings() {
        let mut snapshot = sample();
        snapshot.voice_times.insert("42".to_string(), 1.0);
        assert_eq!(snapshot.user_count(), 2);
    }
}
