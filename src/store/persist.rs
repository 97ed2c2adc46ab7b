#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::task::model::{StatusFilter, Task};

/// The persisted subset of store state. Transient flags (loading, error)
/// are not part of a snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Snapshot {
    pub tasks: Vec<Task>,
    pub filter: StatusFilter,
    pub search_query: String,
}

/// Durable key-value slot for store snapshots: one fixed-name JSON file in
/// the data directory, written atomically via tmp + rename.
#[derive(Debug, Clone)]
pub struct SnapshotStorage {
    path: PathBuf,
}

impl SnapshotStorage {
    #[must_use]
    pub fn new(dir: PathBuf, file: &str) -> Self {
        Self {
            path: dir.join(file),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the prior snapshot. An absent, unreadable, or corrupt file is
    /// not an error: the store falls back to its in-memory defaults.
    #[must_use]
    pub fn load(&self) -> Option<Snapshot> {
        if !self.path.exists() {
            return None;
        }
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "snapshot unreadable, starting empty");
                return None;
            }
        };
        match serde_json::from_slice(&data) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "snapshot corrupt, starting empty");
                None
            }
        }
    }

    pub fn save(&self, snapshot: &Snapshot) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_vec_pretty(snapshot)?;
        std::fs::write(&tmp, &data).with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path).with_context(|| {
            format!(
                "failed to rename {} -> {}",
                tmp.display(),
                self.path.display()
            )
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::model::{Priority, TaskStatus, now_rfc3339};

    fn snapshot_with_one_task() -> Snapshot {
        Snapshot {
            tasks: vec![Task {
                id: "ab12cd34".to_owned(),
                title: "Write docs".to_owned(),
                description: String::new(),
                status: TaskStatus::Pending,
                priority: Priority::High,
                created_at: now_rfc3339(),
                updated_at: None,
            }],
            filter: StatusFilter::Pending,
            search_query: "docs".to_owned(),
        }
    }

    #[test]
    fn save_then_load_restores_state() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = SnapshotStorage::new(dir.path().to_path_buf(), "taskdeck.json");

        let snapshot = snapshot_with_one_task();
        storage.save(&snapshot).expect("save");

        let loaded = storage.load().expect("snapshot present");
        assert_eq!(loaded, snapshot);
    }

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = SnapshotStorage::new(dir.path().to_path_buf(), "taskdeck.json");
        assert!(storage.load().is_none());
    }

    #[test]
    fn corrupt_file_loads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = SnapshotStorage::new(dir.path().to_path_buf(), "taskdeck.json");
        std::fs::write(storage.path(), b"{not json").expect("write");
        assert!(storage.load().is_none());
    }

    #[test]
    fn save_creates_missing_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage =
            SnapshotStorage::new(dir.path().join("nested").join("deeper"), "taskdeck.json");
        storage.save(&Snapshot::default()).expect("save");
        assert!(storage.path().exists());
    }
}
