//! Durable local copy of the ticket cache.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::ticket::Ticket;

use super::SyncError;

/// Fixed key under which the snapshot is stored.
pub const SNAPSHOT_KEY: &str = "queue_tickets";

/// A single durable slot holding the last known ticket list.
pub trait SnapshotStore: Send + Sync {
    /// `Ok(None)` if nothing has been saved yet.
    fn load(&self) -> Result<Option<Vec<Ticket>>, SyncError>;

    /// Overwrite the slot.
    fn save(&self, tickets: &[Ticket]) -> Result<(), SyncError>;

    /// Remove the slot.
    fn clear(&self) -> Result<(), SyncError>;
}

/// Snapshot kept as a JSON array in `<dir>/queue_tickets.json`.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", SNAPSHOT_KEY)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> Result<Option<Vec<Ticket>>, SyncError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(SyncError::Snapshot(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| SyncError::Snapshot(format!("corrupt snapshot: {}", e)))
    }

    fn save(&self, tickets: &[Ticket]) -> Result<(), SyncError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SyncError::Snapshot(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }

        let json =
            serde_json::to_string(tickets).map_err(|e| SyncError::Snapshot(e.to_string()))?;

        // Write then rename so a crash never leaves a half-written snapshot.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .and_then(|_| fs::rename(&tmp, &self.path))
            .map_err(|e| {
                SyncError::Snapshot(format!("failed to write {}: {}", self.path.display(), e))
            })
    }

    fn clear(&self) -> Result<(), SyncError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SyncError::Snapshot(format!(
                "failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ServiceCategory;
    use tempfile::TempDir;

    fn tickets() -> Vec<Ticket> {
        vec![
            Ticket::waiting("1", "A001", ServiceCategory::Priority, Some("Maria"), 10),
            Ticket::waiting("2", "G001", ServiceCategory::Payment, None, 20),
        ]
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("nested"));

        store.save(&tickets()).unwrap();
        assert_eq!(store.load().unwrap(), Some(tickets()));
        assert!(store.path().ends_with("queue_tickets.json"));
    }

    #[test]
    fn test_save_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path());

        store.save(&tickets()).unwrap();
        store.save(&tickets()[..1]).unwrap();
        assert_eq!(store.load().unwrap().unwrap().len(), 1);
    }

    #[test]
    fn test_clear() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path());

        store.save(&tickets()).unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);

        // Clearing twice is fine.
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = FileSnapshotStore::new(dir.path());
        fs::write(store.path(), "not json").unwrap();

        assert!(matches!(store.load(), Err(SyncError::Snapshot(_))));
    }
}
