//! Workspace snapshot persistence.
//!
//! A snapshot is an immutable value object capturing the workspace's
//! restorable state: active document, per-document modified flags, and
//! the logging-enabled set. The [`SnapshotStore`] caretaker knows only
//! the storage location, never the workspace internals.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

/// Default snapshot file name, written next to the documents.
pub const SNAPSHOT_FILE: &str = ".quill_workspace.json";

/// One open document's persisted state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileState {
    /// Document name.
    pub name: String,
    /// Whether the document had unsaved changes.
    pub modified: bool,
}

/// Immutable capture of restorable workspace state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceSnapshot {
    /// Active document name, if any.
    pub active: Option<String>,
    /// Open documents in activation order.
    #[serde(default, deserialize_with = "deserialize_files")]
    pub files: Vec<FileState>,
    /// Documents with logging enabled.
    #[serde(default)]
    pub logged_files: Vec<String>,
}

/// Accepts both the current `{name, modified}` entries and the legacy
/// form where `files` is a plain list of names (implied unmodified).
fn deserialize_files<'de, D>(deserializer: D) -> Result<Vec<FileState>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Entry {
        Named {
            name: String,
            #[serde(default)]
            modified: bool,
        },
        Bare(String),
    }

    let entries = Vec::<Entry>::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            Entry::Named { name, modified } => FileState { name, modified },
            Entry::Bare(name) => FileState {
                name,
                modified: false,
            },
        })
        .collect())
}

/// Caretaker persisting snapshots to one JSON file.
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Creates a store over an explicit path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store over `SNAPSHOT_FILE` inside `dir`.
    #[must_use]
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join(SNAPSHOT_FILE),
        }
    }

    /// Returns the storage path.
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Writes a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the file write fails.
    pub fn save(&self, snapshot: &WorkspaceSnapshot) -> io::Result<()> {
        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, json)?;
        tracing::info!("workspace snapshot saved to {}", self.path.display());
        Ok(())
    }

    /// Reads the snapshot if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(&self) -> io::Result<Option<WorkspaceSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let snapshot = serde_json::from_str(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Some(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            active: Some("a.txt".to_string()),
            files: vec![
                FileState {
                    name: "a.txt".to_string(),
                    modified: true,
                },
                FileState {
                    name: "b.xml".to_string(),
                    modified: false,
                },
            ],
            logged_files: vec!["b.xml".to_string()],
        }
    }

    #[test]
    fn test_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::in_dir(dir.path());

        assert_eq!(store.load().unwrap(), None);

        let snapshot = sample();
        store.save(&snapshot).unwrap();
        assert_eq!(store.load().unwrap(), Some(snapshot));
    }

    #[test]
    fn test_serialized_layout() {
        let json = serde_json::to_string(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["active"], "a.txt");
        assert_eq!(value["files"][0]["name"], "a.txt");
        assert_eq!(value["files"][0]["modified"], true);
        assert_eq!(value["logged_files"][0], "b.xml");
    }

    #[test]
    fn test_legacy_bare_name_list_accepted() {
        let legacy = r#"{"active": "a.txt", "files": ["a.txt", "b.xml"], "logged_files": []}"#;
        let snapshot: WorkspaceSnapshot = serde_json::from_str(legacy).unwrap();
        assert_eq!(
            snapshot.files,
            vec![
                FileState {
                    name: "a.txt".to_string(),
                    modified: false
                },
                FileState {
                    name: "b.xml".to_string(),
                    modified: false
                },
            ]
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let snapshot: WorkspaceSnapshot = serde_json::from_str(r#"{"active": null}"#).unwrap();
        assert!(snapshot.files.is_empty());
        assert!(snapshot.logged_files.is_empty());
    }
}
