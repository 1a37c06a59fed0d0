use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::StorageResult;

/// Hidden quarantine subtree at the vault root.
pub const TRASH_DIR_NAME: &str = ".notedrive-trash";

/// Ledger file inside the quarantine subtree.
pub const TRASH_META_FILE_NAME: &str = "trash-meta.json";

/// Whether a ledger entry quarantines a note file or a folder subtree.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrashKind {
    Note,
    Folder,
}

/// One soft-deleted item. `original_path` and `trash_path` are relative to
/// the vault root and stay ledger-side; the UI only ever sees the id, title
/// and deletion time.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrashEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TrashKind,
    pub title: String,
    pub deleted_at: DateTime<Utc>,
    pub original_path: String,
    pub trash_path: String,
    /// For folders: colors that existed under the subtree at deletion time,
    /// keyed by suffix relative to the folder id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_color_snapshot: Option<BTreeMap<String, String>>,
}

/// The trash ledger: an append-mostly list of quarantined items.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrashMeta {
    #[serde(default)]
    pub entries: Vec<TrashEntry>,
}

/// Path of the quarantine subtree for a vault root.
pub fn trash_root(root: &Path) -> PathBuf {
    root.join(TRASH_DIR_NAME)
}

fn trash_meta_path(root: &Path) -> PathBuf {
    trash_root(root).join(TRASH_META_FILE_NAME)
}

/// Creates the quarantine layout (`notes/` and `folders/` partitions) if it
/// does not exist yet.
pub fn ensure_trash_root(root: &Path) -> StorageResult<()> {
    let trash = trash_root(root);
    fs::create_dir_all(trash.join("notes"))?;
    fs::create_dir_all(trash.join("folders"))?;
    Ok(())
}

/// Reads the ledger, creating the quarantine layout on the way. Missing or
/// corrupt ledger files degrade to an empty ledger.
pub fn read_trash_meta(root: &Path) -> StorageResult<TrashMeta> {
    ensure_trash_root(root)?;
    let path = trash_meta_path(root);
    if !path.exists() {
        return Ok(TrashMeta::default());
    }
    Ok(fs::read_to_string(&path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default())
}

/// Rewrites the ledger wholesale.
pub fn write_trash_meta(root: &Path, meta: &TrashMeta) -> StorageResult<()> {
    ensure_trash_root(root)?;
    let json = serde_json::to_string_pretty(meta)?;
    fs::write(trash_meta_path(root), json)?;
    Ok(())
}

/// A fresh opaque ledger id: millisecond timestamp plus a short random
/// suffix, distinct from any note or folder path.
pub fn new_entry_id() -> String {
    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(6).collect();
    format!("{}-{}", Utc::now().timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_trash_root_creates_partitions() {
        let temp_dir = tempdir().unwrap();
        ensure_trash_root(temp_dir.path()).unwrap();
        assert!(trash_root(temp_dir.path()).join("notes").is_dir());
        assert!(trash_root(temp_dir.path()).join("folders").is_dir());
    }

    #[test]
    fn test_read_trash_meta_missing_is_empty() {
        let temp_dir = tempdir().unwrap();
        let meta = read_trash_meta(temp_dir.path()).unwrap();
        assert!(meta.entries.is_empty());
    }

    #[test]
    fn test_ledger_round_trip() {
        let temp_dir = tempdir().unwrap();
        let meta = TrashMeta {
            entries: vec![TrashEntry {
                id: new_entry_id(),
                kind: TrashKind::Note,
                title: "shopping".to_string(),
                deleted_at: Utc::now(),
                original_path: "shopping.md".to_string(),
                trash_path: ".notedrive-trash/notes/123-shopping.md".to_string(),
                folder_color_snapshot: None,
            }],
        };
        write_trash_meta(temp_dir.path(), &meta).unwrap();
        assert_eq!(read_trash_meta(temp_dir.path()).unwrap(), meta);
    }

    #[test]
    fn test_entry_serializes_with_type_field() {
        let entry = TrashEntry {
            id: "1-abc".to_string(),
            kind: TrashKind::Folder,
            title: "projects".to_string(),
            deleted_at: Utc::now(),
            original_path: "projects".to_string(),
            trash_path: ".notedrive-trash/folders/1-projects".to_string(),
            folder_color_snapshot: Some(BTreeMap::new()),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json.get("type").and_then(|v| v.as_str()), Some("folder"));
        assert!(json.get("originalPath").is_some());
        assert!(json.get("trashPath").is_some());
        assert!(json.get("folderColorSnapshot").is_some());
    }

    #[test]
    fn test_new_entry_ids_are_distinct() {
        assert_ne!(new_entry_id(), new_entry_id());
    }
}
