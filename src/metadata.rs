use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::StorageResult;

/// Sidecar file at the vault root holding folder color assignments.
pub const META_FILE_NAME: &str = ".notedrive-meta.json";

/// The folder-color metadata store: one JSON object mapping folder id to a
/// hex color. Lazily created on first assignment, read on every scan,
/// rewritten wholesale on every mutation.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetaFile {
    #[serde(default)]
    pub folder_colors: BTreeMap<String, String>,
}

impl MetaFile {
    /// True when `key` is `folder_id` itself or nested under it.
    fn key_under(key: &str, folder_id: &str) -> bool {
        key == folder_id || (key.len() > folder_id.len() && key.starts_with(folder_id) && key.as_bytes()[folder_id.len()] == b'/')
    }

    /// Rewrites every key equal to `old_id`, or prefixed by `old_id + "/"`,
    /// to the corresponding `new_id`-based key, preserving any deeper-path
    /// suffix. Color assignments on descendant folders survive an ancestor
    /// rename or move this way.
    pub fn rewrite_prefix(&mut self, old_id: &str, new_id: &str) {
        let mut next = BTreeMap::new();
        for (key, color) in std::mem::take(&mut self.folder_colors) {
            if Self::key_under(&key, old_id) {
                let suffix = &key[old_id.len()..];
                next.insert(format!("{}{}", new_id, suffix), color);
            } else {
                next.insert(key, color);
            }
        }
        self.folder_colors = next;
    }

    /// Drops every key equal to or nested under `folder_id`.
    pub fn remove_prefix(&mut self, folder_id: &str) {
        self.folder_colors
            .retain(|key, _| !Self::key_under(key, folder_id));
    }

    /// Captures the colors at or under `folder_id`, re-keyed as suffixes
    /// relative to the folder (the folder itself maps to the empty suffix).
    /// Used to snapshot a subtree's colors before it moves to the trash.
    pub fn snapshot_prefix(&self, folder_id: &str) -> BTreeMap<String, String> {
        self.folder_colors
            .iter()
            .filter(|(key, _)| Self::key_under(key, folder_id))
            .map(|(key, color)| (key[folder_id.len()..].to_string(), color.clone()))
            .collect()
    }

    /// Re-applies a snapshot under a (possibly different) restored folder
    /// id by rejoining each suffix key.
    pub fn apply_snapshot(&mut self, restored_id: &str, snapshot: &BTreeMap<String, String>) {
        for (suffix, color) in snapshot {
            self.folder_colors
                .insert(format!("{}{}", restored_id, suffix), color.clone());
        }
    }
}

fn meta_file_path(root: &Path) -> PathBuf {
    root.join(META_FILE_NAME)
}

/// Reads the metadata sidecar. A missing or corrupt file degrades to the
/// empty store so a scan never fails on sidecar damage.
pub fn read_meta(root: &Path) -> MetaFile {
    let path = meta_file_path(root);
    if !path.exists() {
        return MetaFile::default();
    }
    fs::read_to_string(&path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

/// Rewrites the metadata sidecar wholesale.
pub fn write_meta(root: &Path, meta: &MetaFile) -> StorageResult<()> {
    let json = serde_json::to_string_pretty(meta)?;
    fs::write(meta_file_path(root), json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store(pairs: &[(&str, &str)]) -> MetaFile {
        MetaFile {
            folder_colors: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_rewrite_prefix_on_rename() {
        let mut meta = store(&[
            ("projects", "#ff0000"),
            ("projects/ideas", "#00ff00"),
            ("journal", "#0000ff"),
        ]);
        meta.rewrite_prefix("projects", "work");

        assert_eq!(meta.folder_colors.get("work").map(String::as_str), Some("#ff0000"));
        assert_eq!(
            meta.folder_colors.get("work/ideas").map(String::as_str),
            Some("#00ff00")
        );
        assert_eq!(
            meta.folder_colors.get("journal").map(String::as_str),
            Some("#0000ff")
        );
        assert!(!meta.folder_colors.contains_key("projects"));
        assert!(!meta.folder_colors.contains_key("projects/ideas"));
    }

    #[test]
    fn test_rewrite_prefix_ignores_name_prefix_siblings() {
        let mut meta = store(&[("projects", "#111111"), ("projects-archive", "#222222")]);
        meta.rewrite_prefix("projects", "work");
        assert!(meta.folder_colors.contains_key("work"));
        assert!(meta.folder_colors.contains_key("projects-archive"));
    }

    #[test]
    fn test_remove_prefix() {
        let mut meta = store(&[
            ("projects", "#111111"),
            ("projects/ideas", "#222222"),
            ("journal", "#333333"),
        ]);
        meta.remove_prefix("projects");
        assert_eq!(meta.folder_colors.len(), 1);
        assert!(meta.folder_colors.contains_key("journal"));
    }

    #[test]
    fn test_snapshot_prefix_uses_suffix_keys() {
        let meta = store(&[
            ("projects", "#111111"),
            ("projects/ideas", "#222222"),
            ("journal", "#333333"),
        ]);
        let snapshot = meta.snapshot_prefix("projects");
        assert_eq!(snapshot.get("").map(String::as_str), Some("#111111"));
        assert_eq!(snapshot.get("/ideas").map(String::as_str), Some("#222222"));
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn test_apply_snapshot_under_new_id() {
        let meta = store(&[("projects", "#111111"), ("projects/ideas", "#222222")]);
        let snapshot = meta.snapshot_prefix("projects");

        let mut live = MetaFile::default();
        live.apply_snapshot("projects-1", &snapshot);
        assert_eq!(
            live.folder_colors.get("projects-1").map(String::as_str),
            Some("#111111")
        );
        assert_eq!(
            live.folder_colors.get("projects-1/ideas").map(String::as_str),
            Some("#222222")
        );
    }

    #[test]
    fn test_read_meta_missing_file_is_empty() {
        let temp_dir = tempdir().unwrap();
        assert_eq!(read_meta(temp_dir.path()), MetaFile::default());
    }

    #[test]
    fn test_read_meta_corrupt_file_is_empty() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join(META_FILE_NAME), "{not json").unwrap();
        assert_eq!(read_meta(temp_dir.path()), MetaFile::default());
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let temp_dir = tempdir().unwrap();
        let meta = store(&[("projects", "#ff0000")]);
        write_meta(temp_dir.path(), &meta).unwrap();
        assert_eq!(read_meta(temp_dir.path()), meta);
    }
}
