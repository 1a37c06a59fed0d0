use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::errors::StorageResult;
use crate::frontmatter::extract_hashtags;
use crate::metadata::MetaFile;
use crate::models::{Folder, Note, StorageProvider, VaultData, ROOT_FOLDER_ID};

/// Walks the vault root and reconstructs the full live domain model.
///
/// Dot-prefixed entries (sidecar files, the trash quarantine) are invisible.
/// Only `.md` files become notes; every other directory becomes a folder
/// whose color comes from the metadata store. The resulting note list is
/// sorted descending by modification time as a default presentation order.
///
/// This is a full synchronous re-scan with one file read per note, executed
/// on every read request. Read-after-write simplicity is chosen over
/// incremental-update bookkeeping, which is fine at personal-vault scale.
pub fn scan_vault(root: &Path, meta: &MetaFile) -> StorageResult<VaultData> {
    let mut data = VaultData::default();
    if root.exists() {
        scan_directory(root, meta, ROOT_FOLDER_ID, &mut data)?;
    }
    data.notes
        .sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    Ok(data)
}

fn scan_directory(
    dir: &Path,
    meta: &MetaFile,
    parent_id: &str,
    data: &mut VaultData,
) -> StorageResult<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }

        let id = if parent_id == ROOT_FOLDER_ID {
            name.clone()
        } else {
            format!("{}/{}", parent_id, name)
        };
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            data.folders.push(Folder {
                id: id.clone(),
                name,
                parent_id: if parent_id == ROOT_FOLDER_ID {
                    None
                } else {
                    Some(parent_id.to_string())
                },
                color: meta.folder_colors.get(&id).cloned(),
            });
            scan_directory(&entry.path(), meta, &id, data)?;
            continue;
        }

        if !file_type.is_file() || !name.ends_with(".md") {
            continue;
        }

        // Decode lossily so one non-UTF-8 note cannot make the vault
        // unreadable.
        let content = String::from_utf8_lossy(&fs::read(entry.path())?).into_owned();
        let stat = entry.metadata()?;
        let updated_at: DateTime<Utc> = stat.modified()?.into();
        // Birth time is not available on every filesystem.
        let created_at: DateTime<Utc> = stat
            .created()
            .map(Into::into)
            .unwrap_or(updated_at);

        data.notes.push(Note {
            id,
            title: name.strip_suffix(".md").unwrap_or(&name).to_string(),
            hashtags: extract_hashtags(&content),
            content,
            folder_id: parent_id.to_string(),
            created_at,
            updated_at,
            storage_provider: StorageProvider::Local,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_scan_missing_root_is_empty() {
        let temp_dir = tempdir().unwrap();
        let data = scan_vault(&temp_dir.path().join("absent"), &MetaFile::default()).unwrap();
        assert!(data.notes.is_empty());
        assert!(data.folders.is_empty());
    }

    #[test]
    fn test_scan_builds_nested_model() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("projects/ideas")).unwrap();
        fs::write(root.join("top.md"), "# Top\n").unwrap();
        fs::write(root.join("projects/plan.md"), "# Plan\n\n#roadmap").unwrap();
        fs::write(root.join("projects/ideas/spark.md"), "# Spark\n").unwrap();

        let data = scan_vault(root, &MetaFile::default()).unwrap();

        let mut folder_ids: Vec<&str> = data.folders.iter().map(|f| f.id.as_str()).collect();
        folder_ids.sort();
        assert_eq!(folder_ids, vec!["projects", "projects/ideas"]);

        let projects = data.folders.iter().find(|f| f.id == "projects").unwrap();
        assert_eq!(projects.parent_id, None);
        let ideas = data.folders.iter().find(|f| f.id == "projects/ideas").unwrap();
        assert_eq!(ideas.parent_id.as_deref(), Some("projects"));
        assert_eq!(ideas.name, "ideas");

        assert_eq!(data.notes.len(), 3);
        let top = data.notes.iter().find(|n| n.id == "top.md").unwrap();
        assert_eq!(top.folder_id, ROOT_FOLDER_ID);
        assert_eq!(top.title, "top");
        let plan = data.notes.iter().find(|n| n.id == "projects/plan.md").unwrap();
        assert_eq!(plan.folder_id, "projects");
        assert_eq!(plan.hashtags, vec!["roadmap"]);
    }

    #[test]
    fn test_scan_skips_dot_entries_and_non_markdown() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join(".notedrive-trash/notes")).unwrap();
        fs::write(root.join(".notedrive-meta.json"), "{}").unwrap();
        fs::write(root.join(".hidden.md"), "secret").unwrap();
        fs::write(root.join("photo.png"), [0u8; 4]).unwrap();
        fs::write(root.join("real.md"), "# Real\n").unwrap();

        let data = scan_vault(root, &MetaFile::default()).unwrap();
        assert_eq!(data.notes.len(), 1);
        assert_eq!(data.notes[0].id, "real.md");
        assert!(data.folders.is_empty());
    }

    #[test]
    fn test_scan_attaches_folder_colors() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("projects")).unwrap();

        let mut meta = MetaFile::default();
        meta.folder_colors
            .insert("projects".to_string(), "#ff0000".to_string());

        let data = scan_vault(root, &meta).unwrap();
        assert_eq!(data.folders[0].color.as_deref(), Some("#ff0000"));
    }

    #[test]
    fn test_scan_tolerates_malformed_front_matter() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("broken.md"), "---\ntags: [oops\n---\n#rescued").unwrap();

        let data = scan_vault(root, &MetaFile::default()).unwrap();
        assert_eq!(data.notes[0].hashtags, vec!["rescued"]);
    }

    #[test]
    fn test_scan_decodes_non_utf8_note_lossily() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("legacy.md"), [0x23, 0x20, 0xE9, 0xFF, 0x0A]).unwrap();
        fs::write(root.join("clean.md"), "# Clean\n").unwrap();

        let data = scan_vault(root, &MetaFile::default()).unwrap();
        assert_eq!(data.notes.len(), 2);
        let legacy = data.notes.iter().find(|n| n.id == "legacy.md").unwrap();
        assert!(legacy.content.contains('\u{FFFD}'));
        assert!(data.notes.iter().any(|n| n.id == "clean.md"));
    }

    #[test]
    fn test_scan_sorts_notes_newest_first() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("older.md"), "a").unwrap();
        let old_time = std::time::SystemTime::now() - std::time::Duration::from_secs(3600);
        let file = fs::File::options().write(true).open(root.join("older.md")).unwrap();
        file.set_modified(old_time).unwrap();
        drop(file);
        fs::write(root.join("newer.md"), "b").unwrap();

        let data = scan_vault(root, &MetaFile::default()).unwrap();
        assert_eq!(data.notes[0].id, "newer.md");
        assert_eq!(data.notes[1].id, "older.md");
    }
}
