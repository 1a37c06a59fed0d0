use std::fs;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::errors::{StorageError, StorageResult};
use crate::frontmatter::extract_hashtags;
use crate::metadata::{read_meta, write_meta};
use crate::models::{
    Note, StorageProvider, TrashData, TrashFolder, TrashNote, VaultData, ROOT_FOLDER_ID,
};
use crate::sanitize::{sanitize_file_name, sanitize_folder_name, unique_path};
use crate::scanner::scan_vault;
use crate::trash::{
    ensure_trash_root, new_entry_id, read_trash_meta, trash_root, write_trash_meta, TrashEntry,
    TrashKind,
};

/// The local-filesystem storage backend.
///
/// Maps the note/folder domain model onto a directory tree under a single
/// vault root and keeps the physical tree, the color metadata sidecar and
/// the trash ledger consistent across mutations. Single-process,
/// single-user: every operation is a short synchronous sequence of
/// filesystem calls with no in-process locking.
#[derive(Debug, Clone)]
pub struct LocalVault {
    root: PathBuf,
}

impl LocalVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The configured vault root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Joins `relative` onto the vault root, rejecting any component that
    /// could escape it (`..`, absolute prefixes). The check is lexical and
    /// runs before any filesystem access.
    fn resolve(&self, relative: &str, message: &str) -> StorageResult<PathBuf> {
        let mut path = self.root.clone();
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                _ => return Err(StorageError::PathViolation(message.to_string())),
            }
        }
        Ok(path)
    }

    /// Resolves a folder id to its directory, treating the sentinel root id
    /// as the vault root itself.
    fn folder_dir(&self, folder_id: &str, message: &str) -> StorageResult<PathBuf> {
        if folder_id == ROOT_FOLDER_ID {
            Ok(self.root.clone())
        } else {
            self.resolve(folder_id, message)
        }
    }

    /// The id for a physical path: its location relative to the vault root,
    /// `/`-separated regardless of platform.
    fn rel_id(&self, path: &Path) -> StorageResult<String> {
        let relative = path.strip_prefix(&self.root).map_err(|_| {
            StorageError::PathViolation("Path escapes the vault root".to_string())
        })?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Ok(parts.join("/"))
    }

    fn build_note(
        &self,
        id: String,
        title: String,
        content: String,
        folder_id: String,
        stat: &fs::Metadata,
    ) -> StorageResult<Note> {
        let updated_at: DateTime<Utc> = stat.modified()?.into();
        let created_at: DateTime<Utc> = stat.created().map(Into::into).unwrap_or(updated_at);
        Ok(Note {
            id,
            title,
            hashtags: extract_hashtags(&content),
            content,
            folder_id,
            created_at,
            updated_at,
            storage_provider: StorageProvider::Local,
        })
    }

    /// Reads the complete live domain model, creating the vault root on
    /// first use so a fresh deployment starts as an empty vault.
    pub fn load_data(&self) -> StorageResult<VaultData> {
        fs::create_dir_all(&self.root)?;
        let meta = read_meta(&self.root);
        scan_vault(&self.root, &meta)
    }

    /// Lists the trash, newest deletions first. Quarantined content is never
    /// mixed into the live tree.
    pub fn load_trash(&self) -> StorageResult<TrashData> {
        let ledger = read_trash_meta(&self.root)?;
        let mut data = TrashData::default();
        for entry in ledger.entries {
            match entry.kind {
                TrashKind::Note => data.trash_notes.push(TrashNote {
                    id: entry.id,
                    title: entry.title,
                    deleted_at: entry.deleted_at,
                    storage_provider: StorageProvider::Local,
                }),
                TrashKind::Folder => data.trash_folders.push(TrashFolder {
                    id: entry.id,
                    name: entry.title,
                    deleted_at: entry.deleted_at,
                    storage_provider: StorageProvider::Local,
                }),
            }
        }
        data.trash_notes.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at));
        data.trash_folders.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at));
        Ok(data)
    }

    /// Creates a note in `folder_id` (created recursively if absent). The
    /// sanitized filename receives `-1`, `-2`, … suffixes until free.
    pub fn create_note(&self, title: &str, folder_id: &str) -> StorageResult<Note> {
        let dir = self.folder_dir(folder_id, "Invalid folder path")?;
        fs::create_dir_all(&dir)?;

        let base = sanitize_file_name(title);
        let mut full_path = dir.join(format!("{}.md", base));
        let mut counter = 1usize;
        while full_path.exists() {
            full_path = dir.join(format!("{}-{}.md", base, counter));
            counter += 1;
        }

        let content = format!("# {}\n\n", title);
        fs::write(&full_path, &content)?;
        let stat = fs::metadata(&full_path)?;
        let id = self.rel_id(&full_path)?;
        debug!("created note {}", id);

        let mut note = self.build_note(
            id,
            title.to_string(),
            content,
            folder_id.to_string(),
            &stat,
        )?;
        // A brand-new note has no tags yet, whatever the title contains.
        note.hashtags = Vec::new();
        Ok(note)
    }

    /// Creates a folder under `parent_folder_id` and returns its id. Name
    /// collisions resolve with a space-separated counter (`Name 1`,
    /// `Name 2`, …), a deliberately distinct style from note suffixing.
    pub fn create_folder(&self, name: &str, parent_folder_id: &str) -> StorageResult<String> {
        let parent = self.folder_dir(parent_folder_id, "Invalid parent folder path")?;
        fs::create_dir_all(&parent)?;

        let safe_name = sanitize_folder_name(name);
        let mut folder_path = parent.join(&safe_name);
        let mut counter = 1usize;
        while folder_path.exists() {
            folder_path = parent.join(format!("{} {}", safe_name, counter));
            counter += 1;
        }

        fs::create_dir_all(&folder_path)?;
        let id = self.rel_id(&folder_path)?;
        debug!("created folder {}", id);
        Ok(id)
    }

    /// Overwrites an existing note's content and returns the rebuilt note
    /// with fresh hashtags and timestamps.
    pub fn save_note(&self, note_id: &str, content: &str) -> StorageResult<Note> {
        let full_path = self.resolve(note_id, "Invalid note path")?;
        if !full_path.exists() {
            return Err(StorageError::NotFound("Note file does not exist".to_string()));
        }

        fs::write(&full_path, content)?;
        let stat = fs::metadata(&full_path)?;

        let (folder_id, file_name) = match note_id.rsplit_once('/') {
            Some((dir, name)) => (dir.to_string(), name),
            None => (ROOT_FOLDER_ID.to_string(), note_id),
        };
        let title = file_name.strip_suffix(".md").unwrap_or(file_name).to_string();

        self.build_note(note_id.to_string(), title, content.to_string(), folder_id, &stat)
    }

    /// Renames a note in place. Unlike create, a rename never auto-suffixes:
    /// an occupied target is a hard error so the user keeps explicit control
    /// over naming.
    pub fn rename_note(&self, note_id: &str, new_title: &str) -> StorageResult<String> {
        let source = self.resolve(note_id, "Invalid note source path")?;
        if !source.exists() {
            return Err(StorageError::NotFound("Source note not found".to_string()));
        }

        let parent = source
            .parent()
            .ok_or_else(|| StorageError::PathViolation("Invalid note source path".to_string()))?;
        let target = parent.join(format!("{}.md", sanitize_file_name(new_title)));

        if target != source && target.exists() {
            return Err(StorageError::NameCollision(
                "A note with this title already exists".to_string(),
            ));
        }

        fs::rename(&source, &target)?;
        let new_id = self.rel_id(&target)?;
        debug!("renamed note {} -> {}", note_id, new_id);
        Ok(new_id)
    }

    /// Renames a folder in place, then rewrites every metadata key at or
    /// under the old id so descendant colors survive the rename.
    pub fn rename_folder(&self, folder_id: &str, new_name: &str) -> StorageResult<String> {
        if folder_id == ROOT_FOLDER_ID {
            return Err(StorageError::InvalidOperation(
                "Root folder cannot be renamed".to_string(),
            ));
        }

        let source = self.resolve(folder_id, "Invalid folder path")?;
        if !source.exists() {
            return Err(StorageError::NotFound("Folder not found".to_string()));
        }

        let parent = source
            .parent()
            .ok_or_else(|| StorageError::PathViolation("Invalid folder path".to_string()))?;
        let target = parent.join(sanitize_folder_name(new_name));

        if target != source && target.exists() {
            return Err(StorageError::NameCollision(
                "A folder with this name already exists".to_string(),
            ));
        }

        fs::rename(&source, &target)?;
        let new_id = self.rel_id(&target)?;

        let mut meta = read_meta(&self.root);
        meta.rewrite_prefix(folder_id, &new_id);
        write_meta(&self.root, &meta)?;

        debug!("renamed folder {} -> {}", folder_id, new_id);
        Ok(new_id)
    }

    /// Moves a note into another folder (created if needed). Same source and
    /// target is a no-op; an occupied destination is a hard error, stricter
    /// than create by design.
    pub fn move_note(&self, note_id: &str, target_folder_id: &str) -> StorageResult<String> {
        let source = self.resolve(note_id, "Invalid note source path")?;
        if !source.exists() {
            return Err(StorageError::NotFound("Source note not found".to_string()));
        }

        let file_name = source
            .file_name()
            .ok_or_else(|| StorageError::PathViolation("Invalid note source path".to_string()))?
            .to_os_string();
        let target_dir = self.folder_dir(target_folder_id, "Invalid target folder path")?;
        fs::create_dir_all(&target_dir)?;

        let target = target_dir.join(&file_name);
        if target == source {
            return Ok(note_id.to_string());
        }
        if target.exists() {
            return Err(StorageError::NameCollision(
                "A note with the same file name already exists in the destination folder"
                    .to_string(),
            ));
        }

        fs::rename(&source, &target)?;
        let new_id = self.rel_id(&target)?;
        debug!("moved note {} -> {}", note_id, new_id);
        Ok(new_id)
    }

    /// Moves a folder under a new parent. Moving a folder into itself or any
    /// of its own descendants is rejected before touching the filesystem;
    /// this is what keeps the folder tree acyclic.
    pub fn move_folder(
        &self,
        folder_id: &str,
        target_parent_folder_id: &str,
    ) -> StorageResult<String> {
        if folder_id == ROOT_FOLDER_ID {
            return Err(StorageError::InvalidOperation(
                "Root folder cannot be moved".to_string(),
            ));
        }
        if target_parent_folder_id == folder_id
            || target_parent_folder_id.starts_with(&format!("{}/", folder_id))
        {
            return Err(StorageError::InvalidOperation(
                "Cannot move a folder into itself or one of its descendants".to_string(),
            ));
        }

        let source = self.resolve(folder_id, "Invalid source folder path")?;
        if !source.exists() {
            return Err(StorageError::NotFound("Source folder not found".to_string()));
        }

        let target_parent =
            self.folder_dir(target_parent_folder_id, "Invalid target folder path")?;
        fs::create_dir_all(&target_parent)?;

        let name = source
            .file_name()
            .ok_or_else(|| StorageError::PathViolation("Invalid source folder path".to_string()))?
            .to_os_string();
        let target = target_parent.join(&name);
        if target == source {
            return Ok(folder_id.to_string());
        }
        if target.exists() {
            return Err(StorageError::NameCollision(
                "A folder with the same name already exists in the destination".to_string(),
            ));
        }

        fs::rename(&source, &target)?;
        let new_id = self.rel_id(&target)?;

        let mut meta = read_meta(&self.root);
        meta.rewrite_prefix(folder_id, &new_id);
        write_meta(&self.root, &meta)?;

        debug!("moved folder {} -> {}", folder_id, new_id);
        Ok(new_id)
    }

    /// Soft-deletes a note: the file is renamed into the quarantine subtree
    /// and a ledger entry records where it came from. Deleting a note that
    /// no longer exists is a silent no-op.
    pub fn delete_note(&self, note_id: &str) -> StorageResult<()> {
        let full_path = self.resolve(note_id, "Invalid note path")?;
        if !full_path.exists() {
            return Ok(());
        }

        ensure_trash_root(&self.root)?;
        let base_name = full_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let quarantine_name = format!("{}-{}", Utc::now().timestamp_millis(), base_name);
        let destination = unique_path(&trash_root(&self.root).join("notes").join(quarantine_name));

        fs::rename(&full_path, &destination)?;

        let mut ledger = read_trash_meta(&self.root)?;
        ledger.entries.push(TrashEntry {
            id: new_entry_id(),
            kind: TrashKind::Note,
            title: base_name.strip_suffix(".md").unwrap_or(&base_name).to_string(),
            deleted_at: Utc::now(),
            original_path: note_id.to_string(),
            trash_path: self.rel_id(&destination)?,
            folder_color_snapshot: None,
        });
        write_trash_meta(&self.root, &ledger)?;

        info!("trashed note {}", note_id);
        Ok(())
    }

    /// Soft-deletes a folder subtree. Colors at or under the folder are
    /// captured into the ledger entry (suffix-keyed) and removed from the
    /// live metadata store, so the subtree can restore them later.
    pub fn delete_folder(&self, folder_id: &str) -> StorageResult<()> {
        if folder_id == ROOT_FOLDER_ID {
            return Err(StorageError::InvalidOperation(
                "Root folder cannot be deleted".to_string(),
            ));
        }

        let full_path = self.resolve(folder_id, "Invalid folder path")?;
        if !full_path.exists() {
            return Ok(());
        }

        ensure_trash_root(&self.root)?;
        let base_name = full_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let quarantine_name = format!("{}-{}", Utc::now().timestamp_millis(), base_name);
        let destination =
            unique_path(&trash_root(&self.root).join("folders").join(quarantine_name));

        let mut meta = read_meta(&self.root);
        let snapshot = meta.snapshot_prefix(folder_id);

        fs::rename(&full_path, &destination)?;

        meta.remove_prefix(folder_id);
        write_meta(&self.root, &meta)?;

        let mut ledger = read_trash_meta(&self.root)?;
        ledger.entries.push(TrashEntry {
            id: new_entry_id(),
            kind: TrashKind::Folder,
            title: base_name,
            deleted_at: Utc::now(),
            original_path: folder_id.to_string(),
            trash_path: self.rel_id(&destination)?,
            folder_color_snapshot: Some(snapshot),
        });
        write_trash_meta(&self.root, &ledger)?;

        info!("trashed folder {}", folder_id);
        Ok(())
    }

    fn find_trash_entry(&self, trash_id: &str, kind: TrashKind) -> StorageResult<TrashEntry> {
        let ledger = read_trash_meta(&self.root)?;
        ledger
            .entries
            .into_iter()
            .find(|entry| entry.id == trash_id && entry.kind == kind)
            .ok_or_else(|| StorageError::NotFound("Trash item not found".to_string()))
    }

    fn remove_trash_entry(&self, trash_id: &str) -> StorageResult<()> {
        let mut ledger = read_trash_meta(&self.root)?;
        ledger.entries.retain(|entry| entry.id != trash_id);
        write_trash_meta(&self.root, &ledger)
    }

    /// Moves a trashed note back to its original location, suffixing if the
    /// original slot is now occupied. A quarantined file that vanished out
    /// of band just clears its ledger entry: the ledger never references a
    /// nonexistent item after this call.
    pub fn restore_trashed_note(&self, trash_id: &str) -> StorageResult<()> {
        let entry = self.find_trash_entry(trash_id, TrashKind::Note)?;
        let source = self.resolve(&entry.trash_path, "Invalid trash path")?;
        if !source.exists() {
            return self.remove_trash_entry(trash_id);
        }

        let destination =
            unique_path(&self.resolve(&entry.original_path, "Invalid note path")?);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&source, &destination)?;
        self.remove_trash_entry(trash_id)?;

        info!("restored note {}", entry.original_path);
        Ok(())
    }

    /// Moves a trashed folder back and re-applies its color snapshot under
    /// the restored id, which may carry a collision suffix if something now
    /// occupies the original slot.
    pub fn restore_trashed_folder(&self, trash_id: &str) -> StorageResult<()> {
        let entry = self.find_trash_entry(trash_id, TrashKind::Folder)?;
        let source = self.resolve(&entry.trash_path, "Invalid trash path")?;
        if !source.exists() {
            return self.remove_trash_entry(trash_id);
        }

        let destination =
            unique_path(&self.resolve(&entry.original_path, "Invalid folder path")?);
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&source, &destination)?;

        let restored_id = self.rel_id(&destination)?;
        if let Some(snapshot) = &entry.folder_color_snapshot {
            let mut meta = read_meta(&self.root);
            meta.apply_snapshot(&restored_id, snapshot);
            write_meta(&self.root, &meta)?;
        }
        self.remove_trash_entry(trash_id)?;

        info!("restored folder {}", restored_id);
        Ok(())
    }

    /// Permanently removes a trashed note. The ledger entry goes away even
    /// when the quarantined file is already gone, so stale entries can be
    /// cleared through this path.
    pub fn purge_trashed_note(&self, trash_id: &str) -> StorageResult<()> {
        let entry = self.find_trash_entry(trash_id, TrashKind::Note)?;
        let source = self.resolve(&entry.trash_path, "Invalid trash path")?;
        if source.exists() {
            fs::remove_file(&source)?;
        }
        self.remove_trash_entry(trash_id)?;
        info!("purged trashed note {}", entry.original_path);
        Ok(())
    }

    /// Permanently removes a trashed folder subtree, same ledger semantics
    /// as note purging.
    pub fn purge_trashed_folder(&self, trash_id: &str) -> StorageResult<()> {
        let entry = self.find_trash_entry(trash_id, TrashKind::Folder)?;
        let source = self.resolve(&entry.trash_path, "Invalid trash path")?;
        if source.exists() {
            fs::remove_dir_all(&source)?;
        }
        self.remove_trash_entry(trash_id)?;
        info!("purged trashed folder {}", entry.original_path);
        Ok(())
    }

    /// Assigns a color to a folder. Non-recursive: children are unaffected
    /// unless colored themselves. The root folder silently ignores colors.
    pub fn set_folder_color(&self, folder_id: &str, color: &str) -> StorageResult<()> {
        if folder_id == ROOT_FOLDER_ID {
            return Ok(());
        }
        let mut meta = read_meta(&self.root);
        meta.folder_colors
            .insert(folder_id.to_string(), color.to_string());
        write_meta(&self.root, &meta)
    }
}
