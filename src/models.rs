use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel folder id for "no parent / top level". The vault root itself
/// never has a `Folder` record.
pub const ROOT_FOLDER_ID: &str = "__root__";

/// Which physical substrate a note or trash entry came from.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    Local,
    Gdrive,
}

/// A live note. The id doubles as the `.md` file's path relative to the
/// vault root, `/`-separated on every platform.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Derived from front matter or body hashtags on every read, never
    /// stored as ground truth.
    pub hashtags: Vec<String>,
    pub folder_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub storage_provider: StorageProvider,
}

/// A live folder. The id is the directory's path relative to the vault root.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub name: String,
    /// Enclosing folder id, or `None` when the parent is the vault root.
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A soft-deleted note as shown in the trash view. The id is an opaque
/// ledger id, not the original path.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrashNote {
    pub id: String,
    pub title: String,
    pub deleted_at: DateTime<Utc>,
    pub storage_provider: StorageProvider,
}

/// A soft-deleted folder as shown in the trash view.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrashFolder {
    pub id: String,
    pub name: String,
    pub deleted_at: DateTime<Utc>,
    pub storage_provider: StorageProvider,
}

/// The complete live domain model produced by a vault scan.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VaultData {
    pub notes: Vec<Note>,
    pub folders: Vec<Folder>,
}

/// The trash listing, kept separate from the live tree.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrashData {
    pub trash_notes: Vec<TrashNote>,
    pub trash_folders: Vec<TrashFolder>,
}

/// Combined payload handed to the UI after a read: live tree, trash, and
/// the provider the data came from.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StorageSnapshot {
    pub notes: Vec<Note>,
    pub folders: Vec<Folder>,
    pub trash_notes: Vec<TrashNote>,
    pub trash_folders: Vec<TrashFolder>,
    pub storage_provider: StorageProvider,
}

/// Counts notes that live in `folder_id` or in any of its transitive
/// descendants. The root counts every note in the vault.
pub fn folder_total_note_count(notes: &[Note], folder_id: &str) -> usize {
    if folder_id == ROOT_FOLDER_ID {
        return notes.len();
    }
    let prefix = format!("{}/", folder_id);
    notes
        .iter()
        .filter(|n| n.folder_id == folder_id || n.folder_id.starts_with(&prefix))
        .count()
}
