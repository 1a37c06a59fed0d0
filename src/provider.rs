use std::fmt;

use crate::config::VaultConfig;
use crate::errors::{StorageError, StorageResult};
use crate::local::LocalVault;
use crate::models::{Note, StorageProvider, StorageSnapshot, TrashData, VaultData};

/// The full operation contract every storage backend implements.
///
/// `LocalVault` satisfies it against a directory tree; a Drive backend
/// satisfies it against remote object ids. Whatever the physical substrate,
/// the semantics must match: soft-delete into a recoverable trash,
/// collision-safe create, hard-failing rename/move collisions, cycle-safe
/// folder moves, and colorable folders.
pub trait StorageBackend {
    fn provider(&self) -> StorageProvider;
    fn load_data(&self) -> StorageResult<VaultData>;
    fn load_trash(&self) -> StorageResult<TrashData>;
    fn create_note(&self, title: &str, folder_id: &str) -> StorageResult<Note>;
    fn create_folder(&self, name: &str, parent_folder_id: &str) -> StorageResult<String>;
    fn save_note(&self, note_id: &str, content: &str) -> StorageResult<Note>;
    fn rename_note(&self, note_id: &str, new_title: &str) -> StorageResult<String>;
    fn rename_folder(&self, folder_id: &str, new_name: &str) -> StorageResult<String>;
    fn move_note(&self, note_id: &str, target_folder_id: &str) -> StorageResult<String>;
    fn move_folder(&self, folder_id: &str, target_parent_folder_id: &str)
        -> StorageResult<String>;
    fn delete_note(&self, note_id: &str) -> StorageResult<()>;
    fn delete_folder(&self, folder_id: &str) -> StorageResult<()>;
    fn restore_trashed_note(&self, trash_id: &str) -> StorageResult<()>;
    fn restore_trashed_folder(&self, trash_id: &str) -> StorageResult<()>;
    fn purge_trashed_note(&self, trash_id: &str) -> StorageResult<()>;
    fn purge_trashed_folder(&self, trash_id: &str) -> StorageResult<()>;
    fn set_folder_color(&self, folder_id: &str, color: &str) -> StorageResult<()>;
}

impl StorageBackend for LocalVault {
    fn provider(&self) -> StorageProvider {
        StorageProvider::Local
    }

    fn load_data(&self) -> StorageResult<VaultData> {
        LocalVault::load_data(self)
    }

    fn load_trash(&self) -> StorageResult<TrashData> {
        LocalVault::load_trash(self)
    }

    fn create_note(&self, title: &str, folder_id: &str) -> StorageResult<Note> {
        LocalVault::create_note(self, title, folder_id)
    }

    fn create_folder(&self, name: &str, parent_folder_id: &str) -> StorageResult<String> {
        LocalVault::create_folder(self, name, parent_folder_id)
    }

    fn save_note(&self, note_id: &str, content: &str) -> StorageResult<Note> {
        LocalVault::save_note(self, note_id, content)
    }

    fn rename_note(&self, note_id: &str, new_title: &str) -> StorageResult<String> {
        LocalVault::rename_note(self, note_id, new_title)
    }

    fn rename_folder(&self, folder_id: &str, new_name: &str) -> StorageResult<String> {
        LocalVault::rename_folder(self, folder_id, new_name)
    }

    fn move_note(&self, note_id: &str, target_folder_id: &str) -> StorageResult<String> {
        LocalVault::move_note(self, note_id, target_folder_id)
    }

    fn move_folder(
        &self,
        folder_id: &str,
        target_parent_folder_id: &str,
    ) -> StorageResult<String> {
        LocalVault::move_folder(self, folder_id, target_parent_folder_id)
    }

    fn delete_note(&self, note_id: &str) -> StorageResult<()> {
        LocalVault::delete_note(self, note_id)
    }

    fn delete_folder(&self, folder_id: &str) -> StorageResult<()> {
        LocalVault::delete_folder(self, folder_id)
    }

    fn restore_trashed_note(&self, trash_id: &str) -> StorageResult<()> {
        LocalVault::restore_trashed_note(self, trash_id)
    }

    fn restore_trashed_folder(&self, trash_id: &str) -> StorageResult<()> {
        LocalVault::restore_trashed_folder(self, trash_id)
    }

    fn purge_trashed_note(&self, trash_id: &str) -> StorageResult<()> {
        LocalVault::purge_trashed_note(self, trash_id)
    }

    fn purge_trashed_folder(&self, trash_id: &str) -> StorageResult<()> {
        LocalVault::purge_trashed_folder(self, trash_id)
    }

    fn set_folder_color(&self, folder_id: &str, color: &str) -> StorageResult<()> {
        LocalVault::set_folder_color(self, folder_id, color)
    }
}

/// Provider-agnostic storage facade: pure dispatch to the active backend.
///
/// The facade holds no state of its own and performs no validation. It is
/// the single seam through which the rest of the application stays
/// storage-agnostic: branch once here, never on a provider flag inside
/// shared logic.
pub struct Storage {
    backend: Box<dyn StorageBackend + Send + Sync>,
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("provider", &self.backend.provider())
            .finish()
    }
}

impl Storage {
    /// Builds the facade from explicit configuration. The local provider is
    /// constructed directly; a Drive deployment must inject its backend via
    /// [`Storage::with_backend`], since the Drive binding lives outside this
    /// crate.
    pub fn from_config(config: &VaultConfig) -> StorageResult<Self> {
        match config.provider {
            StorageProvider::Local => Ok(Self {
                backend: Box::new(LocalVault::new(&config.root)),
            }),
            StorageProvider::Gdrive => Err(StorageError::InvalidOperation(
                "Drive backend must be supplied via Storage::with_backend".to_string(),
            )),
        }
    }

    /// Wraps an externally constructed backend (e.g. a Drive binding).
    pub fn with_backend(backend: Box<dyn StorageBackend + Send + Sync>) -> Self {
        Self { backend }
    }

    pub fn provider(&self) -> StorageProvider {
        self.backend.provider()
    }

    /// One combined read: live tree plus trash, tagged with the provider.
    pub fn snapshot(&self) -> StorageResult<StorageSnapshot> {
        let data = self.backend.load_data()?;
        let trash = self.backend.load_trash()?;
        Ok(StorageSnapshot {
            notes: data.notes,
            folders: data.folders,
            trash_notes: trash.trash_notes,
            trash_folders: trash.trash_folders,
            storage_provider: self.backend.provider(),
        })
    }

    pub fn load_data(&self) -> StorageResult<VaultData> {
        self.backend.load_data()
    }

    pub fn load_trash(&self) -> StorageResult<TrashData> {
        self.backend.load_trash()
    }

    pub fn create_note(&self, title: &str, folder_id: &str) -> StorageResult<Note> {
        self.backend.create_note(title, folder_id)
    }

    pub fn create_folder(&self, name: &str, parent_folder_id: &str) -> StorageResult<String> {
        self.backend.create_folder(name, parent_folder_id)
    }

    pub fn save_note(&self, note_id: &str, content: &str) -> StorageResult<Note> {
        self.backend.save_note(note_id, content)
    }

    pub fn rename_note(&self, note_id: &str, new_title: &str) -> StorageResult<String> {
        self.backend.rename_note(note_id, new_title)
    }

    pub fn rename_folder(&self, folder_id: &str, new_name: &str) -> StorageResult<String> {
        self.backend.rename_folder(folder_id, new_name)
    }

    pub fn move_note(&self, note_id: &str, target_folder_id: &str) -> StorageResult<String> {
        self.backend.move_note(note_id, target_folder_id)
    }

    pub fn move_folder(
        &self,
        folder_id: &str,
        target_parent_folder_id: &str,
    ) -> StorageResult<String> {
        self.backend.move_folder(folder_id, target_parent_folder_id)
    }

    pub fn delete_note(&self, note_id: &str) -> StorageResult<()> {
        self.backend.delete_note(note_id)
    }

    pub fn delete_folder(&self, folder_id: &str) -> StorageResult<()> {
        self.backend.delete_folder(folder_id)
    }

    pub fn restore_trashed_note(&self, trash_id: &str) -> StorageResult<()> {
        self.backend.restore_trashed_note(trash_id)
    }

    pub fn restore_trashed_folder(&self, trash_id: &str) -> StorageResult<()> {
        self.backend.restore_trashed_folder(trash_id)
    }

    pub fn purge_trashed_note(&self, trash_id: &str) -> StorageResult<()> {
        self.backend.purge_trashed_note(trash_id)
    }

    pub fn purge_trashed_folder(&self, trash_id: &str) -> StorageResult<()> {
        self.backend.purge_trashed_folder(trash_id)
    }

    pub fn set_folder_color(&self, folder_id: &str, color: &str) -> StorageResult<()> {
        self.backend.set_folder_color(folder_id, color)
    }
}
