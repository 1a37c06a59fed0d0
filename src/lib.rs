//! Storage core for a Markdown note vault.
//!
//! Maps a hierarchical note/folder model onto a local directory tree (or an
//! externally supplied Drive backend) with soft-delete trash, folder color
//! metadata, path safety and collision handling. Reads are full stateless
//! re-scans; mutations keep the physical tree and the two JSON sidecars
//! (color metadata, trash ledger) consistent.

pub mod config;
pub mod errors;
pub mod frontmatter;
pub mod local;
pub mod metadata;
pub mod models;
pub mod provider;
pub mod sanitize;
pub mod scanner;
pub mod trash;

pub use config::VaultConfig;
pub use errors::{StorageError, StorageResult};
pub use local::LocalVault;
pub use models::{
    folder_total_note_count, Folder, Note, StorageProvider, StorageSnapshot, TrashData,
    TrashFolder, TrashNote, VaultData, ROOT_FOLDER_ID,
};
pub use provider::{Storage, StorageBackend};
