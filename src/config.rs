use std::env;
use std::path::{Path, PathBuf};

use crate::models::StorageProvider;

/// Environment variable overriding the vault root directory.
pub const ENV_LOCAL_ROOT: &str = "NOTEDRIVE_LOCAL_ROOT";

/// Environment variable selecting the storage provider (`local` or `gdrive`).
pub const ENV_STORAGE_PROVIDER: &str = "NOTEDRIVE_STORAGE_PROVIDER";

/// Explicit runtime configuration for the storage layer.
///
/// Constructed once at startup and passed into the facade; nothing below the
/// facade reads the process environment. This keeps every backend testable
/// against an arbitrary temporary root.
#[derive(Debug, Clone, PartialEq)]
pub struct VaultConfig {
    /// Top-level directory treated as the entire note/folder universe.
    pub root: PathBuf,
    /// Which backend the facade dispatches to.
    pub provider: StorageProvider,
}

impl VaultConfig {
    /// Creates a local-provider configuration rooted at `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            provider: StorageProvider::Local,
        }
    }

    /// Builds the configuration from the process environment.
    ///
    /// `NOTEDRIVE_LOCAL_ROOT` overrides the vault root (relative paths are
    /// resolved against the current working directory). Without it the vault
    /// lives in the platform data directory under `NoteDrive/vault`.
    /// `NOTEDRIVE_STORAGE_PROVIDER=gdrive` selects the Drive backend; any
    /// other value falls back to local.
    pub fn from_env() -> Result<Self, String> {
        let root = match env::var_os(ENV_LOCAL_ROOT) {
            Some(value) => {
                let path = PathBuf::from(value);
                if path.is_absolute() {
                    path
                } else {
                    env::current_dir()
                        .map_err(|e| format!("Failed to resolve working directory: {}", e))?
                        .join(path)
                }
            }
            None => default_vault_root()?,
        };

        let provider = match env::var(ENV_STORAGE_PROVIDER).as_deref() {
            Ok("gdrive") => StorageProvider::Gdrive,
            _ => StorageProvider::Local,
        };

        Ok(Self { root, provider })
    }

    /// The vault root as a `Path`.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Default vault location: `{data_dir}/NoteDrive/vault`.
///
/// On Linux: ~/.local/share/NoteDrive/vault
/// On macOS: ~/Library/Application Support/NoteDrive/vault
/// On Windows: C:\Users\{user}\AppData\Roaming\NoteDrive\vault
fn default_vault_root() -> Result<PathBuf, String> {
    let data_dir = dirs::data_dir().ok_or_else(|| "Could not determine data directory".to_string())?;
    Ok(data_dir.join("NoteDrive").join("vault"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_root_defaults_to_local() {
        let config = VaultConfig::with_root("/tmp/vault");
        assert_eq!(config.provider, StorageProvider::Local);
        assert_eq!(config.root(), Path::new("/tmp/vault"));
    }
}
