//! On-disk repository layout and lifecycle.
//!
//! Everything lives in one hidden directory at the working-tree root:
//!
//! ```text
//! .snapvault/
//!   HEAD            latest metadata hash; empty until the first snapshot
//!   __manifest__    staging file for the snapshot in progress
//!   __metadata__    staging file for the snapshot in progress
//!   config.toml     vault configuration
//!   vault.lock      advisory lock taken by mutating operations
//!   <40-hex>        stored objects: blobs, manifests, metadata records
//! ```
//!
//! Objects share a single flat namespace keyed by content hash. Staged files
//! left behind by an aborted snapshot are not repaired; the next snapshot
//! overwrites them.

use crate::config::VaultConfig;
use crate::error::{Result, VaultError};
use crate::heads::HeadPointer;
use crate::lock::VaultLock;
use crate::store::ObjectStore;
use std::fs;
use std::path::{Path, PathBuf};

pub const VAULT_DIR: &str = ".snapvault";
pub const HEAD_FILE: &str = "HEAD";
pub const MANIFEST_STAGE: &str = "__manifest__";
pub const METADATA_STAGE: &str = "__metadata__";
pub const CONFIG_FILE: &str = "config.toml";
pub const LOCK_FILE: &str = "vault.lock";

pub struct Repository {
    root: PathBuf,
    vault_dir: PathBuf,
    config: VaultConfig,
}

impl Repository {
    /// Create a fresh vault under `root`: the directory, an empty HEAD, and
    /// a default config. Fails with `RepositoryExists` if one is present.
    pub fn init(root: &Path) -> Result<Self> {
        let vault_dir = root.join(VAULT_DIR);
        if vault_dir.exists() {
            return Err(VaultError::RepositoryExists(vault_dir));
        }

        fs::create_dir_all(&vault_dir).map_err(|e| VaultError::PathUnwritable {
            path: vault_dir.clone(),
            source: e,
        })?;
        let head_path = vault_dir.join(HEAD_FILE);
        fs::write(&head_path, "").map_err(|e| VaultError::PathUnwritable {
            path: head_path,
            source: e,
        })?;
        VaultConfig::write_default(&vault_dir.join(CONFIG_FILE))?;

        Ok(Self {
            root: root.to_path_buf(),
            vault_dir,
            config: VaultConfig::default(),
        })
    }

    /// Open an existing vault under `root`.
    pub fn open(root: &Path) -> Result<Self> {
        let vault_dir = root.join(VAULT_DIR);
        if !vault_dir.is_dir() {
            return Err(VaultError::RepositoryNotFound(vault_dir));
        }
        let config = VaultConfig::load(&vault_dir.join(CONFIG_FILE))?;

        Ok(Self {
            root: root.to_path_buf(),
            vault_dir,
            config,
        })
    }

    pub fn exists(root: &Path) -> bool {
        root.join(VAULT_DIR).is_dir()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn vault_dir(&self) -> &Path {
        &self.vault_dir
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn manifest_stage_path(&self) -> PathBuf {
        self.vault_dir.join(MANIFEST_STAGE)
    }

    pub fn metadata_stage_path(&self) -> PathBuf {
        self.vault_dir.join(METADATA_STAGE)
    }

    pub fn store(&self) -> ObjectStore {
        ObjectStore::new(self.vault_dir.clone())
    }

    pub fn head(&self) -> HeadPointer {
        HeadPointer::new(self.vault_dir.join(HEAD_FILE))
    }

    /// Take the exclusive vault lock for a mutating operation.
    pub fn lock(&self) -> Result<VaultLock> {
        VaultLock::acquire(&self.vault_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_creates_layout() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        assert!(Repository::exists(dir.path()));
        assert!(repo.vault_dir().join(HEAD_FILE).exists());
        assert!(repo.vault_dir().join(CONFIG_FILE).exists());
        assert_eq!(repo.head().read().unwrap(), None);
    }

    #[test]
    fn init_twice_fails() {
        let dir = TempDir::new().unwrap();
        Repository::init(dir.path()).unwrap();
        assert!(matches!(
            Repository::init(dir.path()),
            Err(VaultError::RepositoryExists(_))
        ));
    }

    #[test]
    fn open_without_init_fails() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Repository::open(dir.path()),
            Err(VaultError::RepositoryNotFound(_))
        ));
    }

    #[test]
    fn open_after_init_succeeds() {
        let dir = TempDir::new().unwrap();
        Repository::init(dir.path()).unwrap();
        let repo = Repository::open(dir.path()).unwrap();
        assert_eq!(repo.root(), dir.path());
    }
}
