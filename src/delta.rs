//! Working-tree enumeration and delta classification.
//!
//! A file is `existing` when its current content hash is already among the
//! store's object identifiers, and `new` otherwise. Identity is content,
//! never filename: store entries are named by digest, so a name comparison
//! could not match anything after the first snapshot. An unchanged file
//! therefore stays `existing` on every later snapshot, and a renamed copy
//! of stored content is `existing` too.

use crate::error::{Result, VaultError};
use crate::manifest::EntryStatus;
use crate::repo::{Repository, VAULT_DIR};
use crate::store::ObjectStore;
use crate::types::{hash_file, Sha1Hash};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One classified working-tree file.
#[derive(Debug, Clone)]
pub struct FileDelta {
    /// Path relative to the working-tree root.
    pub path: PathBuf,
    pub hash: Sha1Hash,
    pub status: EntryStatus,
}

/// Classified working tree, sorted by path ascending.
#[derive(Debug, Clone, Default)]
pub struct DeltaSet {
    files: Vec<FileDelta>,
}

impl DeltaSet {
    pub fn files(&self) -> &[FileDelta] {
        &self.files
    }

    pub fn new_paths(&self) -> Vec<&Path> {
        self.paths_with(EntryStatus::New)
    }

    pub fn existing_paths(&self) -> Vec<&Path> {
        self.paths_with(EntryStatus::Existing)
    }

    fn paths_with(&self, status: EntryStatus) -> Vec<&Path> {
        self.files
            .iter()
            .filter(|f| f.status == status)
            .map(|f| f.path.as_path())
            .collect()
    }
}

pub struct DeltaScanner<'a> {
    repo: &'a Repository,
}

impl<'a> DeltaScanner<'a> {
    pub fn new(repo: &'a Repository) -> Self {
        Self { repo }
    }

    /// Enumerate every regular file under the working tree (the vault
    /// directory and configured ignore prefixes excluded), hash each one,
    /// and classify it against the store's current identifiers.
    pub fn scan(&self, store: &ObjectStore) -> Result<DeltaSet> {
        let root = self.repo.root();
        let ignored = &self.repo.config().snapshot.ignore;
        let stored = store.list_identifiers()?;

        let mut files = Vec::new();
        let walker = WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| e.file_name() != std::ffi::OsStr::new(VAULT_DIR));

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                VaultError::PathUnreadable {
                    path,
                    source: e.into(),
                }
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            // strip_prefix cannot fail: walkdir only yields paths under root
            let relative = entry
                .path()
                .strip_prefix(root)
                .expect("walked path outside root")
                .to_path_buf();
            if ignored.iter().any(|prefix| relative.starts_with(prefix.as_str())) {
                continue;
            }

            let hash = hash_file(entry.path()).map_err(|e| VaultError::PathUnreadable {
                path: entry.path().to_path_buf(),
                source: e,
            })?;
            let status = if stored.contains(&hash) {
                EntryStatus::Existing
            } else {
                EntryStatus::New
            };
            files.push(FileDelta {
                path: relative,
                hash,
                status,
            });
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(DeltaSet { files })
    }
}
