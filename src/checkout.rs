//! Snapshot restoration.
//!
//! Resolves a metadata hash to its manifest and writes every referenced
//! blob back into the working tree. All entries are restored, `existing`
//! ones included: restoring only the `new` entries would leave holes when
//! checking out onto an empty tree, since an unchanged file is tagged
//! `existing` on every snapshot after its first. Untracked files are never
//! touched or deleted.

use crate::error::{Result, VaultError};
use crate::manifest::Manifest;
use crate::metadata::MetadataRecord;
use crate::repo::Repository;
use crate::types::Sha1Hash;
use std::fs;
use tracing::{debug, info};

pub struct CheckoutEngine<'a> {
    repo: &'a Repository,
}

impl<'a> CheckoutEngine<'a> {
    pub fn new(repo: &'a Repository) -> Self {
        Self { repo }
    }

    /// Restore the snapshot identified by `metadata_hash`. Returns the
    /// number of files written. Holds the vault lock for the whole run.
    pub fn run(&self, metadata_hash: &Sha1Hash) -> Result<usize> {
        let _lock = self.repo.lock()?;
        let store = self.repo.store();

        let record = read_record(&store, metadata_hash)?;
        debug!(manifest = %record.manifest_hash, "resolved metadata record");

        let manifest_bytes = store.get(&record.manifest_hash)?;
        let manifest_text = String::from_utf8(manifest_bytes)
            .map_err(|_| VaultError::ManifestParse {
                line_no: 0,
                reason: "manifest is not valid UTF-8".to_string(),
            })?;
        let manifest = Manifest::parse(&manifest_text)?;

        for entry in manifest.entries() {
            let dest = self.repo.root().join(&entry.path);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(|e| VaultError::PathUnwritable {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
            store.restore_to(&entry.hash, &dest)?;
        }

        info!(
            snapshot = %metadata_hash,
            files = manifest.entries().len(),
            "checkout complete"
        );
        Ok(manifest.entries().len())
    }
}

/// Fetch and parse a metadata record from the store.
pub fn read_record(
    store: &crate::store::ObjectStore,
    metadata_hash: &Sha1Hash,
) -> Result<MetadataRecord> {
    let bytes = store.get(metadata_hash)?;
    let text = String::from_utf8(bytes)
        .map_err(|_| VaultError::MetadataParse("record is not valid UTF-8".to_string()))?;
    MetadataRecord::parse(&text)
}
