//! Snapshot construction.
//!
//! A strictly sequential pipeline: delta → staged manifest → persisted blobs
//! → persisted manifest → staged metadata → persisted metadata → HEAD
//! update. A failure at any stage aborts the run with no rollback; stored
//! objects are content-addressed, so an aborted run can only leave
//! unreferenced objects and stale staging files behind, never corrupt a
//! referenced one.

use crate::clock::Clock;
use crate::delta::DeltaScanner;
use crate::error::{Result, VaultError};
use crate::manifest::Manifest;
use crate::metadata::{MetadataRecord, ParentRef};
use crate::repo::Repository;
use crate::types::Sha1Hash;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub struct SnapshotEngine<'a> {
    repo: &'a Repository,
    clock: &'a dyn Clock,
}

impl<'a> SnapshotEngine<'a> {
    pub fn new(repo: &'a Repository, clock: &'a dyn Clock) -> Self {
        Self { repo, clock }
    }

    /// Record one snapshot and return the new HEAD value (the metadata
    /// record's hash). Holds the vault lock for the whole run.
    pub fn run(&self) -> Result<Sha1Hash> {
        let _lock = self.repo.lock()?;
        let store = self.repo.store();
        let head = self.repo.head();

        // Parent is the HEAD observed at the moment the snapshot begins.
        let parent = match head.read()? {
            Some(hash) => ParentRef::Snapshot(hash),
            None => ParentRef::Root,
        };

        debug!("computing working-tree delta");
        let delta = DeltaScanner::new(self.repo).scan(&store)?;
        let manifest = Manifest::from_delta(&delta);
        debug!(
            new = delta.new_paths().len(),
            existing = delta.existing_paths().len(),
            "delta computed"
        );

        let manifest_stage = self.repo.manifest_stage_path();
        stage(&manifest_stage, manifest.render().as_bytes())?;
        debug!(path = %manifest_stage.display(), "manifest staged");

        for entry in manifest.entries() {
            let source = self.repo.root().join(&entry.path);
            let stored = store.put_file(&source)?;
            if stored != entry.hash {
                return Err(VaultError::HashMismatch {
                    path: entry.path.clone(),
                    expected: entry.hash,
                    actual: stored,
                });
            }
        }
        debug!(count = manifest.entries().len(), "blobs persisted");

        let manifest_hash = store.put(&read_stage(&manifest_stage)?)?;
        debug!(%manifest_hash, "manifest persisted");

        let record = MetadataRecord {
            manifest_hash,
            parent,
            taken_at: self.clock.now(),
        };
        let metadata_stage = self.repo.metadata_stage_path();
        stage(&metadata_stage, record.render().as_bytes())?;

        let metadata_hash = store.put(&read_stage(&metadata_stage)?)?;
        debug!(%metadata_hash, "metadata persisted");

        head.write(&metadata_hash)?;
        info!(
            snapshot = %metadata_hash,
            files = manifest.entries().len(),
            "snapshot recorded"
        );
        Ok(metadata_hash)
    }
}

fn stage(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|e| VaultError::PathUnwritable {
        path: path.to_path_buf(),
        source: e,
    })
}

fn read_stage(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| VaultError::PathUnreadable {
        path: path.to_path_buf(),
        source: e,
    })
}
