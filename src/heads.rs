//! HEAD pointer: the hash of the latest metadata record.
//!
//! A single mutable slot. Empty means the repository has never been
//! snapshotted. Writes go through a temporary file and an atomic rename so
//! an interrupted update cannot leave a truncated pointer.

use crate::error::{Result, VaultError};
use crate::types::Sha1Hash;
use std::fs;
use std::io;
use std::path::PathBuf;

pub struct HeadPointer {
    path: PathBuf,
}

impl HeadPointer {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Current value, or `None` if no snapshot exists yet. Content that is
    /// neither empty nor 40-hex reports `HeadCorrupt` rather than panicking,
    /// so read-only callers can surface it as a recoverable state.
    pub fn read(&self) -> Result<Option<Sha1Hash>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(VaultError::PathUnreadable {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        Sha1Hash::from_hex(trimmed)
            .map(Some)
            .map_err(|_| VaultError::HeadCorrupt(trimmed.to_string()))
    }

    /// Overwrite the pointer as one logical update.
    pub fn write(&self, hash: &Sha1Hash) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        let wrap = |path: &PathBuf, e: io::Error| VaultError::PathUnwritable {
            path: path.clone(),
            source: e,
        };
        fs::write(&tmp, hash.to_hex()).map_err(|e| wrap(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| wrap(&self.path, e))?;
        Ok(())
    }
}
