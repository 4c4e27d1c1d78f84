//! Content-addressed object store.
//!
//! One file per object in the vault directory, named by the SHA-1 hash of
//! its bytes. Blobs, manifests, and metadata records share this namespace,
//! which makes `put` idempotent for free: identical content maps to the
//! identical path.

use crate::error::{Result, VaultError};
use crate::types::{hash_bytes, Sha1Hash};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub struct ObjectStore {
    dir: PathBuf,
}

impl ObjectStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn object_path(&self, hash: &Sha1Hash) -> PathBuf {
        self.dir.join(hash.to_hex())
    }

    /// Persist `bytes` under their content hash. Re-putting identical bytes
    /// is a no-op.
    pub fn put(&self, bytes: &[u8]) -> Result<Sha1Hash> {
        let hash = hash_bytes(bytes);
        let path = self.object_path(&hash);
        if path.exists() {
            return Ok(hash);
        }
        self.atomic_write(&path, bytes)?;
        Ok(hash)
    }

    /// Read an object's bytes back.
    pub fn get(&self, hash: &Sha1Hash) -> Result<Vec<u8>> {
        let path = self.object_path(hash);
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(VaultError::ObjectNotFound(*hash))
            }
            Err(e) => Err(VaultError::PathUnreadable { path, source: e }),
        }
    }

    pub fn exists(&self, hash: &Sha1Hash) -> bool {
        self.object_path(hash).exists()
    }

    /// Enumerate every stored object identifier. Control files (HEAD,
    /// staging files, config, lock) do not parse as 40-hex and are skipped.
    pub fn list_identifiers(&self) -> Result<BTreeSet<Sha1Hash>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| VaultError::PathUnreadable {
            path: self.dir.clone(),
            source: e,
        })?;

        let mut identifiers = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(|e| VaultError::PathUnreadable {
                path: self.dir.clone(),
                source: e,
            })?;
            if let Some(name) = entry.file_name().to_str() {
                if let Ok(hash) = Sha1Hash::from_hex(name) {
                    identifiers.insert(hash);
                }
            }
        }
        Ok(identifiers)
    }

    /// Persist a working-tree file's current bytes, carrying its permission
    /// bits onto the stored object so a later restore can reapply them.
    pub fn put_file(&self, source: &Path) -> Result<Sha1Hash> {
        let bytes = fs::read(source).map_err(|e| VaultError::PathUnreadable {
            path: source.to_path_buf(),
            source: e,
        })?;
        let hash = self.put(&bytes)?;

        #[cfg(unix)]
        {
            let meta = fs::metadata(source).map_err(|e| VaultError::PathUnreadable {
                path: source.to_path_buf(),
                source: e,
            })?;
            let object = self.object_path(&hash);
            fs::set_permissions(&object, meta.permissions()).map_err(|e| {
                VaultError::PathUnwritable {
                    path: object,
                    source: e,
                }
            })?;
        }

        Ok(hash)
    }

    /// Write an object's bytes out to `dest`, overwriting whatever is there
    /// and reapplying the stored permission bits.
    pub fn restore_to(&self, hash: &Sha1Hash, dest: &Path) -> Result<()> {
        let bytes = self.get(hash)?;
        fs::write(dest, &bytes).map_err(|e| VaultError::PathUnwritable {
            path: dest.to_path_buf(),
            source: e,
        })?;

        #[cfg(unix)]
        {
            let object = self.object_path(hash);
            let meta = fs::metadata(&object).map_err(|e| VaultError::PathUnreadable {
                path: object,
                source: e,
            })?;
            fs::set_permissions(dest, meta.permissions()).map_err(|e| {
                VaultError::PathUnwritable {
                    path: dest.to_path_buf(),
                    source: e,
                }
            })?;
        }

        Ok(())
    }

    /// Write-temp-then-rename so a crash never leaves a truncated object
    /// under a valid hash name. Temp names do not parse as hashes, so
    /// leftovers are invisible to `list_identifiers`.
    fn atomic_write(&self, target: &Path, bytes: &[u8]) -> Result<()> {
        let file_name = target
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("object");
        let tmp = self.dir.join(format!(".tmp-{}", file_name));

        let wrap = |path: &Path, e: io::Error| VaultError::PathUnwritable {
            path: path.to_path_buf(),
            source: e,
        };
        fs::write(&tmp, bytes).map_err(|e| wrap(&tmp, e))?;
        fs::rename(&tmp, target).map_err(|e| wrap(target, e))?;
        Ok(())
    }
}
