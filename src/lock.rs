//! Advisory repository lock.
//!
//! An exclusive `flock(2)` on `vault.lock` guards every mutating operation,
//! so at most one snapshot or checkout runs against a vault at a time.
//! Read-only operations do not take the lock. The guard releases when
//! dropped; the lock file itself stays in place.

use crate::error::{Result, VaultError};
use crate::repo::LOCK_FILE;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

pub struct VaultLock {
    path: PathBuf,
    _file: File,
}

impl VaultLock {
    /// Acquire the exclusive lock, failing immediately with `LockBusy` if
    /// another process (or another guard in this one) holds it.
    pub fn acquire(vault_dir: &Path) -> Result<Self> {
        let path = vault_dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| VaultError::PathUnwritable {
                path: path.clone(),
                source: e,
            })?;

        if !try_flock_exclusive(&file, &path)? {
            return Err(VaultError::LockBusy(path));
        }

        Ok(Self { path, _file: file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(unix)]
fn try_flock_exclusive(file: &File, path: &Path) -> Result<bool> {
    use nix::fcntl::{flock, FlockArg};
    use std::os::unix::io::AsRawFd;

    match flock(file.as_raw_fd(), FlockArg::LockExclusiveNonblock) {
        Ok(()) => Ok(true),
        Err(nix::errno::Errno::EWOULDBLOCK) => Ok(false),
        Err(e) => Err(VaultError::PathUnwritable {
            path: path.to_path_buf(),
            source: std::io::Error::from_raw_os_error(e as i32),
        }),
    }
}

#[cfg(not(unix))]
fn try_flock_exclusive(_file: &File, _path: &Path) -> Result<bool> {
    // No advisory locking on this platform; proceed unguarded.
    Ok(true)
}
