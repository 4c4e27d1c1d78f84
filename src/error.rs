//! Error taxonomy for vault operations.
//!
//! Every failure surfaces to the immediate caller as a typed value; nothing
//! retries automatically and nothing terminates the process from library
//! code. The binary maps these to a message and a non-zero exit.

use crate::types::Sha1Hash;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("repository already exists at {}", .0.display())]
    RepositoryExists(PathBuf),

    #[error("no repository found at {} (run `snapvault initialize` first)", .0.display())]
    RepositoryNotFound(PathBuf),

    #[error("object {0} not found in store")]
    ObjectNotFound(Sha1Hash),

    #[error("manifest line {line_no}: {reason}")]
    ManifestParse { line_no: usize, reason: String },

    #[error("metadata record: {0}")]
    MetadataParse(String),

    /// HEAD held something other than empty-or-40-hex. Read-only callers
    /// treat this as a recoverable mid-transition state.
    #[error("HEAD is corrupt: {0:?}")]
    HeadCorrupt(String),

    #[error("hash mismatch for {}: recorded {expected}, stored bytes hash to {actual}", .path.display())]
    HashMismatch {
        path: PathBuf,
        expected: Sha1Hash,
        actual: Sha1Hash,
    },

    #[error("{0:?} is not a valid object hash")]
    InvalidHash(String),

    #[error("cannot read {}", .path.display())]
    PathUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write {}", .path.display())]
    PathUnwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("another vault operation is in progress (lock held on {})", .0.display())]
    LockBusy(PathBuf),

    #[error("configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, VaultError>;
