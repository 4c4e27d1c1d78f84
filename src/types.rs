//! Core identifier types for the vault.
//!
//! Blobs, manifests, and metadata records share one identifier space: the
//! SHA-1 digest of their bytes, rendered as 40 lowercase hex characters.

use sha1::{Digest, Sha1};
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use thiserror::Error;

/// Length of a rendered hash in hex characters.
pub const HASH_HEX_LEN: usize = 40;

/// A SHA-1 content hash (20 bytes).
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Sha1Hash([u8; 20]);

/// Failure to parse a hex rendering of a hash.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HashParseError(String);

impl Sha1Hash {
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Render as 40 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a 40-character lowercase hex string.
    pub fn from_hex(s: &str) -> Result<Self, HashParseError> {
        if s.len() != HASH_HEX_LEN {
            return Err(HashParseError(format!(
                "expected {} hex characters, got {}",
                HASH_HEX_LEN,
                s.len()
            )));
        }
        if s.bytes().any(|b| b.is_ascii_uppercase()) {
            return Err(HashParseError("hash must be lowercase hex".to_string()));
        }
        let decoded = hex::decode(s).map_err(|e| HashParseError(format!("invalid hex: {}", e)))?;
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }
}

impl fmt::Display for Sha1Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Sha1Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha1Hash({})", self.to_hex())
    }
}

/// Hash a byte slice.
pub fn hash_bytes(data: &[u8]) -> Sha1Hash {
    let mut hasher = Sha1::new();
    hasher.update(data);
    Sha1Hash::from_bytes(hasher.finalize().into())
}

/// Hash a file's contents without loading it whole (8 KiB buffer).
pub fn hash_file(path: &Path) -> io::Result<Sha1Hash> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha1::new();

    let mut buffer = [0u8; 8192];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(Sha1Hash::from_bytes(hasher.finalize().into()))
}
