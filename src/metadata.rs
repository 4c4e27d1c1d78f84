//! Snapshot metadata records.
//!
//! A record ties a manifest to its parent snapshot and a timestamp, forming
//! a singly-linked chain back to the root:
//!
//! ```text
//! Snapshot Manifest: <40-hex-hash>
//! Snapshot Parent:   <40-hex-hash | root>
//! Snapshot Taken:    <RFC 3339 timestamp>
//! ```

use crate::error::{Result, VaultError};
use crate::types::Sha1Hash;
use chrono::{DateTime, Utc};
use std::fmt;

const MANIFEST_FIELD: &str = "Snapshot Manifest: ";
const PARENT_FIELD: &str = "Snapshot Parent:   ";
const TAKEN_FIELD: &str = "Snapshot Taken:    ";
const ROOT_PARENT: &str = "root";

/// Parent of a snapshot: the chain's first record has no predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentRef {
    Root,
    Snapshot(Sha1Hash),
}

impl ParentRef {
    fn parse(s: &str) -> Result<Self> {
        if s == ROOT_PARENT {
            return Ok(ParentRef::Root);
        }
        Sha1Hash::from_hex(s)
            .map(ParentRef::Snapshot)
            .map_err(|e| VaultError::MetadataParse(format!("bad parent: {}", e)))
    }
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentRef::Root => f.write_str(ROOT_PARENT),
            ParentRef::Snapshot(hash) => write!(f, "{}", hash),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    pub manifest_hash: Sha1Hash,
    pub parent: ParentRef,
    pub taken_at: DateTime<Utc>,
}

impl MetadataRecord {
    pub fn render(&self) -> String {
        format!(
            "{}{}\n{}{}\n{}{}\n",
            MANIFEST_FIELD,
            self.manifest_hash,
            PARENT_FIELD,
            self.parent,
            TAKEN_FIELD,
            self.taken_at.to_rfc3339()
        )
    }

    /// Line-oriented parse of the three-field record.
    pub fn parse(text: &str) -> Result<Self> {
        let mut manifest_hash = None;
        let mut parent = None;
        let mut taken_at = None;

        for line in text.lines() {
            if let Some(value) = line.strip_prefix("Snapshot Manifest:") {
                let hash = Sha1Hash::from_hex(value.trim()).map_err(|e| {
                    VaultError::MetadataParse(format!("bad manifest hash: {}", e))
                })?;
                manifest_hash = Some(hash);
            } else if let Some(value) = line.strip_prefix("Snapshot Parent:") {
                parent = Some(ParentRef::parse(value.trim())?);
            } else if let Some(value) = line.strip_prefix("Snapshot Taken:") {
                let stamp = DateTime::parse_from_rfc3339(value.trim())
                    .map_err(|e| VaultError::MetadataParse(format!("bad timestamp: {}", e)))?;
                taken_at = Some(stamp.with_timezone(&Utc));
            }
        }

        let manifest_hash = manifest_hash
            .ok_or_else(|| VaultError::MetadataParse("missing manifest field".to_string()))?;
        let parent =
            parent.ok_or_else(|| VaultError::MetadataParse("missing parent field".to_string()))?;
        let taken_at = taken_at
            .ok_or_else(|| VaultError::MetadataParse("missing taken field".to_string()))?;

        Ok(Self {
            manifest_hash,
            parent,
            taken_at,
        })
    }
}
