//! Snapshot manifests.
//!
//! One line per tracked file:
//!
//! ```text
//! <40-hex-hash> => <relative-path> (<new|existing>)
//! ```
//!
//! Lines sort lexicographically as rendered strings — not by path — so the
//! serialized manifest is byte-identical for a given set of entries no
//! matter what order the filesystem enumerated them in.

use crate::delta::DeltaSet;
use crate::error::{Result, VaultError};
use crate::store::ObjectStore;
use crate::types::{Sha1Hash, HASH_HEX_LEN};
use std::fmt;
use std::path::PathBuf;

const SEPARATOR: &str = " => ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    New,
    Existing,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::New => "new",
            EntryStatus::Existing => "existing",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub hash: Sha1Hash,
    pub path: PathBuf,
    pub status: EntryStatus,
}

impl ManifestEntry {
    pub fn render(&self) -> String {
        format!(
            "{}{}{} ({})",
            self.hash,
            SEPARATOR,
            self.path.display(),
            self.status
        )
    }

    /// Parse one manifest line. `line_no` is 1-based, for error reporting.
    pub fn parse(line: &str, line_no: usize) -> Result<Self> {
        let fail = |reason: String| VaultError::ManifestParse { line_no, reason };

        if line.len() < HASH_HEX_LEN + SEPARATOR.len() {
            return Err(fail("line too short for a manifest entry".to_string()));
        }
        let hash = Sha1Hash::from_hex(&line[..HASH_HEX_LEN])
            .map_err(|e| fail(format!("bad hash: {}", e)))?;

        let rest = &line[HASH_HEX_LEN..];
        let rest = rest
            .strip_prefix(SEPARATOR)
            .ok_or_else(|| fail(format!("expected {:?} after hash", SEPARATOR)))?;

        let (path_part, status) = if let Some(p) = rest.strip_suffix(" (new)") {
            (p, EntryStatus::New)
        } else if let Some(p) = rest.strip_suffix(" (existing)") {
            (p, EntryStatus::Existing)
        } else {
            return Err(fail(
                "expected trailing \" (new)\" or \" (existing)\"".to_string(),
            ));
        };
        if path_part.is_empty() {
            return Err(fail("empty path".to_string()));
        }

        Ok(Self {
            hash,
            path: PathBuf::from(path_part),
            status,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn new(entries: Vec<ManifestEntry>) -> Self {
        Self { entries }
    }

    pub fn from_delta(delta: &DeltaSet) -> Self {
        let entries = delta
            .files()
            .iter()
            .map(|f| ManifestEntry {
                hash: f.hash,
                path: f.path.clone(),
                status: f.status,
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical serialized form: rendered lines, string-sorted, one per
    /// line with a trailing newline on the last.
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = self.entries.iter().map(ManifestEntry::render).collect();
        lines.sort();

        let mut out = String::new();
        for line in lines {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            entries.push(ManifestEntry::parse(line, idx + 1)?);
        }
        Ok(Self { entries })
    }

    /// Check that every referenced object is present in the store. Returns
    /// the hashes that are missing; empty means the manifest verifies.
    pub fn verify(&self, store: &ObjectStore) -> Result<Vec<Sha1Hash>> {
        let stored = store.list_identifiers()?;
        let missing = self
            .entries
            .iter()
            .filter(|e| !stored.contains(&e.hash))
            .map(|e| e.hash)
            .collect();
        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::hash_bytes;

    fn entry(content: &[u8], path: &str, status: EntryStatus) -> ManifestEntry {
        ManifestEntry {
            hash: hash_bytes(content),
            path: PathBuf::from(path),
            status,
        }
    }

    #[test]
    fn render_line_shape() {
        let e = entry(b"abc", "docs/a.txt", EntryStatus::New);
        assert_eq!(
            e.render(),
            "a9993e364706816aba3e25717850c26c9cd0d89e => docs/a.txt (new)"
        );
    }

    #[test]
    fn parse_roundtrip() {
        let original = entry(b"xyz", "src/lib.rs", EntryStatus::Existing);
        let parsed = ManifestEntry::parse(&original.render(), 1).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn render_is_order_independent() {
        let a = entry(b"one", "a.txt", EntryStatus::New);
        let b = entry(b"two", "b.txt", EntryStatus::Existing);
        let forward = Manifest::new(vec![a.clone(), b.clone()]).render();
        let reverse = Manifest::new(vec![b, a]).render();
        assert_eq!(forward, reverse);
    }

    #[test]
    fn render_sorts_by_line_not_path() {
        // Hashes lead the line, so line order follows hash order even when
        // path order disagrees.
        let a = entry(b"zzz", "a.txt", EntryStatus::New);
        let b = entry(b"aaa", "z.txt", EntryStatus::New);
        let rendered = Manifest::new(vec![a.clone(), b.clone()]).render();
        let lines: Vec<&str> = rendered.lines().collect();

        let mut expected = vec![a.render(), b.render()];
        expected.sort();
        assert_eq!(lines, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn parse_rejects_bad_hash() {
        let err = ManifestEntry::parse("zz93e364706816aba3e25717850c26c9cd0d89e => a (new)", 3);
        assert!(matches!(
            err,
            Err(VaultError::ManifestParse { line_no: 3, .. })
        ));
    }

    #[test]
    fn parse_rejects_unknown_status() {
        let line = format!("{} => a.txt (renamed)", hash_bytes(b"abc"));
        assert!(ManifestEntry::parse(&line, 1).is_err());
    }

    #[test]
    fn parse_rejects_missing_separator() {
        let line = format!("{} -> a.txt (new)", hash_bytes(b"abc"));
        assert!(ManifestEntry::parse(&line, 1).is_err());
    }

    #[test]
    fn parse_rejects_empty_path() {
        let line = format!("{} =>  (new)", hash_bytes(b"abc"));
        assert!(ManifestEntry::parse(&line, 1).is_err());
    }

    #[test]
    fn manifest_parse_reports_offending_line() {
        let good = entry(b"ok", "ok.txt", EntryStatus::New).render();
        let text = format!("{}\nnot a manifest line\n", good);
        match Manifest::parse(&text) {
            Err(VaultError::ManifestParse { line_no, .. }) => assert_eq!(line_no, 2),
            other => panic!("expected parse failure, got {:?}", other.map(|m| m.render())),
        }
    }

    #[test]
    fn verify_reports_missing_objects() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = ObjectStore::new(dir.path().to_path_buf());

        let present = store.put(b"present").unwrap();
        let absent = hash_bytes(b"absent");
        let manifest = Manifest::new(vec![
            ManifestEntry {
                hash: present,
                path: PathBuf::from("present.txt"),
                status: EntryStatus::New,
            },
            ManifestEntry {
                hash: absent,
                path: PathBuf::from("absent.txt"),
                status: EntryStatus::New,
            },
        ]);

        assert_eq!(manifest.verify(&store).unwrap(), vec![absent]);
    }
}
