//! Command-line interface for vault operations.
//!
//! `CliContext` executes a parsed command against a workspace and returns
//! the output text; the binary prints it or reports the error. Mutating
//! commands (initialize, snapshot, checkout) go through the core engines;
//! verify and log are read-only and run unlocked.

use crate::checkout::{read_record, CheckoutEngine};
use crate::clock::SystemClock;
use crate::error::{Result, VaultError};
use crate::manifest::Manifest;
use crate::metadata::ParentRef;
use crate::repo::Repository;
use crate::snapshot::SnapshotEngine;
use crate::tooling::format::{format_log_text, format_verify_text};
use crate::types::Sha1Hash;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// Snapvault - content-addressed working-tree snapshots
#[derive(Parser)]
#[command(name = "snapvault")]
#[command(about = "Content-addressed working-tree snapshots with restore")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Working-tree root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty vault in the workspace
    Initialize,
    /// Record a snapshot of the working tree, printing the new HEAD hash
    Snapshot,
    /// Restore the working tree from a snapshot
    Checkout {
        /// Metadata hash of the snapshot to restore
        metadata_hash: String,
    },
    /// Check that a manifest's referenced objects are all present
    Verify {
        /// Stored manifest hash (defaults to the staged manifest)
        manifest_hash: Option<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Walk the snapshot chain from HEAD
    Log {
        /// Maximum number of records to show
        #[arg(long)]
        limit: Option<usize>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

/// One row of `log` output.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntryRow {
    pub snapshot: String,
    pub manifest: String,
    pub parent: String,
    pub taken: String,
}

/// Result of `verify`.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub verified: bool,
    pub checked: usize,
    pub missing: Vec<String>,
}

pub struct CliContext {
    workspace_root: PathBuf,
}

impl CliContext {
    pub fn new(workspace_root: PathBuf) -> Self {
        Self { workspace_root }
    }

    pub fn execute(&self, command: &Commands) -> Result<String> {
        match command {
            Commands::Initialize => {
                let repo = Repository::init(&self.workspace_root)?;
                Ok(format!(
                    "Initialized empty vault in {}",
                    repo.vault_dir().display()
                ))
            }
            Commands::Snapshot => {
                let repo = Repository::open(&self.workspace_root)?;
                let clock = SystemClock;
                let metadata_hash = SnapshotEngine::new(&repo, &clock).run()?;
                Ok(metadata_hash.to_hex())
            }
            Commands::Checkout { metadata_hash } => {
                let hash = parse_hash_arg(metadata_hash)?;
                let repo = Repository::open(&self.workspace_root)?;
                let restored = CheckoutEngine::new(&repo).run(&hash)?;
                Ok(format!("Restored {} files from {}", restored, hash))
            }
            Commands::Verify {
                manifest_hash,
                format,
            } => {
                let repo = Repository::open(&self.workspace_root)?;
                let report = self.verify(&repo, manifest_hash.as_deref())?;
                match format.as_str() {
                    "json" => to_json(&report),
                    _ => Ok(format_verify_text(&report)),
                }
            }
            Commands::Log { limit, format } => {
                let repo = Repository::open(&self.workspace_root)?;
                let rows = self.walk_chain(&repo, *limit)?;
                match format.as_str() {
                    "json" => to_json(&rows),
                    _ => Ok(format_log_text(&rows)),
                }
            }
        }
    }

    fn verify(&self, repo: &Repository, manifest_hash: Option<&str>) -> Result<VerifyReport> {
        let store = repo.store();
        let text = match manifest_hash {
            Some(arg) => {
                let hash = parse_hash_arg(arg)?;
                let bytes = store.get(&hash)?;
                String::from_utf8(bytes).map_err(|_| VaultError::ManifestParse {
                    line_no: 0,
                    reason: "manifest is not valid UTF-8".to_string(),
                })?
            }
            None => {
                let staged = repo.manifest_stage_path();
                fs::read_to_string(&staged).map_err(|e| VaultError::PathUnreadable {
                    path: staged,
                    source: e,
                })?
            }
        };
        let manifest = Manifest::parse(&text)?;
        let missing = manifest.verify(&store)?;
        Ok(VerifyReport {
            verified: missing.is_empty(),
            checked: manifest.entries().len(),
            missing: missing.iter().map(Sha1Hash::to_hex).collect(),
        })
    }

    fn walk_chain(&self, repo: &Repository, limit: Option<usize>) -> Result<Vec<LogEntryRow>> {
        let store = repo.store();
        let mut rows = Vec::new();

        let mut cursor = repo.head().read()?;
        while let Some(snapshot) = cursor {
            if limit.is_some_and(|l| rows.len() >= l) {
                break;
            }
            let record = read_record(&store, &snapshot)?;
            rows.push(LogEntryRow {
                snapshot: snapshot.to_hex(),
                manifest: record.manifest_hash.to_hex(),
                parent: record.parent.to_string(),
                taken: record.taken_at.to_rfc3339(),
            });
            cursor = match record.parent {
                ParentRef::Snapshot(parent) => Some(parent),
                ParentRef::Root => None,
            };
        }
        Ok(rows)
    }
}

fn parse_hash_arg(arg: &str) -> Result<Sha1Hash> {
    Sha1Hash::from_hex(arg).map_err(|_| VaultError::InvalidHash(arg.to_string()))
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| VaultError::Config(e.to_string()))
}
