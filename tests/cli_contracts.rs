//! Contract tests for the CLI surface: command output shapes, JSON fields,
//! and error behavior, driven through `CliContext`.

use snapvault::error::VaultError;
use snapvault::repo::VAULT_DIR;
use snapvault::tooling::cli::{CliContext, Commands};
use std::fs;
use tempfile::TempDir;

fn context(dir: &TempDir) -> CliContext {
    CliContext::new(dir.path().to_path_buf())
}

#[test]
fn initialize_creates_vault_and_reports_path() {
    let dir = TempDir::new().unwrap();
    let output = context(&dir).execute(&Commands::Initialize).unwrap();

    assert!(output.contains(VAULT_DIR));
    assert!(dir.path().join(VAULT_DIR).join("HEAD").exists());
    assert!(dir.path().join(VAULT_DIR).join("config.toml").exists());
}

#[test]
fn initialize_twice_fails() {
    let dir = TempDir::new().unwrap();
    let cli = context(&dir);
    cli.execute(&Commands::Initialize).unwrap();
    assert!(matches!(
        cli.execute(&Commands::Initialize),
        Err(VaultError::RepositoryExists(_))
    ));
}

#[test]
fn snapshot_prints_new_head_hash() {
    let dir = TempDir::new().unwrap();
    let cli = context(&dir);
    cli.execute(&Commands::Initialize).unwrap();
    fs::write(dir.path().join("a.txt"), "abc").unwrap();

    let output = cli.execute(&Commands::Snapshot).unwrap();

    assert_eq!(output.len(), 40);
    assert!(output.chars().all(|c| c.is_ascii_hexdigit()));
    let head = fs::read_to_string(dir.path().join(VAULT_DIR).join("HEAD")).unwrap();
    assert_eq!(head.trim(), output);
}

#[test]
fn snapshot_without_initialize_fails() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        context(&dir).execute(&Commands::Snapshot),
        Err(VaultError::RepositoryNotFound(_))
    ));
}

#[test]
fn checkout_restores_deleted_files() {
    let dir = TempDir::new().unwrap();
    let cli = context(&dir);
    cli.execute(&Commands::Initialize).unwrap();
    fs::write(dir.path().join("a.txt"), "abc").unwrap();
    fs::write(dir.path().join("b.txt"), "xyz").unwrap();

    let metadata_hash = cli.execute(&Commands::Snapshot).unwrap();

    fs::remove_file(dir.path().join("a.txt")).unwrap();
    fs::remove_file(dir.path().join("b.txt")).unwrap();

    let output = cli
        .execute(&Commands::Checkout {
            metadata_hash: metadata_hash.clone(),
        })
        .unwrap();

    assert!(output.contains("Restored 2 files"));
    assert_eq!(fs::read(dir.path().join("a.txt")).unwrap(), b"abc");
    assert_eq!(fs::read(dir.path().join("b.txt")).unwrap(), b"xyz");
}

#[test]
fn checkout_of_missing_object_fails() {
    let dir = TempDir::new().unwrap();
    let cli = context(&dir);
    cli.execute(&Commands::Initialize).unwrap();

    let err = cli.execute(&Commands::Checkout {
        metadata_hash: "0".repeat(40),
    });
    assert!(matches!(err, Err(VaultError::ObjectNotFound(_))));
}

#[test]
fn checkout_rejects_malformed_hash_argument() {
    let dir = TempDir::new().unwrap();
    let cli = context(&dir);
    cli.execute(&Commands::Initialize).unwrap();

    let err = cli.execute(&Commands::Checkout {
        metadata_hash: "not-a-hash".to_string(),
    });
    assert!(matches!(err, Err(VaultError::InvalidHash(_))));
}

#[test]
fn log_json_contract_has_required_fields() {
    let dir = TempDir::new().unwrap();
    let cli = context(&dir);
    cli.execute(&Commands::Initialize).unwrap();

    fs::write(dir.path().join("a.txt"), "first").unwrap();
    let first = cli.execute(&Commands::Snapshot).unwrap();
    fs::write(dir.path().join("a.txt"), "second").unwrap();
    let second = cli.execute(&Commands::Snapshot).unwrap();

    let output = cli
        .execute(&Commands::Log {
            limit: None,
            format: "json".to_string(),
        })
        .unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    let rows = parsed.as_array().expect("log output should be an array");
    assert_eq!(rows.len(), 2);

    for row in rows {
        assert!(row.get("snapshot").and_then(|v| v.as_str()).is_some());
        assert!(row.get("manifest").and_then(|v| v.as_str()).is_some());
        assert!(row.get("parent").and_then(|v| v.as_str()).is_some());
        assert!(row.get("taken").and_then(|v| v.as_str()).is_some());
    }

    // Newest first, chained back to root.
    assert_eq!(rows[0]["snapshot"], serde_json::json!(second));
    assert_eq!(rows[0]["parent"], serde_json::json!(first));
    assert_eq!(rows[1]["snapshot"], serde_json::json!(first));
    assert_eq!(rows[1]["parent"], serde_json::json!("root"));
}

#[test]
fn log_respects_limit() {
    let dir = TempDir::new().unwrap();
    let cli = context(&dir);
    cli.execute(&Commands::Initialize).unwrap();

    fs::write(dir.path().join("a.txt"), "first").unwrap();
    cli.execute(&Commands::Snapshot).unwrap();
    fs::write(dir.path().join("a.txt"), "second").unwrap();
    cli.execute(&Commands::Snapshot).unwrap();

    let output = cli
        .execute(&Commands::Log {
            limit: Some(1),
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 1);
}

#[test]
fn log_on_fresh_vault_reports_no_snapshots() {
    let dir = TempDir::new().unwrap();
    let cli = context(&dir);
    cli.execute(&Commands::Initialize).unwrap();

    let output = cli
        .execute(&Commands::Log {
            limit: None,
            format: "text".to_string(),
        })
        .unwrap();
    assert!(output.contains("No snapshots yet."));
}

#[test]
fn verify_json_contract_after_snapshot() {
    let dir = TempDir::new().unwrap();
    let cli = context(&dir);
    cli.execute(&Commands::Initialize).unwrap();
    fs::write(dir.path().join("a.txt"), "abc").unwrap();
    cli.execute(&Commands::Snapshot).unwrap();

    let output = cli
        .execute(&Commands::Verify {
            manifest_hash: None,
            format: "json".to_string(),
        })
        .unwrap();

    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed.get("verified"), Some(&serde_json::json!(true)));
    assert_eq!(parsed.get("checked"), Some(&serde_json::json!(1)));
    assert_eq!(
        parsed.get("missing").and_then(|v| v.as_array()).map(Vec::len),
        Some(0)
    );
}

#[test]
fn verify_reports_missing_objects_for_tampered_store() {
    let dir = TempDir::new().unwrap();
    let cli = context(&dir);
    cli.execute(&Commands::Initialize).unwrap();
    fs::write(dir.path().join("a.txt"), "abc").unwrap();
    cli.execute(&Commands::Snapshot).unwrap();

    // Remove the blob out from under the staged manifest.
    let blob_hex = "a9993e364706816aba3e25717850c26c9cd0d89e";
    fs::remove_file(dir.path().join(VAULT_DIR).join(blob_hex)).unwrap();

    let output = cli
        .execute(&Commands::Verify {
            manifest_hash: None,
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed.get("verified"), Some(&serde_json::json!(false)));
    assert_eq!(
        parsed["missing"],
        serde_json::json!([blob_hex])
    );
}
