//! Unit tests for atomic file writes
//!
//! Tests cover:
//! - Temp file + rename leaves only the target behind
//! - Existing content is fully replaced
//! - Permissions 0600 on Unix (files hold credentials), including a stale temp file
//! - A failed write leaves no temp file behind

use moodtune_common::config::write_atomically;
use tempfile::TempDir;

#[test]
fn test_atomic_write_leaves_no_temp_file() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("oauth.json");

    write_atomically(&target, "{\"access_token\": \"a\"}").unwrap();

    assert!(target.exists());
    assert!(!temp_dir.path().join("oauth.json.tmp").exists());
}

#[test]
fn test_atomic_write_replaces_content() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("oauth.json");

    write_atomically(&target, "first version with a long body").unwrap();
    write_atomically(&target, "second").unwrap();

    assert_eq!(std::fs::read_to_string(&target).unwrap(), "second");
}

#[cfg(unix)]
#[test]
fn test_atomic_write_sets_owner_only_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("oauth.json");

    write_atomically(&target, "{}").unwrap();

    let mode = std::fs::metadata(&target).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[cfg(unix)]
#[test]
fn test_atomic_write_tightens_stale_temp_file() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("oauth.json");
    let stale = temp_dir.path().join("oauth.json.tmp");
    std::fs::write(&stale, "old token").unwrap();
    std::fs::set_permissions(&stale, std::fs::Permissions::from_mode(0o644)).unwrap();

    write_atomically(&target, "{\"access_token\": \"b\"}").unwrap();

    let mode = std::fs::metadata(&target).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    assert_eq!(
        std::fs::read_to_string(&target).unwrap(),
        "{\"access_token\": \"b\"}"
    );
    assert!(!stale.exists());
}

#[test]
fn test_failed_atomic_write_removes_temp_file() {
    let temp_dir = TempDir::new().unwrap();
    // Renaming a file over a non-empty directory fails
    let target = temp_dir.path().join("oauth.json");
    std::fs::create_dir(&target).unwrap();
    std::fs::write(target.join("keep"), "x").unwrap();

    let result = write_atomically(&target, "{\"access_token\": \"secret\"}");

    assert!(result.is_err());
    assert!(!temp_dir.path().join("oauth.json.tmp").exists());
}
