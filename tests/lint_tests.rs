//! Backup and auto-fix session behavior.

use std::fs;
use std::time::Duration;

use omt::lint::{
    backup_paths, content_hash, record_fixed_hash, save_backup, save_backup_with_timeout,
    was_manually_edited, SESSION_TIMEOUT,
};

#[test]
fn session_timeout_is_ten_minutes() {
    assert_eq!(SESSION_TIMEOUT, Duration::from_secs(600));
}

#[test]
fn first_fix_creates_orig_and_bak() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.omt");
    fs::write(&path, "original content").unwrap();

    let (orig_created, bak_path) = save_backup(&path, "original content").unwrap();

    let (orig, bak, _) = backup_paths(&path);
    assert_eq!(orig_created.as_deref(), Some(orig.as_path()));
    assert_eq!(bak_path, bak);
    assert_eq!(fs::read_to_string(&orig).unwrap(), "original content");
    assert_eq!(fs::read_to_string(&bak).unwrap(), "original content");
}

#[test]
fn orig_is_preserved_within_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.omt");
    let (orig, bak, _) = backup_paths(&path);

    fs::write(&orig, "true original").unwrap();
    record_fixed_hash(&path, "fixed content").unwrap();

    // Different content (a manual edit), but still inside the window.
    let (orig_created, _) = save_backup(&path, "edited content").unwrap();

    assert_eq!(orig_created, None);
    assert_eq!(fs::read_to_string(&orig).unwrap(), "true original");
    assert_eq!(fs::read_to_string(&bak).unwrap(), "edited content");
}

#[test]
fn bak_is_overwritten_on_every_fix() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.omt");
    let (orig, bak, _) = backup_paths(&path);

    fs::write(&orig, "true original").unwrap();

    save_backup(&path, "state v1").unwrap();
    assert_eq!(fs::read_to_string(&bak).unwrap(), "state v1");

    save_backup(&path, "state v2").unwrap();
    assert_eq!(fs::read_to_string(&bak).unwrap(), "state v2");

    assert_eq!(fs::read_to_string(&orig).unwrap(), "true original");
}

#[test]
fn manual_edit_detection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.omt");

    // No recorded hash yet: treat as edited.
    assert!(was_manually_edited(&path, "content"));

    record_fixed_hash(&path, "fixed content").unwrap();
    assert!(!was_manually_edited(&path, "fixed content"));
    assert!(was_manually_edited(&path, "different content"));
}

#[test]
fn expired_session_with_manual_edit_refreshes_orig() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.omt");
    let (orig, _, _) = backup_paths(&path);

    save_backup(&path, "original").unwrap();
    record_fixed_hash(&path, "after first fix").unwrap();
    assert_eq!(fs::read_to_string(&orig).unwrap(), "original");

    // Zero-length window: the session is over as soon as .orig exists.
    std::thread::sleep(Duration::from_millis(50));
    let (orig_created, _) =
        save_backup_with_timeout(&path, "manually edited", Duration::ZERO).unwrap();

    assert_eq!(orig_created.as_deref(), Some(orig.as_path()));
    assert_eq!(fs::read_to_string(&orig).unwrap(), "manually edited");
}

#[test]
fn expired_session_without_manual_edit_keeps_orig() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.omt");
    let (orig, _, _) = backup_paths(&path);

    save_backup(&path, "original").unwrap();
    record_fixed_hash(&path, "same content").unwrap();

    std::thread::sleep(Duration::from_millis(50));
    let (orig_created, _) =
        save_backup_with_timeout(&path, "same content", Duration::ZERO).unwrap();

    assert_eq!(orig_created, None);
    assert_eq!(fs::read_to_string(&orig).unwrap(), "original");
}

#[test]
fn full_hash_is_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.omt");
    record_fixed_hash(&path, "abc").unwrap();

    let (_, _, hash_file) = backup_paths(&path);
    let stored = fs::read_to_string(hash_file).unwrap();
    assert_eq!(stored, content_hash("abc"));
    assert_eq!(stored.len(), 64);
}
