//! File store behaviour as seen from outside the crate.

use std::collections::HashSet;
use std::fs;

use chrono::{TimeZone, Utc};
use opal_core::auth::{AuthStore, Cookie, FileAuthStore, StoreError};
use opal_core::AuthRecord;

fn sample_record() -> AuthRecord {
    AuthRecord::new("alice@example.com", "p@ss word\"with quotes").with_cookies(vec![
        Cookie::new("JSESSIONID", "abc123", "www.opal.com.au"),
        Cookie::new("TS01", "xyz", "www.opal.com.au")
            .with_path("/registered")
            .with_expires(Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap()),
    ])
}

#[test]
fn test_round_trip_preserves_credentials_and_cookies() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = FileAuthStore::new(dir.path().join("auth.json"));
    let record = sample_record();

    store.save(&record).unwrap();
    let loaded = store.load().unwrap();

    assert_eq!(loaded.username, record.username);
    assert_eq!(loaded.password, record.password);
    let names = |r: &AuthRecord| {
        r.cookies
            .iter()
            .map(|c| (c.name.clone(), c.value().to_string(), c.path.clone(), c.expires))
            .collect::<HashSet<_>>()
    };
    assert_eq!(names(&loaded), names(&record));
}

#[test]
fn test_save_overwrites_previous_record() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = FileAuthStore::new(dir.path().join("auth.json"));

    store.save(&sample_record()).unwrap();
    store.save(&AuthRecord::new("bob", "secret")).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded.username, "bob");
    assert!(loaded.cookies.is_empty());
}

#[test]
fn test_missing_file_is_not_found() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = FileAuthStore::new(dir.path().join("absent.json"));
    assert!(matches!(store.load(), Err(StoreError::NotFound { .. })));
}

#[test]
fn test_foreign_content_is_corrupt() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("auth.json");
    let store = FileAuthStore::new(&path);
    store.save(&sample_record()).unwrap();
    fs::write(&path, "username = alice\n").unwrap();

    assert!(matches!(store.load(), Err(StoreError::Corrupt { .. })));
}

#[cfg(unix)]
#[test]
fn test_saved_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("auth.json");
    FileAuthStore::new(&path).save(&sample_record()).unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);
}

#[cfg(unix)]
#[test]
fn test_group_readable_file_is_refused() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("auth.json");
    let store = FileAuthStore::new(&path);
    store.save(&sample_record()).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

    match store.load() {
        Err(StoreError::InsecurePermissions { mode, .. }) => assert_eq!(mode, 0o640),
        other => panic!("expected security error, got {other:?}"),
    }
}
