// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Tests for startup initialization of the cache file.

use keyword_cache_db::{BootstrapError, CacheConfig, KeywordDb, KeywordInfo, bootstrap};
use rusqlite::Connection;

fn builtin_log() -> KeywordInfo {
    KeywordInfo::new("Log", "Logs the given message.", ["message", "level=INFO"], "BuiltIn")
}

/// Verify missing parent directories are created.
#[test_log::test]
fn test_creates_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings").join("ride").join("librarykeywords.db");

    let db = bootstrap(&CacheConfig::at(&path)).unwrap();
    assert!(path.exists());
    assert!(db.has_schema().unwrap());
    assert_eq!(db.path(), Some(path.as_path()));
}

/// Verify a healthy cache keeps its contents.
#[test_log::test]
fn test_keeps_valid_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kw.db");
    {
        let db = KeywordDb::open(&path).unwrap();
        db.insert_library_keywords("BuiltIn", "", &[Some(builtin_log())])
            .unwrap();
        db.close().unwrap();
    }

    let db = bootstrap(&CacheConfig::at(&path)).unwrap();
    assert_eq!(
        db.fetch_library_keywords("BuiltIn", "").unwrap(),
        vec![builtin_log()]
    );
}

/// Verify a file that is not a database is replaced with an empty cache.
#[test_log::test]
fn test_recreates_garbage_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kw.db");
    std::fs::write(&path, vec![0xA5u8; 4096]).unwrap();

    let db = bootstrap(&CacheConfig::at(&path)).unwrap();
    assert!(db.has_schema().unwrap());
    assert_eq!(db.count_libraries().unwrap(), 0);
}

/// Verify a database with an incompatible layout is replaced.
#[test_log::test]
fn test_recreates_wrong_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kw.db");
    Connection::open(&path)
        .unwrap()
        .execute_batch("CREATE TABLE libraries (id INTEGER PRIMARY KEY, title TEXT);")
        .unwrap();

    let db = bootstrap(&CacheConfig::at(&path)).unwrap();
    db.insert_library_keywords("BuiltIn", "", &[Some(builtin_log())])
        .unwrap();
    assert!(db.library_exists("BuiltIn", "").unwrap());
}

/// Verify recreation can be turned off.
#[test]
fn test_corruption_error_without_recreate() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kw.db");
    std::fs::write(&path, vec![0x5Au8; 4096]).unwrap();

    let config = CacheConfig {
        recreate_on_corruption: false,
        ..CacheConfig::at(&path)
    };
    assert!(matches!(
        bootstrap(&config),
        Err(BootstrapError::Storage(_))
    ));
    assert!(path.exists());
}

/// Verify invalid settings are rejected before touching the filesystem.
#[test]
fn test_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sub").join("kw.db");
    let config = CacheConfig {
        busy_timeout_secs: 0,
        ..CacheConfig::at(&path)
    };
    assert!(matches!(
        bootstrap(&config),
        Err(BootstrapError::Config(_))
    ));
    assert!(!dir.path().join("sub").exists());
}
