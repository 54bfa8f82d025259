// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Startup initialization of the on-disk cache.
//!
//! Called once by the owning application. A cache file that cannot be read
//! with the expected schema is thrown away and recreated empty; no attempt
//! is made to salvage its contents.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};
use tracing::{debug, warn};

use crate::config::CacheConfig;
use crate::connection::KeywordDb;
use crate::error::{BootstrapError, Result, StorageError};
use crate::schema::SCHEMA_CHECKS;

/// Prepare the cache location described by `config` and open it.
///
/// 1. Creates the parent directory of the database file.
/// 2. Checks an existing file with the schema queries.
/// 3. If the check fails and `recreate_on_corruption` is set, deletes the
///    file so it is recreated; otherwise returns the check error.
/// 4. Opens the database, creating the schema.
pub fn bootstrap(config: &CacheConfig) -> std::result::Result<KeywordDb, BootstrapError> {
    config.validate()?;
    let path = config.db_path.as_path();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| StorageError::CreateDir {
            path: parent.to_owned(),
            source: e,
        })?;
    }

    if path.exists() {
        if let Err(e) = check_schema(path) {
            if !config.recreate_on_corruption {
                return Err(e.into());
            }
            warn!(
                "Keyword cache at {} is unreadable ({}), recreating it",
                path.display(),
                e
            );
            discard(path)?;
        }
    }

    let db = KeywordDb::open_with_timeout(path, config.busy_timeout())?;
    debug!("Keyword cache ready at {}", path.display());
    Ok(db)
}

/// Run the schema check queries against the file at `path`.
fn check_schema(path: &Path) -> Result<()> {
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(
        |e| StorageError::DatabaseOpen {
            path: path.to_owned(),
            source: e,
        },
    )?;
    for query in SCHEMA_CHECKS {
        conn.prepare(query)?;
    }
    Ok(())
}

/// Remove the database file and its SQLite side files.
fn discard(path: &Path) -> Result<()> {
    let mut targets = vec![path.to_owned()];
    for suffix in ["-journal", "-wal", "-shm"] {
        let mut side = path.as_os_str().to_owned();
        side.push(suffix);
        targets.push(PathBuf::from(side));
    }

    for target in targets {
        match std::fs::remove_file(&target) {
            Ok(()) => debug!("Removed {}", target.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(StorageError::RemoveFile {
                    path: target,
                    source: e,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discard_removes_side_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kw.db");
        std::fs::write(&path, b"x").unwrap();
        std::fs::write(dir.path().join("kw.db-journal"), b"x").unwrap();

        discard(&path).unwrap();
        assert!(!path.exists());
        assert!(!dir.path().join("kw.db-journal").exists());
    }

    #[test]
    fn test_schema_check_accepts_fresh_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kw.db");
        KeywordDb::open(&path).unwrap().close().unwrap();
        check_schema(&path).unwrap();
    }

    #[test]
    fn test_schema_check_rejects_missing_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kw.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch("create table unrelated (x integer);")
            .unwrap();
        assert!(check_schema(&path).is_err());
    }
}
