// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Write operations for the keyword cache.

use rusqlite::params;
use tracing::debug;

use crate::connection::KeywordDb;
use crate::error::Result;
use crate::types::{KeywordInfo, LibraryArguments, check_arguments, join_arguments, now_timestamp};

impl KeywordDb {
    /// Replace the cached keywords of a library.
    ///
    /// A new version stamped with the current time is inserted and every
    /// earlier version of the library identity is deleted together with its
    /// keywords. `None` entries mark keywords whose introspection failed and
    /// are skipped. All of it happens in one transaction.
    ///
    /// Returns the database ID of the new version, which is greater than the
    /// IDs of the versions it replaced.
    pub fn insert_library_keywords<A>(
        &self,
        name: &str,
        arguments: &A,
        keywords: &[Option<KeywordInfo>],
    ) -> Result<i64>
    where
        A: LibraryArguments + ?Sized,
    {
        let keywords: Vec<&KeywordInfo> = keywords.iter().flatten().collect();
        for keyword in &keywords {
            check_arguments(keyword)?;
        }
        let arguments = arguments.canonical();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            // The new row goes in before the old ones are removed, so its id
            // is above every replaced version even without autoincrement.
            tx.execute(
                "INSERT INTO libraries (name, arguments, last_updated) VALUES (?1, ?2, ?3)",
                params![name, arguments, now_timestamp()],
            )?;
            let id = tx.last_insert_rowid();

            let purged = tx.execute(
                r#"
                DELETE FROM keywords
                WHERE library IN (
                    SELECT id FROM libraries WHERE name = ?1 AND arguments = ?2 AND id != ?3
                )
                "#,
                params![name, arguments, id],
            )?;
            let old_versions = tx.execute(
                "DELETE FROM libraries WHERE name = ?1 AND arguments = ?2 AND id != ?3",
                params![name, arguments, id],
            )?;

            {
                let mut stmt = tx.prepare_cached(
                    r#"
                    INSERT INTO keywords (name, doc, arguments, library_name, library)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    "#,
                )?;
                for keyword in &keywords {
                    stmt.execute(params![
                        keyword.name,
                        keyword.doc,
                        join_arguments(&keyword.arguments),
                        keyword.source,
                        id,
                    ])?;
                }
            }

            tx.commit()?;
            debug!(
                library = name,
                arguments = %arguments,
                keywords = keywords.len(),
                old_versions,
                purged,
                "Cached library keywords"
            );
            Ok(id)
        })
    }

    /// Set `last_updated` of every version of a library without touching
    /// its keywords. `None` means now.
    ///
    /// Returns the number of library rows updated.
    pub fn update_library_timestamp<A>(
        &self,
        name: &str,
        arguments: &A,
        timestamp: Option<f64>,
    ) -> Result<usize>
    where
        A: LibraryArguments + ?Sized,
    {
        let arguments = arguments.canonical();
        let timestamp = timestamp.unwrap_or_else(now_timestamp);
        let updated = self.with_conn(|conn| {
            Ok(conn.execute(
                "UPDATE libraries SET last_updated = ?1 WHERE name = ?2 AND arguments = ?3",
                params![timestamp, name, arguments],
            )?)
        })?;
        debug!(
            library = name,
            arguments = %arguments,
            timestamp,
            updated,
            "Updated library timestamp"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;

    fn keyword(name: &str) -> KeywordInfo {
        KeywordInfo::new(name, format!("Docs for {name}."), ["arg"], "Lib")
    }

    #[test]
    fn test_insert_purges_old_versions() {
        let db = KeywordDb::open_memory().unwrap();
        let first = db
            .insert_library_keywords("Lib", "", &[Some(keyword("One")), Some(keyword("Two"))])
            .unwrap();
        let second = db
            .insert_library_keywords("Lib", "", &[Some(keyword("Three"))])
            .unwrap();

        assert!(second > first);
        assert_eq!(db.count_libraries().unwrap(), 1);
        assert_eq!(db.count_keywords().unwrap(), 1);
        assert_eq!(db.current_library("Lib", "").unwrap().unwrap().id, second);
    }

    #[test]
    fn test_delimiter_rejected_without_writing() {
        let db = KeywordDb::open_memory().unwrap();
        db.insert_library_keywords("Lib", "", &[Some(keyword("Kept"))])
            .unwrap();

        let bad = KeywordInfo::new("Bad", "", ["a | b"], "Lib");
        let result = db.insert_library_keywords("Lib", "", &[Some(keyword("New")), Some(bad)]);
        assert!(matches!(
            result,
            Err(StorageError::ArgumentContainsDelimiter { .. })
        ));

        let keywords = db.fetch_library_keywords("Lib", "").unwrap();
        assert_eq!(keywords.len(), 1);
        assert_eq!(keywords[0].name, "Kept");
    }

    #[test]
    fn test_update_timestamp_counts_rows() {
        let db = KeywordDb::open_memory().unwrap();
        assert_eq!(
            db.update_library_timestamp("Lib", "", Some(5.0)).unwrap(),
            0
        );

        db.insert_library_keywords("Lib", "", &[Some(keyword("One"))])
            .unwrap();
        assert_eq!(
            db.update_library_timestamp("Lib", "", Some(5.0)).unwrap(),
            1
        );
        assert_eq!(db.get_library_last_updated("Lib", "").unwrap(), 5.0);
    }

    #[test]
    fn test_update_timestamp_defaults_to_now() {
        let db = KeywordDb::open_memory().unwrap();
        db.insert_library_keywords("Lib", "", &[]).unwrap();
        db.update_library_timestamp("Lib", "", Some(1.0)).unwrap();

        let before = now_timestamp();
        db.update_library_timestamp("Lib", "", None).unwrap();
        let after = now_timestamp();

        let stamped = db.get_library_last_updated("Lib", "").unwrap();
        assert!(before <= stamped && stamped <= after);
    }

    #[test]
    fn test_write_after_close_fails() {
        let db = KeywordDb::open_memory().unwrap();
        db.close().unwrap();
        assert!(matches!(
            db.insert_library_keywords("Lib", "", &[Some(keyword("One"))]),
            Err(StorageError::Closed)
        ));
        assert!(matches!(
            db.update_library_timestamp("Lib", "", None),
            Err(StorageError::Closed)
        ));
    }
}
