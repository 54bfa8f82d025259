// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Read query operations for the keyword cache.

use rusqlite::{Connection, OptionalExtension, params};

use crate::connection::KeywordDb;
use crate::error::Result;
use crate::types::{KeywordInfo, LibraryArguments, LibraryRecord, split_arguments};

/// Resolve the current version of a library identity.
///
/// The current version has the highest `last_updated`; on equal timestamps
/// the most recently inserted row (highest id) wins. Rows without a
/// timestamp never count as a version.
pub(crate) fn current_library(
    conn: &Connection,
    name: &str,
    arguments: &str,
) -> Result<Option<LibraryRecord>> {
    let mut stmt = conn.prepare_cached(
        r#"
        SELECT id, name, arguments, last_updated
        FROM libraries
        WHERE name = ?1 AND arguments = ?2 AND last_updated IS NOT NULL
        ORDER BY last_updated DESC, id DESC
        LIMIT 1
        "#,
    )?;

    let record = stmt
        .query_row(params![name, arguments], |row| {
            Ok(LibraryRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                arguments: row.get(2)?,
                last_updated: row.get(3)?,
            })
        })
        .optional()?;
    Ok(record)
}

impl KeywordDb {
    /// Current version of a library, `None` if it was never cached.
    pub fn current_library<A>(&self, name: &str, arguments: &A) -> Result<Option<LibraryRecord>>
    where
        A: LibraryArguments + ?Sized,
    {
        let arguments = arguments.canonical();
        self.with_conn(|conn| current_library(conn, name, &arguments))
    }

    /// Keywords of the current version of a library, in insertion order.
    ///
    /// Returns an empty list if the library is not cached.
    pub fn fetch_library_keywords<A>(&self, name: &str, arguments: &A) -> Result<Vec<KeywordInfo>>
    where
        A: LibraryArguments + ?Sized,
    {
        let arguments = arguments.canonical();
        self.with_conn(|conn| {
            let Some(library) = current_library(conn, name, &arguments)? else {
                return Ok(Vec::new());
            };

            let mut stmt = conn.prepare_cached(
                r#"
                SELECT name, doc, arguments, library_name
                FROM keywords
                WHERE library = ?1
                ORDER BY rowid
                "#,
            )?;

            let mut keywords = Vec::new();
            let mut rows = stmt.query(params![library.id])?;
            while let Some(row) = rows.next()? {
                let stored: Option<String> = row.get(2)?;
                keywords.push(KeywordInfo {
                    name: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                    doc: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    arguments: split_arguments(stored.as_deref().unwrap_or_default()),
                    source: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                });
            }
            Ok(keywords)
        })
    }

    /// Check if any version of a library is cached.
    pub fn library_exists<A>(&self, name: &str, arguments: &A) -> Result<bool>
    where
        A: LibraryArguments + ?Sized,
    {
        Ok(self.current_library(name, arguments)?.is_some())
    }

    /// `last_updated` of the current version, `0.0` if the library is not cached.
    pub fn get_library_last_updated<A>(&self, name: &str, arguments: &A) -> Result<f64>
    where
        A: LibraryArguments + ?Sized,
    {
        Ok(self
            .current_library(name, arguments)?
            .map_or(0.0, |library| library.last_updated))
    }

    /// Count the number of library rows (all versions).
    pub fn count_libraries(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM libraries", [], |row| row.get(0))?;
            Ok(count as u64)
        })
    }

    /// Count the number of keyword rows.
    pub fn count_keywords(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM keywords", [], |row| row.get(0))?;
            Ok(count as u64)
        })
    }
}
