// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! In-memory keyword cache.
//!
//! Same versioning rules as the SQLite backend, kept in plain collections.
//! Nothing is persisted.

use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use crate::cache::KeywordCache;
use crate::error::{Result, StorageError};
use crate::types::{KeywordInfo, LibraryArguments, LibraryRecord, check_arguments, now_timestamp};

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    libraries: Vec<LibraryRecord>,
    /// (library id, keyword) in insertion order
    keywords: Vec<(i64, KeywordInfo)>,
}

impl State {
    fn current(&self, name: &str, arguments: &str) -> Option<&LibraryRecord> {
        self.libraries
            .iter()
            .filter(|lib| lib.name == name && lib.arguments == arguments)
            .max_by(|a, b| {
                a.last_updated
                    .total_cmp(&b.last_updated)
                    .then(a.id.cmp(&b.id))
            })
    }
}

/// Keyword cache held entirely in memory.
#[derive(Debug)]
pub struct MemoryKeywordCache {
    state: Mutex<Option<State>>,
}

impl Default for MemoryKeywordCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryKeywordCache {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(Some(State::default())),
        }
    }

    /// Current version of a library, `None` if it was never cached.
    pub fn current_library<A>(&self, name: &str, arguments: &A) -> Result<Option<LibraryRecord>>
    where
        A: LibraryArguments + ?Sized,
    {
        let arguments = arguments.canonical();
        self.with_state(|state| Ok(state.current(name, &arguments).cloned()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<State>>> {
        self.state.lock().map_err(|_| StorageError::LockPoisoned)
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut State) -> Result<T>) -> Result<T> {
        let mut guard = self.lock()?;
        let state = guard.as_mut().ok_or(StorageError::Closed)?;
        f(state)
    }
}

impl KeywordCache for MemoryKeywordCache {
    fn insert_library_keywords<A>(
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

        self.with_state(|state| {
            let old_ids: Vec<i64> = state
                .libraries
                .iter()
                .filter(|lib| lib.name == name && lib.arguments == arguments)
                .map(|lib| lib.id)
                .collect();
            state.keywords.retain(|(library, _)| !old_ids.contains(library));
            state.libraries.retain(|lib| !old_ids.contains(&lib.id));

            state.next_id += 1;
            let id = state.next_id;
            state.libraries.push(LibraryRecord {
                id,
                name: name.to_owned(),
                arguments: arguments.clone(),
                last_updated: now_timestamp(),
            });
            state
                .keywords
                .extend(keywords.iter().map(|kw| (id, (*kw).clone())));

            debug!(
                library = name,
                arguments = %arguments,
                keywords = keywords.len(),
                old_versions = old_ids.len(),
                "Cached library keywords in memory"
            );
            Ok(id)
        })
    }

    fn update_library_timestamp<A>(
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
        self.with_state(|state| {
            let mut updated = 0;
            for lib in state
                .libraries
                .iter_mut()
                .filter(|lib| lib.name == name && lib.arguments == arguments)
            {
                lib.last_updated = timestamp;
                updated += 1;
            }
            Ok(updated)
        })
    }

    fn fetch_library_keywords<A>(&self, name: &str, arguments: &A) -> Result<Vec<KeywordInfo>>
    where
        A: LibraryArguments + ?Sized,
    {
        let arguments = arguments.canonical();
        self.with_state(|state| {
            let Some(id) = state.current(name, &arguments).map(|lib| lib.id) else {
                return Ok(Vec::new());
            };
            Ok(state
                .keywords
                .iter()
                .filter(|(library, _)| *library == id)
                .map(|(_, kw)| kw.clone())
                .collect())
        })
    }

    fn library_exists<A>(&self, name: &str, arguments: &A) -> Result<bool>
    where
        A: LibraryArguments + ?Sized,
    {
        Ok(self.current_library(name, arguments)?.is_some())
    }

    fn get_library_last_updated<A>(&self, name: &str, arguments: &A) -> Result<f64>
    where
        A: LibraryArguments + ?Sized,
    {
        Ok(self
            .current_library(name, arguments)?
            .map_or(0.0, |lib| lib.last_updated))
    }

    fn close(&self) -> Result<()> {
        self.lock()?.take().ok_or(StorageError::Closed)?;
        Ok(())
    }
}
