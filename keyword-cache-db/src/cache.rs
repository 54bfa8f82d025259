// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! The keyword cache contract shared by all backends.

use crate::connection::KeywordDb;
use crate::error::Result;
use crate::types::{KeywordInfo, LibraryArguments};

/// Store from library identity to its keywords and last-updated timestamp.
///
/// A library identity is its name plus its canonical arguments (see
/// [`LibraryArguments`]). Inserting replaces every earlier version of the
/// identity; reads see the current version, the one with the highest
/// timestamp.
///
/// The methods are generic over the argument type, so the trait is not
/// object safe: inject a backend through a type parameter
/// (`fn load<C: KeywordCache>(cache: &C)`), not as `dyn KeywordCache`.
///
/// Implementations are blocking. Calling any operation after
/// [`close`](KeywordCache::close) fails with
/// [`StorageError::Closed`](crate::StorageError::Closed).
pub trait KeywordCache {
    /// Replace the cached keywords of a library, skipping `None` entries.
    ///
    /// Returns the identifier of the new version, which is greater than the
    /// identifier of every version it replaces.
    fn insert_library_keywords<A>(
        &self,
        name: &str,
        arguments: &A,
        keywords: &[Option<KeywordInfo>],
    ) -> Result<i64>
    where
        A: LibraryArguments + ?Sized;

    /// Set the timestamp of a library without touching its keywords.
    /// `None` means now.
    fn update_library_timestamp<A>(
        &self,
        name: &str,
        arguments: &A,
        timestamp: Option<f64>,
    ) -> Result<usize>
    where
        A: LibraryArguments + ?Sized;

    /// Keywords of the current version, empty if the library is unknown.
    fn fetch_library_keywords<A>(&self, name: &str, arguments: &A) -> Result<Vec<KeywordInfo>>
    where
        A: LibraryArguments + ?Sized;

    fn library_exists<A>(&self, name: &str, arguments: &A) -> Result<bool>
    where
        A: LibraryArguments + ?Sized;

    /// Timestamp of the current version, `0.0` if the library is unknown.
    fn get_library_last_updated<A>(&self, name: &str, arguments: &A) -> Result<f64>
    where
        A: LibraryArguments + ?Sized;

    fn close(&self) -> Result<()>;
}

impl KeywordCache for KeywordDb {
    fn insert_library_keywords<A>(
        &self,
        name: &str,
        arguments: &A,
        keywords: &[Option<KeywordInfo>],
    ) -> Result<i64>
    where
        A: LibraryArguments + ?Sized,
    {
        KeywordDb::insert_library_keywords(self, name, arguments, keywords)
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
        KeywordDb::update_library_timestamp(self, name, arguments, timestamp)
    }

    fn fetch_library_keywords<A>(&self, name: &str, arguments: &A) -> Result<Vec<KeywordInfo>>
    where
        A: LibraryArguments + ?Sized,
    {
        KeywordDb::fetch_library_keywords(self, name, arguments)
    }

    fn library_exists<A>(&self, name: &str, arguments: &A) -> Result<bool>
    where
        A: LibraryArguments + ?Sized,
    {
        KeywordDb::library_exists(self, name, arguments)
    }

    fn get_library_last_updated<A>(&self, name: &str, arguments: &A) -> Result<f64>
    where
        A: LibraryArguments + ?Sized,
    {
        KeywordDb::get_library_last_updated(self, name, arguments)
    }

    fn close(&self) -> Result<()> {
        KeywordDb::close(self)
    }
}
