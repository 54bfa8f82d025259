// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Value types for cached libraries and keywords.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::{Result, StorageError};
use crate::schema::ARGUMENT_SEPARATOR;

/// Metadata of a single library keyword.
///
/// On insert, `source` names the module or library that declared the
/// keyword and is written verbatim into the `library_name` column; it need
/// not match the library the keyword is cached under. On fetch, `source` is
/// that stored value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeywordInfo {
    /// Keyword name (e.g. "Append To List")
    pub name: String,
    /// Documentation string
    pub doc: String,
    /// Argument descriptors in declaration order (e.g. "list", "*values")
    pub arguments: Vec<String>,
    /// Declaring library or module
    pub source: String,
}

impl KeywordInfo {
    pub fn new<I, S>(
        name: impl Into<String>,
        doc: impl Into<String>,
        arguments: I,
        source: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            doc: doc.into(),
            arguments: arguments.into_iter().map(Into::into).collect(),
            source: source.into(),
        }
    }
}

/// A row of the `libraries` table: one version of a library identity.
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryRecord {
    /// Database row ID
    pub id: i64,
    /// Library name
    pub name: String,
    /// Canonical arguments string
    pub arguments: String,
    /// Seconds since the Unix epoch
    pub last_updated: f64,
}

impl LibraryRecord {
    /// `last_updated` as a [`SystemTime`].
    pub fn last_updated_time(&self) -> SystemTime {
        timestamp_to_system_time(self.last_updated)
    }

    /// Whether a library modified at `modified` is newer than this version.
    pub fn is_stale(&self, modified: SystemTime) -> bool {
        system_time_to_timestamp(modified) > self.last_updated
    }
}

/// Library initialization arguments that can be rendered to the canonical
/// string stored in `libraries.arguments`.
///
/// Strings are used verbatim. Sequences render as a JSON array, except that
/// an empty sequence renders as the empty string so "no arguments" has a
/// single identity.
pub trait LibraryArguments {
    fn canonical(&self) -> String;
}

impl LibraryArguments for str {
    fn canonical(&self) -> String {
        self.to_owned()
    }
}

impl LibraryArguments for String {
    fn canonical(&self) -> String {
        self.clone()
    }
}

impl<S: AsRef<str>> LibraryArguments for [S] {
    fn canonical(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let values: Vec<serde_json::Value> = self
            .iter()
            .map(|arg| serde_json::Value::from(arg.as_ref()))
            .collect();
        serde_json::Value::Array(values).to_string()
    }
}

impl<S: AsRef<str>, const N: usize> LibraryArguments for [S; N] {
    fn canonical(&self) -> String {
        self.as_slice().canonical()
    }
}

impl<S: AsRef<str>> LibraryArguments for Vec<S> {
    fn canonical(&self) -> String {
        self.as_slice().canonical()
    }
}

impl<T: LibraryArguments + ?Sized> LibraryArguments for &T {
    fn canonical(&self) -> String {
        (**self).canonical()
    }
}

/// Reject keywords whose arguments would not survive the join/split encoding.
///
/// Besides tokens containing the separator itself, this catches tokens that
/// merge with a neighbouring separator (such as one ending in `" |"`) and a
/// lone empty token, which would read back as no arguments.
pub(crate) fn check_arguments(keyword: &KeywordInfo) -> Result<()> {
    if let Some(arg) = keyword
        .arguments
        .iter()
        .find(|arg| arg.contains(ARGUMENT_SEPARATOR))
    {
        return Err(StorageError::ArgumentContainsDelimiter {
            keyword: keyword.name.clone(),
            argument: arg.clone(),
        });
    }
    if split_arguments(&join_arguments(&keyword.arguments)) != keyword.arguments {
        return Err(StorageError::AmbiguousArguments {
            keyword: keyword.name.clone(),
            arguments: keyword.arguments.clone(),
        });
    }
    Ok(())
}

pub(crate) fn join_arguments(arguments: &[String]) -> String {
    arguments.join(ARGUMENT_SEPARATOR)
}

/// Inverse of [`join_arguments`]; an empty column yields no arguments.
pub(crate) fn split_arguments(stored: &str) -> Vec<String> {
    if stored.is_empty() {
        return Vec::new();
    }
    stored.split(ARGUMENT_SEPARATOR).map(str::to_owned).collect()
}

/// Current time in seconds since the Unix epoch.
pub(crate) fn now_timestamp() -> f64 {
    system_time_to_timestamp(SystemTime::now())
}

/// Convert SystemTime to fractional Unix seconds.
pub(crate) fn system_time_to_timestamp(time: SystemTime) -> f64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(duration) => duration.as_secs_f64(),
        Err(e) => -e.duration().as_secs_f64(),
    }
}

/// Convert fractional Unix seconds to SystemTime.
pub(crate) fn timestamp_to_system_time(timestamp: f64) -> SystemTime {
    if !timestamp.is_finite() {
        return UNIX_EPOCH;
    }
    if timestamp >= 0.0 {
        UNIX_EPOCH + Duration::from_secs_f64(timestamp)
    } else {
        UNIX_EPOCH - Duration::from_secs_f64(-timestamp)
    }
}
