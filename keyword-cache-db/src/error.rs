// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Error types for keyword cache operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for keyword cache operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors raised while opening, reading or writing the cache store.
///
/// A missing library is never an error: lookups return empty results instead.
#[derive(Error, Debug)]
pub enum StorageError {
    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to open database with context
    #[error("Failed to open database at '{path}': {source}")]
    DatabaseOpen {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Failed to create the directory holding the database
    #[error("Failed to create directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to discard a corrupt database file
    #[error("Failed to remove '{path}': {source}")]
    RemoveFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The handle was closed
    #[error("Keyword cache is closed")]
    Closed,

    /// Another thread panicked while holding the connection
    #[error("Keyword cache lock poisoned")]
    LockPoisoned,

    /// A keyword argument contains the column separator
    #[error("Argument {argument:?} of keyword '{keyword}' contains the separator \" | \"")]
    ArgumentContainsDelimiter { keyword: String, argument: String },

    /// Keyword arguments would read back differently once joined
    #[error("Arguments {arguments:?} of keyword '{keyword}' cannot be stored unambiguously")]
    AmbiguousArguments {
        keyword: String,
        arguments: Vec<String>,
    },
}

/// Errors loading a [`CacheConfig`](crate::CacheConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {reason}")]
    Invalid { reason: String },
}

/// Errors from [`bootstrap`](crate::bootstrap).
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
