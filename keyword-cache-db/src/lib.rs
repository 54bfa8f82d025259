// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! SQLite cache of introspected test library keywords.
//!
//! Introspecting an external test library is slow, so the keywords it
//! declares (name, documentation, argument signature) are kept in a small
//! database keyed by the library's identity: its name plus its
//! initialization arguments.
//!
//! # Versions
//!
//! Every insert for an identity records a new *version* stamped with the
//! current time and purges all older versions of the same identity in the
//! same transaction. Reads resolve the *current* version as the row with
//! the highest `last_updated`, breaking ties by the highest row id.
//!
//! # Key Features
//!
//! - SQLite backend ([`KeywordDb`]) compatible with existing cache files
//! - In-memory backend ([`MemoryKeywordCache`]) for tests
//! - Both behind the [`KeywordCache`] trait
//! - Explicit [`bootstrap`] with one-shot recreation of corrupt files
//!
//! # Example
//!
//! ```ignore
//! use keyword_cache_db::{CacheConfig, KeywordCache, KeywordInfo, bootstrap};
//!
//! let db = bootstrap(&CacheConfig::default())?;
//! let keywords = vec![Some(KeywordInfo::new(
//!     "Append To List",
//!     "Adds values to the end of list.",
//!     ["list", "*values"],
//!     "Collections",
//! ))];
//! db.insert_library_keywords("Collections", "", &keywords)?;
//! assert!(db.library_exists("Collections", "")?);
//! ```

mod bootstrap;
mod cache;
mod config;
mod connection;
mod error;
mod memory;
mod query;
mod schema;
mod types;
mod write;

pub use bootstrap::bootstrap;
pub use cache::KeywordCache;
pub use config::CacheConfig;
pub use connection::{DEFAULT_BUSY_TIMEOUT, KeywordDb};
pub use error::{BootstrapError, ConfigError, Result, StorageError};
pub use memory::MemoryKeywordCache;
pub use schema::ARGUMENT_SEPARATOR;
pub use types::*;
