// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Database schema for the keyword cache.
//!
//! Table and column names match the layout of existing cache files, so a
//! file written by older tooling can be opened as is.

/// Schema SQL (libraries, keywords)
pub const SCHEMA_SQL: &str = r#"
create table if not exists libraries (
    id           integer primary key autoincrement,
    name         text,
    arguments    text,
    last_updated real
);

create table if not exists keywords (
    name         text,
    doc          text,
    arguments    text,
    library_name text,
    library      integer,
    foreign key (library) references libraries(id)
);
"#;

/// Queries that must succeed against a usable cache file.
///
/// Each one touches every column the cache reads or writes.
pub const SCHEMA_CHECKS: [&str; 2] = [
    "select id, name, arguments, last_updated from libraries",
    "select name, doc, arguments, library_name, library from keywords",
];

/// Separator between argument tokens in `keywords.arguments`.
pub const ARGUMENT_SEPARATOR: &str = " | ";
