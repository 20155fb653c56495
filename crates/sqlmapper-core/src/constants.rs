// ABOUTME: Constants for template syntax, configuration keys and defaults
// ABOUTME: Shared by the template parser, configuration loader and demo binary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Template marker syntax
pub mod syntax {
    /// Opens and closes a parameter marker (`:name:`)
    pub const MARKER_DELIMITER: char = ':';
    /// Separates path segments inside a marker (`:p.Name:`)
    pub const PATH_SEPARATOR: char = '.';
    /// Prefix of a positional marker (`:$1:`)
    pub const POSITIONAL_PREFIX: char = '$';
    /// Quote character of SQL string literals; markers are not scanned inside
    pub const STRING_QUOTE: char = '\'';
    /// Separator emitted between expanded sequence placeholders
    pub const EXPANSION_SEPARATOR: &str = ", ";
}

/// Environment variable names read by the configuration loaders
pub mod env_keys {
    /// Policy for declared-but-unused parameter names (`error` or `warn`)
    pub const UNUSED_PARAMS: &str = "SQLMAPPER_UNUSED_PARAMS";
    /// Whether every executed statement is logged through `tracing`
    pub const LOG_STATEMENTS: &str = "SQLMAPPER_LOG_STATEMENTS";
    /// Primary database connection string
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Optional PostgreSQL connection string used by the demo binary
    pub const POSTGRES_URL: &str = "POSTGRES_URL";
}

/// Default values
pub mod defaults {
    /// Database used when `DATABASE_URL` is not set
    pub const DATABASE_URL: &str = "sqlite::memory:";
    /// Maximum pooled connections for the demo backends
    pub const MAX_CONNECTIONS: u32 = 5;
}
