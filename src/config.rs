// ABOUTME: Engine options and database connection settings loaded from the environment
// ABOUTME: MapperConfig drives synthesis policy, DatabaseConfig drives backend selection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sqlmapper_core::constants::{defaults, env_keys};
use sqlmapper_core::ConfigError;

/// What synthesis does with a declared name the template never references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnusedParameterPolicy {
    /// Reject the slot
    #[default]
    Error,
    /// Log a warning and keep the slot
    Warn,
}

impl UnusedParameterPolicy {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            _ => Err(ConfigError::InvalidValue {
                key: env_keys::UNUSED_PARAMS,
                value: value.to_owned(),
                reason: "expected 'error' or 'warn'",
            }),
        }
    }
}

/// Options applied to every slot a synthesizer builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MapperConfig {
    /// Handling of declared but unreferenced parameter names
    pub unused_parameters: UnusedParameterPolicy,
    /// Install the logging timer hook when no custom hook is given
    pub log_statements: bool,
}

impl MapperConfig {
    /// Load options from `SQLMAPPER_UNUSED_PARAMS` and `SQLMAPPER_LOG_STATEMENTS`
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a variable is set to an
    /// unrecognised value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let unused_parameters = match env::var(env_keys::UNUSED_PARAMS) {
            Ok(value) => UnusedParameterPolicy::parse(&value)?,
            Err(_) => UnusedParameterPolicy::default(),
        };
        let log_statements = match env::var(env_keys::LOG_STATEMENTS) {
            Ok(value) => parse_flag(env_keys::LOG_STATEMENTS, &value)?,
            Err(_) => false,
        };

        Ok(Self {
            unused_parameters,
            log_statements,
        })
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_owned(),
            reason: "expected a boolean",
        }),
    }
}

/// Type-safe database location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// `SQLite` database file
    SQLite {
        /// Path to the database file
        path: PathBuf,
    },
    /// `PostgreSQL` server
    PostgreSQL {
        /// Full connection string
        connection_string: String,
    },
    /// In-memory `SQLite`
    Memory,
}

impl DatabaseUrl {
    /// Parse a connection string
    ///
    /// A string without a scheme is treated as a `SQLite` file path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedDatabaseUrl`] for any other scheme.
    pub fn parse_url(s: &str) -> Result<Self, ConfigError> {
        if let Some(path) = s.strip_prefix("sqlite:") {
            let path = path.trim_start_matches("//");
            if path == ":memory:" || path.is_empty() {
                Ok(Self::Memory)
            } else {
                Ok(Self::SQLite {
                    path: PathBuf::from(path),
                })
            }
        } else if s.starts_with("postgresql://") || s.starts_with("postgres://") {
            Ok(Self::PostgreSQL {
                connection_string: s.to_owned(),
            })
        } else if s.contains("://") {
            Err(ConfigError::UnsupportedDatabaseUrl { url: s.to_owned() })
        } else {
            Ok(Self::SQLite {
                path: PathBuf::from(s),
            })
        }
    }

    /// Convert to a connection string accepted by sqlx
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::PostgreSQL { connection_string } => connection_string.clone(),
            Self::Memory => defaults::DATABASE_URL.to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }

    /// Check if this is a `PostgreSQL` database
    #[must_use]
    pub const fn is_postgresql(&self) -> bool {
        matches!(self, Self::PostgreSQL { .. })
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::Memory
    }
}

impl Display for DatabaseUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Connection settings for the demo binary and integration tests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Primary database
    pub url: DatabaseUrl,
    /// Optional second database, always `PostgreSQL`
    pub postgres_url: Option<DatabaseUrl>,
    /// Pool size per backend
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DatabaseUrl::default(),
            postgres_url: None,
            max_connections: defaults::MAX_CONNECTIONS,
        }
    }
}

impl DatabaseConfig {
    /// Load from `DATABASE_URL` and `POSTGRES_URL`
    ///
    /// # Errors
    ///
    /// Returns an error if a connection string is unsupported, or if
    /// `POSTGRES_URL` does not name a `PostgreSQL` server.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var(env_keys::DATABASE_URL).ok();
        let postgres_url = env::var(env_keys::POSTGRES_URL).ok();
        Self::default().with_overrides(database_url.as_deref(), postgres_url.as_deref())
    }

    /// Replace the configured URLs with any that are given
    ///
    /// A blank `postgres_url` clears the secondary database.
    ///
    /// # Errors
    ///
    /// Returns an error if a connection string is unsupported, or if
    /// `postgres_url` does not name a `PostgreSQL` server.
    pub fn with_overrides(
        mut self,
        database_url: Option<&str>,
        postgres_url: Option<&str>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = database_url {
            self.url = DatabaseUrl::parse_url(value)?;
        }
        if let Some(value) = postgres_url {
            self.postgres_url = parse_postgres_url(value)?;
        }
        Ok(self)
    }
}

fn parse_postgres_url(value: &str) -> Result<Option<DatabaseUrl>, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    let parsed = DatabaseUrl::parse_url(value)?;
    if !parsed.is_postgresql() {
        return Err(ConfigError::InvalidValue {
            key: env_keys::POSTGRES_URL,
            value: value.to_owned(),
            reason: "expected a postgres:// connection string",
        });
    }
    Ok(Some(parsed))
}
