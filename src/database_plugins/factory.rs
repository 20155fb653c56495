// ABOUTME: Database factory mapping connection strings to a backend, dialect and pool
// ABOUTME: Provides runtime backend selection between SQLite and PostgreSQL
//! Database factory
//!
//! Detects the backend from a connection string, opens a pool for it and
//! reports the [`Dialect`] slots must be synthesized for.

use std::str::FromStr;

use anyhow::{anyhow, Result};
use sqlmapper_core::ConfigError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

#[cfg(feature = "postgresql")]
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseUrl;
use crate::dialect::Dialect;

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// `SQLite`
    SQLite,
    /// `PostgreSQL`
    PostgreSQL,
}

impl DatabaseType {
    /// Placeholder dialect of this backend
    #[must_use]
    pub const fn dialect(self) -> Dialect {
        match self {
            Self::SQLite => Dialect::Sqlite,
            Self::PostgreSQL => Dialect::Postgres,
        }
    }
}

/// Automatically detect database type from connection string
///
/// # Errors
///
/// Returns an error if:
/// - The URL is neither `sqlite:` nor `postgres(ql)://`
/// - A `PostgreSQL` URL is given but the `postgresql` feature is disabled
pub fn detect_database_type(database_url: &str) -> Result<DatabaseType, ConfigError> {
    if database_url.starts_with("sqlite:") {
        Ok(DatabaseType::SQLite)
    } else if database_url.starts_with("postgresql://") || database_url.starts_with("postgres://") {
        if cfg!(feature = "postgresql") {
            Ok(DatabaseType::PostgreSQL)
        } else {
            Err(ConfigError::BackendDisabled {
                backend: "PostgreSQL",
                feature: "postgresql",
            })
        }
    } else {
        Err(ConfigError::UnsupportedDatabaseUrl {
            url: database_url.to_owned(),
        })
    }
}

/// Pooled connection to one backend
#[derive(Debug, Clone)]
pub enum Database {
    /// `SQLite` pool
    SQLite(SqlitePool),
    /// `PostgreSQL` pool
    #[cfg(feature = "postgresql")]
    PostgreSQL(PgPool),
}

impl Database {
    /// Open a pool for `url`
    ///
    /// In-memory `SQLite` is limited to one connection, since every
    /// connection would otherwise see its own empty database.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unsupported or the connection fails
    pub async fn connect(url: &DatabaseUrl, max_connections: u32) -> Result<Self> {
        let connection_string = url.to_connection_string();
        debug!("Detecting database type from URL: {}", connection_string);
        let db_type = detect_database_type(&connection_string)?;
        info!("Detected database type: {:?}", db_type);

        match db_type {
            DatabaseType::SQLite => {
                let options =
                    SqliteConnectOptions::from_str(&connection_string)?.create_if_missing(true);
                let pool = SqlitePoolOptions::new()
                    .max_connections(if url.is_memory() { 1 } else { max_connections })
                    .connect_with(options)
                    .await?;
                info!("SQLite pool ready");
                Ok(Self::SQLite(pool))
            }
            #[cfg(feature = "postgresql")]
            DatabaseType::PostgreSQL => {
                let pool = PgPoolOptions::new()
                    .max_connections(max_connections)
                    .connect(&connection_string)
                    .await?;
                info!("PostgreSQL pool ready");
                Ok(Self::PostgreSQL(pool))
            }
            #[cfg(not(feature = "postgresql"))]
            DatabaseType::PostgreSQL => Err(anyhow!(
                "PostgreSQL support not enabled. Enable the 'postgresql' feature flag."
            )),
        }
    }

    /// Get the database type enum
    #[must_use]
    pub const fn database_type(&self) -> DatabaseType {
        match self {
            Self::SQLite(_) => DatabaseType::SQLite,
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(_) => DatabaseType::PostgreSQL,
        }
    }

    /// Dialect to synthesize slots for
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.database_type().dialect()
    }

    /// Get a descriptive string for the current database backend
    #[must_use]
    pub const fn backend_info(&self) -> &'static str {
        match self {
            Self::SQLite(_) => "SQLite (embedded)",
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(_) => "PostgreSQL (client-server)",
        }
    }

    /// Run a script of one or more statements without parameters
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails
    pub async fn execute_script(&self, script: &str) -> Result<()> {
        let outcome = match self {
            Self::SQLite(pool) => sqlx::raw_sql(script).execute(pool).await.map(|_| ()),
            #[cfg(feature = "postgresql")]
            Self::PostgreSQL(pool) => sqlx::raw_sql(script).execute(pool).await.map(|_| ()),
        };
        outcome.map_err(|e| anyhow!("Script failed on {}: {e}", self.backend_info()))
    }
}
