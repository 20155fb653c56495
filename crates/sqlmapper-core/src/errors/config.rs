// ABOUTME: Configuration errors for engine options and database connection settings
// ABOUTME: Raised by the environment loaders and by backend detection

use super::ErrorCode;

/// Configuration could not be loaded or is unsupported
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable holds an unrecognised value
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        /// Variable name
        key: &'static str,
        /// Value found
        value: String,
        /// Accepted values
        reason: &'static str,
    },

    /// Connection string names no supported backend
    #[error("unsupported database URL '{url}'; expected sqlite: or postgres(ql)://")]
    UnsupportedDatabaseUrl {
        /// Connection string
        url: String,
    },

    /// Backend recognised but compiled out
    #[error("{backend} support is not enabled; rebuild with the '{feature}' feature")]
    BackendDisabled {
        /// Backend name
        backend: &'static str,
        /// Cargo feature that enables it
        feature: &'static str,
    },
}

impl ConfigError {
    /// Classification of this error
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::ConfigInvalid
    }
}
