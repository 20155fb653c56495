// ABOUTME: Call-time errors for argument resolution and row decoding
// ABOUTME: Surfaced to callers wrapped in MapperError with the slot name attached

use super::ErrorCode;

/// An argument could not be turned into bound values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    /// A generic map argument lacks the addressed key
    #[error("map argument '{parameter}' has no key '{key}'")]
    MissingKey {
        /// Marker path up to the map
        parameter: String,
        /// Missing key
        key: String,
    },

    /// A record value lacks the addressed field
    #[error("record argument '{parameter}' has no field '{field}'")]
    MissingField {
        /// Marker path up to the record
        parameter: String,
        /// Missing field
        field: String,
    },

    /// The path steps into a scalar or sequence
    #[error("'{parameter}' is a {shape} and has no field '{field}'")]
    NotAddressable {
        /// Marker path up to the value
        parameter: String,
        /// Shape of the value
        shape: &'static str,
        /// Segment that could not be applied
        field: String,
    },

    /// The path ends on a record or map
    #[error("'{parameter}' resolved to a {shape}, which cannot be bound")]
    NotBindable {
        /// Marker path
        parameter: String,
        /// Shape of the value
        shape: &'static str,
    },

    /// Fewer call arguments than the compiled template expects
    #[error("argument #{index} is missing")]
    MissingArgument {
        /// Zero-based argument index
        index: usize,
    },
}

impl ResolutionError {
    /// Classification of this error
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::ResolutionFailed
    }
}

/// A row could not be decoded into the declared result shape
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// A required column is absent from the row
    #[error("column '{column}' is missing from the row")]
    MissingColumn {
        /// Column tag of the record field
        column: String,
    },

    /// The column value cannot be converted into the field type
    #[error("column '{column}' holds {found}, expected {expected}")]
    TypeMismatch {
        /// Column tag of the record field
        column: String,
        /// Rust type of the field
        expected: &'static str,
        /// SQL type name of the value found
        found: &'static str,
    },

    /// The backend returned a column type the value model cannot represent
    #[error("column '{column}' has unsupported type {sql_type}")]
    UnsupportedColumnType {
        /// Column name as reported by the backend
        column: String,
        /// Backend type name
        sql_type: String,
    },
}

impl DecodeError {
    /// Classification of this error
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::DecodeFailed
    }
}
