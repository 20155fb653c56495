// ABOUTME: Unified error taxonomy for slot synthesis and slot invocation
// ABOUTME: Defines ErrorCode, MapperError and re-exports the domain-specific error enums
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Error Handling
//!
//! Errors fall into two phases:
//!
//! - **Synthesis** (`SynthesisError`, aggregated into `BuildError`): malformed
//!   templates, undeclared or unused names, and shape inconsistencies. These
//!   are reported once, when a slot set is built.
//! - **Invocation** (`MapperError`): argument resolution failures, row decode
//!   failures and execution failures, returned from every slot call.
//!
//! Every error maps onto a stable `ErrorCode`.

/// Template and shape errors detected while building slots
pub mod synthesis;

/// Call-time resolution and decode errors
pub mod runtime;

/// Configuration loading errors
pub mod config;

pub use config::ConfigError;
pub use runtime::{DecodeError, ResolutionError};
pub use synthesis::{BuildError, SlotFailure, SynthesisError};

use serde::{Deserialize, Serialize};

/// Boxed error returned by execution capabilities
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Stable classification of every error the engine can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Synthesis (1000-1999)
    /// Malformed marker, undeclared or unused parameter name
    #[serde(rename = "TEMPLATE_INVALID")]
    TemplateInvalid = 1000,
    /// Declared argument or result shape inconsistent with the template or capability
    #[serde(rename = "SHAPE_INVALID")]
    ShapeInvalid = 1001,

    // Invocation (2000-2999)
    /// An argument could not be resolved to a bindable value
    #[serde(rename = "RESOLUTION_FAILED")]
    ResolutionFailed = 2000,
    /// A row could not be decoded into the declared result shape
    #[serde(rename = "DECODE_FAILED")]
    DecodeFailed = 2001,
    /// A single-row slot returned no rows
    #[serde(rename = "NO_ROWS")]
    NoRows = 2002,
    /// A slot was invoked although its synthesis failed
    #[serde(rename = "SLOT_UNAVAILABLE")]
    SlotUnavailable = 2003,

    // Execution (3000-3999)
    /// The execution capability reported a failure
    #[serde(rename = "EXECUTION_FAILED")]
    ExecutionFailed = 3000,

    // Configuration (4000-4999)
    /// Configuration value missing or invalid
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 4000,
}

impl ErrorCode {
    /// Human-readable description of this error class
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::TemplateInvalid => "Query template is invalid",
            Self::ShapeInvalid => "Slot shape is inconsistent with its template or capability",
            Self::ResolutionFailed => "Argument could not be resolved",
            Self::DecodeFailed => "Row could not be decoded",
            Self::NoRows => "Query returned no rows",
            Self::SlotUnavailable => "Slot was not synthesized",
            Self::ExecutionFailed => "Statement execution failed",
            Self::ConfigInvalid => "Configuration is invalid",
        }
    }

    /// Whether the error is detected at synthesis time
    #[must_use]
    pub const fn is_synthesis(&self) -> bool {
        matches!(self, Self::TemplateInvalid | Self::ShapeInvalid)
    }
}

/// Errors returned from slot invocation
#[derive(Debug, thiserror::Error)]
pub enum MapperError {
    /// An argument could not be resolved
    #[error("slot '{slot}': {source}")]
    Resolution {
        /// Slot being invoked
        slot: String,
        /// Underlying resolution failure
        #[source]
        source: ResolutionError,
    },

    /// A returned row could not be decoded
    #[error("slot '{slot}': {source}")]
    Decode {
        /// Slot being invoked
        slot: String,
        /// Underlying decode failure
        #[source]
        source: DecodeError,
    },

    /// The execution capability failed; the attempted statement is attached
    #[error("slot '{slot}' failed executing `{statement}`: {source}")]
    Execution {
        /// Slot being invoked
        slot: String,
        /// Rendered statement text
        statement: String,
        /// Capability error, unchanged
        #[source]
        source: BoxError,
    },

    /// A single-row slot received zero rows
    #[error("slot '{slot}' expected one row but the query returned none")]
    NoRows {
        /// Slot being invoked
        slot: String,
    },

    /// The slot did not survive synthesis and cannot run
    #[error("slot '{slot}' was not synthesized")]
    Unsynthesized {
        /// Slot being invoked
        slot: String,
    },
}

impl MapperError {
    /// Classification of this error
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Resolution { .. } => ErrorCode::ResolutionFailed,
            Self::Decode { .. } => ErrorCode::DecodeFailed,
            Self::Execution { .. } => ErrorCode::ExecutionFailed,
            Self::NoRows { .. } => ErrorCode::NoRows,
            Self::Unsynthesized { .. } => ErrorCode::SlotUnavailable,
        }
    }

    /// Name of the slot that produced the error
    #[must_use]
    pub fn slot(&self) -> &str {
        match self {
            Self::Resolution { slot, .. }
            | Self::Decode { slot, .. }
            | Self::Execution { slot, .. }
            | Self::NoRows { slot }
            | Self::Unsynthesized { slot } => slot,
        }
    }
}

/// Result type alias for slot invocation
pub type MapperResult<T> = Result<T, MapperError>;
