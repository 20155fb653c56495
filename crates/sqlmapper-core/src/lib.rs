// ABOUTME: Core types for the sqlmapper declarative SQL-mapping engine
// ABOUTME: Foundation crate with error taxonomy, dynamic SQL values, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # sqlmapper Core
//!
//! Foundation crate shared by the mapping engine and its database plugins.
//! It changes rarely, so the engine crate can be rebuilt incrementally
//! without touching it.
//!
//! ## Modules
//!
//! - **errors**: Synthesis, resolution, decode and execution errors with `ErrorCode`
//! - **value**: `SqlValue` and `FieldMap`, the dynamically typed row model
//! - **constants**: Marker syntax, environment variable names and defaults

/// Error taxonomy for synthesis-time and call-time failures
pub mod errors;

/// Dynamically typed SQL values and ordered field maps
pub mod value;

/// Marker syntax, environment keys and defaults
pub mod constants;

pub use errors::{
    BoxError, BuildError, ConfigError, DecodeError, ErrorCode, MapperError, MapperResult,
    ResolutionError, SlotFailure, SynthesisError,
};
pub use value::{FieldMap, SqlValue};
