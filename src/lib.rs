// ABOUTME: Main library entry point for the sqlmapper declarative SQL-mapping engine
// ABOUTME: Synthesizes typed query and exec slots from named templates for SQLite and PostgreSQL
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # sqlmapper
//!
//! Declare data-access operations as SQL templates with named markers, then
//! synthesize them once per dialect into typed callables.
//!
//! ```text
//! select * from product where id in (:ids:) and name = :name:
//! ```
//!
//! becomes `select * from product where id in ($1, $2, $3) and name = $4`
//! on `PostgreSQL` (or `?` placeholders on `SQLite`) with the sequence argument
//! expanded in place.
//!
//! ## Architecture
//!
//! - **template**: scans `:name:`, `:p.field:` and `:$n:` markers
//! - **binding**: argument shapes and values, `mapped_record!` field tables
//! - **resolver**: marker path checks and per-call resolution
//! - **translator**: dialect placeholders, sequence expansion, `BoundStatement`
//! - **synthesizer**: validates declarations and builds `QuerySlot`/`ExecSlot`
//! - **decode**: rows into records, field maps, counts and generated keys
//! - **`database_plugins`**: `Querier`/`Executor` capabilities over sqlx
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use sqlmapper::database_plugins::sqlite;
//! use sqlmapper::{mapped_record, Dialect, ExecSlot, QuerySlot, SlotSet, Synthesizer};
//! use sqlx::sqlite::SqlitePoolOptions;
//!
//! #[derive(Debug, Clone)]
//! struct Product {
//!     id: i64,
//!     name: String,
//!     cost: Option<f64>,
//! }
//!
//! mapped_record!(Product { id => "id", name => "name", cost => "cost" });
//!
//! struct ProductDao {
//!     find_by_ids: QuerySlot<(Vec<i64>,), Vec<Product>>,
//!     rename: ExecSlot<(i64, String), u64>,
//! }
//!
//! impl SlotSet for ProductDao {
//!     fn declare(s: &mut Synthesizer) -> Self {
//!         Self {
//!             find_by_ids: s.query(
//!                 "find_by_ids",
//!                 "select * from product where id in (:ids:)",
//!                 &["ids"],
//!             ),
//!             rename: s.exec(
//!                 "rename",
//!                 "update product set name = :name: where id = :id:",
//!                 &["id", "name"],
//!             ),
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let dao: ProductDao = sqlmapper::build(Dialect::Sqlite)?;
//!     let pool = SqlitePoolOptions::new().connect("sqlite::memory:").await?;
//!
//!     let mut conn = pool.acquire().await?;
//!     let mut session = sqlite::wrap(&mut conn);
//!     dao.rename.call(&mut session, (1, "widget".to_owned())).await?;
//!     let products = dao.find_by_ids.call(&mut session, (vec![1, 2],)).await?;
//!     println!("{products:?}");
//!     Ok(())
//! }
//! ```

/// Argument shapes, bind values and record field tables
pub mod binding;

/// Execution capabilities consumed by slots
pub mod capability;

/// Engine and database configuration
pub mod config;

/// Concrete capabilities over sqlx
pub mod database_plugins;

/// Row decoding and result shapes
pub mod decode;

/// SQL dialects and placeholder syntax
pub mod dialect;

/// Per-call timing hook
pub mod instrumentation;

/// Tracing subscriber setup
pub mod logging;

/// Marker path checks and argument resolution
pub mod resolver;

/// Typed slots and the invocation pipeline
pub mod slot;

/// Slot synthesis and validation
pub mod synthesizer;

/// Template scanning
pub mod template;

/// Dialect SQL rendering and sequence expansion
pub mod translator;

pub use binding::{ArgShape, Arguments, BindValue, Bindable, FieldShape, ToSqlValue};
pub use capability::{CapabilityKind, ExecResult, Executor, Querier};
pub use config::{DatabaseConfig, DatabaseUrl, MapperConfig, UnusedParameterPolicy};
pub use decode::{FromRow, FromSqlValue, ResultShape, ResultShapeKind};
pub use dialect::{Dialect, PlaceholderStyle};
pub use instrumentation::{logging_hook, TimerHook, TimerInfo};
pub use slot::{ExecSlot, QuerySlot};
pub use synthesizer::{build, SlotSet, Synthesizer};
pub use translator::BoundStatement;

pub use sqlmapper_core::{
    BoxError, BuildError, ConfigError, DecodeError, ErrorCode, FieldMap, MapperError,
    MapperResult, ResolutionError, SlotFailure, SqlValue, SynthesisError,
};
