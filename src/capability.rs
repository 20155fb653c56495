// ABOUTME: Execution capabilities consumed by slots: row queries and statement execution
// ABOUTME: Backends implement Querier and Executor over a connection or transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Execution capabilities
//!
//! Slots never own a connection. Each call borrows a capability: something
//! that can run a [`BoundStatement`] and return rows ([`Querier`]) or an
//! outcome ([`Executor`]). A connection, a pooled connection and an open
//! transaction are all valid capabilities once wrapped by a database plugin,
//! so the same slots run inside or outside a transaction.

use async_trait::async_trait;
use serde::Serialize;
use sqlmapper_core::{BoxError, FieldMap};

use crate::translator::BoundStatement;

/// Outcome of a data-modifying statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ExecResult {
    /// Rows inserted, updated or deleted
    pub rows_affected: u64,
    /// Key generated by an insert, when the backend reports one
    pub last_insert_id: Option<i64>,
}

/// Capability kind a slot requires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityKind {
    /// Runs statements that return rows
    Query,
    /// Runs statements that modify data
    Execute,
}

impl CapabilityKind {
    /// Name used in logs, timer reports and errors
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Execute => "exec",
        }
    }

    /// Whether this capability yields rows
    #[must_use]
    pub const fn returns_rows(self) -> bool {
        matches!(self, Self::Query)
    }
}

/// Runs row-returning statements
#[async_trait]
pub trait Querier: Send {
    /// Run `statement` and return every row as a field map, preserving column order
    async fn query(&mut self, statement: &BoundStatement) -> Result<Vec<FieldMap>, BoxError>;
}

/// Runs data-modifying statements
#[async_trait]
pub trait Executor: Send {
    /// Run `statement` and report affected rows and any generated key
    async fn execute(&mut self, statement: &BoundStatement) -> Result<ExecResult, BoxError>;
}
