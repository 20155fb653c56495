// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides the product fixture, an in-memory SQLite pool and a recording capability
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::wildcard_in_or_patterns,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `sqlmapper`
//!
//! Every integration test file pulls this module in with `mod common;`.

use std::sync::Once;

use anyhow::Result;
use async_trait::async_trait;
use sqlmapper::database_plugins::sqlite;
use sqlmapper::{
    mapped_record, BoundStatement, BoxError, ExecResult, ExecSlot, Executor, FieldMap, Querier,
    QuerySlot, SlotSet, Synthesizer,
};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // TEST_LOG controls the level; tests are quiet by default
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub cost: Option<f64>,
}

mapped_record!(Product {
    id => "id",
    name => "name",
    cost => "cost",
});

/// The product DAO used across the integration tests
pub struct ProductDao {
    pub find_by_id: QuerySlot<(i64,), Product>,
    pub update: ExecSlot<(Product,), u64>,
    pub find_by_name_and_cost: QuerySlot<(String, f64), Vec<Product>>,
    pub find_by_id_map: QuerySlot<(i64,), FieldMap>,
    pub update_map: ExecSlot<(FieldMap,), u64>,
    pub find_by_name_and_cost_map: QuerySlot<(String, f64), Vec<FieldMap>>,
    pub insert: ExecSlot<(i64, String, Option<f64>), ExecResult>,
    pub insert_generated: ExecSlot<(String, Option<f64>), ExecResult>,
    pub find_by_id_slice: QuerySlot<(Vec<i64>,), Vec<Product>>,
    pub find_by_id_slice_and_name: QuerySlot<(Vec<i64>, String), Vec<Product>>,
    pub find_by_id_slice_name_and_cost: QuerySlot<(Vec<i64>, String, Option<f64>), Vec<Product>>,
    pub find_by_id_slice_cost_and_name_slice:
        QuerySlot<(Vec<i64>, Vec<String>, Option<f64>), Vec<Product>>,
    pub find_by_name_and_cost_unlabeled: QuerySlot<(String, f64), Vec<Product>>,
    pub count: QuerySlot<(), FieldMap>,
}

impl SlotSet for ProductDao {
    fn declare(s: &mut Synthesizer) -> Self {
        Self {
            find_by_id: s.query(
                "find_by_id",
                "select * from Product where id = :id:",
                &["id"],
            ),
            update: s.exec(
                "update",
                "update Product set name = :p.name:, cost = :p.cost: where id = :p.id:",
                &["p"],
            ),
            find_by_name_and_cost: s.query(
                "find_by_name_and_cost",
                "select * from Product where name=:name: and cost=:cost:",
                &["name", "cost"],
            ),
            find_by_id_map: s.query(
                "find_by_id_map",
                "select * from Product where id = :id:",
                &["id"],
            ),
            update_map: s.exec(
                "update_map",
                "update Product set name = :p.Name:, cost = :p.Cost: where id = :p.Id:",
                &["p"],
            ),
            find_by_name_and_cost_map: s.query(
                "find_by_name_and_cost_map",
                "select * from Product where name=:name: and cost=:cost:",
                &["name", "cost"],
            ),
            insert: s.exec(
                "insert",
                "insert into product(id, name, cost) values(:id:, :name:, :cost:)",
                &["id", "name", "cost"],
            ),
            insert_generated: s.exec(
                "insert_generated",
                "insert into product(name, cost) values(:name:, :cost:)",
                &["name", "cost"],
            ),
            find_by_id_slice: s.query(
                "find_by_id_slice",
                "select * from Product where id in (:ids:) order by id",
                &["ids"],
            ),
            find_by_id_slice_and_name: s.query(
                "find_by_id_slice_and_name",
                "select * from Product where name = :name: and id in (:ids:)",
                &["ids", "name"],
            ),
            find_by_id_slice_name_and_cost: s.query(
                "find_by_id_slice_name_and_cost",
                "select * from Product where name = :name: and id in (:ids:) and (cost is null or cost = :cost:)",
                &["ids", "name", "cost"],
            ),
            find_by_id_slice_cost_and_name_slice: s.query(
                "find_by_id_slice_cost_and_name_slice",
                "select * from Product where id in (:ids:) and (cost is null or cost = :cost:) and name in (:names:) order by id",
                &["ids", "names", "cost"],
            ),
            find_by_name_and_cost_unlabeled: s.query(
                "find_by_name_and_cost_unlabeled",
                "select * from Product where name=:$1: and cost=:$2:",
                &[],
            ),
            count: s.query("count", "select count(*) as total from Product", &[]),
        }
    }
}

pub const SQLITE_SCHEMA: &str =
    "create table product (id integer not null primary key, name text, cost real)";

/// Cost of product `i` as inserted by [`populate`]: `1.1 * i` for even ids
pub fn seeded_cost(i: i64) -> Option<f64> {
    (i % 2 == 0).then(|| 1.1 * i as f64)
}

/// In-memory `SQLite` pool with the product table
pub async fn create_test_pool() -> Result<SqlitePool> {
    init_test_logging();
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    sqlx::query(SQLITE_SCHEMA).execute(&pool).await?;
    Ok(pool)
}

/// Insert `rows` products named `person{i}` through the DAO
pub async fn populate(pool: &SqlitePool, dao: &ProductDao, rows: i64) -> Result<()> {
    let mut tx = pool.begin().await?;
    let mut session = sqlite::wrap(&mut tx);
    for i in 0..rows {
        dao.insert
            .call(&mut session, (i, format!("person{i}"), seeded_cost(i)))
            .await?;
    }
    drop(session);
    tx.commit().await?;
    Ok(())
}

/// Capability that records every statement and replays canned results
#[derive(Debug, Default)]
pub struct RecordingCapability {
    pub statements: Vec<BoundStatement>,
    pub rows: Vec<FieldMap>,
    pub exec_result: ExecResult,
    pub failure: Option<String>,
}

impl RecordingCapability {
    pub fn returning(rows: Vec<FieldMap>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_owned()),
            ..Self::default()
        }
    }

    pub fn last(&self) -> &BoundStatement {
        self.statements.last().unwrap()
    }
}

#[async_trait]
impl Querier for RecordingCapability {
    async fn query(&mut self, statement: &BoundStatement) -> Result<Vec<FieldMap>, BoxError> {
        self.statements.push(statement.clone());
        match &self.failure {
            Some(message) => Err(message.clone().into()),
            None => Ok(self.rows.clone()),
        }
    }
}

#[async_trait]
impl Executor for RecordingCapability {
    async fn execute(&mut self, statement: &BoundStatement) -> Result<ExecResult, BoxError> {
        self.statements.push(statement.clone());
        match &self.failure {
            Some(message) => Err(message.clone().into()),
            None => Ok(self.exec_result),
        }
    }
}
