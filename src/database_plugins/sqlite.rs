// ABOUTME: SQLite execution capability binding SqlValues and reading rows into FieldMaps
// ABOUTME: Reports last_insert_rowid as the generated key of successful inserts
//! `SQLite` capability
//!
//! ```text
//! let mut tx = pool.begin().await?;
//! let mut session = sqlite::wrap(&mut tx);
//! dao.insert.call(&mut session, (product,)).await?;
//! tx.commit().await?;
//! ```

use async_trait::async_trait;
use sqlmapper_core::{BoxError, FieldMap, SqlValue};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnection, SqlitePool, SqliteRow};
use sqlx::{Column, Row, Sqlite, TypeInfo, ValueRef};

use super::is_insert;
use crate::capability::{ExecResult, Executor, Querier};
use crate::translator::BoundStatement;

/// Capability over one `SQLite` connection or transaction
#[derive(Debug)]
pub struct SqliteSession<'c> {
    conn: &'c mut SqliteConnection,
}

/// Wrap a connection, pooled connection or open transaction
///
/// `&mut Transaction` and `&mut PoolConnection` both deref to the connection.
pub fn wrap(conn: &mut SqliteConnection) -> SqliteSession<'_> {
    SqliteSession { conn }
}

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

fn bind_values<'q>(query: SqliteQuery<'q>, values: &[SqlValue]) -> SqliteQuery<'q> {
    values.iter().fold(query, |query, value| match value {
        SqlValue::Null => query.bind(None::<String>),
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::Int(i) => query.bind(*i),
        SqlValue::Float(x) => query.bind(*x),
        SqlValue::Text(s) => query.bind(s.clone()),
        SqlValue::Bytes(b) => query.bind(b.clone()),
    })
}

/// Convert a row, keeping column order and each value's storage class
fn row_to_field_map(row: &SqliteRow) -> Result<FieldMap, sqlx::Error> {
    let mut map = FieldMap::with_capacity(row.columns().len());
    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index)?;
        let value = if raw.is_null() {
            SqlValue::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" => SqlValue::Int(row.try_get(index)?),
                "REAL" => SqlValue::Float(row.try_get(index)?),
                "BOOLEAN" => SqlValue::Bool(row.try_get(index)?),
                "BLOB" => SqlValue::Bytes(row.try_get(index)?),
                _ => SqlValue::Text(row.try_get(index)?),
            }
        };
        map.insert(column.name(), value);
    }
    Ok(map)
}

async fn fetch_rows<'c, E>(executor: E, statement: &BoundStatement) -> Result<Vec<FieldMap>, BoxError>
where
    E: sqlx::Executor<'c, Database = Sqlite>,
{
    let rows = bind_values(sqlx::query(&statement.sql), &statement.values)
        .fetch_all(executor)
        .await?;
    Ok(rows
        .iter()
        .map(row_to_field_map)
        .collect::<Result<Vec<_>, _>>()?)
}

async fn execute_statement<'c, E>(executor: E, statement: &BoundStatement) -> Result<ExecResult, BoxError>
where
    E: sqlx::Executor<'c, Database = Sqlite>,
{
    let result = bind_values(sqlx::query(&statement.sql), &statement.values)
        .execute(executor)
        .await?;
    let rows_affected = result.rows_affected();
    Ok(ExecResult {
        rows_affected,
        last_insert_id: (rows_affected > 0 && is_insert(&statement.sql))
            .then(|| result.last_insert_rowid()),
    })
}

#[async_trait]
impl Querier for SqliteSession<'_> {
    async fn query(&mut self, statement: &BoundStatement) -> Result<Vec<FieldMap>, BoxError> {
        fetch_rows(&mut *self.conn, statement).await
    }
}

#[async_trait]
impl Executor for SqliteSession<'_> {
    async fn execute(&mut self, statement: &BoundStatement) -> Result<ExecResult, BoxError> {
        execute_statement(&mut *self.conn, statement).await
    }
}

#[async_trait]
impl Querier for SqlitePool {
    async fn query(&mut self, statement: &BoundStatement) -> Result<Vec<FieldMap>, BoxError> {
        fetch_rows(&*self, statement).await
    }
}

#[async_trait]
impl Executor for SqlitePool {
    async fn execute(&mut self, statement: &BoundStatement) -> Result<ExecResult, BoxError> {
        execute_statement(&*self, statement).await
    }
}
