// ABOUTME: PostgreSQL execution capability binding SqlValues and reading rows into FieldMaps
// ABOUTME: Binds NULL with an unspecified type so the server infers it from context
//! `PostgreSQL` capability
//!
//! Statements with a `NULL` argument are sent unprepared: the `NULL` is bound
//! with type oid 0, and the server infers its type from the statement text,
//! which a cached statement would then pin for every later call.
//!
//! Rows are read by column type. Numeric, date/time, uuid and json columns
//! come back as their text rendering (`NUMERIC` keeps its exact digits,
//! `TIMESTAMPTZ` is RFC 3339 in UTC). Any other type is a decode error.

use std::fmt::Display;

use async_trait::async_trait;
use sqlmapper_core::{BoxError, DecodeError, FieldMap, SqlValue};
use sqlx::encode::{Encode, IsNull};
use sqlx::error::BoxDynError;
use sqlx::postgres::types::Oid;
use sqlx::postgres::{
    PgArgumentBuffer, PgArguments, PgColumn, PgConnection, PgPool, PgRow, PgTypeInfo, Postgres,
};
use sqlx::query::Query;
use sqlx::types::chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::types::{Decimal, JsonValue, Uuid};
use sqlx::{Column, Row, Type, TypeInfo, ValueRef};

use crate::capability::{ExecResult, Executor, Querier};
use crate::translator::BoundStatement;

/// Capability over one `PostgreSQL` connection or transaction
#[derive(Debug)]
pub struct PostgresSession<'c> {
    conn: &'c mut PgConnection,
}

/// Wrap a connection, pooled connection or open transaction
pub fn wrap(conn: &mut PgConnection) -> PostgresSession<'_> {
    PostgresSession { conn }
}

/// A `NULL` whose type the server infers
struct UntypedNull;

impl Type<Postgres> for UntypedNull {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_oid(Oid(0))
    }
}

impl Encode<'_, Postgres> for UntypedNull {
    fn encode_by_ref(&self, _buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        Ok(IsNull::Yes)
    }
}

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

fn prepare(statement: &BoundStatement) -> PgQuery<'_> {
    let query = sqlx::query(&statement.sql).persistent(!statement.has_null());
    statement
        .values
        .iter()
        .fold(query, |query, value| match value {
            SqlValue::Null => query.bind(UntypedNull),
            SqlValue::Bool(b) => query.bind(*b),
            SqlValue::Int(i) => query.bind(*i),
            SqlValue::Float(x) => query.bind(*x),
            SqlValue::Text(s) => query.bind(s.clone()),
            SqlValue::Bytes(b) => query.bind(b.clone()),
        })
}

fn text(value: &impl Display) -> SqlValue {
    SqlValue::Text(value.to_string())
}

fn column_value(row: &PgRow, column: &PgColumn) -> Result<SqlValue, BoxError> {
    let index = column.ordinal();
    if row.try_get_raw(index)?.is_null() {
        return Ok(SqlValue::Null);
    }
    let value: SqlValue = match column.type_info().name() {
        "INT2" => row.try_get::<i16, _>(index)?.into(),
        "INT4" => row.try_get::<i32, _>(index)?.into(),
        "INT8" => row.try_get::<i64, _>(index)?.into(),
        "OID" => SqlValue::Int(i64::from(row.try_get::<Oid, _>(index)?.0)),
        "FLOAT4" => row.try_get::<f32, _>(index)?.into(),
        "FLOAT8" => row.try_get::<f64, _>(index)?.into(),
        "BOOL" => row.try_get::<bool, _>(index)?.into(),
        "TEXT" | "VARCHAR" | "CHAR" | "BPCHAR" | "NAME" => {
            row.try_get::<String, _>(index)?.into()
        }
        "BYTEA" => row.try_get::<Vec<u8>, _>(index)?.into(),
        // exact decimal text, no rounding through f64
        "NUMERIC" => text(&row.try_get::<Decimal, _>(index)?),
        "DATE" => text(&row.try_get::<NaiveDate, _>(index)?),
        "TIME" => text(&row.try_get::<NaiveTime, _>(index)?),
        "TIMESTAMP" => text(&row.try_get::<NaiveDateTime, _>(index)?),
        "TIMESTAMPTZ" => SqlValue::Text(row.try_get::<DateTime<Utc>, _>(index)?.to_rfc3339()),
        "UUID" => text(&row.try_get::<Uuid, _>(index)?),
        "JSON" | "JSONB" => text(&row.try_get::<JsonValue, _>(index)?),
        other => {
            return Err(DecodeError::UnsupportedColumnType {
                column: column.name().to_owned(),
                sql_type: other.to_owned(),
            }
            .into())
        }
    };
    Ok(value)
}

fn row_to_field_map(row: &PgRow) -> Result<FieldMap, BoxError> {
    let mut map = FieldMap::with_capacity(row.columns().len());
    for column in row.columns() {
        map.insert(column.name(), column_value(row, column)?);
    }
    Ok(map)
}

async fn fetch_rows<'c, E>(executor: E, statement: &BoundStatement) -> Result<Vec<FieldMap>, BoxError>
where
    E: sqlx::Executor<'c, Database = Postgres>,
{
    let rows = prepare(statement).fetch_all(executor).await?;
    rows.iter().map(row_to_field_map).collect()
}

async fn execute_statement<'c, E>(executor: E, statement: &BoundStatement) -> Result<ExecResult, BoxError>
where
    E: sqlx::Executor<'c, Database = Postgres>,
{
    let result = prepare(statement).execute(executor).await?;
    Ok(ExecResult {
        rows_affected: result.rows_affected(),
        last_insert_id: None,
    })
}

#[async_trait]
impl Querier for PostgresSession<'_> {
    async fn query(&mut self, statement: &BoundStatement) -> Result<Vec<FieldMap>, BoxError> {
        fetch_rows(&mut *self.conn, statement).await
    }
}

#[async_trait]
impl Executor for PostgresSession<'_> {
    async fn execute(&mut self, statement: &BoundStatement) -> Result<ExecResult, BoxError> {
        execute_statement(&mut *self.conn, statement).await
    }
}

#[async_trait]
impl Querier for PgPool {
    async fn query(&mut self, statement: &BoundStatement) -> Result<Vec<FieldMap>, BoxError> {
        fetch_rows(&*self, statement).await
    }
}

#[async_trait]
impl Executor for PgPool {
    async fn execute(&mut self, statement: &BoundStatement) -> Result<ExecResult, BoxError> {
        execute_statement(&*self, statement).await
    }
}
