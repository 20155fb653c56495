// ABOUTME: Row decoding from generic field maps into typed records and result shapes
// ABOUTME: Defines FromSqlValue, FromRow and the ResultShape family returned by slots
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Result decoding
//!
//! Capabilities return rows as [`FieldMap`]s. A slot's declared result type
//! decides what happens next:
//!
//! | Result type          | Kind            | Behavior                                   |
//! |----------------------|-----------------|--------------------------------------------|
//! | `T: FromRow`         | record          | first row decoded, zero rows is `NoRows`   |
//! | `Vec<T: FromRow>`    | records         | every row decoded, zero rows is empty      |
//! | `FieldMap`           | field map       | first row as-is                            |
//! | `Vec<FieldMap>`      | field maps      | every row as-is                            |
//! | `u64`                | rows affected   | affected-row count                         |
//! | `ExecResult`         | exec result     | affected-row count and generated key       |
//!
//! Record fields are matched to columns by their tag, exactly first and then
//! ASCII case-insensitively. A `NULL` column decodes into `None` for `Option`
//! fields and is a type mismatch otherwise.

use std::any::type_name;

use sqlmapper_core::{DecodeError, FieldMap, MapperError, MapperResult, SqlValue};

use crate::capability::ExecResult;

/// Conversion from one dynamically typed value
pub trait FromSqlValue: Sized {
    /// Convert `value`, or `None` if it has an incompatible type
    fn from_sql_value(value: &SqlValue) -> Option<Self>;
}

impl FromSqlValue for i64 {
    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

macro_rules! narrow_int_from_sql {
    ($($ty:ty),+) => {
        $(
            impl FromSqlValue for $ty {
                fn from_sql_value(value: &SqlValue) -> Option<Self> {
                    match value {
                        SqlValue::Int(i) => <$ty>::try_from(*i).ok(),
                        _ => None,
                    }
                }
            }
        )+
    };
}

narrow_int_from_sql!(i32, i16, i8, u32, u16, u8, u64);

impl FromSqlValue for f64 {
    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Float(x) => Some(*x),
            SqlValue::Int(i) => Some(*i as Self),
            _ => None,
        }
    }
}

impl FromSqlValue for f32 {
    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        #[allow(clippy::cast_possible_truncation)]
        match value {
            SqlValue::Float(x) => Some(*x as Self),
            SqlValue::Int(i) => Some(*i as Self),
            _ => None,
        }
    }
}

impl FromSqlValue for bool {
    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Bool(b) => Some(*b),
            // SQLite stores booleans as integers
            SqlValue::Int(0) => Some(false),
            SqlValue::Int(1) => Some(true),
            _ => None,
        }
    }
}

impl FromSqlValue for String {
    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Text(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromSqlValue for Vec<u8> {
    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Bytes(b) => Some(b.clone()),
            SqlValue::Text(s) => Some(s.clone().into_bytes()),
            _ => None,
        }
    }
}

impl FromSqlValue for SqlValue {
    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        Some(value.clone())
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Null => Some(None),
            other => T::from_sql_value(other).map(Some),
        }
    }
}

/// Decode the column tagged `column` from `row`
///
/// A missing column decodes like `NULL` when the target is an `Option`.
///
/// # Errors
///
/// - [`DecodeError::MissingColumn`] when the column is absent and the target
///   cannot hold `NULL`
/// - [`DecodeError::TypeMismatch`] when the value cannot be converted
pub fn decode_column<T: FromSqlValue>(row: &FieldMap, column: &str) -> Result<T, DecodeError> {
    let Some(value) = row.column(column) else {
        return T::from_sql_value(&SqlValue::Null).ok_or_else(|| DecodeError::MissingColumn {
            column: column.to_owned(),
        });
    };
    T::from_sql_value(value).ok_or_else(|| DecodeError::TypeMismatch {
        column: column.to_owned(),
        expected: type_name::<T>(),
        found: value.type_name(),
    })
}

/// Construction of a value from one row
///
/// Implemented for records by [`mapped_record!`](crate::mapped_record) and
/// for [`FieldMap`], which keeps the row unchanged.
pub trait FromRow: Sized {
    /// Whether the row is kept as a generic field map
    const GENERIC: bool = false;

    /// Build a value from `row`
    fn from_row(row: FieldMap) -> Result<Self, DecodeError>;
}

impl FromRow for FieldMap {
    const GENERIC: bool = true;

    fn from_row(row: FieldMap) -> Result<Self, DecodeError> {
        Ok(row)
    }
}

/// Classification of a slot's declared result type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShapeKind {
    /// A single typed record
    Record,
    /// A sequence of typed records
    Records,
    /// A single generic field map
    FieldMap,
    /// A sequence of generic field maps
    FieldMaps,
    /// An affected-row count
    RowsAffected,
    /// Affected-row count plus generated key
    ExecResult,
}

impl ResultShapeKind {
    /// Name used in errors
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Record => "a record",
            Self::Records => "a list of records",
            Self::FieldMap => "a field map",
            Self::FieldMaps => "a list of field maps",
            Self::RowsAffected => "an affected-row count",
            Self::ExecResult => "an execution result",
        }
    }

    /// Whether this shape is built from returned rows
    #[must_use]
    pub const fn returns_rows(self) -> bool {
        !matches!(self, Self::RowsAffected | Self::ExecResult)
    }
}

/// What a capability handed back for one call
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Rows from a query capability
    Rows(Vec<FieldMap>),
    /// Result of an execute capability
    Exec(ExecResult),
}

/// A type a slot may return
pub trait ResultShape: Sized + Send {
    /// Static classification checked against the slot's capability
    fn kind() -> ResultShapeKind;

    /// Convert a capability outcome for the slot named `slot`
    fn from_outcome(outcome: Outcome, slot: &str) -> MapperResult<Self>;
}

fn into_rows(outcome: Outcome) -> Vec<FieldMap> {
    match outcome {
        Outcome::Rows(rows) => rows,
        Outcome::Exec(_) => Vec::new(),
    }
}

fn decode_row<T: FromRow>(row: FieldMap, slot: &str) -> MapperResult<T> {
    T::from_row(row).map_err(|source| MapperError::Decode {
        slot: slot.to_owned(),
        source,
    })
}

impl<T: FromRow + Send> ResultShape for T {
    fn kind() -> ResultShapeKind {
        if T::GENERIC {
            ResultShapeKind::FieldMap
        } else {
            ResultShapeKind::Record
        }
    }

    fn from_outcome(outcome: Outcome, slot: &str) -> MapperResult<Self> {
        let row = into_rows(outcome)
            .into_iter()
            .next()
            .ok_or_else(|| MapperError::NoRows {
                slot: slot.to_owned(),
            })?;
        decode_row(row, slot)
    }
}

impl<T: FromRow + Send> ResultShape for Vec<T> {
    fn kind() -> ResultShapeKind {
        if T::GENERIC {
            ResultShapeKind::FieldMaps
        } else {
            ResultShapeKind::Records
        }
    }

    fn from_outcome(outcome: Outcome, slot: &str) -> MapperResult<Self> {
        into_rows(outcome)
            .into_iter()
            .map(|row| decode_row(row, slot))
            .collect()
    }
}

impl ResultShape for u64 {
    fn kind() -> ResultShapeKind {
        ResultShapeKind::RowsAffected
    }

    fn from_outcome(outcome: Outcome, _slot: &str) -> MapperResult<Self> {
        Ok(match outcome {
            Outcome::Exec(result) => result.rows_affected,
            Outcome::Rows(rows) => rows.len() as Self,
        })
    }
}

impl ResultShape for ExecResult {
    fn kind() -> ResultShapeKind {
        ResultShapeKind::ExecResult
    }

    fn from_outcome(outcome: Outcome, _slot: &str) -> MapperResult<Self> {
        Ok(match outcome {
            Outcome::Exec(result) => result,
            Outcome::Rows(rows) => Self {
                rows_affected: rows.len() as u64,
                last_insert_id: None,
            },
        })
    }
}
