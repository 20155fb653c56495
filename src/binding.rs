// ABOUTME: Capability-based binding interface for slot arguments
// ABOUTME: Static argument shapes for synthesis-time checks and runtime bind values per call
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Argument binding
//!
//! Every slot argument type implements [`Bindable`], which exposes two views:
//!
//! - [`Bindable::shape`]: the static [`ArgShape`] of the type. Records publish
//!   a field table, so dotted marker paths are checked once when the slot is
//!   synthesized instead of on every call.
//! - [`Bindable::to_bind_value`]: the runtime [`BindValue`] for one call.
//!
//! Scalars, `Option`s of scalars, sequences of scalars and generic maps are
//! covered here. Structured records opt in with [`mapped_record!`] (binding
//! and row decoding) or [`bindable_record!`] (binding only).
//!
//! [`mapped_record!`]: crate::mapped_record
//! [`bindable_record!`]: crate::bindable_record

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use sqlmapper_core::{FieldMap, SqlValue};

/// Static shape of an argument type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgShape {
    /// A single value
    Scalar,
    /// A value that may be absent; absence binds SQL `NULL`
    Optional,
    /// A list of values, expanded into one placeholder per element
    Sequence,
    /// A structured record with a fixed field table
    Record(Vec<FieldShape>),
    /// A generic map whose keys are only known at call time
    Map,
}

impl ArgShape {
    /// Short description used in error messages
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Optional => "optional scalar",
            Self::Sequence => "sequence",
            Self::Record(_) => "record",
            Self::Map => "map",
        }
    }

    /// Field table entry named exactly `name`
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldShape> {
        match self {
            Self::Record(fields) => fields.iter().find(|field| field.name == name),
            _ => None,
        }
    }
}

/// One entry of a record's field table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldShape {
    /// Field name as written in marker paths
    pub name: &'static str,
    /// Shape of the field's type
    pub shape: ArgShape,
}

impl FieldShape {
    /// Create a field table entry
    #[must_use]
    pub const fn new(name: &'static str, shape: ArgShape) -> Self {
        Self { name, shape }
    }
}

/// Runtime value of one argument
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    /// A single value (`SqlValue::Null` for an absent optional)
    Scalar(SqlValue),
    /// Values to expand in order
    Sequence(Vec<SqlValue>),
    /// Record fields in declaration order
    Record(Vec<(&'static str, BindValue)>),
    /// Generic map argument
    Map(FieldMap),
}

impl BindValue {
    /// Short description used in error messages
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::Scalar(SqlValue::Null) => "null",
            Self::Scalar(_) => "scalar",
            Self::Sequence(_) => "sequence",
            Self::Record(_) => "record",
            Self::Map(_) => "map",
        }
    }
}

/// A type that can be passed to a slot
pub trait Bindable: Sized {
    /// Static shape of the type
    fn shape() -> ArgShape;

    /// Runtime value for one call
    fn to_bind_value(&self) -> BindValue;
}

/// A scalar that converts into a single `SqlValue`
pub trait ToSqlValue {
    /// The value to bind
    fn to_sql_value(&self) -> SqlValue;
}

macro_rules! scalar_bindable {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ToSqlValue for $ty {
                fn to_sql_value(&self) -> SqlValue {
                    SqlValue::from(self.clone())
                }
            }

            impl Bindable for $ty {
                fn shape() -> ArgShape {
                    ArgShape::Scalar
                }

                fn to_bind_value(&self) -> BindValue {
                    BindValue::Scalar(self.to_sql_value())
                }
            }
        )+
    };
}

scalar_bindable!(i64, i32, i16, i8, u32, u16, u8, f64, f32, bool, String);

impl ToSqlValue for SqlValue {
    fn to_sql_value(&self) -> SqlValue {
        self.clone()
    }
}

impl Bindable for SqlValue {
    fn shape() -> ArgShape {
        ArgShape::Scalar
    }

    fn to_bind_value(&self) -> BindValue {
        BindValue::Scalar(self.clone())
    }
}

impl<T: ToSqlValue> Bindable for Option<T> {
    fn shape() -> ArgShape {
        ArgShape::Optional
    }

    fn to_bind_value(&self) -> BindValue {
        BindValue::Scalar(
            self.as_ref()
                .map_or(SqlValue::Null, ToSqlValue::to_sql_value),
        )
    }
}

impl<T: ToSqlValue> Bindable for Vec<T> {
    fn shape() -> ArgShape {
        ArgShape::Sequence
    }

    fn to_bind_value(&self) -> BindValue {
        BindValue::Sequence(self.iter().map(ToSqlValue::to_sql_value).collect())
    }
}

impl<T: ToSqlValue, const N: usize> Bindable for [T; N] {
    fn shape() -> ArgShape {
        ArgShape::Sequence
    }

    fn to_bind_value(&self) -> BindValue {
        BindValue::Sequence(self.iter().map(ToSqlValue::to_sql_value).collect())
    }
}

impl Bindable for FieldMap {
    fn shape() -> ArgShape {
        ArgShape::Map
    }

    fn to_bind_value(&self) -> BindValue {
        BindValue::Map(self.clone())
    }
}

impl<S: BuildHasher> Bindable for HashMap<String, SqlValue, S> {
    fn shape() -> ArgShape {
        ArgShape::Map
    }

    fn to_bind_value(&self) -> BindValue {
        BindValue::Map(
            self.iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }
}

impl Bindable for BTreeMap<String, SqlValue> {
    fn shape() -> ArgShape {
        ArgShape::Map
    }

    fn to_bind_value(&self) -> BindValue {
        BindValue::Map(
            self.iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }
}

/// The full argument list of a slot, as a tuple of [`Bindable`]s
pub trait Arguments: Send {
    /// Number of arguments
    const ARITY: usize;

    /// Shapes of each argument in order
    fn shapes() -> Vec<ArgShape>;

    /// Runtime values of each argument in order
    fn to_bind_values(&self) -> Vec<BindValue>;
}

impl Arguments for () {
    const ARITY: usize = 0;

    fn shapes() -> Vec<ArgShape> {
        Vec::new()
    }

    fn to_bind_values(&self) -> Vec<BindValue> {
        Vec::new()
    }
}

macro_rules! impl_arguments {
    ($arity:expr; $($ty:ident $idx:tt),+) => {
        impl<$($ty: Bindable + Send),+> Arguments for ($($ty,)+) {
            const ARITY: usize = $arity;

            fn shapes() -> Vec<ArgShape> {
                vec![$($ty::shape()),+]
            }

            fn to_bind_values(&self) -> Vec<BindValue> {
                vec![$(self.$idx.to_bind_value()),+]
            }
        }
    };
}

impl_arguments!(1; A0 0);
impl_arguments!(2; A0 0, A1 1);
impl_arguments!(3; A0 0, A1 1, A2 2);
impl_arguments!(4; A0 0, A1 1, A2 2, A3 3);
impl_arguments!(5; A0 0, A1 1, A2 2, A3 3, A4 4);
impl_arguments!(6; A0 0, A1 1, A2 2, A3 3, A4 4, A5 5);
impl_arguments!(7; A0 0, A1 1, A2 2, A3 3, A4 4, A5 5, A6 6);
impl_arguments!(8; A0 0, A1 1, A2 2, A3 3, A4 4, A5 5, A6 6, A7 7);

/// Shape of a record field, inferred from a field accessor
#[doc(hidden)]
pub fn field_shape<R, T, F>(_accessor: F) -> ArgShape
where
    T: Bindable,
    F: Fn(&R) -> &T,
{
    T::shape()
}

/// Implement [`Bindable`] for a struct by listing its fields
///
/// Marker paths address the fields by their Rust names (`:p.name:`).
///
/// ```text
/// bindable_record!(Filter { name, min_cost });
/// ```
#[macro_export]
macro_rules! bindable_record {
    ($record:ident { $($field:ident),+ $(,)? }) => {
        impl $crate::binding::Bindable for $record {
            fn shape() -> $crate::binding::ArgShape {
                $crate::binding::ArgShape::Record(::std::vec![
                    $($crate::binding::FieldShape::new(
                        ::std::stringify!($field),
                        $crate::binding::field_shape(|record: &$record| &record.$field),
                    )),+
                ])
            }

            fn to_bind_value(&self) -> $crate::binding::BindValue {
                $crate::binding::BindValue::Record(::std::vec![
                    $((
                        ::std::stringify!($field),
                        $crate::binding::Bindable::to_bind_value(&self.$field),
                    )),+
                ])
            }
        }
    };
}

/// Implement [`Bindable`] and [`FromRow`] for a struct
///
/// Each field is paired with the column tag it is decoded from. Every field of
/// the struct must be listed.
///
/// ```text
/// mapped_record!(Product {
///     id => "id",
///     name => "name",
///     cost => "cost",
/// });
/// ```
///
/// [`FromRow`]: crate::decode::FromRow
#[macro_export]
macro_rules! mapped_record {
    ($record:ident { $($field:ident => $column:literal),+ $(,)? }) => {
        $crate::bindable_record!($record { $($field),+ });

        impl $crate::decode::FromRow for $record {
            fn from_row(
                row: $crate::FieldMap,
            ) -> ::std::result::Result<Self, $crate::DecodeError> {
                ::std::result::Result::Ok(Self {
                    $($field: $crate::decode::decode_column(&row, $column)?),+
                })
            }
        }
    };
}
