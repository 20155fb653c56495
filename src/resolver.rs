// ABOUTME: Parameter resolution from marker paths to bindable values
// ABOUTME: Static path checks against argument shapes plus per-call value lookup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Parameter resolution
//!
//! A marker path is checked twice. [`check_path`] runs once at synthesis and
//! rejects paths the argument's static shape can never satisfy. [`resolve`]
//! runs on every call and walks the concrete [`BindValue`]; for records it
//! cannot fail after a successful check, but map keys are only known at call
//! time.
//!
//! Resolution rules, in order:
//!
//! 1. a generic map is addressed by key with a single path segment
//! 2. a record is addressed field by field
//! 3. an absent optional resolves to one `NULL`
//! 4. a sequence resolves to its elements for expansion
//! 5. anything else resolves to itself

use sqlmapper_core::constants::syntax::PATH_SEPARATOR;
use sqlmapper_core::{ResolutionError, SqlValue, SynthesisError};

use crate::binding::{ArgShape, BindValue};

/// A resolved marker occurrence
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// One placeholder bound to this value
    Single(SqlValue),
    /// One placeholder per element, in order
    Expanded(Vec<SqlValue>),
}

fn extend_label(label: &str, segment: &str) -> String {
    let mut extended = String::with_capacity(label.len() + segment.len() + 1);
    extended.push_str(label);
    extended.push(PATH_SEPARATOR);
    extended.push_str(segment);
    extended
}

/// Check that `path` can be resolved against an argument of `shape`
///
/// `label` is the marker root as written (`p` or `$1`) and prefixes every
/// reported path.
///
/// # Errors
///
/// - [`SynthesisError::UnknownField`] when a record lacks a field
/// - [`SynthesisError::NotAddressable`] when the path steps into a scalar, a
///   sequence or a map value
/// - [`SynthesisError::NotBindable`] when the path ends on a record or map
pub fn check_path(label: &str, shape: &ArgShape, path: &[String]) -> Result<(), SynthesisError> {
    let mut current = shape;
    let mut parameter = label.to_owned();
    let mut rest = path;

    loop {
        let Some((segment, tail)) = rest.split_first() else {
            return match current {
                ArgShape::Record(_) | ArgShape::Map => Err(SynthesisError::NotBindable {
                    parameter,
                    shape: current.describe(),
                }),
                _ => Ok(()),
            };
        };

        match current {
            ArgShape::Record(_) => {
                let field = current
                    .field(segment)
                    .ok_or_else(|| SynthesisError::UnknownField {
                        parameter: parameter.clone(),
                        field: segment.clone(),
                    })?;
                parameter = extend_label(&parameter, segment);
                current = &field.shape;
                rest = tail;
            }
            ArgShape::Map => {
                // Map values are scalars, so only one segment may follow a map
                return match tail.first() {
                    None => Ok(()),
                    Some(next) => Err(SynthesisError::NotAddressable {
                        parameter: extend_label(&parameter, segment),
                        shape: "map value",
                        field: next.clone(),
                    }),
                };
            }
            ArgShape::Scalar | ArgShape::Optional | ArgShape::Sequence => {
                return Err(SynthesisError::NotAddressable {
                    parameter,
                    shape: current.describe(),
                    field: segment.clone(),
                });
            }
        }
    }
}

/// Resolve `path` against one argument value
///
/// # Errors
///
/// Returns a [`ResolutionError`] when a map key or record field is missing,
/// when the path steps into a value without fields, or when it ends on a
/// record or map.
pub fn resolve(label: &str, value: &BindValue, path: &[String]) -> Result<Resolved, ResolutionError> {
    let Some((segment, tail)) = path.split_first() else {
        return match value {
            BindValue::Scalar(scalar) => Ok(Resolved::Single(scalar.clone())),
            BindValue::Sequence(items) => Ok(Resolved::Expanded(items.clone())),
            BindValue::Record(_) | BindValue::Map(_) => Err(ResolutionError::NotBindable {
                parameter: label.to_owned(),
                shape: value.describe(),
            }),
        };
    };

    match value {
        BindValue::Map(map) => {
            let entry = map.get(segment).ok_or_else(|| ResolutionError::MissingKey {
                parameter: label.to_owned(),
                key: segment.clone(),
            })?;
            match tail.first() {
                None => Ok(Resolved::Single(entry.clone())),
                Some(next) => Err(ResolutionError::NotAddressable {
                    parameter: extend_label(label, segment),
                    shape: "map value",
                    field: next.clone(),
                }),
            }
        }
        BindValue::Record(fields) => {
            let (_, field) = fields
                .iter()
                .find(|(name, _)| name == segment)
                .ok_or_else(|| ResolutionError::MissingField {
                    parameter: label.to_owned(),
                    field: segment.clone(),
                })?;
            resolve(&extend_label(label, segment), field, tail)
        }
        BindValue::Scalar(_) | BindValue::Sequence(_) => Err(ResolutionError::NotAddressable {
            parameter: label.to_owned(),
            shape: value.describe(),
            field: segment.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{Bindable, FieldShape};
    use sqlmapper_core::FieldMap;

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| (*s).to_owned()).collect()
    }

    fn product_shape() -> ArgShape {
        ArgShape::Record(vec![
            FieldShape::new("id", ArgShape::Scalar),
            FieldShape::new("name", ArgShape::Scalar),
            FieldShape::new("cost", ArgShape::Optional),
        ])
    }

    #[test]
    fn test_check_record_fields() {
        let shape = product_shape();
        assert!(check_path("p", &shape, &path(&["name"])).is_ok());
        assert_eq!(
            check_path("p", &shape, &path(&["qty"])),
            Err(SynthesisError::UnknownField {
                parameter: "p".into(),
                field: "qty".into()
            })
        );
        assert_eq!(
            check_path("p", &shape, &[]),
            Err(SynthesisError::NotBindable {
                parameter: "p".into(),
                shape: "record"
            })
        );
        assert_eq!(
            check_path("p", &shape, &path(&["name", "len"])),
            Err(SynthesisError::NotAddressable {
                parameter: "p.name".into(),
                shape: "scalar",
                field: "len".into()
            })
        );
    }

    #[test]
    fn test_check_map_allows_single_key() {
        assert!(check_path("m", &ArgShape::Map, &path(&["anything"])).is_ok());
        assert!(matches!(
            check_path("m", &ArgShape::Map, &path(&["a", "b"])),
            Err(SynthesisError::NotAddressable { .. })
        ));
        assert!(check_path("ids", &ArgShape::Sequence, &[]).is_ok());
    }

    #[test]
    fn test_resolve_map_key() {
        let map: FieldMap = [("Name", "foo")].into_iter().collect();
        let value = map.to_bind_value();

        assert_eq!(
            resolve("m", &value, &path(&["Name"])).unwrap(),
            Resolved::Single(SqlValue::Text("foo".into()))
        );
        assert_eq!(
            resolve("m", &value, &path(&["Cost"])),
            Err(ResolutionError::MissingKey {
                parameter: "m".into(),
                key: "Cost".into()
            })
        );
    }

    #[test]
    fn test_resolve_sequence_and_null() {
        let ids = vec![1_i64, 3, 5].to_bind_value();
        assert_eq!(
            resolve("ids", &ids, &[]).unwrap(),
            Resolved::Expanded(vec![SqlValue::Int(1), SqlValue::Int(3), SqlValue::Int(5)])
        );

        let cost: Option<f64> = None;
        assert_eq!(
            resolve("cost", &cost.to_bind_value(), &[]).unwrap(),
            Resolved::Single(SqlValue::Null)
        );
    }

    #[test]
    fn test_resolve_nested_record() {
        let value = BindValue::Record(vec![(
            "inner",
            BindValue::Record(vec![("code", BindValue::Scalar(SqlValue::Int(7)))]),
        )]);

        assert_eq!(
            resolve("o", &value, &path(&["inner", "code"])).unwrap(),
            Resolved::Single(SqlValue::Int(7))
        );
        assert_eq!(
            resolve("o", &value, &path(&["inner"])),
            Err(ResolutionError::NotBindable {
                parameter: "o.inner".into(),
                shape: "record"
            })
        );
    }
}
