// ABOUTME: Statement translation from parsed templates to dialect SQL plus bound values
// ABOUTME: Emits placeholders left to right, expanding sequence arguments into IN lists
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Statement translation
//!
//! A [`StatementPlan`] is the synthesis-time product for one slot: the parsed
//! template, the argument index each marker occurrence binds to, and the
//! dialect. [`StatementPlan::bind`] turns one call's arguments into a
//! [`BoundStatement`] in a single left-to-right pass.
//!
//! Invariant: the number of placeholders in the emitted SQL always equals
//! the number of bound values, and the k-th placeholder is bound to the k-th
//! value. With an ordinal dialect the ordinals run `1..=n` without gaps,
//! across every expanded sequence in the statement.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use sqlmapper_core::constants::syntax::EXPANSION_SEPARATOR;
use sqlmapper_core::{ResolutionError, SqlValue};

use crate::binding::BindValue;
use crate::dialect::Dialect;
use crate::resolver::{resolve, Resolved};
use crate::template::ParsedTemplate;

/// SQL text ready to run plus its ordered bound values
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement {
    /// Statement text in the target dialect's placeholder syntax
    pub sql: String,
    /// Values for the placeholders, in placeholder order
    pub values: Vec<SqlValue>,
}

impl BoundStatement {
    /// Whether any bound value is SQL `NULL`
    #[must_use]
    pub fn has_null(&self) -> bool {
        self.values.iter().any(SqlValue::is_null)
    }
}

impl Display for BoundStatement {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.sql)?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str("]")
    }
}

/// Compiled binding plan of one slot
#[derive(Debug, Clone)]
pub struct StatementPlan {
    template: Arc<ParsedTemplate>,
    bindings: Vec<OccurrenceBinding>,
    dialect: Dialect,
}

#[derive(Debug, Clone)]
struct OccurrenceBinding {
    argument: usize,
    label: String,
}

impl StatementPlan {
    /// Build a plan from a template and the zero-based argument index of each
    /// marker occurrence, in template order
    ///
    /// Indices beyond the occurrence count are ignored; occurrences without an
    /// index fail at bind time with [`ResolutionError::MissingArgument`].
    #[must_use]
    pub fn new(template: Arc<ParsedTemplate>, arguments: &[usize], dialect: Dialect) -> Self {
        let bindings = template
            .occurrences()
            .iter()
            .zip(arguments)
            .map(|(spec, &argument)| OccurrenceBinding {
                argument,
                label: spec.root.to_string(),
            })
            .collect();
        Self {
            template,
            bindings,
            dialect,
        }
    }

    /// Target dialect
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// The parsed template this plan renders
    #[must_use]
    pub fn template(&self) -> &ParsedTemplate {
        &self.template
    }

    /// Render the statement for one call
    ///
    /// An empty sequence renders a single placeholder bound to `NULL`, so
    /// `x in (:ids:)` becomes `x in (NULL)` and matches nothing.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolutionError`] if an occurrence cannot be resolved
    /// against `arguments`.
    pub fn bind(&self, arguments: &[BindValue]) -> Result<BoundStatement, ResolutionError> {
        let fragments = self.template.fragments();
        let occurrences = self.template.occurrences();
        let mut sql = String::with_capacity(fragments.iter().map(String::len).sum::<usize>() + 8);
        let mut values = Vec::with_capacity(occurrences.len());

        for (index, fragment) in fragments.iter().enumerate() {
            sql.push_str(fragment);
            let Some(spec) = occurrences.get(index) else {
                break;
            };
            let binding = self
                .bindings
                .get(index)
                .ok_or(ResolutionError::MissingArgument { index })?;
            let argument = arguments
                .get(binding.argument)
                .ok_or(ResolutionError::MissingArgument {
                    index: binding.argument,
                })?;

            match resolve(&binding.label, argument, &spec.path)? {
                Resolved::Single(value) => self.emit(&mut sql, &mut values, value),
                Resolved::Expanded(items) if items.is_empty() => {
                    self.emit(&mut sql, &mut values, SqlValue::Null);
                }
                Resolved::Expanded(items) => {
                    for (i, item) in items.into_iter().enumerate() {
                        if i > 0 {
                            sql.push_str(EXPANSION_SEPARATOR);
                        }
                        self.emit(&mut sql, &mut values, item);
                    }
                }
            }
        }

        Ok(BoundStatement { sql, values })
    }

    fn emit(&self, sql: &mut String, values: &mut Vec<SqlValue>, value: SqlValue) {
        values.push(value);
        self.dialect.write_placeholder(sql, values.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Bindable;

    fn plan(template: &str, arguments: &[usize], dialect: Dialect) -> StatementPlan {
        StatementPlan::new(
            Arc::new(ParsedTemplate::parse(template).unwrap()),
            arguments,
            dialect,
        )
    }

    #[test]
    fn test_sequence_expands_in_place() {
        let plan = plan(
            "select * from product where id in (:ids:)",
            &[0],
            Dialect::Postgres,
        );
        let bound = plan.bind(&[vec![1_i64, 3, 5].to_bind_value()]).unwrap();

        assert_eq!(bound.sql, "select * from product where id in ($1, $2, $3)");
        assert_eq!(
            bound.values,
            [SqlValue::Int(1), SqlValue::Int(3), SqlValue::Int(5)]
        );
    }

    #[test]
    fn test_empty_sequence_binds_null() {
        let plan = plan("select * from t where id in (:ids:)", &[0], Dialect::Sqlite);
        let bound = plan.bind(&[Vec::<i64>::new().to_bind_value()]).unwrap();

        assert_eq!(bound.sql, "select * from t where id in (?)");
        assert_eq!(bound.values, [SqlValue::Null]);
        assert!(bound.has_null());
    }

    #[test]
    fn test_missing_argument() {
        let plan = plan("select :a:, :b:", &[0, 1], Dialect::Sqlite);
        let err = plan.bind(&[1_i64.to_bind_value()]).unwrap_err();
        assert_eq!(err, ResolutionError::MissingArgument { index: 1 });
    }

    #[test]
    fn test_display_lists_values() {
        let bound = BoundStatement {
            sql: "select ?".into(),
            values: vec![SqlValue::Text("a".into()), SqlValue::Null],
        };
        assert_eq!(bound.to_string(), r#"select ? ["a", NULL]"#);
    }
}
