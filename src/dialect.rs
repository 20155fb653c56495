// ABOUTME: SQL dialects and their bound-parameter placeholder syntax
// ABOUTME: SQLite renders question marks, PostgreSQL renders numbered $n placeholders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::{self, Display, Formatter};

/// How a dialect spells a bound parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// Every parameter is the same anonymous marker; binding is by order
    Anonymous,
    /// Parameters carry their one-based ordinal
    Ordinal,
}

/// Target engine, chosen once per synthesized slot set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// `SQLite`: `?`
    #[default]
    Sqlite,
    /// `PostgreSQL`: `$1`, `$2`, ...
    Postgres,
}

impl Dialect {
    /// Placeholder style of this dialect
    #[must_use]
    pub const fn style(self) -> PlaceholderStyle {
        match self {
            Self::Sqlite => PlaceholderStyle::Anonymous,
            Self::Postgres => PlaceholderStyle::Ordinal,
        }
    }

    /// Append the placeholder for one-based `position` to `out`
    pub fn write_placeholder(self, out: &mut String, position: usize) {
        match self.style() {
            PlaceholderStyle::Anonymous => out.push('?'),
            PlaceholderStyle::Ordinal => {
                out.push('$');
                out.push_str(&position.to_string());
            }
        }
    }

    /// Placeholder for one-based `position`
    #[must_use]
    pub fn placeholder(self, position: usize) -> String {
        let mut out = String::new();
        self.write_placeholder(&mut out, position);
        out
    }

    /// Backend name used in logs and build errors
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sqlite => "SQLite",
            Self::Postgres => "PostgreSQL",
        }
    }
}

impl Display for Dialect {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_placeholders_ignore_position() {
        assert_eq!(Dialect::Sqlite.placeholder(1), "?");
        assert_eq!(Dialect::Sqlite.placeholder(7), "?");
    }

    #[test]
    fn test_postgres_placeholders_are_numbered() {
        assert_eq!(Dialect::Postgres.placeholder(1), "$1");
        assert_eq!(Dialect::Postgres.placeholder(12), "$12");
    }
}
