// ABOUTME: Execution capabilities over sqlx for SQLite and PostgreSQL
// ABOUTME: Backend detection and pool creation live in the factory module
//! Database plugins
//!
//! Each backend module provides a session type that wraps a connection or an
//! open transaction and implements both [`Querier`](crate::Querier) and
//! [`Executor`](crate::Executor), plus the same capabilities directly on the
//! backend's pool for calls outside a transaction.

/// Backend detection and pooled connections
pub mod factory;

/// `SQLite` capability
pub mod sqlite;

/// `PostgreSQL` capability
#[cfg(feature = "postgresql")]
pub mod postgres;

/// Whether `sql` writes new rows, so its generated key is worth reporting
///
/// Covers `insert`, `replace` and `insert or replace` at the start of the
/// statement, and an `insert` after a leading `with` clause. Leading comments
/// are not skipped.
pub(crate) fn is_insert(sql: &str) -> bool {
    let mut words = sql
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|word| !word.is_empty());
    match words.next() {
        Some(first)
            if first.eq_ignore_ascii_case("insert") || first.eq_ignore_ascii_case("replace") =>
        {
            true
        }
        Some(first) if first.eq_ignore_ascii_case("with") => {
            words.any(|word| word.eq_ignore_ascii_case("insert"))
        }
        _ => false,
    }
}
