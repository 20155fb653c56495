// ABOUTME: Dynamically typed SQL values and ordered column-name keyed field maps
// ABOUTME: Shared row and parameter model used by every backend and by the decoder
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Dynamic value model
//!
//! `SqlValue` is the single currency exchanged between the engine and an
//! execution capability: bound parameters go out as `SqlValue`s and rows come
//! back as `FieldMap`s of `SqlValue`s. Column order is preserved exactly as the
//! backend reported it.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// A single dynamically typed SQL value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL `NULL`
    Null,
    /// Boolean
    Bool(bool),
    /// Any integer column, widened to 64 bits
    Int(i64),
    /// Any floating point column, widened to 64 bits
    Float(f64),
    /// Text
    Text(String),
    /// Binary data
    Bytes(Vec<u8>),
}

impl SqlValue {
    /// Whether this value is SQL `NULL`
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the variant, used in type mismatch messages
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Bool(_) => "BOOL",
            Self::Int(_) => "INTEGER",
            Self::Float(_) => "FLOAT",
            Self::Text(_) => "TEXT",
            Self::Bytes(_) => "BYTES",
        }
    }
}

impl Display for SqlValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl Serialize for SqlValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Bytes(b) => serializer.serialize_bytes(b),
        }
    }
}

macro_rules! sql_value_from {
    ($variant:ident: $($ty:ty),+) => {
        $(
            impl From<$ty> for SqlValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )+
    };
}

sql_value_from!(Int: i64, i32, i16, i8, u32, u16, u8);
sql_value_from!(Float: f64, f32);
sql_value_from!(Bool: bool);
sql_value_from!(Text: String, &str);
sql_value_from!(Bytes: Vec<u8>);

impl<T: Into<Self>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Ordered map from column (or key) name to value
///
/// Used both as the generic row representation returned by capabilities and
/// as a generic argument whose keys are addressed with dotted marker paths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    entries: Vec<(String, SqlValue)>,
}

impl FieldMap {
    /// Create an empty map
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Create an empty map with room for `capacity` columns
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert a value, replacing (in place) any existing entry with the same name
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<SqlValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Exact-name lookup
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Column lookup: exact match first, then ASCII case-insensitive
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&SqlValue> {
        self.get(name).or_else(|| {
            self.entries
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        })
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry names in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Entries in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl<K: Into<String>, V: Into<SqlValue>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl IntoIterator for FieldMap {
    type Item = (String, SqlValue);
    type IntoIter = std::vec::IntoIter<(String, SqlValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Display for FieldMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}: {value}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut map = FieldMap::new();
        map.insert("id", 1);
        map.insert("name", "a");
        map.insert("id", 2);

        assert_eq!(map.len(), 2);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["id", "name"]);
        assert_eq!(map.get("id"), Some(&SqlValue::Int(2)));
    }

    #[test]
    fn test_column_lookup_prefers_exact_match() {
        let map: FieldMap = [("Name", "upper"), ("name", "lower")].into_iter().collect();

        assert_eq!(map.column("name"), Some(&SqlValue::Text("lower".into())));
        assert_eq!(map.column("NAME"), Some(&SqlValue::Text("upper".into())));
        assert_eq!(map.get("NAME"), None);
    }

    #[test]
    fn test_option_converts_to_null() {
        let absent: Option<f64> = None;
        assert!(SqlValue::from(absent).is_null());
        assert_eq!(SqlValue::from(Some(1.5_f64)), SqlValue::Float(1.5));
    }

    #[test]
    fn test_field_map_serializes_in_column_order() {
        let map: FieldMap = [
            ("id", SqlValue::Int(10)),
            ("name", SqlValue::Text("Thingie".into())),
            ("cost", SqlValue::Null),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"id":10,"name":"Thingie","cost":null}"#);
    }
}
