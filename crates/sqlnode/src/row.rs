//! Row mapping traits and utilities

use crate::error::{OrmError, OrmResult};
use crate::value::Value;
use serde::de::DeserializeOwned;
use tokio_postgres::Row;

/// Trait for converting a database row into a Rust struct.
///
/// # Example
///
/// ```ignore
/// use sqlnode::{FromRow, OrmResult, RowExt};
///
/// struct User {
///     id: i64,
///     name: String,
/// }
///
/// impl FromRow for User {
///     fn from_row(row: &tokio_postgres::Row) -> OrmResult<Self> {
///         Ok(Self {
///             id: row.try_get_column("id")?,
///             name: row.try_get_column("name")?,
///         })
///     }
/// }
/// ```
pub trait FromRow: Sized + Send {
    /// Convert a database row into Self
    fn from_row(row: &Row) -> OrmResult<Self>;
}

/// Extension trait for Row to provide typed access
pub trait RowExt {
    /// Try to get a column value, returning OrmError::Decode on failure
    fn try_get_column<T>(&self, column: &str) -> OrmResult<T>
    where
        T: for<'a> tokio_postgres::types::FromSql<'a>;
}

impl RowExt for Row {
    fn try_get_column<T>(&self, column: &str) -> OrmResult<T>
    where
        T: for<'a> tokio_postgres::types::FromSql<'a>,
    {
        self.try_get(column)
            .map_err(|e| OrmError::decode(column, e.to_string()))
    }
}

/// A row as an ordered column-name to [`Value`] map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a column value, keeping first-insertion order.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Decode one column into `T` through its JSON view.
    pub fn get_as<T: DeserializeOwned>(&self, column: &str) -> OrmResult<T> {
        let value = self
            .get(column)
            .ok_or_else(|| OrmError::decode(column, "no such column"))?;
        serde_json::from_value(value.clone().into())
            .map_err(|e| OrmError::decode(column, e.to_string()))
    }

    /// Decode the whole record into `T`, columns as fields.
    pub fn deserialize<T: DeserializeOwned>(&self) -> OrmResult<T> {
        let object: serde_json::Map<String, serde_json::Value> = self
            .entries
            .iter()
            .map(|(name, value)| (name.clone(), value.clone().into()))
            .collect();
        serde_json::from_value(serde_json::Value::Object(object))
            .map_err(|e| OrmError::decode("*", e.to_string()))
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromRow for Record {
    fn from_row(row: &Row) -> OrmResult<Self> {
        let mut record = Record::new();
        for (i, column) in row.columns().iter().enumerate() {
            let value: Value = row
                .try_get(i)
                .map_err(|e| OrmError::decode(column.name(), e.to_string()))?;
            record.insert(column.name(), value);
        }
        Ok(record)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (column, value) in iter {
            record.insert(column, value);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Outcome of a write statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// Rows affected.
    pub affected: u64,
    /// Generated key from a `RETURNING` row, when the statement has one.
    pub last_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::Record;
    use crate::value::Value;
    use serde::Deserialize;

    #[test]
    fn record_keeps_order_and_replaces() {
        let mut record: Record = [("b", Value::Int(1)), ("a", Value::Int(2))].into_iter().collect();
        record.insert("b", 3);
        assert_eq!(record.columns().collect::<Vec<_>>(), ["b", "a"]);
        assert_eq!(record.get("b"), Some(&Value::Int(3)));
        assert!(record.get("c").is_none());
    }

    #[test]
    fn record_decodes_through_serde() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct User {
            id: i64,
            name: String,
            email: Option<String>,
        }

        let record: Record = [
            ("id", Value::Int(7)),
            ("name", Value::from("alice")),
            ("email", Value::Null),
        ]
        .into_iter()
        .collect();

        assert_eq!(record.get_as::<i64>("id").unwrap(), 7);
        assert!(record.get_as::<i64>("name").is_err());
        assert!(record.get_as::<i64>("missing").is_err());
        assert_eq!(
            record.deserialize::<User>().unwrap(),
            User {
                id: 7,
                name: "alice".into(),
                email: None,
            }
        );
    }
}
