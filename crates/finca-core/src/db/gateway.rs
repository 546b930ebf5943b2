//! Persistence gateway contract.

use chrono::NaiveDate;
use rusqlite::types::{FromSql, Value, ValueRef};

use super::{DbError, DbResult};

/// Executes parameterized SQL against the store.
///
/// [`Database`](super::Database) is the production implementation. Tests swap in
/// wrappers that fail or lie about existence to reach paths SQLite alone can't.
pub trait Gateway {
    /// Run a statement and return every row it produces.
    fn query(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Row>>;

    /// Run a statement and return the number of affected rows.
    fn execute(&self, sql: &str, params: &[Value]) -> DbResult<usize>;

    /// Run one statement per parameter set inside a single transaction.
    ///
    /// Either every statement commits or none does.
    fn execute_all(&self, sql: &str, batches: &[Vec<Value>]) -> DbResult<usize>;
}

/// A result row: column names paired with values, in select order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, Value)>,
}

impl Row {
    /// Create an empty row with room for `capacity` columns.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Append a column.
    pub fn push(&mut self, column: impl Into<String>, value: Value) {
        self.fields.push((column.into(), value));
    }

    /// Raw value of a column.
    pub fn value(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Column names in select order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Typed value of a column.
    pub fn get<T: FromSql>(&self, column: &str) -> DbResult<T> {
        let value = self
            .value(column)
            .ok_or_else(|| DbError::MissingColumn(column.to_string()))?;
        T::column_result(ValueRef::from(value)).map_err(|source| DbError::ColumnType {
            column: column.to_string(),
            source,
        })
    }
}

/// Bind helper for text parameters.
pub fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

/// Bind helper for optional text parameters.
pub fn opt_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, text)
}

/// Bind helper for ISO dates.
pub fn date(value: NaiveDate) -> Value {
    Value::Text(value.format("%Y-%m-%d").to_string())
}

/// Bind helper for optional ISO dates.
pub fn opt_date(value: Option<NaiveDate>) -> Value {
    value.map_or(Value::Null, date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_typed_access() {
        let mut row = Row::default();
        row.push("id", Value::Integer(7));
        row.push("codigo", text("AB12"));
        row.push("comentario", Value::Null);
        row.push("fecha", date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));

        assert_eq!(row.get::<i64>("id").unwrap(), 7);
        assert_eq!(row.get::<String>("codigo").unwrap(), "AB12");
        assert_eq!(row.get::<Option<String>>("comentario").unwrap(), None);
        assert_eq!(
            row.get::<NaiveDate>("fecha").unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_row_missing_column() {
        let row = Row::default();
        assert!(matches!(
            row.get::<i64>("id"),
            Err(DbError::MissingColumn(column)) if column == "id"
        ));
    }

    #[test]
    fn test_row_wrong_type() {
        let mut row = Row::default();
        row.push("id", text("not a number"));
        assert!(matches!(row.get::<i64>("id"), Err(DbError::ColumnType { .. })));
    }

    #[test]
    fn test_bind_helpers() {
        assert_eq!(opt_text(None), Value::Null);
        assert_eq!(opt_text(Some("x")), Value::Text("x".into()));
        assert_eq!(
            opt_date(NaiveDate::from_ymd_opt(2025, 10, 8)),
            Value::Text("2025-10-08".into())
        );
    }
}
