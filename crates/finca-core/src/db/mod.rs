//! Database layer for finca-core.
//!
//! Repositories translate domain operations into SQL and run them through a
//! [`Gateway`]. They never validate and never classify errors; whatever the
//! gateway reports is handed back to the service layer untouched.

mod schema;
mod gateway;
mod animals;
mod catalog;
mod health;
mod reproduction;

pub use schema::*;
pub use gateway::*;
pub use animals::*;
pub use catalog::*;
pub use health::*;
pub use reproduction::*;

use rusqlite::types::{FromSqlError, Value};
use rusqlite::{params_from_iter, Connection, ErrorCode};
use std::path::Path;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Column not found in row: {0}")]
    MissingColumn(String),

    #[error("Column {column} has an unexpected value: {source}")]
    ColumnType {
        column: String,
        #[source]
        source: FromSqlError,
    },
}

impl DbError {
    /// Whether the store rejected a write because of a UNIQUE or PRIMARY KEY constraint.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DbError::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => {
                err.code == ErrorCode::ConstraintViolation
                    && (err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                        || err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY)
            }
            _ => false,
        }
    }

    /// Columns named by a uniqueness violation message.
    ///
    /// SQLite reports `UNIQUE constraint failed: table.a, table.b`; this returns
    /// `["a", "b"]`. Empty for any other error.
    pub fn violated_columns(&self) -> Vec<String> {
        if !self.is_unique_violation() {
            return Vec::new();
        }
        let message = match self {
            DbError::Sqlite(rusqlite::Error::SqliteFailure(_, Some(message))) => message,
            _ => return Vec::new(),
        };
        message
            .split_once(':')
            .map(|(_, columns)| {
                columns
                    .split(',')
                    .filter_map(|qualified| qualified.trim().rsplit('.').next())
                    .filter(|column| !column.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Register collations, then initialize schema.
    fn initialize(&self) -> DbResult<()> {
        register_collations(&self.conn)?;
        self.conn.execute_batch(SCHEMA)?;
        tracing::debug!("database schema initialized");
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

impl Gateway for Database {
    fn query(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Row>> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let mut out = Row::with_capacity(columns.len());
            for (idx, column) in columns.iter().enumerate() {
                out.push(column.clone(), row.get::<_, Value>(idx)?);
            }
            result.push(out);
        }
        Ok(result)
    }

    fn execute(&self, sql: &str, params: &[Value]) -> DbResult<usize> {
        Ok(self.conn.execute(sql, params_from_iter(params.iter()))?)
    }

    fn execute_all(&self, sql: &str, batches: &[Vec<Value>]) -> DbResult<usize> {
        // Dropping the transaction on an early return rolls everything back.
        let tx = self.conn.unchecked_transaction()?;
        let mut affected = 0;
        {
            let mut stmt = tx.prepare(sql)?;
            for params in batches {
                affected += stmt.execute(params_from_iter(params.iter()))?;
            }
        }
        tx.commit()?;
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        for table in [
            "finca",
            "sector",
            "lote",
            "raza",
            "causa_muerte",
            "diagnostico_veterinario",
            "motivo_venta",
            "procedencia",
            "empleado",
            "condicion_corporal",
            "tipo_explotacion",
            "calidad_animal",
            "animal",
            "reproduccion",
            "diagnostico_evento",
            "tratamiento",
        ] {
            assert!(tables.contains(&table.to_string()), "missing table {table}");
        }
    }

    #[test]
    fn test_query_returns_ordered_columns() {
        let db = Database::open_in_memory().unwrap();
        db.execute(
            "INSERT INTO motivo_venta (codigo, descripcion) VALUES (?1, ?2)",
            &[Value::Text("MV1".into()), Value::Text("Descarte".into())],
        )
        .unwrap();

        let rows = db
            .query(
                "SELECT codigo, descripcion, comentario FROM motivo_venta",
                &[],
            )
            .unwrap();
        assert_eq!(rows.len(), 1);

        let columns: Vec<&str> = rows[0].columns().collect();
        assert_eq!(columns, vec!["codigo", "descripcion", "comentario"]);
        assert_eq!(rows[0].get::<String>("codigo").unwrap(), "MV1");
        assert_eq!(rows[0].get::<Option<String>>("comentario").unwrap(), None);
    }

    #[test]
    fn test_unique_violation_detected() {
        let db = Database::open_in_memory().unwrap();
        let params = [Value::Text("MV1".into()), Value::Text("Descarte".into())];
        let sql = "INSERT INTO motivo_venta (codigo, descripcion) VALUES (?1, ?2)";

        db.execute(sql, &params).unwrap();
        let err = db.execute(sql, &params).unwrap_err();

        assert!(err.is_unique_violation());
        assert_eq!(err.violated_columns(), vec!["codigo".to_string()]);
    }

    #[test]
    fn test_other_errors_are_not_unique_violations() {
        let db = Database::open_in_memory().unwrap();
        let err = db.query("SELECT * FROM no_such_table", &[]).unwrap_err();
        assert!(!err.is_unique_violation());
        assert!(err.violated_columns().is_empty());
    }

    #[test]
    fn test_execute_all_rolls_back_on_failure() {
        let db = Database::open_in_memory().unwrap();
        let sql = "INSERT INTO motivo_venta (codigo, descripcion) VALUES (?1, ?2)";
        let batches = vec![
            vec![Value::Text("A".into()), Value::Text("Uno".into())],
            vec![Value::Text("B".into()), Value::Text("Dos".into())],
            vec![Value::Text("A".into()), Value::Text("Repetido".into())],
        ];

        let result = db.execute_all(sql, &batches);
        assert!(result.unwrap_err().is_unique_violation());

        let rows = db.query("SELECT COUNT(*) AS n FROM motivo_venta", &[]).unwrap();
        assert_eq!(rows[0].get::<i64>("n").unwrap(), 0);
    }

    #[test]
    fn test_execute_all_commits() {
        let db = Database::open_in_memory().unwrap();
        let sql = "INSERT INTO motivo_venta (codigo, descripcion) VALUES (?1, ?2)";
        let batches = vec![
            vec![Value::Text("A".into()), Value::Text("Uno".into())],
            vec![Value::Text("B".into()), Value::Text("Dos".into())],
        ];

        assert_eq!(db.execute_all(sql, &batches).unwrap(), 2);
    }
}
