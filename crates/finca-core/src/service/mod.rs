//! Validation services and lifecycle state machines.
//!
//! Services are the only layer that classifies errors: every storage failure that
//! leaves this module is a [`ServiceError`].

mod catalog;
mod contracts;
mod health;
mod normalize;
mod reproduction;

pub use catalog::*;
pub use contracts::*;
pub use health::*;
pub use normalize::*;
pub use reproduction::*;

use chrono::{Local, NaiveDate};
use thiserror::Error;

use crate::db::DbError;

/// Domain error taxonomy.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{field} is required")]
    RequiredFieldMissing { field: &'static str },

    #[error("invalid {field} '{value}'; expected one of: {}", .allowed.join(", "))]
    InvalidEnumValue {
        field: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("{field} '{value}' already exists")]
    DuplicateCode { field: String, value: String },

    #[error("{parent} {id} does not exist or is inactive")]
    ParentNotFoundOrInactive { parent: &'static str, id: i64 },

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("{date} shifted by {days} days is outside the supported calendar")]
    DateOutOfRange { date: NaiveDate, days: i64 },

    #[error("storage failure: {0}")]
    StorageFailure(#[source] DbError),
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        ServiceError::StorageFailure(err)
    }
}

impl ServiceError {
    /// Classify a failed write, turning uniqueness violations into `DuplicateCode`.
    ///
    /// `value_for` maps a violated column to the value that was being written.
    pub(crate) fn from_write(
        err: DbError,
        entity: &str,
        value_for: impl Fn(&str) -> Option<String>,
    ) -> Self {
        if !err.is_unique_violation() {
            return ServiceError::StorageFailure(err);
        }
        let columns = err.violated_columns();
        // Composite keys list the parent first; report the last column, the one the caller chose
        let field = columns
            .last()
            .cloned()
            .unwrap_or_else(|| "codigo".to_string());
        let value = value_for(&field).unwrap_or_default();
        tracing::warn!(
            entity,
            field = %field,
            value = %value,
            "uniqueness violation caught by storage constraint"
        );
        ServiceError::DuplicateCode { field, value }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Source of "today" for date-driven rules.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock stuck on one day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, Gateway};
    use rusqlite::types::Value;

    #[test]
    fn test_error_messages() {
        let err = ServiceError::InvalidEnumValue {
            field: "estado",
            value: "Borrado".into(),
            allowed: &["Activo", "Inactivo"],
        };
        assert_eq!(
            err.to_string(),
            "invalid estado 'Borrado'; expected one of: Activo, Inactivo"
        );

        let err = ServiceError::RequiredFieldMissing { field: "codigo" };
        assert_eq!(err.to_string(), "codigo is required");
    }

    #[test]
    fn test_write_classification() {
        let db = Database::open_in_memory().unwrap();
        db.execute("INSERT INTO finca (codigo, nombre) VALUES ('F1', 'Uno')", &[])
            .unwrap();
        let sql = "INSERT INTO sector (codigo, nombre, finca_id) VALUES (?, 'S', 1)";
        db.execute(sql, &[Value::Text("S1".into())]).unwrap();
        let err = db.execute(sql, &[Value::Text("s1".into())]).unwrap_err();

        let classified = ServiceError::from_write(err, "sector", |column| {
            (column == "codigo").then(|| "s1".to_string())
        });
        assert!(matches!(
            classified,
            ServiceError::DuplicateCode { ref field, ref value } if field == "codigo" && value == "s1"
        ));

        let err = db.query("SELECT nope FROM finca", &[]).unwrap_err();
        assert!(matches!(
            ServiceError::from_write(err, "farm", |_| None),
            ServiceError::StorageFailure(_)
        ));
    }

    #[test]
    fn test_fixed_clock() {
        let day = NaiveDate::from_ymd_opt(2025, 9, 8).unwrap();
        assert_eq!(FixedClock(day).today(), day);
    }
}
