//! Catalog repository.
//!
//! One repository type serves every catalog domain; the SQL is assembled from the
//! record's [`CatalogDescriptor`]. Column and table names only ever come from the
//! static descriptors, all values are bound as parameters.

use rusqlite::types::Value;
use std::marker::PhantomData;

use super::{text, DbError, DbResult, Gateway, Row, CODE_COLLATION};
use crate::models::{
    CatalogDescriptor, CatalogOption, CatalogRecord, CatalogRow, EntityState, RecordKey,
};

/// Catalog operations for one domain.
pub struct CatalogRepository<'a, G: Gateway + ?Sized, T> {
    db: &'a G,
    _record: PhantomData<fn() -> T>,
}

impl<'a, G: Gateway + ?Sized, T: CatalogRecord> CatalogRepository<'a, G, T> {
    pub fn new(db: &'a G) -> Self {
        Self {
            db,
            _record: PhantomData,
        }
    }

    fn descriptor(&self) -> &'static CatalogDescriptor {
        T::descriptor()
    }

    fn select_columns(&self) -> String {
        let d = self.descriptor();
        let mut columns = vec!["id", "codigo"];
        if let Some(parent) = &d.parent {
            columns.push(parent.column);
        }
        columns.extend(d.fields.iter().map(|rule| rule.column));
        columns.push("estado");
        columns.join(", ")
    }

    fn decode(&self, row: &Row) -> DbResult<T> {
        let d = self.descriptor();
        let parent_id = match &d.parent {
            Some(parent) => row.get::<Option<i64>>(parent.column)?,
            None => None,
        };
        let values = d
            .fields
            .iter()
            .map(|rule| row.get::<Option<String>>(rule.column))
            .collect::<DbResult<Vec<_>>>()?;

        let record = CatalogRow::new(row.get::<String>("codigo")?, parent_id, values)
            .with_identity(Some(row.get("id")?), row.get("estado")?);
        Ok(T::from_row(record))
    }

    /// WHERE clause and its parameters for a key.
    fn key_clause(&self, key: &RecordKey) -> (String, Vec<Value>) {
        match key {
            RecordKey::Id(id) => ("id = ?".to_string(), vec![Value::Integer(*id)]),
            RecordKey::Code(code) => ("codigo = ?".to_string(), vec![text(code)]),
            RecordKey::Scoped { parent_id, code } => match &self.descriptor().parent {
                Some(parent) => (
                    format!("{} = ? AND codigo = ?", parent.column),
                    vec![Value::Integer(*parent_id), text(code)],
                ),
                None => ("codigo = ?".to_string(), vec![text(code)]),
            },
        }
    }

    fn count(&self, sql: &str, params: &[Value]) -> DbResult<i64> {
        let rows = self.db.query(sql, params)?;
        match rows.first() {
            Some(row) => row.get("n"),
            None => Ok(0),
        }
    }

    fn list_where(&self, filter: &str, params: &[Value]) -> DbResult<Vec<T>> {
        let d = self.descriptor();
        let sql = format!(
            "SELECT {} FROM {} {} ORDER BY {}",
            self.select_columns(),
            d.table,
            filter,
            d.order_by
        );
        self.db
            .query(&sql, params)?
            .iter()
            .map(|row| self.decode(row))
            .collect()
    }

    /// Active entries in display order.
    pub fn list_active(&self) -> DbResult<Vec<T>> {
        self.list_where("WHERE estado = ?", &[EntityState::Active.into()])
    }

    /// Every entry, inactive ones included.
    pub fn list_all(&self) -> DbResult<Vec<T>> {
        self.list_where("", &[])
    }

    pub fn get(&self, key: &RecordKey) -> DbResult<Option<T>> {
        let (clause, params) = self.key_clause(key);
        let sql = format!(
            "SELECT {} FROM {} WHERE {} LIMIT 1",
            self.select_columns(),
            self.descriptor().table,
            clause
        );
        match self.db.query(&sql, &params)?.first() {
            Some(row) => Ok(Some(self.decode(row)?)),
            None => Ok(None),
        }
    }

    /// Whether a code is taken within its uniqueness scope.
    ///
    /// `parent_id` is only consulted for per-parent domains.
    pub fn exists(&self, code: &str, parent_id: Option<i64>) -> DbResult<bool> {
        let d = self.descriptor();
        let scoped_parent = d
            .parent
            .as_ref()
            .filter(|_| d.is_per_parent())
            .zip(parent_id);

        let n = match scoped_parent {
            Some((parent, parent_id)) => self.count(
                &format!(
                    "SELECT COUNT(*) AS n FROM {} WHERE codigo = ? AND {} = ?",
                    d.table, parent.column
                ),
                &[text(code), Value::Integer(parent_id)],
            )?,
            None => self.count(
                &format!("SELECT COUNT(*) AS n FROM {} WHERE codigo = ?", d.table),
                &[text(code)],
            )?,
        };
        Ok(n > 0)
    }

    /// Whether any row already holds `value` in a descriptive column.
    pub fn value_taken(&self, column: &str, value: &str) -> DbResult<bool> {
        let d = self.descriptor();
        let rule = d
            .fields
            .iter()
            .find(|rule| rule.column == column)
            .ok_or_else(|| DbError::MissingColumn(column.to_string()))?;
        let sql = format!(
            "SELECT COUNT(*) AS n FROM {} WHERE {} = ?",
            d.table, rule.column
        );
        Ok(self.count(&sql, &[text(value)])? > 0)
    }

    /// Whether the parent row exists and is active. Always false for parentless domains.
    pub fn parent_is_active(&self, parent_id: i64) -> DbResult<bool> {
        let Some(parent) = &self.descriptor().parent else {
            return Ok(false);
        };
        let sql = format!(
            "SELECT COUNT(*) AS n FROM {} WHERE id = ? AND estado = ?",
            parent.table
        );
        Ok(self.count(&sql, &[Value::Integer(parent_id), EntityState::Active.into()])? > 0)
    }

    fn insert_sql(&self) -> String {
        let d = self.descriptor();
        let mut columns = vec!["codigo"];
        if let Some(parent) = &d.parent {
            columns.push(parent.column);
        }
        columns.extend(d.fields.iter().map(|rule| rule.column));
        columns.push("estado");
        let placeholders = vec!["?"; columns.len()].join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            d.table,
            columns.join(", "),
            placeholders
        )
    }

    fn insert_params(&self, row: &CatalogRow) -> Vec<Value> {
        let d = self.descriptor();
        let mut params = vec![text(&row.code)];
        if d.parent.is_some() {
            params.push(row.parent_id.map_or(Value::Null, Value::Integer));
        }
        params.extend(
            (0..d.fields.len()).map(|idx| row.optional(idx).map_or(Value::Null, Value::Text)),
        );
        params.push(row.state.into());
        params
    }

    /// Insert a row and return its id.
    pub fn create(&self, row: &CatalogRow) -> DbResult<i64> {
        let sql = format!("{} RETURNING id", self.insert_sql());
        let rows = self.db.query(&sql, &self.insert_params(row))?;
        match rows.first() {
            Some(inserted) => inserted.get("id"),
            None => Err(DbError::MissingColumn("id".to_string())),
        }
    }

    /// Overwrite descriptive fields and the parent reference. The code never changes.
    pub fn update(&self, key: &RecordKey, row: &CatalogRow) -> DbResult<usize> {
        let d = self.descriptor();
        let mut assignments = Vec::new();
        let mut params = Vec::new();
        if let Some(parent) = &d.parent {
            assignments.push(format!("{} = ?", parent.column));
            params.push(row.parent_id.map_or(Value::Null, Value::Integer));
        }
        for (idx, rule) in d.fields.iter().enumerate() {
            assignments.push(format!("{} = ?", rule.column));
            params.push(row.optional(idx).map_or(Value::Null, Value::Text));
        }

        let (clause, key_params) = self.key_clause(key);
        params.extend(key_params);
        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            d.table,
            assignments.join(", "),
            clause
        );
        self.db.execute(&sql, &params)
    }

    pub fn set_state(&self, key: &RecordKey, state: EntityState) -> DbResult<usize> {
        let (clause, key_params) = self.key_clause(key);
        let mut params = vec![state.into()];
        params.extend(key_params);
        let sql = format!(
            "UPDATE {} SET estado = ? WHERE {}",
            self.descriptor().table,
            clause
        );
        self.db.execute(&sql, &params)
    }

    /// Physically remove a row.
    pub fn delete(&self, key: &RecordKey) -> DbResult<usize> {
        let (clause, params) = self.key_clause(key);
        let sql = format!("DELETE FROM {} WHERE {}", self.descriptor().table, clause);
        self.db.execute(&sql, &params)
    }

    /// Insert every row in one transaction; the first failure rolls all of them back.
    ///
    /// The error does not say which row failed.
    pub fn insert_all(&self, rows: &[CatalogRow]) -> DbResult<usize> {
        let batches: Vec<Vec<Value>> = rows.iter().map(|row| self.insert_params(row)).collect();
        self.db.execute_all(&self.insert_sql(), &batches)
    }

    /// Active entry whose label matches, ignoring case.
    pub fn find_active_by_label(&self, label: &str) -> DbResult<Option<T>> {
        let d = self.descriptor();
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ? COLLATE {CODE_COLLATION} AND estado = ? LIMIT 1",
            self.select_columns(),
            d.table,
            d.label
        );
        match self
            .db
            .query(&sql, &[text(label), EntityState::Active.into()])?
            .first()
        {
            Some(row) => Ok(Some(self.decode(row)?)),
            None => Ok(None),
        }
    }

    /// Active entries as selection options.
    pub fn options(&self) -> DbResult<Vec<CatalogOption>> {
        let d = self.descriptor();
        let sql = format!(
            "SELECT id, codigo, {} AS etiqueta FROM {} WHERE estado = ? ORDER BY {}",
            d.label, d.table, d.order_by
        );
        self.db
            .query(&sql, &[EntityState::Active.into()])?
            .iter()
            .map(|row| {
                Ok(CatalogOption {
                    id: row.get("id")?,
                    code: row.get("codigo")?,
                    label: row.get::<Option<String>>("etiqueta")?.unwrap_or_default(),
                })
            })
            .collect()
    }

    pub fn count_active(&self) -> DbResult<i64> {
        let sql = format!(
            "SELECT COUNT(*) AS n FROM {} WHERE estado = ?",
            self.descriptor().table
        );
        self.count(&sql, &[EntityState::Active.into()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::{Farm, Lot, SaleReason};

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn add_farm(db: &Database, code: &str) -> i64 {
        let farm = Farm::new(code, format!("Finca {code}"), "Llano");
        CatalogRepository::<_, Farm>::new(db)
            .create(&farm.to_row())
            .unwrap()
    }

    #[test]
    fn test_create_and_get() {
        let db = setup_db();
        let repo = CatalogRepository::<_, SaleReason>::new(&db);

        let id = repo
            .create(&SaleReason::new("MV1", "Descarte").to_row())
            .unwrap();

        let by_id = repo.get(&RecordKey::Id(id)).unwrap().unwrap();
        assert_eq!(by_id.code, "MV1");
        assert_eq!(by_id.description, "Descarte");
        assert_eq!(by_id.state, EntityState::Active);

        // Code lookup ignores case through the column collation
        let by_code = repo.get(&RecordKey::from("mv1")).unwrap().unwrap();
        assert_eq!(by_code.id, Some(id));
    }

    #[test]
    fn test_get_missing() {
        let db = setup_db();
        let repo = CatalogRepository::<_, SaleReason>::new(&db);
        assert!(repo.get(&RecordKey::Id(42)).unwrap().is_none());
    }

    #[test]
    fn test_scoped_exists() {
        let db = setup_db();
        let farm_a = add_farm(&db, "A");
        let farm_b = add_farm(&db, "B");
        let repo = CatalogRepository::<_, Lot>::new(&db);

        repo.create(&Lot::new(farm_a, "L1", "Lote Uno").to_row())
            .unwrap();

        assert!(repo.exists("L1", Some(farm_a)).unwrap());
        assert!(!repo.exists("L1", Some(farm_b)).unwrap());
        assert!(repo
            .get(&RecordKey::Scoped {
                parent_id: farm_a,
                code: "l1".into()
            })
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_set_state_filters_active_lists() {
        let db = setup_db();
        let repo = CatalogRepository::<_, SaleReason>::new(&db);
        repo.create(&SaleReason::new("A", "Uno").to_row()).unwrap();
        repo.create(&SaleReason::new("B", "Dos").to_row()).unwrap();

        let changed = repo
            .set_state(&RecordKey::from("A"), EntityState::Inactive)
            .unwrap();
        assert_eq!(changed, 1);

        assert_eq!(repo.list_active().unwrap().len(), 1);
        assert_eq!(repo.list_all().unwrap().len(), 2);
        assert_eq!(repo.count_active().unwrap(), 1);
        assert_eq!(repo.options().unwrap()[0].label, "Dos");
    }

    #[test]
    fn test_update_keeps_code() {
        let db = setup_db();
        let repo = CatalogRepository::<_, SaleReason>::new(&db);
        let id = repo.create(&SaleReason::new("A", "Uno").to_row()).unwrap();

        let mut changed = SaleReason::new("IGNORED", "Otro");
        changed.comment = Some("nota".into());
        assert_eq!(repo.update(&RecordKey::Id(id), &changed.to_row()).unwrap(), 1);

        let stored = repo.get(&RecordKey::Id(id)).unwrap().unwrap();
        assert_eq!(stored.code, "A");
        assert_eq!(stored.description, "Otro");
        assert_eq!(stored.comment.as_deref(), Some("nota"));
    }

    #[test]
    fn test_parent_is_active() {
        let db = setup_db();
        let farm = add_farm(&db, "A");
        let lots = CatalogRepository::<_, Lot>::new(&db);

        assert!(lots.parent_is_active(farm).unwrap());
        assert!(!lots.parent_is_active(999).unwrap());

        CatalogRepository::<_, Farm>::new(&db)
            .set_state(&RecordKey::Id(farm), EntityState::Inactive)
            .unwrap();
        assert!(!lots.parent_is_active(farm).unwrap());
    }

    #[test]
    fn test_value_taken_rejects_unknown_column() {
        let db = setup_db();
        let repo = CatalogRepository::<_, SaleReason>::new(&db);
        repo.create(&SaleReason::new("A", "Uno").to_row()).unwrap();

        assert!(repo.value_taken("descripcion", "Uno").unwrap());
        assert!(!repo.value_taken("descripcion", "Dos").unwrap());
        assert!(matches!(
            repo.value_taken("estado; DROP TABLE x", "Uno"),
            Err(DbError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_insert_all_is_all_or_nothing() {
        let db = setup_db();
        let repo = CatalogRepository::<_, SaleReason>::new(&db);
        let rows = vec![
            SaleReason::new("A", "Uno").to_row(),
            SaleReason::new("B", "Dos").to_row(),
            SaleReason::new("a", "Repetido").to_row(),
        ];

        let err = repo.insert_all(&rows).unwrap_err();
        assert!(err.is_unique_violation());
        assert!(repo.list_all().unwrap().is_empty());

        assert_eq!(repo.insert_all(&rows[..2]).unwrap(), 2);
    }

    #[test]
    fn test_find_active_by_label() {
        let db = setup_db();
        add_farm(&db, "A");
        let farms = CatalogRepository::<_, Farm>::new(&db);

        let found = farms.find_active_by_label("finca a").unwrap().unwrap();
        assert_eq!(found.code, "A");
        assert!(farms.find_active_by_label("Finca Z").unwrap().is_none());
    }

    #[test]
    fn test_delete() {
        let db = setup_db();
        let repo = CatalogRepository::<_, SaleReason>::new(&db);
        let id = repo.create(&SaleReason::new("A", "Uno").to_row()).unwrap();
        assert_eq!(repo.delete(&RecordKey::Id(id)).unwrap(), 1);
        assert!(repo.get(&RecordKey::Id(id)).unwrap().is_none());
    }
}
