//! Generic catalog service.

use crate::db::{CatalogRepository, Gateway};
use crate::models::{
    CatalogDescriptor, CatalogOption, CatalogRecord, CatalogRow, EntityState, HardDelete,
    RecordKey, TextCase,
};

use super::{normalize_optional, normalize_text, ServiceError, ServiceResult};

/// Result of a best-effort bulk import.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: usize,
    pub errors: Vec<RowError>,
}

/// A rejected import row. `row` counts from 1.
#[derive(Debug)]
pub struct RowError {
    pub row: usize,
    pub error: ServiceError,
}

/// Validation, normalization and soft-delete rules for one catalog domain.
pub struct CatalogService<'a, G: Gateway + ?Sized, T> {
    repo: CatalogRepository<'a, G, T>,
}

impl<'a, G: Gateway + ?Sized, T: CatalogRecord> CatalogService<'a, G, T> {
    pub fn new(db: &'a G) -> Self {
        Self {
            repo: CatalogRepository::new(db),
        }
    }

    fn descriptor(&self) -> &'static CatalogDescriptor {
        T::descriptor()
    }

    fn normalize_code(&self, code: &str) -> ServiceResult<String> {
        let code = normalize_text(code, self.descriptor().code_case);
        if code.is_empty() {
            return Err(ServiceError::RequiredFieldMissing { field: "codigo" });
        }
        Ok(code)
    }

    /// Normalize descriptive fields, apply defaults and check required and enumerated values.
    fn normalize_fields(&self, raw: &CatalogRow) -> ServiceResult<(Option<i64>, Vec<Option<String>>)> {
        let d = self.descriptor();
        let values: Vec<Option<String>> = d
            .fields
            .iter()
            .enumerate()
            .map(|(idx, rule)| {
                normalize_optional(raw.values.get(idx).and_then(|v| v.as_deref()), rule.case)
                    .or_else(|| rule.default.map(str::to_string))
            })
            .collect();

        for (rule, value) in d.fields.iter().zip(&values) {
            if rule.required && value.is_none() {
                return Err(ServiceError::RequiredFieldMissing { field: rule.column });
            }
        }
        if let Some(parent) = &d.parent {
            if parent.required && raw.parent_id.is_none() {
                return Err(ServiceError::RequiredFieldMissing {
                    field: parent.column,
                });
            }
        }

        for (rule, value) in d.fields.iter().zip(&values) {
            if let (Some(allowed), Some(value)) = (rule.allowed, value) {
                if !allowed.contains(&value.as_str()) {
                    return Err(ServiceError::InvalidEnumValue {
                        field: rule.column,
                        value: value.clone(),
                        allowed,
                    });
                }
            }
        }

        Ok((raw.parent_id, values))
    }

    fn normalize_key(&self, key: &RecordKey) -> ServiceResult<RecordKey> {
        let d = self.descriptor();
        match key {
            RecordKey::Id(id) => Ok(RecordKey::Id(*id)),
            RecordKey::Code(code) => match (&d.parent, d.is_per_parent()) {
                // A bare code is ambiguous across farms
                (Some(parent), true) => Err(ServiceError::RequiredFieldMissing {
                    field: parent.column,
                }),
                _ => Ok(RecordKey::Code(self.normalize_code(code)?)),
            },
            RecordKey::Scoped { parent_id, code } => Ok(RecordKey::Scoped {
                parent_id: *parent_id,
                code: self.normalize_code(code)?,
            }),
        }
    }

    fn check_parent(&self, parent_id: Option<i64>) -> ServiceResult<()> {
        if let (Some(parent), Some(id)) = (&self.descriptor().parent, parent_id) {
            if !self.repo.parent_is_active(id)? {
                return Err(ServiceError::ParentNotFoundOrInactive {
                    parent: parent.table,
                    id,
                });
            }
        }
        Ok(())
    }

    fn require_existing(&self, key: &RecordKey) -> ServiceResult<T> {
        self.repo.get(key)?.ok_or_else(|| ServiceError::NotFound {
            entity: self.descriptor().name,
            key: key.to_string(),
        })
    }

    fn column_value(&self, row: &CatalogRow, column: &str) -> Option<String> {
        if column == "codigo" {
            return Some(row.code.clone());
        }
        self.descriptor()
            .field_index(column)
            .and_then(|idx| row.optional(idx))
    }

    /// Normalized, validated row ready for insertion. Does not touch the store.
    fn prepare(&self, record: &T) -> ServiceResult<CatalogRow> {
        let raw = record.to_row();
        let code = self.normalize_code(&raw.code)?;
        let (parent_id, values) = self.normalize_fields(&raw)?;
        Ok(CatalogRow::new(code, parent_id, values))
    }

    /// Active entries.
    pub fn list(&self) -> ServiceResult<Vec<T>> {
        Ok(self.repo.list_active()?)
    }

    pub fn list_all(&self) -> ServiceResult<Vec<T>> {
        Ok(self.repo.list_all()?)
    }

    pub fn get(&self, key: &RecordKey) -> ServiceResult<Option<T>> {
        let key = self.normalize_key(key)?;
        Ok(self.repo.get(&key)?)
    }

    /// Whether the code is already taken in its scope.
    pub fn exists(&self, code: &str, parent_id: Option<i64>) -> ServiceResult<bool> {
        let code = self.normalize_code(code)?;
        Ok(self.repo.exists(&code, parent_id)?)
    }

    /// Whether a descriptive column already holds this value, after normalization.
    pub fn is_value_taken(&self, column: &str, value: &str) -> ServiceResult<bool> {
        let case = self
            .descriptor()
            .fields
            .iter()
            .find(|rule| rule.column == column)
            .map(|rule| rule.case)
            .unwrap_or(TextCase::Preserve);
        Ok(self.repo.value_taken(column, &normalize_text(value, case))?)
    }

    /// Active entries as `(id, code, label)` options.
    pub fn options(&self) -> ServiceResult<Vec<CatalogOption>> {
        Ok(self.repo.options()?)
    }

    pub fn find_active_by_label(&self, label: &str) -> ServiceResult<Option<T>> {
        Ok(self.repo.find_active_by_label(label.trim())?)
    }

    pub fn count_active(&self) -> ServiceResult<i64> {
        Ok(self.repo.count_active()?)
    }

    /// Validate and insert a new, active entry. Returns its id.
    pub fn create(&self, record: &T) -> ServiceResult<i64> {
        let d = self.descriptor();
        let row = self.prepare(record)?;
        self.check_parent(row.parent_id)?;

        if self.repo.exists(&row.code, row.parent_id)? {
            return Err(ServiceError::DuplicateCode {
                field: "codigo".to_string(),
                value: row.code,
            });
        }
        for (idx, rule) in d.fields.iter().enumerate().filter(|(_, rule)| rule.unique) {
            if let Some(value) = row.optional(idx) {
                if self.repo.value_taken(rule.column, &value)? {
                    return Err(ServiceError::DuplicateCode {
                        field: rule.column.to_string(),
                        value,
                    });
                }
            }
        }

        let id = self
            .repo
            .create(&row)
            .map_err(|err| ServiceError::from_write(err, d.name, |col| self.column_value(&row, col)))?;
        tracing::debug!(catalog = d.name, id, code = %row.code, "catalog entry created");
        Ok(id)
    }

    /// Replace the descriptive fields of an entry. The code is never changed.
    ///
    /// For farm-scoped catalogs the entry may move to another active farm. Code
    /// uniqueness under the new farm is left to the storage constraint.
    pub fn update(&self, key: &RecordKey, record: &T) -> ServiceResult<()> {
        let d = self.descriptor();
        let key = self.normalize_key(key)?;
        let (parent_id, values) = self.normalize_fields(&record.to_row())?;
        let existing = self.require_existing(&key)?;
        self.check_parent(parent_id)?;

        // Codes are immutable; keep the stored one whatever the key
        let row = CatalogRow::new(existing.to_row().code, parent_id, values);
        self.repo
            .update(&key, &row)
            .map_err(|err| ServiceError::from_write(err, d.name, |col| self.column_value(&row, col)))?;
        tracing::debug!(catalog = d.name, key = %key, "catalog entry updated");
        Ok(())
    }

    /// Activate or deactivate an entry. Setting the current state again is a no-op.
    pub fn set_state(&self, key: &RecordKey, new_state: &str) -> ServiceResult<()> {
        let d = self.descriptor();
        let state = EntityState::parse(new_state.trim()).ok_or_else(|| {
            ServiceError::InvalidEnumValue {
                field: "estado",
                value: new_state.to_string(),
                allowed: EntityState::ALLOWED,
            }
        })?;
        let key = self.normalize_key(key)?;
        self.require_existing(&key)?;
        self.repo.set_state(&key, state)?;
        tracing::debug!(catalog = d.name, key = %key, state = %state, "catalog entry state changed");
        Ok(())
    }

    /// Create each entry independently. Failures are reported per row and do not
    /// stop the remaining rows.
    pub fn import(&self, records: &[T]) -> ImportReport {
        let mut report = ImportReport::default();
        for (idx, record) in records.iter().enumerate() {
            match self.create(record) {
                Ok(_) => report.imported += 1,
                Err(error) => report.errors.push(RowError {
                    row: idx + 1,
                    error,
                }),
            }
        }
        tracing::debug!(
            catalog = self.descriptor().name,
            imported = report.imported,
            rejected = report.errors.len(),
            "catalog import finished"
        );
        report
    }

    /// Insert every entry in one transaction or none at all.
    ///
    /// Storage conflicts do not identify the offending row.
    pub fn import_atomic(&self, records: &[T]) -> ServiceResult<usize> {
        let d = self.descriptor();
        let rows = records
            .iter()
            .map(|record| self.prepare(record))
            .collect::<ServiceResult<Vec<_>>>()?;
        for row in &rows {
            self.check_parent(row.parent_id)?;
        }
        self.repo
            .insert_all(&rows)
            .map_err(|err| ServiceError::from_write(err, d.name, |_| None))
    }
}

impl<'a, G: Gateway + ?Sized, T: HardDelete> CatalogService<'a, G, T> {
    /// Physically remove an entry.
    pub fn delete(&self, key: &RecordKey) -> ServiceResult<()> {
        let key = self.normalize_key(key)?;
        if self.repo.delete(&key)? == 0 {
            return Err(ServiceError::NotFound {
                entity: self.descriptor().name,
                key: key.to_string(),
            });
        }
        tracing::debug!(catalog = self.descriptor().name, key = %key, "catalog entry deleted");
        Ok(())
    }
}
