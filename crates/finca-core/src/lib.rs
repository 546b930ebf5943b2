//! Finca Core Library
//!
//! Domain core of a farm-management application: validated reference catalogs
//! plus the reproductive and health lifecycles of the herd.
//!
//! # Architecture
//!
//! ```text
//!              Presentation shell (forms, tables, dialogs)
//!                               │
//!                        FincaCore (FFI)
//!                               │
//!         ┌─────────────────────┼─────────────────────┐
//!         ▼                     ▼                     ▼
//!   CatalogService<T>   ReproductionService     HealthService
//!   normalize, scope,   Gestante → Parida       diagnosis states,
//!   soft delete         Gestante → Vacía        treatment schedule
//!         │                     │                     │
//!         └──────────── Repositories (SQL) ───────────┘
//!                               │
//!                        Gateway (SQLite)
//! ```
//!
//! # Core Principle
//!
//! **Services are the only place where rules live and errors are classified.**
//! Repositories run one statement and hand storage errors back untouched.
//!
//! # Modules
//!
//! - [`db`]: SQLite schema, gateway and repositories
//! - [`models`]: Domain types and catalog descriptors
//! - [`service`]: Catalog engine, lifecycle state machines, contracts
//! - [`config`]: Runtime configuration

pub mod config;
pub mod db;
pub mod models;
pub mod service;

// Re-export commonly used types
pub use config::{ConfigError, CoreConfig};
pub use db::{Database, DbError, Gateway};
pub use models::{CatalogRecord, EntityState, RecordKey};
pub use service::{
    CatalogService, Clock, FixedClock, HealthService, ImportReport, ReproductionService,
    ServiceError, SystemClock,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use chrono::NaiveDate;
use std::sync::{Arc, Mutex};

use models::{
    Animal, AnimalQuality, CalvingOutcome, CatalogOption, CatalogRow, FieldRule, HealthDiagnosis,
    HealthTreatment, LogEntry, NewCalving, NewDiagnosis, NewTreatment, PregnancyView, Sex,
    UpcomingTreatment,
};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum FincaError {
    #[error("Required field missing: {0}")]
    RequiredFieldMissing(String),

    #[error("Invalid value: {0}")]
    InvalidEnumValue(String),

    #[error("Duplicate: {0}")]
    DuplicateCode(String),

    #[error("Parent unavailable: {0}")]
    ParentNotFoundOrInactive(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    StorageFailure(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<ServiceError> for FincaError {
    fn from(e: ServiceError) -> Self {
        let message = e.to_string();
        match e {
            ServiceError::RequiredFieldMissing { .. } => FincaError::RequiredFieldMissing(message),
            ServiceError::InvalidEnumValue { .. } => FincaError::InvalidEnumValue(message),
            ServiceError::DuplicateCode { .. } => FincaError::DuplicateCode(message),
            ServiceError::ParentNotFoundOrInactive { .. } => {
                FincaError::ParentNotFoundOrInactive(message)
            }
            ServiceError::NotFound { .. } => FincaError::NotFound(message),
            ServiceError::DateOutOfRange { .. } => FincaError::InvalidInput(message),
            ServiceError::StorageFailure(_) => FincaError::StorageFailure(message),
        }
    }
}

impl From<DbError> for FincaError {
    fn from(e: DbError) -> Self {
        FincaError::StorageFailure(e.to_string())
    }
}

impl From<ConfigError> for FincaError {
    fn from(e: ConfigError) -> Self {
        FincaError::InvalidInput(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for FincaError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        FincaError::StorageFailure(format!("Lock poisoned: {}", e))
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, FincaError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        FincaError::InvalidInput(format!("{field}: expected YYYY-MM-DD, got '{value}'"))
    })
}

fn parse_optional_date(field: &str, value: Option<String>) -> Result<Option<NaiveDate>, FincaError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date(field, value).map(Some),
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

fn core(db: Database, config: CoreConfig) -> Arc<FincaCore> {
    Arc::new(FincaCore {
        db: Arc::new(Mutex::new(db)),
        config,
    })
}

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<FincaCore>, FincaError> {
    let db = Database::open(&path)?;
    Ok(core(db, CoreConfig::default()))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<FincaCore>, FincaError> {
    let db = Database::open_in_memory()?;
    Ok(core(db, CoreConfig::default()))
}

/// Open the database described by a JSON configuration document.
#[uniffi::export]
pub fn open_database_with_config(config_json: String) -> Result<Arc<FincaCore>, FincaError> {
    let config = CoreConfig::from_json_str(&config_json)?;
    let db = match &config.database_path {
        Some(path) => Database::open(path)?,
        None => Database::open_in_memory()?,
    };
    Ok(core(db, config))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Catalog domains reachable over FFI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiCatalogKind {
    Farm,
    Sector,
    Lot,
    Breed,
    DeathCause,
    Diagnosis,
    SaleReason,
    Provenance,
    Employee,
    BodyCondition,
    ExploitationType,
    AnimalQuality,
}

/// Runs `$body` with `$t` aliased to the record type of `$kind`.
macro_rules! for_catalog {
    ($kind:expr, |$t:ident| $body:expr) => {
        match $kind {
            FfiCatalogKind::Farm => {
                type $t = models::Farm;
                $body
            }
            FfiCatalogKind::Sector => {
                type $t = models::Sector;
                $body
            }
            FfiCatalogKind::Lot => {
                type $t = models::Lot;
                $body
            }
            FfiCatalogKind::Breed => {
                type $t = models::Breed;
                $body
            }
            FfiCatalogKind::DeathCause => {
                type $t = models::DeathCause;
                $body
            }
            FfiCatalogKind::Diagnosis => {
                type $t = models::DiagnosisCatalog;
                $body
            }
            FfiCatalogKind::SaleReason => {
                type $t = models::SaleReason;
                $body
            }
            FfiCatalogKind::Provenance => {
                type $t = models::Provenance;
                $body
            }
            FfiCatalogKind::Employee => {
                type $t = models::Employee;
                $body
            }
            FfiCatalogKind::BodyCondition => {
                type $t = models::BodyCondition;
                $body
            }
            FfiCatalogKind::ExploitationType => {
                type $t = models::ExploitationType;
                $body
            }
            FfiCatalogKind::AnimalQuality => {
                type $t = models::AnimalQuality;
                $body
            }
        }
    };
}

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct FincaCore {
    db: Arc<Mutex<Database>>,
    config: CoreConfig,
}

#[uniffi::export]
impl FincaCore {
    // =========================================================================
    // Catalog Operations
    // =========================================================================

    /// Column layout of a catalog's `values`.
    pub fn catalog_fields(&self, kind: FfiCatalogKind) -> Vec<FfiFieldInfo> {
        for_catalog!(kind, |T| T::descriptor()
            .fields
            .iter()
            .map(FfiFieldInfo::from)
            .collect())
    }

    /// Active entries.
    pub fn catalog_list(&self, kind: FfiCatalogKind) -> Result<Vec<FfiCatalogEntry>, FincaError> {
        let db = self.db.lock()?;
        for_catalog!(kind, |T| {
            let entries = CatalogService::<_, T>::new(&*db).list()?;
            Ok(entries.iter().map(FfiCatalogEntry::from_record).collect())
        })
    }

    /// Every entry, inactive ones included.
    pub fn catalog_list_all(&self, kind: FfiCatalogKind) -> Result<Vec<FfiCatalogEntry>, FincaError> {
        let db = self.db.lock()?;
        for_catalog!(kind, |T| {
            let entries = CatalogService::<_, T>::new(&*db).list_all()?;
            Ok(entries.iter().map(FfiCatalogEntry::from_record).collect())
        })
    }

    pub fn catalog_get(
        &self,
        kind: FfiCatalogKind,
        key: FfiCatalogKey,
    ) -> Result<Option<FfiCatalogEntry>, FincaError> {
        let db = self.db.lock()?;
        let key = RecordKey::from(key);
        for_catalog!(kind, |T| {
            let entry = CatalogService::<_, T>::new(&*db).get(&key)?;
            Ok(entry.as_ref().map(FfiCatalogEntry::from_record))
        })
    }

    /// Validate and insert an entry. Returns its id.
    pub fn catalog_create(
        &self,
        kind: FfiCatalogKind,
        entry: FfiCatalogEntry,
    ) -> Result<i64, FincaError> {
        let db = self.db.lock()?;
        for_catalog!(kind, |T| {
            let record: T = entry.into_record();
            Ok(CatalogService::<_, T>::new(&*db).create(&record)?)
        })
    }

    pub fn catalog_update(
        &self,
        kind: FfiCatalogKind,
        key: FfiCatalogKey,
        entry: FfiCatalogEntry,
    ) -> Result<(), FincaError> {
        let db = self.db.lock()?;
        let key = RecordKey::from(key);
        for_catalog!(kind, |T| {
            let record: T = entry.into_record();
            Ok(CatalogService::<_, T>::new(&*db).update(&key, &record)?)
        })
    }

    /// Soft delete ("Inactivo") or restore ("Activo").
    pub fn catalog_set_state(
        &self,
        kind: FfiCatalogKind,
        key: FfiCatalogKey,
        state: String,
    ) -> Result<(), FincaError> {
        let db = self.db.lock()?;
        let key = RecordKey::from(key);
        for_catalog!(kind, |T| {
            Ok(CatalogService::<_, T>::new(&*db).set_state(&key, &state)?)
        })
    }

    /// Best-effort bulk import; rejected rows are reported, not fatal.
    pub fn catalog_import(
        &self,
        kind: FfiCatalogKind,
        entries: Vec<FfiCatalogEntry>,
    ) -> Result<FfiImportReport, FincaError> {
        let db = self.db.lock()?;
        for_catalog!(kind, |T| {
            let records: Vec<T> = entries.into_iter().map(FfiCatalogEntry::into_record).collect();
            Ok(CatalogService::<_, T>::new(&*db).import(&records).into())
        })
    }

    pub fn catalog_options(&self, kind: FfiCatalogKind) -> Result<Vec<FfiCatalogOption>, FincaError> {
        let db = self.db.lock()?;
        for_catalog!(kind, |T| {
            let options = CatalogService::<_, T>::new(&*db).options()?;
            Ok(options.into_iter().map(|o| o.into()).collect())
        })
    }

    /// Whether a code is already taken in its scope.
    pub fn catalog_exists(
        &self,
        kind: FfiCatalogKind,
        code: String,
        parent_id: Option<i64>,
    ) -> Result<bool, FincaError> {
        let db = self.db.lock()?;
        for_catalog!(kind, |T| {
            Ok(CatalogService::<_, T>::new(&*db).exists(&code, parent_id)?)
        })
    }

    /// Remove an animal quality entry for good.
    pub fn delete_quality(&self, key: FfiCatalogKey) -> Result<(), FincaError> {
        let db = self.db.lock()?;
        CatalogService::<_, AnimalQuality>::new(&*db).delete(&RecordKey::from(key))?;
        Ok(())
    }

    // =========================================================================
    // Animal Operations
    // =========================================================================

    /// Register an animal. Herd management proper lives outside this library.
    pub fn add_animal(&self, animal: FfiAnimal) -> Result<i64, FincaError> {
        let db = self.db.lock()?;
        let animal = Animal::try_from(animal)?;
        Ok(db::AnimalRepository::new(&*db).insert(&animal)?)
    }

    // =========================================================================
    // Reproduction Operations
    // =========================================================================

    pub fn register_service(
        &self,
        animal_id: i64,
        sire_id: Option<i64>,
        service_date: String,
        service_type: String,
        notes: Option<String>,
    ) -> Result<i64, FincaError> {
        let service_date = parse_date("service_date", &service_date)?;
        let db = self.db.lock()?;
        let service = ReproductionService::new(&*db).with_config(self.config.clone());
        Ok(service.register_service(
            animal_id,
            sire_id,
            service_date,
            &service_type,
            notes.as_deref(),
        )?)
    }

    /// Close a pregnancy with its calving report, optionally adding the calf to the herd.
    pub fn register_calving(&self, calving: FfiNewCalving) -> Result<FfiCalvingOutcome, FincaError> {
        let calving = NewCalving::try_from(calving)?;
        let db = self.db.lock()?;
        Ok(ReproductionService::new(&*db)
            .register_calving(&calving)?
            .into())
    }

    pub fn animal_logbook(&self, animal_id: i64) -> Result<Vec<FfiLogEntry>, FincaError> {
        let db = self.db.lock()?;
        let entries = ReproductionService::new(&*db).logbook(animal_id)?;
        Ok(entries.into_iter().map(|e| e.into()).collect())
    }

    pub fn confirm_calving(&self, animal_id: i64) -> Result<(), FincaError> {
        let db = self.db.lock()?;
        ReproductionService::new(&*db).confirm_calving(animal_id)?;
        Ok(())
    }

    pub fn mark_empty(&self, animal_id: i64) -> Result<(), FincaError> {
        let db = self.db.lock()?;
        ReproductionService::new(&*db).mark_empty(animal_id)?;
        Ok(())
    }

    pub fn mark_service_empty(&self, record_id: i64) -> Result<(), FincaError> {
        let db = self.db.lock()?;
        ReproductionService::new(&*db).mark_service_empty(record_id)?;
        Ok(())
    }

    pub fn pregnant_animals(&self) -> Result<Vec<FfiPregnancy>, FincaError> {
        let db = self.db.lock()?;
        let views = ReproductionService::new(&*db).pregnant_animals()?;
        Ok(views.into_iter().map(|v| v.into()).collect())
    }

    /// Pregnancies due within the configured calving window.
    pub fn upcoming_calvings(&self) -> Result<Vec<FfiPregnancy>, FincaError> {
        let db = self.db.lock()?;
        let views = ReproductionService::new(&*db)
            .with_config(self.config.clone())
            .upcoming_calvings()?;
        Ok(views.into_iter().map(|v| v.into()).collect())
    }

    pub fn reproduction_statistics(&self) -> Result<FfiReproductionStats, FincaError> {
        let db = self.db.lock()?;
        let stats = ReproductionService::new(&*db)
            .with_config(self.config.clone())
            .statistics()?;
        Ok(FfiReproductionStats {
            pregnant: stats.pregnant,
            due_soon: stats.due_soon,
            inseminations: stats.inseminations,
            natural_services: stats.natural_services,
        })
    }

    pub fn load_females(&self, farm_id: Option<i64>) -> Result<Vec<FfiAnimal>, FincaError> {
        let db = self.db.lock()?;
        let animals = ReproductionService::new(&*db).load_females(farm_id)?;
        Ok(animals.into_iter().map(|a| a.into()).collect())
    }

    pub fn load_males(&self, farm_id: Option<i64>) -> Result<Vec<FfiAnimal>, FincaError> {
        let db = self.db.lock()?;
        let animals = ReproductionService::new(&*db).load_males(farm_id)?;
        Ok(animals.into_iter().map(|a| a.into()).collect())
    }

    // =========================================================================
    // Health Operations
    // =========================================================================

    pub fn register_diagnosis(&self, input: FfiNewDiagnosis) -> Result<i64, FincaError> {
        let input = NewDiagnosis::try_from(input)?;
        let db = self.db.lock()?;
        Ok(HealthService::new(&*db).register_diagnosis(&input)?)
    }

    pub fn update_diagnosis_state(&self, diagnosis_id: i64, state: String) -> Result<(), FincaError> {
        let db = self.db.lock()?;
        HealthService::new(&*db).update_diagnosis_state(diagnosis_id, &state)?;
        Ok(())
    }

    pub fn register_treatment(&self, input: FfiNewTreatment) -> Result<i64, FincaError> {
        let input = NewTreatment::try_from(input)?;
        let db = self.db.lock()?;
        Ok(HealthService::new(&*db).register_treatment(&input)?)
    }

    /// Scheduled follow-ups from today on. `None` uses the configured limit.
    pub fn upcoming_treatments(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<FfiUpcomingTreatment>, FincaError> {
        let db = self.db.lock()?;
        let upcoming = HealthService::new(&*db)
            .with_config(self.config.clone())
            .upcoming_treatments(limit)?;
        Ok(upcoming.into_iter().map(|t| t.into()).collect())
    }

    pub fn diagnosis_history(&self, limit: Option<u32>) -> Result<Vec<FfiDiagnosis>, FincaError> {
        let db = self.db.lock()?;
        let history = HealthService::new(&*db)
            .with_config(self.config.clone())
            .diagnosis_history(limit)?;
        Ok(history.into_iter().map(|d| d.into()).collect())
    }

    pub fn treatment_history(&self, limit: Option<u32>) -> Result<Vec<FfiTreatment>, FincaError> {
        let db = self.db.lock()?;
        let history = HealthService::new(&*db)
            .with_config(self.config.clone())
            .treatment_history(limit)?;
        Ok(history.into_iter().map(|t| t.into()).collect())
    }

    pub fn health_statistics(&self) -> Result<FfiHealthStats, FincaError> {
        let db = self.db.lock()?;
        let stats = HealthService::new(&*db).statistics()?;
        Ok(FfiHealthStats {
            active_diagnoses: stats.active_diagnoses,
            treatments: stats.treatments,
            upcoming_treatments: stats.upcoming_treatments,
        })
    }

    pub fn load_animals_by_farm(&self, farm_name: String) -> Result<Vec<FfiAnimal>, FincaError> {
        let db = self.db.lock()?;
        let animals = HealthService::new(&*db).load_animals_by_farm(&farm_name)?;
        Ok(animals.into_iter().map(|a| a.into()).collect())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe catalog entry. `values` follows the order given by `catalog_fields`.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiCatalogEntry {
    pub id: Option<i64>,
    pub code: String,
    pub parent_id: Option<i64>,
    pub values: Vec<Option<String>>,
    pub state: String,
}

impl FfiCatalogEntry {
    fn from_record<T: CatalogRecord>(record: &T) -> Self {
        let row = record.to_row();
        Self {
            id: row.id,
            code: row.code,
            parent_id: row.parent_id,
            values: row.values,
            state: row.state.to_string(),
        }
    }

    fn into_record<T: CatalogRecord>(self) -> T {
        let state = EntityState::parse(self.state.trim()).unwrap_or_default();
        T::from_row(CatalogRow::new(self.code, self.parent_id, self.values).with_identity(self.id, state))
    }
}

/// FFI-safe catalog key.
#[derive(Debug, Clone, PartialEq, uniffi::Enum)]
pub enum FfiCatalogKey {
    Id { id: i64 },
    Code { code: String },
    Scoped { parent_id: i64, code: String },
}

impl From<FfiCatalogKey> for RecordKey {
    fn from(key: FfiCatalogKey) -> Self {
        match key {
            FfiCatalogKey::Id { id } => RecordKey::Id(id),
            FfiCatalogKey::Code { code } => RecordKey::Code(code),
            FfiCatalogKey::Scoped { parent_id, code } => RecordKey::Scoped { parent_id, code },
        }
    }
}

/// FFI-safe field description.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiFieldInfo {
    pub column: String,
    pub required: bool,
    pub allowed: Vec<String>,
    pub default_value: Option<String>,
}

impl From<&FieldRule> for FfiFieldInfo {
    fn from(rule: &FieldRule) -> Self {
        Self {
            column: rule.column.to_string(),
            required: rule.required,
            allowed: rule
                .allowed
                .unwrap_or_default()
                .iter()
                .map(|v| v.to_string())
                .collect(),
            default_value: rule.default.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiCatalogOption {
    pub id: i64,
    pub code: String,
    pub label: String,
}

impl From<CatalogOption> for FfiCatalogOption {
    fn from(option: CatalogOption) -> Self {
        Self {
            id: option.id,
            code: option.code,
            label: option.label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiRowError {
    /// 1-based position in the submitted list.
    pub row: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiImportReport {
    pub imported: u32,
    pub errors: Vec<FfiRowError>,
}

impl From<ImportReport> for FfiImportReport {
    fn from(report: ImportReport) -> Self {
        Self {
            imported: report.imported as u32,
            errors: report
                .errors
                .into_iter()
                .map(|e| FfiRowError {
                    row: e.row as u32,
                    message: e.error.to_string(),
                })
                .collect(),
        }
    }
}

/// FFI-safe animal. `sex` is "Macho" or "Hembra".
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiAnimal {
    pub id: Option<i64>,
    pub code: String,
    pub name: Option<String>,
    pub sex: String,
    pub farm_id: Option<i64>,
    pub mother_id: Option<i64>,
    pub birth_date: Option<String>,
    pub active: bool,
}

impl From<Animal> for FfiAnimal {
    fn from(animal: Animal) -> Self {
        Self {
            active: animal.is_active(),
            id: animal.id,
            code: animal.code,
            name: animal.name,
            sex: animal.sex.to_string(),
            farm_id: animal.farm_id,
            mother_id: animal.mother_id,
            birth_date: animal.birth_date.map(|d| d.to_string()),
        }
    }
}

impl TryFrom<FfiAnimal> for Animal {
    type Error = FincaError;

    fn try_from(animal: FfiAnimal) -> Result<Self, Self::Error> {
        let sex = Sex::parse(animal.sex.trim()).ok_or_else(|| {
            FincaError::InvalidInput(format!("sex: expected Macho or Hembra, got '{}'", animal.sex))
        })?;
        Ok(Animal {
            id: animal.id,
            code: animal.code.trim().to_string(),
            name: animal.name,
            sex,
            farm_id: animal.farm_id,
            mother_id: animal.mother_id,
            birth_date: parse_optional_date("birth_date", animal.birth_date)?,
            state: if animal.active {
                EntityState::Active
            } else {
                EntityState::Inactive
            },
        })
    }
}

/// FFI-safe pregnancy with derived day counts.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiPregnancy {
    pub record_id: i64,
    pub animal_id: i64,
    pub animal_code: String,
    pub animal_name: Option<String>,
    pub sire_code: Option<String>,
    pub service_date: String,
    pub service_type: String,
    pub estimated_calving_date: String,
    pub days_pregnant: i64,
    pub days_to_calving: i64,
}

impl From<PregnancyView> for FfiPregnancy {
    fn from(view: PregnancyView) -> Self {
        Self {
            record_id: view.record_id,
            animal_id: view.animal_id,
            animal_code: view.animal_code,
            animal_name: view.animal_name,
            sire_code: view.sire_code,
            service_date: view.service_date.to_string(),
            service_type: view.service_type.to_string(),
            estimated_calving_date: view.estimated_calving_date.to_string(),
            days_pregnant: view.days_pregnant,
            days_to_calving: view.days_to_calving,
        }
    }
}

/// FFI-safe calving report. `offspring_status` defaults to "Vivo".
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiNewCalving {
    pub record_id: i64,
    pub date: String,
    pub calving_type: String,
    pub offspring_sex: String,
    pub offspring_weight: Option<f64>,
    pub offspring_status: Option<String>,
    pub register_offspring: bool,
    pub notes: Option<String>,
}

impl TryFrom<FfiNewCalving> for NewCalving {
    type Error = FincaError;

    fn try_from(input: FfiNewCalving) -> Result<Self, Self::Error> {
        Ok(NewCalving {
            date: parse_date("date", &input.date)?,
            record_id: input.record_id,
            calving_type: input.calving_type,
            offspring_sex: input.offspring_sex,
            offspring_weight: input.offspring_weight,
            offspring_status: input.offspring_status,
            register_offspring: input.register_offspring,
            notes: input.notes,
        })
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiCalvingOutcome {
    pub record_id: i64,
    pub offspring_id: Option<i64>,
    pub offspring_code: Option<String>,
}

impl From<CalvingOutcome> for FfiCalvingOutcome {
    fn from(outcome: CalvingOutcome) -> Self {
        Self {
            record_id: outcome.record_id,
            offspring_id: outcome.offspring_id,
            offspring_code: outcome.offspring_code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiLogEntry {
    pub id: i64,
    pub animal_id: i64,
    pub date: String,
    pub kind: String,
    pub note: String,
    pub author: String,
}

impl From<LogEntry> for FfiLogEntry {
    fn from(entry: LogEntry) -> Self {
        Self {
            id: entry.id,
            animal_id: entry.animal_id,
            date: entry.date.to_string(),
            kind: entry.kind,
            note: entry.note,
            author: entry.author,
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiReproductionStats {
    pub pregnant: i64,
    pub due_soon: i64,
    pub inseminations: i64,
    pub natural_services: i64,
}

/// FFI-safe diagnosis input. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiNewDiagnosis {
    pub animal_id: i64,
    pub date: String,
    pub kind: String,
    pub detail: String,
    pub severity: String,
    pub state: Option<String>,
    pub notes: Option<String>,
}

impl TryFrom<FfiNewDiagnosis> for NewDiagnosis {
    type Error = FincaError;

    fn try_from(input: FfiNewDiagnosis) -> Result<Self, Self::Error> {
        Ok(NewDiagnosis {
            date: parse_date("date", &input.date)?,
            animal_id: input.animal_id,
            kind: input.kind,
            detail: input.detail,
            severity: input.severity,
            state: input.state,
            notes: input.notes,
        })
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiDiagnosis {
    pub id: i64,
    pub animal_id: i64,
    pub date: String,
    pub kind: String,
    pub detail: String,
    pub severity: String,
    pub state: String,
    pub notes: Option<String>,
}

impl From<HealthDiagnosis> for FfiDiagnosis {
    fn from(diagnosis: HealthDiagnosis) -> Self {
        Self {
            id: diagnosis.id,
            animal_id: diagnosis.animal_id,
            date: diagnosis.date.to_string(),
            kind: diagnosis.kind,
            detail: diagnosis.detail,
            severity: diagnosis.severity.to_string(),
            state: diagnosis.state.to_string(),
            notes: diagnosis.notes,
        }
    }
}

/// FFI-safe treatment input. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiNewTreatment {
    pub animal_id: i64,
    pub start_date: String,
    pub end_date: Option<String>,
    pub treatment_type: String,
    pub product: String,
    pub dose: Option<String>,
    pub veterinarian: Option<String>,
    pub comment: Option<String>,
    pub next_date: Option<String>,
}

impl TryFrom<FfiNewTreatment> for NewTreatment {
    type Error = FincaError;

    fn try_from(input: FfiNewTreatment) -> Result<Self, Self::Error> {
        Ok(NewTreatment {
            start_date: parse_date("start_date", &input.start_date)?,
            end_date: parse_optional_date("end_date", input.end_date)?,
            next_date: parse_optional_date("next_date", input.next_date)?,
            animal_id: input.animal_id,
            treatment_type: input.treatment_type,
            product: input.product,
            dose: input.dose,
            veterinarian: input.veterinarian,
            comment: input.comment,
        })
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiTreatment {
    pub id: i64,
    pub animal_id: i64,
    pub start_date: String,
    pub end_date: Option<String>,
    pub treatment_type: String,
    pub product: String,
    pub dose: Option<String>,
    pub veterinarian: Option<String>,
    pub comment: Option<String>,
    pub next_date: Option<String>,
}

impl From<HealthTreatment> for FfiTreatment {
    fn from(treatment: HealthTreatment) -> Self {
        Self {
            id: treatment.id,
            animal_id: treatment.animal_id,
            start_date: treatment.start_date.to_string(),
            end_date: treatment.end_date.map(|d| d.to_string()),
            treatment_type: treatment.treatment_type.to_string(),
            product: treatment.product,
            dose: treatment.dose,
            veterinarian: treatment.veterinarian,
            comment: treatment.comment,
            next_date: treatment.next_date.map(|d| d.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiUpcomingTreatment {
    pub treatment_id: i64,
    pub animal_id: i64,
    pub animal_code: String,
    pub treatment_type: String,
    pub product: String,
    pub next_date: String,
}

impl From<UpcomingTreatment> for FfiUpcomingTreatment {
    fn from(upcoming: UpcomingTreatment) -> Self {
        Self {
            treatment_id: upcoming.treatment_id,
            animal_id: upcoming.animal_id,
            animal_code: upcoming.animal_code,
            treatment_type: upcoming.treatment_type.to_string(),
            product: upcoming.product,
            next_date: upcoming.next_date.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiHealthStats {
    pub active_diagnoses: i64,
    pub treatments: i64,
    pub upcoming_treatments: i64,
}
