//! Health diagnosis and treatment service.

use crate::config::CoreConfig;
use crate::db::{AnimalRepository, CatalogRepository, Gateway, HealthRepository};
use crate::models::{
    Animal, CatalogOption, DiagnosisState, Farm, HealthDiagnosis, HealthStats, HealthTreatment,
    NewDiagnosis, NewTreatment, Severity, TextCase, TreatmentType, UpcomingTreatment,
};

use super::{
    normalize_optional, normalize_text, Clock, ServiceError, ServiceResult, SystemClock,
};

pub struct HealthService<'a, G: Gateway + ?Sized, C = SystemClock> {
    health: HealthRepository<'a, G>,
    animals: AnimalRepository<'a, G>,
    farms: CatalogRepository<'a, G, Farm>,
    config: CoreConfig,
    clock: C,
}

impl<'a, G: Gateway + ?Sized> HealthService<'a, G> {
    pub fn new(db: &'a G) -> Self {
        Self {
            health: HealthRepository::new(db),
            animals: AnimalRepository::new(db),
            farms: CatalogRepository::new(db),
            config: CoreConfig::default(),
            clock: SystemClock,
        }
    }
}

fn parse_state(value: &str) -> ServiceResult<DiagnosisState> {
    DiagnosisState::parse(value.trim()).ok_or_else(|| ServiceError::InvalidEnumValue {
        field: "estado",
        value: value.to_string(),
        allowed: DiagnosisState::ALLOWED,
    })
}

impl<'a, G: Gateway + ?Sized, C: Clock> HealthService<'a, G, C> {
    pub fn with_config(mut self, config: CoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock<K: Clock>(self, clock: K) -> HealthService<'a, G, K> {
        HealthService {
            health: self.health,
            animals: self.animals,
            farms: self.farms,
            config: self.config,
            clock,
        }
    }

    fn require_active_animal(&self, animal_id: i64) -> ServiceResult<()> {
        match self.animals.get(animal_id)? {
            Some(animal) if animal.is_active() => Ok(()),
            _ => Err(ServiceError::ParentNotFoundOrInactive {
                parent: "animal",
                id: animal_id,
            }),
        }
    }

    /// Record a diagnosis for an active animal. Returns its id.
    pub fn register_diagnosis(&self, input: &NewDiagnosis) -> ServiceResult<i64> {
        let kind = normalize_text(&input.kind, TextCase::Preserve);
        if kind.is_empty() {
            return Err(ServiceError::RequiredFieldMissing { field: "tipo" });
        }
        let severity = Severity::parse(input.severity.trim()).ok_or_else(|| {
            ServiceError::InvalidEnumValue {
                field: "severidad",
                value: input.severity.clone(),
                allowed: Severity::ALLOWED,
            }
        })?;
        let state = match input.state.as_deref().map(str::trim) {
            None | Some("") => DiagnosisState::default(),
            Some(value) => parse_state(value)?,
        };
        self.require_active_animal(input.animal_id)?;

        let diagnosis = HealthDiagnosis {
            id: 0,
            animal_id: input.animal_id,
            date: input.date,
            kind,
            detail: normalize_text(&input.detail, TextCase::Preserve),
            severity,
            state,
            notes: normalize_optional(input.notes.as_deref(), TextCase::Preserve),
        };
        let id = self.health.insert_diagnosis(&diagnosis)?;
        tracing::debug!(
            diagnosis = id,
            animal = input.animal_id,
            severity = %severity,
            "diagnosis registered"
        );
        Ok(id)
    }

    /// Move a diagnosis to any of the four states.
    pub fn update_diagnosis_state(&self, diagnosis_id: i64, new_state: &str) -> ServiceResult<()> {
        let state = parse_state(new_state)?;
        if self.health.update_diagnosis_state(diagnosis_id, state)? == 0 {
            return Err(ServiceError::NotFound {
                entity: "diagnosis",
                key: diagnosis_id.to_string(),
            });
        }
        tracing::debug!(diagnosis = diagnosis_id, state = %state, "diagnosis state changed");
        Ok(())
    }

    /// Record a treatment for an active animal. Returns its id.
    pub fn register_treatment(&self, input: &NewTreatment) -> ServiceResult<i64> {
        let raw_type = normalize_text(&input.treatment_type, TextCase::Title);
        let treatment_type = TreatmentType::parse(&raw_type).ok_or_else(|| {
            ServiceError::InvalidEnumValue {
                field: "tipo_tratamiento",
                value: input.treatment_type.clone(),
                allowed: TreatmentType::ALLOWED,
            }
        })?;
        let product = normalize_text(&input.product, TextCase::Preserve);
        if product.is_empty() {
            return Err(ServiceError::RequiredFieldMissing { field: "producto" });
        }
        self.require_active_animal(input.animal_id)?;

        let treatment = HealthTreatment {
            id: 0,
            animal_id: input.animal_id,
            start_date: input.start_date,
            end_date: input.end_date,
            treatment_type,
            product,
            dose: normalize_optional(input.dose.as_deref(), TextCase::Preserve),
            veterinarian: normalize_optional(input.veterinarian.as_deref(), TextCase::Preserve),
            comment: normalize_optional(input.comment.as_deref(), TextCase::Preserve),
            next_date: input.next_date,
        };
        let id = self.health.insert_treatment(&treatment)?;
        tracing::debug!(
            treatment = id,
            animal = input.animal_id,
            treatment_type = %treatment_type,
            "treatment registered"
        );
        Ok(id)
    }

    /// Follow-ups due today or later, soonest first.
    pub fn upcoming_treatments(&self, limit: Option<u32>) -> ServiceResult<Vec<UpcomingTreatment>> {
        let limit = limit.unwrap_or(self.config.upcoming_treatments_limit);
        Ok(self
            .health
            .list_upcoming_treatments(self.clock.today(), limit)?)
    }

    /// Most recent diagnoses first.
    pub fn diagnosis_history(&self, limit: Option<u32>) -> ServiceResult<Vec<HealthDiagnosis>> {
        Ok(self
            .health
            .list_diagnoses(limit.unwrap_or(self.config.history_limit))?)
    }

    pub fn treatment_history(&self, limit: Option<u32>) -> ServiceResult<Vec<HealthTreatment>> {
        Ok(self
            .health
            .list_treatments(limit.unwrap_or(self.config.history_limit))?)
    }

    pub fn diagnosis(&self, diagnosis_id: i64) -> ServiceResult<Option<HealthDiagnosis>> {
        Ok(self.health.get_diagnosis(diagnosis_id)?)
    }

    pub fn treatment(&self, treatment_id: i64) -> ServiceResult<Option<HealthTreatment>> {
        Ok(self.health.get_treatment(treatment_id)?)
    }

    pub fn statistics(&self) -> ServiceResult<HealthStats> {
        Ok(HealthStats {
            active_diagnoses: self
                .health
                .count_diagnoses_in_state(DiagnosisState::Active)?,
            treatments: self.health.count_treatments()?,
            upcoming_treatments: self
                .health
                .count_upcoming_treatments(self.clock.today())?,
        })
    }

    pub fn load_farms(&self) -> ServiceResult<Vec<CatalogOption>> {
        Ok(self.farms.options()?)
    }

    pub fn load_animals(&self) -> ServiceResult<Vec<Animal>> {
        Ok(self.animals.list_active()?)
    }

    /// Active animals of the farm with this name.
    pub fn load_animals_by_farm(&self, farm_name: &str) -> ServiceResult<Vec<Animal>> {
        Ok(self.animals.list_active_by_farm_name(farm_name.trim())?)
    }
}
