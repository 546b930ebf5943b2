//! Reproductive cycle state machine.
//!
//! ```text
//! register_service ──► Gestante ──confirm_calving──► Parida
//!                          │     ──register_calving─►
//!                          └──────mark_empty───────► Vacía
//! ```
//!
//! Every closing transition only applies to records still in `Gestante`.
//! Services and calvings leave a line in the animal's logbook.

use chrono::NaiveDate;

use crate::config::CoreConfig;
use crate::db::{AnimalRepository, CatalogRepository, Gateway, ReproductionRepository};
use crate::models::{
    estimated_calving_date, offspring_code, shift_date, Animal, CalvingDetails, CalvingOutcome,
    CalvingType, CatalogOption, Farm, LogEntry, NewCalving, OffspringStatus, PregnancyView,
    ReproductionStats, ReproductiveRecord, ReproductiveState, ServiceType, Sex, TextCase,
    LOG_KIND_CALVING, LOG_KIND_REPRODUCTION,
};

use super::{normalize_optional, Clock, ServiceError, ServiceResult, SystemClock};

fn shift(date: NaiveDate, days: i64) -> ServiceResult<NaiveDate> {
    shift_date(date, days).ok_or(ServiceError::DateOutOfRange { date, days })
}

fn parse_field<E>(
    field: &'static str,
    value: &str,
    parse: fn(&str) -> Option<E>,
    allowed: &'static [&'static str],
) -> ServiceResult<E> {
    parse(value.trim()).ok_or_else(|| ServiceError::InvalidEnumValue {
        field,
        value: value.to_string(),
        allowed,
    })
}

pub struct ReproductionService<'a, G: Gateway + ?Sized, C = SystemClock> {
    records: ReproductionRepository<'a, G>,
    animals: AnimalRepository<'a, G>,
    farms: CatalogRepository<'a, G, Farm>,
    config: CoreConfig,
    clock: C,
}

impl<'a, G: Gateway + ?Sized> ReproductionService<'a, G> {
    pub fn new(db: &'a G) -> Self {
        Self {
            records: ReproductionRepository::new(db),
            animals: AnimalRepository::new(db),
            farms: CatalogRepository::new(db),
            config: CoreConfig::default(),
            clock: SystemClock,
        }
    }
}

impl<'a, G: Gateway + ?Sized, C: Clock> ReproductionService<'a, G, C> {
    pub fn with_config(mut self, config: CoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock<K: Clock>(self, clock: K) -> ReproductionService<'a, G, K> {
        ReproductionService {
            records: self.records,
            animals: self.animals,
            farms: self.farms,
            config: self.config,
            clock,
        }
    }

    fn animal(&self, animal_id: i64) -> ServiceResult<Animal> {
        self.animals
            .get(animal_id)?
            .ok_or_else(|| ServiceError::NotFound {
                entity: "animal",
                key: animal_id.to_string(),
            })
    }

    fn with_derived_days(&self, views: Vec<PregnancyView>) -> Vec<PregnancyView> {
        let today = self.clock.today();
        views
            .into_iter()
            .map(|view| view.derive_days(today))
            .collect()
    }

    /// The bull must be an active male.
    fn check_sire(&self, sire_id: i64) -> ServiceResult<Animal> {
        let sire = self
            .animals
            .get(sire_id)?
            .filter(Animal::is_active)
            .ok_or(ServiceError::ParentNotFoundOrInactive {
                parent: "animal",
                id: sire_id,
            })?;
        if sire.sex != Sex::Male {
            return Err(ServiceError::InvalidEnumValue {
                field: "id_macho",
                value: sire.sex.to_string(),
                allowed: &["Macho"],
            });
        }
        Ok(sire)
    }

    fn log(&self, animal_id: i64, date: NaiveDate, kind: &str, note: &str) -> ServiceResult<()> {
        self.animals.insert_log_entry(animal_id, date, kind, note)?;
        Ok(())
    }

    /// Record a service and open a pregnancy. Returns the new record id.
    pub fn register_service(
        &self,
        animal_id: i64,
        sire_id: Option<i64>,
        service_date: NaiveDate,
        service_type: &str,
        notes: Option<&str>,
    ) -> ServiceResult<i64> {
        let animal = self.animal(animal_id)?;
        let service_type = parse_field(
            "tipo_cubricion",
            service_type,
            ServiceType::parse,
            ServiceType::ALLOWED,
        )?;
        let sire = sire_id.map(|id| self.check_sire(id)).transpose()?;

        let open = self.records.count_open_for_animal(animal_id)?;
        if open > 0 {
            tracing::warn!(
                animal = %animal.code,
                open,
                "registering a service for an animal that is already pregnant"
            );
        }

        let gestation_days = self.config.gestation_days;
        let estimated = estimated_calving_date(service_date, gestation_days).ok_or(
            ServiceError::DateOutOfRange {
                date: service_date,
                days: gestation_days,
            },
        )?;
        let notes = normalize_optional(notes, TextCase::Preserve);
        let id = self.records.insert(
            animal_id,
            sire_id,
            service_date,
            service_type,
            estimated,
            notes.as_deref(),
        )?;
        let mut note = format!("Servicio: {service_type}. Parto estimado: {estimated}");
        if let Some(sire) = &sire {
            note.push_str(&format!(". Macho: {}", sire.code));
        }
        self.log(animal_id, service_date, LOG_KIND_REPRODUCTION, &note)?;
        tracing::debug!(
            record = id,
            animal = %animal.code,
            sire = sire.as_ref().map(|s| s.code.as_str()),
            service_type = %service_type,
            estimated_calving = %estimated,
            "service registered"
        );
        Ok(id)
    }

    fn open_record(&self, record_id: i64) -> ServiceResult<ReproductiveRecord> {
        let record = self
            .records
            .get(record_id)?
            .ok_or_else(|| ServiceError::NotFound {
                entity: "reproductive record",
                key: record_id.to_string(),
            })?;
        if !record.state.is_open() {
            return Err(ServiceError::NotFound {
                entity: "open reproductive record",
                key: record_id.to_string(),
            });
        }
        Ok(record)
    }

    /// Close one pregnancy as calved with the full calving report.
    ///
    /// A live calf is added to the herd when asked, on the mother's farm,
    /// under the next free `A0001`-style code.
    pub fn register_calving(&self, calving: &NewCalving) -> ServiceResult<CalvingOutcome> {
        let record = self.open_record(calving.record_id)?;
        let mother = self.animal(record.animal_id)?;
        let calving_type = parse_field(
            "tipo_parto",
            &calving.calving_type,
            CalvingType::parse,
            CalvingType::ALLOWED,
        )?;
        let offspring_sex = parse_field(
            "sexo_cria",
            &calving.offspring_sex,
            Sex::parse,
            Sex::ALLOWED,
        )?;
        let offspring_status = match calving.offspring_status.as_deref() {
            Some(status) => parse_field(
                "estado_cria",
                status,
                OffspringStatus::parse,
                OffspringStatus::ALLOWED,
            )?,
            None => OffspringStatus::Alive,
        };
        let notes = normalize_optional(calving.notes.as_deref(), TextCase::Preserve);

        let mut offspring = None;
        if calving.register_offspring && offspring_status == OffspringStatus::Alive {
            let farm_id = mother
                .farm_id
                .ok_or(ServiceError::RequiredFieldMissing { field: "id_finca" })?;
            let mut calf = Animal::new(
                offspring_code(self.animals.last_offspring_number()?),
                offspring_sex,
            );
            calf.name = Some(format!("Cría de {}", calving.date));
            calf.farm_id = Some(farm_id);
            calf.mother_id = Some(record.animal_id);
            calf.birth_date = Some(calving.date);
            let id = self.animals.insert(&calf).map_err(|err| {
                ServiceError::from_write(err, "animal", |_| Some(calf.code.clone()))
            })?;
            offspring = Some((id, calf.code));
        }

        let details = CalvingDetails {
            calving_type,
            offspring_sex,
            offspring_weight: calving.offspring_weight,
            offspring_status,
            offspring_id: offspring.as_ref().map(|(id, _)| *id),
        };
        if self
            .records
            .record_calving(record.id, calving.date, &details, notes.as_deref())?
            == 0
        {
            return Err(ServiceError::NotFound {
                entity: "open reproductive record",
                key: record.id.to_string(),
            });
        }

        let mut note = format!(
            "Parto {calving_type}. Cría {offspring_sex}, estado: {offspring_status}"
        );
        if let Some(weight) = calving.offspring_weight {
            note.push_str(&format!(", peso: {weight} kg"));
        }
        self.log(record.animal_id, calving.date, LOG_KIND_CALVING, &note)?;
        tracing::debug!(
            record = record.id,
            animal = %mother.code,
            calving_type = %calving_type,
            offspring = offspring.as_ref().map(|(_, code)| code.as_str()),
            "calving registered"
        );

        let (offspring_id, offspring_code) = offspring.unzip();
        Ok(CalvingOutcome {
            record_id: record.id,
            offspring_id,
            offspring_code,
        })
    }

    /// Logbook of one animal, newest first.
    pub fn logbook(&self, animal_id: i64) -> ServiceResult<Vec<LogEntry>> {
        self.animal(animal_id)?;
        Ok(self.animals.list_log_entries(animal_id)?)
    }

    fn close_open(
        &self,
        animal_id: i64,
        state: ReproductiveState,
        calving_date: Option<NaiveDate>,
    ) -> ServiceResult<()> {
        let animal = self.animal(animal_id)?;
        let closed = self
            .records
            .close_open_by_animal_code(&animal.code, state, calving_date)?;
        if closed == 0 {
            return Err(ServiceError::NotFound {
                entity: "open reproductive record",
                key: animal.code,
            });
        }
        tracing::debug!(animal = %animal.code, state = %state, closed, "pregnancy closed");
        Ok(())
    }

    /// Gestante to Parida, stamping today as the calving date.
    pub fn confirm_calving(&self, animal_id: i64) -> ServiceResult<()> {
        self.close_open(animal_id, ReproductiveState::Calved, Some(self.clock.today()))
    }

    /// Gestante to Vacía.
    pub fn mark_empty(&self, animal_id: i64) -> ServiceResult<()> {
        self.close_open(animal_id, ReproductiveState::Empty, None)
    }

    /// Gestante to Vacía for one specific record.
    pub fn mark_service_empty(&self, record_id: i64) -> ServiceResult<()> {
        self.open_record(record_id)?;
        if self
            .records
            .set_open_record_state(record_id, ReproductiveState::Empty)?
            == 0
        {
            return Err(ServiceError::NotFound {
                entity: "open reproductive record",
                key: record_id.to_string(),
            });
        }
        tracing::debug!(record = record_id, "service marked empty");
        Ok(())
    }

    pub fn record(&self, record_id: i64) -> ServiceResult<Option<ReproductiveRecord>> {
        Ok(self.records.get(record_id)?)
    }

    /// Open pregnancies, oldest service first.
    pub fn pregnant_animals(&self) -> ServiceResult<Vec<PregnancyView>> {
        Ok(self.with_derived_days(self.records.list_pregnant()?))
    }

    /// Open pregnancies due between today and the end of the calving window.
    pub fn upcoming_calvings(&self) -> ServiceResult<Vec<PregnancyView>> {
        let today = self.clock.today();
        let until = shift(today, self.config.calving_window_days)?;
        Ok(self.with_derived_days(self.records.list_calving_between(today, until)?))
    }

    pub fn is_pregnant(&self, animal_id: i64) -> ServiceResult<bool> {
        Ok(self.records.count_open_for_animal(animal_id)? > 0)
    }

    pub fn has_service_on(&self, animal_id: i64, service_date: NaiveDate) -> ServiceResult<bool> {
        Ok(self.records.count_on_date(animal_id, service_date)? > 0)
    }

    pub fn statistics(&self) -> ServiceResult<ReproductionStats> {
        let today = self.clock.today();
        let until = shift(today, self.config.calving_window_days)?;
        let since = shift(today, self.config.statistics_window_days.saturating_neg())?;
        Ok(ReproductionStats {
            pregnant: self.records.count_pregnant()?,
            due_soon: self.records.count_due_between(today, until)?,
            inseminations: self
                .records
                .count_services_since(ServiceType::Insemination, since)?,
            natural_services: self
                .records
                .count_services_since(ServiceType::Natural, since)?,
        })
    }

    pub fn load_farms(&self) -> ServiceResult<Vec<CatalogOption>> {
        Ok(self.farms.options()?)
    }

    pub fn load_females(&self, farm_id: Option<i64>) -> ServiceResult<Vec<Animal>> {
        Ok(self.animals.list_by_sex(Sex::Female, farm_id)?)
    }

    pub fn load_males(&self, farm_id: Option<i64>) -> ServiceResult<Vec<Animal>> {
        Ok(self.animals.list_by_sex(Sex::Male, farm_id)?)
    }
}
