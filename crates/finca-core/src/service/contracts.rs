//! Service contracts.
//!
//! Presentation code depends on these traits rather than on the concrete services,
//! so it can run against test doubles. Aliases carry the operation names used by
//! the farm staff's existing screens.

use chrono::NaiveDate;

use crate::db::Gateway;
use crate::models::{
    Animal, CalvingOutcome, CatalogOption, CatalogRecord, HealthDiagnosis, HealthStats,
    HealthTreatment, LogEntry, NewCalving, NewDiagnosis, NewTreatment, PregnancyView, RecordKey,
    ReproductionStats, UpcomingTreatment,
};

use super::{CatalogService, Clock, HealthService, ReproductionService, ServiceResult};

/// Read and write access to one catalog.
pub trait CatalogContract<T: CatalogRecord> {
    #[doc(alias = "listar")]
    fn list(&self) -> ServiceResult<Vec<T>>;

    #[doc(alias = "obtener")]
    fn get(&self, key: &RecordKey) -> ServiceResult<Option<T>>;

    #[doc(alias = "crear")]
    fn create(&self, record: &T) -> ServiceResult<i64>;

    #[doc(alias = "actualizar")]
    fn update(&self, key: &RecordKey, record: &T) -> ServiceResult<()>;

    #[doc(alias = "cambiar_estado")]
    fn set_state(&self, key: &RecordKey, new_state: &str) -> ServiceResult<()>;

    #[doc(alias = "cargar")]
    fn options(&self) -> ServiceResult<Vec<CatalogOption>>;

    #[doc(alias = "validar_codigo")]
    fn exists(&self, code: &str, parent_id: Option<i64>) -> ServiceResult<bool>;
}

pub trait ReproductionContract {
    #[doc(alias = "registrar_servicio")]
    fn register_service(
        &self,
        animal_id: i64,
        sire_id: Option<i64>,
        service_date: NaiveDate,
        service_type: &str,
        notes: Option<&str>,
    ) -> ServiceResult<i64>;

    #[doc(alias = "confirmar_parto")]
    fn confirm_calving(&self, animal_id: i64) -> ServiceResult<()>;

    #[doc(alias = "registrar_parto")]
    fn register_calving(&self, calving: &NewCalving) -> ServiceResult<CalvingOutcome>;

    #[doc(alias = "obtener_comentarios")]
    fn logbook(&self, animal_id: i64) -> ServiceResult<Vec<LogEntry>>;

    #[doc(alias = "marcar_vacia")]
    fn mark_empty(&self, animal_id: i64) -> ServiceResult<()>;

    #[doc(alias = "obtener_proximos_partos")]
    fn upcoming_calvings(&self) -> ServiceResult<Vec<PregnancyView>>;

    #[doc(alias = "listar_gestantes")]
    fn pregnant_animals(&self) -> ServiceResult<Vec<PregnancyView>>;

    #[doc(alias = "validar_hembra_gestante")]
    fn is_pregnant(&self, animal_id: i64) -> ServiceResult<bool>;

    #[doc(alias = "validar_servicio_duplicado")]
    fn has_service_on(&self, animal_id: i64, service_date: NaiveDate) -> ServiceResult<bool>;

    #[doc(alias = "cargar_fincas")]
    fn load_farms(&self) -> ServiceResult<Vec<CatalogOption>>;

    #[doc(alias = "cargar_hembras")]
    fn load_females(&self, farm_id: Option<i64>) -> ServiceResult<Vec<Animal>>;

    #[doc(alias = "cargar_machos")]
    fn load_males(&self, farm_id: Option<i64>) -> ServiceResult<Vec<Animal>>;
}

pub trait HealthContract {
    #[doc(alias = "registrar_diagnostico")]
    fn register_diagnosis(&self, input: &NewDiagnosis) -> ServiceResult<i64>;

    #[doc(alias = "actualizar_estado_diagnostico")]
    fn update_diagnosis_state(&self, diagnosis_id: i64, new_state: &str) -> ServiceResult<()>;

    #[doc(alias = "registrar_tratamiento")]
    fn register_treatment(&self, input: &NewTreatment) -> ServiceResult<i64>;

    #[doc(alias = "obtener_proximos_tratamientos")]
    fn upcoming_treatments(&self, limit: Option<u32>) -> ServiceResult<Vec<UpcomingTreatment>>;

    #[doc(alias = "obtener_historial_diagnosticos")]
    fn diagnosis_history(&self, limit: Option<u32>) -> ServiceResult<Vec<HealthDiagnosis>>;

    #[doc(alias = "obtener_historial_tratamientos")]
    fn treatment_history(&self, limit: Option<u32>) -> ServiceResult<Vec<HealthTreatment>>;

    #[doc(alias = "cargar_animales")]
    fn load_animals(&self) -> ServiceResult<Vec<Animal>>;
}

/// Dashboard badge counters.
pub trait StatisticsContract {
    type Stats;

    #[doc(alias = "obtener_estadisticas")]
    fn statistics(&self) -> ServiceResult<Self::Stats>;
}

impl<'a, G: Gateway + ?Sized, T: CatalogRecord> CatalogContract<T> for CatalogService<'a, G, T> {
    fn list(&self) -> ServiceResult<Vec<T>> {
        CatalogService::list(self)
    }

    fn get(&self, key: &RecordKey) -> ServiceResult<Option<T>> {
        CatalogService::get(self, key)
    }

    fn create(&self, record: &T) -> ServiceResult<i64> {
        CatalogService::create(self, record)
    }

    fn update(&self, key: &RecordKey, record: &T) -> ServiceResult<()> {
        CatalogService::update(self, key, record)
    }

    fn set_state(&self, key: &RecordKey, new_state: &str) -> ServiceResult<()> {
        CatalogService::set_state(self, key, new_state)
    }

    fn options(&self) -> ServiceResult<Vec<CatalogOption>> {
        CatalogService::options(self)
    }

    fn exists(&self, code: &str, parent_id: Option<i64>) -> ServiceResult<bool> {
        CatalogService::exists(self, code, parent_id)
    }
}

impl<'a, G: Gateway + ?Sized, C: Clock> ReproductionContract for ReproductionService<'a, G, C> {
    fn register_service(
        &self,
        animal_id: i64,
        sire_id: Option<i64>,
        service_date: NaiveDate,
        service_type: &str,
        notes: Option<&str>,
    ) -> ServiceResult<i64> {
        ReproductionService::register_service(
            self,
            animal_id,
            sire_id,
            service_date,
            service_type,
            notes,
        )
    }

    fn confirm_calving(&self, animal_id: i64) -> ServiceResult<()> {
        ReproductionService::confirm_calving(self, animal_id)
    }

    fn register_calving(&self, calving: &NewCalving) -> ServiceResult<CalvingOutcome> {
        ReproductionService::register_calving(self, calving)
    }

    fn logbook(&self, animal_id: i64) -> ServiceResult<Vec<LogEntry>> {
        ReproductionService::logbook(self, animal_id)
    }

    fn mark_empty(&self, animal_id: i64) -> ServiceResult<()> {
        ReproductionService::mark_empty(self, animal_id)
    }

    fn upcoming_calvings(&self) -> ServiceResult<Vec<PregnancyView>> {
        ReproductionService::upcoming_calvings(self)
    }

    fn pregnant_animals(&self) -> ServiceResult<Vec<PregnancyView>> {
        ReproductionService::pregnant_animals(self)
    }

    fn is_pregnant(&self, animal_id: i64) -> ServiceResult<bool> {
        ReproductionService::is_pregnant(self, animal_id)
    }

    fn has_service_on(&self, animal_id: i64, service_date: NaiveDate) -> ServiceResult<bool> {
        ReproductionService::has_service_on(self, animal_id, service_date)
    }

    fn load_farms(&self) -> ServiceResult<Vec<CatalogOption>> {
        ReproductionService::load_farms(self)
    }

    fn load_females(&self, farm_id: Option<i64>) -> ServiceResult<Vec<Animal>> {
        ReproductionService::load_females(self, farm_id)
    }

    fn load_males(&self, farm_id: Option<i64>) -> ServiceResult<Vec<Animal>> {
        ReproductionService::load_males(self, farm_id)
    }
}

impl<'a, G: Gateway + ?Sized, C: Clock> StatisticsContract for ReproductionService<'a, G, C> {
    type Stats = ReproductionStats;

    fn statistics(&self) -> ServiceResult<ReproductionStats> {
        ReproductionService::statistics(self)
    }
}

impl<'a, G: Gateway + ?Sized, C: Clock> HealthContract for HealthService<'a, G, C> {
    fn register_diagnosis(&self, input: &NewDiagnosis) -> ServiceResult<i64> {
        HealthService::register_diagnosis(self, input)
    }

    fn update_diagnosis_state(&self, diagnosis_id: i64, new_state: &str) -> ServiceResult<()> {
        HealthService::update_diagnosis_state(self, diagnosis_id, new_state)
    }

    fn register_treatment(&self, input: &NewTreatment) -> ServiceResult<i64> {
        HealthService::register_treatment(self, input)
    }

    fn upcoming_treatments(&self, limit: Option<u32>) -> ServiceResult<Vec<UpcomingTreatment>> {
        HealthService::upcoming_treatments(self, limit)
    }

    fn diagnosis_history(&self, limit: Option<u32>) -> ServiceResult<Vec<HealthDiagnosis>> {
        HealthService::diagnosis_history(self, limit)
    }

    fn treatment_history(&self, limit: Option<u32>) -> ServiceResult<Vec<HealthTreatment>> {
        HealthService::treatment_history(self, limit)
    }

    fn load_animals(&self) -> ServiceResult<Vec<Animal>> {
        HealthService::load_animals(self)
    }
}

impl<'a, G: Gateway + ?Sized, C: Clock> StatisticsContract for HealthService<'a, G, C> {
    type Stats = HealthStats;

    fn statistics(&self) -> ServiceResult<HealthStats> {
        HealthService::statistics(self)
    }
}
