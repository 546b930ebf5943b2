//! Reproductive cycle models.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::Sex;

/// Default bovine gestation length.
pub const GESTATION_DAYS: i64 = 280;

text_enum! {
    pub enum ServiceType {
        Natural => "Monta Natural",
        Insemination => "Inseminación Artificial",
    }
}

text_enum! {
    /// Gestante is the only open state; the other two are terminal.
    pub enum ReproductiveState {
        Pregnant => "Gestante",
        Calved => "Parida",
        Empty => "Vacía",
    }
}

impl ReproductiveState {
    pub fn is_open(&self) -> bool {
        *self == ReproductiveState::Pregnant
    }
}

text_enum! {
    pub enum CalvingType {
        Normal => "Normal",
        Dystocic => "Distócico",
        Cesarean => "Cesárea",
        Abortion => "Aborto",
    }
}

text_enum! {
    pub enum OffspringStatus {
        Alive => "Vivo",
        StillBorn => "Muerto al nacer",
        DiedAfter => "Murió después",
    }
}

/// `date` moved by `days`, or `None` when it leaves chrono's calendar.
pub fn shift_date(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    Duration::try_days(days).and_then(|delta| date.checked_add_signed(delta))
}

/// Expected calving date for a service on `service_date`.
pub fn estimated_calving_date(service_date: NaiveDate, gestation_days: i64) -> Option<NaiveDate> {
    shift_date(service_date, gestation_days)
}

/// One service and its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReproductiveRecord {
    pub id: i64,
    pub animal_id: i64,
    pub sire_id: Option<i64>,
    pub service_date: NaiveDate,
    pub service_type: ServiceType,
    pub state: ReproductiveState,
    pub estimated_calving_date: NaiveDate,
    pub calving_date: Option<NaiveDate>,
    pub calving: Option<CalvingDetails>,
    pub notes: Option<String>,
}

/// What happened at calving, stored on the closed record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalvingDetails {
    pub calving_type: CalvingType,
    pub offspring_sex: Sex,
    pub offspring_weight: Option<f64>,
    pub offspring_status: OffspringStatus,
    pub offspring_id: Option<i64>,
}

/// Calving report as entered by the user. Enum fields are raw text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCalving {
    pub record_id: i64,
    pub date: NaiveDate,
    pub calving_type: String,
    pub offspring_sex: String,
    pub offspring_weight: Option<f64>,
    /// Defaults to alive.
    pub offspring_status: Option<String>,
    /// Register a live calf in the herd.
    pub register_offspring: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalvingOutcome {
    pub record_id: i64,
    pub offspring_id: Option<i64>,
    pub offspring_code: Option<String>,
}

/// Herd code for the calf after `last` (`A0001`, `A0002`, ...).
pub fn offspring_code(last: Option<i64>) -> String {
    format!("A{:04}", last.unwrap_or(0) + 1)
}

/// An open pregnancy with the figures derived from today's date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PregnancyView {
    pub record_id: i64,
    pub animal_id: i64,
    pub animal_code: String,
    pub animal_name: Option<String>,
    pub sire_code: Option<String>,
    pub service_date: NaiveDate,
    pub service_type: ServiceType,
    pub estimated_calving_date: NaiveDate,
    pub days_pregnant: i64,
    pub days_to_calving: i64,
}

impl PregnancyView {
    pub(crate) fn derive_days(mut self, today: NaiveDate) -> Self {
        self.days_pregnant = (today - self.service_date).num_days();
        self.days_to_calving = (self.estimated_calving_date - today).num_days();
        self
    }
}

/// Badge counters for the reproduction dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReproductionStats {
    pub pregnant: i64,
    pub due_soon: i64,
    pub inseminations: i64,
    pub natural_services: i64,
}
