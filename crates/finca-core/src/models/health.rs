//! Health event models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

text_enum! {
    pub enum Severity {
        Mild => "Leve",
        Moderate => "Moderada",
        Severe => "Grave",
        Critical => "Crítica",
    }
}

text_enum! {
    /// Flat machine: any state may follow any other.
    pub enum DiagnosisState {
        Active => "Activo",
        InTreatment => "En Tratamiento",
        Recovered => "Recuperado",
        Chronic => "Crónico",
    }
}

impl Default for DiagnosisState {
    fn default() -> Self {
        DiagnosisState::Active
    }
}

text_enum! {
    pub enum TreatmentType {
        Vaccination => "Vacunación",
        Deworming => "Desparasitación",
        Antibiotic => "Antibiótico",
        Vitamins => "Vitaminas",
        Minerals => "Minerales",
        Surgery => "Cirugía",
        Other => "Otro",
    }
}

/// A recorded diagnosis for one animal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthDiagnosis {
    pub id: i64,
    pub animal_id: i64,
    pub date: NaiveDate,
    pub kind: String,
    pub detail: String,
    pub severity: Severity,
    pub state: DiagnosisState,
    pub notes: Option<String>,
}

/// Diagnosis input. Enumerated fields arrive as text and are validated by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDiagnosis {
    pub animal_id: i64,
    pub date: NaiveDate,
    pub kind: String,
    pub detail: String,
    pub severity: String,
    /// Defaults to "Activo".
    pub state: Option<String>,
    pub notes: Option<String>,
}

/// A treatment applied to one animal. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthTreatment {
    pub id: i64,
    pub animal_id: i64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub treatment_type: TreatmentType,
    pub product: String,
    pub dose: Option<String>,
    pub veterinarian: Option<String>,
    pub comment: Option<String>,
    pub next_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTreatment {
    pub animal_id: i64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub treatment_type: String,
    pub product: String,
    pub dose: Option<String>,
    pub veterinarian: Option<String>,
    pub comment: Option<String>,
    pub next_date: Option<NaiveDate>,
}

/// A scheduled follow-up treatment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingTreatment {
    pub treatment_id: i64,
    pub animal_id: i64,
    pub animal_code: String,
    pub treatment_type: TreatmentType,
    pub product: String,
    pub next_date: NaiveDate,
}

/// Badge counters for the health dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HealthStats {
    pub active_diagnoses: i64,
    pub treatments: i64,
    pub upcoming_treatments: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnosis_states() {
        assert_eq!(DiagnosisState::ALLOWED.len(), 4);
        assert_eq!(DiagnosisState::parse("Curado"), None);
        assert_eq!(
            DiagnosisState::parse("En Tratamiento"),
            Some(DiagnosisState::InTreatment)
        );
        assert_eq!(DiagnosisState::default(), DiagnosisState::Active);
    }

    #[test]
    fn test_treatment_type_serde() {
        let json = serde_json::to_string(&TreatmentType::Deworming).unwrap();
        assert_eq!(json, "\"Desparasitación\"");
    }
}
