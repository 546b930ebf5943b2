//! Animal model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::EntityState;

text_enum! {
    pub enum Sex {
        Male => "Macho",
        Female => "Hembra",
    }
}

/// An animal of the herd.
///
/// The herd module owns animal registration. Lifecycle services read animals to
/// check existence and activity, and register calves born on the farm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animal {
    pub id: Option<i64>,
    pub code: String,
    pub name: Option<String>,
    pub sex: Sex,
    pub farm_id: Option<i64>,
    pub mother_id: Option<i64>,
    pub birth_date: Option<NaiveDate>,
    pub state: EntityState,
}

impl Animal {
    pub fn new(code: impl Into<String>, sex: Sex) -> Self {
        Self {
            id: None,
            code: code.into(),
            name: None,
            sex,
            farm_id: None,
            mother_id: None,
            birth_date: None,
            state: EntityState::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == EntityState::Active
    }

    /// Code and name, as shown in selection lists.
    pub fn display_label(&self) -> String {
        match &self.name {
            Some(name) => format!("{} - {}", self.code, name),
            None => self.code.clone(),
        }
    }
}

/// Logbook entry kinds written by the lifecycle services.
pub const LOG_KIND_REPRODUCTION: &str = "Reproducción";
pub const LOG_KIND_CALVING: &str = "Parto";

/// One line of an animal's logbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    pub animal_id: i64,
    pub date: NaiveDate,
    pub kind: String,
    pub note: String,
    pub author: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_label() {
        let mut animal = Animal::new("V-001", Sex::Female);
        assert_eq!(animal.display_label(), "V-001");

        animal.name = Some("Lucera".into());
        assert_eq!(animal.display_label(), "V-001 - Lucera");
        assert!(animal.is_active());
    }
}
