//! Employee catalog.

use serde::{Deserialize, Serialize};

use super::{
    CatalogDescriptor, CatalogRecord, CatalogRow, EntityState, FieldRule, ParentLink, TextCase,
    UniquenessScope,
};

static EMPLOYEE_FIELDS: [FieldRule; 4] = [
    FieldRule::text("numero_identificacion").required().unique(),
    FieldRule::text("nombres").required(),
    FieldRule::text("apellidos").required(),
    FieldRule::text("cargo").required(),
];

pub static EMPLOYEE: CatalogDescriptor = CatalogDescriptor {
    name: "employee",
    table: "empleado",
    code_case: TextCase::Upper,
    label: "nombres",
    fields: &EMPLOYEE_FIELDS,
    parent: Some(ParentLink {
        table: "finca",
        column: "id_finca",
        required: false,
    }),
    scope: UniquenessScope::Global,
    order_by: "apellidos",
};

/// A farm worker. Unique by code and by national identification number.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Employee {
    pub id: Option<i64>,
    pub code: String,
    pub national_id: String,
    pub first_names: String,
    pub last_names: String,
    pub position: String,
    pub farm_id: Option<i64>,
    pub state: EntityState,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_names, self.last_names)
    }
}

impl CatalogRecord for Employee {
    fn descriptor() -> &'static CatalogDescriptor {
        &EMPLOYEE
    }

    fn to_row(&self) -> CatalogRow {
        CatalogRow::new(
            self.code.clone(),
            self.farm_id,
            vec![
                Some(self.national_id.clone()),
                Some(self.first_names.clone()),
                Some(self.last_names.clone()),
                Some(self.position.clone()),
            ],
        )
        .with_identity(self.id, self.state)
    }

    fn from_row(row: CatalogRow) -> Self {
        Self {
            id: row.id,
            national_id: row.text(0),
            first_names: row.text(1),
            last_names: row.text(2),
            position: row.text(3),
            farm_id: row.parent_id,
            state: row.state,
            code: row.code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_optional_farm_round_trip() {
        let employee = Employee {
            code: "E1".into(),
            national_id: "V-123".into(),
            first_names: "Ana".into(),
            last_names: "Pérez".into(),
            position: "Ordeñadora".into(),
            ..Default::default()
        };

        let row = employee.to_row();
        assert_eq!(row.parent_id, None);
        assert_eq!(Employee::from_row(row), employee);
        assert_eq!(employee.full_name(), "Ana Pérez");
    }

    #[test]
    fn test_national_id_is_secondary_unique() {
        let unique: Vec<_> = EMPLOYEE.fields.iter().filter(|f| f.unique).collect();
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].column, "numero_identificacion");
    }
}
