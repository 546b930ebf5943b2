//! Farms and the catalogs scoped to a farm.

use serde::{Deserialize, Serialize};

use super::{
    CatalogDescriptor, CatalogRecord, CatalogRow, EntityState, FieldRule, ParentLink, TextCase,
    UniquenessScope,
};

/// Grouping criteria accepted for lots.
pub const LOT_CRITERIA: &[&str] = &[
    "Por Peso",
    "Por Edad",
    "Por Origen",
    "Por Salud",
    "Por Producción",
    "Personalizado",
];

const FARM_PARENT: ParentLink = ParentLink {
    table: "finca",
    column: "finca_id",
    required: true,
};

static FARM_FIELDS: [FieldRule; 3] = [
    FieldRule::text("nombre").required().title(),
    FieldRule::text("ubicacion").required().title(),
    FieldRule::text("propietario"),
];

pub static FARM: CatalogDescriptor = CatalogDescriptor {
    name: "farm",
    table: "finca",
    code_case: TextCase::Upper,
    label: "nombre",
    fields: &FARM_FIELDS,
    parent: None,
    scope: UniquenessScope::Global,
    order_by: "nombre",
};

static SECTOR_FIELDS: [FieldRule; 2] = [
    FieldRule::text("nombre").required().title(),
    FieldRule::text("comentario"),
];

pub static SECTOR: CatalogDescriptor = CatalogDescriptor {
    name: "sector",
    table: "sector",
    code_case: TextCase::Upper,
    label: "nombre",
    fields: &SECTOR_FIELDS,
    parent: Some(FARM_PARENT),
    scope: UniquenessScope::PerParent,
    order_by: "codigo",
};

static LOT_FIELDS: [FieldRule; 3] = [
    FieldRule::text("nombre").required().title(),
    FieldRule::text("descripcion"),
    FieldRule::text("criterio")
        .one_of(LOT_CRITERIA)
        .or_default("Por Peso"),
];

pub static LOT: CatalogDescriptor = CatalogDescriptor {
    name: "lot",
    table: "lote",
    code_case: TextCase::Upper,
    label: "nombre",
    fields: &LOT_FIELDS,
    parent: Some(FARM_PARENT),
    scope: UniquenessScope::PerParent,
    order_by: "codigo",
};

/// A farm, the parent of sectors, lots and optionally employees.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Farm {
    pub id: Option<i64>,
    pub code: String,
    pub name: String,
    pub location: String,
    pub owner: Option<String>,
    pub state: EntityState,
}

impl Farm {
    pub fn new(code: impl Into<String>, name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            location: location.into(),
            ..Default::default()
        }
    }
}

impl CatalogRecord for Farm {
    fn descriptor() -> &'static CatalogDescriptor {
        &FARM
    }

    fn to_row(&self) -> CatalogRow {
        CatalogRow::new(
            self.code.clone(),
            None,
            vec![
                Some(self.name.clone()),
                Some(self.location.clone()),
                self.owner.clone(),
            ],
        )
        .with_identity(self.id, self.state)
    }

    fn from_row(row: CatalogRow) -> Self {
        Self {
            id: row.id,
            name: row.text(0),
            location: row.text(1),
            owner: row.optional(2),
            state: row.state,
            code: row.code,
        }
    }
}

/// A physical area inside one farm.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sector {
    pub id: Option<i64>,
    pub code: String,
    pub farm_id: i64,
    pub name: String,
    pub comment: Option<String>,
    pub state: EntityState,
}

impl Sector {
    pub fn new(farm_id: i64, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            farm_id,
            code: code.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

impl CatalogRecord for Sector {
    fn descriptor() -> &'static CatalogDescriptor {
        &SECTOR
    }

    fn to_row(&self) -> CatalogRow {
        CatalogRow::new(
            self.code.clone(),
            Some(self.farm_id),
            vec![Some(self.name.clone()), self.comment.clone()],
        )
        .with_identity(self.id, self.state)
    }

    fn from_row(row: CatalogRow) -> Self {
        Self {
            id: row.id,
            farm_id: row.parent_id.unwrap_or_default(),
            name: row.text(0),
            comment: row.optional(1),
            state: row.state,
            code: row.code,
        }
    }
}

/// A group of animals inside one farm.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Lot {
    pub id: Option<i64>,
    pub code: String,
    pub farm_id: i64,
    pub name: String,
    pub description: Option<String>,
    /// One of [`LOT_CRITERIA`]; "Por Peso" when left empty.
    pub criterion: Option<String>,
    pub state: EntityState,
}

impl Lot {
    pub fn new(farm_id: i64, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            farm_id,
            code: code.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

impl CatalogRecord for Lot {
    fn descriptor() -> &'static CatalogDescriptor {
        &LOT
    }

    fn to_row(&self) -> CatalogRow {
        CatalogRow::new(
            self.code.clone(),
            Some(self.farm_id),
            vec![
                Some(self.name.clone()),
                self.description.clone(),
                self.criterion.clone(),
            ],
        )
        .with_identity(self.id, self.state)
    }

    fn from_row(row: CatalogRow) -> Self {
        Self {
            id: row.id,
            farm_id: row.parent_id.unwrap_or_default(),
            name: row.text(0),
            description: row.optional(1),
            criterion: row.optional(2),
            state: row.state,
            code: row.code,
        }
    }
}
