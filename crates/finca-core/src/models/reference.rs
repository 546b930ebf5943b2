//! Global reference catalogs.

use serde::{Deserialize, Serialize};

use super::{
    CatalogDescriptor, CatalogRecord, CatalogRow, EntityState, FieldRule, HardDelete, TextCase,
    UniquenessScope,
};

pub const CATTLE_TYPES: &[&str] = &["Lechero", "Carne", "Doble Propósito", "Registro"];

pub const DEATH_CAUSE_TYPES: &[&str] = &[
    "Enfermedad",
    "Accidente",
    "Natural",
    "Sacrificio",
    "Depredación",
    "Otros",
];

pub const DIAGNOSIS_TYPES: &[&str] = &["Reproductivo", "No Reproductivo"];

pub const PROVENANCE_TYPES: &[&str] = &[
    "Granja",
    "Centro Acopio",
    "Importación",
    "Producción Interna",
    "Otros",
];

pub const CONDITION_SCALES: &[&str] = &["1-5", "1-9", "1-10", "A-E", "Otra"];

pub const SPECIES: &[&str] = &[
    "Bovino", "Porcino", "Ovino", "Caprino", "Equino", "Aves", "Todos",
];

pub const EXPLOITATION_CATEGORIES: &[&str] = &[
    "Carne",
    "Leche",
    "Doble Propósito",
    "Reproducción",
    "Huevos",
    "Otros",
];

const fn global(
    name: &'static str,
    table: &'static str,
    code_case: TextCase,
    label: &'static str,
    fields: &'static [FieldRule],
) -> CatalogDescriptor {
    CatalogDescriptor {
        name,
        table,
        code_case,
        label,
        fields,
        parent: None,
        scope: UniquenessScope::Global,
        order_by: "codigo",
    }
}

static BREED_FIELDS: [FieldRule; 4] = [
    FieldRule::text("nombre").required().title(),
    FieldRule::text("tipo_ganado").title().one_of(CATTLE_TYPES),
    FieldRule::text("especie"),
    FieldRule::text("descripcion"),
];

pub static BREED: CatalogDescriptor =
    global("breed", "raza", TextCase::Upper, "nombre", &BREED_FIELDS);

static DEATH_CAUSE_FIELDS: [FieldRule; 3] = [
    FieldRule::text("descripcion").required(),
    FieldRule::text("tipo_causa").one_of(DEATH_CAUSE_TYPES),
    FieldRule::text("comentario"),
];

pub static DEATH_CAUSE: CatalogDescriptor = global(
    "death cause",
    "causa_muerte",
    TextCase::Preserve,
    "descripcion",
    &DEATH_CAUSE_FIELDS,
);

static DIAGNOSIS_FIELDS: [FieldRule; 3] = [
    FieldRule::text("descripcion").required(),
    FieldRule::text("tipo_diagnostico").one_of(DIAGNOSIS_TYPES),
    FieldRule::text("comentario"),
];

pub static DIAGNOSIS_CATALOG: CatalogDescriptor = global(
    "diagnosis",
    "diagnostico_veterinario",
    TextCase::Preserve,
    "descripcion",
    &DIAGNOSIS_FIELDS,
);

static SALE_REASON_FIELDS: [FieldRule; 2] = [
    FieldRule::text("descripcion").required(),
    FieldRule::text("comentario"),
];

pub static SALE_REASON: CatalogDescriptor = global(
    "sale reason",
    "motivo_venta",
    TextCase::Preserve,
    "descripcion",
    &SALE_REASON_FIELDS,
);

static PROVENANCE_FIELDS: [FieldRule; 4] = [
    FieldRule::text("descripcion").required(),
    FieldRule::text("tipo_procedencia").one_of(PROVENANCE_TYPES),
    FieldRule::text("ubicacion"),
    FieldRule::text("comentario"),
];

pub static PROVENANCE: CatalogDescriptor = global(
    "provenance",
    "procedencia",
    TextCase::Preserve,
    "descripcion",
    &PROVENANCE_FIELDS,
);

static BODY_CONDITION_FIELDS: [FieldRule; 5] = [
    FieldRule::text("descripcion").required(),
    FieldRule::text("escala").one_of(CONDITION_SCALES),
    FieldRule::text("especie").one_of(SPECIES),
    FieldRule::text("caracteristicas"),
    FieldRule::text("recomendaciones"),
];

pub static BODY_CONDITION: CatalogDescriptor = global(
    "body condition",
    "condicion_corporal",
    TextCase::Preserve,
    "descripcion",
    &BODY_CONDITION_FIELDS,
);

static EXPLOITATION_FIELDS: [FieldRule; 3] = [
    FieldRule::text("descripcion").required().title(),
    FieldRule::text("categoria")
        .required()
        .title()
        .one_of(EXPLOITATION_CATEGORIES),
    FieldRule::text("comentario"),
];

pub static EXPLOITATION_TYPE: CatalogDescriptor = global(
    "exploitation type",
    "tipo_explotacion",
    TextCase::Upper,
    "descripcion",
    &EXPLOITATION_FIELDS,
);

static QUALITY_FIELDS: [FieldRule; 2] = [
    FieldRule::text("descripcion").required(),
    FieldRule::text("comentario"),
];

pub static ANIMAL_QUALITY: CatalogDescriptor = global(
    "animal quality",
    "calidad_animal",
    TextCase::Upper,
    "descripcion",
    &QUALITY_FIELDS,
);

/// Breed of livestock.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Breed {
    pub id: Option<i64>,
    pub code: String,
    pub name: String,
    pub cattle_type: Option<String>,
    pub species: Option<String>,
    pub description: Option<String>,
    pub state: EntityState,
}

impl CatalogRecord for Breed {
    fn descriptor() -> &'static CatalogDescriptor {
        &BREED
    }

    fn to_row(&self) -> CatalogRow {
        CatalogRow::new(
            self.code.clone(),
            None,
            vec![
                Some(self.name.clone()),
                self.cattle_type.clone(),
                self.species.clone(),
                self.description.clone(),
            ],
        )
        .with_identity(self.id, self.state)
    }

    fn from_row(row: CatalogRow) -> Self {
        Self {
            id: row.id,
            name: row.text(0),
            cattle_type: row.optional(1),
            species: row.optional(2),
            description: row.optional(3),
            state: row.state,
            code: row.code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeathCause {
    pub id: Option<i64>,
    pub code: String,
    pub description: String,
    pub cause_type: Option<String>,
    pub comment: Option<String>,
    pub state: EntityState,
}

impl CatalogRecord for DeathCause {
    fn descriptor() -> &'static CatalogDescriptor {
        &DEATH_CAUSE
    }

    fn to_row(&self) -> CatalogRow {
        CatalogRow::new(
            self.code.clone(),
            None,
            vec![
                Some(self.description.clone()),
                self.cause_type.clone(),
                self.comment.clone(),
            ],
        )
        .with_identity(self.id, self.state)
    }

    fn from_row(row: CatalogRow) -> Self {
        Self {
            id: row.id,
            description: row.text(0),
            cause_type: row.optional(1),
            comment: row.optional(2),
            state: row.state,
            code: row.code,
        }
    }
}

/// Veterinary diagnosis available for health events.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiagnosisCatalog {
    pub id: Option<i64>,
    pub code: String,
    pub description: String,
    pub diagnosis_type: Option<String>,
    pub comment: Option<String>,
    pub state: EntityState,
}

impl CatalogRecord for DiagnosisCatalog {
    fn descriptor() -> &'static CatalogDescriptor {
        &DIAGNOSIS_CATALOG
    }

    fn to_row(&self) -> CatalogRow {
        CatalogRow::new(
            self.code.clone(),
            None,
            vec![
                Some(self.description.clone()),
                self.diagnosis_type.clone(),
                self.comment.clone(),
            ],
        )
        .with_identity(self.id, self.state)
    }

    fn from_row(row: CatalogRow) -> Self {
        Self {
            id: row.id,
            description: row.text(0),
            diagnosis_type: row.optional(1),
            comment: row.optional(2),
            state: row.state,
            code: row.code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SaleReason {
    pub id: Option<i64>,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub state: EntityState,
}

impl SaleReason {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            ..Default::default()
        }
    }
}

impl CatalogRecord for SaleReason {
    fn descriptor() -> &'static CatalogDescriptor {
        &SALE_REASON
    }

    fn to_row(&self) -> CatalogRow {
        CatalogRow::new(
            self.code.clone(),
            None,
            vec![Some(self.description.clone()), self.comment.clone()],
        )
        .with_identity(self.id, self.state)
    }

    fn from_row(row: CatalogRow) -> Self {
        Self {
            id: row.id,
            description: row.text(0),
            comment: row.optional(1),
            state: row.state,
            code: row.code,
        }
    }
}

/// Where purchased animals come from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Provenance {
    pub id: Option<i64>,
    pub code: String,
    pub description: String,
    pub provenance_type: Option<String>,
    pub location: Option<String>,
    pub comment: Option<String>,
    pub state: EntityState,
}

impl CatalogRecord for Provenance {
    fn descriptor() -> &'static CatalogDescriptor {
        &PROVENANCE
    }

    fn to_row(&self) -> CatalogRow {
        CatalogRow::new(
            self.code.clone(),
            None,
            vec![
                Some(self.description.clone()),
                self.provenance_type.clone(),
                self.location.clone(),
                self.comment.clone(),
            ],
        )
        .with_identity(self.id, self.state)
    }

    fn from_row(row: CatalogRow) -> Self {
        Self {
            id: row.id,
            description: row.text(0),
            provenance_type: row.optional(1),
            location: row.optional(2),
            comment: row.optional(3),
            state: row.state,
            code: row.code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BodyCondition {
    pub id: Option<i64>,
    pub code: String,
    pub description: String,
    pub scale: Option<String>,
    pub species: Option<String>,
    pub traits: Option<String>,
    pub recommendations: Option<String>,
    pub state: EntityState,
}

impl CatalogRecord for BodyCondition {
    fn descriptor() -> &'static CatalogDescriptor {
        &BODY_CONDITION
    }

    fn to_row(&self) -> CatalogRow {
        CatalogRow::new(
            self.code.clone(),
            None,
            vec![
                Some(self.description.clone()),
                self.scale.clone(),
                self.species.clone(),
                self.traits.clone(),
                self.recommendations.clone(),
            ],
        )
        .with_identity(self.id, self.state)
    }

    fn from_row(row: CatalogRow) -> Self {
        Self {
            id: row.id,
            description: row.text(0),
            scale: row.optional(1),
            species: row.optional(2),
            traits: row.optional(3),
            recommendations: row.optional(4),
            state: row.state,
            code: row.code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExploitationType {
    pub id: Option<i64>,
    pub code: String,
    pub description: String,
    pub category: String,
    pub comment: Option<String>,
    pub state: EntityState,
}

impl CatalogRecord for ExploitationType {
    fn descriptor() -> &'static CatalogDescriptor {
        &EXPLOITATION_TYPE
    }

    fn to_row(&self) -> CatalogRow {
        CatalogRow::new(
            self.code.clone(),
            None,
            vec![
                Some(self.description.clone()),
                Some(self.category.clone()),
                self.comment.clone(),
            ],
        )
        .with_identity(self.id, self.state)
    }

    fn from_row(row: CatalogRow) -> Self {
        Self {
            id: row.id,
            description: row.text(0),
            category: row.text(1),
            comment: row.optional(2),
            state: row.state,
            code: row.code,
        }
    }
}

/// Quality grade of an animal. The only catalog that can be hard deleted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnimalQuality {
    pub id: Option<i64>,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub state: EntityState,
}

impl CatalogRecord for AnimalQuality {
    fn descriptor() -> &'static CatalogDescriptor {
        &ANIMAL_QUALITY
    }

    fn to_row(&self) -> CatalogRow {
        CatalogRow::new(
            self.code.clone(),
            None,
            vec![Some(self.description.clone()), self.comment.clone()],
        )
        .with_identity(self.id, self.state)
    }

    fn from_row(row: CatalogRow) -> Self {
        Self {
            id: row.id,
            description: row.text(0),
            comment: row.optional(1),
            state: row.state,
            code: row.code,
        }
    }
}

impl HardDelete for AnimalQuality {}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_layout<T: CatalogRecord + Default>() {
        let row = T::default().to_row();
        assert_eq!(
            row.values.len(),
            T::descriptor().fields.len(),
            "{} row width",
            T::descriptor().name
        );
    }

    #[test]
    fn test_row_widths_match_descriptors() {
        assert_layout::<Breed>();
        assert_layout::<DeathCause>();
        assert_layout::<DiagnosisCatalog>();
        assert_layout::<SaleReason>();
        assert_layout::<Provenance>();
        assert_layout::<BodyCondition>();
        assert_layout::<ExploitationType>();
        assert_layout::<AnimalQuality>();
    }

    #[test]
    fn test_all_reference_catalogs_are_global() {
        for descriptor in [
            &BREED,
            &DEATH_CAUSE,
            &DIAGNOSIS_CATALOG,
            &SALE_REASON,
            &PROVENANCE,
            &BODY_CONDITION,
            &EXPLOITATION_TYPE,
            &ANIMAL_QUALITY,
        ] {
            assert_eq!(descriptor.scope, UniquenessScope::Global);
            assert!(descriptor.parent.is_none());
        }
    }

    #[test]
    fn test_exploitation_category_is_required_and_enumerated() {
        let rule = EXPLOITATION_TYPE.fields[1];
        assert!(rule.required);
        assert_eq!(rule.case, TextCase::Title);
        assert!(rule.allowed.unwrap().contains(&"Doble Propósito"));
    }
}
