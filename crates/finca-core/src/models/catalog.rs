//! Catalog engine models.
//!
//! Every reference-data domain is described by a static [`CatalogDescriptor`]. The
//! generic repository and service read the descriptor to build SQL, normalize input
//! and pick the uniqueness scope, so a domain only contributes a typed struct and
//! its field table.

use serde::{Deserialize, Serialize};
use std::fmt;

text_enum! {
    /// Soft-delete state shared by every catalog.
    pub enum EntityState {
        Active => "Activo",
        Inactive => "Inactivo",
    }
}

impl Default for EntityState {
    fn default() -> Self {
        EntityState::Active
    }
}

/// Casing policy applied after trimming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextCase {
    Preserve,
    Upper,
    Title,
}

/// Normalization and validation rule for one descriptive column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub column: &'static str,
    pub case: TextCase,
    pub required: bool,
    pub allowed: Option<&'static [&'static str]>,
    pub default: Option<&'static str>,
    /// Secondary unique column, pre-checked like the code.
    pub unique: bool,
}

impl FieldRule {
    /// Optional free text kept as typed.
    pub const fn text(column: &'static str) -> Self {
        Self {
            column,
            case: TextCase::Preserve,
            required: false,
            allowed: None,
            default: None,
            unique: false,
        }
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    pub const fn title(self) -> Self {
        Self {
            case: TextCase::Title,
            ..self
        }
    }

    pub const fn one_of(self, allowed: &'static [&'static str]) -> Self {
        Self {
            allowed: Some(allowed),
            ..self
        }
    }

    pub const fn or_default(self, default: &'static str) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }

    pub const fn unique(self) -> Self {
        Self {
            unique: true,
            ..self
        }
    }
}

/// Where a code must be unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniquenessScope {
    Global,
    /// Unique among the rows sharing one parent.
    PerParent,
}

/// Reference from a catalog row to its owning farm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentLink {
    pub table: &'static str,
    pub column: &'static str,
    pub required: bool,
}

/// Static description of one catalog domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogDescriptor {
    /// Human-readable domain name, used in errors and logs.
    pub name: &'static str,
    pub table: &'static str,
    pub code_case: TextCase,
    /// Column shown next to the code in option lists.
    pub label: &'static str,
    pub fields: &'static [FieldRule],
    pub parent: Option<ParentLink>,
    pub scope: UniquenessScope,
    pub order_by: &'static str,
}

impl CatalogDescriptor {
    /// Position of a column within `fields`.
    pub fn field_index(&self, column: &str) -> Option<usize> {
        self.fields.iter().position(|rule| rule.column == column)
    }

    pub fn is_per_parent(&self) -> bool {
        self.scope == UniquenessScope::PerParent
    }
}

/// Untyped catalog row, laid out in descriptor field order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogRow {
    pub id: Option<i64>,
    pub code: String,
    pub parent_id: Option<i64>,
    pub values: Vec<Option<String>>,
    pub state: EntityState,
}

impl CatalogRow {
    pub fn new(code: impl Into<String>, parent_id: Option<i64>, values: Vec<Option<String>>) -> Self {
        Self {
            id: None,
            code: code.into(),
            parent_id,
            values,
            state: EntityState::Active,
        }
    }

    pub fn with_identity(mut self, id: Option<i64>, state: EntityState) -> Self {
        self.id = id;
        self.state = state;
        self
    }

    /// Value at `index`, empty when absent.
    pub fn text(&self, index: usize) -> String {
        self.optional(index).unwrap_or_default()
    }

    pub fn optional(&self, index: usize) -> Option<String> {
        self.values.get(index).cloned().flatten()
    }
}

/// A typed catalog entry that maps onto its descriptor.
pub trait CatalogRecord: Clone + fmt::Debug {
    fn descriptor() -> &'static CatalogDescriptor;

    fn to_row(&self) -> CatalogRow;

    fn from_row(row: CatalogRow) -> Self;
}

/// Catalogs whose rows may be physically removed.
pub trait HardDelete: CatalogRecord {}

/// Addresses one catalog row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKey {
    Id(i64),
    /// Code within a global scope.
    Code(String),
    /// Code within one parent.
    Scoped { parent_id: i64, code: String },
}

impl From<i64> for RecordKey {
    fn from(id: i64) -> Self {
        RecordKey::Id(id)
    }
}

impl From<&str> for RecordKey {
    fn from(code: &str) -> Self {
        RecordKey::Code(code.to_string())
    }
}

impl From<String> for RecordKey {
    fn from(code: String) -> Self {
        RecordKey::Code(code)
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Id(id) => write!(f, "id {id}"),
            RecordKey::Code(code) => write!(f, "code {code}"),
            RecordKey::Scoped { parent_id, code } => write!(f, "code {code} in parent {parent_id}"),
        }
    }
}

/// Entry for populating a selection list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogOption {
    pub id: i64,
    pub code: String,
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_state_text() {
        assert_eq!(EntityState::Active.as_str(), "Activo");
        assert_eq!(EntityState::parse("Inactivo"), Some(EntityState::Inactive));
        assert_eq!(EntityState::parse("inactivo"), None);
        assert_eq!(EntityState::ALLOWED, &["Activo", "Inactivo"]);
    }

    #[test]
    fn test_entity_state_serde_uses_stored_text() {
        let json = serde_json::to_string(&EntityState::Inactive).unwrap();
        assert_eq!(json, "\"Inactivo\"");
        let parsed: EntityState = serde_json::from_str("\"Activo\"").unwrap();
        assert_eq!(parsed, EntityState::Active);
    }

    #[test]
    fn test_field_rule_builders() {
        const RULE: FieldRule = FieldRule::text("criterio")
            .one_of(&["Por Peso", "Por Edad"])
            .or_default("Por Peso")
            .title();

        assert_eq!(RULE.case, TextCase::Title);
        assert!(!RULE.required);
        assert_eq!(RULE.default, Some("Por Peso"));
        assert_eq!(RULE.allowed.map(|a| a.len()), Some(2));
    }

    #[test]
    fn test_row_accessors() {
        let row = CatalogRow::new("X", None, vec![Some("a".into()), None]);
        assert_eq!(row.text(0), "a");
        assert_eq!(row.text(1), "");
        assert_eq!(row.optional(5), None);
        assert_eq!(row.state, EntityState::Active);
    }

    #[test]
    fn test_record_key_conversions() {
        assert_eq!(RecordKey::from(4), RecordKey::Id(4));
        assert_eq!(RecordKey::from("ab"), RecordKey::Code("ab".into()));
        assert_eq!(
            RecordKey::Scoped { parent_id: 1, code: "L1".into() }.to_string(),
            "code L1 in parent 1"
        );
    }
}
