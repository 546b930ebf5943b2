//! Animal repository.

use chrono::NaiveDate;
use rusqlite::types::Value;

use super::{date, opt_date, opt_text, text, DbError, DbResult, Gateway, Row, CODE_COLLATION};
use crate::models::{Animal, EntityState, LogEntry, Sex};

const ANIMAL_COLUMNS: &str =
    "a.id, a.codigo, a.nombre, a.sexo, a.id_finca, a.id_madre, a.fecha_nacimiento, a.estado";

/// Read access to the herd, plus an insert for seeding.
pub struct AnimalRepository<'a, G: Gateway + ?Sized> {
    db: &'a G,
}

impl<'a, G: Gateway + ?Sized> AnimalRepository<'a, G> {
    pub fn new(db: &'a G) -> Self {
        Self { db }
    }

    fn decode(row: &Row) -> DbResult<Animal> {
        Ok(Animal {
            id: Some(row.get("id")?),
            code: row.get("codigo")?,
            name: row.get("nombre")?,
            sex: row.get("sexo")?,
            farm_id: row.get("id_finca")?,
            mother_id: row.get("id_madre")?,
            birth_date: row.get("fecha_nacimiento")?,
            state: row.get("estado")?,
        })
    }

    fn list(&self, sql: &str, params: &[Value]) -> DbResult<Vec<Animal>> {
        self.db
            .query(sql, params)?
            .iter()
            .map(Self::decode)
            .collect()
    }

    pub fn insert(&self, animal: &Animal) -> DbResult<i64> {
        let rows = self.db.query(
            "INSERT INTO animal (codigo, nombre, sexo, id_finca, id_madre, fecha_nacimiento, estado)
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
            &[
                text(&animal.code),
                opt_text(animal.name.as_deref()),
                animal.sex.into(),
                animal.farm_id.map_or(Value::Null, Value::Integer),
                animal.mother_id.map_or(Value::Null, Value::Integer),
                opt_date(animal.birth_date),
                animal.state.into(),
            ],
        )?;
        match rows.first() {
            Some(row) => row.get("id"),
            None => Err(DbError::MissingColumn("id".to_string())),
        }
    }

    pub fn get(&self, id: i64) -> DbResult<Option<Animal>> {
        let sql = format!("SELECT {ANIMAL_COLUMNS} FROM animal a WHERE a.id = ?");
        Ok(self.list(&sql, &[Value::Integer(id)])?.into_iter().next())
    }

    pub fn find_by_code(&self, code: &str) -> DbResult<Option<Animal>> {
        let sql = format!("SELECT {ANIMAL_COLUMNS} FROM animal a WHERE a.codigo = ?");
        Ok(self.list(&sql, &[text(code)])?.into_iter().next())
    }

    pub fn list_active(&self) -> DbResult<Vec<Animal>> {
        let sql = format!(
            "SELECT {ANIMAL_COLUMNS} FROM animal a WHERE a.estado = ? ORDER BY a.codigo"
        );
        self.list(&sql, &[EntityState::Active.into()])
    }

    /// Active animals of one sex, optionally restricted to a farm.
    pub fn list_by_sex(&self, sex: Sex, farm_id: Option<i64>) -> DbResult<Vec<Animal>> {
        match farm_id {
            Some(farm_id) => {
                let sql = format!(
                    "SELECT {ANIMAL_COLUMNS} FROM animal a
                     WHERE a.estado = ? AND a.sexo = ? AND a.id_finca = ?
                     ORDER BY a.codigo"
                );
                self.list(
                    &sql,
                    &[EntityState::Active.into(), sex.into(), Value::Integer(farm_id)],
                )
            }
            None => {
                let sql = format!(
                    "SELECT {ANIMAL_COLUMNS} FROM animal a
                     WHERE a.estado = ? AND a.sexo = ?
                     ORDER BY a.codigo"
                );
                self.list(&sql, &[EntityState::Active.into(), sex.into()])
            }
        }
    }

    /// Active animals of the active farm with this name, ignoring case.
    pub fn list_active_by_farm_name(&self, farm_name: &str) -> DbResult<Vec<Animal>> {
        let sql = format!(
            "SELECT {ANIMAL_COLUMNS} FROM animal a
             JOIN finca f ON f.id = a.id_finca
             WHERE f.nombre = ? COLLATE {CODE_COLLATION} AND f.estado = ? AND a.estado = ?
             ORDER BY a.codigo"
        );
        self.list(
            &sql,
            &[
                text(farm_name),
                EntityState::Active.into(),
                EntityState::Active.into(),
            ],
        )
    }

    /// Highest number among codes shaped like `A0001`, if any.
    pub fn last_offspring_number(&self) -> DbResult<Option<i64>> {
        match self
            .db
            .query(
                "SELECT MAX(CAST(SUBSTR(codigo, 2) AS INTEGER)) AS n FROM animal
                 WHERE codigo GLOB 'A[0-9]*'",
                &[],
            )?
            .first()
        {
            Some(row) => row.get("n"),
            None => Ok(None),
        }
    }

    pub fn insert_log_entry(
        &self,
        animal_id: i64,
        entry_date: NaiveDate,
        kind: &str,
        note: &str,
    ) -> DbResult<i64> {
        let rows = self.db.query(
            "INSERT INTO comentario (id_animal, fecha, tipo, nota) VALUES (?, ?, ?, ?) RETURNING id",
            &[
                Value::Integer(animal_id),
                date(entry_date),
                text(kind),
                text(note),
            ],
        )?;
        match rows.first() {
            Some(row) => row.get("id"),
            None => Err(DbError::MissingColumn("id".to_string())),
        }
    }

    /// Logbook of one animal, newest first.
    pub fn list_log_entries(&self, animal_id: i64) -> DbResult<Vec<LogEntry>> {
        self.db
            .query(
                "SELECT id, id_animal, fecha, tipo, nota, autor FROM comentario
                 WHERE id_animal = ? ORDER BY fecha DESC, id DESC",
                &[Value::Integer(animal_id)],
            )?
            .iter()
            .map(|row| {
                Ok(LogEntry {
                    id: row.get("id")?,
                    animal_id: row.get("id_animal")?,
                    date: row.get("fecha")?,
                    kind: row.get("tipo")?,
                    note: row.get("nota")?,
                    author: row.get("autor")?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{CatalogRepository, Database};
    use crate::models::{CatalogRecord, Farm};

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let db = setup_db();
        let repo = AnimalRepository::new(&db);

        let mut animal = Animal::new("V-001", Sex::Female);
        animal.name = Some("Lucera".into());
        let id = repo.insert(&animal).unwrap();

        let stored = repo.get(id).unwrap().unwrap();
        assert_eq!(stored.code, "V-001");
        assert_eq!(stored.sex, Sex::Female);
        assert_eq!(stored.name.as_deref(), Some("Lucera"));
        assert!(stored.is_active());

        assert_eq!(repo.find_by_code("v-001").unwrap().unwrap().id, Some(id));
        assert!(repo.get(id + 1).unwrap().is_none());
    }

    #[test]
    fn test_list_by_sex_and_farm() {
        let db = setup_db();
        let farm = CatalogRepository::<_, Farm>::new(&db)
            .create(&Farm::new("F1", "El Roble", "Llano").to_row())
            .unwrap();
        let repo = AnimalRepository::new(&db);

        let mut cow = Animal::new("V1", Sex::Female);
        cow.farm_id = Some(farm);
        repo.insert(&cow).unwrap();
        repo.insert(&Animal::new("V2", Sex::Female)).unwrap();
        repo.insert(&Animal::new("T1", Sex::Male)).unwrap();

        let mut retired = Animal::new("V3", Sex::Female);
        retired.state = EntityState::Inactive;
        repo.insert(&retired).unwrap();

        assert_eq!(repo.list_by_sex(Sex::Female, None).unwrap().len(), 2);
        assert_eq!(repo.list_by_sex(Sex::Female, Some(farm)).unwrap().len(), 1);
        assert_eq!(repo.list_by_sex(Sex::Male, None).unwrap().len(), 1);
        assert_eq!(repo.list_active().unwrap().len(), 3);

        let in_farm = repo.list_active_by_farm_name("el roble").unwrap();
        assert_eq!(in_farm.len(), 1);
        assert_eq!(in_farm[0].code, "V1");
    }

    #[test]
    fn test_farm_name_match_folds_accents() {
        let db = setup_db();
        let farm = CatalogRepository::<_, Farm>::new(&db)
            .create(&Farm::new("F1", "Finca Ñato", "Llano").to_row())
            .unwrap();
        let repo = AnimalRepository::new(&db);
        let mut cow = Animal::new("V1", Sex::Female);
        cow.farm_id = Some(farm);
        repo.insert(&cow).unwrap();

        assert_eq!(repo.list_active_by_farm_name("finca ñato").unwrap().len(), 1);
        assert!(repo.find_by_code("v1").unwrap().is_some());
    }

    #[test]
    fn test_offspring_numbers_and_lineage() {
        let db = setup_db();
        let repo = AnimalRepository::new(&db);
        assert_eq!(repo.last_offspring_number().unwrap(), None);

        let mother = repo.insert(&Animal::new("V1", Sex::Female)).unwrap();
        repo.insert(&Animal::new("A0007", Sex::Male)).unwrap();
        repo.insert(&Animal::new("A0012", Sex::Female)).unwrap();
        repo.insert(&Animal::new("ABC", Sex::Female)).unwrap();
        assert_eq!(repo.last_offspring_number().unwrap(), Some(12));

        let mut calf = Animal::new("A0013", Sex::Male);
        calf.mother_id = Some(mother);
        calf.birth_date = NaiveDate::from_ymd_opt(2025, 10, 6);
        let id = repo.insert(&calf).unwrap();
        let stored = repo.get(id).unwrap().unwrap();
        assert_eq!(stored.mother_id, Some(mother));
        assert_eq!(stored.birth_date, NaiveDate::from_ymd_opt(2025, 10, 6));
    }

    #[test]
    fn test_logbook_newest_first() {
        let db = setup_db();
        let repo = AnimalRepository::new(&db);
        let cow = repo.insert(&Animal::new("V1", Sex::Female)).unwrap();
        let day = |d| NaiveDate::from_ymd_opt(2025, 1, d).unwrap();

        repo.insert_log_entry(cow, day(1), "Reproducción", "Servicio").unwrap();
        repo.insert_log_entry(cow, day(9), "Parto", "Parto Normal").unwrap();

        let entries = repo.list_log_entries(cow).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, "Parto");
        assert_eq!(entries[0].author, "Sistema");
        assert_eq!(entries[1].date, day(1));
    }
}
