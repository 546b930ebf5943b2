//! Reproduction repository.

use chrono::NaiveDate;
use rusqlite::types::Value;

use super::{date, opt_date, opt_text, text, DbError, DbResult, Gateway, Row};
use crate::models::{
    CalvingDetails, CalvingType, PregnancyView, ReproductiveRecord, ReproductiveState, ServiceType,
};

const RECORD_COLUMNS: &str = "id, animal_id, id_macho, fecha_cubricion, tipo_cubricion, estado, \
                              fecha_parto_estimada, fecha_parto, tipo_parto, sexo_cria, \
                              peso_cria, estado_cria, id_cria, observaciones";

const PREGNANCY_SELECT: &str = "SELECT r.id AS record_id, r.animal_id, a.codigo, a.nombre, \
                                m.codigo AS codigo_macho, \
                                r.fecha_cubricion, r.tipo_cubricion, r.fecha_parto_estimada \
                                FROM reproduccion r JOIN animal a ON a.id = r.animal_id \
                                LEFT JOIN animal m ON m.id = r.id_macho";

/// Reproductive records. Rows are created and closed, never deleted.
pub struct ReproductionRepository<'a, G: Gateway + ?Sized> {
    db: &'a G,
}

impl<'a, G: Gateway + ?Sized> ReproductionRepository<'a, G> {
    pub fn new(db: &'a G) -> Self {
        Self { db }
    }

    fn decode(row: &Row) -> DbResult<ReproductiveRecord> {
        // Calving details are written together, so the type marks their presence
        let calving = match row.get::<Option<CalvingType>>("tipo_parto")? {
            Some(calving_type) => Some(CalvingDetails {
                calving_type,
                offspring_sex: row.get("sexo_cria")?,
                offspring_weight: row.get("peso_cria")?,
                offspring_status: row.get("estado_cria")?,
                offspring_id: row.get("id_cria")?,
            }),
            None => None,
        };
        Ok(ReproductiveRecord {
            id: row.get("id")?,
            animal_id: row.get("animal_id")?,
            sire_id: row.get("id_macho")?,
            service_date: row.get("fecha_cubricion")?,
            service_type: row.get("tipo_cubricion")?,
            state: row.get("estado")?,
            estimated_calving_date: row.get("fecha_parto_estimada")?,
            calving_date: row.get("fecha_parto")?,
            calving,
            notes: row.get("observaciones")?,
        })
    }

    /// Derived day counts are left at zero for the caller to fill in.
    fn decode_pregnancy(row: &Row) -> DbResult<PregnancyView> {
        Ok(PregnancyView {
            record_id: row.get("record_id")?,
            animal_id: row.get("animal_id")?,
            animal_code: row.get("codigo")?,
            animal_name: row.get("nombre")?,
            sire_code: row.get("codigo_macho")?,
            service_date: row.get("fecha_cubricion")?,
            service_type: row.get("tipo_cubricion")?,
            estimated_calving_date: row.get("fecha_parto_estimada")?,
            days_pregnant: 0,
            days_to_calving: 0,
        })
    }

    fn count(&self, sql: &str, params: &[Value]) -> DbResult<i64> {
        match self.db.query(sql, params)?.first() {
            Some(row) => row.get("n"),
            None => Ok(0),
        }
    }

    /// Open a pregnancy for an animal and return the record id.
    pub fn insert(
        &self,
        animal_id: i64,
        sire_id: Option<i64>,
        service_date: NaiveDate,
        service_type: ServiceType,
        estimated_calving_date: NaiveDate,
        notes: Option<&str>,
    ) -> DbResult<i64> {
        let rows = self.db.query(
            "INSERT INTO reproduccion
                (animal_id, id_macho, fecha_cubricion, tipo_cubricion, estado, fecha_parto_estimada, observaciones)
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
            &[
                Value::Integer(animal_id),
                sire_id.map_or(Value::Null, Value::Integer),
                date(service_date),
                service_type.into(),
                ReproductiveState::Pregnant.into(),
                date(estimated_calving_date),
                opt_text(notes),
            ],
        )?;
        match rows.first() {
            Some(row) => row.get("id"),
            None => Err(DbError::MissingColumn("id".to_string())),
        }
    }

    pub fn get(&self, id: i64) -> DbResult<Option<ReproductiveRecord>> {
        let sql = format!("SELECT {RECORD_COLUMNS} FROM reproduccion WHERE id = ?");
        match self.db.query(&sql, &[Value::Integer(id)])?.first() {
            Some(row) => Ok(Some(Self::decode(row)?)),
            None => Ok(None),
        }
    }

    /// Every open pregnancy, oldest service first.
    pub fn list_pregnant(&self) -> DbResult<Vec<PregnancyView>> {
        let sql = format!("{PREGNANCY_SELECT} WHERE r.estado = ? ORDER BY r.fecha_cubricion, r.id");
        self.db
            .query(&sql, &[ReproductiveState::Pregnant.into()])?
            .iter()
            .map(Self::decode_pregnancy)
            .collect()
    }

    /// Open pregnancies due within `[from, to]`, soonest first.
    pub fn list_calving_between(&self, from: NaiveDate, to: NaiveDate) -> DbResult<Vec<PregnancyView>> {
        let sql = format!(
            "{PREGNANCY_SELECT}
             WHERE r.estado = ? AND r.fecha_parto_estimada BETWEEN ? AND ?
             ORDER BY r.fecha_parto_estimada, r.id"
        );
        self.db
            .query(
                &sql,
                &[ReproductiveState::Pregnant.into(), date(from), date(to)],
            )?
            .iter()
            .map(Self::decode_pregnancy)
            .collect()
    }

    /// Close the open records of the animal with this code.
    pub fn close_open_by_animal_code(
        &self,
        animal_code: &str,
        state: ReproductiveState,
        calving_date: Option<NaiveDate>,
    ) -> DbResult<usize> {
        self.db.execute(
            "UPDATE reproduccion SET estado = ?, fecha_parto = ?
             WHERE animal_id = (SELECT id FROM animal WHERE codigo = ?) AND estado = ?",
            &[
                state.into(),
                opt_date(calving_date),
                text(animal_code),
                ReproductiveState::Pregnant.into(),
            ],
        )
    }

    /// Close one record, only if it is still open.
    pub fn set_open_record_state(&self, id: i64, state: ReproductiveState) -> DbResult<usize> {
        self.db.execute(
            "UPDATE reproduccion SET estado = ? WHERE id = ? AND estado = ?",
            &[
                state.into(),
                Value::Integer(id),
                ReproductiveState::Pregnant.into(),
            ],
        )
    }

    /// Close an open record as calved with its details. Returns rows changed.
    pub fn record_calving(
        &self,
        id: i64,
        calving_date: NaiveDate,
        details: &CalvingDetails,
        notes: Option<&str>,
    ) -> DbResult<usize> {
        self.db.execute(
            "UPDATE reproduccion
             SET estado = ?, fecha_parto = ?, tipo_parto = ?, sexo_cria = ?, peso_cria = ?,
                 estado_cria = ?, id_cria = ?, observaciones = COALESCE(?, observaciones)
             WHERE id = ? AND estado = ?",
            &[
                ReproductiveState::Calved.into(),
                date(calving_date),
                details.calving_type.into(),
                details.offspring_sex.into(),
                details.offspring_weight.map_or(Value::Null, Value::Real),
                details.offspring_status.into(),
                details.offspring_id.map_or(Value::Null, Value::Integer),
                opt_text(notes),
                Value::Integer(id),
                ReproductiveState::Pregnant.into(),
            ],
        )
    }

    pub fn count_open_for_animal(&self, animal_id: i64) -> DbResult<i64> {
        self.count(
            "SELECT COUNT(*) AS n FROM reproduccion WHERE animal_id = ? AND estado = ?",
            &[Value::Integer(animal_id), ReproductiveState::Pregnant.into()],
        )
    }

    pub fn count_on_date(&self, animal_id: i64, service_date: NaiveDate) -> DbResult<i64> {
        self.count(
            "SELECT COUNT(*) AS n FROM reproduccion WHERE animal_id = ? AND fecha_cubricion = ?",
            &[Value::Integer(animal_id), date(service_date)],
        )
    }

    pub fn count_pregnant(&self) -> DbResult<i64> {
        self.count(
            "SELECT COUNT(*) AS n FROM reproduccion WHERE estado = ?",
            &[ReproductiveState::Pregnant.into()],
        )
    }

    pub fn count_due_between(&self, from: NaiveDate, to: NaiveDate) -> DbResult<i64> {
        self.count(
            "SELECT COUNT(*) AS n FROM reproduccion
             WHERE estado = ? AND fecha_parto_estimada BETWEEN ? AND ?",
            &[ReproductiveState::Pregnant.into(), date(from), date(to)],
        )
    }

    /// Services of one type on or after `since`, whatever their outcome.
    pub fn count_services_since(&self, service_type: ServiceType, since: NaiveDate) -> DbResult<i64> {
        self.count(
            "SELECT COUNT(*) AS n FROM reproduccion WHERE tipo_cubricion = ? AND fecha_cubricion >= ?",
            &[service_type.into(), date(since)],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{AnimalRepository, Database};
    use crate::models::{Animal, OffspringStatus, Sex};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let cow = AnimalRepository::new(&db)
            .insert(&Animal::new("V1", Sex::Female))
            .unwrap();
        (db, cow)
    }

    #[test]
    fn test_insert_and_get() {
        let (db, cow) = setup();
        let repo = ReproductionRepository::new(&db);

        let id = repo
            .insert(cow, None, day(2025, 1, 1), ServiceType::Insemination, day(2025, 10, 8), Some("pajilla 12"))
            .unwrap();

        let record = repo.get(id).unwrap().unwrap();
        assert_eq!(record.animal_id, cow);
        assert_eq!(record.state, ReproductiveState::Pregnant);
        assert_eq!(record.service_type, ServiceType::Insemination);
        assert_eq!(record.estimated_calving_date, day(2025, 10, 8));
        assert_eq!(record.calving_date, None);
        assert_eq!(record.notes.as_deref(), Some("pajilla 12"));
    }

    #[test]
    fn test_close_by_code_only_touches_open_records() {
        let (db, cow) = setup();
        let repo = ReproductionRepository::new(&db);
        let first = repo
            .insert(cow, None, day(2024, 1, 1), ServiceType::Natural, day(2024, 10, 7), None)
            .unwrap();
        repo.set_open_record_state(first, ReproductiveState::Empty)
            .unwrap();
        let second = repo
            .insert(cow, None, day(2025, 1, 1), ServiceType::Natural, day(2025, 10, 8), None)
            .unwrap();

        let changed = repo
            .close_open_by_animal_code("v1", ReproductiveState::Calved, Some(day(2025, 10, 6)))
            .unwrap();
        assert_eq!(changed, 1);

        assert_eq!(repo.get(first).unwrap().unwrap().state, ReproductiveState::Empty);
        let closed = repo.get(second).unwrap().unwrap();
        assert_eq!(closed.state, ReproductiveState::Calved);
        assert_eq!(closed.calving_date, Some(day(2025, 10, 6)));

        // Nothing left open
        assert_eq!(
            repo.close_open_by_animal_code("V1", ReproductiveState::Empty, None)
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_calving_window_bounds_are_inclusive() {
        let (db, cow) = setup();
        let repo = ReproductionRepository::new(&db);
        repo.insert(cow, None, day(2025, 1, 1), ServiceType::Natural, day(2025, 10, 8), None)
            .unwrap();

        assert_eq!(
            repo.list_calving_between(day(2025, 9, 8), day(2025, 10, 8))
                .unwrap()
                .len(),
            1
        );
        assert!(repo
            .list_calving_between(day(2025, 10, 9), day(2025, 11, 8))
            .unwrap()
            .is_empty());
        assert_eq!(repo.count_due_between(day(2025, 10, 8), day(2025, 11, 7)).unwrap(), 1);
    }

    #[test]
    fn test_counters() {
        let (db, cow) = setup();
        let repo = ReproductionRepository::new(&db);
        repo.insert(cow, None, day(2025, 1, 1), ServiceType::Natural, day(2025, 10, 8), None)
            .unwrap();
        repo.insert(cow, None, day(2025, 3, 1), ServiceType::Insemination, day(2025, 12, 6), None)
            .unwrap();

        assert_eq!(repo.count_open_for_animal(cow).unwrap(), 2);
        assert_eq!(repo.count_pregnant().unwrap(), 2);
        assert_eq!(repo.count_on_date(cow, day(2025, 3, 1)).unwrap(), 1);
        assert_eq!(
            repo.count_services_since(ServiceType::Natural, day(2025, 2, 1))
                .unwrap(),
            0
        );
        assert_eq!(
            repo.count_services_since(ServiceType::Insemination, day(2025, 2, 1))
                .unwrap(),
            1
        );

        let pregnant = repo.list_pregnant().unwrap();
        assert_eq!(pregnant.len(), 2);
        assert_eq!(pregnant[0].service_date, day(2025, 1, 1));
        assert_eq!(pregnant[0].animal_code, "V1");
    }

    #[test]
    fn test_sire_code_and_calving_details() {
        let (db, cow) = setup();
        let bull = AnimalRepository::new(&db)
            .insert(&Animal::new("T1", Sex::Male))
            .unwrap();
        let calf = AnimalRepository::new(&db)
            .insert(&Animal::new("A0001", Sex::Female))
            .unwrap();
        let repo = ReproductionRepository::new(&db);
        let id = repo
            .insert(cow, Some(bull), day(2025, 1, 1), ServiceType::Natural, day(2025, 10, 8), Some("primer servicio"))
            .unwrap();
        assert_eq!(repo.list_pregnant().unwrap()[0].sire_code.as_deref(), Some("T1"));
        assert_eq!(repo.get(id).unwrap().unwrap().calving, None);

        let details = CalvingDetails {
            calving_type: CalvingType::Normal,
            offspring_sex: Sex::Female,
            offspring_weight: Some(32.5),
            offspring_status: OffspringStatus::Alive,
            offspring_id: Some(calf),
        };
        assert_eq!(repo.record_calving(id, day(2025, 10, 6), &details, None).unwrap(), 1);
        // Closed records are left alone
        assert_eq!(repo.record_calving(id, day(2025, 10, 7), &details, None).unwrap(), 0);

        let record = repo.get(id).unwrap().unwrap();
        assert_eq!(record.state, ReproductiveState::Calved);
        assert_eq!(record.sire_id, Some(bull));
        assert_eq!(record.calving_date, Some(day(2025, 10, 6)));
        assert_eq!(record.calving, Some(details));
        assert_eq!(record.notes.as_deref(), Some("primer servicio"));
    }
}
