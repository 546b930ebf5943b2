//! Health repository: diagnoses and treatments.

use chrono::NaiveDate;
use rusqlite::types::Value;

use super::{date, opt_date, opt_text, text, DbError, DbResult, Gateway, Row};
use crate::models::{DiagnosisState, HealthDiagnosis, HealthTreatment, UpcomingTreatment};

const DIAGNOSIS_COLUMNS: &str =
    "id, animal_id, fecha, tipo, detalle, severidad, estado, observaciones";

const TREATMENT_COLUMNS: &str = "id, id_animal, fecha_inicio, fecha_fin, tipo_tratamiento, \
                                 producto, dosis, veterinario, comentario, fecha_proxima";

pub struct HealthRepository<'a, G: Gateway + ?Sized> {
    db: &'a G,
}

impl<'a, G: Gateway + ?Sized> HealthRepository<'a, G> {
    pub fn new(db: &'a G) -> Self {
        Self { db }
    }

    fn decode_diagnosis(row: &Row) -> DbResult<HealthDiagnosis> {
        Ok(HealthDiagnosis {
            id: row.get("id")?,
            animal_id: row.get("animal_id")?,
            date: row.get("fecha")?,
            kind: row.get("tipo")?,
            detail: row.get("detalle")?,
            severity: row.get("severidad")?,
            state: row.get("estado")?,
            notes: row.get("observaciones")?,
        })
    }

    fn decode_treatment(row: &Row) -> DbResult<HealthTreatment> {
        Ok(HealthTreatment {
            id: row.get("id")?,
            animal_id: row.get("id_animal")?,
            start_date: row.get("fecha_inicio")?,
            end_date: row.get("fecha_fin")?,
            treatment_type: row.get("tipo_tratamiento")?,
            product: row.get("producto")?,
            dose: row.get("dosis")?,
            veterinarian: row.get("veterinario")?,
            comment: row.get("comentario")?,
            next_date: row.get("fecha_proxima")?,
        })
    }

    fn inserted_id(rows: Vec<Row>) -> DbResult<i64> {
        match rows.first() {
            Some(row) => row.get("id"),
            None => Err(DbError::MissingColumn("id".to_string())),
        }
    }

    fn count(&self, sql: &str, params: &[Value]) -> DbResult<i64> {
        match self.db.query(sql, params)?.first() {
            Some(row) => row.get("n"),
            None => Ok(0),
        }
    }

    // ------------------------------------------------------------------------
    // Diagnoses
    // ------------------------------------------------------------------------

    /// Store a diagnosis. `diagnosis.id` is ignored; the new id is returned.
    pub fn insert_diagnosis(&self, diagnosis: &HealthDiagnosis) -> DbResult<i64> {
        let rows = self.db.query(
            "INSERT INTO diagnostico_evento
                (animal_id, fecha, tipo, detalle, severidad, estado, observaciones)
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
            &[
                Value::Integer(diagnosis.animal_id),
                date(diagnosis.date),
                text(&diagnosis.kind),
                text(&diagnosis.detail),
                diagnosis.severity.into(),
                diagnosis.state.into(),
                opt_text(diagnosis.notes.as_deref()),
            ],
        )?;
        Self::inserted_id(rows)
    }

    pub fn get_diagnosis(&self, id: i64) -> DbResult<Option<HealthDiagnosis>> {
        let sql = format!("SELECT {DIAGNOSIS_COLUMNS} FROM diagnostico_evento WHERE id = ?");
        match self.db.query(&sql, &[Value::Integer(id)])?.first() {
            Some(row) => Ok(Some(Self::decode_diagnosis(row)?)),
            None => Ok(None),
        }
    }

    /// Most recent diagnoses first.
    pub fn list_diagnoses(&self, limit: u32) -> DbResult<Vec<HealthDiagnosis>> {
        let sql = format!(
            "SELECT {DIAGNOSIS_COLUMNS} FROM diagnostico_evento ORDER BY fecha DESC, id DESC LIMIT ?"
        );
        self.db
            .query(&sql, &[Value::Integer(i64::from(limit))])?
            .iter()
            .map(Self::decode_diagnosis)
            .collect()
    }

    pub fn update_diagnosis_state(&self, id: i64, state: DiagnosisState) -> DbResult<usize> {
        self.db.execute(
            "UPDATE diagnostico_evento SET estado = ? WHERE id = ?",
            &[state.into(), Value::Integer(id)],
        )
    }

    pub fn count_diagnoses_in_state(&self, state: DiagnosisState) -> DbResult<i64> {
        self.count(
            "SELECT COUNT(*) AS n FROM diagnostico_evento WHERE estado = ?",
            &[state.into()],
        )
    }

    // ------------------------------------------------------------------------
    // Treatments
    // ------------------------------------------------------------------------

    /// Store a treatment. `treatment.id` is ignored; the new id is returned.
    pub fn insert_treatment(&self, treatment: &HealthTreatment) -> DbResult<i64> {
        let rows = self.db.query(
            "INSERT INTO tratamiento
                (id_animal, fecha_inicio, fecha_fin, tipo_tratamiento, producto,
                 dosis, veterinario, comentario, fecha_proxima)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
            &[
                Value::Integer(treatment.animal_id),
                date(treatment.start_date),
                opt_date(treatment.end_date),
                treatment.treatment_type.into(),
                text(&treatment.product),
                opt_text(treatment.dose.as_deref()),
                opt_text(treatment.veterinarian.as_deref()),
                opt_text(treatment.comment.as_deref()),
                opt_date(treatment.next_date),
            ],
        )?;
        Self::inserted_id(rows)
    }

    pub fn get_treatment(&self, id: i64) -> DbResult<Option<HealthTreatment>> {
        let sql = format!("SELECT {TREATMENT_COLUMNS} FROM tratamiento WHERE id = ?");
        match self.db.query(&sql, &[Value::Integer(id)])?.first() {
            Some(row) => Ok(Some(Self::decode_treatment(row)?)),
            None => Ok(None),
        }
    }

    /// Most recent treatments first.
    pub fn list_treatments(&self, limit: u32) -> DbResult<Vec<HealthTreatment>> {
        let sql = format!(
            "SELECT {TREATMENT_COLUMNS} FROM tratamiento ORDER BY fecha_inicio DESC, id DESC LIMIT ?"
        );
        self.db
            .query(&sql, &[Value::Integer(i64::from(limit))])?
            .iter()
            .map(Self::decode_treatment)
            .collect()
    }

    /// Follow-ups scheduled on or after `today`, soonest first.
    pub fn list_upcoming_treatments(
        &self,
        today: NaiveDate,
        limit: u32,
    ) -> DbResult<Vec<UpcomingTreatment>> {
        let rows = self.db.query(
            "SELECT t.id, t.id_animal, a.codigo, t.tipo_tratamiento, t.producto, t.fecha_proxima
             FROM tratamiento t JOIN animal a ON a.id = t.id_animal
             WHERE t.fecha_proxima IS NOT NULL AND t.fecha_proxima >= ?
             ORDER BY t.fecha_proxima ASC, t.id ASC
             LIMIT ?",
            &[date(today), Value::Integer(i64::from(limit))],
        )?;
        rows.iter()
            .map(|row| {
                Ok(UpcomingTreatment {
                    treatment_id: row.get("id")?,
                    animal_id: row.get("id_animal")?,
                    animal_code: row.get("codigo")?,
                    treatment_type: row.get("tipo_tratamiento")?,
                    product: row.get("producto")?,
                    next_date: row.get("fecha_proxima")?,
                })
            })
            .collect()
    }

    pub fn count_treatments(&self) -> DbResult<i64> {
        self.count("SELECT COUNT(*) AS n FROM tratamiento", &[])
    }

    pub fn count_upcoming_treatments(&self, today: NaiveDate) -> DbResult<i64> {
        self.count(
            "SELECT COUNT(*) AS n FROM tratamiento WHERE fecha_proxima >= ?",
            &[date(today)],
        )
    }
}
