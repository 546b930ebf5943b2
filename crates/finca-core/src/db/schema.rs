//! SQLite schema definition.

use rusqlite::Connection;
use std::cmp::Ordering;

/// Collation for codes and labels. SQLite's NOCASE only folds ASCII.
pub const CODE_COLLATION: &str = "UNICASE";

/// Compare two strings after Unicode lowercase folding.
pub fn unicase_cmp(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Register the collations `SCHEMA` depends on. Must run before the schema
/// and on every connection that touches the tables.
pub fn register_collations(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_collation(CODE_COLLATION, unicase_cmp)
}

/// Complete database schema for finca-core.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Farms and farm-scoped catalogs
-- ============================================================================

CREATE TABLE IF NOT EXISTS finca (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    codigo TEXT NOT NULL COLLATE UNICASE UNIQUE,
    nombre TEXT NOT NULL,
    ubicacion TEXT,
    propietario TEXT,
    estado TEXT NOT NULL DEFAULT 'Activo' CHECK (estado IN ('Activo', 'Inactivo')),
    fecha_creacion TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Codes are unique per farm, not globally
CREATE TABLE IF NOT EXISTS sector (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    codigo TEXT NOT NULL COLLATE UNICASE,
    nombre TEXT NOT NULL,
    comentario TEXT,
    finca_id INTEGER NOT NULL REFERENCES finca(id),
    estado TEXT NOT NULL DEFAULT 'Activo' CHECK (estado IN ('Activo', 'Inactivo')),
    UNIQUE (finca_id, codigo)
);

CREATE TABLE IF NOT EXISTS lote (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    codigo TEXT NOT NULL COLLATE UNICASE,
    nombre TEXT NOT NULL,
    descripcion TEXT,
    criterio TEXT,
    finca_id INTEGER NOT NULL REFERENCES finca(id),
    estado TEXT NOT NULL DEFAULT 'Activo' CHECK (estado IN ('Activo', 'Inactivo')),
    UNIQUE (finca_id, codigo)
);

CREATE INDEX IF NOT EXISTS idx_sector_finca ON sector(finca_id);
CREATE INDEX IF NOT EXISTS idx_lote_finca ON lote(finca_id);

-- ============================================================================
-- Global reference catalogs
-- ============================================================================

CREATE TABLE IF NOT EXISTS raza (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    codigo TEXT NOT NULL COLLATE UNICASE UNIQUE,
    nombre TEXT NOT NULL,
    tipo_ganado TEXT,
    especie TEXT,
    descripcion TEXT,
    estado TEXT NOT NULL DEFAULT 'Activo' CHECK (estado IN ('Activo', 'Inactivo'))
);

CREATE TABLE IF NOT EXISTS causa_muerte (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    codigo TEXT NOT NULL COLLATE UNICASE UNIQUE,
    descripcion TEXT NOT NULL,
    tipo_causa TEXT,
    comentario TEXT,
    estado TEXT NOT NULL DEFAULT 'Activo' CHECK (estado IN ('Activo', 'Inactivo'))
);

CREATE TABLE IF NOT EXISTS diagnostico_veterinario (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    codigo TEXT NOT NULL COLLATE UNICASE UNIQUE,
    descripcion TEXT NOT NULL,
    tipo_diagnostico TEXT,
    comentario TEXT,
    estado TEXT NOT NULL DEFAULT 'Activo' CHECK (estado IN ('Activo', 'Inactivo'))
);

CREATE TABLE IF NOT EXISTS motivo_venta (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    codigo TEXT NOT NULL COLLATE UNICASE UNIQUE,
    descripcion TEXT NOT NULL,
    comentario TEXT,
    estado TEXT NOT NULL DEFAULT 'Activo' CHECK (estado IN ('Activo', 'Inactivo'))
);

CREATE TABLE IF NOT EXISTS procedencia (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    codigo TEXT NOT NULL COLLATE UNICASE UNIQUE,
    descripcion TEXT NOT NULL,
    tipo_procedencia TEXT,
    ubicacion TEXT,
    comentario TEXT,
    estado TEXT NOT NULL DEFAULT 'Activo' CHECK (estado IN ('Activo', 'Inactivo'))
);

CREATE TABLE IF NOT EXISTS empleado (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    codigo TEXT NOT NULL COLLATE UNICASE UNIQUE,
    numero_identificacion TEXT NOT NULL UNIQUE,
    nombres TEXT NOT NULL,
    apellidos TEXT NOT NULL,
    cargo TEXT NOT NULL,
    id_finca INTEGER REFERENCES finca(id),
    estado TEXT NOT NULL DEFAULT 'Activo' CHECK (estado IN ('Activo', 'Inactivo'))
);

CREATE TABLE IF NOT EXISTS condicion_corporal (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    codigo TEXT NOT NULL COLLATE UNICASE UNIQUE,
    descripcion TEXT NOT NULL,
    escala TEXT,
    especie TEXT,
    caracteristicas TEXT,
    recomendaciones TEXT,
    estado TEXT NOT NULL DEFAULT 'Activo' CHECK (estado IN ('Activo', 'Inactivo'))
);

CREATE TABLE IF NOT EXISTS tipo_explotacion (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    codigo TEXT NOT NULL COLLATE UNICASE UNIQUE,
    descripcion TEXT NOT NULL,
    categoria TEXT NOT NULL,
    comentario TEXT,
    estado TEXT NOT NULL DEFAULT 'Activo' CHECK (estado IN ('Activo', 'Inactivo'))
);

-- Only catalog that also allows hard delete
CREATE TABLE IF NOT EXISTS calidad_animal (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    codigo TEXT NOT NULL COLLATE UNICASE UNIQUE,
    descripcion TEXT NOT NULL,
    comentario TEXT,
    estado TEXT NOT NULL DEFAULT 'Activo' CHECK (estado IN ('Activo', 'Inactivo'))
);

-- ============================================================================
-- Animals (owned by the herd module, read here for lifecycle checks)
-- ============================================================================

CREATE TABLE IF NOT EXISTS animal (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    codigo TEXT NOT NULL COLLATE UNICASE UNIQUE,
    nombre TEXT,
    sexo TEXT NOT NULL CHECK (sexo IN ('Macho', 'Hembra')),
    id_finca INTEGER REFERENCES finca(id),
    id_madre INTEGER REFERENCES animal(id),
    fecha_nacimiento TEXT,
    estado TEXT NOT NULL DEFAULT 'Activo' CHECK (estado IN ('Activo', 'Inactivo'))
);

CREATE INDEX IF NOT EXISTS idx_animal_finca ON animal(id_finca);

-- Per-animal logbook written by the lifecycle services
CREATE TABLE IF NOT EXISTS comentario (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    id_animal INTEGER NOT NULL REFERENCES animal(id),
    fecha TEXT NOT NULL,
    tipo TEXT NOT NULL,
    nota TEXT NOT NULL,
    autor TEXT NOT NULL DEFAULT 'Sistema'
);

CREATE INDEX IF NOT EXISTS idx_comentario_animal ON comentario(id_animal, fecha);

-- ============================================================================
-- Reproduction (append-mostly; rows are never deleted)
-- ============================================================================

CREATE TABLE IF NOT EXISTS reproduccion (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    animal_id INTEGER NOT NULL REFERENCES animal(id),
    id_macho INTEGER REFERENCES animal(id),
    fecha_cubricion TEXT NOT NULL,
    tipo_cubricion TEXT NOT NULL,
    estado TEXT NOT NULL DEFAULT 'Gestante' CHECK (estado IN ('Gestante', 'Parida', 'Vacía')),
    fecha_parto_estimada TEXT NOT NULL,
    fecha_parto TEXT,
    tipo_parto TEXT CHECK (tipo_parto IN ('Normal', 'Distócico', 'Cesárea', 'Aborto')),
    sexo_cria TEXT CHECK (sexo_cria IN ('Macho', 'Hembra')),
    peso_cria REAL,
    estado_cria TEXT CHECK (estado_cria IN ('Vivo', 'Muerto al nacer', 'Murió después')),
    id_cria INTEGER REFERENCES animal(id),
    observaciones TEXT,
    fecha_registro TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_reproduccion_animal ON reproduccion(animal_id);
CREATE INDEX IF NOT EXISTS idx_reproduccion_estado ON reproduccion(estado, fecha_parto_estimada);

-- ============================================================================
-- Health events
-- ============================================================================

CREATE TABLE IF NOT EXISTS diagnostico_evento (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    animal_id INTEGER NOT NULL REFERENCES animal(id),
    fecha TEXT NOT NULL,
    tipo TEXT NOT NULL,
    detalle TEXT NOT NULL DEFAULT '',
    severidad TEXT NOT NULL,
    estado TEXT NOT NULL DEFAULT 'Activo'
        CHECK (estado IN ('Activo', 'En Tratamiento', 'Recuperado', 'Crónico')),
    observaciones TEXT,
    fecha_registro TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS tratamiento (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    id_animal INTEGER NOT NULL REFERENCES animal(id),
    fecha_inicio TEXT NOT NULL,
    fecha_fin TEXT,
    tipo_tratamiento TEXT NOT NULL,
    producto TEXT NOT NULL,
    dosis TEXT,
    veterinario TEXT,
    comentario TEXT,
    fecha_proxima TEXT,
    fecha_registro TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_diagnostico_animal ON diagnostico_evento(animal_id);
CREATE INDEX IF NOT EXISTS idx_tratamiento_proxima ON tratamiento(fecha_proxima);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        register_collations(&conn).unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn
    }

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        register_collations(&conn).unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_schema_needs_code_collation() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(conn.execute_batch(SCHEMA).is_err());
    }

    #[test]
    fn test_unicase_cmp_folds_accented_letters() {
        assert_eq!(unicase_cmp("ñ1", "Ñ1"), Ordering::Equal);
        assert_eq!(unicase_cmp("ÉPOCA", "época"), Ordering::Equal);
        assert_eq!(unicase_cmp("a", "B"), Ordering::Less);
        assert_ne!(unicase_cmp("n1", "ñ1"), Ordering::Equal);
    }

    #[test]
    fn test_global_code_unique_ignores_accented_case() {
        let conn = setup();
        conn.execute(
            "INSERT INTO motivo_venta (codigo, descripcion) VALUES ('ñ1', 'Uno')",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO motivo_venta (codigo, descripcion) VALUES ('Ñ1', 'Dos')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_schema_idempotent() {
        let conn = setup();
        assert!(conn.execute_batch(SCHEMA).is_ok());
    }

    #[test]
    fn test_global_code_unique_ignores_case() {
        let conn = setup();
        conn.execute(
            "INSERT INTO raza (codigo, nombre) VALUES ('BRH', 'Brahman')",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO raza (codigo, nombre) VALUES ('brh', 'Otro')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_lot_code_unique_per_farm() {
        let conn = setup();
        conn.execute("INSERT INTO finca (codigo, nombre) VALUES ('F1', 'Uno')", [])
            .unwrap();
        conn.execute("INSERT INTO finca (codigo, nombre) VALUES ('F2', 'Dos')", [])
            .unwrap();

        conn.execute(
            "INSERT INTO lote (codigo, nombre, finca_id) VALUES ('L1', 'Lote', 1)",
            [],
        )
        .unwrap();

        // Same code, other farm
        let other_farm = conn.execute(
            "INSERT INTO lote (codigo, nombre, finca_id) VALUES ('L1', 'Lote', 2)",
            [],
        );
        assert!(other_farm.is_ok());

        // Same code, same farm
        let same_farm = conn.execute(
            "INSERT INTO lote (codigo, nombre, finca_id) VALUES ('l1', 'Lote', 1)",
            [],
        );
        assert!(same_farm.is_err());
    }

    #[test]
    fn test_state_check_constraint() {
        let conn = setup();
        let result = conn.execute(
            "INSERT INTO motivo_venta (codigo, descripcion, estado) VALUES ('X', 'Y', 'Borrado')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_reproduction_requires_existing_animal() {
        let conn = setup();
        let result = conn.execute(
            "INSERT INTO reproduccion (animal_id, fecha_cubricion, tipo_cubricion, fecha_parto_estimada)
             VALUES (99, '2025-01-01', 'Monta Natural', '2025-10-08')",
            [],
        );
        assert!(result.is_err());
    }
}
