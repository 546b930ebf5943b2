//! Tests for the exported `FincaCore` surface.

use finca_core::{
    open_database, open_database_in_memory, open_database_with_config, FfiAnimal,
    FfiCatalogEntry, FfiCatalogKey, FfiCatalogKind, FfiNewCalving, FfiNewDiagnosis,
    FfiNewTreatment, FincaError,
};

fn farm_entry(code: &str, name: &str) -> FfiCatalogEntry {
    FfiCatalogEntry {
        id: None,
        code: code.to_string(),
        parent_id: None,
        values: vec![Some(name.to_string()), Some("Centro".to_string()), None],
        state: "Activo".to_string(),
    }
}

fn female(code: &str) -> FfiAnimal {
    FfiAnimal {
        id: None,
        code: code.to_string(),
        name: None,
        sex: "Hembra".to_string(),
        farm_id: None,
        mother_id: None,
        birth_date: None,
        active: true,
    }
}

#[test]
fn test_catalog_fields_describe_values() {
    let core = open_database_in_memory().unwrap();
    let fields = core.catalog_fields(FfiCatalogKind::Lot);
    let columns: Vec<&str> = fields.iter().map(|f| f.column.as_str()).collect();
    assert_eq!(columns, vec!["nombre", "descripcion", "criterio"]);
    assert!(fields[0].required);
    assert_eq!(fields[2].default_value.as_deref(), Some("Por Peso"));
    assert!(fields[2].allowed.iter().any(|v| v == "Por Edad"));
}

#[test]
fn test_catalog_round_trip_through_facade() {
    let core = open_database_in_memory().unwrap();
    let farm_id = core
        .catalog_create(FfiCatalogKind::Farm, farm_entry("f1", "la esperanza"))
        .unwrap();

    let sector = FfiCatalogEntry {
        id: None,
        code: "s1".to_string(),
        parent_id: Some(farm_id),
        values: vec![Some("bajo".to_string()), None],
        state: String::new(),
    };
    core.catalog_create(FfiCatalogKind::Sector, sector.clone())
        .unwrap();
    let err = core
        .catalog_create(FfiCatalogKind::Sector, sector)
        .unwrap_err();
    assert!(matches!(err, FincaError::DuplicateCode(_)));

    let farm = core
        .catalog_get(
            FfiCatalogKind::Farm,
            FfiCatalogKey::Code {
                code: "F1".to_string(),
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(farm.id, Some(farm_id));
    assert_eq!(farm.values[0].as_deref(), Some("La Esperanza"));

    core.catalog_set_state(
        FfiCatalogKind::Farm,
        FfiCatalogKey::Id { id: farm_id },
        "Inactivo".to_string(),
    )
    .unwrap();
    assert!(core.catalog_list(FfiCatalogKind::Farm).unwrap().is_empty());
    assert_eq!(core.catalog_list_all(FfiCatalogKind::Farm).unwrap().len(), 1);
    assert!(core
        .catalog_exists(FfiCatalogKind::Farm, "f1".to_string(), None)
        .unwrap());
}

#[test]
fn test_import_and_quality_delete() {
    let core = open_database_in_memory().unwrap();
    let quality = |code: &str, text: &str| FfiCatalogEntry {
        id: None,
        code: code.to_string(),
        parent_id: None,
        values: vec![Some(text.to_string()), None],
        state: "Activo".to_string(),
    };

    let report = core
        .catalog_import(
            FfiCatalogKind::AnimalQuality,
            vec![quality("a", "Excelente"), quality("A", "Duplicada"), quality("b", "Buena")],
        )
        .unwrap();
    assert_eq!(report.imported, 2);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].row, 2);

    let options = core.catalog_options(FfiCatalogKind::AnimalQuality).unwrap();
    assert_eq!(options.len(), 2);

    core.delete_quality(FfiCatalogKey::Code {
        code: "a".to_string(),
    })
    .unwrap();
    assert_eq!(
        core.catalog_list_all(FfiCatalogKind::AnimalQuality)
            .unwrap()
            .len(),
        1
    );
    assert!(matches!(
        core.delete_quality(FfiCatalogKey::Code {
            code: "a".to_string()
        }),
        Err(FincaError::NotFound(_))
    ));
}

#[test]
fn test_reproduction_through_facade() {
    let core = open_database_in_memory().unwrap();
    let cow = core.add_animal(female("V-100")).unwrap();

    assert!(matches!(
        core.register_service(cow, None, "10/03/2024".to_string(), "Monta Natural".to_string(), None),
        Err(FincaError::InvalidInput(_))
    ));

    core.register_service(cow, None, "2024-03-10".to_string(), "Monta Natural".to_string(), None)
        .unwrap();
    let pregnant = core.pregnant_animals().unwrap();
    assert_eq!(pregnant.len(), 1);
    assert_eq!(pregnant[0].animal_code, "V-100");
    assert_eq!(pregnant[0].estimated_calving_date, "2024-12-15");
    assert_eq!(core.reproduction_statistics().unwrap().pregnant, 1);

    core.mark_empty(cow).unwrap();
    assert!(core.pregnant_animals().unwrap().is_empty());
    assert!(matches!(core.confirm_calving(cow), Err(FincaError::NotFound(_))));
    assert_eq!(core.load_females(None).unwrap().len(), 1);
    assert!(core.load_males(None).unwrap().is_empty());
}

#[test]
fn test_calving_through_facade() {
    let core = open_database_in_memory().unwrap();
    let farm_id = core
        .catalog_create(FfiCatalogKind::Farm, farm_entry("F1", "La Vega"))
        .unwrap();
    let mut cow = female("V-300");
    cow.farm_id = Some(farm_id);
    let cow = core.add_animal(cow).unwrap();
    let mut bull = female("T-300");
    bull.sex = "Macho".to_string();
    let bull = core.add_animal(bull).unwrap();

    assert!(matches!(
        core.register_service(cow, Some(cow), "2024-01-10".to_string(), "Monta Natural".to_string(), None),
        Err(FincaError::InvalidEnumValue(_))
    ));
    let record = core
        .register_service(cow, Some(bull), "2024-01-10".to_string(), "Monta Natural".to_string(), None)
        .unwrap();
    assert_eq!(core.pregnant_animals().unwrap()[0].sire_code.as_deref(), Some("T-300"));

    let outcome = core
        .register_calving(FfiNewCalving {
            record_id: record,
            date: "2024-10-14".to_string(),
            calving_type: "Cesárea".to_string(),
            offspring_sex: "Macho".to_string(),
            offspring_weight: Some(35.0),
            offspring_status: None,
            register_offspring: true,
            notes: None,
        })
        .unwrap();
    assert_eq!(outcome.offspring_code.as_deref(), Some("A0001"));

    let males = core.load_males(Some(farm_id)).unwrap();
    let calf = males.iter().find(|a| a.code == "A0001").unwrap();
    assert_eq!(calf.mother_id, Some(cow));
    assert_eq!(calf.birth_date.as_deref(), Some("2024-10-14"));

    let logbook = core.animal_logbook(cow).unwrap();
    assert_eq!(logbook.len(), 2);
    assert_eq!(logbook[0].date, "2024-10-14");
    assert_eq!(logbook[0].note, "Parto Cesárea. Cría Macho, estado: Vivo, peso: 35 kg");
    assert_eq!(logbook[0].author, "Sistema");
}

#[test]
fn test_health_through_facade() {
    let core = open_database_in_memory().unwrap();
    let cow = core.add_animal(female("V-200")).unwrap();

    let id = core
        .register_diagnosis(FfiNewDiagnosis {
            animal_id: cow,
            date: "2024-05-02".to_string(),
            kind: "Digestivo".to_string(),
            detail: "Timpanismo".to_string(),
            severity: "Grave".to_string(),
            state: None,
            notes: None,
        })
        .unwrap();
    core.update_diagnosis_state(id, "Recuperado".to_string())
        .unwrap();
    let history = core.diagnosis_history(None).unwrap();
    assert_eq!(history[0].state, "Recuperado");
    assert_eq!(history[0].date, "2024-05-02");

    let err = core
        .register_treatment(FfiNewTreatment {
            animal_id: cow,
            start_date: "2024-05-02".to_string(),
            end_date: None,
            treatment_type: "Antibiótico".to_string(),
            product: "Oxitetraciclina".to_string(),
            dose: None,
            veterinarian: None,
            comment: None,
            next_date: Some("mañana".to_string()),
        })
        .unwrap_err();
    assert!(matches!(err, FincaError::InvalidInput(msg) if msg.contains("next_date")));

    core.register_treatment(FfiNewTreatment {
        animal_id: cow,
        start_date: "2024-05-02".to_string(),
        end_date: Some(String::new()),
        treatment_type: "Antibiótico".to_string(),
        product: "Oxitetraciclina".to_string(),
        dose: None,
        veterinarian: None,
        comment: None,
        next_date: Some("2999-01-01".to_string()),
    })
    .unwrap();
    let upcoming = core.upcoming_treatments(None).unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].next_date, "2999-01-01");
    assert_eq!(core.treatment_history(None).unwrap()[0].end_date, None);

    let stats = core.health_statistics().unwrap();
    assert_eq!(stats.active_diagnoses, 0);
    assert_eq!(stats.treatments, 1);
}

#[test]
fn test_open_with_config_and_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("finca.db");
    let json = format!(
        r#"{{"database_path": {}, "calving_window_days": 60}}"#,
        serde_json::to_string(&path).unwrap()
    );

    let core = open_database_with_config(json).unwrap();
    core.catalog_create(FfiCatalogKind::Farm, farm_entry("F9", "Nueve"))
        .unwrap();
    drop(core);

    let reopened = open_database(path.to_string_lossy().into_owned()).unwrap();
    assert_eq!(reopened.catalog_list(FfiCatalogKind::Farm).unwrap().len(), 1);

    assert!(matches!(
        open_database_with_config(r#"{"history_limit": 0}"#.to_string()),
        Err(FincaError::InvalidInput(_))
    ));
    assert!(matches!(
        open_database_with_config(r#"{"gestation_days": 9000000000000000000}"#.to_string()),
        Err(FincaError::InvalidInput(msg)) if msg.contains("gestation_days")
    ));
}
