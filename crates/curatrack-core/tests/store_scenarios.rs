//! Store integration tests: load, dispatch, write-back.

use curatrack_core::models::{Evaluation, EvaluationType, Patient, TreatingPhysician};
use curatrack_core::reducer::{Action, Missing, Outcome};
use curatrack_core::storage::{decode_patients, encode_patients, MemoryStorage, PatientStorage};
use curatrack_core::store::PatientStore;
use curatrack_core::STORAGE_KEY;

fn make_patient(id: &str, name: &str, physician: Option<(&str, &str)>) -> Patient {
    let mut patient = Patient::new(name.to_string(), "Neumonía".to_string());
    patient.id = id.to_string();
    patient.treatments = vec!["Antibióticos".to_string()];
    if let Some((name, specialty)) = physician {
        patient
            .treating_physicians
            .push(TreatingPhysician::new(name, specialty));
    }
    patient
}

fn make_evaluation(id: &str, date: &str) -> Evaluation {
    let mut evaluation = Evaluation::new(EvaluationType::Treatment, "Antibióticos".to_string());
    evaluation.id = id.to_string();
    evaluation.written_evaluation = "Buena respuesta al tratamiento".to_string();
    evaluation.date_evaluated = date.to_string();
    evaluation
}

fn stored(store: &PatientStore<MemoryStorage>) -> Vec<Patient> {
    store.storage().load().unwrap()
}

#[test]
fn test_empty_storage_starts_initialized() {
    let store = PatientStore::open(MemoryStorage::new());

    assert!(store.state().is_initialized());
    assert!(store.state().patients().is_empty());
    assert!(store.state().doctors().is_empty());
    assert_eq!(store.storage().write_count(), 1);
    assert!(stored(&store).is_empty());
}

#[test]
fn test_add_patient_persists_and_updates_directory() {
    let mut store = PatientStore::open(MemoryStorage::new());

    let outcome = store.dispatch(Action::AddPatient(make_patient(
        "p1",
        "Ana",
        Some(("Dr. Lee", "Neumología")),
    )));
    assert_eq!(outcome, Outcome::Applied);
    store.dispatch(Action::AddPatient(make_patient(
        "p2",
        "Luis",
        Some(("Dra. Álvarez", "Cardiología")),
    )));

    let names: Vec<_> = store
        .state()
        .doctors()
        .iter()
        .map(|d| d.name.as_str())
        .collect();
    assert_eq!(names, vec!["Dr. Lee", "Dra. Álvarez"]);

    assert_eq!(stored(&store), store.state().patients());
    assert_eq!(store.storage().write_count(), 3);
}

#[test]
fn test_evaluation_lifecycle() {
    let mut store = PatientStore::open(MemoryStorage::new());
    store.dispatch(Action::AddPatient(make_patient("p1", "Ana", None)));

    let evaluation = make_evaluation("e1", "2024-03-01T10:00:00Z");
    store.dispatch(Action::AddEvaluation {
        patient_id: "p1".into(),
        evaluation: evaluation.clone(),
    });

    let mut revised = evaluation.clone();
    revised.scale_rating = 0.9;
    let outcome = store.dispatch(Action::UpdateEvaluation {
        patient_id: "p1".into(),
        evaluation: revised,
    });
    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(stored(&store)[0].evaluations[0].scale_rating, 0.9);

    store.dispatch(Action::RemoveEvaluation {
        patient_id: "p1".into(),
        evaluation_id: "e1".into(),
    });
    assert!(store.state().patients()[0].evaluations.is_empty());
    assert!(stored(&store)[0].evaluations.is_empty());
}

#[test]
fn test_missing_references_do_not_write() {
    let mut store = PatientStore::open(MemoryStorage::new());
    store.dispatch(Action::AddPatient(make_patient("p1", "Ana", None)));
    let writes = store.storage().write_count();

    let outcome = store.dispatch(Action::AddEvaluation {
        patient_id: "ghost".into(),
        evaluation: make_evaluation("e1", "2024-03-01T10:00:00Z"),
    });
    assert_eq!(outcome, Outcome::NotFound(Missing::Patient("ghost".into())));

    let outcome = store.dispatch(Action::RemoveEvaluation {
        patient_id: "p1".into(),
        evaluation_id: "e404".into(),
    });
    assert_eq!(
        outcome,
        Outcome::NotFound(Missing::Evaluation {
            patient_id: "p1".into(),
            evaluation_id: "e404".into(),
        })
    );

    assert_eq!(store.storage().write_count(), writes);
}

#[test]
fn test_remove_patient_cascades() {
    let mut store = PatientStore::open(MemoryStorage::new());
    let mut ana = make_patient("p1", "Ana", Some(("Dr. Lee", "Neumología")));
    ana.evaluations.push(make_evaluation("e1", "2024-03-01T10:00:00Z"));
    store.dispatch(Action::AddPatient(ana));
    store.dispatch(Action::AddPatient(make_patient(
        "p2",
        "Luis",
        Some(("Dra. Ruiz", "Medicina interna")),
    )));

    store.dispatch(Action::RemovePatient {
        patient_id: "p1".into(),
    });

    let state = store.state();
    assert_eq!(state.patients().len(), 1);
    assert_eq!(state.doctors().len(), 1);
    assert_eq!(state.doctors()[0].name, "Dra. Ruiz");
    assert!(stored(&store).iter().all(|p| p.id != "p1"));
}

#[test]
fn test_reopen_from_persisted_document() {
    let mut store = PatientStore::open(MemoryStorage::new());
    store.dispatch(Action::AddPatient(make_patient(
        "p1",
        "Ana",
        Some(("Dr. Lee", "Neumología")),
    )));
    let raw = store.storage().read_slot(STORAGE_KEY).unwrap().unwrap();

    let reopened = PatientStore::open(MemoryStorage::with_slot(STORAGE_KEY, raw.clone()));
    assert_eq!(reopened.state(), store.state());
    assert_eq!(reopened.storage().write_count(), 1);
    assert_eq!(
        reopened.storage().read_slot(STORAGE_KEY).unwrap().unwrap(),
        raw
    );
}

#[test]
fn test_non_finite_measurement_survives_reopen() {
    let mut store = PatientStore::open(MemoryStorage::new());
    store.dispatch(Action::AddPatient(make_patient("p1", "Ana", None)));
    store.dispatch(Action::AddPatient(make_patient("p2", "Luis", None)));

    let mut evaluation = make_evaluation("e1", "2024-03-01T10:00:00Z");
    evaluation.continuous_value = f64::NAN;
    let outcome = store.dispatch(Action::AddEvaluation {
        patient_id: "p1".into(),
        evaluation,
    });
    assert_eq!(outcome, Outcome::Applied);

    let raw = store.storage().read_slot(STORAGE_KEY).unwrap().unwrap();
    assert!(raw.contains(r#""continuousValue":null"#));

    let mut reopened = PatientStore::open(MemoryStorage::with_slot(STORAGE_KEY, raw.clone()));
    let patients = reopened.state().patients();
    assert_eq!(patients.len(), 2);
    assert!(patients[0].evaluations[0].continuous_value.is_nan());
    assert_eq!(
        reopened.storage().read_slot(STORAGE_KEY).unwrap().unwrap(),
        raw
    );

    // Later writes keep every patient
    reopened.dispatch(Action::RemoveEvaluation {
        patient_id: "p1".into(),
        evaluation_id: "e1".into(),
    });
    assert_eq!(stored(&reopened).len(), 2);
}

#[test]
fn test_stored_document_round_trips_byte_for_byte() {
    let mut ana = make_patient("p1", "Ana", Some(("Dr. Lee", "Neumología")));
    ana.comorbidities = vec!["Asma".into(), "Obesidad".into()];
    ana.bed_type = "UCI".into();
    ana.bed_number = "12B".into();
    let mut evaluation = make_evaluation("e1", "2024-03-01T10:00:00.000Z");
    evaluation.continuous_value = -1.75;
    ana.evaluations.push(evaluation);

    let raw = encode_patients(&[ana, make_patient("p2", "Luis", None)]).unwrap();
    let store = PatientStore::open(MemoryStorage::with_slot(STORAGE_KEY, raw.clone()));

    // Opening writes the loaded collection straight back
    assert_eq!(store.storage().write_count(), 1);
    let rewritten = store.storage().read_slot(STORAGE_KEY).unwrap().unwrap();
    assert_eq!(rewritten, raw);
}

#[test]
fn test_legacy_document_without_staff_fields() {
    let raw = r#"[{"id":"p1","name":"Ana","diagnosis":"Asma","comorbidities":[],"medications":[],"treatments":[],"surgicalProcedures":[],"supplies":[],"bedType":"UCI","bedNumber":"4","evaluations":[]}]"#;

    let store = PatientStore::open(MemoryStorage::with_slot(STORAGE_KEY, raw));
    let patient = &store.state().patients()[0];
    assert_eq!(patient.nurse_in_charge, "");
    assert!(patient.treating_physicians.is_empty());
    assert!(store.state().doctors().is_empty());

    // Rewritten on open with the staff fields filled in
    let rewritten = store.storage().read_slot(STORAGE_KEY).unwrap().unwrap();
    assert!(rewritten.contains(r#""nurseInCharge":"""#));
    assert!(rewritten.contains(r#""treatingPhysicians":[]"#));
}

#[test]
fn test_corrupt_document_is_replaced_on_open() {
    let mut store = PatientStore::open(MemoryStorage::with_slot(STORAGE_KEY, "{not json"));
    assert!(store.state().is_initialized());
    assert!(store.state().patients().is_empty());
    assert_eq!(
        store.storage().read_slot(STORAGE_KEY).unwrap().as_deref(),
        Some("[]")
    );

    store.dispatch(Action::AddPatient(make_patient("p1", "Ana", None)));
    let raw = store.storage().read_slot(STORAGE_KEY).unwrap().unwrap();
    assert_eq!(decode_patients(&raw).unwrap().len(), 1);
}

#[test]
fn test_dispatch_from_json_envelopes() {
    let mut ana = make_patient("p1", "Ana", None);
    ana.evaluations.push(make_evaluation("e1", "2024-03-01T10:00:00Z"));
    let raw = encode_patients(&[ana]).unwrap();
    let mut store = PatientStore::open(MemoryStorage::with_slot(STORAGE_KEY, raw));

    let remove_evaluation = Action::from_json(
        r#"{"type":"REMOVE_EVALUATION","payload":{"patientId":"p1","evaluationId":"e1"}}"#,
    )
    .unwrap();
    assert_eq!(store.dispatch(remove_evaluation), Outcome::Applied);

    let unknown = Action::from_json(r#"{"type":"ARCHIVE_PATIENT","payload":"p1"}"#).unwrap();
    assert_eq!(
        store.dispatch(unknown),
        Outcome::Ignored("ARCHIVE_PATIENT".into())
    );

    let remove_patient = Action::from_json(r#"{"type":"REMOVE_PATIENT","payload":"p1"}"#).unwrap();
    assert_eq!(store.dispatch(remove_patient), Outcome::Applied);
    assert!(store.state().patients().is_empty());
}
