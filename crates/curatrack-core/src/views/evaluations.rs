//! Evaluation listings.

use std::cmp::Ordering;

use serde::Serialize;

use crate::models::{Evaluation, EvaluationType, Patient};

/// An evaluation tagged with the patient it belongs to.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PhysicianEvaluation {
    pub patient_id: String,
    pub patient_name: String,
    pub evaluation: Evaluation,
}

/// Order two evaluations newest first. Unparseable dates go last.
pub fn newest_first(a: &Evaluation, b: &Evaluation) -> Ordering {
    match (a.evaluated_at(), b.evaluated_at()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// A patient's evaluations, newest first. Stored order is left untouched.
pub fn evaluations_newest_first(patient: &Patient) -> Vec<&Evaluation> {
    let mut evaluations: Vec<&Evaluation> = patient.evaluations.iter().collect();
    evaluations.sort_by(|a, b| newest_first(a, b));
    evaluations
}

/// Every evaluation of every patient treated by `physician_name`, newest first.
pub fn evaluations_for_physician(
    patients: &[Patient],
    physician_name: &str,
) -> Vec<PhysicianEvaluation> {
    let mut listing: Vec<PhysicianEvaluation> = patients
        .iter()
        .filter(|p| p.is_treated_by(physician_name))
        .flat_map(|p| {
            p.evaluations.iter().map(move |e| PhysicianEvaluation {
                patient_id: p.id.clone(),
                patient_name: p.name.clone(),
                evaluation: e.clone(),
            })
        })
        .collect();

    listing.sort_by(|a, b| newest_first(&a.evaluation, &b.evaluation));
    listing
}

/// Procedures an evaluation of `kind` can rate for this patient.
pub fn procedure_options(patient: &Patient, kind: EvaluationType) -> &[String] {
    match kind {
        EvaluationType::Treatment => &patient.treatments,
        EvaluationType::Surgical => &patient.surgical_procedures,
    }
}

/// Whether the evaluation names a procedure the patient actually has.
pub fn has_known_procedure(patient: &Patient, evaluation: &Evaluation) -> bool {
    procedure_options(patient, evaluation.kind)
        .iter()
        .any(|p| p == &evaluation.procedure_name)
}
