//! Domain reducer for the patient collection.
//!
//! Pipeline: Action → reduce → directory recompute → settled [`AppState`]
//!
//! [`reduce`] is total. Every branch returns a complete new snapshot (or a
//! copy of the old one); nothing is mutated in place. References to missing
//! patients or evaluations leave the state unchanged and are reported through
//! [`Outcome::NotFound`].

mod action;
mod directory;

pub use action::*;
pub use directory::*;

use serde::Serialize;

use crate::models::{Patient, TreatingPhysician};

/// Immutable application state snapshot.
///
/// `doctors` is always the directory of the current `patients`; the only way
/// to build a state is through constructors that recompute it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    patients: Vec<Patient>,
    doctors: Vec<TreatingPhysician>,
    is_initialized: bool,
}

impl AppState {
    /// Empty, not yet initialized state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialized state holding `patients`.
    pub fn initialized(patients: Vec<Patient>) -> Self {
        Self::settle(patients, true)
    }

    fn settle(patients: Vec<Patient>, is_initialized: bool) -> Self {
        let doctors = build_directory(&patients);
        Self {
            patients,
            doctors,
            is_initialized,
        }
    }

    /// Same initialization flag, new collection.
    fn with_patients(&self, patients: Vec<Patient>) -> Self {
        Self::settle(patients, self.is_initialized)
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    /// Physician directory derived from `patients`.
    pub fn doctors(&self) -> &[TreatingPhysician] {
        &self.doctors
    }

    pub fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

/// What an action referred to that did not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    Patient(String),
    Evaluation {
        patient_id: String,
        evaluation_id: String,
    },
}

/// How the reducer handled an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The state was replaced by a new snapshot
    Applied,
    /// A referenced id was absent; state unchanged
    NotFound(Missing),
    /// Unrecognized action kind; state unchanged
    Ignored(String),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

/// Result of one reducer step.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub state: AppState,
    pub outcome: Outcome,
}

impl Reduction {
    fn applied(state: AppState) -> Self {
        Self {
            state,
            outcome: Outcome::Applied,
        }
    }

    fn unchanged(state: &AppState, outcome: Outcome) -> Self {
        Self {
            state: state.clone(),
            outcome,
        }
    }
}

/// Compute the next state for an action.
pub fn reduce(state: &AppState, action: Action) -> Reduction {
    match action {
        Action::Initialize(patients) => Reduction::applied(AppState::settle(patients, true)),

        Action::AddPatient(patient) => {
            let mut patients = state.patients.clone();
            patients.push(patient);
            Reduction::applied(state.with_patients(patients))
        }

        Action::UpdatePatient(patient) => {
            let patient_id = patient.id.clone();
            edit_patient(state, &patient_id, |_| Ok(patient.clone()))
        }

        Action::RemovePatient { patient_id } => {
            if !state.patients.iter().any(|p| p.id == patient_id) {
                return Reduction::unchanged(state, Outcome::NotFound(Missing::Patient(patient_id)));
            }
            let patients = state
                .patients
                .iter()
                .filter(|p| p.id != patient_id)
                .cloned()
                .collect();
            Reduction::applied(state.with_patients(patients))
        }

        Action::AddEvaluation {
            patient_id,
            evaluation,
        } => edit_patient(state, &patient_id, |p| {
            let mut next = p.clone();
            next.evaluations.push(evaluation.clone());
            Ok(next)
        }),

        Action::UpdateEvaluation {
            patient_id,
            evaluation,
        } => edit_patient(state, &patient_id, |p| {
            if p.evaluation(&evaluation.id).is_none() {
                return Err(missing_evaluation(&p.id, &evaluation.id));
            }
            let mut next = p.clone();
            for existing in next.evaluations.iter_mut().filter(|e| e.id == evaluation.id) {
                *existing = evaluation.clone();
            }
            Ok(next)
        }),

        Action::RemoveEvaluation {
            patient_id,
            evaluation_id,
        } => edit_patient(state, &patient_id, |p| {
            if p.evaluation(&evaluation_id).is_none() {
                return Err(missing_evaluation(&p.id, &evaluation_id));
            }
            let mut next = p.clone();
            next.evaluations.retain(|e| e.id != evaluation_id);
            Ok(next)
        }),

        Action::Unknown(kind) => Reduction::unchanged(state, Outcome::Ignored(kind)),
    }
}

/// Rebuild the collection with every patient matching `patient_id` passed
/// through `edit`. Any refusal from `edit` leaves the whole state unchanged.
fn edit_patient<F>(state: &AppState, patient_id: &str, mut edit: F) -> Reduction
where
    F: FnMut(&Patient) -> Result<Patient, Missing>,
{
    let mut matched = false;
    let mut patients = Vec::with_capacity(state.patients.len());

    for patient in &state.patients {
        if patient.id != patient_id {
            patients.push(patient.clone());
            continue;
        }
        matched = true;
        match edit(patient) {
            Ok(edited) => patients.push(edited),
            Err(missing) => return Reduction::unchanged(state, Outcome::NotFound(missing)),
        }
    }

    if !matched {
        let missing = Missing::Patient(patient_id.to_string());
        return Reduction::unchanged(state, Outcome::NotFound(missing));
    }
    Reduction::applied(state.with_patients(patients))
}

fn missing_evaluation(patient_id: &str, evaluation_id: &str) -> Missing {
    Missing::Evaluation {
        patient_id: patient_id.to_string(),
        evaluation_id: evaluation_id.to_string(),
    }
}
