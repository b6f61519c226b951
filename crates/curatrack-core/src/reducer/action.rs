//! Actions accepted by the reducer, and their JSON envelope form.
//!
//! On the wire an action is `{"type": "ADD_PATIENT", "payload": ...}`. Any
//! unrecognized `type` becomes [`Action::Unknown`], which the reducer ignores.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::models::{Evaluation, Patient};

/// Action parsing errors.
#[derive(Error, Debug)]
pub enum ActionParseError {
    #[error("Malformed action envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("Malformed payload for {kind}: {source}")]
    Payload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A state transition request issued by the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Replace the collection and mark the state initialized
    Initialize(Vec<Patient>),
    AddPatient(Patient),
    /// Full-record replace, matched by id
    UpdatePatient(Patient),
    /// Remove a patient and every evaluation it owns
    RemovePatient { patient_id: String },
    AddEvaluation {
        patient_id: String,
        evaluation: Evaluation,
    },
    /// Replace an evaluation, matched by id within the patient
    UpdateEvaluation {
        patient_id: String,
        evaluation: Evaluation,
    },
    RemoveEvaluation {
        patient_id: String,
        evaluation_id: String,
    },
    /// An action kind this version does not know
    Unknown(String),
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EvaluationPayload {
    patient_id: String,
    evaluation: Evaluation,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoveEvaluationPayload {
    patient_id: String,
    evaluation_id: String,
}

impl Action {
    /// Wire name of this action kind.
    pub fn kind(&self) -> &str {
        match self {
            Action::Initialize(_) => "INITIALIZE",
            Action::AddPatient(_) => "ADD_PATIENT",
            Action::UpdatePatient(_) => "UPDATE_PATIENT",
            Action::RemovePatient { .. } => "REMOVE_PATIENT",
            Action::AddEvaluation { .. } => "ADD_EVALUATION",
            Action::UpdateEvaluation { .. } => "UPDATE_EVALUATION",
            Action::RemoveEvaluation { .. } => "REMOVE_EVALUATION",
            Action::Unknown(kind) => kind.as_str(),
        }
    }

    /// Parse an action from its JSON envelope.
    pub fn from_json(json: &str) -> Result<Self, ActionParseError> {
        let envelope: Envelope = serde_json::from_str(json).map_err(ActionParseError::Envelope)?;
        Self::from_envelope(envelope)
    }

    fn from_envelope(envelope: Envelope) -> Result<Self, ActionParseError> {
        let Envelope { kind, payload } = envelope;
        let action = match kind.as_str() {
            "INITIALIZE" => Action::Initialize(payload_of(&kind, payload)?),
            "ADD_PATIENT" => Action::AddPatient(payload_of(&kind, payload)?),
            "UPDATE_PATIENT" => Action::UpdatePatient(payload_of(&kind, payload)?),
            "REMOVE_PATIENT" => Action::RemovePatient {
                patient_id: payload_of(&kind, payload)?,
            },
            "ADD_EVALUATION" => {
                let p: EvaluationPayload = payload_of(&kind, payload)?;
                Action::AddEvaluation {
                    patient_id: p.patient_id,
                    evaluation: p.evaluation,
                }
            }
            "UPDATE_EVALUATION" => {
                let p: EvaluationPayload = payload_of(&kind, payload)?;
                Action::UpdateEvaluation {
                    patient_id: p.patient_id,
                    evaluation: p.evaluation,
                }
            }
            "REMOVE_EVALUATION" => {
                let p: RemoveEvaluationPayload = payload_of(&kind, payload)?;
                Action::RemoveEvaluation {
                    patient_id: p.patient_id,
                    evaluation_id: p.evaluation_id,
                }
            }
            _ => Action::Unknown(kind),
        };
        Ok(action)
    }

    /// Serialize to the JSON envelope form.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let payload = match self {
            Action::Initialize(patients) => serde_json::to_value(patients)?,
            Action::AddPatient(patient) | Action::UpdatePatient(patient) => {
                serde_json::to_value(patient)?
            }
            Action::RemovePatient { patient_id } => Value::String(patient_id.clone()),
            Action::AddEvaluation {
                patient_id,
                evaluation,
            }
            | Action::UpdateEvaluation {
                patient_id,
                evaluation,
            } => serde_json::to_value(EvaluationPayload {
                patient_id: patient_id.clone(),
                evaluation: evaluation.clone(),
            })?,
            Action::RemoveEvaluation {
                patient_id,
                evaluation_id,
            } => serde_json::to_value(RemoveEvaluationPayload {
                patient_id: patient_id.clone(),
                evaluation_id: evaluation_id.clone(),
            })?,
            Action::Unknown(_) => Value::Null,
        };
        serde_json::to_string(&json!({ "type": self.kind(), "payload": payload }))
    }
}

fn payload_of<T: serde::de::DeserializeOwned>(
    kind: &str,
    payload: Value,
) -> Result<T, ActionParseError> {
    serde_json::from_value(payload).map_err(|source| ActionParseError::Payload {
        kind: kind.to_string(),
        source,
    })
}
