//! CuraTrack Core Library
//!
//! Local-first patient record engine for a small clinical unit.
//!
//! # Architecture
//!
//! ```text
//!     UI host (forms, lists, dialogs)
//!              │  Action
//!              ▼
//!     ┌─────────────────┐      ┌──────────────────────┐
//!     │  PatientStore   │─────▶│  reduce(state, act)  │
//!     │  (facade)       │◀─────│  + build_directory   │
//!     └───────┬─────────┘      └──────────────────────┘
//!             │ after every accepted transition
//!     ┌───────┴──────────┬───────────────────────┐
//!     ▼                  ▼                       ▼
//! listeners       PatientStorage::save     read-side views
//! (snapshot)      (one JSON document,      (newest-first,
//!                  errors logged)           per-physician)
//! ```
//!
//! # Core Principle
//!
//! **The physician directory is never edited.** It is recomputed from the
//! patient collection on every transition, so it always matches.
//!
//! # Modules
//!
//! - [`models`]: Domain types (Patient, Evaluation, TreatingPhysician)
//! - [`reducer`]: Actions, the pure reducer and the physician directory
//! - [`store`]: Store facade with load-on-open and write-back
//! - [`storage`]: Persistence port with SQLite and in-memory slots
//! - [`views`]: Read-side projections and patient search
//! - [`validation`]: Form drafts and their rules
//! - [`config`]: Startup configuration

pub mod config;
pub mod models;
pub mod reducer;
pub mod storage;
pub mod store;
pub mod validation;
pub mod views;

// Re-export commonly used types
pub use config::CoreConfig;
pub use models::{Evaluation, EvaluationType, ListField, Patient, TreatingPhysician};
pub use reducer::{reduce, Action, AppState, Missing, Outcome, Reduction};
pub use storage::{MemoryStorage, PatientStorage, SqliteStorage, STORAGE_KEY};
pub use store::PatientStore;
pub use validation::{EvaluationDraft, PatientDraft};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum CuraTrackError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<storage::StorageError> for CuraTrackError {
    fn from(e: storage::StorageError) -> Self {
        CuraTrackError::StorageError(e.to_string())
    }
}

impl From<serde_json::Error> for CuraTrackError {
    fn from(e: serde_json::Error) -> Self {
        CuraTrackError::SerializationError(e.to_string())
    }
}

impl From<reducer::ActionParseError> for CuraTrackError {
    fn from(e: reducer::ActionParseError) -> Self {
        CuraTrackError::InvalidInput(e.to_string())
    }
}

impl From<validation::ValidationError> for CuraTrackError {
    fn from(e: validation::ValidationError) -> Self {
        CuraTrackError::InvalidInput(e.to_string())
    }
}

impl From<config::ConfigError> for CuraTrackError {
    fn from(e: config::ConfigError) -> Self {
        CuraTrackError::InvalidInput(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for CuraTrackError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        CuraTrackError::StorageError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a store backed by the SQLite file at the given path.
#[uniffi::export]
pub fn open_store(path: String) -> Result<Arc<CuraTrackCore>, CuraTrackError> {
    CuraTrackCore::open(&CoreConfig::with_database(path))
}

/// Create a store backed by in-memory SQLite (for testing).
#[uniffi::export]
pub fn open_store_in_memory() -> Result<Arc<CuraTrackCore>, CuraTrackError> {
    CuraTrackCore::open(&CoreConfig::in_memory())
}

/// Open a store from raw configuration values supplied by the host.
#[uniffi::export]
pub fn open_store_with_config(
    database_path: Option<String>,
    persist: Option<String>,
) -> Result<Arc<CuraTrackCore>, CuraTrackError> {
    let config = CoreConfig::from_values(database_path, persist)?;
    CuraTrackCore::open(&config)
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe store wrapper for FFI.
#[derive(uniffi::Object)]
pub struct CuraTrackCore {
    store: Arc<Mutex<PatientStore<SqliteStorage>>>,
}

impl CuraTrackCore {
    fn open(config: &CoreConfig) -> Result<Arc<Self>, CuraTrackError> {
        let storage = match config.database_path() {
            Some(path) => SqliteStorage::open(path)?,
            None => SqliteStorage::open_in_memory()?,
        };
        let store = PatientStore::open_with_config(storage, config);
        Ok(Arc::new(Self {
            store: Arc::new(Mutex::new(store)),
        }))
    }
}

#[uniffi::export]
impl CuraTrackCore {
    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Dispatch an action given as its JSON envelope.
    pub fn dispatch_json(&self, action_json: String) -> Result<FfiOutcome, CuraTrackError> {
        let action = Action::from_json(&action_json)?;
        let mut store = self.store.lock()?;
        Ok(store.dispatch(action).into())
    }

    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Validate a patient form and add the new patient.
    pub fn add_patient(&self, draft: FfiPatientDraft) -> Result<FfiPatient, CuraTrackError> {
        let patient = PatientDraft::from(draft).into_patient()?;
        let mut store = self.store.lock()?;
        store.dispatch(Action::AddPatient(patient.clone()));
        Ok(patient.into())
    }

    /// Validate a patient form and replace the existing record.
    pub fn update_patient(
        &self,
        patient_id: String,
        draft: FfiPatientDraft,
    ) -> Result<FfiPatient, CuraTrackError> {
        let mut store = self.store.lock()?;
        let existing = views::find_patient(store.state().patients(), &patient_id)
            .ok_or_else(|| CuraTrackError::NotFound(format!("patient {}", patient_id)))?;
        let patient = PatientDraft::from(draft).apply_to(existing)?;
        store.dispatch(Action::UpdatePatient(patient.clone()));
        Ok(patient.into())
    }

    /// Remove a patient and all of its evaluations.
    pub fn remove_patient(&self, patient_id: String) -> Result<FfiOutcome, CuraTrackError> {
        let mut store = self.store.lock()?;
        Ok(store.dispatch(Action::RemovePatient { patient_id }).into())
    }

    /// Get a patient by id.
    pub fn get_patient(&self, patient_id: String) -> Result<Option<FfiPatient>, CuraTrackError> {
        let store = self.store.lock()?;
        let patient = views::find_patient(store.state().patients(), &patient_id);
        Ok(patient.cloned().map(Into::into))
    }

    /// All patients in stored order.
    pub fn patients(&self) -> Result<Vec<FfiPatient>, CuraTrackError> {
        let store = self.store.lock()?;
        Ok(store
            .state()
            .patients()
            .iter()
            .cloned()
            .map(Into::into)
            .collect())
    }

    /// Search patients by name.
    pub fn search_patients(
        &self,
        query: String,
        limit: u32,
    ) -> Result<Vec<FfiPatient>, CuraTrackError> {
        let store = self.store.lock()?;
        let patients = views::search_patients(store.state().patients(), &query, limit as usize);
        Ok(patients.into_iter().cloned().map(Into::into).collect())
    }

    // =========================================================================
    // Evaluation Operations
    // =========================================================================

    /// Validate an evaluation form and add it to the patient.
    pub fn add_evaluation(
        &self,
        patient_id: String,
        draft: FfiEvaluationDraft,
    ) -> Result<FfiEvaluation, CuraTrackError> {
        let mut store = self.store.lock()?;
        let patient = views::find_patient(store.state().patients(), &patient_id)
            .ok_or_else(|| CuraTrackError::NotFound(format!("patient {}", patient_id)))?;
        let evaluation = EvaluationDraft::from(draft).into_evaluation_for(patient)?;
        store.dispatch(Action::AddEvaluation {
            patient_id,
            evaluation: evaluation.clone(),
        });
        Ok(evaluation.into())
    }

    /// Validate an evaluation form and replace the existing evaluation.
    pub fn update_evaluation(
        &self,
        patient_id: String,
        evaluation_id: String,
        draft: FfiEvaluationDraft,
    ) -> Result<FfiEvaluation, CuraTrackError> {
        let mut store = self.store.lock()?;
        let (_, existing) =
            views::find_evaluation(store.state().patients(), &patient_id, &evaluation_id)
                .ok_or_else(|| {
                    CuraTrackError::NotFound(format!(
                        "evaluation {} of patient {}",
                        evaluation_id, patient_id
                    ))
                })?;
        let evaluation = EvaluationDraft::from(draft).apply_to(existing)?;
        store.dispatch(Action::UpdateEvaluation {
            patient_id,
            evaluation: evaluation.clone(),
        });
        Ok(evaluation.into())
    }

    /// Remove one evaluation from a patient.
    pub fn remove_evaluation(
        &self,
        patient_id: String,
        evaluation_id: String,
    ) -> Result<FfiOutcome, CuraTrackError> {
        let mut store = self.store.lock()?;
        Ok(store
            .dispatch(Action::RemoveEvaluation {
                patient_id,
                evaluation_id,
            })
            .into())
    }

    /// A patient's evaluations, newest first.
    pub fn patient_evaluations(
        &self,
        patient_id: String,
    ) -> Result<Vec<FfiEvaluation>, CuraTrackError> {
        let store = self.store.lock()?;
        let patient = views::find_patient(store.state().patients(), &patient_id)
            .ok_or_else(|| CuraTrackError::NotFound(format!("patient {}", patient_id)))?;
        Ok(views::evaluations_newest_first(patient)
            .into_iter()
            .cloned()
            .map(Into::into)
            .collect())
    }

    // =========================================================================
    // Physician Directory
    // =========================================================================

    /// De-duplicated physicians across all patients, sorted by name.
    pub fn doctors(&self) -> Result<Vec<FfiPhysician>, CuraTrackError> {
        let store = self.store.lock()?;
        Ok(store
            .state()
            .doctors()
            .iter()
            .cloned()
            .map(Into::into)
            .collect())
    }

    /// Evaluations of every patient a physician treats, newest first.
    pub fn physician_evaluations(
        &self,
        physician_name: String,
    ) -> Result<Vec<FfiPhysicianEvaluation>, CuraTrackError> {
        let store = self.store.lock()?;
        let listing = views::evaluations_for_physician(store.state().patients(), &physician_name);
        Ok(listing.into_iter().map(Into::into).collect())
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Whether the initial load has completed.
    pub fn is_initialized(&self) -> Result<bool, CuraTrackError> {
        let store = self.store.lock()?;
        Ok(store.state().is_initialized())
    }

    /// Full `{patients, doctors, isInitialized}` snapshot as JSON.
    pub fn state_json(&self) -> Result<String, CuraTrackError> {
        let store = self.store.lock()?;
        Ok(serde_json::to_string(store.state())?)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe reducer outcome.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum FfiOutcome {
    Applied,
    NotFound { detail: String },
    Ignored { kind: String },
}

impl From<Outcome> for FfiOutcome {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Applied => FfiOutcome::Applied,
            Outcome::NotFound(Missing::Patient(id)) => FfiOutcome::NotFound {
                detail: format!("patient {}", id),
            },
            Outcome::NotFound(Missing::Evaluation {
                patient_id,
                evaluation_id,
            }) => FfiOutcome::NotFound {
                detail: format!("evaluation {} of patient {}", evaluation_id, patient_id),
            },
            Outcome::Ignored(kind) => FfiOutcome::Ignored { kind },
        }
    }
}

/// FFI-safe evaluation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiEvaluationType {
    Treatment,
    Surgical,
}

impl From<EvaluationType> for FfiEvaluationType {
    fn from(kind: EvaluationType) -> Self {
        match kind {
            EvaluationType::Treatment => FfiEvaluationType::Treatment,
            EvaluationType::Surgical => FfiEvaluationType::Surgical,
        }
    }
}

impl From<FfiEvaluationType> for EvaluationType {
    fn from(kind: FfiEvaluationType) -> Self {
        match kind {
            FfiEvaluationType::Treatment => EvaluationType::Treatment,
            FfiEvaluationType::Surgical => EvaluationType::Surgical,
        }
    }
}

/// FFI-safe physician.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct FfiPhysician {
    pub name: String,
    pub specialty: String,
}

impl From<TreatingPhysician> for FfiPhysician {
    fn from(physician: TreatingPhysician) -> Self {
        Self {
            name: physician.name,
            specialty: physician.specialty,
        }
    }
}

impl From<FfiPhysician> for TreatingPhysician {
    fn from(physician: FfiPhysician) -> Self {
        TreatingPhysician {
            name: physician.name,
            specialty: physician.specialty,
        }
    }
}

/// FFI-safe evaluation.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiEvaluation {
    pub id: String,
    pub kind: FfiEvaluationType,
    pub procedure_name: String,
    pub written_evaluation: String,
    pub scale_rating: f64,
    pub continuous_value: f64,
    pub date_evaluated: String,
}

impl From<Evaluation> for FfiEvaluation {
    fn from(evaluation: Evaluation) -> Self {
        Self {
            id: evaluation.id,
            kind: evaluation.kind.into(),
            procedure_name: evaluation.procedure_name,
            written_evaluation: evaluation.written_evaluation,
            scale_rating: evaluation.scale_rating,
            continuous_value: evaluation.continuous_value,
            date_evaluated: evaluation.date_evaluated,
        }
    }
}

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: String,
    pub name: String,
    pub diagnosis: String,
    pub comorbidities: Vec<String>,
    pub medications: Vec<String>,
    pub treatments: Vec<String>,
    pub surgical_procedures: Vec<String>,
    pub supplies: Vec<String>,
    pub bed_type: String,
    pub bed_number: String,
    pub nurse_in_charge: String,
    pub supervising_nurse: String,
    pub treating_physicians: Vec<FfiPhysician>,
    pub evaluations: Vec<FfiEvaluation>,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            diagnosis: patient.diagnosis,
            comorbidities: patient.comorbidities,
            medications: patient.medications,
            treatments: patient.treatments,
            surgical_procedures: patient.surgical_procedures,
            supplies: patient.supplies,
            bed_type: patient.bed_type,
            bed_number: patient.bed_number,
            nurse_in_charge: patient.nurse_in_charge,
            supervising_nurse: patient.supervising_nurse,
            treating_physicians: patient
                .treating_physicians
                .into_iter()
                .map(Into::into)
                .collect(),
            evaluations: patient.evaluations.into_iter().map(Into::into).collect(),
        }
    }
}

/// FFI-safe patient form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientDraft {
    pub name: String,
    pub diagnosis: String,
    pub comorbidities: Vec<String>,
    pub medications: Vec<String>,
    pub treatments: Vec<String>,
    pub surgical_procedures: Vec<String>,
    pub supplies: Vec<String>,
    pub bed_type: String,
    pub bed_number: String,
    pub nurse_in_charge: String,
    pub supervising_nurse: String,
    pub treating_physicians: Vec<FfiPhysician>,
}

impl From<FfiPatientDraft> for PatientDraft {
    fn from(draft: FfiPatientDraft) -> Self {
        PatientDraft {
            name: draft.name,
            diagnosis: draft.diagnosis,
            comorbidities: draft.comorbidities,
            medications: draft.medications,
            treatments: draft.treatments,
            surgical_procedures: draft.surgical_procedures,
            supplies: draft.supplies,
            bed_type: draft.bed_type,
            bed_number: draft.bed_number,
            nurse_in_charge: draft.nurse_in_charge,
            supervising_nurse: draft.supervising_nurse,
            treating_physicians: draft
                .treating_physicians
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

/// FFI-safe evaluation form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiEvaluationDraft {
    pub kind: FfiEvaluationType,
    pub procedure_name: String,
    pub written_evaluation: String,
    pub scale_rating: f64,
    pub continuous_value: f64,
    pub date_evaluated: String,
}

impl From<FfiEvaluationDraft> for EvaluationDraft {
    fn from(draft: FfiEvaluationDraft) -> Self {
        EvaluationDraft {
            kind: draft.kind.into(),
            procedure_name: draft.procedure_name,
            written_evaluation: draft.written_evaluation,
            scale_rating: draft.scale_rating,
            continuous_value: draft.continuous_value,
            date_evaluated: draft.date_evaluated,
        }
    }
}

/// FFI-safe evaluation listed under a physician.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPhysicianEvaluation {
    pub patient_id: String,
    pub patient_name: String,
    pub evaluation: FfiEvaluation,
}

impl From<views::PhysicianEvaluation> for FfiPhysicianEvaluation {
    fn from(listing: views::PhysicianEvaluation) -> Self {
        Self {
            patient_id: listing.patient_id,
            patient_name: listing.patient_name,
            evaluation: listing.evaluation.into(),
        }
    }
}
