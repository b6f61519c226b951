//! Input validation for patient and evaluation forms.
//!
//! Drafts hold what a form collected. Converting a draft checks it and builds
//! the complete record an action carries: fresh ids for new records, kept ids
//! (and kept evaluations) for edits.

use thiserror::Error;

use crate::models::{Evaluation, EvaluationType, Patient, TreatingPhysician};
use crate::views::procedure_options;

/// Minimum length of a written evaluation, in characters.
pub const MIN_WRITTEN_EVALUATION_CHARS: usize = 10;

/// Minimum name length accepted when editing an existing patient.
pub const MIN_EDITED_NAME_CHARS: usize = 2;

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("{field} must be between 0 and 1, got {value}")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("{0} must be a finite number")]
    NotFinite(&'static str),

    #[error("Invalid date '{0}' (expected RFC 3339)")]
    InvalidDate(String),

    #[error("'{procedure}' is not one of the patient's {kind} procedures")]
    UnknownProcedure { procedure: String, kind: &'static str },
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Patient form contents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientDraft {
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
    pub treating_physicians: Vec<TreatingPhysician>,
}

impl PatientDraft {
    /// Prefill a draft from an existing record (edit form).
    pub fn from_patient(patient: &Patient) -> Self {
        Self {
            name: patient.name.clone(),
            diagnosis: patient.diagnosis.clone(),
            comorbidities: patient.comorbidities.clone(),
            medications: patient.medications.clone(),
            treatments: patient.treatments.clone(),
            surgical_procedures: patient.surgical_procedures.clone(),
            supplies: patient.supplies.clone(),
            bed_type: patient.bed_type.clone(),
            bed_number: patient.bed_number.clone(),
            nurse_in_charge: patient.nurse_in_charge.clone(),
            supervising_nurse: patient.supervising_nurse.clone(),
            treating_physicians: patient.treating_physicians.clone(),
        }
    }

    /// Validate and build a new patient with a fresh id and no evaluations.
    pub fn into_patient(self) -> ValidationResult<Patient> {
        let mut patient = Patient::new(String::new(), String::new());
        self.fill(&mut patient)?;
        Ok(patient)
    }

    /// Validate and build the replacement for `existing`, keeping its id and
    /// evaluations.
    pub fn apply_to(self, existing: &Patient) -> ValidationResult<Patient> {
        let mut patient = existing.clone();
        self.fill(&mut patient)?;
        if patient.name.chars().count() < MIN_EDITED_NAME_CHARS {
            return Err(ValidationError::TooShort {
                field: "name",
                min: MIN_EDITED_NAME_CHARS,
            });
        }
        Ok(patient)
    }

    fn fill(self, patient: &mut Patient) -> ValidationResult<()> {
        patient.name = required("name", &self.name)?;
        patient.diagnosis = required("diagnosis", &self.diagnosis)?;
        patient.comorbidities = clean_list(self.comorbidities);
        patient.medications = clean_list(self.medications);
        patient.treatments = clean_list(self.treatments);
        patient.surgical_procedures = clean_list(self.surgical_procedures);
        patient.supplies = clean_list(self.supplies);
        patient.bed_type = self.bed_type.trim().to_string();
        patient.bed_number = self.bed_number.trim().to_string();
        patient.nurse_in_charge = self.nurse_in_charge.trim().to_string();
        patient.supervising_nurse = self.supervising_nurse.trim().to_string();
        patient.treating_physicians = clean_physicians(self.treating_physicians);
        Ok(())
    }
}

/// Evaluation form contents.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationDraft {
    pub kind: EvaluationType,
    pub procedure_name: String,
    pub written_evaluation: String,
    pub scale_rating: f64,
    pub continuous_value: f64,
    pub date_evaluated: String,
}

impl EvaluationDraft {
    /// Empty form for `kind`, dated now, with the slider at the midpoint.
    pub fn new(kind: EvaluationType) -> Self {
        let blank = Evaluation::new(kind, String::new());
        Self::from_evaluation(&blank)
    }

    /// Prefill a draft from an existing evaluation (edit form).
    pub fn from_evaluation(evaluation: &Evaluation) -> Self {
        Self {
            kind: evaluation.kind,
            procedure_name: evaluation.procedure_name.clone(),
            written_evaluation: evaluation.written_evaluation.clone(),
            scale_rating: evaluation.scale_rating,
            continuous_value: evaluation.continuous_value,
            date_evaluated: evaluation.date_evaluated.clone(),
        }
    }

    /// Validate and build a new evaluation with a fresh id.
    pub fn into_evaluation(self) -> ValidationResult<Evaluation> {
        let mut evaluation = Evaluation::new(self.kind, String::new());
        self.fill(&mut evaluation)?;
        Ok(evaluation)
    }

    /// Validate and build a new evaluation that must rate one of the
    /// patient's procedures of the same kind.
    pub fn into_evaluation_for(self, patient: &Patient) -> ValidationResult<Evaluation> {
        let procedure = self.procedure_name.trim();
        if !procedure.is_empty()
            && !procedure_options(patient, self.kind)
                .iter()
                .any(|p| p == procedure)
        {
            return Err(ValidationError::UnknownProcedure {
                procedure: procedure.to_string(),
                kind: self.kind.as_str(),
            });
        }
        self.into_evaluation()
    }

    /// Validate and build the replacement for `existing`, keeping its id.
    pub fn apply_to(self, existing: &Evaluation) -> ValidationResult<Evaluation> {
        let mut evaluation = existing.clone();
        self.fill(&mut evaluation)?;
        Ok(evaluation)
    }

    fn fill(self, evaluation: &mut Evaluation) -> ValidationResult<()> {
        let procedure_name = required("procedureName", &self.procedure_name)?;

        let written = self.written_evaluation.trim();
        if written.chars().count() < MIN_WRITTEN_EVALUATION_CHARS {
            return Err(ValidationError::TooShort {
                field: "writtenEvaluation",
                min: MIN_WRITTEN_EVALUATION_CHARS,
            });
        }

        if !self.scale_rating.is_finite() {
            return Err(ValidationError::NotFinite("scaleRating"));
        }
        if !(0.0..=1.0).contains(&self.scale_rating) {
            return Err(ValidationError::OutOfRange {
                field: "scaleRating",
                value: self.scale_rating,
            });
        }
        if !self.continuous_value.is_finite() {
            return Err(ValidationError::NotFinite("continuousValue"));
        }

        let date = self.date_evaluated.trim();
        if chrono::DateTime::parse_from_rfc3339(date).is_err() {
            return Err(ValidationError::InvalidDate(self.date_evaluated.clone()));
        }

        evaluation.kind = self.kind;
        evaluation.procedure_name = procedure_name;
        evaluation.written_evaluation = written.to_string();
        evaluation.scale_rating = self.scale_rating;
        evaluation.continuous_value = self.continuous_value;
        evaluation.date_evaluated = date.to_string();
        Ok(())
    }
}

/// Trim entries, drop empty ones and remove duplicates (first kept).
pub fn clean_list(entries: Vec<String>) -> Vec<String> {
    merge_list_entries(&[], &entries)
}

/// Append the additions not already present, trimmed. Existing entries are
/// kept as they are.
pub fn merge_list_entries(existing: &[String], additions: &[String]) -> Vec<String> {
    let mut merged = existing.to_vec();
    for entry in additions {
        let entry = entry.trim();
        if !entry.is_empty() && !merged.iter().any(|e| e == entry) {
            merged.push(entry.to_string());
        }
    }
    merged
}

fn clean_physicians(physicians: Vec<TreatingPhysician>) -> Vec<TreatingPhysician> {
    physicians
        .into_iter()
        .map(|p| TreatingPhysician::new(p.name.trim(), p.specialty.trim()))
        .filter(|p| !p.name.is_empty())
        .collect()
}

fn required(field: &'static str, value: &str) -> ValidationResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_draft() -> PatientDraft {
        PatientDraft {
            name: "  Ana  ".into(),
            diagnosis: "Insuficiencia cardiaca".into(),
            comorbidities: vec!["Diabetes".into(), " diabetes ".into(), "Diabetes ".into(), "".into()],
            treatments: vec!["Diuréticos".into()],
            treating_physicians: vec![
                TreatingPhysician::new(" Dr. Lee ", "Cardio"),
                TreatingPhysician::new("   ", "Sin nombre"),
            ],
            ..Default::default()
        }
    }

    fn make_evaluation_draft() -> EvaluationDraft {
        EvaluationDraft {
            kind: EvaluationType::Treatment,
            procedure_name: "Diuréticos".into(),
            written_evaluation: "Buena respuesta, menos edema".into(),
            scale_rating: 0.7,
            continuous_value: 2.5,
            date_evaluated: "2024-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn test_into_patient_cleans_fields() {
        let patient = make_draft().into_patient().unwrap();

        assert_eq!(patient.name, "Ana");
        assert_eq!(patient.comorbidities, vec!["Diabetes", "diabetes"]);
        assert_eq!(patient.treating_physicians, vec![TreatingPhysician::new("Dr. Lee", "Cardio")]);
        assert!(patient.evaluations.is_empty());
        assert_eq!(patient.id.len(), 36);
    }

    #[test]
    fn test_required_fields() {
        let mut draft = make_draft();
        draft.diagnosis = " ".into();
        assert_eq!(draft.into_patient(), Err(ValidationError::Required("diagnosis")));

        let mut draft = make_draft();
        draft.name.clear();
        assert_eq!(draft.into_patient(), Err(ValidationError::Required("name")));
    }

    #[test]
    fn test_apply_to_keeps_identity_and_evaluations() {
        let mut existing = make_draft().into_patient().unwrap();
        existing
            .evaluations
            .push(make_evaluation_draft().into_evaluation().unwrap());

        let mut draft = PatientDraft::from_patient(&existing);
        draft.bed_number = "7B".into();
        let updated = draft.apply_to(&existing).unwrap();

        assert_eq!(updated.id, existing.id);
        assert_eq!(updated.evaluations, existing.evaluations);
        assert_eq!(updated.bed_number, "7B");
    }

    #[test]
    fn test_apply_to_requires_longer_name() {
        let existing = make_draft().into_patient().unwrap();

        let mut draft = PatientDraft::from_patient(&existing);
        draft.name = " J ".into();
        assert_eq!(
            draft.apply_to(&existing),
            Err(ValidationError::TooShort {
                field: "name",
                min: MIN_EDITED_NAME_CHARS,
            })
        );

        let mut draft = PatientDraft::from_patient(&existing);
        draft.name = "  ".into();
        assert_eq!(draft.apply_to(&existing), Err(ValidationError::Required("name")));

        let mut draft = PatientDraft::from_patient(&existing);
        draft.name = "Jo".into();
        assert_eq!(draft.apply_to(&existing).unwrap().name, "Jo");

        // New patients only need a name
        let mut draft = make_draft();
        draft.name = "J".into();
        assert!(draft.into_patient().is_ok());
    }

    #[test]
    fn test_evaluation_rules() {
        let evaluation = make_evaluation_draft().into_evaluation().unwrap();
        assert_eq!(evaluation.procedure_name, "Diuréticos");
        assert_eq!(evaluation.id.len(), 36);

        let mut draft = make_evaluation_draft();
        draft.written_evaluation = "Bien".into();
        assert!(matches!(draft.into_evaluation(), Err(ValidationError::TooShort { min: 10, .. })));

        let mut draft = make_evaluation_draft();
        draft.scale_rating = 1.5;
        assert!(matches!(draft.into_evaluation(), Err(ValidationError::OutOfRange { .. })));

        let mut draft = make_evaluation_draft();
        draft.scale_rating = f64::NAN;
        assert_eq!(draft.into_evaluation(), Err(ValidationError::NotFinite("scaleRating")));

        let mut draft = make_evaluation_draft();
        draft.date_evaluated = "01/02/2024".into();
        assert!(matches!(draft.into_evaluation(), Err(ValidationError::InvalidDate(_))));
    }

    #[test]
    fn test_rating_bounds_inclusive() {
        for rating in [0.0, 1.0] {
            let mut draft = make_evaluation_draft();
            draft.scale_rating = rating;
            assert!(draft.into_evaluation().is_ok());
        }
    }

    #[test]
    fn test_evaluation_for_patient_checks_procedure() {
        let patient = make_draft().into_patient().unwrap();
        assert!(make_evaluation_draft().into_evaluation_for(&patient).is_ok());

        let mut draft = make_evaluation_draft();
        draft.kind = EvaluationType::Surgical;
        let err = draft.into_evaluation_for(&patient).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownProcedure {
                procedure: "Diuréticos".into(),
                kind: "surgical"
            }
        );
    }

    #[test]
    fn test_evaluation_apply_to_keeps_id() {
        let existing = make_evaluation_draft().into_evaluation().unwrap();
        let mut draft = EvaluationDraft::from_evaluation(&existing);
        draft.scale_rating = 0.2;

        let updated = draft.apply_to(&existing).unwrap();
        assert_eq!(updated.id, existing.id);
        assert_eq!(updated.scale_rating, 0.2);
    }

    #[test]
    fn test_new_draft_defaults() {
        let draft = EvaluationDraft::new(EvaluationType::Surgical);
        assert_eq!(draft.scale_rating, 0.5);
        assert_eq!(draft.continuous_value, 0.0);
        assert!(draft.procedure_name.is_empty());
    }

    #[test]
    fn test_merge_list_entries() {
        let existing = vec!["Hipertensión".to_string()];
        let merged = merge_list_entries(
            &existing,
            &["Hipertensión".into(), "Obesidad".into(), "  ".into(), "Obesidad".into()],
        );
        assert_eq!(merged, vec!["Hipertensión", "Obesidad"]);
    }
}
