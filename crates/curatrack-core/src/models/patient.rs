//! Patient models.

use serde::{Deserialize, Serialize};

use super::Evaluation;

/// A physician assigned to a patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TreatingPhysician {
    /// Physician name (also the directory key)
    pub name: String,
    /// Medical specialty (e.g., "Cardiología")
    pub specialty: String,
}

impl TreatingPhysician {
    pub fn new(name: impl Into<String>, specialty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            specialty: specialty.into(),
        }
    }
}

/// A patient record with its nested evaluations.
///
/// Serialized with camelCase keys. Records written before nurses and
/// physicians were tracked load with empty values for those fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Opaque unique id, assigned by the caller
    pub id: String,
    /// Patient name
    pub name: String,
    /// Primary diagnosis
    pub diagnosis: String,
    pub comorbidities: Vec<String>,
    pub medications: Vec<String>,
    pub treatments: Vec<String>,
    pub surgical_procedures: Vec<String>,
    pub supplies: Vec<String>,
    /// Bed type (e.g., "UCI", "General")
    pub bed_type: String,
    pub bed_number: String,
    #[serde(default)]
    pub nurse_in_charge: String,
    #[serde(default)]
    pub supervising_nurse: String,
    /// Assigned physicians, in display order (no uniqueness enforced)
    #[serde(default)]
    pub treating_physicians: Vec<TreatingPhysician>,
    /// Evaluations owned by this patient, in insertion order
    pub evaluations: Vec<Evaluation>,
}

/// The free-text list attributes of a patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListField {
    Comorbidities,
    Medications,
    Treatments,
    SurgicalProcedures,
    Supplies,
}

impl ListField {
    pub const ALL: [ListField; 5] = [
        ListField::Comorbidities,
        ListField::Medications,
        ListField::Treatments,
        ListField::SurgicalProcedures,
        ListField::Supplies,
    ];

    /// Serialized key of this field.
    pub fn key(&self) -> &'static str {
        match self {
            ListField::Comorbidities => "comorbidities",
            ListField::Medications => "medications",
            ListField::Treatments => "treatments",
            ListField::SurgicalProcedures => "surgicalProcedures",
            ListField::Supplies => "supplies",
        }
    }
}

impl Patient {
    /// Create a new patient with a fresh UUID and no evaluations.
    pub fn new(name: String, diagnosis: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            diagnosis,
            comorbidities: Vec::new(),
            medications: Vec::new(),
            treatments: Vec::new(),
            surgical_procedures: Vec::new(),
            supplies: Vec::new(),
            bed_type: String::new(),
            bed_number: String::new(),
            nurse_in_charge: String::new(),
            supervising_nurse: String::new(),
            treating_physicians: Vec::new(),
            evaluations: Vec::new(),
        }
    }

    /// Borrow one of the list attributes.
    pub fn list(&self, field: ListField) -> &[String] {
        match field {
            ListField::Comorbidities => &self.comorbidities,
            ListField::Medications => &self.medications,
            ListField::Treatments => &self.treatments,
            ListField::SurgicalProcedures => &self.surgical_procedures,
            ListField::Supplies => &self.supplies,
        }
    }

    /// Mutably borrow one of the list attributes.
    pub fn list_mut(&mut self, field: ListField) -> &mut Vec<String> {
        match field {
            ListField::Comorbidities => &mut self.comorbidities,
            ListField::Medications => &mut self.medications,
            ListField::Treatments => &mut self.treatments,
            ListField::SurgicalProcedures => &mut self.surgical_procedures,
            ListField::Supplies => &mut self.supplies,
        }
    }

    /// Check whether a physician with this exact name is assigned.
    pub fn is_treated_by(&self, physician_name: &str) -> bool {
        self.treating_physicians
            .iter()
            .any(|p| p.name == physician_name)
    }

    /// Get an evaluation by id.
    pub fn evaluation(&self, evaluation_id: &str) -> Option<&Evaluation> {
        self.evaluations.iter().find(|e| e.id == evaluation_id)
    }
}
