//! Structured suggestions from LLM output.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::prompts::{
    build_comorbidity_prompt, build_diagnosis_prompt, COMORBIDITY_GRAMMAR, DIAGNOSIS_GRAMMAR,
};

/// Minimum length of the symptoms description.
pub const MIN_SYMPTOMS_CHARS: usize = 10;

/// Extraction errors.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("LLM inference error: {0}")]
    Inference(String),
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Comorbidities suggested for a primary diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComorbiditySuggestion {
    pub comorbidities: Vec<String>,
}

/// Input to the diagnosis assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisRequest {
    pub symptoms: String,
    #[serde(default)]
    pub medical_history: String,
    #[serde(default)]
    pub other_relevant_information: String,
}

impl DiagnosisRequest {
    pub fn new(symptoms: impl Into<String>) -> Self {
        Self {
            symptoms: symptoms.into(),
            medical_history: String::new(),
            other_relevant_information: String::new(),
        }
    }

    /// Symptoms must be described in at least [`MIN_SYMPTOMS_CHARS`] characters.
    pub fn validate(&self) -> ExtractionResult<()> {
        if self.symptoms.trim().chars().count() < MIN_SYMPTOMS_CHARS {
            return Err(ExtractionError::InvalidRequest(format!(
                "symptoms must be at least {} characters",
                MIN_SYMPTOMS_CHARS
            )));
        }
        Ok(())
    }
}

/// Diagnosis assistant answer. Every field is free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisAssessment {
    pub suggested_diagnoses: String,
    pub confidence_levels: String,
    pub additional_tests: String,
}

impl DiagnosisAssessment {
    /// Individual diagnoses, ready to pick as a patient's primary diagnosis.
    pub fn diagnoses(&self) -> Vec<String> {
        split_diagnoses(&self.suggested_diagnoses)
    }
}

/// Parse LLM output into a comorbidity suggestion.
pub fn parse_comorbidity_output(output: &str) -> ExtractionResult<ComorbiditySuggestion> {
    parse_json_object(output)
}

/// Parse LLM output into a diagnosis assessment.
pub fn parse_diagnosis_output(output: &str) -> ExtractionResult<DiagnosisAssessment> {
    parse_json_object(output)
}

fn parse_json_object<T: DeserializeOwned>(output: &str) -> ExtractionResult<T> {
    // The model may wrap the object in prose
    let json_start = output.find('{').ok_or_else(|| {
        ExtractionError::InvalidFormat("No JSON object found in response".into())
    })?;
    let json_end = output.rfind('}').ok_or_else(|| {
        ExtractionError::InvalidFormat("No closing brace found in response".into())
    })?;
    if json_end < json_start {
        return Err(ExtractionError::InvalidFormat(
            "Closing brace precedes opening brace".into(),
        ));
    }

    Ok(serde_json::from_str(&output[json_start..=json_end])?)
}

/// Split a free-text diagnosis list into individual entries.
///
/// Separators are commas, semicolons, newlines and the conjunctions
/// " and " / " y ". List markers are stripped and repeats (ignoring case)
/// dropped.
pub fn split_diagnoses(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut diagnoses = Vec::new();

    let pieces = text
        .split(|c: char| matches!(c, ',' | ';' | '\n'))
        .flat_map(|part| part.split(" and "))
        .flat_map(|part| part.split(" y "));

    for piece in pieces {
        let item = strip_list_marker(piece);
        if item.is_empty() {
            continue;
        }
        if seen.insert(item.to_lowercase()) {
            diagnoses.push(item.to_string());
        }
    }

    diagnoses
}

fn strip_list_marker(item: &str) -> &str {
    let mut item = item
        .trim()
        .trim_start_matches(|c: char| matches!(c, '-' | '*' | '•'))
        .trim_start();

    // "1." or "2)"
    let digits = item
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(item.len());
    if digits > 0 && item[digits..].starts_with(|c: char| c == '.' || c == ')') {
        item = item[digits + 1..].trim_start();
    }

    item.trim_end_matches('.').trim()
}

/// Suggestions not already on the patient, in suggested order.
pub fn new_comorbidities(existing: &[String], suggested: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = existing.iter().map(|c| c.trim()).collect();
    suggested
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty() && seen.insert(*c))
        .map(str::to_string)
        .collect()
}

/// Source of comorbidity and diagnosis suggestions.
pub trait ClinicalAssistant {
    fn suggest_comorbidities(&self, diagnosis: &str) -> ExtractionResult<ComorbiditySuggestion>;

    fn assess_diagnosis(&self, request: &DiagnosisRequest)
        -> ExtractionResult<DiagnosisAssessment>;
}

/// Text completion backend, constrained by a JSON grammar.
pub trait TextGenerator {
    fn generate(&self, prompt: &str, grammar: &str) -> ExtractionResult<String>;
}

/// Assistant that prompts a [`TextGenerator`] and parses its answer.
pub struct PromptedAssistant<G> {
    generator: G,
    include_examples: bool,
}

impl<G: TextGenerator> PromptedAssistant<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            include_examples: true,
        }
    }

    pub fn without_examples(mut self) -> Self {
        self.include_examples = false;
        self
    }
}

impl<G: TextGenerator> ClinicalAssistant for PromptedAssistant<G> {
    fn suggest_comorbidities(&self, diagnosis: &str) -> ExtractionResult<ComorbiditySuggestion> {
        let diagnosis = diagnosis.trim();
        if diagnosis.is_empty() {
            return Err(ExtractionError::InvalidRequest(
                "diagnosis is required".into(),
            ));
        }

        let prompt = build_comorbidity_prompt(diagnosis, self.include_examples);
        let output = self.generator.generate(&prompt, COMORBIDITY_GRAMMAR)?;
        debug!(chars = output.len(), "comorbidity output received");
        parse_comorbidity_output(&output).map_err(|e| {
            warn!(error = %e, "unparseable comorbidity output");
            e
        })
    }

    fn assess_diagnosis(
        &self,
        request: &DiagnosisRequest,
    ) -> ExtractionResult<DiagnosisAssessment> {
        request.validate()?;

        let prompt = build_diagnosis_prompt(
            &request.symptoms,
            &request.medical_history,
            &request.other_relevant_information,
            self.include_examples,
        );
        let output = self.generator.generate(&prompt, DIAGNOSIS_GRAMMAR)?;
        debug!(chars = output.len(), "diagnosis output received");
        parse_diagnosis_output(&output).map_err(|e| {
            warn!(error = %e, "unparseable diagnosis output");
            e
        })
    }
}

/// Mock assistant for testing without actual LLM inference.
pub struct MockAssistant;

impl MockAssistant {
    const COMORBIDITIES: &'static [(&'static str, &'static [&'static str])] = &[
        (
            "diabetes",
            &["Hipertensión arterial", "Dislipidemia", "Obesidad"],
        ),
        (
            "hipertens",
            &["Enfermedad renal crónica", "Cardiopatía isquémica"],
        ),
        ("asma", &["Rinitis alérgica", "Reflujo gastroesofágico"]),
        ("epoc", &["Cardiopatía isquémica", "Osteoporosis"]),
    ];

    const DIAGNOSES: &'static [(&'static str, &'static str, &'static str)] = &[
        ("fiebre", "Infección viral", "Media"),
        ("tos", "Bronquitis aguda", "Media"),
        ("cefalea", "Migraña", "Baja"),
        ("dolor torácico", "Síndrome coronario agudo", "Alta"),
    ];
}

impl ClinicalAssistant for MockAssistant {
    fn suggest_comorbidities(&self, diagnosis: &str) -> ExtractionResult<ComorbiditySuggestion> {
        let diagnosis = diagnosis.to_lowercase();
        let suggested: Vec<String> = Self::COMORBIDITIES
            .iter()
            .filter(|(keyword, _)| diagnosis.contains(keyword))
            .flat_map(|(_, comorbidities)| comorbidities.iter().map(|c| c.to_string()))
            .collect();

        Ok(ComorbiditySuggestion {
            comorbidities: new_comorbidities(&[], &suggested),
        })
    }

    fn assess_diagnosis(
        &self,
        request: &DiagnosisRequest,
    ) -> ExtractionResult<DiagnosisAssessment> {
        request.validate()?;

        let symptoms = request.symptoms.to_lowercase();
        let (diagnoses, confidence): (Vec<&str>, Vec<&str>) = Self::DIAGNOSES
            .iter()
            .filter(|(keyword, _, _)| symptoms.contains(keyword))
            .map(|(_, diagnosis, confidence)| (*diagnosis, *confidence))
            .unzip();

        let additional_tests = if diagnoses.is_empty() {
            String::new()
        } else {
            "Hemograma completo, Exploración física".to_string()
        };

        Ok(DiagnosisAssessment {
            suggested_diagnoses: diagnoses.join(", "),
            confidence_levels: confidence.join(", "),
            additional_tests,
        })
    }
}
