//! Patient lookup and name search.

use std::cmp::Ordering;

use strsim::{jaro_winkler, normalized_levenshtein};

use crate::models::{Evaluation, Patient};
use crate::reducer::{collation_key, compare_names};

/// Minimum similarity for a fuzzy name match.
pub const SEARCH_THRESHOLD: f64 = 0.75;

/// Get a patient by id.
pub fn find_patient<'a>(patients: &'a [Patient], patient_id: &str) -> Option<&'a Patient> {
    patients.iter().find(|p| p.id == patient_id)
}

/// Get an evaluation together with its owning patient.
pub fn find_evaluation<'a>(
    patients: &'a [Patient],
    patient_id: &str,
    evaluation_id: &str,
) -> Option<(&'a Patient, &'a Evaluation)> {
    let patient = find_patient(patients, patient_id)?;
    let evaluation = patient.evaluation(evaluation_id)?;
    Some((patient, evaluation))
}

/// Search patients by name, best matches first.
///
/// Names containing the query (ignoring case and accents) rank above fuzzy
/// matches.
pub fn search_patients<'a>(patients: &'a [Patient], query: &str, limit: usize) -> Vec<&'a Patient> {
    let query_key = collation_key(query.trim());
    if query_key.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(f64, &Patient)> = patients
        .iter()
        .map(|p| (score_name(&collation_key(&p.name), &query_key), p))
        .filter(|(score, _)| *score >= SEARCH_THRESHOLD)
        .collect();

    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_b
            .partial_cmp(score_a)
            .unwrap_or(Ordering::Equal)
            .then_with(|| compare_names(&a.name, &b.name))
    });

    scored.into_iter().take(limit).map(|(_, p)| p).collect()
}

/// Score a folded name against a folded query (0.0 - 1.0).
fn score_name(name_key: &str, query_key: &str) -> f64 {
    if name_key.contains(query_key) {
        return 1.0;
    }

    // Best of the full name and each word, so a surname alone can match
    std::iter::once(name_key)
        .chain(name_key.split_whitespace())
        .map(|candidate| fuzzy_match(query_key, candidate))
        .fold(0.0, f64::max)
}

/// Combined Jaro-Winkler / Levenshtein similarity.
fn fuzzy_match(a: &str, b: &str) -> f64 {
    jaro_winkler(a, b) * 0.6 + normalized_levenshtein(a, b) * 0.4
}
