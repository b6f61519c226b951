//! Physician directory projection.
//!
//! The directory is recomputed from the full patient collection on every
//! transition; it is never edited on its own.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::models::{Patient, TreatingPhysician};

/// Build the de-duplicated, name-sorted physician directory.
///
/// Physicians are keyed by name. When the same name appears with different
/// specialties, the first occurrence in patient order wins.
pub fn build_directory(patients: &[Patient]) -> Vec<TreatingPhysician> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut doctors: Vec<TreatingPhysician> = Vec::new();

    for physician in patients.iter().flat_map(|p| p.treating_physicians.iter()) {
        if seen.insert(physician.name.as_str()) {
            doctors.push(physician.clone());
        }
    }

    doctors.sort_by(|a, b| compare_names(&a.name, &b.name));
    doctors
}

/// Locale-aware name ordering.
///
/// Compares case-folded names with Latin diacritics removed, so "Álvarez"
/// sorts with "alvarez" rather than after "Zapata". Exact ties fall back to
/// the raw strings.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

/// Case-folded, accent-stripped form of a name.
pub fn collation_key(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .map(fold_diacritic)
        .collect()
}

fn fold_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}
