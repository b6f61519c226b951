//! Evaluation models.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

/// What kind of procedure an evaluation rates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationType {
    /// Rates one of the patient's treatments
    Treatment,
    /// Rates one of the patient's surgical procedures
    Surgical,
}

impl EvaluationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationType::Treatment => "treatment",
            EvaluationType::Surgical => "surgical",
        }
    }
}

/// A dated, scored assessment of one treatment or surgical procedure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    /// Opaque unique id within the owning patient
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EvaluationType,
    /// Name of the rated treatment or surgical procedure
    pub procedure_name: String,
    pub written_evaluation: String,
    /// Rating in [0.0, 1.0]
    #[serde(deserialize_with = "nullable_f64")]
    pub scale_rating: f64,
    /// Unit-less numeric measurement
    #[serde(deserialize_with = "nullable_f64")]
    pub continuous_value: f64,
    /// ISO 8601 timestamp
    pub date_evaluated: String,
}

/// serde_json writes non-finite floats as `null`; read them back as NaN.
fn nullable_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

impl Evaluation {
    /// Create a new evaluation with a fresh UUID, dated now.
    pub fn new(kind: EvaluationType, procedure_name: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            procedure_name,
            written_evaluation: String::new(),
            scale_rating: 0.5,
            continuous_value: 0.0,
            date_evaluated: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Parsed evaluation date, if the stored string is valid RFC 3339.
    pub fn evaluated_at(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.date_evaluated).ok()
    }

    /// Rating as a whole percentage, rounded.
    pub fn rating_percent(&self) -> u8 {
        (self.scale_rating.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}
