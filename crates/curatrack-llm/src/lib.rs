//! LLM helpers for clinical suggestions.
//!
//! This crate builds Spanish prompts for comorbidity suggestions and
//! diagnosis assistance, and parses the model's JSON answers. Inference
//! itself is behind the [`TextGenerator`] trait.

pub mod extraction;
pub mod prompts;

pub use extraction::*;
pub use prompts::*;
