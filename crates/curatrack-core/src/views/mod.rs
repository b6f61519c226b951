//! Read-side projections over the patient collection.
//!
//! These compute what the screens show (orderings, cross-patient listings,
//! lookups) without touching state.

mod evaluations;
mod patients;

pub use evaluations::*;
pub use patients::*;
