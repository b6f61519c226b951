//! Domain models for the CuraTrack system.

mod evaluation;
mod patient;

pub use evaluation::*;
pub use patient::*;
