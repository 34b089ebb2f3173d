//! Generation of applicant-authored documents for a visa category.

pub mod generator;
pub mod types;

pub use generator::*;
pub use types::*;

/// Message surfaced when the model cannot produce a usable document batch.
pub const GENERATION_FAILED: &str = "Document generation failed";
