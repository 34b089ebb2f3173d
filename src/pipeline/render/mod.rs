//! PDF rendering of generated documents and per-owner bundle merging.

pub mod locks;
pub mod merge;
pub mod writer;

pub use locks::*;
pub use merge::*;
pub use writer::*;

use thiserror::Error;
use uuid::Uuid;

use super::PipelineError;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("Could not read PDF {path}: {reason}")]
    UnreadableInput { path: String, reason: String },

    #[error("No PDF files were provided to merge")]
    NothingToMerge,

    #[error("No merged bundle exists for owner {0}")]
    BundleNotFound(Uuid),

    #[error("Render task failed: {0}")]
    TaskFailed(String),
}

impl From<RenderError> for PipelineError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::NothingToMerge => Self::InvalidInput(err.to_string()),
            RenderError::BundleNotFound(_) => Self::NotFound(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}
