pub mod format;
pub mod hash;
pub mod importer;
pub mod reconcile;

pub use format::*;
pub use hash::*;
pub use importer::*;
pub use reconcile::*;

use thiserror::Error;
use uuid::Uuid;

use super::PipelineError;
use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No file was provided")]
    MissingFile,

    #[error("Uploaded file is empty")]
    EmptyFile,

    #[error("ownerId is not a valid identifier: {0}")]
    InvalidOwnerId(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedMediaType(String),

    #[error("File content does not match declared type {declared}")]
    ContentMismatch { declared: String },

    #[error("File too large: {size_mb:.1}MB exceeds {max_mb}MB limit")]
    FileTooLarge { size_mb: f64, max_mb: u64 },

    #[error("Generated document id failed validation: {0}")]
    InvalidGeneratedId(Uuid),

    #[error("Document not found: {0}")]
    DocumentNotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<ImportError> for PipelineError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::MissingFile
            | ImportError::EmptyFile
            | ImportError::InvalidOwnerId(_)
            | ImportError::UnsupportedMediaType(_)
            | ImportError::ContentMismatch { .. }
            | ImportError::FileTooLarge { .. } => Self::InvalidInput(err.to_string()),
            ImportError::DocumentNotFound(_) => Self::NotFound(err.to_string()),
            ImportError::Database(db) => db.into(),
            ImportError::Io(_) | ImportError::InvalidGeneratedId(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}
