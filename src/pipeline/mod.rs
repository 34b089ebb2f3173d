pub mod analysis;
pub mod extraction;
pub mod generation;
pub mod import;
pub mod llm;
pub mod recommendation;
pub mod render;
pub mod requirements;
pub mod storage;

#[cfg(test)]
mod integration_tests;

use thiserror::Error;

use crate::db::DatabaseError;

/// Cross-component failure taxonomy surfaced to callers.
///
/// Component errors convert into one of three kinds; callers (the HTTP
/// layer in particular) never need to know which component failed.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl From<DatabaseError> for PipelineError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity_type, id } => {
                Self::NotFound(format!("{entity_type} {id} not found"))
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Parse a caller-supplied identifier, rejecting anything that is not a UUID.
pub fn parse_identifier(raw: &str, field: &str) -> Result<uuid::Uuid, PipelineError> {
    uuid::Uuid::parse_str(raw.trim())
        .map_err(|_| PipelineError::InvalidInput(format!("{field} is not a valid identifier")))
}
