//! External natural-language model capability.
//!
//! Every call site goes prompt-in, raw-text-out through [`LlmClient`] and
//! repairs the reply with the shared two-stage parser in [`parser`].

pub mod mock;
pub mod ollama;
pub mod openai;
pub mod parser;
pub mod prompt;
pub mod sanitize;
pub mod types;

pub use mock::*;
pub use ollama::*;
pub use openai::*;
pub use parser::*;
pub use sanitize::*;
pub use types::*;

use thiserror::Error;

use super::PipelineError;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Cannot reach model endpoint at {0}")]
    Connection(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Model endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Could not decode model endpoint reply: {0}")]
    ResponseParsing(String),

    #[error("Model returned an empty reply")]
    EmptyResponse,

    #[error("Model reply is not valid JSON: {0}")]
    JsonParsing(String),

    #[error("Model client configuration error: {0}")]
    Configuration(String),
}

impl From<LlmError> for PipelineError {
    fn from(err: LlmError) -> Self {
        Self::Internal(err.to_string())
    }
}
