use serde::{Deserialize, Serialize};

use super::fraud::deserialize_confidence;
use crate::pipeline::llm::{parse_object, prompt, LlmClient};

pub const UNKNOWN_TYPE: &str = "Unknown";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub predicted_type: String,
    #[serde(deserialize_with = "deserialize_confidence")]
    pub confidence: u8,
    #[serde(default)]
    pub summary: String,
}

impl ClassificationResult {
    pub fn failed() -> Self {
        Self {
            predicted_type: UNKNOWN_TYPE.to_string(),
            confidence: 0,
            summary: "Classification failed".to_string(),
        }
    }
}

/// Ask the model for a document type. Never fails: errors and blank labels
/// degrade to [`ClassificationResult::failed`].
pub async fn run_classification(llm: &dyn LlmClient, text: &str) -> ClassificationResult {
    let reply = match llm.generate(&prompt::build_classification_prompt(text)).await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(model = llm.model_name(), error = %e, "Classification call failed");
            return ClassificationResult::failed();
        }
    };

    match parse_object::<ClassificationResult>(&reply) {
        Ok(mut result) if !result.predicted_type.trim().is_empty() => {
            result.predicted_type = result.predicted_type.trim().to_string();
            result
        }
        Ok(_) => {
            tracing::warn!("Classification reply had a blank type");
            ClassificationResult::failed()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Classification reply unparseable");
            ClassificationResult::failed()
        }
    }
}
