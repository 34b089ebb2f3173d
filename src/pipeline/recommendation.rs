//! Visa recommendation from free-form applicant answers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::analysis::fraud::deserialize_confidence;
use super::llm::{parse_object, prompt, LlmClient};
use super::PipelineError;

pub const RECOMMENDATION_FAILED: &str = "Failed to determine a visa recommendation";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VisaRecommendation {
    pub best_visa_type: String,
    #[serde(deserialize_with = "deserialize_confidence")]
    pub confidence: u8,
    #[serde(default)]
    pub reasoning: String,
}

pub struct VisaAdvisor {
    llm: Arc<dyn LlmClient>,
}

impl VisaAdvisor {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn recommend_visa(
        &self,
        answers: &serde_json::Value,
    ) -> Result<VisaRecommendation, PipelineError> {
        if !answers.is_object() {
            return Err(PipelineError::InvalidInput("answers must be a JSON object".into()));
        }

        let reply = self
            .llm
            .generate(&prompt::build_recommendation_prompt(answers))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Visa recommendation call failed");
                PipelineError::Internal(RECOMMENDATION_FAILED.into())
            })?;

        let rec: VisaRecommendation = parse_object(&reply).map_err(|e| {
            tracing::error!(error = %e, "Visa recommendation reply unparseable");
            PipelineError::Internal(RECOMMENDATION_FAILED.into())
        })?;

        if rec.best_visa_type.trim().is_empty() {
            return Err(PipelineError::Internal(RECOMMENDATION_FAILED.into()));
        }

        tracing::info!(visa_type = %rec.best_visa_type, confidence = rec.confidence, "Visa recommended");
        Ok(rec)
    }
}
