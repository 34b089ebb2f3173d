//! Requirement catalog: which documents a visa category demands.

use std::sync::Arc;

use serde::Deserialize;

use super::llm::{parse_object, prompt, LlmClient};
use super::PipelineError;
use crate::models::RequirementProfile;

pub const REQUIREMENTS_FAILED: &str = "Failed to determine required documents";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequirementsReply {
    required_documents: Vec<String>,
}

pub struct RequirementCatalog {
    llm: Arc<dyn LlmClient>,
}

impl RequirementCatalog {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// One model call per request. Failures are never masked: an empty
    /// default here would hide a missing-requirements condition from the
    /// generation step.
    pub async fn get_required_documents(
        &self,
        visa_category: &str,
    ) -> Result<RequirementProfile, PipelineError> {
        let visa_category = visa_category.trim();
        if visa_category.is_empty() {
            return Err(PipelineError::InvalidInput("visaCategory is required".into()));
        }

        let reply = self
            .llm
            .generate(&prompt::build_requirements_prompt(visa_category))
            .await
            .map_err(|e| {
                tracing::error!(visa_category, error = %e, "Requirement lookup call failed");
                PipelineError::Internal(REQUIREMENTS_FAILED.into())
            })?;

        let parsed: RequirementsReply = parse_object(&reply).map_err(|e| {
            tracing::error!(visa_category, error = %e, "Requirement reply unparseable");
            PipelineError::Internal(REQUIREMENTS_FAILED.into())
        })?;

        let required_documents: Vec<String> = parsed
            .required_documents
            .into_iter()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .collect();

        tracing::info!(visa_category, count = required_documents.len(), "Requirements resolved");

        Ok(RequirementProfile {
            visa_category: visa_category.to_string(),
            required_documents,
        })
    }
}
