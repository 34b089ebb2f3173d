//! Shared types for the API layer.

use std::sync::Arc;

use serde::Deserialize;

use crate::core_state::CoreState;

// ═══════════════════════════════════════════════════════════
// API context
// ═══════════════════════════════════════════════════════════

/// Shared state for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

// ═══════════════════════════════════════════════════════════
// Request bodies
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementsQuery {
    pub visa_category: Option<String>,
}

/// Body of both generation routes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub owner_id: String,
    pub visa_category: String,
    pub answers: serde_json::Value,
    #[serde(default)]
    pub reference_uploads: Vec<String>,
}
