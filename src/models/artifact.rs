use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One model-synthesized document plus its rendered PDF. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedArtifact {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub visa_category: String,
    pub document_type: String,
    pub format: String,
    pub page_count: u32,
    pub content: String,
    pub pdf_path: String,
    pub created_at: NaiveDateTime,
}
