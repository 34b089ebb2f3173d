use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::DocumentStatus;

/// Persisted state of one uploaded document through extraction, fraud
/// analysis and classification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub file_name: String,
    pub media_type: String,
    pub storage_path: String,
    pub checksum: String,
    pub status: DocumentStatus,
    pub extracted_text: Option<String>,
    pub fraud_detected: bool,
    /// 0-100, model-stated and gated.
    pub confidence: u8,
    pub fraud_reasons: Vec<String>,
    pub missing_fields: Vec<String>,
    pub recommendations: String,
    pub predicted_type: Option<String>,
    pub created_at: NaiveDateTime,
}

impl DocumentRecord {
    /// A freshly ingested record: pending, no analysis yet.
    pub fn pending(
        id: Uuid,
        owner_id: Uuid,
        file_name: String,
        media_type: String,
        storage_path: String,
        checksum: String,
    ) -> Self {
        Self {
            id,
            owner_id,
            file_name,
            media_type,
            storage_path,
            checksum,
            status: DocumentStatus::Pending,
            extracted_text: None,
            fraud_detected: false,
            confidence: 0,
            fraud_reasons: vec![],
            missing_fields: vec![],
            recommendations: String::new(),
            predicted_type: None,
            created_at: chrono::Local::now().naive_local(),
        }
    }
}
