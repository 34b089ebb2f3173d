use serde::{Deserialize, Serialize};

/// Documents a visa category demands, in the order the catalog listed them.
/// Recomputed per request and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequirementProfile {
    pub visa_category: String,
    pub required_documents: Vec<String>,
}

impl RequirementProfile {
    pub fn is_empty(&self) -> bool {
        self.required_documents.is_empty()
    }
}
