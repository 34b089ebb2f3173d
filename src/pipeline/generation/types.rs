use serde::{Deserialize, Serialize};

/// One document as emitted by the model, after validation.
///
/// Every element must carry all four fields; a single incomplete element
/// invalidates the whole batch at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawDraft")]
pub struct DraftDocument {
    pub document_type: String,
    pub format: String,
    pub page_count: u32,
    pub content: String,
}

/// Result of a generate-and-merge run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedBundle {
    pub merged_pdf_path: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDraft {
    document_type: Option<String>,
    format: Option<String>,
    page_count: Option<serde_json::Value>,
    content: Option<String>,
}

impl TryFrom<RawDraft> for DraftDocument {
    type Error = String;

    fn try_from(raw: RawDraft) -> Result<Self, Self::Error> {
        let document_type = required_text(raw.document_type, "documentType")?;
        let format = required_text(raw.format, "format")?;
        let content = required_text(raw.content, "content")?;
        let page_count = raw
            .page_count
            .as_ref()
            .and_then(page_count_from)
            .ok_or_else(|| "pageCount must be a positive integer".to_string())?;

        Ok(Self {
            document_type,
            format,
            page_count,
            content,
        })
    }
}

fn required_text(value: Option<String>, field: &str) -> Result<String, String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(format!("{field} is missing")),
    }
}

/// Models return page counts as integers, floats or strings.
fn page_count_from(value: &serde_json::Value) -> Option<u32> {
    let n = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if n.is_finite() && n >= 1.0 {
        Some(n.round().min(u32::MAX as f64) as u32)
    } else {
        None
    }
}
