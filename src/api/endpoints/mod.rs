//! Endpoint handlers, one module per resource.

pub mod bundles;
pub mod documents;
pub mod generation;
pub mod health;
pub mod recommendation;
pub mod requirements;

use std::path::Path;

use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;

/// How a PDF response should be presented by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment,
}

impl Disposition {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Attachment => "attachment",
        }
    }
}

/// Stream a stored PDF back with the given disposition.
pub(crate) async fn pdf_response(path: &Path, disposition: Disposition) -> Result<Response, ApiError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound("PDF file not found".into()));
        }
        Err(e) => return Err(ApiError::Internal(format!("Reading {}: {e}", path.display()))),
    };

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document.pdf")
        .replace('"', "");

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("{}; filename=\"{file_name}\"", disposition.as_str()),
            ),
        ],
        bytes,
    )
        .into_response())
}
