//! Document upload, lookup, analysis and classification.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::DocumentRecord;
use crate::pipeline::analysis::ClassificationResult;
use crate::pipeline::import::{UploadFile, UploadReceipt};
use crate::pipeline::parse_identifier;

/// `POST /api/documents/upload`: multipart with a `file` part and an
/// `ownerId` text part.
pub async fn upload(
    State(ctx): State<ApiContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadReceipt>), ApiError> {
    let mut owner_id = String::new();
    let mut file: Option<UploadFile> = None;

    let mut multipart = multipart?;
    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(str::to_owned);
        match field_name.as_deref() {
            Some("ownerId") => owner_id = field.text().await?,
            Some("file") => {
                let name = field.file_name().unwrap_or("document").to_string();
                let media_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await?.to_vec();
                file = Some(UploadFile {
                    name,
                    media_type,
                    bytes,
                });
            }
            other => {
                tracing::debug!(field = ?other, "Ignoring unexpected multipart field");
            }
        }
    }

    let receipt = ctx.core.ingestor.upload_document(&owner_id, file).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// `GET /api/documents/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<DocumentRecord>, ApiError> {
    let id = parse_identifier(&id, "documentId")?;
    Ok(Json(ctx.core.ingestor.get_document(&id)?))
}

/// `POST /api/documents/:id/analyze`
pub async fn analyze(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<DocumentRecord>, ApiError> {
    let id = parse_identifier(&id, "documentId")?;
    Ok(Json(ctx.core.analysis.analyze_document(&id).await?))
}

/// `POST /api/documents/:id/classify`
pub async fn classify(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<ClassificationResult>, ApiError> {
    let id = parse_identifier(&id, "documentId")?;
    Ok(Json(ctx.core.analysis.classify_document(&id).await?))
}
