//! Merged bundle preview and download.

use axum::extract::{Path, State};
use axum::response::Response;

use super::{pdf_response, Disposition};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::{parse_identifier, PipelineError};

/// `GET /api/bundles/:owner_id/preview`
pub async fn preview(
    State(ctx): State<ApiContext>,
    Path(owner_id): Path<String>,
) -> Result<Response, ApiError> {
    serve_bundle(&ctx, &owner_id, Disposition::Inline).await
}

/// `GET /api/bundles/:owner_id/download`
pub async fn download(
    State(ctx): State<ApiContext>,
    Path(owner_id): Path<String>,
) -> Result<Response, ApiError> {
    serve_bundle(&ctx, &owner_id, Disposition::Attachment).await
}

async fn serve_bundle(
    ctx: &ApiContext,
    owner_id: &str,
    disposition: Disposition,
) -> Result<Response, ApiError> {
    let owner = parse_identifier(owner_id, "ownerId")?;
    let path = ctx
        .core
        .merger
        .get_latest_merged_pdf_path(&owner)
        .await
        .map_err(PipelineError::from)?;
    pdf_response(&path, disposition).await
}
