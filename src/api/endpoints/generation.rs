//! Document generation and access to generated PDFs.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;

use super::{pdf_response, Disposition};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, GenerateRequest};
use crate::models::GeneratedArtifact;
use crate::pipeline::generation::MergedBundle;
use crate::pipeline::parse_identifier;

/// `POST /api/generation/generate`: generate and publish the owner's bundle.
pub async fn generate(
    State(ctx): State<ApiContext>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<MergedBundle>, ApiError> {
    let Json(req) = payload?;
    let bundle = ctx
        .core
        .generator
        .generate_and_merge_documents(
            &req.owner_id,
            &req.visa_category,
            &req.answers,
            &req.reference_uploads,
        )
        .await?;
    Ok(Json(bundle))
}

/// `POST /api/generation/generate-content`: generate without merging.
pub async fn generate_content(
    State(ctx): State<ApiContext>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<Vec<GeneratedArtifact>>, ApiError> {
    let Json(req) = payload?;
    let artifacts = ctx
        .core
        .generator
        .generate_documents(
            &req.owner_id,
            &req.visa_category,
            &req.answers,
            &req.reference_uploads,
        )
        .await?;
    Ok(Json(artifacts))
}

/// `GET /api/owners/:owner_id/generated`
pub async fn list_for_owner(
    State(ctx): State<ApiContext>,
    Path(owner_id): Path<String>,
) -> Result<Json<Vec<GeneratedArtifact>>, ApiError> {
    Ok(Json(ctx.core.generator.list_generated_documents(&owner_id)?))
}

/// `GET /api/generated/:artifact_id/download`
pub async fn download(
    State(ctx): State<ApiContext>,
    Path(artifact_id): Path<String>,
) -> Result<Response, ApiError> {
    let artifact_id = parse_identifier(&artifact_id, "artifactId")?;
    let path = ctx
        .core
        .generator
        .get_generated_document_path(&artifact_id)
        .await?;
    pdf_response(&path, Disposition::Attachment).await
}
