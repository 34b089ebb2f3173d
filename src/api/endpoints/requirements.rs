use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, RequirementsQuery};
use crate::models::RequirementProfile;

/// `GET /api/requirements?visaCategory=...`
pub async fn list(
    State(ctx): State<ApiContext>,
    query: Result<Query<RequirementsQuery>, QueryRejection>,
) -> Result<Json<RequirementProfile>, ApiError> {
    let Query(query) = query?;
    let category = query
        .visa_category
        .ok_or_else(|| ApiError::BadRequest("visaCategory is required".into()))?;
    Ok(Json(ctx.core.catalog.get_required_documents(&category).await?))
}
