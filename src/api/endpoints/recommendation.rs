use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::recommendation::VisaRecommendation;

/// `POST /api/visa-recommendation`: body is the applicant's answers object.
pub async fn recommend(
    State(ctx): State<ApiContext>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<VisaRecommendation>, ApiError> {
    let Json(answers) = payload?;
    if answers.as_object().map_or(true, |o| o.is_empty()) {
        return Err(ApiError::BadRequest("Applicant answers are required".into()));
    }
    Ok(Json(ctx.core.advisor.recommend_visa(&answers).await?))
}
