//! API router.
//!
//! Returns a composable `Router` with every route nested under `/api/`.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Multipart framing on top of the raw file bytes.
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Build the API router over shared core state.
pub fn api_router(core: Arc<CoreState>) -> Router {
    let body_limit = core
        .ingestor
        .max_upload_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);
    let ctx = ApiContext::new(core);

    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/documents/upload", post(endpoints::documents::upload))
        .route("/documents/:id", get(endpoints::documents::detail))
        .route("/documents/:id/analyze", post(endpoints::documents::analyze))
        .route("/documents/:id/classify", post(endpoints::documents::classify))
        .route("/requirements", get(endpoints::requirements::list))
        .route("/generation/generate", post(endpoints::generation::generate))
        .route(
            "/generation/generate-content",
            post(endpoints::generation::generate_content),
        )
        .route(
            "/owners/:owner_id/generated",
            get(endpoints::generation::list_for_owner),
        )
        .route(
            "/generated/:artifact_id/download",
            get(endpoints::generation::download),
        )
        .route("/bundles/:owner_id/preview", get(endpoints::bundles::preview))
        .route("/bundles/:owner_id/download", get(endpoints::bundles::download))
        .route(
            "/visa-recommendation",
            post(endpoints::recommendation::recommend),
        )
        .with_state(ctx);

    Router::new()
        .nest("/api", routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
