//! HTTP surface over the core pipeline.
//!
//! Routes are nested under `/api/` and only translate between HTTP and the
//! core components held by `CoreState`. The router is composable:
//! `api_router()` returns a `Router` that can be mounted on any axum server.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{serve, ApiServer};
pub use types::ApiContext;
