//! Health check endpoints.

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use super::MessageResponse;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(value_type = String)]
    pub status: &'static str,
}

/// GET / — greeting, doubling as the hosting platform's health probe.
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses((status = 200, description = "Server is up", body = MessageResponse))
)]
pub async fn greeting() -> Json<MessageResponse> {
    Json(MessageResponse::new("This is the Courses API server"))
}

/// GET /health — returns system health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Server is up", body = HealthResponse))
)]
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
