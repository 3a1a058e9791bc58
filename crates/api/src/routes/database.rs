//! Table maintenance endpoint.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::{Extension, Json};
use course_store::{CourseStore, FieldErrors, sample_courses};
use serde::Deserialize;
use utoipa::IntoParams;

use super::MessageResponse;
use super::courses::AppState;
use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ErrorResponse, InputLocation};

/// Query string of `POST /database/recreate`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecreateQuery {
    /// Must be true for the reset to happen.
    #[param(value_type = Option<bool>, default = false)]
    pub confirmation: Option<String>,
}

/// Parses the boolean spellings accepted in query strings.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw {
        "true" | "True" | "TRUE" | "1" | "yes" | "Yes" | "YES" | "on" | "On" | "ON" | "y"
        | "Y" | "t" | "T" => Some(true),
        "false" | "False" | "FALSE" | "0" | "no" | "No" | "NO" | "off" | "Off" | "OFF" | "n"
        | "N" | "f" | "F" => Some(false),
        _ => None,
    }
}

/// POST /database/recreate — drop and recreate the course table with sample records.
///
/// The request must be confirmed with `?confirmation=true`.
#[utoipa::path(
    post,
    path = "/database/recreate",
    tag = "database",
    params(RecreateQuery),
    responses(
        (status = 200, description = "Table recreated and reseeded", body = MessageResponse),
        (status = 400, description = "Confirmation is missing", body = ErrorResponse),
        (status = 401, description = "Missing or unknown API token", body = ErrorResponse),
        (status = 422, description = "Confirmation is not a boolean", body = ErrorResponse),
    ),
    security(("api_key" = []), ("bearer" = []))
)]
#[tracing::instrument(skip(state))]
pub async fn recreate<S: CourseStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    query: Result<Query<RecreateQuery>, QueryRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Query(query) = query?;

    let confirmed = match query.confirmation.as_deref() {
        None => false,
        Some(raw) => parse_flag(raw).ok_or_else(|| {
            let mut errors = FieldErrors::new();
            errors.add("confirmation", "Not a valid boolean.");
            ApiError::Validation {
                location: InputLocation::Query,
                errors,
            }
        })?,
    };
    if !confirmed {
        tracing::warn!(user = %user.0, "database recreate requested without confirmation");
        return Err(ApiError::ConfirmationMissing);
    }

    let seeded = state.store.recreate(&sample_courses()).await?;

    metrics::counter!("database_recreated_total").increment(1);
    tracing::info!(user = %user.0, seeded, "database recreated");

    Ok(Json(MessageResponse::new("database recreated")))
}
