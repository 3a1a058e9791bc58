//! HTTP API over the courses table.
//!
//! Provides token-protected REST endpoints to look up, list, create and
//! delete courses and to reset the table, plus an OpenAPI document for the
//! assistant integration, with structured logging (tracing) and Prometheus
//! metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod openapi;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::http::header::InvalidHeaderName;
use axum::middleware;
use axum::routing::{get, post};
use course_store::CourseStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::TokenAuth;
use config::Config;
use routes::courses::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: CourseStore + Clone + 'static>(
    state: Arc<AppState<S>>,
    token_auth: Arc<TokenAuth>,
    api_doc: Arc<utoipa::openapi::OpenApi>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let docs_router = Router::new()
        .route("/openapi.json", get(openapi::get))
        .with_state(api_doc);

    let protected = Router::new()
        .route(
            "/courses",
            get(routes::courses::list::<S>).post(routes::courses::create::<S>),
        )
        .route(
            "/courses/eid/{eid}",
            get(routes::courses::get::<S>).delete(routes::courses::delete::<S>),
        )
        .route("/courses/name/{name}", get(routes::courses::get_by_name::<S>))
        .route("/database/recreate", post(routes::database::recreate::<S>))
        .route_layer(middleware::from_fn_with_state(
            token_auth,
            auth::require_token,
        ))
        .with_state(state);

    Router::new()
        .route("/", get(routes::health::greeting))
        .route("/health", get(routes::health::check))
        .merge(protected)
        .merge(metrics_router)
        .merge(docs_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wires a store into a complete application using `config` for
/// authentication and the OpenAPI server list.
///
/// Fails only if the configured token header is not a valid header name.
pub fn build_app<S: CourseStore + Clone + 'static>(
    config: &Config,
    store: S,
    metrics_handle: PrometheusHandle,
) -> Result<Router, InvalidHeaderName> {
    let token_auth = TokenAuth::from_config(config)?;
    if token_auth.is_empty() {
        tracing::warn!("API_TOKEN is not set; every course request will be rejected");
    }
    let api_doc = openapi::document(config, &token_auth);

    Ok(create_app(
        Arc::new(AppState::new(store)),
        Arc::new(token_auth),
        Arc::new(api_doc),
        metrics_handle,
    ))
}
