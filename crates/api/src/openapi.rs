//! OpenAPI document consumed by the assistant integration.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, Http, HttpAuthScheme, SecurityScheme};
use utoipa::openapi::server::{Server, ServerBuilder, ServerVariable, ServerVariableBuilder};

use crate::auth::TokenAuth;
use crate::config::Config;
use crate::error::ErrorResponse;
use crate::routes;
use crate::routes::MessageResponse;
use crate::routes::courses::{
    CourseResponse, CoursesResponse, CreateCourseRequest, PaginationResponse,
};
use crate::routes::health::HealthResponse;

pub const API_TITLE: &str = "Courses matching API for Watson Assistant";
pub const API_VERSION: &str = "1.0.1";

#[derive(OpenApi)]
#[openapi(
    info(
        description = "REST API around a single table of courses, used as a custom extension by a conversational assistant."
    ),
    paths(
        routes::health::greeting,
        routes::health::check,
        routes::metrics::get,
        routes::courses::get,
        routes::courses::get_by_name,
        routes::courses::list,
        routes::courses::create,
        routes::courses::delete,
        routes::database::recreate,
    ),
    components(schemas(
        CourseResponse,
        CoursesResponse,
        PaginationResponse,
        CreateCourseRequest,
        MessageResponse,
        HealthResponse,
        ErrorResponse,
    )),
    tags(
        (name = "courses", description = "Course records"),
        (name = "database", description = "Table maintenance"),
        (name = "health", description = "Liveness and metrics"),
    )
)]
pub struct ApiDoc;

fn variable(default: &str, description: &str) -> ServerVariable {
    ServerVariableBuilder::new()
        .default_value(default)
        .description(Some(description))
        .build()
}

/// Server entries: a templated Code Engine deployment and the local listener.
fn servers(port: u16) -> Vec<Server> {
    vec![
        ServerBuilder::new()
            .url("https://{appname}.{projectid}.{region}.codeengine.appdomain.cloud")
            .description(Some("Code Engine deployment"))
            .parameter("appname", variable("myapp", "application name"))
            .parameter("projectid", variable("projectid", "the Code Engine project ID"))
            .parameter(
                "region",
                variable("eu-gb", "the deployment region, e.g., eu-gb"),
            )
            .build(),
        ServerBuilder::new()
            .url("http://127.0.0.1:{port}")
            .description(Some("local test"))
            .parameter("port", variable(&port.to_string(), "local port to use"))
            .build(),
    ]
}

/// Builds the document for this deployment: servers and the token header.
pub fn document(config: &Config, auth: &TokenAuth) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title = API_TITLE.to_string();
    doc.info.version = API_VERSION.to_string();
    doc.servers = Some(servers(config.port));

    let components = doc.components.get_or_insert_with(Default::default);
    components.add_security_scheme(
        "api_key",
        SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(auth.header_name()))),
    );
    components.add_security_scheme(
        "bearer",
        SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
    );

    doc
}

/// GET /openapi.json — the OpenAPI document.
pub async fn get(State(doc): State<Arc<utoipa::openapi::OpenApi>>) -> Json<utoipa::openapi::OpenApi> {
    Json(doc.as_ref().clone())
}
