//! Integration tests for the API server.

use std::sync::OnceLock;

use api::config::Config;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use course_store::{CourseStore, InMemoryCourseStore, NewCourse, sample_courses};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceExt;

const TOKEN: &str = "test-token";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn test_config() -> Config {
    Config {
        api_token: Some(TOKEN.to_string()),
        ..Config::default()
    }
}

fn setup_with_store(store: InMemoryCourseStore) -> axum::Router {
    api::build_app(&test_config(), store, get_metrics_handle()).unwrap()
}

fn setup() -> axum::Router {
    setup_with_store(InMemoryCourseStore::new())
}

async fn seeded() -> (axum::Router, InMemoryCourseStore) {
    let store = InMemoryCourseStore::with_courses(sample_courses())
        .await
        .unwrap();
    (setup_with_store(store.clone()), store)
}

fn authed(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("API_TOKEN", TOKEN)
}

fn course_body(name: &str) -> Body {
    Body::from(
        serde_json::to_string(&serde_json::json!({
            "Name": name,
            "Introduce": "An introduction",
            "Link": "https://example.com/course",
            "Tags": "testing"
        }))
        .unwrap(),
    )
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_greeting_needs_no_token() {
    let app = setup();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["message"], "This is the Courses API server");
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(
        json["info"]["title"],
        "Courses matching API for Watson Assistant"
    );
    assert!(json["paths"]["/courses/eid/{eid}"].is_object());
}

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/courses")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key("www-authenticate"));
    let json = json_body(response).await;
    assert_eq!(json["error"], "Unauthorized");
}

#[tokio::test]
async fn test_wrong_token_is_rejected() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/courses/eid/1")
                .header("API_TOKEN", "nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bearer_token_is_accepted() {
    let (app, _) = seeded().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/courses/eid/1")
                .header("Authorization", format!("Bearer {TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unconfigured_token_rejects_everything() {
    let app = api::build_app(
        &Config::default(),
        InMemoryCourseStore::new(),
        get_metrics_handle(),
    )
    .unwrap();

    let response = app
        .oneshot(authed("GET", "/courses").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_course_by_eid() {
    let (app, _) = seeded().await;

    let response = app
        .oneshot(authed("GET", "/courses/eid/2").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["eid"], 2);
    assert_eq!(json["Name"], "OpenDS4All");
    assert_eq!(json["Link"], "https://github.com/odpi/OpenDS4All/");
    assert!(json["Introduce"].as_str().is_some());
    assert!(json["Tags"].as_str().unwrap().contains("Data science"));
}

#[tokio::test]
async fn test_get_nonexistent_course() {
    let app = setup();

    let response = app
        .oneshot(authed("GET", "/courses/eid/42").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_integer_eid_is_not_found() {
    let app = setup();

    let response = app
        .oneshot(
            authed("GET", "/courses/eid/abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_course_by_name_substring() {
    let (app, _) = seeded().await;

    let response = app
        .oneshot(
            authed("GET", "/courses/name/Enterprise")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["eid"], 1);
    assert_eq!(json["Name"], "Getting Started with Enterprise-grade AI");
}

#[tokio::test]
async fn test_get_course_by_name_decodes_path() {
    let (app, _) = seeded().await;

    let response = app
        .oneshot(
            authed("GET", "/courses/name/Getting%20Started")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_get_course_by_name_without_match() {
    let (app, _) = seeded().await;

    let response = app
        .oneshot(
            authed("GET", "/courses/name/Cooking")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_course_by_name_with_percent_in_stored_name() {
    let store = InMemoryCourseStore::with_courses(vec![NewCourse::new(
        "%ax",
        "An introduction",
        "https://example.com/course",
        "testing",
    )])
    .await
    .unwrap();
    let app = setup_with_store(store);

    let response = app
        .oneshot(authed("GET", "/courses/name/x").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["Name"], "%ax");
}

#[tokio::test]
async fn test_list_courses_defaults() {
    let (app, _) = seeded().await;

    let response = app
        .oneshot(authed("GET", "/courses").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let courses = json["courses"].as_array().unwrap();
    assert_eq!(courses.len(), 2);
    assert_eq!(courses[0]["eid"], 1);
    assert_eq!(courses[1]["eid"], 2);

    let pagination = &json["pagination"];
    assert_eq!(pagination["page"], 1);
    assert_eq!(pagination["per_page"], 20);
    assert_eq!(pagination["pages"], 1);
    assert_eq!(pagination["total"], 2);
    assert_eq!(pagination["next"], "");
    assert_eq!(pagination["prev"], "");
    assert_eq!(pagination["current"], "/courses?page=1&per_page=20");
}

#[tokio::test]
async fn test_list_courses_second_page() {
    let store = InMemoryCourseStore::new();
    for i in 0..5 {
        store
            .insert(NewCourse::new(format!("Course {i}"), "i", "l", "t"))
            .await
            .unwrap();
    }
    let app = setup_with_store(store);

    let response = app
        .oneshot(
            authed("GET", "/courses?page=2&per_page=2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let names: Vec<_> = json["courses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["Name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Course 2", "Course 3"]);
    assert_eq!(json["pagination"]["pages"], 3);
    assert_eq!(json["pagination"]["next"], "/courses?page=3&per_page=2");
    assert_eq!(json["pagination"]["prev"], "/courses?page=1&per_page=2");
}

#[tokio::test]
async fn test_list_courses_rejects_large_page_size() {
    let (app, _) = seeded().await;

    let response = app
        .oneshot(
            authed("GET", "/courses?per_page=31")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = json_body(response).await;
    assert!(json["detail"]["query"]["per_page"].is_array());
}

#[tokio::test]
async fn test_list_courses_rejects_non_numeric_page() {
    let (app, _) = seeded().await;

    let response = app
        .oneshot(
            authed("GET", "/courses?page=first")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_list_courses_beyond_last_page() {
    let (app, _) = seeded().await;

    let response = app
        .oneshot(
            authed("GET", "/courses?page=5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_empty_table() {
    let app = setup();

    let response = app
        .oneshot(authed("GET", "/courses").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["courses"].as_array().unwrap().len(), 0);
    assert_eq!(json["pagination"]["pages"], 0);
}

#[tokio::test]
async fn test_create_and_get_course() {
    let app = setup();

    let create_response = app
        .clone()
        .oneshot(
            authed("POST", "/courses")
                .header("content-type", "application/json")
                .body(course_body("Rust for Assistants"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(create_response.status(), StatusCode::CREATED);
    let created = json_body(create_response).await;
    assert_eq!(created["eid"], 1);
    assert_eq!(created["Name"], "Rust for Assistants");

    let get_response = app
        .oneshot(authed("GET", "/courses/eid/1").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(get_response.status(), StatusCode::OK);
    let fetched = json_body(get_response).await;
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_course_with_missing_fields() {
    let app = setup();

    let response = app
        .oneshot(
            authed("POST", "/courses")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"Name": "Only a name"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = json_body(response).await;
    let fields = json["detail"]["json"].as_object().unwrap();
    assert!(fields.contains_key("Introduce"));
    assert!(fields.contains_key("Link"));
    assert!(fields.contains_key("Tags"));
    assert!(!fields.contains_key("Name"));
}

#[tokio::test]
async fn test_create_course_with_null_field() {
    let app = setup();
    let body = serde_json::json!({
        "Name": null,
        "Introduce": "i",
        "Link": "l",
        "Tags": "t"
    });

    let response = app
        .oneshot(
            authed("POST", "/courses")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = json_body(response).await;
    assert_eq!(json["detail"]["json"]["Name"][0], "Field may not be null.");
}

#[tokio::test]
async fn test_create_course_with_overlong_field() {
    let (app, store) = seeded().await;
    let body = serde_json::json!({
        "Name": "n".repeat(256),
        "Introduce": "i",
        "Link": "l",
        "Tags": "t"
    });

    let response = app
        .oneshot(
            authed("POST", "/courses")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_create_course_with_malformed_json() {
    let app = setup();

    let response = app
        .oneshot(
            authed("POST", "/courses")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_course_with_wrong_field_type() {
    let app = setup();

    let response = app
        .oneshot(
            authed("POST", "/courses")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"Name": 5, "Introduce": "i", "Link": "l", "Tags": "t"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_requires_token() {
    let app = setup();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/courses")
                .header("content-type", "application/json")
                .body(course_body("Sneaky"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_delete_course() {
    let (app, store) = seeded().await;

    let response = app
        .clone()
        .oneshot(
            authed("DELETE", "/courses/eid/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(body.is_empty());
    assert_eq!(store.count().await.unwrap(), 1);

    let again = app
        .oneshot(
            authed("DELETE", "/courses/eid/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_recreate_requires_confirmation() {
    let (app, store) = seeded().await;
    store.delete(course_store::CourseId::new(1)).await.unwrap();

    let response = app
        .oneshot(
            authed("POST", "/database/recreate")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "confirmation is missing");
    assert_eq!(json["detail"]["error"], "check the API for how to confirm");
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_recreate_with_false_confirmation() {
    let (app, _) = seeded().await;

    let response = app
        .oneshot(
            authed("POST", "/database/recreate?confirmation=false")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recreate_with_invalid_confirmation() {
    let (app, _) = seeded().await;

    let response = app
        .oneshot(
            authed("POST", "/database/recreate?confirmation=perhaps")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_recreate_resets_and_reseeds() {
    let store = InMemoryCourseStore::new();
    for i in 0..4 {
        store
            .insert(NewCourse::new(format!("Old {i}"), "i", "l", "t"))
            .await
            .unwrap();
    }
    let app = setup_with_store(store.clone());

    let response = app
        .clone()
        .oneshot(
            authed("POST", "/database/recreate?confirmation=true")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["message"], "database recreated");
    assert_eq!(store.count().await.unwrap(), 2);

    let list_response = app
        .oneshot(authed("GET", "/courses").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let listed = json_body(list_response).await;
    assert_eq!(listed["courses"][0]["eid"], 1);
    assert_eq!(
        listed["courses"][0]["Name"],
        "Getting Started with Enterprise-grade AI"
    );
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _) = seeded().await;

    // Generate a metric first
    app.clone()
        .oneshot(authed("GET", "/courses/eid/1").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("courses_lookups_total"));
}
