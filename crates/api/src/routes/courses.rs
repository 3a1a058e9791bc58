//! Course lookup, listing, creation and deletion endpoints.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use course_store::course::{INTRODUCE_FIELD, LINK_FIELD, NAME_FIELD, TAGS_FIELD};
use course_store::{
    Course, CourseId, CourseStore, DEFAULT_PAGE, DEFAULT_PER_PAGE, FieldErrors, NewCourse, Page,
    PageRequest,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, ErrorResponse, InputLocation};

const MISSING_FIELD: &str = "Missing data for required field.";
const NULL_FIELD: &str = "Field may not be null.";

/// Shared application state accessible from all handlers.
pub struct AppState<S: CourseStore> {
    pub store: S,
}

impl<S: CourseStore> AppState<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

// -- Request types --

/// Distinguishes an explicit `null` (`Some(None)`) from an absent key (`None`).
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Body of `POST /courses`. Every field is required and may not be null.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCourseRequest {
    #[serde(rename = "Name", default, deserialize_with = "present")]
    #[schema(value_type = String, required = true, max_length = 255)]
    pub name: Option<Option<String>>,
    #[serde(rename = "Introduce", default, deserialize_with = "present")]
    #[schema(value_type = String, required = true, max_length = 255)]
    pub introduce: Option<Option<String>>,
    #[serde(rename = "Link", default, deserialize_with = "present")]
    #[schema(value_type = String, required = true, max_length = 255)]
    pub link: Option<Option<String>>,
    #[serde(rename = "Tags", default, deserialize_with = "present")]
    #[schema(value_type = String, required = true, max_length = 255)]
    pub tags: Option<Option<String>>,
}

impl CreateCourseRequest {
    /// Checks presence and length of every field, reporting all problems at once.
    pub fn into_new_course(self) -> Result<NewCourse, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut require = |field: &str, value: Option<Option<String>>| match value {
            Some(Some(value)) => value,
            Some(None) => {
                errors.add(field, NULL_FIELD);
                String::new()
            }
            None => {
                errors.add(field, MISSING_FIELD);
                String::new()
            }
        };
        let course = NewCourse::new(
            require(NAME_FIELD, self.name),
            require(INTRODUCE_FIELD, self.introduce),
            require(LINK_FIELD, self.link),
            require(TAGS_FIELD, self.tags),
        );

        if let Err(length_errors) = course.validate() {
            errors.extend(length_errors);
        }
        errors.into_result()?;
        Ok(course)
    }
}

fn default_page() -> i64 {
    i64::from(DEFAULT_PAGE)
}

fn default_per_page() -> i64 {
    i64::from(DEFAULT_PER_PAGE)
}

/// Query string of `GET /courses`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Page number, starting at 1.
    #[serde(default = "default_page")]
    #[param(default = 1, minimum = 1)]
    pub page: i64,
    /// Courses per page.
    #[serde(default = "default_per_page")]
    #[param(default = 20, minimum = 1, maximum = 30)]
    pub per_page: i64,
}

// -- Response types --

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseResponse {
    pub eid: i32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Introduce")]
    pub introduce: String,
    #[serde(rename = "Link")]
    pub link: String,
    #[serde(rename = "Tags")]
    pub tags: String,
}

impl From<Course> for CourseResponse {
    fn from(course: Course) -> Self {
        Self {
            eid: course.eid.as_i32(),
            name: course.name,
            introduce: course.introduce,
            link: course.link,
            tags: course.tags,
        }
    }
}

/// Navigation block of a course listing.
///
/// `next` and `prev` are empty strings when there is no such page.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationResponse {
    pub page: u32,
    pub per_page: u32,
    pub pages: u64,
    pub total: u64,
    pub current: String,
    pub next: String,
    pub prev: String,
    pub first: String,
    pub last: String,
}

impl PaginationResponse {
    fn from_page<T>(page: &Page<T>) -> Self {
        let link = |number: u64| format!("/courses?page={number}&per_page={}", page.per_page);
        Self {
            page: page.page,
            per_page: page.per_page,
            pages: page.pages(),
            total: page.total,
            current: link(u64::from(page.page)),
            next: page
                .next_num()
                .map(|n| link(u64::from(n)))
                .unwrap_or_default(),
            prev: page
                .prev_num()
                .map(|n| link(u64::from(n)))
                .unwrap_or_default(),
            first: link(1),
            last: link(page.pages().max(1)),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CoursesResponse {
    pub courses: Vec<CourseResponse>,
    pub pagination: PaginationResponse,
}

impl From<Page<Course>> for CoursesResponse {
    fn from(page: Page<Course>) -> Self {
        let pagination = PaginationResponse::from_page(&page);
        Self {
            courses: page.items.into_iter().map(CourseResponse::from).collect(),
            pagination,
        }
    }
}

// -- Handlers --

/// GET /courses/eid/:eid — retrieve a single course record by its EID.
#[utoipa::path(
    get,
    path = "/courses/eid/{eid}",
    tag = "courses",
    params(("eid" = i32, Path, description = "Course EID")),
    responses(
        (status = 200, description = "Course record", body = CourseResponse),
        (status = 401, description = "Missing or unknown API token", body = ErrorResponse),
        (status = 404, description = "No course with this EID", body = ErrorResponse),
    ),
    security(("api_key" = []), ("bearer" = []))
)]
#[tracing::instrument(skip(state))]
pub async fn get<S: CourseStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    eid: Result<Path<i32>, PathRejection>,
) -> Result<Json<CourseResponse>, ApiError> {
    let eid = parse_eid(eid)?;
    metrics::counter!("courses_lookups_total", "by" => "eid").increment(1);

    let course = state
        .store
        .get(eid)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Course {eid} not found")))?;

    Ok(Json(course.into()))
}

/// GET /courses/name/:name — retrieve the first course whose name contains `name`.
#[utoipa::path(
    get,
    path = "/courses/name/{name}",
    tag = "courses",
    params(("name" = String, Path, description = "Substring of the course name (SQL LIKE wildcards allowed)")),
    responses(
        (status = 200, description = "First matching course record", body = CourseResponse),
        (status = 401, description = "Missing or unknown API token", body = ErrorResponse),
        (status = 404, description = "No course name matches", body = ErrorResponse),
    ),
    security(("api_key" = []), ("bearer" = []))
)]
#[tracing::instrument(skip(state))]
pub async fn get_by_name<S: CourseStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(name): Path<String>,
) -> Result<Json<CourseResponse>, ApiError> {
    metrics::counter!("courses_lookups_total", "by" => "name").increment(1);

    let course = state
        .store
        .find_by_name(&name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No course name matches '{name}'")))?;

    Ok(Json(course.into()))
}

/// GET /courses — list course records a page at a time, in EID order.
#[utoipa::path(
    get,
    path = "/courses",
    tag = "courses",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of course records", body = CoursesResponse),
        (status = 401, description = "Missing or unknown API token", body = ErrorResponse),
        (status = 404, description = "Page is beyond the last page", body = ErrorResponse),
        (status = 422, description = "Invalid page or per_page", body = ErrorResponse),
    ),
    security(("api_key" = []), ("bearer" = []))
)]
#[tracing::instrument(skip(state))]
pub async fn list<S: CourseStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<CoursesResponse>, ApiError> {
    let Query(query) = query?;
    let request =
        PageRequest::new(query.page, query.per_page).map_err(|errors| ApiError::Validation {
            location: InputLocation::Query,
            errors,
        })?;

    let page = state.store.list(request).await?;
    if page.is_out_of_range() {
        return Err(ApiError::NotFound(format!(
            "Page {} is beyond the last page ({})",
            page.page,
            page.pages()
        )));
    }

    Ok(Json(page.into()))
}

/// POST /courses — insert a new course record; its new EID is returned.
#[utoipa::path(
    post,
    path = "/courses",
    tag = "courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Stored course record", body = CourseResponse),
        (status = 400, description = "Malformed JSON", body = ErrorResponse),
        (status = 401, description = "Missing or unknown API token", body = ErrorResponse),
        (status = 422, description = "Missing, mistyped or overlong field", body = ErrorResponse),
    ),
    security(("api_key" = []), ("bearer" = []))
)]
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: CourseStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<CreateCourseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CourseResponse>), ApiError> {
    let Json(req) = payload?;
    let new_course = req
        .into_new_course()
        .map_err(|errors| ApiError::Validation {
            location: InputLocation::Json,
            errors,
        })?;

    let course = state.store.insert(new_course).await?;

    metrics::counter!("courses_created_total").increment(1);
    tracing::info!(user = %user.0, eid = %course.eid, "course created");

    Ok((StatusCode::CREATED, Json(course.into())))
}

/// DELETE /courses/eid/:eid — delete a single course record.
#[utoipa::path(
    delete,
    path = "/courses/eid/{eid}",
    tag = "courses",
    params(("eid" = i32, Path, description = "Course EID")),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 401, description = "Missing or unknown API token", body = ErrorResponse),
        (status = 404, description = "No course with this EID", body = ErrorResponse),
    ),
    security(("api_key" = []), ("bearer" = []))
)]
#[tracing::instrument(skip(state))]
pub async fn delete<S: CourseStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Extension(user): Extension<AuthenticatedUser>,
    eid: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let eid = parse_eid(eid)?;

    if !state.store.delete(eid).await? {
        return Err(ApiError::NotFound(format!("Course {eid} not found")));
    }

    metrics::counter!("courses_deleted_total").increment(1);
    tracing::info!(user = %user.0, %eid, "course deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Non-integer EIDs name no course, so they are reported as missing.
fn parse_eid(eid: Result<Path<i32>, PathRejection>) -> Result<CourseId, ApiError> {
    eid.map(|Path(eid)| CourseId::new(eid))
        .map_err(|rejection| ApiError::NotFound(rejection.body_text()))
}
