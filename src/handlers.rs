use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};
use futures::future::join_all;
use tracing::{info, warn};

use crate::{
    AppState,
    auth::verify_token,
    bulk,
    error::ApiError,
    models::{Classroom, CreateClassroom, GroupDetail, ImportReport},
    validation::validate_classroom_form,
};

#[derive(Debug, serde::Deserialize)]
pub struct GroupsQuery {
    #[serde(default)]
    pub search: String,
    pub token: Option<String>,
}

#[utoipa::path(get, path = "/", tag = "groups")]
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Classroom Admin API",
        "endpoints": {
            "/groups": "List and create classroom groups",
            "/groups/{id}": "Classroom details with student roster",
            "/groups/import": "Bulk import classrooms from a CSV upload",
            "/groups/import/template": "Download the CSV import template"
        }
    }))
}

#[utoipa::path(get, path = "/healthz/live", tag = "health")]
pub async fn healthz_live() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(get, path = "/healthz/ready", tag = "health")]
pub async fn healthz_ready() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(
    get,
    path = "/groups",
    params(
        ("search" = Option<String>, Query, description = "Filter by classroom name, department, or teacher"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 200, description = "Classroom groups with student counts", body = [Classroom]),
        (status = 401, description = "Invalid authentication token")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "groups"
)]
pub async fn list_groups(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Query(query): Query<GroupsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = auth.map(|TypedHeader(a)| a);
    verify_token(&state.settings, auth_header, query.token.as_deref())?;

    let mut groups = state.store.list_groups().await?;

    // Roster counts come from per-group subcollections; a failed count
    // renders as zero rather than failing the whole listing.
    let counts = join_all(groups.iter().map(|group| {
        let store = state.store.clone();
        let id = group.id.clone();
        async move {
            match store.list_students(&id).await {
                Ok(students) => students.len() as u32,
                Err(err) => {
                    warn!(error = %err, group = %id, "failed to count students");
                    0
                }
            }
        }
    }))
    .await;

    for (group, count) in groups.iter_mut().zip(counts) {
        group.student_count = count;
    }

    if !query.search.is_empty() {
        groups.retain(|group| group.matches(&query.search));
    }

    Ok(Json(groups))
}

#[utoipa::path(
    post,
    path = "/groups",
    request_body = CreateClassroom,
    responses(
        (status = 201, description = "Classroom created", body = Classroom),
        (status = 401, description = "Invalid authentication token"),
        (status = 422, description = "Validation errors")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "groups"
)]
pub async fn create_group(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Query(query): Query<GroupsQuery>,
    Json(form): Json<CreateClassroom>,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = auth.map(|TypedHeader(a)| a);
    verify_token(&state.settings, auth_header, query.token.as_deref())?;

    let record = validate_classroom_form(&form).map_err(ApiError::Validation)?;
    let classroom = state.store.create_group(&record).await?;
    info!(group = %classroom.id, name = %classroom.name, "classroom created");

    Ok((StatusCode::CREATED, Json(classroom)))
}

#[utoipa::path(
    get,
    path = "/groups/{id}",
    params(
        ("id" = String, Path, description = "Classroom document id"),
        ("search" = Option<String>, Query, description = "Filter students by name, roll number, or email"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 200, description = "Classroom with student roster", body = GroupDetail),
        (status = 401, description = "Invalid authentication token"),
        (status = 404, description = "Classroom not found")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "groups"
)]
pub async fn get_group(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Path(id): Path<String>,
    Query(query): Query<GroupsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = auth.map(|TypedHeader(a)| a);
    verify_token(&state.settings, auth_header, query.token.as_deref())?;

    let mut group = state.store.get_group(&id).await?;
    let mut students = state.store.list_students(&id).await?;
    group.student_count = students.len() as u32;

    if !query.search.is_empty() {
        students.retain(|student| student.matches(&query.search));
    }

    Ok(Json(GroupDetail { group, students }))
}

#[utoipa::path(
    delete,
    path = "/groups/{id}",
    params(
        ("id" = String, Path, description = "Classroom document id"),
        ("token" = Option<String>, Query, description = "Authentication token (alternative to Bearer header)")
    ),
    responses(
        (status = 204, description = "Classroom deleted"),
        (status = 401, description = "Invalid authentication token"),
        (status = 404, description = "Classroom not found")
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "groups"
)]
pub async fn delete_group(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Path(id): Path<String>,
    Query(query): Query<GroupsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = auth.map(|TypedHeader(a)| a);
    verify_token(&state.settings, auth_header, query.token.as_deref())?;

    state.store.delete_group(&id).await?;
    info!(group = %id, "classroom deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/groups/import",
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 201, description = "All rows imported in one batch", body = ImportReport),
        (status = 400, description = "Unsupported upload type or missing required columns"),
        (status = 401, description = "Invalid authentication token"),
        (status = 422, description = "Row-level errors; nothing was written", body = ImportReport)
    ),
    security(("bearer_auth" = []), ("query_token" = [])),
    tag = "import"
)]
pub async fn import_groups(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Query(query): Query<GroupsQuery>,
    headers: HeaderMap,
    body: String,
) -> Result<Response, ApiError> {
    let auth_header = auth.map(|TypedHeader(a)| a);
    verify_token(&state.settings, auth_header, query.token.as_deref())?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if !bulk::ACCEPTED_CONTENT_TYPES.contains(&essence.as_str()) {
        return Err(ApiError::BadRequest(
            "Please upload a CSV or Excel file".into(),
        ));
    }

    let parsed = bulk::parse_classrooms_csv(&body)?;
    if !parsed.errors.is_empty() {
        let report = ImportReport {
            created: 0,
            errors: parsed.errors,
        };
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(report)).into_response());
    }

    let created = state.store.batch_create_groups(&parsed.classrooms).await?;
    info!(created, "bulk import committed");

    let report = ImportReport {
        created,
        errors: Vec::new(),
    };
    Ok((StatusCode::CREATED, Json(report)).into_response())
}

#[utoipa::path(
    get,
    path = "/groups/import/template",
    responses(
        (status = 200, description = "CSV template", content_type = "text/csv")
    ),
    tag = "import"
)]
pub async fn download_template() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            ("content-type", "text/csv"),
            (
                "content-disposition",
                "attachment; filename=classroom_template.csv",
            ),
        ],
        bulk::TEMPLATE_CSV,
    )
}
