use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{dto::MessageResponse, extractors::AdminSession},
    content::parse_id,
    error::{ApiError, ApiResult},
    projects::dto::{ProjectInput, ProjectListResponse, ProjectResponse},
    state::AppState,
};

const NOT_FOUND: &str = "Project not found";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route(
            "/projects/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
}

#[instrument(skip(state))]
pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Json<ProjectListResponse>> {
    let projects = state
        .projects
        .list()
        .await
        .map_err(|e| ApiError::internal("Failed to fetch projects", e))?;
    Ok(Json(ProjectListResponse { projects }))
}

#[instrument(skip(state))]
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProjectResponse>> {
    let id = parse_id(&id, NOT_FOUND)?;
    let project = state
        .projects
        .get(id)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch project", e))?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.into()))?;
    Ok(Json(ProjectResponse { project }))
}

#[instrument(skip(state, admin, payload))]
pub async fn create_project(
    State(state): State<AppState>,
    admin: AdminSession,
    payload: Result<Json<ProjectInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ProjectResponse>)> {
    let Json(input) = payload?;
    let draft = input.into_draft()?;
    let project = state
        .projects
        .create(draft)
        .await
        .map_err(|e| ApiError::internal("Failed to create project", e))?;
    info!(project_id = %project.id, by = %admin.0.email, "project created");
    Ok((StatusCode::CREATED, Json(ProjectResponse { project })))
}

#[instrument(skip(state, admin, payload))]
pub async fn update_project(
    State(state): State<AppState>,
    admin: AdminSession,
    Path(id): Path<String>,
    payload: Result<Json<ProjectInput>, JsonRejection>,
) -> ApiResult<Json<ProjectResponse>> {
    let id = parse_id(&id, NOT_FOUND)?;
    let Json(input) = payload?;
    let draft = input.into_draft()?;
    let project = state
        .projects
        .update(id, draft)
        .await
        .map_err(|e| ApiError::internal("Failed to update project", e))?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.into()))?;
    info!(project_id = %project.id, by = %admin.0.email, "project updated");
    Ok(Json(ProjectResponse { project }))
}

#[instrument(skip(state, admin))]
pub async fn delete_project(
    State(state): State<AppState>,
    admin: AdminSession,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id, NOT_FOUND)?;
    let deleted = state
        .projects
        .delete(id)
        .await
        .map_err(|e| ApiError::internal("Failed to delete project", e))?;
    if !deleted {
        return Err(ApiError::NotFound(NOT_FOUND.into()));
    }
    info!(project_id = %id, by = %admin.0.email, "project deleted");
    Ok(Json(MessageResponse::new("Project deleted successfully")))
}
