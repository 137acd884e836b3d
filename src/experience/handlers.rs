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
    experience::dto::{ExperienceInput, ExperienceListResponse, ExperienceResponse},
    state::AppState,
};

const NOT_FOUND: &str = "Experience not found";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/experience", get(list_experience).post(create_experience))
        .route(
            "/experience/:id",
            get(get_experience)
                .put(update_experience)
                .delete(delete_experience),
        )
}

#[instrument(skip(state))]
pub async fn list_experience(
    State(state): State<AppState>,
) -> ApiResult<Json<ExperienceListResponse>> {
    let experience = state
        .experience
        .list()
        .await
        .map_err(|e| ApiError::internal("Failed to fetch experience", e))?;
    Ok(Json(ExperienceListResponse { experience }))
}

#[instrument(skip(state))]
pub async fn get_experience(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ExperienceResponse>> {
    let id = parse_id(&id, NOT_FOUND)?;
    let experience = state
        .experience
        .get(id)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch experience", e))?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.into()))?;
    Ok(Json(ExperienceResponse { experience }))
}

#[instrument(skip(state, admin, payload))]
pub async fn create_experience(
    State(state): State<AppState>,
    admin: AdminSession,
    payload: Result<Json<ExperienceInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ExperienceResponse>)> {
    let Json(input) = payload?;
    let draft = input.into_draft()?;
    let experience = state
        .experience
        .create(draft)
        .await
        .map_err(|e| ApiError::internal("Failed to create experience", e))?;
    info!(experience_id = %experience.id, by = %admin.0.email, "experience created");
    Ok((StatusCode::CREATED, Json(ExperienceResponse { experience })))
}

#[instrument(skip(state, admin, payload))]
pub async fn update_experience(
    State(state): State<AppState>,
    admin: AdminSession,
    Path(id): Path<String>,
    payload: Result<Json<ExperienceInput>, JsonRejection>,
) -> ApiResult<Json<ExperienceResponse>> {
    let id = parse_id(&id, NOT_FOUND)?;
    let Json(input) = payload?;
    let draft = input.into_draft()?;
    let experience = state
        .experience
        .update(id, draft)
        .await
        .map_err(|e| ApiError::internal("Failed to update experience", e))?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.into()))?;
    info!(experience_id = %experience.id, by = %admin.0.email, "experience updated");
    Ok(Json(ExperienceResponse { experience }))
}

#[instrument(skip(state, admin))]
pub async fn delete_experience(
    State(state): State<AppState>,
    admin: AdminSession,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id, NOT_FOUND)?;
    let deleted = state
        .experience
        .delete(id)
        .await
        .map_err(|e| ApiError::internal("Failed to delete experience", e))?;
    if !deleted {
        return Err(ApiError::NotFound(NOT_FOUND.into()));
    }
    info!(experience_id = %id, by = %admin.0.email, "experience deleted");
    Ok(Json(MessageResponse::new("Experience deleted successfully")))
}
