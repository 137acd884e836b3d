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
    skills::dto::{SkillInput, SkillListResponse, SkillResponse},
    state::AppState,
};

const NOT_FOUND: &str = "Skill not found";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/skills", get(list_skills).post(create_skill))
        .route(
            "/skills/:id",
            get(get_skill).put(update_skill).delete(delete_skill),
        )
}

#[instrument(skip(state))]
pub async fn list_skills(State(state): State<AppState>) -> ApiResult<Json<SkillListResponse>> {
    let skills = state
        .skills
        .list()
        .await
        .map_err(|e| ApiError::internal("Failed to fetch skills", e))?;
    Ok(Json(SkillListResponse { skills }))
}

#[instrument(skip(state))]
pub async fn get_skill(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SkillResponse>> {
    let id = parse_id(&id, NOT_FOUND)?;
    let skill = state
        .skills
        .get(id)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch skill", e))?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.into()))?;
    Ok(Json(SkillResponse { skill }))
}

#[instrument(skip(state, admin, payload))]
pub async fn create_skill(
    State(state): State<AppState>,
    admin: AdminSession,
    payload: Result<Json<SkillInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SkillResponse>)> {
    let Json(input) = payload?;
    let draft = input.into_draft()?;
    let skill = state
        .skills
        .create(draft)
        .await
        .map_err(|e| ApiError::internal("Failed to create skill", e))?;
    info!(skill_id = %skill.id, level = skill.level, by = %admin.0.email, "skill created");
    Ok((StatusCode::CREATED, Json(SkillResponse { skill })))
}

#[instrument(skip(state, admin, payload))]
pub async fn update_skill(
    State(state): State<AppState>,
    admin: AdminSession,
    Path(id): Path<String>,
    payload: Result<Json<SkillInput>, JsonRejection>,
) -> ApiResult<Json<SkillResponse>> {
    let id = parse_id(&id, NOT_FOUND)?;
    let Json(input) = payload?;
    let draft = input.into_draft()?;
    let skill = state
        .skills
        .update(id, draft)
        .await
        .map_err(|e| ApiError::internal("Failed to update skill", e))?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.into()))?;
    info!(skill_id = %skill.id, by = %admin.0.email, "skill updated");
    Ok(Json(SkillResponse { skill }))
}

#[instrument(skip(state, admin))]
pub async fn delete_skill(
    State(state): State<AppState>,
    admin: AdminSession,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id, NOT_FOUND)?;
    let deleted = state
        .skills
        .delete(id)
        .await
        .map_err(|e| ApiError::internal("Failed to delete skill", e))?;
    if !deleted {
        return Err(ApiError::NotFound(NOT_FOUND.into()));
    }
    info!(skill_id = %id, by = %admin.0.email, "skill deleted");
    Ok(Json(MessageResponse::new("Skill deleted successfully")))
}
