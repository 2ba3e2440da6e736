use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::AuthUser,
    error::ApiError,
    profile::dto::UpsertProfileRequest,
    profile::repo::UserProfile,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile))
        .route("/profile", put(put_profile))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = UserProfile::find_by_user(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User profile not found".into()))?;
    Ok(Json(profile))
}

#[instrument(skip(state, payload))]
pub async fn put_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpsertProfileRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    if payload.daily_calorie_target <= 0 {
        return Err(ApiError::InvalidInput(
            "daily_calorie_target must be positive".into(),
        ));
    }

    let profile = UserProfile::upsert(
        &state.db,
        user_id,
        &payload.dietary_preferences,
        &payload.disliked_ingredients,
        payload.health_goal.as_deref(),
        payload.daily_calorie_target,
    )
    .await?;

    info!(user_id = %user_id, "profile saved");
    Ok(Json(profile))
}
