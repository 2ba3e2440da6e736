use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::AuthUser,
    error::ApiError,
    planner::dto::{
        AiRecommendationsResponse, DiscoverResponse, GeneratePlanRequest, PlanResponse,
        SearchRequest, SearchResponse, SwapRequest, SwapResponse,
    },
    planner::services,
    recipes::repo::is_valid_meal_type,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/plans/generate", post(generate_plan))
        .route("/recommendations", post(recommend_swaps))
        .route("/recommendations/ai", post(recommend_ai))
        .route("/recommendations/discover", get(discover))
        .route("/recipes/search", post(search))
}

#[instrument(skip(state, payload))]
pub async fn generate_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<GeneratePlanRequest>,
) -> Result<Json<PlanResponse>, ApiError> {
    let response = services::generate_meal_plan(
        &state,
        user_id,
        payload.calorie_target,
        payload.week_start_date,
    )
    .await?;
    Ok(Json(response))
}

#[instrument(skip(state, payload))]
pub async fn recommend_swaps(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SwapRequest>,
) -> Result<Json<SwapResponse>, ApiError> {
    if !is_valid_meal_type(&payload.meal_type) {
        return Err(ApiError::InvalidInput(format!(
            "invalid meal_type: {}",
            payload.meal_type
        )));
    }
    let response = services::swap_recommendations(
        &state,
        user_id,
        payload.target_calories,
        &payload.meal_type,
        &payload.exclude_recipe_ids,
    )
    .await?;
    Ok(Json(response))
}

#[instrument(skip(state))]
pub async fn recommend_ai(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<AiRecommendationsResponse>, ApiError> {
    let response = services::ai_recommendations(&state, user_id).await?;
    Ok(Json(response))
}

#[instrument(skip(state))]
pub async fn discover(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<DiscoverResponse>, ApiError> {
    let response = services::discover_recommendations(&state, user_id).await?;
    Ok(Json(response))
}

#[instrument(skip(state, payload))]
pub async fn search(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = payload
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::InvalidInput("query is required".into()))?;

    let response = services::smart_search(&state, user_id, query).await?;
    Ok(Json(response))
}
