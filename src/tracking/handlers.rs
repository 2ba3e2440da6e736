use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::ApiError,
    recipes::repo::{is_valid_meal_type, Recipe},
    state::AppState,
    tracking::dto::{LogQuery, RateRecipeRequest, UpsertLogRequest},
    tracking::repo::{CalorieLog, FavoriteRecipe, RecipeRating},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/recipes/:id/favorite", post(add_favorite))
        .route("/recipes/:id/favorite", delete(remove_favorite))
        .route("/favorites", get(list_favorites))
        .route("/recipes/:id/rating", put(rate_recipe))
        .route("/logs", post(upsert_log))
        .route("/logs", get(list_logs))
}

#[instrument(skip(state))]
pub async fn add_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(recipe_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    Recipe::find_by_id(&state.db, recipe_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recipe not found".into()))?;

    FavoriteRecipe::add(&state.db, user_id, recipe_id).await?;
    info!(user_id = %user_id, recipe_id = %recipe_id, "recipe favorited");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(recipe_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let removed = FavoriteRecipe::remove(&state.db, user_id, recipe_id).await?;
    if !removed {
        return Err(ApiError::NotFound("Favorite not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn list_favorites(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<FavoriteRecipe>>, ApiError> {
    let favorites = FavoriteRecipe::list_by_user(&state.db, user_id).await?;
    Ok(Json(favorites))
}

#[instrument(skip(state, payload))]
pub async fn rate_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(recipe_id): Path<Uuid>,
    Json(payload): Json<RateRecipeRequest>,
) -> Result<Json<RecipeRating>, ApiError> {
    if !(1..=5).contains(&payload.rating) {
        return Err(ApiError::InvalidInput("rating must be 1-5".into()));
    }
    Recipe::find_by_id(&state.db, recipe_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recipe not found".into()))?;

    let rating = RecipeRating::upsert(&state.db, user_id, recipe_id, payload.rating).await?;
    info!(user_id = %user_id, recipe_id = %recipe_id, rating = payload.rating, "recipe rated");
    Ok(Json(rating))
}

#[instrument(skip(state, payload))]
pub async fn upsert_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpsertLogRequest>,
) -> Result<Json<CalorieLog>, ApiError> {
    for meal in &payload.meals_logged {
        if !is_valid_meal_type(&meal.meal_type) {
            return Err(ApiError::InvalidInput(format!(
                "invalid meal_type: {}",
                meal.meal_type
            )));
        }
        if meal.calories < 0 {
            return Err(ApiError::InvalidInput("calories must be >= 0".into()));
        }
    }

    let log = CalorieLog::upsert(&state.db, user_id, payload.log_date, &payload.meals_logged)
        .await?;
    info!(user_id = %user_id, log_date = %payload.log_date, meals = payload.meals_logged.len(), "calorie log saved");
    Ok(Json(log))
}

#[instrument(skip(state))]
pub async fn list_logs(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<LogQuery>,
) -> Result<Json<Vec<CalorieLog>>, ApiError> {
    let logs = match q.date {
        Some(date) => CalorieLog::find_by_date(&state.db, user_id, date)
            .await?
            .into_iter()
            .collect(),
        None => CalorieLog::list_by_user(&state.db, user_id).await?,
    };
    Ok(Json(logs))
}
