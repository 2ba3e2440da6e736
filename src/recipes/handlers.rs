use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::ApiError,
    recipes::dto::{CreateRecipeRequest, RecipeQuery},
    recipes::repo::{is_valid_meal_type, Recipe},
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes))
        .route("/recipes/:id", get(get_recipe))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/recipes", post(create_recipe))
}

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(q): Query<RecipeQuery>,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    if let Some(mt) = q.meal_type.as_deref() {
        if !is_valid_meal_type(mt) {
            return Err(ApiError::InvalidInput(format!("invalid meal_type: {mt}")));
        }
    }
    let recipes = Recipe::list_page(
        &state.db,
        q.meal_type.as_deref(),
        q.cuisine_type.as_deref(),
        q.max_calories,
        q.limit,
        q.offset,
    )
    .await?;
    Ok(Json(recipes))
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Recipe>, ApiError> {
    let recipe = Recipe::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Recipe not found".into()))?;
    Ok(Json(recipe))
}

#[instrument(skip(state, payload))]
pub async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateRecipeRequest>,
) -> Result<(StatusCode, Json<Recipe>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::InvalidInput("name is required".into()));
    }
    if !is_valid_meal_type(&payload.meal_type) {
        return Err(ApiError::InvalidInput(format!(
            "invalid meal_type: {}",
            payload.meal_type
        )));
    }
    if payload.calories < 0 {
        return Err(ApiError::InvalidInput("calories must be >= 0".into()));
    }

    let recipe = Recipe::create(
        &state.db,
        payload.name.trim(),
        &payload.meal_type,
        payload.calories,
        payload.protein_g,
        payload.carbs_g,
        payload.fat_g,
        payload.fiber_g,
        &payload.dietary_tags,
        &payload.ingredients,
        payload.prep_time_mins,
        payload.cook_time_mins,
        payload.cuisine_type.as_deref(),
    )
    .await?;

    info!(recipe_id = %recipe.id, created_by = %user_id, "recipe created");
    Ok((StatusCode::CREATED, Json(recipe)))
}
