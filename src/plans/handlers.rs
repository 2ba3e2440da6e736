use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::AuthUser,
    error::ApiError,
    plans::dto::{PlanQuery, SavePlanRequest},
    plans::repo::MealPlan,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/plans", post(save_plan))
        .route("/plans", get(list_plans))
}

#[instrument(skip(state, payload))]
pub async fn save_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SavePlanRequest>,
) -> Result<Json<MealPlan>, ApiError> {
    if payload.days.len() != 7 {
        return Err(ApiError::InvalidInput(format!(
            "a plan must have exactly 7 days, got {}",
            payload.days.len()
        )));
    }

    let plan = MealPlan::upsert(
        &state.db,
        user_id,
        payload.week_start_date,
        &payload.days,
        payload.reasoning.as_deref(),
    )
    .await?;

    info!(user_id = %user_id, week = %payload.week_start_date, "meal plan saved");
    Ok(Json(plan))
}

#[instrument(skip(state))]
pub async fn list_plans(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<PlanQuery>,
) -> Result<Json<Vec<MealPlan>>, ApiError> {
    let plans = match q.week_start_date {
        Some(week) => MealPlan::find_by_week(&state.db, user_id, week)
            .await?
            .into_iter()
            .collect(),
        None => MealPlan::list_by_user(&state.db, user_id).await?,
    };
    Ok(Json(plans))
}
