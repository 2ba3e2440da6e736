use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::planner::postprocess::SearchFilters;
use crate::plans::PlanDay;
use crate::recipes::Recipe;

#[derive(Debug, Deserialize)]
pub struct GeneratePlanRequest {
    pub calorie_target: Option<i32>,
    pub week_start_date: Option<Date>,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub days: Vec<PlanDay>,
    pub reasoning: String,
    pub calorie_target: i32,
    pub user_preferences_applied: PreferencesApplied,
}

#[derive(Debug, Serialize)]
pub struct PreferencesApplied {
    pub dietary_preferences: Vec<String>,
    pub favorites_count: usize,
    pub health_goal: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SwapRequest {
    pub target_calories: i32,
    pub meal_type: String,
    #[serde(default)]
    pub exclude_recipe_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct SwapResponse {
    pub recommendations: Vec<Recipe>,
    pub total_available: usize,
}

#[derive(Debug, Serialize)]
pub struct AiRecommendationsResponse {
    pub recommendations: Vec<String>,
    pub reasoning: String,
    pub user_context: UserContext,
}

#[derive(Debug, Serialize)]
pub struct UserContext {
    pub dietary_preferences: Vec<String>,
    pub health_goal: Option<String>,
    pub daily_calorie_target: i32,
    pub favorites_count: usize,
    pub high_rated_count: usize,
    pub cooked_count: usize,
}

#[derive(Debug, Serialize)]
pub struct DiscoverResponse {
    pub recommendations: Vec<Recipe>,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub recipes: Vec<Recipe>,
    pub filters: SearchFilters,
    pub total_results: usize,
}
