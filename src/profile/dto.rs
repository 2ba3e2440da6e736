use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct UpsertProfileRequest {
    #[serde(default)]
    pub dietary_preferences: Vec<String>,
    #[serde(default)]
    pub disliked_ingredients: Vec<String>,
    pub health_goal: Option<String>,
    pub daily_calorie_target: i32,
}
