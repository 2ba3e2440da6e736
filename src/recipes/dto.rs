use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RecipeQuery {
    pub meal_type: Option<String>,
    pub cuisine_type: Option<String>,
    pub max_calories: Option<i32>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct CreateRecipeRequest {
    pub name: String,
    pub meal_type: String,
    pub calories: i32,
    #[serde(default)]
    pub protein_g: f32,
    #[serde(default)]
    pub carbs_g: f32,
    #[serde(default)]
    pub fat_g: f32,
    #[serde(default)]
    pub fiber_g: f32,
    #[serde(default)]
    pub dietary_tags: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub prep_time_mins: i32,
    #[serde(default)]
    pub cook_time_mins: i32,
    pub cuisine_type: Option<String>,
}
