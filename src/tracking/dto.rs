use serde::Deserialize;
use time::Date;

use crate::tracking::repo::LoggedMeal;

#[derive(Debug, Deserialize)]
pub struct RateRecipeRequest {
    pub rating: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpsertLogRequest {
    pub log_date: Date,
    pub meals_logged: Vec<LoggedMeal>,
}

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    pub date: Option<Date>,
}
