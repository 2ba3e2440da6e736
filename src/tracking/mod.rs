mod dto;
pub mod handlers;
pub mod repo;

pub use repo::{CalorieLog, FavoriteRecipe, LoggedMeal, RecipeRating};

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::routes())
}
