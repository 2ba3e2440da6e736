//! Meal-plan generation and recommendation pipeline.
//!
//! Each request is a single stateless pass: gather the user's signals and
//! community trends, filter the catalog to candidates, order them with one
//! of two scoring strategies, hand the planner a prompt plus response
//! schema, and deterministically post-process what comes back.

mod dto;
pub mod filter;
pub mod handlers;
pub mod postprocess;
pub mod prompt;
pub mod scorer;
mod services;
pub mod signals;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::routes())
}
