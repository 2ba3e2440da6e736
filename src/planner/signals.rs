use std::collections::{HashMap, HashSet};

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::profile::UserProfile;
use crate::tracking::{CalorieLog, FavoriteRecipe, RecipeRating};

/// A rating of 4 or 5 counts as an endorsement.
pub const HIGH_RATING_THRESHOLD: i32 = 4;

/// Per-user preference context: what the user favorited, rated highly,
/// and actually cooked (completed logged meals).
#[derive(Debug, Default)]
pub struct UserSignals {
    pub favorite_recipe_ids: HashSet<Uuid>,
    pub high_rated_recipe_ids: HashSet<Uuid>,
    pub cooked_recipe_ids: HashSet<Uuid>,
}

impl UserSignals {
    pub fn build(
        favorites: &[FavoriteRecipe],
        ratings: &[RecipeRating],
        logs: &[CalorieLog],
    ) -> Self {
        let favorite_recipe_ids = favorites.iter().map(|f| f.recipe_id).collect();
        let high_rated_recipe_ids = ratings
            .iter()
            .filter(|r| r.rating >= HIGH_RATING_THRESHOLD)
            .map(|r| r.recipe_id)
            .collect();
        let cooked_recipe_ids = logs
            .iter()
            .flat_map(|log| log.meals_logged.0.iter())
            .filter(|meal| meal.completed)
            .filter_map(|meal| meal.recipe_id)
            .collect();
        Self {
            favorite_recipe_ids,
            high_rated_recipe_ids,
            cooked_recipe_ids,
        }
    }
}

/// Fetch the user's profile and behavioral signals. The reads have no
/// ordering dependency and are issued concurrently. Missing profile is
/// `NotFound`: callers must run onboarding first.
pub async fn gather_user_signals(
    db: &PgPool,
    user_id: Uuid,
) -> Result<(UserProfile, UserSignals), ApiError> {
    let (profile, favorites, ratings, logs) = tokio::try_join!(
        UserProfile::find_by_user(db, user_id),
        FavoriteRecipe::list_by_user(db, user_id),
        RecipeRating::list_by_user(db, user_id),
        CalorieLog::list_by_user(db, user_id),
    )?;

    let profile =
        profile.ok_or_else(|| ApiError::NotFound("User profile not found".into()))?;

    Ok((profile, UserSignals::build(&favorites, &ratings, &logs)))
}

/// Community-wide popularity per recipe across all users.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecipeTrend {
    pub favorite_count: i64,
    pub avg_rating: f64,
}

#[derive(Debug, Default)]
pub struct CommunityTrends {
    by_recipe: HashMap<Uuid, RecipeTrend>,
}

impl CommunityTrends {
    pub fn compute(favorites: &[FavoriteRecipe], ratings: &[RecipeRating]) -> Self {
        let mut by_recipe: HashMap<Uuid, RecipeTrend> = HashMap::new();

        for fav in favorites {
            by_recipe.entry(fav.recipe_id).or_default().favorite_count += 1;
        }

        let mut rating_sums: HashMap<Uuid, (i64, i64)> = HashMap::new();
        for rating in ratings {
            let entry = rating_sums.entry(rating.recipe_id).or_default();
            entry.0 += i64::from(rating.rating);
            entry.1 += 1;
        }
        for (recipe_id, (sum, count)) in rating_sums {
            // count is always >= 1 here; recipes with no ratings stay at 0.0
            let avg = (sum as f64 / count as f64 * 10.0).round() / 10.0;
            by_recipe.entry(recipe_id).or_default().avg_rating = avg;
        }

        Self { by_recipe }
    }

    pub async fn load(db: &PgPool) -> anyhow::Result<Self> {
        let (favorites, ratings) = tokio::try_join!(
            FavoriteRecipe::list_all(db),
            RecipeRating::list_all(db),
        )?;
        Ok(Self::compute(&favorites, &ratings))
    }

    pub fn get(&self, recipe_id: Uuid) -> RecipeTrend {
        self.by_recipe.get(&recipe_id).copied().unwrap_or_default()
    }
}
