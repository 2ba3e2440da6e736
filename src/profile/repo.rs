use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Dietary profile written during onboarding/check-in and read by the
/// planning pipeline. One row per user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub dietary_preferences: Vec<String>,
    pub disliked_ingredients: Vec<String>,
    pub health_goal: Option<String>,
    pub daily_calorie_target: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl UserProfile {
    pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<UserProfile>> {
        let row = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT user_id, dietary_preferences, disliked_ingredients, health_goal,
                   daily_calorie_target, created_at, updated_at
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn upsert(
        db: &PgPool,
        user_id: Uuid,
        dietary_preferences: &[String],
        disliked_ingredients: &[String],
        health_goal: Option<&str>,
        daily_calorie_target: i32,
    ) -> anyhow::Result<UserProfile> {
        let row = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles (user_id, dietary_preferences, disliked_ingredients,
                                       health_goal, daily_calorie_target)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE SET
                dietary_preferences = EXCLUDED.dietary_preferences,
                disliked_ingredients = EXCLUDED.disliked_ingredients,
                health_goal = EXCLUDED.health_goal,
                daily_calorie_target = EXCLUDED.daily_calorie_target,
                updated_at = now()
            RETURNING user_id, dietary_preferences, disliked_ingredients, health_goal,
                      daily_calorie_target, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(dietary_preferences)
        .bind(disliked_ingredients)
        .bind(health_goal)
        .bind(daily_calorie_target)
        .fetch_one(db)
        .await?;
        Ok(row)
    }
}
