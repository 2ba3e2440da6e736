use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// One day of a weekly plan. Recipe ids are kept as the strings the planner
/// returned; `total_calories` is always recomputed from the catalog, never
/// trusted from upstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanDay {
    pub day_name: String,
    pub date: String,
    pub breakfast_recipe_id: String,
    pub lunch_recipe_id: String,
    pub dinner_recipe_id: String,
    pub snack_recipe_id: String,
    pub total_calories: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MealPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub week_start_date: Date,
    pub days: Json<Vec<PlanDay>>,
    pub reasoning: Option<String>,
    pub created_at: OffsetDateTime,
}

impl MealPlan {
    /// One plan per (user, week); saving again replaces the week.
    pub async fn upsert(
        db: &PgPool,
        user_id: Uuid,
        week_start_date: Date,
        days: &[PlanDay],
        reasoning: Option<&str>,
    ) -> anyhow::Result<MealPlan> {
        let row = sqlx::query_as::<_, MealPlan>(
            r#"
            INSERT INTO meal_plans (user_id, week_start_date, days, reasoning)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, week_start_date) DO UPDATE SET
                days = EXCLUDED.days,
                reasoning = EXCLUDED.reasoning
            RETURNING id, user_id, week_start_date, days, reasoning, created_at
            "#,
        )
        .bind(user_id)
        .bind(week_start_date)
        .bind(Json(days))
        .bind(reasoning)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn find_by_week(
        db: &PgPool,
        user_id: Uuid,
        week_start_date: Date,
    ) -> anyhow::Result<Option<MealPlan>> {
        let row = sqlx::query_as::<_, MealPlan>(
            r#"
            SELECT id, user_id, week_start_date, days, reasoning, created_at
            FROM meal_plans
            WHERE user_id = $1 AND week_start_date = $2
            "#,
        )
        .bind(user_id)
        .bind(week_start_date)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<MealPlan>> {
        let rows = sqlx::query_as::<_, MealPlan>(
            r#"
            SELECT id, user_id, week_start_date, days, reasoning, created_at
            FROM meal_plans
            WHERE user_id = $1
            ORDER BY week_start_date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
