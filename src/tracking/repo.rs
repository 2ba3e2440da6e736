use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FavoriteRecipe {
    pub user_id: Uuid,
    pub recipe_id: Uuid,
    pub created_at: OffsetDateTime,
}

impl FavoriteRecipe {
    pub async fn add(db: &PgPool, user_id: Uuid, recipe_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO favorite_recipes (user_id, recipe_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, recipe_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(recipe_id)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn remove(db: &PgPool, user_id: Uuid, recipe_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            DELETE FROM favorite_recipes
            WHERE user_id = $1 AND recipe_id = $2
            "#,
        )
        .bind(user_id)
        .bind(recipe_id)
        .execute(db)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<FavoriteRecipe>> {
        let rows = sqlx::query_as::<_, FavoriteRecipe>(
            r#"
            SELECT user_id, recipe_id, created_at
            FROM favorite_recipes
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// All users' favorites, for community trend aggregation.
    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<FavoriteRecipe>> {
        let rows = sqlx::query_as::<_, FavoriteRecipe>(
            r#"
            SELECT user_id, recipe_id, created_at
            FROM favorite_recipes
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecipeRating {
    pub user_id: Uuid,
    pub recipe_id: Uuid,
    pub rating: i32,
    pub updated_at: OffsetDateTime,
}

impl RecipeRating {
    /// At most one rating per (user, recipe); re-rating overwrites.
    pub async fn upsert(
        db: &PgPool,
        user_id: Uuid,
        recipe_id: Uuid,
        rating: i32,
    ) -> anyhow::Result<RecipeRating> {
        let row = sqlx::query_as::<_, RecipeRating>(
            r#"
            INSERT INTO recipe_ratings (user_id, recipe_id, rating)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, recipe_id) DO UPDATE SET
                rating = EXCLUDED.rating,
                updated_at = now()
            RETURNING user_id, recipe_id, rating, updated_at
            "#,
        )
        .bind(user_id)
        .bind(recipe_id)
        .bind(rating)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<RecipeRating>> {
        let rows = sqlx::query_as::<_, RecipeRating>(
            r#"
            SELECT user_id, recipe_id, rating, updated_at
            FROM recipe_ratings
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// All users' ratings, for community trend aggregation.
    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<RecipeRating>> {
        let rows = sqlx::query_as::<_, RecipeRating>(
            r#"
            SELECT user_id, recipe_id, rating, updated_at
            FROM recipe_ratings
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

/// One logged meal inside a day's calorie log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggedMeal {
    pub meal_type: String,
    pub recipe_id: Option<Uuid>,
    pub calories: i32,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CalorieLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub log_date: Date,
    pub meals_logged: Json<Vec<LoggedMeal>>,
    pub created_at: OffsetDateTime,
}

impl CalorieLog {
    /// One log per (user, date); re-posting a day replaces its meals.
    pub async fn upsert(
        db: &PgPool,
        user_id: Uuid,
        log_date: Date,
        meals_logged: &[LoggedMeal],
    ) -> anyhow::Result<CalorieLog> {
        let row = sqlx::query_as::<_, CalorieLog>(
            r#"
            INSERT INTO calorie_logs (user_id, log_date, meals_logged)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, log_date) DO UPDATE SET
                meals_logged = EXCLUDED.meals_logged
            RETURNING id, user_id, log_date, meals_logged, created_at
            "#,
        )
        .bind(user_id)
        .bind(log_date)
        .bind(Json(meals_logged))
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn find_by_date(
        db: &PgPool,
        user_id: Uuid,
        log_date: Date,
    ) -> anyhow::Result<Option<CalorieLog>> {
        let row = sqlx::query_as::<_, CalorieLog>(
            r#"
            SELECT id, user_id, log_date, meals_logged, created_at
            FROM calorie_logs
            WHERE user_id = $1 AND log_date = $2
            "#,
        )
        .bind(user_id)
        .bind(log_date)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<CalorieLog>> {
        let rows = sqlx::query_as::<_, CalorieLog>(
            r#"
            SELECT id, user_id, log_date, meals_logged, created_at
            FROM calorie_logs
            WHERE user_id = $1
            ORDER BY log_date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
