use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// A catalog recipe. Read-only input to the planning pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub name: String,
    pub meal_type: String,
    pub calories: i32,
    pub protein_g: f32,
    pub carbs_g: f32,
    pub fat_g: f32,
    pub fiber_g: f32,
    pub dietary_tags: Vec<String>,
    pub ingredients: Vec<String>,
    pub prep_time_mins: i32,
    pub cook_time_mins: i32,
    pub cuisine_type: Option<String>,
    pub created_at: OffsetDateTime,
}

impl Recipe {
    /// Full catalog scan, insertion (creation) order.
    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, name, meal_type, calories, protein_g, carbs_g, fat_g, fiber_g,
                   dietary_tags, ingredients, prep_time_mins, cook_time_mins, cuisine_type, created_at
            FROM recipes
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn list_by_meal_type(db: &PgPool, meal_type: &str) -> anyhow::Result<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, name, meal_type, calories, protein_g, carbs_g, fat_g, fiber_g,
                   dietary_tags, ingredients, prep_time_mins, cook_time_mins, cuisine_type, created_at
            FROM recipes
            WHERE meal_type = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(meal_type)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Recipe>> {
        let row = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, name, meal_type, calories, protein_g, carbs_g, fat_g, fiber_g,
                   dietary_tags, ingredients, prep_time_mins, cook_time_mins, cuisine_type, created_at
            FROM recipes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    /// Paged browse with optional SQL-side narrowing.
    pub async fn list_page(
        db: &PgPool,
        meal_type: Option<&str>,
        cuisine_type: Option<&str>,
        max_calories: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, name, meal_type, calories, protein_g, carbs_g, fat_g, fiber_g,
                   dietary_tags, ingredients, prep_time_mins, cook_time_mins, cuisine_type, created_at
            FROM recipes
            WHERE ($1::text IS NULL OR meal_type = $1)
              AND ($2::text IS NULL OR cuisine_type = $2)
              AND ($3::int IS NULL OR calories <= $3)
            ORDER BY created_at, id
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(meal_type)
        .bind(cuisine_type)
        .bind(max_calories)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        db: &PgPool,
        name: &str,
        meal_type: &str,
        calories: i32,
        protein_g: f32,
        carbs_g: f32,
        fat_g: f32,
        fiber_g: f32,
        dietary_tags: &[String],
        ingredients: &[String],
        prep_time_mins: i32,
        cook_time_mins: i32,
        cuisine_type: Option<&str>,
    ) -> anyhow::Result<Recipe> {
        let row = sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes (name, meal_type, calories, protein_g, carbs_g, fat_g, fiber_g,
                                 dietary_tags, ingredients, prep_time_mins, cook_time_mins, cuisine_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id, name, meal_type, calories, protein_g, carbs_g, fat_g, fiber_g,
                      dietary_tags, ingredients, prep_time_mins, cook_time_mins, cuisine_type, created_at
            "#,
        )
        .bind(name)
        .bind(meal_type)
        .bind(calories)
        .bind(protein_g)
        .bind(carbs_g)
        .bind(fat_g)
        .bind(fiber_g)
        .bind(dietary_tags)
        .bind(ingredients)
        .bind(prep_time_mins)
        .bind(cook_time_mins)
        .bind(cuisine_type)
        .fetch_one(db)
        .await?;
        Ok(row)
    }
}

pub const MEAL_TYPES: [&str; 4] = ["breakfast", "lunch", "dinner", "snack"];

pub fn is_valid_meal_type(meal_type: &str) -> bool {
    MEAL_TYPES.contains(&meal_type)
}
