use serde::Serialize;
use serde_json::{json, Value};

use crate::planner::signals::{CommunityTrends, UserSignals};
use crate::profile::UserProfile;
use crate::recipes::repo::MEAL_TYPES;
use crate::recipes::Recipe;

/// Per-meal calorie budget split: 25% breakfast, 35% lunch, 30% dinner,
/// 10% snack, each rounded to the nearest integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MealTargets {
    pub breakfast: i32,
    pub lunch: i32,
    pub dinner: i32,
    pub snack: i32,
}

impl MealTargets {
    pub fn split(calorie_target: i32) -> Self {
        let target = f64::from(calorie_target);
        Self {
            breakfast: (target * 0.25).round() as i32,
            lunch: (target * 0.35).round() as i32,
            dinner: (target * 0.30).round() as i32,
            snack: (target * 0.10).round() as i32,
        }
    }

    pub fn for_meal_type(&self, meal_type: &str) -> i32 {
        match meal_type {
            "breakfast" => self.breakfast,
            "lunch" => self.lunch,
            "dinner" => self.dinner,
            _ => self.snack,
        }
    }
}

/// A candidate as presented to the planner, with the user and community
/// enrichment attached.
#[derive(Debug, Serialize)]
pub struct CandidateSummary {
    pub id: String,
    pub name: String,
    pub calories: i32,
    pub protein_g: f32,
    pub dietary_tags: Vec<String>,
    pub prep_time_mins: i32,
    pub is_favorite: bool,
    pub is_high_rated: bool,
    pub user_has_cooked: bool,
    pub community_favorites: i64,
    pub community_avg_rating: f64,
}

pub fn enrich(recipe: &Recipe, signals: &UserSignals, trends: &CommunityTrends) -> CandidateSummary {
    let trend = trends.get(recipe.id);
    CandidateSummary {
        id: recipe.id.to_string(),
        name: recipe.name.clone(),
        calories: recipe.calories,
        protein_g: recipe.protein_g,
        dietary_tags: recipe.dietary_tags.clone(),
        prep_time_mins: recipe.prep_time_mins,
        is_favorite: signals.favorite_recipe_ids.contains(&recipe.id),
        is_high_rated: signals.high_rated_recipe_ids.contains(&recipe.id),
        user_has_cooked: signals.cooked_recipe_ids.contains(&recipe.id),
        community_favorites: trend.favorite_count,
        community_avg_rating: trend.avg_rating,
    }
}

fn candidate_lines(
    recipes: &[Recipe],
    signals: &UserSignals,
    trends: &CommunityTrends,
) -> String {
    recipes
        .iter()
        .map(|r| {
            serde_json::to_string(&enrich(r, signals, trends))
                .unwrap_or_else(|_| format!("{{\"id\":\"{}\"}}", r.id))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

/// The full weekly-plan instruction. Everything the model needs is embedded
/// as computed facts, not descriptions.
pub fn build_plan_prompt(
    profile: &UserProfile,
    signals: &UserSignals,
    trends: &CommunityTrends,
    favorite_names: &[String],
    candidates_by_meal: &[(&str, Vec<Recipe>)],
    calorie_target: i32,
) -> String {
    let targets = MealTargets::split(calorie_target);

    let mut grouped = String::new();
    for (meal_type, recipes) in candidates_by_meal {
        grouped.push_str(&format!(
            "\n## {meal_type} candidates ({} recipes)\n{}\n",
            recipes.len(),
            candidate_lines(recipes, signals, trends)
        ));
    }

    format!(
        "You are a nutrition planner. Create a 7-day meal plan for this user.\n\
         \n\
         User profile:\n\
         - Dietary preferences: {preferences}\n\
         - Disliked ingredients: {disliked}\n\
         - Health goal: {goal}\n\
         - Daily calorie target: {calorie_target} kcal\n\
         - Per-meal targets: breakfast {breakfast} kcal, lunch {lunch} kcal, \
         dinner {dinner} kcal, snack {snack} kcal\n\
         \n\
         User behavior:\n\
         - Favorite recipes: {favorites}\n\
         - High-rated recipes: {high_rated_count}\n\
         - Distinct recipes cooked: {cooked_count}\n\
         \n\
         Candidate recipes, grouped by meal type. Each line is one recipe as \
         JSON with user flags (is_favorite, is_high_rated, user_has_cooked) \
         and community stats (community_favorites, community_avg_rating):\n\
         {grouped}\n\
         \n\
         Rules:\n\
         - Return exactly 7 days.\n\
         - Every day must have all 4 meal slots populated: breakfast, lunch, dinner, snack.\n\
         - Use only recipe ids from the candidate lists above.\n\
         - Do not repeat any recipe more than twice across the week.\n\
         - Keep each meal within 200 kcal of its per-meal target.\n\
         - Prefer favorites and high-rated recipes where they fit.",
        preferences = list_or_none(&profile.dietary_preferences),
        disliked = list_or_none(&profile.disliked_ingredients),
        goal = profile.health_goal.as_deref().unwrap_or("not set"),
        calorie_target = calorie_target,
        breakfast = targets.breakfast,
        lunch = targets.lunch,
        dinner = targets.dinner,
        snack = targets.snack,
        favorites = list_or_none(favorite_names),
        high_rated_count = signals.high_rated_recipe_ids.len(),
        cooked_count = signals.cooked_recipe_ids.len(),
        grouped = grouped,
    )
}

pub fn plan_response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "days": {
                "type": "array",
                "minItems": 7,
                "maxItems": 7,
                "items": {
                    "type": "object",
                    "properties": {
                        "day_name": { "type": "string" },
                        "breakfast_recipe_id": { "type": "string" },
                        "lunch_recipe_id": { "type": "string" },
                        "dinner_recipe_id": { "type": "string" },
                        "snack_recipe_id": { "type": "string" }
                    },
                    "required": [
                        "day_name",
                        "breakfast_recipe_id",
                        "lunch_recipe_id",
                        "dinner_recipe_id",
                        "snack_recipe_id"
                    ]
                }
            },
            "reasoning": { "type": "string" }
        },
        "required": ["days", "reasoning"]
    })
}

/// Meal-swap re-ranking: pick the best `count` alternatives from an
/// already-ordered candidate list.
pub fn build_swap_prompt(
    profile: &UserProfile,
    signals: &UserSignals,
    trends: &CommunityTrends,
    candidates: &[Recipe],
    meal_type: &str,
    target_calories: i32,
    count: usize,
) -> String {
    format!(
        "You are a nutrition assistant. The user wants alternatives for a \
         {meal_type} around {target_calories} kcal.\n\
         \n\
         User profile:\n\
         - Dietary preferences: {preferences}\n\
         - Disliked ingredients: {disliked}\n\
         - Health goal: {goal}\n\
         \n\
         Candidates, best-first from local ranking, one JSON per line:\n\
         {lines}\n\
         \n\
         Pick the {count} best alternatives, best first. Use only ids from \
         the candidate list.",
        meal_type = meal_type,
        target_calories = target_calories,
        preferences = list_or_none(&profile.dietary_preferences),
        disliked = list_or_none(&profile.disliked_ingredients),
        goal = profile.health_goal.as_deref().unwrap_or("not set"),
        lines = candidate_lines(candidates, signals, trends),
        count = count,
    )
}

/// General personalized recommendations across all meal types.
pub fn build_general_prompt(
    profile: &UserProfile,
    signals: &UserSignals,
    trends: &CommunityTrends,
    candidates: &[Recipe],
    count: usize,
) -> String {
    format!(
        "You are a nutrition assistant. Recommend recipes this user is \
         likely to enjoy next.\n\
         \n\
         User profile:\n\
         - Dietary preferences: {preferences}\n\
         - Disliked ingredients: {disliked}\n\
         - Health goal: {goal}\n\
         - Daily calorie target: {target} kcal\n\
         - Favorites: {favorites_count}, high-rated: {high_rated_count}, \
         cooked: {cooked_count}\n\
         \n\
         Candidates, one JSON per line:\n\
         {lines}\n\
         \n\
         Rank the {count} best recommendations, best first, and explain \
         your reasoning briefly. Use only ids from the candidate list.",
        preferences = list_or_none(&profile.dietary_preferences),
        disliked = list_or_none(&profile.disliked_ingredients),
        goal = profile.health_goal.as_deref().unwrap_or("not set"),
        target = profile.daily_calorie_target,
        favorites_count = signals.favorite_recipe_ids.len(),
        high_rated_count = signals.high_rated_recipe_ids.len(),
        cooked_count = signals.cooked_recipe_ids.len(),
        lines = candidate_lines(candidates, signals, trends),
        count = count,
    )
}

pub fn ranked_ids_schema(count: usize) -> Value {
    json!({
        "type": "object",
        "properties": {
            "recommendations": {
                "type": "array",
                "maxItems": count,
                "items": { "type": "string" }
            },
            "reasoning": { "type": "string" }
        },
        "required": ["recommendations", "reasoning"]
    })
}

/// Natural-language search: the model translates the query into a filter
/// specification; it never picks recipes itself.
pub fn build_search_prompt(query: &str) -> String {
    format!(
        "Translate this recipe search query into a structured filter.\n\
         \n\
         Query: {query}\n\
         \n\
         Known meal types: {meal_types}. Leave fields out when the query \
         does not constrain them. sort_by is one of: calories, protein, \
         prep_time, relevance.",
        query = query,
        meal_types = MEAL_TYPES.join(", "),
    )
}

pub fn search_filter_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "search_terms": { "type": "array", "items": { "type": "string" } },
            "meal_type": { "type": "string", "enum": MEAL_TYPES },
            "cuisine_type": { "type": "string" },
            "dietary_tags": { "type": "array", "items": { "type": "string" } },
            "include_ingredients": { "type": "array", "items": { "type": "string" } },
            "exclude_ingredients": { "type": "array", "items": { "type": "string" } },
            "max_prep_time": { "type": "integer" },
            "max_calories": { "type": "integer" },
            "sort_by": {
                "type": "string",
                "enum": ["calories", "protein", "prep_time", "relevance"]
            }
        },
        "required": []
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::filter::test_support::recipe;
    use crate::planner::signals::UserSignals;
    use time::OffsetDateTime;
    use uuid::Uuid;

    #[test]
    fn meal_split_sums_close_to_target() {
        for target in [1200, 1500, 1801, 2000, 2150, 2499, 3000] {
            let t = MealTargets::split(target);
            let sum = t.breakfast + t.lunch + t.dinner + t.snack;
            assert!(
                (sum - target).abs() <= 3,
                "target {target}: split summed to {sum}"
            );
        }
    }

    #[test]
    fn meal_split_exact_quarters() {
        let t = MealTargets::split(2000);
        assert_eq!(t.breakfast, 500);
        assert_eq!(t.lunch, 700);
        assert_eq!(t.dinner, 600);
        assert_eq!(t.snack, 200);
    }

    fn test_profile() -> UserProfile {
        UserProfile {
            user_id: Uuid::new_v4(),
            dietary_preferences: vec!["Vegetarian".into()],
            disliked_ingredients: vec!["cilantro".into()],
            health_goal: Some("weight_loss".into()),
            daily_calorie_target: 2000,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn plan_prompt_embeds_computed_facts() {
        let profile = test_profile();
        let signals = UserSignals::default();
        let trends = CommunityTrends::default();
        let candidates = vec![("breakfast", vec![recipe("Oatmeal", "breakfast", 350)])];
        let favorites = vec!["Oatmeal".to_string()];

        let prompt = build_plan_prompt(&profile, &signals, &trends, &favorites, &candidates, 2000);

        assert!(prompt.contains("Vegetarian"));
        assert!(prompt.contains("cilantro"));
        assert!(prompt.contains("weight_loss"));
        assert!(prompt.contains("2000 kcal"));
        assert!(prompt.contains("breakfast 500 kcal"));
        assert!(prompt.contains("lunch 700 kcal"));
        assert!(prompt.contains("Oatmeal"));
        assert!(prompt.contains("exactly 7 days"));
        assert!(prompt.contains("200 kcal"));
        assert!(prompt.contains("more than twice"));
    }

    #[test]
    fn enrichment_flags_follow_signals_and_trends() {
        let r = recipe("Salad", "lunch", 400);
        let mut signals = UserSignals::default();
        signals.favorite_recipe_ids.insert(r.id);
        let trends = CommunityTrends::default();

        let summary = enrich(&r, &signals, &trends);
        assert!(summary.is_favorite);
        assert!(!summary.is_high_rated);
        assert_eq!(summary.community_favorites, 0);
        assert_eq!(summary.community_avg_rating, 0.0);
    }

    #[test]
    fn plan_schema_requires_seven_days_and_all_slots() {
        let schema = plan_response_schema();
        assert_eq!(schema["properties"]["days"]["minItems"], 7);
        assert_eq!(schema["properties"]["days"]["maxItems"], 7);
        let required = schema["properties"]["days"]["items"]["required"]
            .as_array()
            .expect("required array");
        assert_eq!(required.len(), 5);
        assert!(required.contains(&serde_json::json!("snack_recipe_id")));
    }

    #[test]
    fn ranked_schema_caps_count() {
        let schema = ranked_ids_schema(5);
        assert_eq!(schema["properties"]["recommendations"]["maxItems"], 5);
    }
}
