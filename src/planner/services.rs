use std::collections::HashSet;

use time::{Date, OffsetDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::planner::dto::{
    AiRecommendationsResponse, DiscoverResponse, PlanResponse, PreferencesApplied, SearchResponse,
    SwapResponse, UserContext,
};
use crate::planner::filter::{filter_candidates, FilterCriteria};
use crate::planner::postprocess::{
    apply_search_filters, resolve_plan, resolve_ranked_ids, week_start_of, SearchFilters,
    MAX_SEARCH_RESULTS,
};
use crate::planner::prompt::{
    build_general_prompt, build_plan_prompt, build_search_prompt, build_swap_prompt,
    plan_response_schema, ranked_ids_schema, search_filter_schema, MealTargets,
};
use crate::planner::scorer::{AdditiveScorer, BucketScorer, Scorer};
use crate::planner::signals::{gather_user_signals, CommunityTrends, UserSignals};
use crate::plans::MealPlan;
use crate::recipes::repo::MEAL_TYPES;
use crate::recipes::Recipe;
use crate::state::AppState;

/// Weekly-plan meals may drift this far from their per-meal target.
pub const PLAN_TOLERANCE_KCAL: i32 = 200;
/// Swap recommendations use a tighter window around the requested calories.
pub const SWAP_TOLERANCE_KCAL: i32 = 150;

pub const SWAP_COUNT: usize = 5;
pub const GENERAL_COUNT: usize = 12;
pub const DISCOVER_CAP: usize = 8;
/// How many additive-ranked candidates the general recommendation prompt
/// carries.
pub const GENERAL_POOL_CAP: usize = 24;

fn upstream(e: crate::llm::LlmError) -> ApiError {
    ApiError::Upstream(e.to_string())
}

fn favorite_names(catalog: &[Recipe], signals: &UserSignals) -> Vec<String> {
    catalog
        .iter()
        .filter(|r| signals.favorite_recipe_ids.contains(&r.id))
        .map(|r| r.name.clone())
        .collect()
}

fn favorite_recipes(catalog: &[Recipe], signals: &UserSignals) -> Vec<Recipe> {
    catalog
        .iter()
        .filter(|r| signals.favorite_recipe_ids.contains(&r.id))
        .cloned()
        .collect()
}

/// Recipe ids appearing anywhere in the user's saved plans. Ids that never
/// resolved to the catalog are skipped.
pub(crate) fn planned_recipe_ids(plans: &[MealPlan]) -> HashSet<Uuid> {
    plans
        .iter()
        .flat_map(|p| p.days.0.iter())
        .flat_map(|d| {
            [
                d.breakfast_recipe_id.as_str(),
                d.lunch_recipe_id.as_str(),
                d.dinner_recipe_id.as_str(),
                d.snack_recipe_id.as_str(),
            ]
        })
        .filter_map(|raw| Uuid::parse_str(raw).ok())
        .collect()
}

/// Generate a full 7-day plan: gather signals, filter candidates per meal
/// type, build the prompt, invoke the planner once, then validate and
/// enrich its output against the catalog. Nothing is persisted here; the
/// caller saves via the plans endpoint.
pub async fn generate_meal_plan(
    state: &AppState,
    user_id: Uuid,
    calorie_target: Option<i32>,
    week_start_date: Option<Date>,
) -> Result<PlanResponse, ApiError> {
    let (profile, signals) = gather_user_signals(&state.db, user_id).await?;
    let (catalog, trends) = tokio::try_join!(
        Recipe::list_all(&state.db),
        CommunityTrends::load(&state.db),
    )?;

    let calorie_target = calorie_target.unwrap_or(profile.daily_calorie_target);
    if calorie_target <= 0 {
        return Err(ApiError::InvalidInput(
            "calorie_target must be positive".into(),
        ));
    }

    let targets = MealTargets::split(calorie_target);
    let mut candidates_by_meal: Vec<(&str, Vec<Recipe>)> = Vec::with_capacity(MEAL_TYPES.len());
    for meal_type in MEAL_TYPES {
        let suitable = filter_candidates(
            catalog.clone(),
            &FilterCriteria {
                meal_type: Some(meal_type),
                dietary_preferences: Some(&profile.dietary_preferences),
                disliked_ingredients: Some(&profile.disliked_ingredients),
                ..Default::default()
            },
        );
        let target = targets.for_meal_type(meal_type);
        let windowed = filter_candidates(
            suitable.clone(),
            &FilterCriteria {
                calorie_window: Some((target - PLAN_TOLERANCE_KCAL, target + PLAN_TOLERANCE_KCAL)),
                ..Default::default()
            },
        );
        // An empty window falls back to the suitable pool so every slot
        // still has candidates.
        let pool = if windowed.is_empty() { suitable } else { windowed };
        candidates_by_meal.push((meal_type, pool));
    }

    let names = favorite_names(&catalog, &signals);
    let prompt = build_plan_prompt(
        &profile,
        &signals,
        &trends,
        &names,
        &candidates_by_meal,
        calorie_target,
    );
    let raw = state
        .planner
        .invoke(&prompt, &plan_response_schema())
        .await
        .map_err(upstream)?;

    let week_start =
        week_start_date.unwrap_or_else(|| week_start_of(OffsetDateTime::now_utc().date()));
    let (days, reasoning) = resolve_plan(&raw, &catalog, week_start)?;

    info!(user_id = %user_id, calorie_target, week = %week_start, "meal plan generated");
    Ok(PlanResponse {
        days,
        reasoning,
        calorie_target,
        user_preferences_applied: PreferencesApplied {
            dietary_preferences: profile.dietary_preferences.clone(),
            favorites_count: signals.favorite_recipe_ids.len(),
            health_goal: profile.health_goal.clone(),
        },
    })
}

/// Meal-swap alternatives: bucket-precedence ordering, then a single
/// planner call to pick the final 5. An empty candidate pool short-circuits
/// before the planner is ever invoked.
pub async fn swap_recommendations(
    state: &AppState,
    user_id: Uuid,
    target_calories: i32,
    meal_type: &str,
    exclude_recipe_ids: &[Uuid],
) -> Result<SwapResponse, ApiError> {
    if target_calories <= 0 {
        return Err(ApiError::InvalidInput(
            "target_calories must be positive".into(),
        ));
    }

    let (profile, signals) = gather_user_signals(&state.db, user_id).await?;
    let (meal_catalog, trends) = tokio::try_join!(
        Recipe::list_by_meal_type(&state.db, meal_type),
        CommunityTrends::load(&state.db),
    )?;

    let exclude: HashSet<Uuid> = exclude_recipe_ids.iter().copied().collect();
    let suitable = filter_candidates(
        meal_catalog,
        &FilterCriteria {
            exclude_ids: Some(&exclude),
            dietary_preferences: Some(&profile.dietary_preferences),
            disliked_ingredients: Some(&profile.disliked_ingredients),
            ..Default::default()
        },
    );
    let total_available = suitable.len();

    if suitable.is_empty() {
        return Ok(SwapResponse {
            recommendations: vec![],
            total_available: 0,
        });
    }

    let window = (
        target_calories - SWAP_TOLERANCE_KCAL,
        target_calories + SWAP_TOLERANCE_KCAL,
    );
    let ordered = BucketScorer::new(window).score(&suitable, &signals);

    let prompt = build_swap_prompt(
        &profile,
        &signals,
        &trends,
        &ordered,
        meal_type,
        target_calories,
        SWAP_COUNT,
    );
    let raw = state
        .planner
        .invoke(&prompt, &ranked_ids_schema(SWAP_COUNT))
        .await
        .map_err(upstream)?;

    let (mut recommendations, _) = resolve_ranked_ids(&raw, &ordered, SWAP_COUNT)?;
    if recommendations.is_empty() {
        warn!(user_id = %user_id, "planner ranked no valid candidates; using local ordering");
        recommendations = ordered.into_iter().take(SWAP_COUNT).collect();
    }

    Ok(SwapResponse {
        recommendations,
        total_available,
    })
}

/// General personalized recommendations: additive-ranked candidate pool,
/// planner ranks the final 12, returned as ids with reasoning.
pub async fn ai_recommendations(
    state: &AppState,
    user_id: Uuid,
) -> Result<AiRecommendationsResponse, ApiError> {
    let (profile, signals) = gather_user_signals(&state.db, user_id).await?;
    let (catalog, trends, plans) = tokio::try_join!(
        Recipe::list_all(&state.db),
        CommunityTrends::load(&state.db),
        MealPlan::list_by_user(&state.db, user_id),
    )?;

    let planned = planned_recipe_ids(&plans);
    let favorites = favorite_recipes(&catalog, &signals);
    let scorer = AdditiveScorer {
        profile: &profile,
        favorite_recipes: &favorites,
        planned_recipe_ids: &planned,
        cap: GENERAL_POOL_CAP,
    };
    let mut pool = scorer.score(&catalog, &signals);
    if pool.is_empty() {
        // Cold start: nothing scored positive yet, offer the catalog head.
        pool = catalog.iter().take(GENERAL_POOL_CAP).cloned().collect();
    }

    let prompt = build_general_prompt(&profile, &signals, &trends, &pool, GENERAL_COUNT);
    let raw = state
        .planner
        .invoke(&prompt, &ranked_ids_schema(GENERAL_COUNT))
        .await
        .map_err(upstream)?;

    let (recipes, reasoning) = resolve_ranked_ids(&raw, &pool, GENERAL_COUNT)?;

    Ok(AiRecommendationsResponse {
        recommendations: recipes.iter().map(|r| r.id.to_string()).collect(),
        reasoning,
        user_context: UserContext {
            dietary_preferences: profile.dietary_preferences.clone(),
            health_goal: profile.health_goal.clone(),
            daily_calorie_target: profile.daily_calorie_target,
            favorites_count: signals.favorite_recipe_ids.len(),
            high_rated_count: signals.high_rated_recipe_ids.len(),
            cooked_count: signals.cooked_recipe_ids.len(),
        },
    })
}

/// The Discover surface: purely local additive scoring, no planner call.
pub async fn discover_recommendations(
    state: &AppState,
    user_id: Uuid,
) -> Result<DiscoverResponse, ApiError> {
    let (profile, signals) = gather_user_signals(&state.db, user_id).await?;
    let (catalog, plans) = tokio::try_join!(
        Recipe::list_all(&state.db),
        MealPlan::list_by_user(&state.db, user_id),
    )?;

    let planned = planned_recipe_ids(&plans);
    let favorites = favorite_recipes(&catalog, &signals);
    let scorer = AdditiveScorer {
        profile: &profile,
        favorite_recipes: &favorites,
        planned_recipe_ids: &planned,
        cap: DISCOVER_CAP,
    };
    let recommendations = scorer.score(&catalog, &signals);

    Ok(DiscoverResponse { recommendations })
}

/// Natural-language search: the planner turns the query into a filter
/// spec; the spec is then re-applied deterministically against the live
/// catalog so results are always real entries.
pub async fn smart_search(
    state: &AppState,
    user_id: Uuid,
    query: &str,
) -> Result<SearchResponse, ApiError> {
    let prompt = build_search_prompt(query);
    let raw = state
        .planner
        .invoke(&prompt, &search_filter_schema())
        .await
        .map_err(upstream)?;

    let filters: SearchFilters = serde_json::from_value(raw)
        .map_err(|e| ApiError::Upstream(format!("planner returned malformed filters: {e}")))?;

    let catalog = Recipe::list_all(&state.db).await?;
    let mut recipes = apply_search_filters(catalog, &filters);
    let total_results = recipes.len();
    recipes.truncate(MAX_SEARCH_RESULTS);

    info!(user_id = %user_id, query, total_results, "smart search");
    Ok(SearchResponse {
        recipes,
        filters,
        total_results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plans::PlanDay;
    use sqlx::types::Json;
    use time::macros::date;

    #[test]
    fn planned_ids_skip_unparseable_slots() {
        let good = Uuid::new_v4();
        let plan = MealPlan {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            week_start_date: date!(2025 - 06 - 02),
            days: Json(vec![PlanDay {
                day_name: "Monday".into(),
                date: "2025-06-02".into(),
                breakfast_recipe_id: good.to_string(),
                lunch_recipe_id: "not-a-uuid".into(),
                dinner_recipe_id: String::new(),
                snack_recipe_id: good.to_string(),
                total_calories: 1200,
            }]),
            reasoning: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };

        let ids = planned_recipe_ids(&[plan]);
        assert_eq!(ids.len(), 1);
        assert!(ids.contains(&good));
    }
}
