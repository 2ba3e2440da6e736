use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::macros::format_description;
use time::{Date, Duration};
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiError;
use crate::plans::PlanDay;
use crate::recipes::Recipe;

pub const MAX_SEARCH_RESULTS: usize = 20;

#[derive(Debug, Deserialize)]
struct PlanDraft {
    days: Vec<DraftDay>,
    #[serde(default)]
    reasoning: String,
}

#[derive(Debug, Deserialize)]
struct DraftDay {
    #[serde(default)]
    day_name: String,
    breakfast_recipe_id: String,
    lunch_recipe_id: String,
    dinner_recipe_id: String,
    snack_recipe_id: String,
}

fn day_name(weekday: time::Weekday) -> &'static str {
    match weekday {
        time::Weekday::Monday => "Monday",
        time::Weekday::Tuesday => "Tuesday",
        time::Weekday::Wednesday => "Wednesday",
        time::Weekday::Thursday => "Thursday",
        time::Weekday::Friday => "Friday",
        time::Weekday::Saturday => "Saturday",
        time::Weekday::Sunday => "Sunday",
    }
}

/// Monday of the week containing `date`.
pub fn week_start_of(date: Date) -> Date {
    date - Duration::days(i64::from(date.weekday().number_days_from_monday()))
}

fn format_date(date: Date) -> String {
    let fmt = format_description!("[year]-[month]-[day]");
    date.format(&fmt).unwrap_or_else(|_| date.to_string())
}

/// Calories a planner-chosen id contributes: the catalog value when the id
/// resolves, 0 otherwise. Unknown ids are a tolerated degraded case, not a
/// silently-correct one.
fn slot_calories(raw_id: &str, catalog: &HashMap<Uuid, &Recipe>) -> i32 {
    let resolved = Uuid::parse_str(raw_id)
        .ok()
        .and_then(|id| catalog.get(&id).copied());
    match resolved {
        Some(recipe) => recipe.calories,
        None => {
            warn!(recipe_id = raw_id, "planner returned unknown recipe id; slot counts 0 kcal");
            0
        }
    }
}

/// Validate and enrich the planner's raw JSON into consumer-ready days.
/// Day dates and names are derived from `week_start`; per-day totals are
/// always recomputed from the catalog, never taken from upstream.
pub fn resolve_plan(
    raw: &Value,
    catalog: &[Recipe],
    week_start: Date,
) -> Result<(Vec<PlanDay>, String), ApiError> {
    let draft: PlanDraft = serde_json::from_value(raw.clone())
        .map_err(|e| ApiError::Upstream(format!("planner returned malformed plan: {e}")))?;

    if draft.days.len() != 7 {
        return Err(ApiError::Upstream(format!(
            "planner returned {} days, expected 7",
            draft.days.len()
        )));
    }

    let by_id: HashMap<Uuid, &Recipe> = catalog.iter().map(|r| (r.id, r)).collect();

    let days = draft
        .days
        .into_iter()
        .enumerate()
        .map(|(i, day)| {
            let date = week_start + Duration::days(i as i64);
            let total_calories = slot_calories(&day.breakfast_recipe_id, &by_id)
                + slot_calories(&day.lunch_recipe_id, &by_id)
                + slot_calories(&day.dinner_recipe_id, &by_id)
                + slot_calories(&day.snack_recipe_id, &by_id);
            PlanDay {
                day_name: day_name(date.weekday()).to_string(),
                date: format_date(date),
                breakfast_recipe_id: day.breakfast_recipe_id,
                lunch_recipe_id: day.lunch_recipe_id,
                dinner_recipe_id: day.dinner_recipe_id,
                snack_recipe_id: day.snack_recipe_id,
                total_calories,
            }
        })
        .collect();

    Ok((days, draft.reasoning))
}

#[derive(Debug, Deserialize)]
struct RankedDraft {
    #[serde(default)]
    recommendations: Vec<String>,
    #[serde(default)]
    reasoning: String,
}

/// Keep only ids that name actual candidates, preserving the planner's
/// ranking, capped at `cap`.
pub fn resolve_ranked_ids(
    raw: &Value,
    candidates: &[Recipe],
    cap: usize,
) -> Result<(Vec<Recipe>, String), ApiError> {
    let draft: RankedDraft = serde_json::from_value(raw.clone())
        .map_err(|e| ApiError::Upstream(format!("planner returned malformed ranking: {e}")))?;

    let by_id: HashMap<Uuid, &Recipe> = candidates.iter().map(|r| (r.id, r)).collect();

    let mut seen = std::collections::HashSet::new();
    let recipes = draft
        .recommendations
        .iter()
        .filter_map(|raw_id| {
            let id = match Uuid::parse_str(raw_id) {
                Ok(id) => id,
                Err(_) => {
                    warn!(recipe_id = %raw_id, "planner returned unparseable recipe id; dropped");
                    return None;
                }
            };
            if !seen.insert(id) {
                return None;
            }
            match by_id.get(&id) {
                Some(recipe) => Some((*recipe).clone()),
                None => {
                    warn!(recipe_id = %raw_id, "planner ranked a non-candidate recipe; dropped");
                    None
                }
            }
        })
        .take(cap)
        .collect();

    Ok((recipes, draft.reasoning))
}

/// The filter specification the search model produces. Applied against the
/// live catalog as a deterministic second pass, so results are always real
/// catalog entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default)]
    pub search_terms: Vec<String>,
    pub meal_type: Option<String>,
    pub cuisine_type: Option<String>,
    #[serde(default)]
    pub dietary_tags: Vec<String>,
    #[serde(default)]
    pub include_ingredients: Vec<String>,
    #[serde(default)]
    pub exclude_ingredients: Vec<String>,
    pub max_prep_time: Option<i32>,
    pub max_calories: Option<i32>,
    pub sort_by: Option<String>,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches_term(recipe: &Recipe, term: &str) -> bool {
    contains_ci(&recipe.name, term)
        || recipe
            .cuisine_type
            .as_deref()
            .is_some_and(|c| contains_ci(c, term))
        || recipe.ingredients.iter().any(|i| contains_ci(i, term))
        || recipe.dietary_tags.iter().any(|t| contains_ci(t, term))
}

fn passes(recipe: &Recipe, filters: &SearchFilters) -> bool {
    if !filters.search_terms.is_empty()
        && !filters.search_terms.iter().any(|t| matches_term(recipe, t))
    {
        return false;
    }
    if let Some(meal_type) = filters.meal_type.as_deref() {
        if recipe.meal_type != meal_type {
            return false;
        }
    }
    if let Some(cuisine) = filters.cuisine_type.as_deref() {
        let matched = recipe
            .cuisine_type
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(cuisine));
        if !matched {
            return false;
        }
    }
    if !filters.dietary_tags.iter().all(|wanted| {
        recipe
            .dietary_tags
            .iter()
            .any(|tag| contains_ci(tag, wanted))
    }) {
        return false;
    }
    if !filters.include_ingredients.iter().all(|wanted| {
        recipe
            .ingredients
            .iter()
            .any(|ing| contains_ci(ing, wanted))
    }) {
        return false;
    }
    if filters.exclude_ingredients.iter().any(|banned| {
        recipe
            .ingredients
            .iter()
            .any(|ing| contains_ci(ing, banned))
    }) {
        return false;
    }
    if let Some(max_prep) = filters.max_prep_time {
        if recipe.prep_time_mins > max_prep {
            return false;
        }
    }
    if let Some(max_calories) = filters.max_calories {
        if recipe.calories > max_calories {
            return false;
        }
    }
    true
}

/// Deterministic second-pass filter and sort. `relevance` (or no sort key)
/// keeps filter order.
pub fn apply_search_filters(catalog: Vec<Recipe>, filters: &SearchFilters) -> Vec<Recipe> {
    let mut matched: Vec<Recipe> = catalog.into_iter().filter(|r| passes(r, filters)).collect();

    match filters.sort_by.as_deref() {
        Some("calories") => matched.sort_by_key(|r| r.calories),
        Some("protein") => matched.sort_by(|a, b| b.protein_g.total_cmp(&a.protein_g)),
        Some("prep_time") => matched.sort_by_key(|r| r.prep_time_mins),
        _ => {}
    }

    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::filter::test_support::{recipe, with_ingredients, with_tags};
    use serde_json::json;
    use time::macros::date;

    fn seven_day_response(ids: [&str; 4]) -> Value {
        let days: Vec<Value> = (0..7)
            .map(|_| {
                json!({
                    "day_name": "whatever",
                    "breakfast_recipe_id": ids[0],
                    "lunch_recipe_id": ids[1],
                    "dinner_recipe_id": ids[2],
                    "snack_recipe_id": ids[3],
                })
            })
            .collect();
        json!({ "days": days, "reasoning": "balanced week" })
    }

    #[test]
    fn recomputes_totals_from_catalog() {
        let b = recipe("b", "breakfast", 350);
        let l = recipe("l", "lunch", 700);
        let d = recipe("d", "dinner", 600);
        let s = recipe("s", "snack", 200);
        let catalog = vec![b.clone(), l.clone(), d.clone(), s.clone()];

        let raw = seven_day_response([
            &b.id.to_string(),
            &l.id.to_string(),
            &d.id.to_string(),
            &s.id.to_string(),
        ]);
        let (days, reasoning) =
            resolve_plan(&raw, &catalog, date!(2025 - 06 - 02)).expect("resolve");

        assert_eq!(days.len(), 7);
        assert_eq!(reasoning, "balanced week");
        for day in &days {
            assert_eq!(day.total_calories, 350 + 700 + 600 + 200);
        }
        assert_eq!(days[0].day_name, "Monday");
        assert_eq!(days[0].date, "2025-06-02");
        assert_eq!(days[6].day_name, "Sunday");
        assert_eq!(days[6].date, "2025-06-08");
    }

    #[test]
    fn unknown_id_contributes_zero_without_failing() {
        let b = recipe("b", "breakfast", 350);
        let catalog = vec![b.clone()];

        let ghost = Uuid::new_v4().to_string();
        let raw = seven_day_response([&b.id.to_string(), &ghost, &ghost, "not-even-a-uuid"]);
        let (days, _) = resolve_plan(&raw, &catalog, date!(2025 - 06 - 02)).expect("resolve");

        assert_eq!(days[0].total_calories, 350);
        // The slot still carries what the planner said.
        assert_eq!(days[0].lunch_recipe_id, ghost);
    }

    #[test]
    fn wrong_day_count_is_an_upstream_error() {
        let raw = json!({ "days": [], "reasoning": "" });
        let err = resolve_plan(&raw, &[], date!(2025 - 06 - 02)).unwrap_err();
        assert!(err.to_string().contains("expected 7"));
    }

    #[test]
    fn ranked_ids_drop_non_candidates_and_dedup() {
        let a = recipe("a", "lunch", 500);
        let b = recipe("b", "lunch", 520);
        let candidates = vec![a.clone(), b.clone()];

        let raw = json!({
            "recommendations": [
                a.id.to_string(),
                Uuid::new_v4().to_string(),
                "garbage",
                a.id.to_string(),
                b.id.to_string(),
            ],
            "reasoning": "ok"
        });
        let (recipes, reasoning) = resolve_ranked_ids(&raw, &candidates, 5).expect("resolve");
        let names: Vec<_> = recipes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(reasoning, "ok");
    }

    #[test]
    fn ranked_ids_respect_cap() {
        let candidates: Vec<Recipe> =
            (0..6).map(|i| recipe(&format!("r{i}"), "lunch", 500)).collect();
        let raw = json!({
            "recommendations": candidates.iter().map(|r| r.id.to_string()).collect::<Vec<_>>(),
            "reasoning": ""
        });
        let (recipes, _) = resolve_ranked_ids(&raw, &candidates, 5).expect("resolve");
        assert_eq!(recipes.len(), 5);
    }

    #[test]
    fn search_filters_are_reapplied_against_catalog() {
        let keep = with_ingredients(
            with_tags(recipe("Tofu Bowl", "lunch", 450), &["vegan"]),
            &["tofu", "rice"],
        );
        let wrong_meal = with_tags(recipe("Tofu Scramble", "breakfast", 300), &["vegan"]);
        let has_banned = with_ingredients(
            with_tags(recipe("Peanut Tofu", "lunch", 500), &["vegan"]),
            &["tofu", "peanuts"],
        );

        let filters = SearchFilters {
            search_terms: vec!["tofu".into()],
            meal_type: Some("lunch".into()),
            dietary_tags: vec!["vegan".into()],
            exclude_ingredients: vec!["peanut".into()],
            ..Default::default()
        };
        let out = apply_search_filters(vec![keep, wrong_meal, has_banned], &filters);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Tofu Bowl");
    }

    #[test]
    fn search_sorting_modes() {
        let mut a = recipe("a", "lunch", 600);
        a.protein_g = 20.0;
        a.prep_time_mins = 30;
        let mut b = recipe("b", "lunch", 400);
        b.protein_g = 35.0;
        b.prep_time_mins = 10;

        let by_calories = apply_search_filters(
            vec![a.clone(), b.clone()],
            &SearchFilters {
                sort_by: Some("calories".into()),
                ..Default::default()
            },
        );
        assert_eq!(by_calories[0].name, "b");

        let by_protein = apply_search_filters(
            vec![a.clone(), b.clone()],
            &SearchFilters {
                sort_by: Some("protein".into()),
                ..Default::default()
            },
        );
        assert_eq!(by_protein[0].name, "b");

        let by_prep = apply_search_filters(
            vec![a.clone(), b.clone()],
            &SearchFilters {
                sort_by: Some("prep_time".into()),
                ..Default::default()
            },
        );
        assert_eq!(by_prep[0].name, "b");

        let relevance = apply_search_filters(
            vec![a.clone(), b.clone()],
            &SearchFilters {
                sort_by: Some("relevance".into()),
                ..Default::default()
            },
        );
        assert_eq!(relevance[0].name, "a");
    }

    #[test]
    fn search_is_deterministic_for_fixed_inputs() {
        let catalog: Vec<Recipe> = (0..30)
            .map(|i| {
                let mut r = recipe(&format!("recipe {i}"), "lunch", 300 + i * 10);
                r.protein_g = (i % 7) as f32;
                r
            })
            .collect();
        let filters = SearchFilters {
            sort_by: Some("protein".into()),
            ..Default::default()
        };

        let first = apply_search_filters(catalog.clone(), &filters);
        let second = apply_search_filters(catalog, &filters);
        let first_ids: Vec<_> = first.iter().map(|r| r.id).collect();
        let second_ids: Vec<_> = second.iter().map(|r| r.id).collect();
        assert_eq!(first_ids, second_ids);
    }

    #[test]
    fn week_start_is_monday() {
        assert_eq!(week_start_of(date!(2025 - 06 - 04)), date!(2025 - 06 - 02));
        assert_eq!(week_start_of(date!(2025 - 06 - 02)), date!(2025 - 06 - 02));
        assert_eq!(week_start_of(date!(2025 - 06 - 08)), date!(2025 - 06 - 02));
    }
}
