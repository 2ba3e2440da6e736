use std::collections::HashSet;

use uuid::Uuid;

use crate::recipes::Recipe;

/// Preference sentinel that disables dietary narrowing.
pub const NO_RESTRICTIONS: &str = "No Restrictions";

/// All criteria are optional and AND-combined. The calorie tolerance is
/// always supplied by the caller (±150 for recommendations, ±200 for
/// weekly plans), never baked in here.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria<'a> {
    pub meal_type: Option<&'a str>,
    pub exclude_ids: Option<&'a HashSet<Uuid>>,
    pub dietary_preferences: Option<&'a [String]>,
    pub disliked_ingredients: Option<&'a [String]>,
    pub calorie_window: Option<(i32, i32)>,
}

/// Case-insensitive substring containment, the canonical dietary-tag rule.
fn tag_matches(tag: &str, preference: &str) -> bool {
    tag.to_lowercase().contains(&preference.to_lowercase())
}

fn dietary_ok(recipe: &Recipe, preferences: &[String]) -> bool {
    if preferences.is_empty() || preferences.iter().any(|p| p == NO_RESTRICTIONS) {
        return true;
    }
    preferences
        .iter()
        .any(|pref| recipe.dietary_tags.iter().any(|tag| tag_matches(tag, pref)))
}

fn contains_disliked(recipe: &Recipe, disliked: &[String]) -> bool {
    disliked
        .iter()
        .filter(|d| !d.trim().is_empty())
        .any(|d| {
            let needle = d.to_lowercase();
            recipe
                .ingredients
                .iter()
                .any(|ing| ing.to_lowercase().contains(&needle))
        })
}

pub fn in_window(recipe: &Recipe, window: (i32, i32)) -> bool {
    recipe.calories >= window.0 && recipe.calories <= window.1
}

/// Narrow a recipe set. Output preserves input order; ids are unique by
/// catalog invariant, so no dedup.
pub fn filter_candidates(recipes: Vec<Recipe>, criteria: &FilterCriteria<'_>) -> Vec<Recipe> {
    recipes
        .into_iter()
        .filter(|r| {
            if let Some(meal_type) = criteria.meal_type {
                if r.meal_type != meal_type {
                    return false;
                }
            }
            if let Some(exclude) = criteria.exclude_ids {
                if exclude.contains(&r.id) {
                    return false;
                }
            }
            if let Some(preferences) = criteria.dietary_preferences {
                if !dietary_ok(r, preferences) {
                    return false;
                }
            }
            if let Some(disliked) = criteria.disliked_ingredients {
                if contains_disliked(r, disliked) {
                    return false;
                }
            }
            if let Some(window) = criteria.calorie_window {
                if !in_window(r, window) {
                    return false;
                }
            }
            true
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::test_support::{recipe, with_ingredients, with_tags};
    use super::*;

    #[test]
    fn meal_type_is_exact_match() {
        let recipes = vec![recipe("a", "breakfast", 300), recipe("b", "lunch", 500)];
        let out = filter_candidates(
            recipes,
            &FilterCriteria {
                meal_type: Some("breakfast"),
                ..Default::default()
            },
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "a");
    }

    #[test]
    fn empty_preferences_and_no_restrictions_pass_everything() {
        let recipes = vec![with_tags(recipe("a", "lunch", 500), &["keto"])];

        let none: Vec<String> = vec![];
        let out = filter_candidates(
            recipes.clone(),
            &FilterCriteria {
                dietary_preferences: Some(&none),
                ..Default::default()
            },
        );
        assert_eq!(out.len(), 1);

        let unrestricted = vec![NO_RESTRICTIONS.to_string()];
        let out = filter_candidates(
            recipes,
            &FilterCriteria {
                dietary_preferences: Some(&unrestricted),
                ..Default::default()
            },
        );
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn dietary_match_is_case_insensitive_substring() {
        let recipes = vec![
            with_tags(recipe("a", "lunch", 500), &["Vegetarian-Friendly"]),
            with_tags(recipe("b", "lunch", 500), &["keto"]),
        ];
        let prefs = vec!["vegetarian".to_string()];
        let out = filter_candidates(
            recipes,
            &FilterCriteria {
                dietary_preferences: Some(&prefs),
                ..Default::default()
            },
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "a");
    }

    #[test]
    fn disliked_ingredient_excludes_by_substring() {
        let recipes = vec![
            with_ingredients(recipe("a", "dinner", 600), &["2 cups Broccoli florets"]),
            with_ingredients(recipe("b", "dinner", 600), &["chicken breast"]),
        ];
        let disliked = vec!["broccoli".to_string()];
        let out = filter_candidates(
            recipes,
            &FilterCriteria {
                disliked_ingredients: Some(&disliked),
                ..Default::default()
            },
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "b");
    }

    #[test]
    fn blank_disliked_entries_are_ignored() {
        let recipes = vec![with_ingredients(recipe("a", "dinner", 600), &["rice"])];
        let disliked = vec!["  ".to_string()];
        let out = filter_candidates(
            recipes,
            &FilterCriteria {
                disliked_ingredients: Some(&disliked),
                ..Default::default()
            },
        );
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn calorie_window_is_inclusive() {
        let recipes = vec![
            recipe("low", "lunch", 349),
            recipe("min", "lunch", 350),
            recipe("max", "lunch", 650),
            recipe("high", "lunch", 651),
        ];
        let out = filter_candidates(
            recipes,
            &FilterCriteria {
                calorie_window: Some((350, 650)),
                ..Default::default()
            },
        );
        let names: Vec<_> = out.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["min", "max"]);
    }

    #[test]
    fn adding_a_disliked_ingredient_never_grows_the_result() {
        let recipes = vec![
            with_ingredients(recipe("a", "dinner", 600), &["tofu", "soy sauce"]),
            with_ingredients(recipe("b", "dinner", 600), &["beef", "onion"]),
            with_ingredients(recipe("c", "dinner", 600), &["onion", "garlic"]),
        ];

        let mut disliked: Vec<String> = vec![];
        let mut previous = filter_candidates(
            recipes.clone(),
            &FilterCriteria {
                disliked_ingredients: Some(&disliked),
                ..Default::default()
            },
        )
        .len();

        for next in ["onion", "tofu", "garlic"] {
            disliked.push(next.to_string());
            let current = filter_candidates(
                recipes.clone(),
                &FilterCriteria {
                    disliked_ingredients: Some(&disliked),
                    ..Default::default()
                },
            )
            .len();
            assert!(current <= previous);
            previous = current;
        }
    }

    #[test]
    fn output_preserves_input_order() {
        let recipes = vec![
            recipe("first", "lunch", 400),
            recipe("second", "lunch", 500),
            recipe("third", "lunch", 600),
        ];
        let out = filter_candidates(recipes, &FilterCriteria::default());
        let names: Vec<_> = out.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }
}
