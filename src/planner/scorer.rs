use std::collections::HashSet;

use uuid::Uuid;

use crate::planner::filter::{in_window, NO_RESTRICTIONS};
use crate::planner::signals::UserSignals;
use crate::profile::UserProfile;
use crate::recipes::Recipe;

/// Recommendation lists never shrink below this when the pool allows.
pub const MIN_RECOMMENDATIONS: usize = 3;

/// Within this many kcal of a quarter of the daily target counts as a
/// portion-sized match for the additive strategy.
pub const PORTION_TOLERANCE_KCAL: i32 = 150;

/// Orders candidates for a recommendation surface. Two deliberately
/// distinct strategies exist for what looks like the same task: the
/// meal-swap flow uses strict bucket precedence, the Discover flow uses
/// additive scoring. They produce observably different orderings and must
/// not be merged.
pub trait Scorer {
    fn score(&self, candidates: &[Recipe], signals: &UserSignals) -> Vec<Recipe>;
}

/// Strict tier precedence: the first non-empty tier is the whole result.
/// Tiers: favorites in the calorie window, high-rated in the window,
/// anything in the window, then the full suitable pool. The result is then
/// padded from the pool (catalog order) up to `min_results`.
#[derive(Debug, Clone)]
pub struct BucketScorer {
    pub calorie_window: (i32, i32),
    pub min_results: usize,
}

impl BucketScorer {
    pub fn new(calorie_window: (i32, i32)) -> Self {
        Self {
            calorie_window,
            min_results: MIN_RECOMMENDATIONS,
        }
    }
}

impl Scorer for BucketScorer {
    fn score(&self, candidates: &[Recipe], signals: &UserSignals) -> Vec<Recipe> {
        let window = self.calorie_window;

        let tier = |keep: &dyn Fn(&Recipe) -> bool| -> Vec<Recipe> {
            candidates.iter().filter(|r| keep(r)).cloned().collect()
        };

        let favorites_in_window = tier(&|r| {
            signals.favorite_recipe_ids.contains(&r.id) && in_window(r, window)
        });
        let mut ordered = if !favorites_in_window.is_empty() {
            favorites_in_window
        } else {
            let high_rated_in_window = tier(&|r| {
                signals.high_rated_recipe_ids.contains(&r.id) && in_window(r, window)
            });
            if !high_rated_in_window.is_empty() {
                high_rated_in_window
            } else {
                let anything_in_window = tier(&|r| in_window(r, window));
                if !anything_in_window.is_empty() {
                    anything_in_window
                } else {
                    candidates.to_vec()
                }
            }
        };

        // Pad from the suitable pool so the user is never left with too few
        // options. A no-op when the pool itself is exhausted.
        if ordered.len() < self.min_results {
            let seen: HashSet<Uuid> = ordered.iter().map(|r| r.id).collect();
            for recipe in candidates {
                if ordered.len() >= self.min_results {
                    break;
                }
                if !seen.contains(&recipe.id) {
                    ordered.push(recipe.clone());
                }
            }
        }

        ordered
    }
}

/// Additive point scoring for the Discover surface. Candidates keep their
/// input order on ties (stable sort), scores <= 0 are dropped, and the
/// result is capped.
#[derive(Debug)]
pub struct AdditiveScorer<'a> {
    pub profile: &'a UserProfile,
    /// Resolved catalog records of the user's favorites, for similarity.
    pub favorite_recipes: &'a [Recipe],
    /// Recipes appearing in any of the user's saved meal plans.
    pub planned_recipe_ids: &'a HashSet<Uuid>,
    pub cap: usize,
}

impl AdditiveScorer<'_> {
    fn score_one(&self, recipe: &Recipe, signals: &UserSignals) -> i32 {
        let mut score = 0;

        let prefs = &self.profile.dietary_preferences;
        let preference_match = !prefs.is_empty()
            && prefs.iter().any(|pref| {
                pref != NO_RESTRICTIONS
                    && recipe
                        .dietary_tags
                        .iter()
                        .any(|tag| tag.to_lowercase().contains(&pref.to_lowercase()))
            });
        if preference_match {
            score += 3;
        }

        let already_favorite = signals.favorite_recipe_ids.contains(&recipe.id);
        if !already_favorite {
            let similar = self.favorite_recipes.iter().any(|fav| {
                fav.meal_type == recipe.meal_type
                    || fav
                        .dietary_tags
                        .iter()
                        .any(|tag| recipe.dietary_tags.contains(tag))
            });
            if similar {
                score += 2;
            }
        }

        if self.planned_recipe_ids.contains(&recipe.id) {
            score += 1;
        }

        if signals.high_rated_recipe_ids.contains(&recipe.id) {
            score += 2;
        }

        let disliked = self
            .profile
            .disliked_ingredients
            .iter()
            .filter(|d| !d.trim().is_empty())
            .any(|d| {
                let needle = d.to_lowercase();
                recipe
                    .ingredients
                    .iter()
                    .any(|ing| ing.to_lowercase().contains(&needle))
            });
        if disliked {
            score -= 10;
        }

        let portion_target = self.profile.daily_calorie_target / 4;
        if (recipe.calories - portion_target).abs() <= PORTION_TOLERANCE_KCAL {
            score += 1;
        }

        score
    }
}

impl Scorer for AdditiveScorer<'_> {
    fn score(&self, candidates: &[Recipe], signals: &UserSignals) -> Vec<Recipe> {
        let mut scored: Vec<(i32, &Recipe)> = candidates
            .iter()
            .map(|r| (self.score_one(r, signals), r))
            .filter(|(score, _)| *score > 0)
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0));

        scored
            .into_iter()
            .take(self.cap)
            .map(|(_, r)| r.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::filter::test_support::{recipe, with_ingredients, with_tags};
    use time::OffsetDateTime;

    fn signals_with(
        favorites: &[Uuid],
        high_rated: &[Uuid],
        cooked: &[Uuid],
    ) -> UserSignals {
        UserSignals {
            favorite_recipe_ids: favorites.iter().copied().collect(),
            high_rated_recipe_ids: high_rated.iter().copied().collect(),
            cooked_recipe_ids: cooked.iter().copied().collect(),
        }
    }

    fn profile(target: i32, prefs: &[&str], disliked: &[&str]) -> UserProfile {
        UserProfile {
            user_id: Uuid::new_v4(),
            dietary_preferences: prefs.iter().map(|s| s.to_string()).collect(),
            disliked_ingredients: disliked.iter().map(|s| s.to_string()).collect(),
            health_goal: Some("maintain".into()),
            daily_calorie_target: target,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn favorite_bucket_is_the_entire_result_when_non_empty() {
        let fav = recipe("fav", "lunch", 500);
        let rated = recipe("rated", "lunch", 520);
        let plain = recipe("plain", "lunch", 510);
        let signals = signals_with(&[fav.id], &[rated.id], &[]);

        let scorer = BucketScorer {
            calorie_window: (400, 600),
            min_results: 1,
        };
        let out = scorer.score(&[fav.clone(), rated, plain], &signals);

        assert!(out.iter().all(|r| signals.favorite_recipe_ids.contains(&r.id)));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "fav");
    }

    #[test]
    fn falls_through_to_high_rated_then_window_then_pool() {
        let fav_outside = recipe("fav-outside", "breakfast", 300);
        let rated_in = recipe("rated-in", "breakfast", 450);
        let plain_in = recipe("plain-in", "breakfast", 500);
        let signals = signals_with(&[fav_outside.id], &[rated_in.id], &[]);

        let scorer = BucketScorer {
            calorie_window: (350, 650),
            min_results: 1,
        };

        // Favorite is out of window, so the high-rated tier wins.
        let out = scorer.score(
            &[fav_outside.clone(), rated_in.clone(), plain_in.clone()],
            &signals,
        );
        assert_eq!(out[0].name, "rated-in");

        // No favorites or ratings at all: window tier.
        let none = signals_with(&[], &[], &[]);
        let out = scorer.score(&[fav_outside.clone(), plain_in.clone()], &none);
        assert_eq!(out[0].name, "plain-in");

        // Nothing in window: whole pool.
        let scorer = BucketScorer {
            calorie_window: (1000, 1100),
            min_results: 1,
        };
        let out = scorer.score(&[fav_outside, plain_in], &none);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn window_arithmetic_matches_the_inclusive_tolerance() {
        // Breakfast target 500, window 350..=650: A(300) is outside even
        // though favorited, B(320) is outside, C(900) is outside.
        let a = recipe("A", "breakfast", 300);
        let b = recipe("B", "breakfast", 320);
        let c = recipe("C", "breakfast", 900);
        let signals = signals_with(&[a.id], &[b.id], &[]);

        let scorer = BucketScorer {
            calorie_window: (500 - 150, 500 + 150),
            min_results: 3,
        };
        let out = scorer.score(&[a.clone(), b.clone(), c.clone()], &signals);

        // Buckets 1-3 are all empty, so the result is the suitable pool.
        assert_eq!(out.len(), 3);
        let names: Vec<_> = out.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn pads_to_three_from_the_pool_in_catalog_order() {
        let fav = recipe("fav", "dinner", 600);
        let extra1 = recipe("extra1", "dinner", 900);
        let extra2 = recipe("extra2", "dinner", 950);
        let extra3 = recipe("extra3", "dinner", 1000);
        let signals = signals_with(&[fav.id], &[], &[]);

        let scorer = BucketScorer::new((500, 700));
        let out = scorer.score(
            &[fav.clone(), extra1.clone(), extra2.clone(), extra3],
            &signals,
        );

        let names: Vec<_> = out.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["fav", "extra1", "extra2"]);
    }

    #[test]
    fn empty_pool_yields_empty_result_without_panicking() {
        let signals = signals_with(&[], &[], &[]);
        let scorer = BucketScorer::new((400, 600));
        let out = scorer.score(&[], &signals);
        assert!(out.is_empty());
    }

    #[test]
    fn additive_orders_by_score_and_drops_non_positive() {
        let prof = profile(2000, &["vegan"], &["cilantro"]);
        let planned = HashSet::new();

        // +3 tag match, +1 portion fit (500 within 150 of 2000/4)
        let strong = with_tags(recipe("strong", "lunch", 500), &["vegan"]);
        // +1 portion fit only
        let weak = recipe("weak", "lunch", 480);
        // -10 disliked, +3 tag: net negative, dropped
        let disliked = with_ingredients(
            with_tags(recipe("disliked", "lunch", 500), &["vegan"]),
            &["fresh cilantro"],
        );
        // no points at all, dropped
        let zero = recipe("zero", "lunch", 1200);

        let signals = signals_with(&[], &[], &[]);
        let scorer = AdditiveScorer {
            profile: &prof,
            favorite_recipes: &[],
            planned_recipe_ids: &planned,
            cap: 8,
        };
        let out = scorer.score(
            &[weak.clone(), strong.clone(), disliked, zero],
            &signals,
        );

        let names: Vec<_> = out.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["strong", "weak"]);
    }

    #[test]
    fn additive_similarity_skips_already_favorited() {
        let prof = profile(2000, &[], &[]);
        let planned = HashSet::new();

        let fav = with_tags(recipe("fav", "dinner", 1200), &["keto"]);
        // Same meal type as the favorite: similar, +2.
        let similar = recipe("similar", "dinner", 1200);

        let signals = signals_with(&[fav.id], &[], &[]);
        let scorer = AdditiveScorer {
            profile: &prof,
            favorite_recipes: std::slice::from_ref(&fav),
            planned_recipe_ids: &planned,
            cap: 8,
        };

        let out = scorer.score(&[fav.clone(), similar.clone()], &signals);
        // The favorite itself gets no similarity points and scores zero here;
        // only the similar non-favorite survives.
        let names: Vec<_> = out.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["similar"]);
    }

    #[test]
    fn additive_caps_the_result() {
        let prof = profile(2000, &["vegan"], &[]);
        let planned = HashSet::new();
        let signals = signals_with(&[], &[], &[]);

        let candidates: Vec<Recipe> = (0..10)
            .map(|i| with_tags(recipe(&format!("r{i}"), "lunch", 500), &["vegan"]))
            .collect();

        let scorer = AdditiveScorer {
            profile: &prof,
            favorite_recipes: &[],
            planned_recipe_ids: &planned,
            cap: 4,
        };
        let out = scorer.score(&candidates, &signals);
        assert_eq!(out.len(), 4);
        // Equal scores keep input order.
        assert_eq!(out[0].name, "r0");
        assert_eq!(out[3].name, "r3");
    }
}
