use chrono::{Duration, NaiveDate};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::ConsumptionStore,
    error::AppResult,
    models::{Candidate, ConsumedMeal, MealCategory},
    services::random::RandomSource,
};

/// Days of history, counted back from today, that feed the variety score
pub const VARIETY_WINDOW_DAYS: i64 = 7;

const BASE_CHANCE: f64 = 0.3;
const VARIETY_STEP: f64 = 0.1;
const MAX_VARIETY_BONUS: f64 = 0.5;
const NOVELTY_BONUS: f64 = 0.2;
const MAX_CHANCE: f64 = 0.9;

/// Distinct cuisines and meal categories in a user's recent history
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecentVariety {
    pub cuisines: HashSet<String>,
    pub meal_categories: HashSet<MealCategory>,
}

impl RecentVariety {
    pub fn from_history(history: &[ConsumedMeal]) -> Self {
        Self {
            cuisines: history.iter().map(|m| m.cuisine.clone()).collect(),
            meal_categories: history.iter().map(|m| m.meal_category).collect(),
        }
    }

    pub fn score(&self) -> usize {
        self.cuisines.len() + self.meal_categories.len()
    }

    /// Probability that a candidate of `cuisine` likes the user back.
    ///
    /// Always within `[0.3, 0.9]`.
    pub fn like_back_chance(&self, cuisine: &str) -> f64 {
        let mut variety_bonus = (self.score() as f64 * VARIETY_STEP).min(MAX_VARIETY_BONUS);
        if !self.cuisines.contains(cuisine) {
            variety_bonus += NOVELTY_BONUS;
        }
        (BASE_CHANCE + variety_bonus).min(MAX_CHANCE)
    }
}

/// Decides whether a liked candidate likes the user back
#[derive(Clone)]
pub struct ReciprocityEngine {
    consumption: Arc<dyn ConsumptionStore>,
    rng: Arc<dyn RandomSource>,
}

impl ReciprocityEngine {
    pub fn new(consumption: Arc<dyn ConsumptionStore>, rng: Arc<dyn RandomSource>) -> Self {
        Self { consumption, rng }
    }

    /// Variety over `[today - 7 days, today]`
    pub async fn recent_variety(&self, user_id: Uuid, today: NaiveDate) -> AppResult<RecentVariety> {
        let window_start = today - Duration::days(VARIETY_WINDOW_DAYS);
        let history = self
            .consumption
            .history_between(user_id, window_start, today)
            .await?;
        Ok(RecentVariety::from_history(&history))
    }

    /// One probabilistic draw against the candidate's like-back chance
    pub async fn evaluate(
        &self,
        user_id: Uuid,
        candidate: &Candidate,
        today: NaiveDate,
    ) -> AppResult<bool> {
        let variety = self.recent_variety(user_id, today).await?;
        let chance = variety.like_back_chance(&candidate.cuisine);
        let draw = self.rng.unit();
        let liked_back = draw < chance;

        tracing::debug!(
            user_id = %user_id,
            candidate_id = %candidate.id,
            variety_score = variety.score(),
            chance,
            draw,
            liked_back,
            "Evaluated reciprocity"
        );

        Ok(liked_back)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{CandidateStore, MemoryStore},
        models::{DietTag, NewCandidate, NewConsumptionLogEntry},
    };

    struct FixedDraw(f64);

    impl RandomSource for FixedDraw {
        fn pick(&self, _len: usize) -> usize {
            0
        }

        fn between(&self, low: u32, _high: u32) -> u32 {
            low
        }

        fn unit(&self) -> f64 {
            self.0
        }
    }

    fn meal(cuisine: &str, meal_category: MealCategory) -> ConsumedMeal {
        ConsumedMeal {
            candidate_id: Uuid::new_v4(),
            date_consumed: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            cuisine: cuisine.to_string(),
            meal_category,
        }
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_empty_history_gives_half_chance() {
        let variety = RecentVariety::default();
        assert_eq!(variety.score(), 0);
        assert_close(variety.like_back_chance("Italian"), 0.5);
    }

    #[test]
    fn test_repeat_cuisine_gets_no_novelty_bonus() {
        let variety = RecentVariety::from_history(&[meal("Italian", MealCategory::Dinner)]);
        // score 2 → bonus 0.2, no novelty
        assert_close(variety.like_back_chance("Italian"), 0.5);
        // novel cuisine adds 0.2
        assert_close(variety.like_back_chance("Thai"), 0.7);
    }

    #[test]
    fn test_three_cuisines_two_meal_types_novel_candidate_caps_at_ninety() {
        let variety = RecentVariety::from_history(&[
            meal("Italian", MealCategory::Lunch),
            meal("Mexican", MealCategory::Dinner),
            meal("Asian", MealCategory::Lunch),
        ]);
        assert_eq!(variety.score(), 5);
        assert_close(variety.like_back_chance("Greek"), 0.9);
    }

    #[test]
    fn test_chance_bounds_for_any_history() {
        let cuisines = ["A", "B", "C", "D", "E", "F", "G", "H"];
        let categories = [
            MealCategory::Breakfast,
            MealCategory::Lunch,
            MealCategory::Dinner,
            MealCategory::Snack,
            MealCategory::Dessert,
        ];

        for n in 0..=cuisines.len() {
            let history: Vec<ConsumedMeal> = cuisines[..n]
                .iter()
                .enumerate()
                .map(|(i, c)| meal(c, categories[i % categories.len()]))
                .collect();
            let variety = RecentVariety::from_history(&history);

            for cuisine in ["A", "Z"] {
                let chance = variety.like_back_chance(cuisine);
                assert!((0.3..=0.9).contains(&chance), "chance {chance} out of bounds");
            }
        }
    }

    async fn engine_with_history(
        draw: f64,
        today: NaiveDate,
        days_ago: &[i64],
    ) -> (ReciprocityEngine, Uuid, Candidate) {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();

        let eaten = store
            .insert(NewCandidate {
                name: "Carbonara".to_string(),
                description: "Creamy".to_string(),
                calories: 700,
                meal_category: MealCategory::Dinner,
                cuisine: "Italian".to_string(),
                diet: DietTag::Omnivore,
                ingredients: vec!["pasta".to_string()],
                image_url: None,
                generated_prompt: String::new(),
                generation_successful: true,
            })
            .await
            .unwrap();

        for offset in days_ago {
            store
                .log_meal(NewConsumptionLogEntry {
                    user_id: user,
                    candidate_id: eaten.id,
                    date_consumed: today - Duration::days(*offset),
                    meal_category: MealCategory::Dinner,
                })
                .await
                .unwrap();
        }

        let engine = ReciprocityEngine::new(store, Arc::new(FixedDraw(draw)));
        (engine, user, eaten)
    }

    #[tokio::test]
    async fn test_recent_variety_window_is_seven_days_inclusive() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

        let (engine, user, _) = engine_with_history(0.0, today, &[7]).await;
        assert_eq!(engine.recent_variety(user, today).await.unwrap().score(), 2);

        let (engine, user, _) = engine_with_history(0.0, today, &[8]).await;
        assert_eq!(engine.recent_variety(user, today).await.unwrap().score(), 0);
    }

    #[tokio::test]
    async fn test_recent_variety_ignores_future_meal_plan_entries() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

        let (engine, user, _) = engine_with_history(0.0, today, &[0]).await;
        assert_eq!(engine.recent_variety(user, today).await.unwrap().score(), 2);

        let (engine, user, _) = engine_with_history(0.0, today, &[-1, -3]).await;
        assert_eq!(engine.recent_variety(user, today).await.unwrap().score(), 0);
    }

    #[tokio::test]
    async fn test_evaluate_compares_draw_strictly_against_chance() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

        // Italian eaten yesterday: score 2, no novelty → chance 0.5
        let (engine, user, italian) = engine_with_history(0.49, today, &[1]).await;
        assert!(engine.evaluate(user, &italian, today).await.unwrap());

        let (engine, user, italian) = engine_with_history(0.5, today, &[1]).await;
        assert!(!engine.evaluate(user, &italian, today).await.unwrap());
    }

    #[tokio::test]
    async fn test_evaluate_never_likes_back_above_ceiling() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let (engine, user, italian) = engine_with_history(0.95, today, &[]).await;
        assert!(!engine.evaluate(user, &italian, today).await.unwrap());
    }
}
