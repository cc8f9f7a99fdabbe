use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CandidateStore, ConsumptionStore, InteractionStore, ProfileStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        Candidate, ConsumedMeal, ConsumptionLogEntry, DietTag, DietaryProfile, Interaction,
        NewCandidate, NewConsumptionLogEntry,
    },
};

/// In-process store used for local runs without Postgres and for tests
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Insertion order doubles as the catalog order
    candidates: Vec<Candidate>,
    interactions: HashMap<Uuid, Interaction>,
    /// (user, candidate) → interaction id
    interaction_keys: HashMap<(Uuid, Uuid), Uuid>,
    consumption: Vec<ConsumptionLogEntry>,
    profiles: HashMap<Uuid, DietaryProfile>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CandidateStore for MemoryStore {
    async fn find_unseen(
        &self,
        diet: DietTag,
        exclude: &HashSet<Uuid>,
    ) -> AppResult<Vec<Candidate>> {
        let inner = self.inner.read().await;
        Ok(inner
            .candidates
            .iter()
            .filter(|c| c.diet == diet && !exclude.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn insert(&self, candidate: NewCandidate) -> AppResult<Candidate> {
        let candidate = candidate.into_candidate();
        let mut inner = self.inner.write().await;
        inner.candidates.push(candidate.clone());
        Ok(candidate)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Candidate>> {
        let inner = self.inner.read().await;
        Ok(inner.candidates.iter().find(|c| c.id == id).cloned())
    }
}

#[async_trait]
impl InteractionStore for MemoryStore {
    async fn seen_candidate_ids(&self, user_id: Uuid) -> AppResult<HashSet<Uuid>> {
        let inner = self.inner.read().await;
        Ok(inner
            .interaction_keys
            .keys()
            .filter(|(user, _)| *user == user_id)
            .map(|(_, candidate)| *candidate)
            .collect())
    }

    async fn upsert_decision(
        &self,
        user_id: Uuid,
        candidate_id: Uuid,
        liked: bool,
    ) -> AppResult<Interaction> {
        let mut inner = self.inner.write().await;

        if let Some(id) = inner.interaction_keys.get(&(user_id, candidate_id)).copied() {
            let existing = inner
                .interactions
                .get_mut(&id)
                .ok_or_else(|| AppError::Internal(format!("Dangling interaction key {}", id)))?;
            existing.user_liked = liked;
            return Ok(existing.clone());
        }

        let interaction = Interaction::new(user_id, candidate_id, liked);
        inner
            .interaction_keys
            .insert((user_id, candidate_id), interaction.id);
        inner.interactions.insert(interaction.id, interaction.clone());
        Ok(interaction)
    }

    async fn set_candidate_decision(
        &self,
        interaction_id: Uuid,
        liked_back: bool,
    ) -> AppResult<Interaction> {
        let mut inner = self.inner.write().await;
        let interaction = inner
            .interactions
            .get_mut(&interaction_id)
            .ok_or_else(|| AppError::NotFound(format!("Interaction {}", interaction_id)))?;
        if interaction.user_liked {
            interaction.candidate_liked = liked_back;
        }
        Ok(interaction.clone())
    }

    async fn get(&self, interaction_id: Uuid) -> AppResult<Option<Interaction>> {
        let inner = self.inner.read().await;
        Ok(inner.interactions.get(&interaction_id).cloned())
    }

    async fn mutual_matches(&self, user_id: Uuid) -> AppResult<Vec<Interaction>> {
        let inner = self.inner.read().await;
        let mut matches: Vec<Interaction> = inner
            .interactions
            .values()
            .filter(|i| i.user_id == user_id && i.is_mutual())
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matches)
    }
}

#[async_trait]
impl ConsumptionStore for MemoryStore {
    async fn log_meal(&self, entry: NewConsumptionLogEntry) -> AppResult<ConsumptionLogEntry> {
        let mut inner = self.inner.write().await;

        if let Some(existing) = inner.consumption.iter().find(|e| {
            e.user_id == entry.user_id
                && e.candidate_id == entry.candidate_id
                && e.date_consumed == entry.date_consumed
        }) {
            return Ok(existing.clone());
        }

        let entry = entry.into_entry();
        inner.consumption.push(entry.clone());
        Ok(entry)
    }

    async fn history_between(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<ConsumedMeal>> {
        let inner = self.inner.read().await;
        Ok(inner
            .consumption
            .iter()
            .filter(|e| e.user_id == user_id && e.date_consumed >= from && e.date_consumed <= to)
            .filter_map(|e| {
                inner
                    .candidates
                    .iter()
                    .find(|c| c.id == e.candidate_id)
                    .map(|c| ConsumedMeal {
                        candidate_id: c.id,
                        date_consumed: e.date_consumed,
                        cuisine: c.cuisine.clone(),
                        meal_category: c.meal_category,
                    })
            })
            .collect())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile(&self, user_id: Uuid) -> AppResult<Option<DietaryProfile>> {
        let inner = self.inner.read().await;
        Ok(inner.profiles.get(&user_id).cloned())
    }

    async fn save_profile(&self, profile: DietaryProfile) -> AppResult<DietaryProfile> {
        let mut inner = self.inner.write().await;
        inner.profiles.insert(profile.user_id, profile.clone());
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MealCategory;
    use chrono::Duration;

    fn new_candidate(name: &str, diet: DietTag, cuisine: &str) -> NewCandidate {
        NewCandidate {
            name: name.to_string(),
            description: format!("{} description", name),
            calories: 400,
            meal_category: MealCategory::Lunch,
            cuisine: cuisine.to_string(),
            diet,
            ingredients: vec!["rice".to_string()],
            image_url: None,
            generated_prompt: String::new(),
            generation_successful: true,
        }
    }

    #[tokio::test]
    async fn test_find_unseen_filters_diet_and_exclusions_in_order() {
        let store = MemoryStore::new();
        let a = store.insert(new_candidate("A", DietTag::Vegan, "Thai")).await.unwrap();
        let _b = store.insert(new_candidate("B", DietTag::Keto, "Thai")).await.unwrap();
        let c = store.insert(new_candidate("C", DietTag::Vegan, "Thai")).await.unwrap();
        let d = store.insert(new_candidate("D", DietTag::Vegan, "Thai")).await.unwrap();

        let exclude: HashSet<Uuid> = [c.id].into_iter().collect();
        let unseen = store.find_unseen(DietTag::Vegan, &exclude).await.unwrap();

        let ids: Vec<Uuid> = unseen.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![a.id, d.id]);
    }

    #[tokio::test]
    async fn test_upsert_decision_never_duplicates_pair() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let candidate = Uuid::new_v4();

        let first = store.upsert_decision(user, candidate, false).await.unwrap();
        let second = store.upsert_decision(user, candidate, true).await.unwrap();

        assert_eq!(first.id, second.id);
        assert!(second.user_liked);
        assert_eq!(store.seen_candidate_ids(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_keeps_candidate_flag() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let candidate = Uuid::new_v4();

        let interaction = store.upsert_decision(user, candidate, true).await.unwrap();
        store.set_candidate_decision(interaction.id, true).await.unwrap();

        let after_pass = store.upsert_decision(user, candidate, false).await.unwrap();
        assert!(!after_pass.user_liked);
        assert!(after_pass.candidate_liked);
    }

    #[tokio::test]
    async fn test_set_candidate_decision_ignores_passed_interaction() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let candidate = Uuid::new_v4();

        let liked = store.upsert_decision(user, candidate, true).await.unwrap();
        store.upsert_decision(user, candidate, false).await.unwrap();

        let unchanged = store.set_candidate_decision(liked.id, true).await.unwrap();
        assert!(!unchanged.user_liked);
        assert!(!unchanged.candidate_liked);

        let stored = InteractionStore::get(&store, liked.id).await.unwrap().unwrap();
        assert!(!stored.candidate_liked);
    }

    #[tokio::test]
    async fn test_set_candidate_decision_unknown_interaction() {
        let store = MemoryStore::new();
        let result = store.set_candidate_decision(Uuid::new_v4(), true).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_log_meal_is_get_or_create() {
        let store = MemoryStore::new();
        let candidate = store.insert(new_candidate("A", DietTag::Vegan, "Thai")).await.unwrap();
        let user = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        let entry = NewConsumptionLogEntry {
            user_id: user,
            candidate_id: candidate.id,
            date_consumed: date,
            meal_category: MealCategory::Lunch,
        };
        let first = store.log_meal(entry.clone()).await.unwrap();
        let second = store
            .log_meal(NewConsumptionLogEntry {
                meal_category: MealCategory::Dinner,
                ..entry
            })
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.meal_category, MealCategory::Lunch);
    }

    #[tokio::test]
    async fn test_history_between_is_inclusive_and_joined() {
        let store = MemoryStore::new();
        let thai = store.insert(new_candidate("A", DietTag::Vegan, "Thai")).await.unwrap();
        let user = Uuid::new_v4();
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();

        for offset in [0, 7, 8] {
            store
                .log_meal(NewConsumptionLogEntry {
                    user_id: user,
                    candidate_id: thai.id,
                    date_consumed: today - Duration::days(offset),
                    meal_category: MealCategory::Lunch,
                })
                .await
                .unwrap();
        }

        let history = store
            .history_between(user, today - Duration::days(7), today)
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|m| m.cuisine == "Thai"));
    }
}
