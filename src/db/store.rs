use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashSet;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        Candidate, ConsumedMeal, ConsumptionLogEntry, DietTag, DietaryProfile, Interaction,
        NewCandidate, NewConsumptionLogEntry,
    },
};

/// Persisted catalog of food candidates
#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// Candidates compatible with `diet` whose ids are not in `exclude`.
    ///
    /// Results come back in creation order, so repeated calls over an
    /// unchanged catalog agree on which candidate is first.
    async fn find_unseen(&self, diet: DietTag, exclude: &HashSet<Uuid>)
        -> AppResult<Vec<Candidate>>;

    async fn insert(&self, candidate: NewCandidate) -> AppResult<Candidate>;

    async fn get(&self, id: Uuid) -> AppResult<Option<Candidate>>;
}

/// Per-user like/pass records, one per (user, candidate) pair
#[async_trait]
pub trait InteractionStore: Send + Sync {
    async fn seen_candidate_ids(&self, user_id: Uuid) -> AppResult<HashSet<Uuid>>;

    /// Creates the pair's interaction or overwrites `user_liked` on the existing one.
    /// The candidate-side flag is left as it was.
    async fn upsert_decision(
        &self,
        user_id: Uuid,
        candidate_id: Uuid,
        liked: bool,
    ) -> AppResult<Interaction>;

    /// Writes `candidate_liked` only while the stored `user_liked` is true.
    /// Otherwise the current row comes back unchanged.
    async fn set_candidate_decision(
        &self,
        interaction_id: Uuid,
        liked_back: bool,
    ) -> AppResult<Interaction>;

    async fn get(&self, interaction_id: Uuid) -> AppResult<Option<Interaction>>;

    /// Mutual matches for a user, newest first
    async fn mutual_matches(&self, user_id: Uuid) -> AppResult<Vec<Interaction>>;
}

/// Meal plan / consumption history
#[async_trait]
pub trait ConsumptionStore: Send + Sync {
    /// Get-or-create on (user, candidate, date). An existing entry is returned untouched.
    async fn log_meal(&self, entry: NewConsumptionLogEntry) -> AppResult<ConsumptionLogEntry>;

    /// Entries dated within `[from, to]`, joined with their candidates
    async fn history_between(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<ConsumedMeal>>;
}

/// Dietary profiles, owned by the user-facing side of the application
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, user_id: Uuid) -> AppResult<Option<DietaryProfile>>;

    async fn save_profile(&self, profile: DietaryProfile) -> AppResult<DietaryProfile>;
}
