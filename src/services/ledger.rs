use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{CandidateStore, InteractionStore},
    error::{AppError, AppResult},
    models::{Interaction, MatchView},
};

/// Records like/pass decisions, one interaction per (user, candidate) pair
#[derive(Clone)]
pub struct InteractionLedger {
    interactions: Arc<dyn InteractionStore>,
    candidates: Arc<dyn CandidateStore>,
}

impl InteractionLedger {
    pub fn new(interactions: Arc<dyn InteractionStore>, candidates: Arc<dyn CandidateStore>) -> Self {
        Self {
            interactions,
            candidates,
        }
    }

    /// Creates or overwrites the user's decision on a candidate.
    ///
    /// The candidate-side flag survives the overwrite.
    pub async fn record_decision(
        &self,
        user_id: Uuid,
        candidate_id: Uuid,
        liked: bool,
    ) -> AppResult<Interaction> {
        let interaction = self
            .interactions
            .upsert_decision(user_id, candidate_id, liked)
            .await?;

        tracing::info!(
            user_id = %user_id,
            candidate_id = %candidate_id,
            interaction_id = %interaction.id,
            liked,
            "Recorded swipe decision"
        );

        Ok(interaction)
    }

    /// Stores the reciprocity result.
    ///
    /// The store only writes the flag while the user's like still stands, so a
    /// pass that landed after `interaction` was read leaves the row untouched.
    pub async fn record_candidate_decision(
        &self,
        interaction: &Interaction,
        liked_back: bool,
    ) -> AppResult<Interaction> {
        let stored = self
            .interactions
            .set_candidate_decision(interaction.id, liked_back)
            .await?;

        if !stored.user_liked {
            tracing::warn!(
                interaction_id = %interaction.id,
                liked_back,
                "Candidate decision skipped, user no longer likes the candidate"
            );
        }

        Ok(stored)
    }

    /// Candidate ids the user has already swiped on, either way
    pub async fn seen_candidate_ids(&self, user_id: Uuid) -> AppResult<HashSet<Uuid>> {
        self.interactions.seen_candidate_ids(user_id).await
    }

    /// A user's interaction by id; other users' interactions read as missing
    pub async fn interaction_for_user(
        &self,
        user_id: Uuid,
        interaction_id: Uuid,
    ) -> AppResult<Interaction> {
        self.interactions
            .get(interaction_id)
            .await?
            .filter(|interaction| interaction.user_id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("Match {}", interaction_id)))
    }

    /// Mutual matches with their candidates, newest first
    pub async fn mutual_matches(&self, user_id: Uuid) -> AppResult<Vec<MatchView>> {
        let interactions = self.interactions.mutual_matches(user_id).await?;

        let mut views = Vec::with_capacity(interactions.len());
        for interaction in interactions {
            match self.candidates.get(interaction.candidate_id).await? {
                Some(candidate) => views.push(MatchView {
                    match_id: interaction.id,
                    candidate,
                    matched_at: interaction.created_at,
                }),
                None => tracing::warn!(
                    interaction_id = %interaction.id,
                    candidate_id = %interaction.candidate_id,
                    "Mutual match references a missing candidate"
                ),
            }
        }

        Ok(views)
    }
}
