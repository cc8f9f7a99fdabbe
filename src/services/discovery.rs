use std::sync::Arc;

use crate::{
    db::CandidateStore,
    error::AppResult,
    models::{Candidate, DietaryProfile},
    services::{generator::CandidateGenerator, ledger::InteractionLedger},
};

/// Picks the next candidate a user has not swiped on yet
#[derive(Clone)]
pub struct DiscoverySelector {
    candidates: Arc<dyn CandidateStore>,
    ledger: InteractionLedger,
    generator: CandidateGenerator,
    batch_size: usize,
}

impl DiscoverySelector {
    pub fn new(
        candidates: Arc<dyn CandidateStore>,
        ledger: InteractionLedger,
        generator: CandidateGenerator,
        batch_size: usize,
    ) -> Self {
        Self {
            candidates,
            ledger,
            generator,
            batch_size,
        }
    }

    /// Returns an unseen candidate matching the profile's diet.
    ///
    /// When the catalog has nothing left for the user, one batch is generated
    /// and the query runs once more. `None` means the batch produced nothing.
    pub async fn next_candidate(&self, profile: &DietaryProfile) -> AppResult<Option<Candidate>> {
        let seen = self.ledger.seen_candidate_ids(profile.user_id).await?;

        let unseen = self.candidates.find_unseen(profile.diet, &seen).await?;
        if let Some(candidate) = unseen.into_iter().next() {
            return Ok(Some(candidate));
        }

        tracing::info!(
            user_id = %profile.user_id,
            diet = %profile.diet,
            seen_count = seen.len(),
            batch_size = self.batch_size,
            "No unseen candidates left, generating a new batch"
        );

        self.generator.generate(profile, self.batch_size).await;

        let candidate = self
            .candidates
            .find_unseen(profile.diet, &seen)
            .await?
            .into_iter()
            .next();

        if candidate.is_none() {
            tracing::warn!(user_id = %profile.user_id, "Generation produced no candidates");
        }

        Ok(candidate)
    }
}
