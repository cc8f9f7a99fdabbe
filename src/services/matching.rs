use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::CandidateStore,
    error::{AppError, AppResult},
    models::{MatchView, SwipeAction, SwipeOutcome},
    services::{ledger::InteractionLedger, reciprocity::ReciprocityEngine},
};

/// Swipe handling: record the user's decision, then let the candidate decide on likes
#[derive(Clone)]
pub struct MatchingService {
    candidates: Arc<dyn CandidateStore>,
    ledger: InteractionLedger,
    reciprocity: ReciprocityEngine,
}

impl MatchingService {
    pub fn new(
        candidates: Arc<dyn CandidateStore>,
        ledger: InteractionLedger,
        reciprocity: ReciprocityEngine,
    ) -> Self {
        Self {
            candidates,
            ledger,
            reciprocity,
        }
    }

    pub async fn swipe(
        &self,
        user_id: Uuid,
        candidate_id: Uuid,
        action: SwipeAction,
    ) -> AppResult<SwipeOutcome> {
        self.swipe_on(user_id, candidate_id, action, Utc::now().date_naive())
            .await
    }

    /// Swipe evaluated against the consumption history ending on `today`.
    ///
    /// Every like is re-evaluated, so liking again can turn a rejection into
    /// a match. Passing leaves any earlier candidate decision in place.
    pub async fn swipe_on(
        &self,
        user_id: Uuid,
        candidate_id: Uuid,
        action: SwipeAction,
        today: NaiveDate,
    ) -> AppResult<SwipeOutcome> {
        let candidate = self
            .candidates
            .get(candidate_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Candidate {}", candidate_id)))?;

        let interaction = self
            .ledger
            .record_decision(user_id, candidate_id, action.is_like())
            .await?;

        if !action.is_like() {
            return Ok(SwipeOutcome::recorded());
        }

        let liked_back = self.reciprocity.evaluate(user_id, &candidate, today).await?;
        let interaction = self
            .ledger
            .record_candidate_decision(&interaction, liked_back)
            .await?;

        if interaction.is_mutual() {
            tracing::info!(
                user_id = %user_id,
                candidate_id = %candidate_id,
                match_id = %interaction.id,
                "Mutual match"
            );
            Ok(SwipeOutcome::mutual_match(&candidate))
        } else {
            Ok(SwipeOutcome::recorded())
        }
    }

    pub async fn matches(&self, user_id: Uuid) -> AppResult<Vec<MatchView>> {
        self.ledger.mutual_matches(user_id).await
    }
}
