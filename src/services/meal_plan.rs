use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::ConsumptionStore,
    error::{AppError, AppResult},
    models::{ConsumptionLogEntry, MealCategory, NewConsumptionLogEntry},
    services::ledger::InteractionLedger,
};

/// Turns mutual matches into consumption log entries
#[derive(Clone)]
pub struct MealPlanner {
    ledger: InteractionLedger,
    consumption: Arc<dyn ConsumptionStore>,
}

impl MealPlanner {
    pub fn new(ledger: InteractionLedger, consumption: Arc<dyn ConsumptionStore>) -> Self {
        Self {
            ledger,
            consumption,
        }
    }

    /// Logs the matched candidate as eaten on `date`.
    ///
    /// Adding the same match on the same day twice returns the existing entry.
    pub async fn add_to_meal_plan(
        &self,
        user_id: Uuid,
        match_id: Uuid,
        date: NaiveDate,
        meal_category: MealCategory,
    ) -> AppResult<ConsumptionLogEntry> {
        let interaction = self.ledger.interaction_for_user(user_id, match_id).await?;

        if !interaction.is_mutual() {
            return Err(AppError::InvalidInput(format!(
                "Interaction {} is not a mutual match",
                match_id
            )));
        }

        let entry = self
            .consumption
            .log_meal(NewConsumptionLogEntry {
                user_id,
                candidate_id: interaction.candidate_id,
                date_consumed: date,
                meal_category,
            })
            .await?;

        tracing::info!(
            user_id = %user_id,
            candidate_id = %entry.candidate_id,
            date = %entry.date_consumed,
            meal_category = %entry.meal_category,
            "Added match to meal plan"
        );

        Ok(entry)
    }
}
