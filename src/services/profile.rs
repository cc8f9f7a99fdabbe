use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::ProfileStore,
    error::{AppError, AppResult},
    models::{DietaryProfile, DietaryProfileUpdate},
};

/// Dietary profile setup and lookup
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Validates and saves a profile; a saved profile is always complete
    pub async fn setup(&self, user_id: Uuid, update: DietaryProfileUpdate) -> AppResult<DietaryProfile> {
        let profile = update.into_profile(user_id)?;
        let saved = self.store.save_profile(profile).await?;

        tracing::info!(
            user_id = %user_id,
            diet = %saved.diet,
            allergy_count = saved.allergies.len(),
            cuisine_count = saved.favorite_cuisines.len(),
            "Dietary profile saved"
        );

        Ok(saved)
    }

    pub async fn get(&self, user_id: Uuid) -> AppResult<DietaryProfile> {
        self.store
            .get_profile(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Dietary profile for user {}", user_id)))
    }

    /// The user's profile, or `ProfileIncomplete` if setup has not happened
    pub async fn require_completed(&self, user_id: Uuid) -> AppResult<DietaryProfile> {
        match self.store.get_profile(user_id).await? {
            Some(profile) if profile.profile_completed => Ok(profile),
            _ => Err(AppError::ProfileIncomplete(format!(
                "User {} must complete dietary profile setup first",
                user_id
            ))),
        }
    }
}
