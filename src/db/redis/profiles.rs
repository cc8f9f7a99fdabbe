use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::{Cache, CacheKey};
use crate::{
    cached,
    db::ProfileStore,
    error::AppResult,
    models::DietaryProfile,
};

/// Read-through Redis cache in front of another profile store.
///
/// Profiles are read on every discover and swipe but change only on setup.
pub struct CachedProfileStore {
    inner: Arc<dyn ProfileStore>,
    cache: Cache,
    ttl: u64,
}

impl CachedProfileStore {
    pub fn new(inner: Arc<dyn ProfileStore>, cache: Cache, ttl: u64) -> Self {
        Self { inner, cache, ttl }
    }
}

#[async_trait]
impl ProfileStore for CachedProfileStore {
    async fn get_profile(&self, user_id: Uuid) -> AppResult<Option<DietaryProfile>> {
        cached!(
            self.cache,
            CacheKey::DietaryProfile(user_id),
            self.ttl,
            self.inner.get_profile(user_id)
        )
    }

    async fn save_profile(&self, profile: DietaryProfile) -> AppResult<DietaryProfile> {
        let saved = self.inner.save_profile(profile).await?;
        self.cache
            .invalidate_in_background(&CacheKey::DietaryProfile(saved.user_id));
        tracing::debug!(user_id = %saved.user_id, "Invalidated cached dietary profile");
        Ok(saved)
    }
}
