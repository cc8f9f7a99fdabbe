use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::Config,
    db::{
        create_pool, create_redis_client, Cache, CacheWriterHandle, CachedProfileStore,
        CandidateStore, ConsumptionStore, InteractionStore, MemoryStore, PgStore, ProfileStore,
    },
    services::{
        providers::{ImageGenerator, OpenAiCompatibleClient, TextGenerator},
        CandidateGenerator, DiscoverySelector, InteractionLedger, MatchingService, MealPlanner,
        ProfileService, RandomSource, ReciprocityEngine, SeededRandom,
    },
};

/// The four persistence seams, backed by one implementation or a mix
#[derive(Clone)]
pub struct Stores {
    pub candidates: Arc<dyn CandidateStore>,
    pub interactions: Arc<dyn InteractionStore>,
    pub consumption: Arc<dyn ConsumptionStore>,
    pub profiles: Arc<dyn ProfileStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            candidates: store.clone(),
            interactions: store.clone(),
            consumption: store.clone(),
            profiles: store,
        }
    }

    fn postgres(store: PgStore) -> Self {
        let store = Arc::new(store);
        Self {
            candidates: store.clone(),
            interactions: store.clone(),
            consumption: store.clone(),
            profiles: store,
        }
    }

    /// Postgres when `DATABASE_URL` is set, memory otherwise; profiles go
    /// through Redis when `REDIS_URL` is set.
    ///
    /// The returned handle must be shut down to flush queued cache writes.
    pub async fn connect(config: &Config) -> anyhow::Result<(Self, Option<CacheWriterHandle>)> {
        let mut stores = match &config.database_url {
            Some(url) => {
                let pool = create_pool(url).await?;
                tracing::info!("Connected to PostgreSQL and applied migrations");
                Self::postgres(PgStore::new(pool))
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory storage");
                Self::in_memory()
            }
        };

        let cache_handle = match &config.redis_url {
            Some(url) => {
                let (cache, handle) = Cache::new(create_redis_client(url)?);
                stores.profiles = Arc::new(CachedProfileStore::new(
                    stores.profiles.clone(),
                    cache,
                    config.profile_cache_ttl_secs,
                ));
                tracing::info!(
                    ttl_secs = config.profile_cache_ttl_secs,
                    "Dietary profile cache enabled"
                );
                Some(handle)
            }
            None => None,
        };

        Ok((stores, cache_handle))
    }
}

/// Generation collaborators shared by the discovery flow and the seed binary
#[derive(Clone)]
pub struct Generation {
    pub text: Arc<dyn TextGenerator>,
    pub image: Arc<dyn ImageGenerator>,
    pub rng: Arc<dyn RandomSource>,
    pub call_timeout: Duration,
}

impl Generation {
    pub fn from_config(config: &Config) -> Self {
        let client = Arc::new(OpenAiCompatibleClient::new(
            config.llm_api_url.clone(),
            config.llm_api_key.clone(),
            config.text_model.clone(),
            config.image_model.clone(),
        ));

        Self {
            text: client.clone(),
            image: client,
            rng: Arc::new(SeededRandom::from_entropy()),
            call_timeout: Duration::from_secs(config.generation_timeout_secs),
        }
    }

    pub fn generator(&self, candidates: Arc<dyn CandidateStore>) -> CandidateGenerator {
        CandidateGenerator::new(
            self.text.clone(),
            self.image.clone(),
            candidates,
            self.rng.clone(),
            self.call_timeout,
        )
    }
}

/// Shared application state
pub struct AppState {
    pub profiles: ProfileService,
    pub discovery: DiscoverySelector,
    pub matching: MatchingService,
    pub meal_planner: MealPlanner,
}

impl AppState {
    pub fn new(stores: Stores, generation: Generation, batch_size: usize) -> Self {
        let ledger = InteractionLedger::new(stores.interactions, stores.candidates.clone());
        let reciprocity = ReciprocityEngine::new(stores.consumption.clone(), generation.rng.clone());

        Self {
            profiles: ProfileService::new(stores.profiles),
            discovery: DiscoverySelector::new(
                stores.candidates.clone(),
                ledger.clone(),
                generation.generator(stores.candidates.clone()),
                batch_size,
            ),
            matching: MatchingService::new(stores.candidates, ledger.clone(), reciprocity),
            meal_planner: MealPlanner::new(ledger, stores.consumption),
        }
    }

    pub async fn from_config(config: &Config) -> anyhow::Result<(Self, Option<CacheWriterHandle>)> {
        let (stores, cache_handle) = Stores::connect(config).await?;
        let generation = Generation::from_config(config);

        tracing::info!(
            api_url = %config.llm_api_url,
            text_model = %config.text_model,
            image_model = %config.image_model,
            batch_size = config.discovery_batch_size,
            "Candidate generation configured"
        );

        Ok((
            Self::new(stores, generation, config.discovery_batch_size),
            cache_handle,
        ))
    }
}
