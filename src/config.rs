use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL database connection URL. Without it the service keeps
    /// everything in memory.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Redis connection URL for the dietary profile cache
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Base URL of the OpenAI-compatible generation API
    #[serde(default = "default_llm_api_url")]
    pub llm_api_url: String,

    /// Bearer token for the generation API (local servers usually need none)
    #[serde(default)]
    pub llm_api_key: Option<String>,

    /// Model used for recipe text generation
    #[serde(default = "default_text_model")]
    pub text_model: String,

    /// Model used for food photography
    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// Upper bound on a single external generation call
    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,

    /// Number of candidates generated when a user's catalog runs dry
    #[serde(default = "default_discovery_batch_size")]
    pub discovery_batch_size: usize,

    /// How long a cached dietary profile stays in Redis
    #[serde(default = "default_profile_cache_ttl_secs")]
    pub profile_cache_ttl_secs: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_llm_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_text_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_image_model() -> String {
    "flux".to_string()
}

fn default_generation_timeout_secs() -> u64 {
    30
}

fn default_discovery_batch_size() -> usize {
    10
}

fn default_profile_cache_ttl_secs() -> u64 {
    300
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Socket address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
