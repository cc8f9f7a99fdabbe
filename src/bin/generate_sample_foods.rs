//! Fills the candidate catalog ahead of time.
//!
//! Usage:
//! ```bash
//! # 20 candidates for a generic omnivore profile
//! cargo run --bin generate-sample-foods
//!
//! # 5 candidates shaped by an existing user's dietary profile
//! cargo run --bin generate-sample-foods -- --count 5 --user 6f1c...
//! ```

use anyhow::{bail, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use foodmatch_api::{
    config::Config,
    db::ProfileStore,
    models::DietaryProfile,
    routes::{Generation, Stores},
    services::generator::DEFAULT_CUISINES,
};

#[derive(Parser)]
#[command(
    name = "generate-sample-foods",
    about = "Generate sample food candidates into the catalog"
)]
struct Args {
    /// Number of candidates to attempt
    #[arg(long, default_value_t = 20)]
    count: usize,

    /// Generate for this user's dietary profile instead of the default one
    #[arg(long)]
    user: Option<Uuid>,
}

fn default_profile() -> DietaryProfile {
    let mut profile = DietaryProfile::new(Uuid::nil());
    profile.favorite_cuisines = DEFAULT_CUISINES.iter().map(|c| c.to_string()).collect();
    profile.profile_completed = true;
    profile
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "foodmatch_api=info,generate_sample_foods=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;
    let (stores, cache_handle) = Stores::connect(&config).await?;

    let profile = match args.user {
        Some(user_id) => match stores.profiles.get_profile(user_id).await? {
            Some(profile) => profile,
            None => bail!("User {} has no dietary profile", user_id),
        },
        None => default_profile(),
    };

    let generator = Generation::from_config(&config).generator(stores.candidates.clone());
    let candidates = generator.generate(&profile, args.count).await;

    for candidate in &candidates {
        tracing::info!(
            candidate_id = %candidate.id,
            name = %candidate.name,
            cuisine = %candidate.cuisine,
            meal_category = %candidate.meal_category,
            calories = candidate.calories,
            "Generated sample food"
        );
    }

    tracing::info!(
        requested = args.count,
        generated = candidates.len(),
        diet = %profile.diet,
        "Sample food generation finished"
    );

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use foodmatch_api::models::DietTag;

    #[test]
    fn test_default_profile_is_generic_omnivore() {
        let profile = default_profile();
        assert_eq!(profile.diet, DietTag::Omnivore);
        assert_eq!(profile.daily_calorie_goal, 2000);
        assert_eq!(
            profile.favorite_cuisines,
            vec!["Italian", "Mexican", "Asian", "American", "Mediterranean"]
        );
    }

    #[test]
    fn test_args_defaults_and_user() {
        let args = Args::parse_from(["generate-sample-foods"]);
        assert_eq!(args.count, 20);
        assert!(args.user.is_none());

        let user = Uuid::new_v4();
        let args = Args::parse_from([
            "generate-sample-foods".to_string(),
            "--count".to_string(),
            "3".to_string(),
            "--user".to_string(),
            user.to_string(),
        ]);
        assert_eq!(args.count, 3);
        assert_eq!(args.user, Some(user));
    }
}
