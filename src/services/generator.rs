use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    db::CandidateStore,
    error::{AppError, AppResult},
    models::{clean_list, Candidate, DietaryProfile, MealCategory, NewCandidate},
    services::{
        providers::{ImageGenerator, TextGenerator},
        random::RandomSource,
    },
};

/// Cuisines drawn from when a profile lists no favorites
pub const DEFAULT_CUISINES: [&str; 5] = ["Italian", "Mexican", "Asian", "American", "Mediterranean"];

pub const FALLBACK_MIN_CALORIES: u32 = 200;
pub const FALLBACK_MAX_CALORIES: u32 = 800;

const SYSTEM_PROMPT: &str = "You are a professional chef creating recipes. Return only valid JSON.";

/// Recipe payload expected back from the text generator
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeneratedFood {
    pub name: String,
    pub description: String,
    pub calories: i64,
    #[serde(deserialize_with = "deserialize_ingredients")]
    pub ingredients: Vec<String>,
}

/// Models answer with either `"a, b, c"` or `["a", "b", "c"]`
fn deserialize_ingredients<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IngredientList {
        List(Vec<String>),
        Text(String),
    }

    Ok(match IngredientList::deserialize(deserializer)? {
        IngredientList::List(items) => clean_list(items),
        IngredientList::Text(text) => clean_list([text]),
    })
}

/// Parses a model reply into a recipe, or `None` if it is unusable.
///
/// Tolerates a surrounding markdown code fence. Rejects blank names and
/// calorie counts that are not a positive `u32`.
pub fn parse_generated_food(raw: &str) -> Option<GeneratedFood> {
    let food: GeneratedFood = serde_json::from_str(strip_code_fence(raw)).ok()?;

    if food.name.trim().is_empty() || food.calories <= 0 || food.calories > i64::from(u32::MAX) {
        return None;
    }

    Some(food)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence line
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().trim_end_matches("```").trim()
}

/// Deterministic stand-in when the text generator fails or answers garbage
pub fn fallback_food(cuisine: &str, meal: MealCategory, rng: &dyn RandomSource) -> GeneratedFood {
    GeneratedFood {
        name: format!("{} {}", cuisine, meal.title()),
        description: format!("A delicious {} {}", cuisine, meal),
        calories: i64::from(rng.between(FALLBACK_MIN_CALORIES, FALLBACK_MAX_CALORIES)),
        ingredients: vec!["fresh ingredients".to_string()],
    }
}

/// Prompt for the food photograph of a generated recipe
pub fn image_prompt(food: &GeneratedFood) -> String {
    format!(
        "professional food photography of {}, {}, appetizing, well-lit, restaurant quality",
        food.name, food.description
    )
}

/// The random choices and prompt for one candidate
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationPlan {
    pub meal_category: MealCategory,
    pub cuisine: String,
    pub prompt: String,
}

impl GenerationPlan {
    pub fn new(profile: &DietaryProfile, rng: &dyn RandomSource) -> Self {
        let meal_category = MealCategory::GENERATED[rng.pick(MealCategory::GENERATED.len())];

        let cuisine = if profile.favorite_cuisines.is_empty() {
            DEFAULT_CUISINES[rng.pick(DEFAULT_CUISINES.len())].to_string()
        } else {
            profile.favorite_cuisines[rng.pick(profile.favorite_cuisines.len())].clone()
        };

        let prompt = format!(
            "Create a {diet} {meal} recipe from {cuisine} cuisine.\n\
             Avoid these allergies: {allergies}.\n\
             Target calories: {target} calories.\n\
             \n\
             Respond in this exact JSON format:\n\
             {{\n    \
                 \"name\": \"Recipe Name\",\n    \
                 \"description\": \"Brief appetizing description\",\n    \
                 \"calories\": 450,\n    \
                 \"ingredients\": \"ingredient1, ingredient2, ingredient3\"\n\
             }}",
            diet = profile.diet,
            meal = meal_category,
            cuisine = cuisine,
            allergies = profile.allergies_for_prompt(),
            target = profile.target_meal_calories(),
        );

        Self {
            meal_category,
            cuisine,
            prompt,
        }
    }
}

/// Produces new candidates through the external generation collaborators.
///
/// Best effort: a batch may come back short, or empty.
#[derive(Clone)]
pub struct CandidateGenerator {
    text: Arc<dyn TextGenerator>,
    image: Arc<dyn ImageGenerator>,
    store: Arc<dyn CandidateStore>,
    rng: Arc<dyn RandomSource>,
    call_timeout: Duration,
}

impl CandidateGenerator {
    pub fn new(
        text: Arc<dyn TextGenerator>,
        image: Arc<dyn ImageGenerator>,
        store: Arc<dyn CandidateStore>,
        rng: Arc<dyn RandomSource>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            text,
            image,
            store,
            rng,
            call_timeout,
        }
    }

    /// Attempts `count` independent generations for `profile`.
    ///
    /// Each attempt runs as its own task; a failed attempt is logged and
    /// skipped, never retried.
    pub async fn generate(&self, profile: &DietaryProfile, count: usize) -> Vec<Candidate> {
        tracing::info!(
            user_id = %profile.user_id,
            diet = %profile.diet,
            count,
            "Generating candidate batch"
        );

        let mut tasks = Vec::with_capacity(count);
        for _ in 0..count {
            let plan = GenerationPlan::new(profile, self.rng.as_ref());
            let generator = self.clone();
            let profile = profile.clone();
            tasks.push(tokio::spawn(async move {
                generator.generate_one(&profile, plan).await
            }));
        }

        let mut results = Vec::new();
        let mut failures = 0usize;

        for task in tasks {
            match task.await {
                Ok(Ok(candidate)) => results.push(candidate),
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "Candidate generation failed");
                    failures += 1;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Candidate generation task join error");
                    failures += 1;
                }
            }
        }

        if failures > 0 {
            tracing::warn!(
                success_count = results.len(),
                error_count = failures,
                "Partial candidate generation failure"
            );
        }

        tracing::info!(generated = results.len(), "Candidate batch generated");

        results
    }

    async fn generate_one(
        &self,
        profile: &DietaryProfile,
        plan: GenerationPlan,
    ) -> AppResult<Candidate> {
        let food = self.request_food(&plan).await;
        let image_url = self.request_image(&food).await;

        let calories = u32::try_from(food.calories)
            .map_err(|_| AppError::Internal(format!("Calorie count {} out of range", food.calories)))?;

        self.store
            .insert(NewCandidate {
                name: food.name,
                description: food.description,
                calories,
                meal_category: plan.meal_category,
                cuisine: plan.cuisine,
                diet: profile.diet,
                ingredients: food.ingredients,
                image_url,
                generated_prompt: plan.prompt,
                generation_successful: true,
            })
            .await
    }

    /// Asks the text generator for a recipe, falling back on any failure
    async fn request_food(&self, plan: &GenerationPlan) -> GeneratedFood {
        let call = self.text.generate_text(SYSTEM_PROMPT, &plan.prompt);

        let failure = match tokio::time::timeout(self.call_timeout, call).await {
            Ok(Ok(raw)) => match parse_generated_food(&raw) {
                Some(food) => return food,
                None => "unparseable recipe payload".to_string(),
            },
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("timed out after {:?}", self.call_timeout),
        };

        tracing::warn!(
            provider = self.text.name(),
            cuisine = %plan.cuisine,
            meal = %plan.meal_category,
            reason = %failure,
            "Text generation failed, using fallback recipe"
        );

        fallback_food(&plan.cuisine, plan.meal_category, self.rng.as_ref())
    }

    /// Asks the image generator for a photo; any failure leaves no image
    async fn request_image(&self, food: &GeneratedFood) -> Option<String> {
        let prompt = image_prompt(food);

        match tokio::time::timeout(self.call_timeout, self.image.generate_image(&prompt)).await {
            Ok(Ok(url)) => Some(url),
            Ok(Err(e)) => {
                tracing::warn!(provider = self.image.name(), error = %e, "Image generation failed");
                None
            }
            Err(_) => {
                tracing::warn!(provider = self.image.name(), "Image generation timed out");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::MemoryStore,
        models::{DietTag, NewCandidate},
        services::{
            providers::{MockImageGenerator, MockTextGenerator},
            random::SeededRandom,
        },
    };
    use async_trait::async_trait;
    use std::collections::HashSet;
    use uuid::Uuid;

    const RECIPE_JSON: &str = r#"{
        "name": "Lentil Bolognese",
        "description": "Hearty lentils simmered in tomato sauce",
        "calories": 480,
        "ingredients": "lentils, tomatoes, garlic"
    }"#;

    fn vegan_profile(cuisines: &[&str]) -> DietaryProfile {
        let mut profile = DietaryProfile::new(Uuid::new_v4());
        profile.diet = DietTag::Vegan;
        profile.favorite_cuisines = cuisines.iter().map(|c| c.to_string()).collect();
        profile.profile_completed = true;
        profile
    }

    fn text_returning(reply: Result<&'static str, &'static str>) -> MockTextGenerator {
        let mut text = MockTextGenerator::new();
        text.expect_generate_text().returning(move |_, _| match reply {
            Ok(body) => Ok(body.to_string()),
            Err(msg) => Err(AppError::ExternalApi(msg.to_string())),
        });
        text.expect_name().return_const("mock-text");
        text
    }

    fn image_returning(reply: Result<&'static str, &'static str>) -> MockImageGenerator {
        let mut image = MockImageGenerator::new();
        image.expect_generate_image().returning(move |_| match reply {
            Ok(url) => Ok(url.to_string()),
            Err(msg) => Err(AppError::ExternalApi(msg.to_string())),
        });
        image.expect_name().return_const("mock-image");
        image
    }

    fn generator(
        text: impl TextGenerator + 'static,
        image: impl ImageGenerator + 'static,
        store: Arc<dyn CandidateStore>,
    ) -> CandidateGenerator {
        CandidateGenerator::new(
            Arc::new(text),
            Arc::new(image),
            store,
            Arc::new(SeededRandom::with_seed(11)),
            Duration::from_millis(200),
        )
    }

    #[test]
    fn test_parse_generated_food_comma_separated_ingredients() {
        let food = parse_generated_food(RECIPE_JSON).unwrap();
        assert_eq!(food.name, "Lentil Bolognese");
        assert_eq!(food.calories, 480);
        assert_eq!(food.ingredients, vec!["lentils", "tomatoes", "garlic"]);
    }

    #[test]
    fn test_parse_generated_food_array_ingredients_in_code_fence() {
        let raw = "```json\n{\"name\":\"Tofu Scramble\",\"description\":\"Savory\",\
                   \"calories\":350,\"ingredients\":[\"tofu\",\" turmeric \"]}\n```";
        let food = parse_generated_food(raw).unwrap();
        assert_eq!(food.name, "Tofu Scramble");
        assert_eq!(food.ingredients, vec!["tofu", "turmeric"]);
    }

    #[test]
    fn test_parse_generated_food_rejects_unusable_payloads() {
        assert!(parse_generated_food("Sure! Here is a recipe").is_none());
        assert!(parse_generated_food(
            r#"{"name":" ","description":"x","calories":300,"ingredients":"a"}"#
        )
        .is_none());
        assert!(parse_generated_food(
            r#"{"name":"Soup","description":"x","calories":0,"ingredients":"a"}"#
        )
        .is_none());
        assert!(parse_generated_food(r#"{"name":"Soup","calories":300}"#).is_none());
    }

    #[test]
    fn test_fallback_food_shape() {
        let rng = SeededRandom::with_seed(3);
        for _ in 0..100 {
            let food = fallback_food("Mexican", MealCategory::Breakfast, &rng);
            assert_eq!(food.name, "Mexican Breakfast");
            assert_eq!(food.description, "A delicious Mexican breakfast");
            assert!((200..=800).contains(&food.calories));
            assert_eq!(food.ingredients, vec!["fresh ingredients"]);
        }
    }

    #[test]
    fn test_image_prompt() {
        let food = parse_generated_food(RECIPE_JSON).unwrap();
        assert_eq!(
            image_prompt(&food),
            "professional food photography of Lentil Bolognese, Hearty lentils simmered \
             in tomato sauce, appetizing, well-lit, restaurant quality"
        );
    }

    #[test]
    fn test_plan_embeds_profile_details() {
        let mut profile = vegan_profile(&["Thai"]);
        profile.allergies = vec!["peanuts".to_string()];
        profile.daily_calorie_goal = 2200;

        let plan = GenerationPlan::new(&profile, &SeededRandom::with_seed(1));
        assert_eq!(plan.cuisine, "Thai");
        assert!(MealCategory::GENERATED.contains(&plan.meal_category));
        assert!(plan.prompt.contains("Create a vegan"));
        assert!(plan.prompt.contains("from Thai cuisine"));
        assert!(plan.prompt.contains("Avoid these allergies: peanuts."));
        assert!(plan.prompt.contains("Target calories: 550 calories."));
    }

    #[test]
    fn test_plan_uses_default_cuisines_when_profile_has_none() {
        let profile = vegan_profile(&[]);
        let rng = SeededRandom::with_seed(5);
        for _ in 0..50 {
            let plan = GenerationPlan::new(&profile, &rng);
            assert!(DEFAULT_CUISINES.contains(&plan.cuisine.as_str()));
            assert!(plan.prompt.contains("Avoid these allergies: none."));
        }
    }

    #[tokio::test]
    async fn test_generate_persists_parsed_candidates() {
        let store = Arc::new(MemoryStore::new());
        let generator = generator(
            text_returning(Ok(RECIPE_JSON)),
            image_returning(Ok("https://img.example/1.png")),
            store.clone(),
        );
        let profile = vegan_profile(&["Italian"]);

        let candidates = generator.generate(&profile, 3).await;

        assert_eq!(candidates.len(), 3);
        for candidate in &candidates {
            assert_eq!(candidate.name, "Lentil Bolognese");
            assert_eq!(candidate.cuisine, "Italian");
            assert_eq!(candidate.diet, DietTag::Vegan);
            assert_eq!(candidate.image_url.as_deref(), Some("https://img.example/1.png"));
            assert!(candidate.generation_successful);
            assert!(!candidate.generated_prompt.is_empty());
        }

        let stored = store
            .find_unseen(DietTag::Vegan, &HashSet::new())
            .await
            .unwrap();
        assert_eq!(stored.len(), 3);
    }

    #[tokio::test]
    async fn test_generate_falls_back_when_text_always_fails() {
        let store = Arc::new(MemoryStore::new());
        let generator = generator(
            text_returning(Err("provider unreachable")),
            image_returning(Err("provider unreachable")),
            store,
        );
        let profile = vegan_profile(&[]);

        let candidates = generator.generate(&profile, 10).await;

        assert_eq!(candidates.len(), 10);
        for candidate in &candidates {
            assert!(!candidate.name.is_empty());
            assert_eq!(
                candidate.name,
                format!("{} {}", candidate.cuisine, candidate.meal_category.title())
            );
            assert!((200..=800).contains(&candidate.calories));
            assert!(DEFAULT_CUISINES.contains(&candidate.cuisine.as_str()));
            assert_eq!(candidate.image_url, None);
            assert!(candidate.generation_successful);
        }
    }

    #[tokio::test]
    async fn test_generate_falls_back_on_unparseable_reply() {
        let generator = generator(
            text_returning(Ok("I'd love to help! Try a salad.")),
            image_returning(Ok("https://img.example/2.png")),
            Arc::new(MemoryStore::new()),
        );

        let candidates = generator.generate(&vegan_profile(&["Greek"]), 1).await;

        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].name.starts_with("Greek "));
        assert_eq!(candidates[0].ingredients, vec!["fresh ingredients"]);
    }

    #[tokio::test]
    async fn test_generate_sends_profile_prompt() {
        let mut text = MockTextGenerator::new();
        text.expect_generate_text()
            .withf(|system, user| {
                system.contains("professional chef")
                    && user.contains("vegan")
                    && user.contains("Target calories: 500 calories.")
            })
            .times(2)
            .returning(|_, _| Ok(RECIPE_JSON.to_string()));
        text.expect_name().return_const("mock-text");

        let generator = generator(
            text,
            image_returning(Ok("https://img.example/3.png")),
            Arc::new(MemoryStore::new()),
        );

        let candidates = generator.generate(&vegan_profile(&[]), 2).await;
        assert_eq!(candidates.len(), 2);
    }

    struct SlowText;

    #[async_trait]
    impl TextGenerator for SlowText {
        async fn generate_text(&self, _: &str, _: &str) -> AppResult<String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(RECIPE_JSON.to_string())
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_generate_times_out_slow_text_provider() {
        let generator = generator(
            SlowText,
            image_returning(Err("down")),
            Arc::new(MemoryStore::new()),
        );

        let candidates = generator.generate(&vegan_profile(&["Korean"]), 1).await;

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].cuisine, "Korean");
        assert!(candidates[0].name.starts_with("Korean "));
    }

    struct BrokenStore;

    #[async_trait]
    impl CandidateStore for BrokenStore {
        async fn find_unseen(
            &self,
            _diet: DietTag,
            _exclude: &HashSet<Uuid>,
        ) -> AppResult<Vec<Candidate>> {
            Ok(Vec::new())
        }

        async fn insert(&self, _candidate: NewCandidate) -> AppResult<Candidate> {
            Err(AppError::Internal("disk full".to_string()))
        }

        async fn get(&self, _id: Uuid) -> AppResult<Option<Candidate>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_generate_returns_short_batch_when_persistence_fails() {
        let generator = generator(
            text_returning(Ok(RECIPE_JSON)),
            image_returning(Ok("https://img.example/4.png")),
            Arc::new(BrokenStore),
        );

        let candidates = generator.generate(&vegan_profile(&[]), 4).await;
        assert!(candidates.is_empty());
    }
}
