use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DietTag, MealCategory};

/// A food recommendation shown to users on the discover screen
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    /// Unique identifier for the candidate
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Calories per serving, always positive
    pub calories: u32,
    pub meal_category: MealCategory,
    /// Free-text cuisine label (e.g. "Italian")
    pub cuisine: String,
    /// Diet this candidate was generated for
    pub diet: DietTag,
    /// Main ingredients in the order the recipe lists them
    pub ingredients: Vec<String>,
    pub image_url: Option<String>,
    /// Prompt sent to the text generator
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub generated_prompt: String,
    pub generation_successful: bool,
    pub created_at: DateTime<Utc>,
}

/// Discover screen payload; `None` once nothing can be offered
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscoverResponse {
    pub candidate: Option<Candidate>,
}

/// A candidate that has not been persisted yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewCandidate {
    pub name: String,
    pub description: String,
    pub calories: u32,
    pub meal_category: MealCategory,
    pub cuisine: String,
    pub diet: DietTag,
    pub ingredients: Vec<String>,
    pub image_url: Option<String>,
    pub generated_prompt: String,
    pub generation_successful: bool,
}

impl NewCandidate {
    /// Assigns identity and creation time, producing the stored record
    pub fn into_candidate(self) -> Candidate {
        Candidate {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            calories: self.calories,
            meal_category: self.meal_category,
            cuisine: self.cuisine,
            diet: self.diet,
            ingredients: self.ingredients,
            image_url: self.image_url,
            generated_prompt: self.generated_prompt,
            generation_successful: self.generation_successful,
            created_at: Utc::now(),
        }
    }
}
