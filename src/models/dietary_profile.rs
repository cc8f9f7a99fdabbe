use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{clean_list, ActivityLevel, DietTag};
use crate::error::{AppError, AppResult};

pub const DEFAULT_DAILY_CALORIE_GOAL: u32 = 2000;
pub const MIN_DAILY_CALORIE_GOAL: u32 = 1000;
pub const MAX_DAILY_CALORIE_GOAL: u32 = 5000;

/// Dietary preferences that constrain what a user is shown and what gets generated
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DietaryProfile {
    pub user_id: Uuid,
    pub diet: DietTag,
    pub allergies: Vec<String>,
    pub daily_calorie_goal: u32,
    pub activity_level: ActivityLevel,
    pub favorite_cuisines: Vec<String>,
    /// Set once the user has gone through profile setup
    pub profile_completed: bool,
}

impl DietaryProfile {
    /// Creates a profile with the defaults a freshly registered user gets
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            diet: DietTag::default(),
            allergies: Vec::new(),
            daily_calorie_goal: DEFAULT_DAILY_CALORIE_GOAL,
            activity_level: ActivityLevel::default(),
            favorite_cuisines: Vec::new(),
            profile_completed: false,
        }
    }

    /// Calorie target for a single generated meal
    pub fn target_meal_calories(&self) -> u32 {
        self.daily_calorie_goal / 4
    }

    /// Allergies as they are embedded in a generation prompt
    pub fn allergies_for_prompt(&self) -> String {
        if self.allergies.is_empty() {
            "none".to_string()
        } else {
            self.allergies.join(", ")
        }
    }
}

/// Profile setup request body
#[derive(Debug, Clone, Deserialize)]
pub struct DietaryProfileUpdate {
    #[serde(default)]
    pub diet: DietTag,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default = "default_calorie_goal")]
    pub daily_calorie_goal: u32,
    #[serde(default)]
    pub activity_level: ActivityLevel,
    #[serde(default)]
    pub favorite_cuisines: Vec<String>,
}

fn default_calorie_goal() -> u32 {
    DEFAULT_DAILY_CALORIE_GOAL
}

impl DietaryProfileUpdate {
    /// Validates the update and produces a completed profile for `user_id`
    pub fn into_profile(self, user_id: Uuid) -> AppResult<DietaryProfile> {
        if !(MIN_DAILY_CALORIE_GOAL..=MAX_DAILY_CALORIE_GOAL).contains(&self.daily_calorie_goal) {
            return Err(AppError::InvalidInput(format!(
                "daily_calorie_goal must be between {} and {}",
                MIN_DAILY_CALORIE_GOAL, MAX_DAILY_CALORIE_GOAL
            )));
        }

        Ok(DietaryProfile {
            user_id,
            diet: self.diet,
            allergies: clean_list(&self.allergies),
            daily_calorie_goal: self.daily_calorie_goal,
            activity_level: self.activity_level,
            favorite_cuisines: clean_list(&self.favorite_cuisines),
            profile_completed: true,
        })
    }
}
