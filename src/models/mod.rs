use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

pub mod candidate;
pub mod consumption;
pub mod dietary_profile;
pub mod interaction;

pub use candidate::{Candidate, DiscoverResponse, NewCandidate};
pub use consumption::{ConsumedMeal, ConsumptionLogEntry, MealPlanRequest, NewConsumptionLogEntry};
pub use dietary_profile::{DietaryProfile, DietaryProfileUpdate};
pub use interaction::{
    Interaction, MatchView, SwipeAction, SwipeOutcome, SwipeRequest, SwipeStatus,
};

/// Diet a user follows and a candidate is compatible with
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum DietTag {
    #[default]
    Omnivore,
    Vegetarian,
    Vegan,
    Keto,
    Paleo,
    Mediterranean,
    LowCarb,
    GlutenFree,
}

impl DietTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            DietTag::Omnivore => "omnivore",
            DietTag::Vegetarian => "vegetarian",
            DietTag::Vegan => "vegan",
            DietTag::Keto => "keto",
            DietTag::Paleo => "paleo",
            DietTag::Mediterranean => "mediterranean",
            DietTag::LowCarb => "low_carb",
            DietTag::GlutenFree => "gluten_free",
        }
    }
}

impl Display for DietTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DietTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "omnivore" => Ok(DietTag::Omnivore),
            "vegetarian" => Ok(DietTag::Vegetarian),
            "vegan" => Ok(DietTag::Vegan),
            "keto" => Ok(DietTag::Keto),
            "paleo" => Ok(DietTag::Paleo),
            "mediterranean" => Ok(DietTag::Mediterranean),
            "low_carb" => Ok(DietTag::LowCarb),
            "gluten_free" => Ok(DietTag::GlutenFree),
            other => Err(format!("unknown diet tag '{}'", other)),
        }
    }
}

/// Meal slot a candidate belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MealCategory {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    Dessert,
}

impl MealCategory {
    /// Categories the generator draws from. Desserts are never generated.
    pub const GENERATED: [MealCategory; 4] = [
        MealCategory::Breakfast,
        MealCategory::Lunch,
        MealCategory::Dinner,
        MealCategory::Snack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealCategory::Breakfast => "breakfast",
            MealCategory::Lunch => "lunch",
            MealCategory::Dinner => "dinner",
            MealCategory::Snack => "snack",
            MealCategory::Dessert => "dessert",
        }
    }

    /// Display label, e.g. "Breakfast"
    pub fn title(&self) -> &'static str {
        match self {
            MealCategory::Breakfast => "Breakfast",
            MealCategory::Lunch => "Lunch",
            MealCategory::Dinner => "Dinner",
            MealCategory::Snack => "Snack",
            MealCategory::Dessert => "Dessert",
        }
    }
}

impl Display for MealCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breakfast" => Ok(MealCategory::Breakfast),
            "lunch" => Ok(MealCategory::Lunch),
            "dinner" => Ok(MealCategory::Dinner),
            "snack" => Ok(MealCategory::Snack),
            "dessert" => Ok(MealCategory::Dessert),
            other => Err(format!("unknown meal category '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    #[default]
    ModeratelyActive,
    VeryActive,
    ExtremelyActive,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::LightlyActive => "lightly_active",
            ActivityLevel::ModeratelyActive => "moderately_active",
            ActivityLevel::VeryActive => "very_active",
            ActivityLevel::ExtremelyActive => "extremely_active",
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "lightly_active" => Ok(ActivityLevel::LightlyActive),
            "moderately_active" => Ok(ActivityLevel::ModeratelyActive),
            "very_active" => Ok(ActivityLevel::VeryActive),
            "extremely_active" => Ok(ActivityLevel::ExtremelyActive),
            other => Err(format!("unknown activity level '{}'", other)),
        }
    }
}

/// Splits a free-text list on commas, trimming entries and dropping blanks
pub fn clean_list<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .flat_map(|item| {
            item.as_ref()
                .split(',')
                .map(|part| part.trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|part| !part.is_empty())
        .collect()
}
