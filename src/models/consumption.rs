use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MealCategory;

/// A mutual match logged into the user's meal plan for a given day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsumptionLogEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub candidate_id: Uuid,
    pub date_consumed: NaiveDate,
    pub meal_category: MealCategory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewConsumptionLogEntry {
    pub user_id: Uuid,
    pub candidate_id: Uuid,
    pub date_consumed: NaiveDate,
    pub meal_category: MealCategory,
}

impl NewConsumptionLogEntry {
    pub fn into_entry(self) -> ConsumptionLogEntry {
        ConsumptionLogEntry {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            candidate_id: self.candidate_id,
            date_consumed: self.date_consumed,
            meal_category: self.meal_category,
        }
    }
}

/// Body of an add-to-meal-plan request
#[derive(Debug, Clone, Deserialize)]
pub struct MealPlanRequest {
    pub meal_category: MealCategory,
    pub date: NaiveDate,
}

/// A log entry joined with the cuisine and category of the eaten candidate
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumedMeal {
    pub candidate_id: Uuid,
    pub date_consumed: NaiveDate,
    pub cuisine: String,
    pub meal_category: MealCategory,
}
