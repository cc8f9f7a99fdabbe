use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};
use std::collections::HashSet;
use std::str::FromStr;
use uuid::Uuid;

use super::{CandidateStore, ConsumptionStore, InteractionStore, ProfileStore};
use crate::{
    error::{AppError, AppResult},
    models::{
        Candidate, ConsumedMeal, ConsumptionLogEntry, DietTag, DietaryProfile, Interaction,
        NewCandidate, NewConsumptionLogEntry,
    },
};

/// Creates a PostgreSQL connection pool and brings the schema up to date
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

const CANDIDATE_COLUMNS: &str = "id, name, description, calories, meal_category, cuisine, diet, \
     ingredients, image_url, generated_prompt, generation_successful, created_at";

const INTERACTION_COLUMNS: &str =
    "id, user_id, candidate_id, user_liked, candidate_liked, created_at";

/// Postgres-backed implementation of every store trait
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct CandidateRow {
    id: Uuid,
    name: String,
    description: String,
    calories: i32,
    meal_category: String,
    cuisine: String,
    diet: String,
    ingredients: Vec<String>,
    image_url: Option<String>,
    generated_prompt: String,
    generation_successful: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<CandidateRow> for Candidate {
    type Error = AppError;

    fn try_from(row: CandidateRow) -> AppResult<Self> {
        Ok(Candidate {
            id: row.id,
            name: row.name,
            description: row.description,
            calories: u32::try_from(row.calories)
                .map_err(|_| AppError::Internal(format!("Negative calories on {}", row.id)))?,
            meal_category: parse_column(&row.meal_category)?,
            cuisine: row.cuisine,
            diet: parse_column(&row.diet)?,
            ingredients: row.ingredients,
            image_url: row.image_url,
            generated_prompt: row.generated_prompt,
            generation_successful: row.generation_successful,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct InteractionRow {
    id: Uuid,
    user_id: Uuid,
    candidate_id: Uuid,
    user_liked: bool,
    candidate_liked: bool,
    created_at: DateTime<Utc>,
}

impl From<InteractionRow> for Interaction {
    fn from(row: InteractionRow) -> Self {
        Interaction {
            id: row.id,
            user_id: row.user_id,
            candidate_id: row.candidate_id,
            user_liked: row.user_liked,
            candidate_liked: row.candidate_liked,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct ConsumptionRow {
    id: Uuid,
    user_id: Uuid,
    candidate_id: Uuid,
    date_consumed: NaiveDate,
    meal_category: String,
}

#[derive(FromRow)]
struct ConsumedMealRow {
    candidate_id: Uuid,
    date_consumed: NaiveDate,
    cuisine: String,
    meal_category: String,
}

#[derive(FromRow)]
struct ProfileRow {
    user_id: Uuid,
    diet: String,
    allergies: Vec<String>,
    daily_calorie_goal: i32,
    activity_level: String,
    favorite_cuisines: Vec<String>,
    profile_completed: bool,
}

impl TryFrom<ProfileRow> for DietaryProfile {
    type Error = AppError;

    fn try_from(row: ProfileRow) -> AppResult<Self> {
        Ok(DietaryProfile {
            user_id: row.user_id,
            diet: parse_column(&row.diet)?,
            allergies: row.allergies,
            daily_calorie_goal: u32::try_from(row.daily_calorie_goal).map_err(|_| {
                AppError::Internal(format!("Negative calorie goal for {}", row.user_id))
            })?,
            activity_level: parse_column(&row.activity_level)?,
            favorite_cuisines: row.favorite_cuisines,
            profile_completed: row.profile_completed,
        })
    }
}

/// Parses a text column holding one of our closed enumerations
fn parse_column<T: FromStr<Err = String>>(value: &str) -> AppResult<T> {
    value
        .parse()
        .map_err(|e| AppError::Internal(format!("Corrupt column value: {}", e)))
}

fn to_db_int(value: u32, field: &str) -> AppResult<i32> {
    i32::try_from(value).map_err(|_| AppError::InvalidInput(format!("{} is too large", field)))
}

#[async_trait]
impl CandidateStore for PgStore {
    async fn find_unseen(
        &self,
        diet: DietTag,
        exclude: &HashSet<Uuid>,
    ) -> AppResult<Vec<Candidate>> {
        let excluded: Vec<Uuid> = exclude.iter().copied().collect();

        let rows = sqlx::query_as::<_, CandidateRow>(&format!(
            r#"
            SELECT {CANDIDATE_COLUMNS}
            FROM food_candidates
            WHERE diet = $1 AND NOT (id = ANY($2))
            ORDER BY created_at, id
            "#
        ))
        .bind(diet.as_str())
        .bind(excluded)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Candidate::try_from).collect()
    }

    async fn insert(&self, candidate: NewCandidate) -> AppResult<Candidate> {
        let candidate = candidate.into_candidate();

        sqlx::query(
            r#"
            INSERT INTO food_candidates
                (id, name, description, calories, meal_category, cuisine, diet,
                 ingredients, image_url, generated_prompt, generation_successful, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(candidate.id)
        .bind(&candidate.name)
        .bind(&candidate.description)
        .bind(to_db_int(candidate.calories, "calories")?)
        .bind(candidate.meal_category.as_str())
        .bind(&candidate.cuisine)
        .bind(candidate.diet.as_str())
        .bind(&candidate.ingredients)
        .bind(&candidate.image_url)
        .bind(&candidate.generated_prompt)
        .bind(candidate.generation_successful)
        .bind(candidate.created_at)
        .execute(&self.pool)
        .await?;

        Ok(candidate)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Candidate>> {
        let row = sqlx::query_as::<_, CandidateRow>(&format!(
            "SELECT {CANDIDATE_COLUMNS} FROM food_candidates WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Candidate::try_from).transpose()
    }
}

#[async_trait]
impl InteractionStore for PgStore {
    async fn seen_candidate_ids(&self, user_id: Uuid) -> AppResult<HashSet<Uuid>> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT candidate_id FROM interactions WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(ids.into_iter().collect())
    }

    async fn upsert_decision(
        &self,
        user_id: Uuid,
        candidate_id: Uuid,
        liked: bool,
    ) -> AppResult<Interaction> {
        // A concurrent duplicate lands on the unique key and becomes an update
        let row = sqlx::query_as::<_, InteractionRow>(&format!(
            r#"
            INSERT INTO interactions (id, user_id, candidate_id, user_liked, candidate_liked, created_at)
            VALUES ($1, $2, $3, $4, FALSE, now())
            ON CONFLICT (user_id, candidate_id) DO UPDATE SET user_liked = EXCLUDED.user_liked
            RETURNING {INTERACTION_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(candidate_id)
        .bind(liked)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn set_candidate_decision(
        &self,
        interaction_id: Uuid,
        liked_back: bool,
    ) -> AppResult<Interaction> {
        let row = sqlx::query_as::<_, InteractionRow>(&format!(
            "UPDATE interactions SET candidate_liked = $2 \
             WHERE id = $1 AND user_liked \
             RETURNING {INTERACTION_COLUMNS}"
        ))
        .bind(interaction_id)
        .bind(liked_back)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            return Ok(row.into());
        }

        // passed in the meantime, or missing
        InteractionStore::get(self, interaction_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Interaction {}", interaction_id)))
    }

    async fn get(&self, interaction_id: Uuid) -> AppResult<Option<Interaction>> {
        let row = sqlx::query_as::<_, InteractionRow>(&format!(
            "SELECT {INTERACTION_COLUMNS} FROM interactions WHERE id = $1"
        ))
        .bind(interaction_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Interaction::from))
    }

    async fn mutual_matches(&self, user_id: Uuid) -> AppResult<Vec<Interaction>> {
        let rows = sqlx::query_as::<_, InteractionRow>(&format!(
            r#"
            SELECT {INTERACTION_COLUMNS}
            FROM interactions
            WHERE user_id = $1 AND user_liked AND candidate_liked
            ORDER BY created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Interaction::from).collect())
    }
}

#[async_trait]
impl ConsumptionStore for PgStore {
    async fn log_meal(&self, entry: NewConsumptionLogEntry) -> AppResult<ConsumptionLogEntry> {
        // The no-op update makes RETURNING yield the existing row on conflict
        let row = sqlx::query_as::<_, ConsumptionRow>(
            r#"
            INSERT INTO consumption_log (id, user_id, candidate_id, date_consumed, meal_category)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, candidate_id, date_consumed)
                DO UPDATE SET meal_category = consumption_log.meal_category
            RETURNING id, user_id, candidate_id, date_consumed, meal_category
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.user_id)
        .bind(entry.candidate_id)
        .bind(entry.date_consumed)
        .bind(entry.meal_category.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(ConsumptionLogEntry {
            id: row.id,
            user_id: row.user_id,
            candidate_id: row.candidate_id,
            date_consumed: row.date_consumed,
            meal_category: parse_column(&row.meal_category)?,
        })
    }

    async fn history_between(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<ConsumedMeal>> {
        let rows = sqlx::query_as::<_, ConsumedMealRow>(
            r#"
            SELECT l.candidate_id, l.date_consumed, c.cuisine, c.meal_category
            FROM consumption_log l
            JOIN food_candidates c ON c.id = l.candidate_id
            WHERE l.user_id = $1 AND l.date_consumed BETWEEN $2 AND $3
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(ConsumedMeal {
                    candidate_id: row.candidate_id,
                    date_consumed: row.date_consumed,
                    cuisine: row.cuisine,
                    meal_category: parse_column(&row.meal_category)?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn get_profile(&self, user_id: Uuid) -> AppResult<Option<DietaryProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT user_id, diet, allergies, daily_calorie_goal, activity_level,
                   favorite_cuisines, profile_completed
            FROM dietary_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(DietaryProfile::try_from).transpose()
    }

    async fn save_profile(&self, profile: DietaryProfile) -> AppResult<DietaryProfile> {
        sqlx::query(
            r#"
            INSERT INTO dietary_profiles
                (user_id, diet, allergies, daily_calorie_goal, activity_level,
                 favorite_cuisines, profile_completed, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, now())
            ON CONFLICT (user_id) DO UPDATE SET
                diet = EXCLUDED.diet,
                allergies = EXCLUDED.allergies,
                daily_calorie_goal = EXCLUDED.daily_calorie_goal,
                activity_level = EXCLUDED.activity_level,
                favorite_cuisines = EXCLUDED.favorite_cuisines,
                profile_completed = EXCLUDED.profile_completed,
                updated_at = now()
            "#,
        )
        .bind(profile.user_id)
        .bind(profile.diet.as_str())
        .bind(&profile.allergies)
        .bind(to_db_int(profile.daily_calorie_goal, "daily_calorie_goal")?)
        .bind(profile.activity_level.as_str())
        .bind(&profile.favorite_cuisines)
        .bind(profile.profile_completed)
        .execute(&self.pool)
        .await?;

        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MealCategory;

    fn candidate_row(calories: i32, meal_category: &str) -> CandidateRow {
        CandidateRow {
            id: Uuid::new_v4(),
            name: "Shakshuka".to_string(),
            description: "Eggs poached in tomato sauce".to_string(),
            calories,
            meal_category: meal_category.to_string(),
            cuisine: "Mediterranean".to_string(),
            diet: "vegetarian".to_string(),
            ingredients: vec!["eggs".to_string(), "tomatoes".to_string()],
            image_url: None,
            generated_prompt: String::new(),
            generation_successful: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_candidate_row_conversion() {
        let candidate = Candidate::try_from(candidate_row(430, "breakfast")).unwrap();
        assert_eq!(candidate.calories, 430);
        assert_eq!(candidate.meal_category, MealCategory::Breakfast);
        assert_eq!(candidate.diet, DietTag::Vegetarian);
    }

    #[test]
    fn test_candidate_row_rejects_unknown_category() {
        let result = Candidate::try_from(candidate_row(430, "brunch"));
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn test_candidate_row_rejects_negative_calories() {
        let result = Candidate::try_from(candidate_row(-5, "lunch"));
        assert!(result.is_err());
    }
}
