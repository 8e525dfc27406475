//! Food log entries (what a user ate, when, and how much).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::Nutrients;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

str_enum!(MealType {
    Breakfast => "breakfast",
    Lunch => "lunch",
    Dinner => "dinner",
    Snack => "snack",
});

impl MealType {
    pub const ALL: [MealType; 4] = [MealType::Breakfast, MealType::Lunch, MealType::Dinner, MealType::Snack];
}

/// A logged food. `per_serving` is a snapshot taken when the entry was made,
/// so later catalog edits do not rewrite history; `nutrients` holds the
/// rounded totals for `servings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub food_id: Option<Uuid>,
    pub food_name: String,
    pub meal_type: MealType,
    pub servings: f64,
    pub per_serving: Nutrients,
    pub nutrients: Nutrients,
    pub consumed_at: DateTime<Utc>,
    pub log_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FoodLog {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: Uuid,
        food_id: Option<Uuid>,
        food_name: String,
        meal_type: MealType,
        servings: f64,
        per_serving: Nutrients,
        consumed_at: DateTime<Utc>,
        log_date: NaiveDate,
        notes: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            food_id,
            food_name,
            meal_type,
            servings,
            nutrients: per_serving.scale(servings).rounded(),
            per_serving,
            consumed_at,
            log_date,
            notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the serving count and recomputes the totals from the snapshot
    pub fn set_servings(&mut self, servings: f64) {
        self.servings = servings;
        self.nutrients = self.per_serving.scale(servings).rounded();
    }
}
