//! Food log entries and their summaries

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::domain::entities::food::Food;
use crate::domain::entities::food_log::{FoodLog, MealType};
use crate::domain::value_objects::Nutrients;
use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::repositories::{FoodLogRepository, FoodRepository};
use crate::services::profile::ProfileService;

use super::summary::{DailySummary, RangeSummary};

/// Upper bound for `servings` on one entry
pub const MAX_SERVINGS: f64 = 100.0;

/// Longest period, in days, a listing or range summary may cover
pub const MAX_RANGE_DAYS: i64 = 92;

const MAX_NOTES_LENGTH: usize = 1000;

/// A new entry, either from a food (`food_id`) or typed in manually
/// (`food_name` + per-serving `nutrients`)
#[derive(Debug, Clone)]
pub struct NewFoodLog {
    pub food_id: Option<Uuid>,
    pub food_name: Option<String>,
    pub nutrients: Option<Nutrients>,
    pub servings: Option<f64>,
    pub meal_type: MealType,
    pub consumed_at: Option<DateTime<Utc>>,
    pub log_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FoodLogChanges {
    pub food_id: Option<Uuid>,
    pub food_name: Option<String>,
    /// Per serving, manual entries only
    pub nutrients: Option<Nutrients>,
    pub servings: Option<f64>,
    pub meal_type: Option<MealType>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub log_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

pub struct FoodLogService {
    logs: Arc<dyn FoodLogRepository>,
    foods: Arc<dyn FoodRepository>,
    profiles: Arc<ProfileService>,
}

impl FoodLogService {
    pub fn new(logs: Arc<dyn FoodLogRepository>, foods: Arc<dyn FoodRepository>, profiles: Arc<ProfileService>) -> Self {
        Self { logs, foods, profiles }
    }

    pub async fn create(&self, user_id: Uuid, input: NewFoodLog) -> DomainResult<FoodLog> {
        let servings = input.servings.unwrap_or(1.0);
        validate_servings(servings)?;
        let notes = clean_notes(input.notes)?;

        let (food_id, food_name, per_serving) = match (input.food_id, input.food_name, input.nutrients) {
            (Some(food_id), None, None) => {
                let food = self.visible_food(user_id, food_id).await?;
                (Some(food.id), food.name, food.nutrients)
            }
            (None, Some(name), Some(nutrients)) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(ValidationError::RequiredField {
                        field: "food_name".into(),
                    }
                    .into());
                }
                validate_nutrients(&nutrients)?;
                (None, name, nutrients)
            }
            _ => {
                return Err(DomainError::validation(
                    "Provide either food_id or food_name with nutrients",
                ))
            }
        };

        let consumed_at = input.consumed_at.unwrap_or_else(Utc::now);
        let log_date = input.log_date.unwrap_or_else(|| consumed_at.date_naive());

        let log = FoodLog::new(
            user_id,
            food_id,
            food_name,
            input.meal_type,
            servings,
            per_serving,
            consumed_at,
            log_date,
            notes,
        );
        self.logs.create(log).await
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> DomainResult<FoodLog> {
        self.logs
            .find_by_id(id)
            .await?
            .filter(|l| l.user_id == user_id)
            .ok_or_else(|| DomainError::not_found("Food log"))
    }

    /// Applies `changes`, recomputing nutrients when the food or servings change
    pub async fn update(&self, user_id: Uuid, id: Uuid, changes: FoodLogChanges) -> DomainResult<FoodLog> {
        let mut log = self.get(user_id, id).await?;

        let servings = changes.servings.unwrap_or(log.servings);
        validate_servings(servings)?;

        if let Some(food_id) = changes.food_id {
            let food = self.visible_food(user_id, food_id).await?;
            log.food_id = Some(food.id);
            log.food_name = food.name;
            log.per_serving = food.nutrients;
        } else if let Some(nutrients) = changes.nutrients {
            if log.food_id.is_some() {
                return Err(DomainError::validation("Nutrients can only be edited on manual entries"));
            }
            validate_nutrients(&nutrients)?;
            log.per_serving = nutrients;
        }
        log.set_servings(servings);

        if let Some(name) = changes.food_name {
            if log.food_id.is_none() {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(ValidationError::RequiredField {
                        field: "food_name".into(),
                    }
                    .into());
                }
                log.food_name = name;
            }
        }
        if let Some(meal_type) = changes.meal_type {
            log.meal_type = meal_type;
        }
        if let Some(consumed_at) = changes.consumed_at {
            log.consumed_at = consumed_at;
            if changes.log_date.is_none() {
                log.log_date = consumed_at.date_naive();
            }
        }
        if let Some(log_date) = changes.log_date {
            log.log_date = log_date;
        }
        if changes.notes.is_some() {
            log.notes = clean_notes(changes.notes)?;
        }
        log.updated_at = Utc::now();

        self.logs.update(log).await
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> DomainResult<()> {
        let log = self.get(user_id, id).await?;
        self.logs.delete(log.id).await?;
        Ok(())
    }

    /// Entries with `from <= log_date <= to`, in the order they were eaten
    pub async fn list(&self, user_id: Uuid, from: NaiveDate, to: NaiveDate) -> DomainResult<Vec<FoodLog>> {
        validate_range(from, to)?;
        self.logs.list_by_date_range(user_id, from, to).await
    }

    pub async fn daily_summary(&self, user_id: Uuid, date: NaiveDate) -> DomainResult<DailySummary> {
        let logs = self.logs.list_by_date_range(user_id, date, date).await?;

        let targets = match self.profiles.targets(user_id).await {
            Ok(targets) => Some(targets),
            Err(DomainError::NotFound { .. })
            | Err(DomainError::ValidationErr(ValidationError::InsufficientProfileData { .. })) => {
                debug!(%user_id, "No nutrition targets available for daily summary");
                None
            }
            Err(e) => return Err(e),
        };

        Ok(DailySummary::build(date, &logs, targets))
    }

    pub async fn range_summary(&self, user_id: Uuid, from: NaiveDate, to: NaiveDate) -> DomainResult<RangeSummary> {
        let logs = self.list(user_id, from, to).await?;
        Ok(RangeSummary::build(from, to, &logs))
    }

    async fn visible_food(&self, user_id: Uuid, food_id: Uuid) -> DomainResult<Food> {
        self.foods
            .find_by_id(food_id)
            .await?
            .filter(|f| f.is_visible_to(user_id))
            .ok_or_else(|| DomainError::not_found("Food"))
    }
}

fn validate_servings(servings: f64) -> DomainResult<()> {
    if servings.is_finite() && servings > 0.0 && servings <= MAX_SERVINGS {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: "servings".into(),
            min: "0".into(),
            max: MAX_SERVINGS.to_string(),
        }
        .into())
    }
}

fn validate_nutrients(nutrients: &Nutrients) -> DomainResult<()> {
    if nutrients.is_valid() {
        Ok(())
    } else {
        Err(ValidationError::InvalidFormat {
            field: "nutrients".into(),
        }
        .into())
    }
}

fn validate_range(from: NaiveDate, to: NaiveDate) -> DomainResult<()> {
    if from > to {
        return Err(ValidationError::InvalidDate {
            reason: "from must not be after to".into(),
        }
        .into());
    }
    if (to - from).num_days() + 1 > MAX_RANGE_DAYS {
        return Err(ValidationError::InvalidDate {
            reason: format!("range cannot exceed {} days", MAX_RANGE_DAYS),
        }
        .into());
    }
    Ok(())
}

fn clean_notes(notes: Option<String>) -> DomainResult<Option<String>> {
    let notes = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    if notes.as_ref().map_or(false, |n| n.chars().count() > MAX_NOTES_LENGTH) {
        return Err(ValidationError::OutOfRange {
            field: "notes".into(),
            min: "0".into(),
            max: format!("{} characters", MAX_NOTES_LENGTH),
        }
        .into());
    }
    Ok(notes)
}
