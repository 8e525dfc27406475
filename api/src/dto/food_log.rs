use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use nl_core::domain::entities::food_log::MealType;
use nl_core::domain::value_objects::Nutrients;
use nl_core::services::nutrition::{FoodLogChanges, NewFoodLog};

use crate::handlers::ApiError;

/// Body of `POST /api/v1/food-logs`.
///
/// Either `food_id` (with optional `servings`) or `food_name` with
/// `nutrients` for a manual entry.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFoodLogRequest {
    pub food_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200, message = "Food name must be 1 to 200 characters"))]
    pub food_name: Option<String>,
    pub nutrients: Option<Nutrients>,
    pub servings: Option<f64>,
    pub meal_type: MealType,
    pub consumed_at: Option<DateTime<Utc>>,
    pub log_date: Option<NaiveDate>,
    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

impl From<CreateFoodLogRequest> for NewFoodLog {
    fn from(request: CreateFoodLogRequest) -> Self {
        NewFoodLog {
            food_id: request.food_id,
            food_name: request.food_name,
            nutrients: request.nutrients,
            servings: request.servings,
            meal_type: request.meal_type,
            consumed_at: request.consumed_at,
            log_date: request.log_date,
            notes: request.notes,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateFoodLogRequest {
    pub food_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200, message = "Food name must be 1 to 200 characters"))]
    pub food_name: Option<String>,
    pub nutrients: Option<Nutrients>,
    pub servings: Option<f64>,
    pub meal_type: Option<MealType>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub log_date: Option<NaiveDate>,
    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

impl From<UpdateFoodLogRequest> for FoodLogChanges {
    fn from(request: UpdateFoodLogRequest) -> Self {
        FoodLogChanges {
            food_id: request.food_id,
            food_name: request.food_name,
            nutrients: request.nutrients,
            servings: request.servings,
            meal_type: request.meal_type,
            consumed_at: request.consumed_at,
            log_date: request.log_date,
            notes: request.notes,
        }
    }
}

/// `GET /api/v1/food-logs`: a single `date` or a `from`/`to` range
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FoodLogListQuery {
    pub date: Option<NaiveDate>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl FoodLogListQuery {
    /// Inclusive date range to list, today (UTC) when nothing is given
    pub fn range(&self) -> Result<(NaiveDate, NaiveDate), ApiError> {
        match (self.date, self.from, self.to) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                Err(ApiError::validation("Use either date or from/to, not both"))
            }
            (Some(date), None, None) => Ok((date, date)),
            (None, Some(from), Some(to)) => Ok((from, to)),
            (None, Some(_), None) | (None, None, Some(_)) => {
                Err(ApiError::validation("Both from and to are required for a range"))
            }
            (None, None, None) => {
                let today = Utc::now().date_naive();
                Ok((today, today))
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailySummaryQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RangeSummaryQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_list_range_defaults_to_today() {
        let (from, to) = FoodLogListQuery::default().range().unwrap();
        assert_eq!(from, Utc::now().date_naive());
        assert_eq!(from, to);
    }

    #[test]
    fn test_list_range_from_to() {
        let query = FoodLogListQuery {
            from: Some(date("2024-03-01")),
            to: Some(date("2024-03-07")),
            ..Default::default()
        };
        assert_eq!(query.range().unwrap(), (date("2024-03-01"), date("2024-03-07")));
    }

    #[test]
    fn test_list_range_rejects_half_open_and_mixed() {
        let half = FoodLogListQuery {
            from: Some(date("2024-03-01")),
            ..Default::default()
        };
        assert!(half.range().is_err());

        let mixed = FoodLogListQuery {
            date: Some(date("2024-03-01")),
            to: Some(date("2024-03-02")),
            ..Default::default()
        };
        assert!(mixed.range().is_err());
    }
}
