//! Food catalog, food logging and nutrient summaries

mod food_log_service;
mod food_service;
mod summary;

#[cfg(test)]
mod tests;

pub use food_log_service::{FoodLogChanges, FoodLogService, NewFoodLog, MAX_RANGE_DAYS, MAX_SERVINGS};
pub use food_service::{FoodService, NewFood};
pub use summary::{DailySummary, DaySummary, MealSummary, RangeSummary, RemainingTargets};
