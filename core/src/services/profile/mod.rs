//! Nutrition profile management and daily target calculation

mod service;
mod targets;

#[cfg(test)]
mod tests;

pub use service::{ProfileService, ProfileUpdate};
pub use targets::{calculate_bmr, calculate_daily_targets, DailyTargets, TargetSource, MIN_BMR_KCAL};
