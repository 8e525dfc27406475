//! MySQL repository implementations
//!
//! Ids are stored as `CHAR(36)` strings, enums as their snake_case names,
//! string lists and nutrient snapshots as JSON text.

mod food_log_repository_impl;
mod food_repository_impl;
mod health_metric_repository_impl;
mod profile_repository_impl;
mod session_repository_impl;
mod token_repository_impl;
mod user_repository_impl;

pub use food_log_repository_impl::MySqlFoodLogRepository;
pub use food_repository_impl::MySqlFoodRepository;
pub use health_metric_repository_impl::MySqlHealthMetricRepository;
pub use profile_repository_impl::MySqlProfileRepository;
pub use session_repository_impl::MySqlSessionRepository;
pub use token_repository_impl::MySqlTokenRepository;
pub use user_repository_impl::MySqlUserRepository;

use std::str::FromStr;

use sqlx::mysql::MySqlRow;
use sqlx::{MySql, Row};
use uuid::Uuid;

use nl_core::domain::value_objects::Nutrients;
use nl_core::errors::DomainError;

/// Read a column, mapping decode failures to `DomainError::Internal`
pub(crate) fn get<'r, T>(row: &'r MySqlRow, column: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, MySql> + sqlx::Type<MySql>,
{
    row.try_get(column)
        .map_err(|e| DomainError::internal(format!("Failed to get {}: {}", column, e)))
}

pub(crate) fn get_uuid(row: &MySqlRow, column: &str) -> Result<Uuid, DomainError> {
    let raw: String = get(row, column)?;
    Uuid::parse_str(&raw).map_err(|e| DomainError::internal(format!("Invalid UUID in {}: {}", column, e)))
}

pub(crate) fn get_optional_uuid(row: &MySqlRow, column: &str) -> Result<Option<Uuid>, DomainError> {
    let raw: Option<String> = get(row, column)?;
    raw.map(|s| Uuid::parse_str(&s))
        .transpose()
        .map_err(|e| DomainError::internal(format!("Invalid UUID in {}: {}", column, e)))
}

/// Parse a text column into one of the domain's string enums
pub(crate) fn get_enum<T>(row: &MySqlRow, column: &str) -> Result<T, DomainError>
where
    T: FromStr<Err = String>,
{
    let raw: String = get(row, column)?;
    raw.parse().map_err(DomainError::internal)
}

pub(crate) fn get_optional_enum<T>(row: &MySqlRow, column: &str) -> Result<Option<T>, DomainError>
where
    T: FromStr<Err = String>,
{
    let raw: Option<String> = get(row, column)?;
    raw.map(|s| s.parse()).transpose().map_err(DomainError::internal)
}

pub(crate) fn get_string_list(row: &MySqlRow, column: &str) -> Result<Vec<String>, DomainError> {
    let raw: Option<String> = get(row, column)?;
    match raw {
        Some(json) if !json.is_empty() => serde_json::from_str(&json)
            .map_err(|e| DomainError::internal(format!("Invalid JSON in {}: {}", column, e))),
        _ => Ok(Vec::new()),
    }
}

pub(crate) fn encode_string_list(values: &[String]) -> Result<String, DomainError> {
    serde_json::to_string(values).map_err(|e| DomainError::internal(format!("Failed to encode list: {}", e)))
}

/// Nutrient columns shared by `foods` and `food_logs`
pub(crate) const NUTRIENT_COLUMNS: &str = "calories, protein_g, carbohydrates_g, fat_g, fiber_g, sugar_g, sodium_mg";

pub(crate) fn get_nutrients(row: &MySqlRow) -> Result<Nutrients, DomainError> {
    Ok(Nutrients {
        calories: get(row, "calories")?,
        protein_g: get(row, "protein_g")?,
        carbohydrates_g: get(row, "carbohydrates_g")?,
        fat_g: get(row, "fat_g")?,
        fiber_g: get(row, "fiber_g")?,
        sugar_g: get(row, "sugar_g")?,
        sodium_mg: get(row, "sodium_mg")?,
    })
}

pub(crate) fn get_json_nutrients(row: &MySqlRow, column: &str) -> Result<Nutrients, DomainError> {
    let raw: String = get(row, column)?;
    serde_json::from_str(&raw).map_err(|e| DomainError::internal(format!("Invalid JSON in {}: {}", column, e)))
}

pub(crate) fn encode_nutrients(nutrients: &Nutrients) -> Result<String, DomainError> {
    serde_json::to_string(nutrients).map_err(|e| DomainError::internal(format!("Failed to encode nutrients: {}", e)))
}

/// Escape `%`, `_` and `\` for use inside a LIKE pattern
pub(crate) fn like_pattern(query: &str) -> String {
    let escaped = query
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
