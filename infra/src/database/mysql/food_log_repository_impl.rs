//! MySQL implementation of the FoodLogRepository trait.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use uuid::Uuid;

use nl_core::domain::entities::food_log::FoodLog;
use nl_core::errors::DomainError;
use nl_core::repositories::FoodLogRepository;

use super::{
    encode_nutrients, get, get_enum, get_json_nutrients, get_nutrients, get_optional_uuid, get_uuid, NUTRIENT_COLUMNS,
};
use crate::database::map_sqlx_error;

pub struct MySqlFoodLogRepository {
    pool: MySqlPool,
}

impl MySqlFoodLogRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn columns() -> String {
        format!(
            "id, user_id, food_id, food_name, meal_type, servings, per_serving, {}, consumed_at, log_date, \
             notes, created_at, updated_at",
            NUTRIENT_COLUMNS
        )
    }

    fn row_to_log(row: &MySqlRow) -> Result<FoodLog, DomainError> {
        Ok(FoodLog {
            id: get_uuid(row, "id")?,
            user_id: get_uuid(row, "user_id")?,
            food_id: get_optional_uuid(row, "food_id")?,
            food_name: get(row, "food_name")?,
            meal_type: get_enum(row, "meal_type")?,
            servings: get(row, "servings")?,
            per_serving: get_json_nutrients(row, "per_serving")?,
            nutrients: get_nutrients(row)?,
            consumed_at: get(row, "consumed_at")?,
            log_date: get(row, "log_date")?,
            notes: get(row, "notes")?,
            created_at: get(row, "created_at")?,
            updated_at: get(row, "updated_at")?,
        })
    }
}

#[async_trait]
impl FoodLogRepository for MySqlFoodLogRepository {
    async fn create(&self, log: FoodLog) -> Result<FoodLog, DomainError> {
        let query = format!(
            "INSERT INTO food_logs ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            Self::columns()
        );

        let n = &log.nutrients;
        sqlx::query(&query)
            .bind(log.id.to_string())
            .bind(log.user_id.to_string())
            .bind(log.food_id.map(|id| id.to_string()))
            .bind(&log.food_name)
            .bind(log.meal_type.as_str())
            .bind(log.servings)
            .bind(encode_nutrients(&log.per_serving)?)
            .bind(n.calories)
            .bind(n.protein_g)
            .bind(n.carbohydrates_g)
            .bind(n.fat_g)
            .bind(n.fiber_g)
            .bind(n.sugar_g)
            .bind(n.sodium_mg)
            .bind(log.consumed_at)
            .bind(log.log_date)
            .bind(&log.notes)
            .bind(log.created_at)
            .bind(log.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("create food log", e))?;

        Ok(log)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<FoodLog>, DomainError> {
        let query = format!("SELECT {} FROM food_logs WHERE id = ? LIMIT 1", Self::columns());

        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find food log", e))?;

        row.as_ref().map(Self::row_to_log).transpose()
    }

    async fn update(&self, log: FoodLog) -> Result<FoodLog, DomainError> {
        let query = r#"
            UPDATE food_logs
            SET food_id = ?, food_name = ?, meal_type = ?, servings = ?, per_serving = ?,
                calories = ?, protein_g = ?, carbohydrates_g = ?, fat_g = ?,
                fiber_g = ?, sugar_g = ?, sodium_mg = ?,
                consumed_at = ?, log_date = ?, notes = ?, updated_at = ?
            WHERE id = ?
        "#;

        let n = &log.nutrients;
        let result = sqlx::query(query)
            .bind(log.food_id.map(|id| id.to_string()))
            .bind(&log.food_name)
            .bind(log.meal_type.as_str())
            .bind(log.servings)
            .bind(encode_nutrients(&log.per_serving)?)
            .bind(n.calories)
            .bind(n.protein_g)
            .bind(n.carbohydrates_g)
            .bind(n.fat_g)
            .bind(n.fiber_g)
            .bind(n.sugar_g)
            .bind(n.sodium_mg)
            .bind(log.consumed_at)
            .bind(log.log_date)
            .bind(&log.notes)
            .bind(log.updated_at)
            .bind(log.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update food log", e))?;

        if result.rows_affected() == 0 && self.find_by_id(log.id).await?.is_none() {
            return Err(DomainError::not_found("Food log"));
        }

        Ok(log)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM food_logs WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete food log", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_date_range(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<FoodLog>, DomainError> {
        let query = format!(
            "SELECT {} FROM food_logs WHERE user_id = ? AND log_date BETWEEN ? AND ? ORDER BY consumed_at ASC",
            Self::columns()
        );

        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list food logs", e))?;

        rows.iter().map(Self::row_to_log).collect()
    }
}
