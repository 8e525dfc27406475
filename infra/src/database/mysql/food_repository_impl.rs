//! MySQL implementation of the FoodRepository trait.

use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use uuid::Uuid;

use nl_core::domain::entities::food::Food;
use nl_core::errors::DomainError;
use nl_core::repositories::FoodRepository;
use nl_shared::types::Pagination;

use super::{get, get_nutrients, get_optional_uuid, get_uuid, like_pattern, NUTRIENT_COLUMNS};
use crate::database::map_sqlx_error;

/// Shared catalog rows (`owner_id IS NULL`) plus the caller's own foods
const VISIBLE_CLAUSE: &str = "(owner_id IS NULL OR owner_id = ?) \
     AND (? IS NULL OR LOWER(name) LIKE ? OR LOWER(brand) LIKE ?)";

pub struct MySqlFoodRepository {
    pool: MySqlPool,
}

impl MySqlFoodRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn columns() -> String {
        format!(
            "id, owner_id, name, brand, serving_size, serving_unit, {}, barcode, created_at, updated_at",
            NUTRIENT_COLUMNS
        )
    }

    fn row_to_food(row: &MySqlRow) -> Result<Food, DomainError> {
        Ok(Food {
            id: get_uuid(row, "id")?,
            owner_id: get_optional_uuid(row, "owner_id")?,
            name: get(row, "name")?,
            brand: get(row, "brand")?,
            serving_size: get(row, "serving_size")?,
            serving_unit: get(row, "serving_unit")?,
            nutrients: get_nutrients(row)?,
            barcode: get(row, "barcode")?,
            created_at: get(row, "created_at")?,
            updated_at: get(row, "updated_at")?,
        })
    }
}

#[async_trait]
impl FoodRepository for MySqlFoodRepository {
    async fn create(&self, food: Food) -> Result<Food, DomainError> {
        let query = format!(
            "INSERT INTO foods ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            Self::columns()
        );

        let n = &food.nutrients;
        sqlx::query(&query)
            .bind(food.id.to_string())
            .bind(food.owner_id.map(|id| id.to_string()))
            .bind(&food.name)
            .bind(&food.brand)
            .bind(food.serving_size)
            .bind(&food.serving_unit)
            .bind(n.calories)
            .bind(n.protein_g)
            .bind(n.carbohydrates_g)
            .bind(n.fat_g)
            .bind(n.fiber_g)
            .bind(n.sugar_g)
            .bind(n.sodium_mg)
            .bind(&food.barcode)
            .bind(food.created_at)
            .bind(food.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("create food", e))?;

        Ok(food)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Food>, DomainError> {
        let query = format!("SELECT {} FROM foods WHERE id = ? LIMIT 1", Self::columns());

        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find food", e))?;

        row.as_ref().map(Self::row_to_food).transpose()
    }

    async fn update(&self, food: Food) -> Result<Food, DomainError> {
        let query = r#"
            UPDATE foods
            SET name = ?, brand = ?, serving_size = ?, serving_unit = ?,
                calories = ?, protein_g = ?, carbohydrates_g = ?, fat_g = ?,
                fiber_g = ?, sugar_g = ?, sodium_mg = ?, barcode = ?, updated_at = ?
            WHERE id = ?
        "#;

        let n = &food.nutrients;
        let result = sqlx::query(query)
            .bind(&food.name)
            .bind(&food.brand)
            .bind(food.serving_size)
            .bind(&food.serving_unit)
            .bind(n.calories)
            .bind(n.protein_g)
            .bind(n.carbohydrates_g)
            .bind(n.fat_g)
            .bind(n.fiber_g)
            .bind(n.sugar_g)
            .bind(n.sodium_mg)
            .bind(&food.barcode)
            .bind(food.updated_at)
            .bind(food.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update food", e))?;

        if result.rows_affected() == 0 && self.find_by_id(food.id).await?.is_none() {
            return Err(DomainError::not_found("Food"));
        }

        Ok(food)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM foods WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete food", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn search(
        &self,
        user_id: Uuid,
        query: Option<&str>,
        pagination: &Pagination,
    ) -> Result<(Vec<Food>, u64), DomainError> {
        let user = user_id.to_string();
        let pattern = query.map(like_pattern);

        let count_query = format!("SELECT COUNT(*) AS total FROM foods WHERE {}", VISIBLE_CLAUSE);
        let count_row = sqlx::query(&count_query)
            .bind(&user)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("count foods", e))?;
        let total: i64 = get(&count_row, "total")?;

        let page_query = format!(
            "SELECT {} FROM foods WHERE {} ORDER BY LOWER(name) ASC LIMIT ? OFFSET ?",
            Self::columns(),
            VISIBLE_CLAUSE
        );
        let rows = sqlx::query(&page_query)
            .bind(&user)
            .bind(&pattern)
            .bind(&pattern)
            .bind(&pattern)
            .bind(pagination.limit_i64())
            .bind(pagination.offset_i64())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("search foods", e))?;

        let foods = rows.iter().map(Self::row_to_food).collect::<Result<Vec<_>, _>>()?;
        Ok((foods, total.max(0) as u64))
    }
}
