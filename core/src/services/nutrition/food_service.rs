use std::sync::Arc;

use chrono::Utc;
use nl_shared::{PaginatedResponse, Pagination};
use uuid::Uuid;

use crate::domain::entities::food::Food;
use crate::domain::value_objects::Nutrients;
use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::repositories::FoodRepository;

const MAX_NAME_LENGTH: usize = 200;

/// Fields of a custom food, used for create and full update
#[derive(Debug, Clone)]
pub struct NewFood {
    pub name: String,
    pub brand: Option<String>,
    pub serving_size: f64,
    pub serving_unit: String,
    /// Per serving
    pub nutrients: Nutrients,
    pub barcode: Option<String>,
}

impl NewFood {
    fn validate(&self) -> DomainResult<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::RequiredField { field: "name".into() }.into());
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(ValidationError::OutOfRange {
                field: "name".into(),
                min: "1".into(),
                max: format!("{} characters", MAX_NAME_LENGTH),
            }
            .into());
        }
        if !self.serving_size.is_finite() || self.serving_size <= 0.0 {
            return Err(ValidationError::InvalidFormat {
                field: "serving_size".into(),
            }
            .into());
        }
        if self.serving_unit.trim().is_empty() {
            return Err(ValidationError::RequiredField {
                field: "serving_unit".into(),
            }
            .into());
        }
        if !self.nutrients.is_valid() {
            return Err(ValidationError::InvalidFormat {
                field: "nutrients".into(),
            }
            .into());
        }
        Ok(())
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub struct FoodService {
    repository: Arc<dyn FoodRepository>,
}

impl FoodService {
    pub fn new(repository: Arc<dyn FoodRepository>) -> Self {
        Self { repository }
    }

    /// Shared catalog plus the user's own foods, filtered by `query`
    pub async fn search(
        &self,
        user_id: Uuid,
        query: Option<&str>,
        pagination: Pagination,
    ) -> DomainResult<PaginatedResponse<Food>> {
        let pagination = pagination.validate();
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        let (foods, total) = self.repository.search(user_id, query, &pagination).await?;
        Ok(PaginatedResponse::new(foods, pagination, total))
    }

    pub async fn create(&self, user_id: Uuid, input: NewFood) -> DomainResult<Food> {
        input.validate()?;

        let mut food = Food::new(
            Some(user_id),
            input.name.trim().to_string(),
            trimmed(input.brand),
            input.serving_size,
            input.serving_unit.trim().to_string(),
            input.nutrients,
        );
        food.barcode = trimmed(input.barcode);

        self.repository.create(food).await
    }

    /// A food the user may see: shared or their own
    pub async fn get(&self, user_id: Uuid, id: Uuid) -> DomainResult<Food> {
        self.repository
            .find_by_id(id)
            .await?
            .filter(|f| f.is_visible_to(user_id))
            .ok_or_else(|| DomainError::not_found("Food"))
    }

    pub async fn update(&self, user_id: Uuid, id: Uuid, input: NewFood) -> DomainResult<Food> {
        let mut food = self.owned(user_id, id).await?;
        input.validate()?;

        food.name = input.name.trim().to_string();
        food.brand = trimmed(input.brand);
        food.serving_size = input.serving_size;
        food.serving_unit = input.serving_unit.trim().to_string();
        food.nutrients = input.nutrients;
        food.barcode = trimmed(input.barcode);
        food.updated_at = Utc::now();

        self.repository.update(food).await
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> DomainResult<()> {
        let food = self.owned(user_id, id).await?;
        self.repository.delete(food.id).await?;
        Ok(())
    }

    /// Shared catalog entries are visible but read-only
    async fn owned(&self, user_id: Uuid, id: Uuid) -> DomainResult<Food> {
        let food = self.get(user_id, id).await?;
        if !food.is_owned_by(user_id) {
            return Err(DomainError::Forbidden {
                message: "Catalog foods cannot be modified".into(),
            });
        }
        Ok(food)
    }
}
