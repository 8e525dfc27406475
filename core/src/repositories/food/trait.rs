//! Food catalog repository trait

use async_trait::async_trait;
use uuid::Uuid;

use nl_shared::types::Pagination;

use crate::domain::entities::food::Food;
use crate::errors::DomainError;

#[async_trait]
pub trait FoodRepository: Send + Sync {
    async fn create(&self, food: Food) -> Result<Food, DomainError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Food>, DomainError>;

    async fn update(&self, food: Food) -> Result<Food, DomainError>;

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Shared catalog plus the user's own foods, ordered by name.
    /// `query` matches name or brand case-insensitively.
    async fn search(
        &self,
        user_id: Uuid,
        query: Option<&str>,
        pagination: &Pagination,
    ) -> Result<(Vec<Food>, u64), DomainError>;
}
