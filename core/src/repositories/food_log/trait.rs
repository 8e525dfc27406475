//! Food log repository trait

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::entities::food_log::FoodLog;
use crate::errors::DomainError;

#[async_trait]
pub trait FoodLogRepository: Send + Sync {
    async fn create(&self, log: FoodLog) -> Result<FoodLog, DomainError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<FoodLog>, DomainError>;

    async fn update(&self, log: FoodLog) -> Result<FoodLog, DomainError>;

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Entries with `from <= log_date <= to`, ordered by `consumed_at`
    async fn list_by_date_range(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<FoodLog>, DomainError>;
}
