//! In-memory implementation of FoodLogRepository

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::food_log::FoodLog;
use crate::errors::DomainError;

use super::trait_::FoodLogRepository;

#[derive(Default)]
pub struct InMemoryFoodLogRepository {
    logs: Arc<RwLock<HashMap<Uuid, FoodLog>>>,
}

impl InMemoryFoodLogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FoodLogRepository for InMemoryFoodLogRepository {
    async fn create(&self, log: FoodLog) -> Result<FoodLog, DomainError> {
        self.logs.write().await.insert(log.id, log.clone());
        Ok(log)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<FoodLog>, DomainError> {
        Ok(self.logs.read().await.get(&id).cloned())
    }

    async fn update(&self, log: FoodLog) -> Result<FoodLog, DomainError> {
        let mut logs = self.logs.write().await;
        if !logs.contains_key(&log.id) {
            return Err(DomainError::not_found("Food log"));
        }
        logs.insert(log.id, log.clone());
        Ok(log)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.logs.write().await.remove(&id).is_some())
    }

    async fn list_by_date_range(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<FoodLog>, DomainError> {
        let logs = self.logs.read().await;
        let mut result: Vec<FoodLog> = logs
            .values()
            .filter(|l| l.user_id == user_id && l.log_date >= from && l.log_date <= to)
            .cloned()
            .collect();
        result.sort_by_key(|l| l.consumed_at);
        Ok(result)
    }
}
