//! In-memory implementation of HealthMetricRepository

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use nl_shared::types::Pagination;

use crate::domain::entities::health_metric::{HealthMetric, MetricFilter, MetricType};
use crate::errors::DomainError;

use super::trait_::HealthMetricRepository;

#[derive(Default)]
pub struct InMemoryHealthMetricRepository {
    metrics: Arc<RwLock<HashMap<Uuid, HealthMetric>>>,
}

impl InMemoryHealthMetricRepository {
    pub fn new() -> Self {
        Self::default()
    }

    async fn matching(&self, user_id: Uuid, filter: &MetricFilter) -> Vec<HealthMetric> {
        let metrics = self.metrics.read().await;
        let mut result: Vec<HealthMetric> = metrics
            .values()
            .filter(|m| m.user_id == user_id && filter.matches(m))
            .cloned()
            .collect();
        result.sort_by_key(|m| m.recorded_at);
        result
    }
}

#[async_trait]
impl HealthMetricRepository for InMemoryHealthMetricRepository {
    async fn create(&self, metric: HealthMetric) -> Result<HealthMetric, DomainError> {
        self.metrics.write().await.insert(metric.id, metric.clone());
        Ok(metric)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<HealthMetric>, DomainError> {
        Ok(self.metrics.read().await.get(&id).cloned())
    }

    async fn update(&self, metric: HealthMetric) -> Result<HealthMetric, DomainError> {
        let mut metrics = self.metrics.write().await;
        if !metrics.contains_key(&metric.id) {
            return Err(DomainError::not_found("Health metric"));
        }
        metrics.insert(metric.id, metric.clone());
        Ok(metric)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.metrics.write().await.remove(&id).is_some())
    }

    async fn list(
        &self,
        user_id: Uuid,
        filter: &MetricFilter,
        pagination: &Pagination,
    ) -> Result<(Vec<HealthMetric>, u64), DomainError> {
        let mut all = self.matching(user_id, filter).await;
        all.reverse();
        let total = all.len() as u64;
        let page = all
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .collect();
        Ok((page, total))
    }

    async fn list_all(&self, user_id: Uuid, filter: &MetricFilter) -> Result<Vec<HealthMetric>, DomainError> {
        Ok(self.matching(user_id, filter).await)
    }

    async fn latest_by_type(
        &self,
        user_id: Uuid,
        metric_type: MetricType,
    ) -> Result<Option<HealthMetric>, DomainError> {
        let metrics = self.metrics.read().await;
        Ok(metrics
            .values()
            .filter(|m| m.user_id == user_id && m.metric_type == metric_type)
            .max_by_key(|m| m.recorded_at)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_list_is_newest_first_and_paginated() {
        let repo = InMemoryHealthMetricRepository::new();
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        for i in 0..5 {
            let metric = HealthMetric::new(user_id, MetricType::Weight, 70.0 + i as f64, now - Duration::days(i), None);
            repo.create(metric).await.unwrap();
        }

        let (page, total) = repo
            .list(user_id, &MetricFilter::default(), &Pagination::new(1, 2))
            .await
            .unwrap();

        assert_eq!(total, 5);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].value, 70.0);
        assert_eq!(page[1].value, 71.0);
    }

    #[tokio::test]
    async fn test_latest_by_type_ignores_other_users() {
        let repo = InMemoryHealthMetricRepository::new();
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        repo.create(HealthMetric::new(user_id, MetricType::Weight, 80.0, now - Duration::days(1), None))
            .await
            .unwrap();
        repo.create(HealthMetric::new(Uuid::new_v4(), MetricType::Weight, 60.0, now, None))
            .await
            .unwrap();

        let latest = repo.latest_by_type(user_id, MetricType::Weight).await.unwrap().unwrap();
        assert_eq!(latest.value, 80.0);
    }
}
