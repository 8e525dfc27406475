//! Health metric repository trait

use async_trait::async_trait;
use uuid::Uuid;

use nl_shared::types::Pagination;

use crate::domain::entities::health_metric::{HealthMetric, MetricFilter, MetricType};
use crate::errors::DomainError;

/// Persistence for health measurements
#[async_trait]
pub trait HealthMetricRepository: Send + Sync {
    async fn create(&self, metric: HealthMetric) -> Result<HealthMetric, DomainError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<HealthMetric>, DomainError>;

    async fn update(&self, metric: HealthMetric) -> Result<HealthMetric, DomainError>;

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;

    /// One page of a user's metrics, newest first, plus the total count
    async fn list(
        &self,
        user_id: Uuid,
        filter: &MetricFilter,
        pagination: &Pagination,
    ) -> Result<(Vec<HealthMetric>, u64), DomainError>;

    /// Every matching metric, oldest first
    async fn list_all(&self, user_id: Uuid, filter: &MetricFilter) -> Result<Vec<HealthMetric>, DomainError>;

    /// Most recent measurement of a type
    async fn latest_by_type(
        &self,
        user_id: Uuid,
        metric_type: MetricType,
    ) -> Result<Option<HealthMetric>, DomainError>;
}
