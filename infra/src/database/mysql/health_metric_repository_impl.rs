//! MySQL implementation of the HealthMetricRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::query::Query;
use sqlx::{MySql, MySqlPool};
use uuid::Uuid;

use nl_core::domain::entities::health_metric::{HealthMetric, MetricFilter, MetricType};
use nl_core::errors::DomainError;
use nl_core::repositories::HealthMetricRepository;
use nl_shared::types::Pagination;

use super::{get, get_enum, get_uuid};
use crate::database::map_sqlx_error;

const METRIC_COLUMNS: &str =
    "id, user_id, metric_type, value, unit, recorded_at, notes, created_at, updated_at";

/// Optional filters are bound as `(? IS NULL OR column ...)` pairs so one
/// statement covers every combination
const FILTER_CLAUSE: &str = "user_id = ? \
     AND (? IS NULL OR metric_type = ?) \
     AND (? IS NULL OR recorded_at >= ?) \
     AND (? IS NULL OR recorded_at <= ?)";

pub struct MySqlHealthMetricRepository {
    pool: MySqlPool,
}

impl MySqlHealthMetricRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_metric(row: &MySqlRow) -> Result<HealthMetric, DomainError> {
        Ok(HealthMetric {
            id: get_uuid(row, "id")?,
            user_id: get_uuid(row, "user_id")?,
            metric_type: get_enum(row, "metric_type")?,
            value: get(row, "value")?,
            unit: get(row, "unit")?,
            recorded_at: get(row, "recorded_at")?,
            notes: get(row, "notes")?,
            created_at: get(row, "created_at")?,
            updated_at: get(row, "updated_at")?,
        })
    }

    fn bind_filter<'q>(
        query: Query<'q, MySql, MySqlArguments>,
        user_id: Uuid,
        filter: &MetricFilter,
    ) -> Query<'q, MySql, MySqlArguments> {
        let metric_type: Option<&'static str> = filter.metric_type.map(|t| t.as_str());
        let from: Option<DateTime<Utc>> = filter.from;
        let to: Option<DateTime<Utc>> = filter.to;
        query
            .bind(user_id.to_string())
            .bind(metric_type)
            .bind(metric_type)
            .bind(from)
            .bind(from)
            .bind(to)
            .bind(to)
    }
}

#[async_trait]
impl HealthMetricRepository for MySqlHealthMetricRepository {
    async fn create(&self, metric: HealthMetric) -> Result<HealthMetric, DomainError> {
        let query = format!(
            "INSERT INTO health_metrics ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            METRIC_COLUMNS
        );

        sqlx::query(&query)
            .bind(metric.id.to_string())
            .bind(metric.user_id.to_string())
            .bind(metric.metric_type.as_str())
            .bind(metric.value)
            .bind(&metric.unit)
            .bind(metric.recorded_at)
            .bind(&metric.notes)
            .bind(metric.created_at)
            .bind(metric.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("create health metric", e))?;

        Ok(metric)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<HealthMetric>, DomainError> {
        let query = format!("SELECT {} FROM health_metrics WHERE id = ? LIMIT 1", METRIC_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find health metric", e))?;

        row.as_ref().map(Self::row_to_metric).transpose()
    }

    async fn update(&self, metric: HealthMetric) -> Result<HealthMetric, DomainError> {
        let query = r#"
            UPDATE health_metrics
            SET value = ?, unit = ?, recorded_at = ?, notes = ?, updated_at = ?
            WHERE id = ?
        "#;

        let result = sqlx::query(query)
            .bind(metric.value)
            .bind(&metric.unit)
            .bind(metric.recorded_at)
            .bind(&metric.notes)
            .bind(metric.updated_at)
            .bind(metric.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update health metric", e))?;

        if result.rows_affected() == 0 && self.find_by_id(metric.id).await?.is_none() {
            return Err(DomainError::not_found("Health metric"));
        }

        Ok(metric)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM health_metrics WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete health metric", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(
        &self,
        user_id: Uuid,
        filter: &MetricFilter,
        pagination: &Pagination,
    ) -> Result<(Vec<HealthMetric>, u64), DomainError> {
        let count_query = format!("SELECT COUNT(*) AS total FROM health_metrics WHERE {}", FILTER_CLAUSE);
        let count_row = Self::bind_filter(sqlx::query(&count_query), user_id, filter)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("count health metrics", e))?;
        let total: i64 = get(&count_row, "total")?;

        let page_query = format!(
            "SELECT {} FROM health_metrics WHERE {} ORDER BY recorded_at DESC LIMIT ? OFFSET ?",
            METRIC_COLUMNS, FILTER_CLAUSE
        );
        let rows = Self::bind_filter(sqlx::query(&page_query), user_id, filter)
            .bind(pagination.limit_i64())
            .bind(pagination.offset_i64())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list health metrics", e))?;

        let metrics = rows.iter().map(Self::row_to_metric).collect::<Result<Vec<_>, _>>()?;
        Ok((metrics, total.max(0) as u64))
    }

    async fn list_all(&self, user_id: Uuid, filter: &MetricFilter) -> Result<Vec<HealthMetric>, DomainError> {
        let query = format!(
            "SELECT {} FROM health_metrics WHERE {} ORDER BY recorded_at ASC",
            METRIC_COLUMNS, FILTER_CLAUSE
        );

        let rows = Self::bind_filter(sqlx::query(&query), user_id, filter)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list health metrics", e))?;

        rows.iter().map(Self::row_to_metric).collect()
    }

    async fn latest_by_type(
        &self,
        user_id: Uuid,
        metric_type: MetricType,
    ) -> Result<Option<HealthMetric>, DomainError> {
        let query = format!(
            "SELECT {} FROM health_metrics WHERE user_id = ? AND metric_type = ? \
             ORDER BY recorded_at DESC LIMIT 1",
            METRIC_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(user_id.to_string())
            .bind(metric_type.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("find latest health metric", e))?;

        row.as_ref().map(Self::row_to_metric).transpose()
    }
}
