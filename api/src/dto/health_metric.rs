use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use nl_core::domain::entities::health_metric::{MetricFilter, MetricType};
use nl_core::services::health::{MetricChanges, NewMetric};
use nl_shared::types::Pagination;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMetricRequest {
    pub metric_type: MetricType,
    pub value: f64,
    /// Defaults to now
    pub recorded_at: Option<DateTime<Utc>>,
    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

impl From<CreateMetricRequest> for NewMetric {
    fn from(request: CreateMetricRequest) -> Self {
        NewMetric {
            metric_type: request.metric_type,
            value: request.value,
            recorded_at: request.recorded_at,
            notes: request.notes,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateMetricRequest {
    pub value: Option<f64>,
    pub recorded_at: Option<DateTime<Utc>>,
    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

impl From<UpdateMetricRequest> for MetricChanges {
    fn from(request: UpdateMetricRequest) -> Self {
        MetricChanges {
            value: request.value,
            recorded_at: request.recorded_at,
            notes: request.notes,
        }
    }
}

/// `GET /api/v1/health-metrics` query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricListQuery {
    pub metric_type: Option<MetricType>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl MetricListQuery {
    pub fn filter(&self) -> MetricFilter {
        MetricFilter {
            metric_type: self.metric_type,
            from: self.from,
            to: self.to,
        }
    }

    pub fn pagination(&self) -> Pagination {
        let defaults = Pagination::default();
        Pagination::new(
            self.page.unwrap_or(defaults.page),
            self.per_page.unwrap_or(defaults.per_page),
        )
    }
}

/// `GET /api/v1/health-metrics/summary` query string
#[derive(Debug, Clone, Deserialize)]
pub struct MetricSummaryQuery {
    pub metric_type: MetricType,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}
