use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use nl_shared::{PaginatedResponse, Pagination};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::health_metric::{HealthMetric, MetricFilter, MetricType};
use crate::domain::value_objects::round2;
use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::repositories::HealthMetricRepository;

const MAX_NOTES_LENGTH: usize = 1000;

/// Tolerated client clock skew for `recorded_at`
const FUTURE_SKEW_SECONDS: i64 = 300;

#[derive(Debug, Clone)]
pub struct NewMetric {
    pub metric_type: MetricType,
    pub value: f64,
    pub recorded_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Fields to change on an existing metric; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct MetricChanges {
    pub value: Option<f64>,
    pub recorded_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Statistics over a metric type in a period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    pub metric_type: MetricType,
    pub unit: String,
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub average: Option<f64>,
    /// Oldest value in the period
    pub first: Option<f64>,
    /// Newest value in the period
    pub latest: Option<f64>,
    /// `latest - first`
    pub change: Option<f64>,
}

impl MetricSummary {
    /// Summarises metrics ordered oldest first
    fn from_metrics(metric_type: MetricType, metrics: &[HealthMetric]) -> Self {
        let values: Vec<f64> = metrics.iter().map(|m| m.value).collect();
        let first = values.first().copied();
        let latest = values.last().copied();

        Self {
            metric_type,
            unit: metric_type.unit().to_string(),
            count: values.len(),
            min: values.iter().copied().reduce(f64::min),
            max: values.iter().copied().reduce(f64::max),
            average: (!values.is_empty()).then(|| round2(values.iter().sum::<f64>() / values.len() as f64)),
            first,
            latest,
            change: first.zip(latest).map(|(f, l)| round2(l - f)),
        }
    }
}

pub struct HealthMetricService {
    repository: Arc<dyn HealthMetricRepository>,
}

impl HealthMetricService {
    pub fn new(repository: Arc<dyn HealthMetricRepository>) -> Self {
        Self { repository }
    }

    pub async fn create(&self, user_id: Uuid, input: NewMetric) -> DomainResult<HealthMetric> {
        let now = Utc::now();
        let recorded_at = input.recorded_at.unwrap_or(now);

        validate_value(input.metric_type, input.value)?;
        validate_recorded_at(recorded_at, now)?;
        let notes = clean_notes(input.notes)?;

        let metric = HealthMetric::new(user_id, input.metric_type, input.value, recorded_at, notes);
        self.repository.create(metric).await
    }

    /// A metric owned by the user; other users' metrics are reported missing
    pub async fn get(&self, user_id: Uuid, id: Uuid) -> DomainResult<HealthMetric> {
        self.repository
            .find_by_id(id)
            .await?
            .filter(|m| m.user_id == user_id)
            .ok_or_else(|| DomainError::not_found("Health metric"))
    }

    pub async fn update(&self, user_id: Uuid, id: Uuid, changes: MetricChanges) -> DomainResult<HealthMetric> {
        let mut metric = self.get(user_id, id).await?;
        let now = Utc::now();

        if let Some(value) = changes.value {
            validate_value(metric.metric_type, value)?;
            metric.value = value;
        }
        if let Some(recorded_at) = changes.recorded_at {
            validate_recorded_at(recorded_at, now)?;
            metric.recorded_at = recorded_at;
        }
        if changes.notes.is_some() {
            metric.notes = clean_notes(changes.notes)?;
        }
        metric.updated_at = now;

        self.repository.update(metric).await
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> DomainResult<()> {
        let metric = self.get(user_id, id).await?;
        self.repository.delete(metric.id).await?;
        Ok(())
    }

    /// One page of metrics, newest first
    pub async fn list(
        &self,
        user_id: Uuid,
        filter: &MetricFilter,
        pagination: Pagination,
    ) -> DomainResult<PaginatedResponse<HealthMetric>> {
        validate_period(filter)?;
        let pagination = pagination.validate();
        let (metrics, total) = self.repository.list(user_id, filter, &pagination).await?;
        Ok(PaginatedResponse::new(metrics, pagination, total))
    }

    /// Most recent measurement of every type the user has recorded
    pub async fn latest(&self, user_id: Uuid) -> DomainResult<Vec<HealthMetric>> {
        let mut latest = Vec::new();
        for metric_type in MetricType::ALL {
            if let Some(metric) = self.repository.latest_by_type(user_id, metric_type).await? {
                latest.push(metric);
            }
        }
        Ok(latest)
    }

    pub async fn summary(
        &self,
        user_id: Uuid,
        metric_type: MetricType,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> DomainResult<MetricSummary> {
        let filter = MetricFilter {
            metric_type: Some(metric_type),
            from,
            to,
        };
        validate_period(&filter)?;

        let metrics = self.repository.list_all(user_id, &filter).await?;
        Ok(MetricSummary::from_metrics(metric_type, &metrics))
    }
}

fn validate_value(metric_type: MetricType, value: f64) -> DomainResult<()> {
    if metric_type.accepts(value) {
        return Ok(());
    }
    let (min, max) = metric_type.valid_range();
    Err(ValidationError::OutOfRange {
        field: "value".into(),
        min: format!("{} {}", min, metric_type.unit()),
        max: format!("{} {}", max, metric_type.unit()),
    }
    .into())
}

fn validate_recorded_at(recorded_at: DateTime<Utc>, now: DateTime<Utc>) -> DomainResult<()> {
    if recorded_at > now + Duration::seconds(FUTURE_SKEW_SECONDS) {
        return Err(ValidationError::InvalidDate {
            reason: "recorded_at cannot be in the future".into(),
        }
        .into());
    }
    Ok(())
}

fn validate_period(filter: &MetricFilter) -> DomainResult<()> {
    match (filter.from, filter.to) {
        (Some(from), Some(to)) if from > to => Err(ValidationError::InvalidDate {
            reason: "from must not be after to".into(),
        }
        .into()),
        _ => Ok(()),
    }
}

fn clean_notes(notes: Option<String>) -> DomainResult<Option<String>> {
    let notes = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    if notes.as_ref().map_or(false, |n| n.chars().count() > MAX_NOTES_LENGTH) {
        return Err(ValidationError::OutOfRange {
            field: "notes".into(),
            min: "0".into(),
            max: format!("{} characters", MAX_NOTES_LENGTH),
        }
        .into());
    }
    Ok(notes)
}
