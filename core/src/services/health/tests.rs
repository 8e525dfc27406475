use std::sync::Arc;

use chrono::{Duration, Utc};
use nl_shared::Pagination;
use uuid::Uuid;

use crate::domain::entities::health_metric::{MetricFilter, MetricType};
use crate::errors::{DomainError, ValidationError};
use crate::repositories::InMemoryHealthMetricRepository;
use crate::services::health::{HealthMetricService, MetricChanges, NewMetric};

fn service() -> HealthMetricService {
    HealthMetricService::new(Arc::new(InMemoryHealthMetricRepository::new()))
}

fn weight(value: f64, days_ago: i64) -> NewMetric {
    NewMetric {
        metric_type: MetricType::Weight,
        value,
        recorded_at: Some(Utc::now() - Duration::days(days_ago)),
        notes: None,
    }
}

#[tokio::test]
async fn test_create_sets_canonical_unit() {
    let service = service();
    let metric = service.create(Uuid::new_v4(), weight(72.5, 0)).await.unwrap();

    assert_eq!(metric.unit, "kg");
    assert_eq!(metric.value, 72.5);
}

#[tokio::test]
async fn test_create_rejects_out_of_range_value() {
    let service = service();
    let result = service.create(Uuid::new_v4(), weight(900.0, 0)).await;

    assert!(matches!(
        result,
        Err(DomainError::ValidationErr(ValidationError::OutOfRange { .. }))
    ));
}

#[tokio::test]
async fn test_create_rejects_future_timestamp() {
    let service = service();
    let mut input = weight(70.0, 0);
    input.recorded_at = Some(Utc::now() + Duration::days(1));

    assert!(matches!(
        service.create(Uuid::new_v4(), input).await,
        Err(DomainError::ValidationErr(ValidationError::InvalidDate { .. }))
    ));
}

#[tokio::test]
async fn test_other_users_metric_is_not_found() {
    let service = service();
    let metric = service.create(Uuid::new_v4(), weight(70.0, 0)).await.unwrap();

    let other = Uuid::new_v4();
    assert!(matches!(service.get(other, metric.id).await, Err(DomainError::NotFound { .. })));
    assert!(service.delete(other, metric.id).await.is_err());
}

#[tokio::test]
async fn test_update_revalidates_value() {
    let service = service();
    let user_id = Uuid::new_v4();
    let metric = service.create(user_id, weight(70.0, 0)).await.unwrap();

    let updated = service
        .update(
            user_id,
            metric.id,
            MetricChanges {
                value: Some(69.4),
                notes: Some("after run".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.value, 69.4);
    assert_eq!(updated.notes.as_deref(), Some("after run"));

    let invalid = MetricChanges {
        value: Some(5.0),
        ..Default::default()
    };
    assert!(service.update(user_id, metric.id, invalid).await.is_err());
}

#[tokio::test]
async fn test_list_paginates_newest_first() {
    let service = service();
    let user_id = Uuid::new_v4();
    for (i, value) in [70.0, 71.0, 72.0].into_iter().enumerate() {
        service.create(user_id, weight(value, 3 - i as i64)).await.unwrap();
    }

    let page = service
        .list(user_id, &MetricFilter::default(), Pagination::new(1, 2))
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0].value, 72.0);
    assert!(page.has_next);
}

#[tokio::test]
async fn test_latest_per_type() {
    let service = service();
    let user_id = Uuid::new_v4();
    service.create(user_id, weight(70.0, 2)).await.unwrap();
    service.create(user_id, weight(71.0, 1)).await.unwrap();
    service
        .create(
            user_id,
            NewMetric {
                metric_type: MetricType::HeartRate,
                value: 62.0,
                recorded_at: None,
                notes: None,
            },
        )
        .await
        .unwrap();

    let latest = service.latest(user_id).await.unwrap();
    assert_eq!(latest.len(), 2);
    let weight = latest.iter().find(|m| m.metric_type == MetricType::Weight).unwrap();
    assert_eq!(weight.value, 71.0);
}

#[tokio::test]
async fn test_summary() {
    let service = service();
    let user_id = Uuid::new_v4();
    service.create(user_id, weight(80.0, 10)).await.unwrap();
    service.create(user_id, weight(78.0, 5)).await.unwrap();
    service.create(user_id, weight(77.0, 1)).await.unwrap();

    let summary = service.summary(user_id, MetricType::Weight, None, None).await.unwrap();
    assert_eq!(summary.count, 3);
    assert_eq!(summary.min, Some(77.0));
    assert_eq!(summary.max, Some(80.0));
    assert_eq!(summary.average, Some(78.33));
    assert_eq!(summary.first, Some(80.0));
    assert_eq!(summary.latest, Some(77.0));
    assert_eq!(summary.change, Some(-3.0));

    let empty = service.summary(user_id, MetricType::Steps, None, None).await.unwrap();
    assert_eq!(empty.count, 0);
    assert_eq!(empty.average, None);
}

#[tokio::test]
async fn test_summary_rejects_inverted_period() {
    let service = service();
    let now = Utc::now();
    let result = service
        .summary(Uuid::new_v4(), MetricType::Weight, Some(now), Some(now - Duration::days(1)))
        .await;
    assert!(result.is_err());
}
