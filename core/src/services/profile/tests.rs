use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::entities::health_metric::{HealthMetric, MetricType};
use crate::domain::entities::profile::{ActivityLevel, Gender, NutritionGoal};
use crate::errors::{DomainError, ValidationError};
use crate::repositories::{HealthMetricRepository, InMemoryHealthMetricRepository, InMemoryProfileRepository};
use crate::services::profile::{ProfileService, ProfileUpdate, TargetSource};

fn setup() -> (ProfileService, Arc<InMemoryHealthMetricRepository>) {
    let metrics = Arc::new(InMemoryHealthMetricRepository::new());
    let service = ProfileService::new(Arc::new(InMemoryProfileRepository::new()), metrics.clone());
    (service, metrics)
}

fn full_update() -> ProfileUpdate {
    ProfileUpdate {
        date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1),
        gender: Some(Gender::Female),
        height_cm: Some(165.0),
        activity_level: Some(ActivityLevel::Light),
        goal: Some(NutritionGoal::Maintain),
        dietary_preferences: vec![" Vegetarian".into(), "vegetarian".into(), "".into()],
        ..Default::default()
    }
}

#[tokio::test]
async fn test_get_missing_profile() {
    let (service, _) = setup();
    assert!(matches!(service.get(Uuid::new_v4()).await, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_upsert_creates_then_replaces() {
    let (service, _) = setup();
    let user_id = Uuid::new_v4();

    let created = service.upsert(user_id, full_update()).await.unwrap();
    assert_eq!(created.dietary_preferences, vec!["vegetarian".to_string()]);
    assert_eq!(created.timezone, "UTC");

    let replaced = service
        .upsert(
            user_id,
            ProfileUpdate {
                height_cm: Some(170.0),
                timezone: Some("Europe/Berlin".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(replaced.created_at, created.created_at);
    assert_eq!(replaced.height_cm, Some(170.0));
    assert_eq!(replaced.gender, None);
    assert_eq!(replaced.timezone, "Europe/Berlin");
}

#[tokio::test]
async fn test_upsert_validates_height_and_birth_date() {
    let (service, _) = setup();
    let user_id = Uuid::new_v4();

    let too_tall = ProfileUpdate {
        height_cm: Some(300.0),
        ..Default::default()
    };
    assert!(matches!(
        service.upsert(user_id, too_tall).await,
        Err(DomainError::ValidationErr(ValidationError::OutOfRange { .. }))
    ));

    let future = ProfileUpdate {
        date_of_birth: Some(Utc::now().date_naive() + Duration::days(1)),
        ..Default::default()
    };
    assert!(matches!(
        service.upsert(user_id, future).await,
        Err(DomainError::ValidationErr(ValidationError::InvalidDate { .. }))
    ));

    let ancient = ProfileUpdate {
        date_of_birth: NaiveDate::from_ymd_opt(1850, 6, 1),
        ..Default::default()
    };
    assert!(service.upsert(user_id, ancient).await.is_err());

    let negative = ProfileUpdate {
        protein_target_g: Some(-1.0),
        ..Default::default()
    };
    assert!(service.upsert(user_id, negative).await.is_err());
}

#[tokio::test]
async fn test_explicit_targets_win() {
    let (service, _) = setup();
    let user_id = Uuid::new_v4();
    service
        .upsert(
            user_id,
            ProfileUpdate {
                daily_calorie_target: Some(2000.0),
                protein_target_g: Some(180.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let targets = service.targets(user_id).await.unwrap();
    assert_eq!(targets.source, TargetSource::Profile);
    assert_eq!(targets.calories, 2000.0);
    assert_eq!(targets.protein_g, 180.0);
    assert_eq!(targets.carbs_g, 200.0);
}

#[tokio::test]
async fn test_calculated_targets_use_latest_weight() {
    let (service, metrics) = setup();
    let user_id = Uuid::new_v4();
    service.upsert(user_id, full_update()).await.unwrap();

    metrics
        .create(HealthMetric::new(user_id, MetricType::Weight, 70.0, Utc::now() - Duration::days(10), None))
        .await
        .unwrap();
    metrics
        .create(HealthMetric::new(user_id, MetricType::Weight, 60.0, Utc::now() - Duration::days(1), None))
        .await
        .unwrap();

    let targets = service.targets(user_id).await.unwrap();
    assert_eq!(targets.source, TargetSource::Calculated);
    assert!(targets.calories > 1000.0);

    let age = full_update()
        .date_of_birth
        .map(|dob| {
            let p = crate::domain::entities::UserProfile {
                date_of_birth: Some(dob),
                ..crate::domain::entities::UserProfile::new(user_id)
            };
            p.age_on(Utc::now().date_naive()).unwrap()
        })
        .unwrap();
    let expected = super::calculate_daily_targets(60.0, 165.0, age, Gender::Female, ActivityLevel::Light, NutritionGoal::Maintain);
    assert_eq!(targets, expected);
}

#[tokio::test]
async fn test_targets_report_missing_data() {
    let (service, _) = setup();
    let user_id = Uuid::new_v4();
    service.upsert(user_id, full_update()).await.unwrap();

    match service.targets(user_id).await {
        Err(DomainError::ValidationErr(ValidationError::InsufficientProfileData { missing })) => {
            assert_eq!(missing, "weight");
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[tokio::test]
async fn test_delete_profile() {
    let (service, _) = setup();
    let user_id = Uuid::new_v4();
    service.upsert(user_id, ProfileUpdate::default()).await.unwrap();

    service.delete(user_id).await.unwrap();
    assert!(matches!(service.delete(user_id).await, Err(DomainError::NotFound { .. })));
}
