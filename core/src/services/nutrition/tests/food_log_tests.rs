use std::sync::Arc;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use super::oats;
use crate::domain::entities::food_log::MealType;
use crate::domain::value_objects::Nutrients;
use crate::errors::{DomainError, ValidationError};
use crate::repositories::{
    InMemoryFoodLogRepository, InMemoryFoodRepository, InMemoryHealthMetricRepository, InMemoryProfileRepository,
};
use crate::services::nutrition::{FoodLogChanges, FoodLogService, FoodService, NewFoodLog};
use crate::services::profile::{ProfileService, ProfileUpdate, TargetSource};

struct Harness {
    logs: FoodLogService,
    foods: FoodService,
    profiles: Arc<ProfileService>,
}

fn harness() -> Harness {
    let food_repo = Arc::new(InMemoryFoodRepository::new());
    let profiles = Arc::new(ProfileService::new(
        Arc::new(InMemoryProfileRepository::new()),
        Arc::new(InMemoryHealthMetricRepository::new()),
    ));
    Harness {
        logs: FoodLogService::new(Arc::new(InMemoryFoodLogRepository::new()), food_repo.clone(), profiles.clone()),
        foods: FoodService::new(food_repo),
        profiles,
    }
}

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
}

fn from_food(food_id: Uuid, servings: f64) -> NewFoodLog {
    NewFoodLog {
        food_id: Some(food_id),
        food_name: None,
        nutrients: None,
        servings: Some(servings),
        meal_type: MealType::Breakfast,
        consumed_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 7, 30, 0).unwrap()),
        log_date: None,
        notes: None,
    }
}

fn manual(calories: f64, day: u32) -> NewFoodLog {
    NewFoodLog {
        food_id: None,
        food_name: Some("Home-made soup".into()),
        nutrients: Some(Nutrients {
            calories,
            protein_g: 10.0,
            carbohydrates_g: 20.0,
            fat_g: 5.0,
            ..Default::default()
        }),
        servings: None,
        meal_type: MealType::Dinner,
        consumed_at: None,
        log_date: Some(date(day)),
        notes: None,
    }
}

#[tokio::test]
async fn test_log_from_food_scales_nutrients() {
    let h = harness();
    let user_id = Uuid::new_v4();
    let food = h.foods.create(user_id, oats()).await.unwrap();

    let log = h.logs.create(user_id, from_food(food.id, 1.5)).await.unwrap();

    assert_eq!(log.food_name, "Rolled oats");
    assert_eq!(log.nutrients.calories, 225.0);
    assert_eq!(log.nutrients.fat_g, 3.75);
    assert_eq!(log.log_date, date(1));
}

#[tokio::test]
async fn test_manual_entry_requires_name_and_nutrients() {
    let h = harness();
    let user_id = Uuid::new_v4();

    let log = h.logs.create(user_id, manual(300.0, 2)).await.unwrap();
    assert_eq!(log.food_id, None);
    assert_eq!(log.servings, 1.0);
    assert_eq!(log.log_date, date(2));

    let mut missing = manual(300.0, 2);
    missing.nutrients = None;
    assert!(matches!(
        h.logs.create(user_id, missing).await,
        Err(DomainError::Validation { .. })
    ));
}

#[tokio::test]
async fn test_servings_bounds() {
    let h = harness();
    let user_id = Uuid::new_v4();

    for servings in [0.0, -1.0, 100.5] {
        let mut input = manual(100.0, 1);
        input.servings = Some(servings);
        assert!(matches!(
            h.logs.create(user_id, input).await,
            Err(DomainError::ValidationErr(ValidationError::OutOfRange { .. }))
        ));
    }

    let mut max = manual(100.0, 1);
    max.servings = Some(100.0);
    assert!(h.logs.create(user_id, max).await.is_ok());
}

#[tokio::test]
async fn test_cannot_log_other_users_food() {
    let h = harness();
    let food = h.foods.create(Uuid::new_v4(), oats()).await.unwrap();

    let result = h.logs.create(Uuid::new_v4(), from_food(food.id, 1.0)).await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_update_servings_recomputes() {
    let h = harness();
    let user_id = Uuid::new_v4();
    let food = h.foods.create(user_id, oats()).await.unwrap();
    let from_catalog = h.logs.create(user_id, from_food(food.id, 1.0)).await.unwrap();
    let typed = h.logs.create(user_id, manual(300.0, 1)).await.unwrap();

    let changes = FoodLogChanges {
        servings: Some(2.0),
        ..Default::default()
    };
    let updated = h.logs.update(user_id, from_catalog.id, changes.clone()).await.unwrap();
    assert_eq!(updated.nutrients.calories, 300.0);

    let updated = h.logs.update(user_id, typed.id, changes).await.unwrap();
    assert_eq!(updated.nutrients.calories, 600.0);
    assert_eq!(updated.nutrients.protein_g, 20.0);
}

#[tokio::test]
async fn test_repeated_servings_edits_do_not_drift() {
    let h = harness();
    let user_id = Uuid::new_v4();
    let log = h.logs.create(user_id, manual(100.0 / 3.0, 1)).await.unwrap();
    assert_eq!(log.nutrients.calories, 33.33);

    let tiny = FoodLogChanges {
        servings: Some(0.01),
        ..Default::default()
    };
    let updated = h.logs.update(user_id, log.id, tiny).await.unwrap();
    assert_eq!(updated.nutrients.calories, 0.33);

    let back = FoodLogChanges {
        servings: Some(1.0),
        ..Default::default()
    };
    let updated = h.logs.update(user_id, log.id, back).await.unwrap();
    assert_eq!(updated.nutrients.calories, 33.33);
    assert_eq!(updated.nutrients.protein_g, 10.0);
}

#[tokio::test]
async fn test_servings_edit_uses_logged_snapshot() {
    let h = harness();
    let user_id = Uuid::new_v4();
    let food = h.foods.create(user_id, oats()).await.unwrap();
    let log = h.logs.create(user_id, from_food(food.id, 1.0)).await.unwrap();

    let mut richer = oats();
    richer.nutrients.calories = 400.0;
    h.foods.update(user_id, food.id, richer).await.unwrap();

    let changes = FoodLogChanges {
        servings: Some(2.0),
        ..Default::default()
    };
    let updated = h.logs.update(user_id, log.id, changes).await.unwrap();
    assert_eq!(updated.nutrients.calories, 300.0);
    assert_eq!(updated.per_serving.calories, 150.0);
}

#[tokio::test]
async fn test_update_consumed_at_moves_log_date() {
    let h = harness();
    let user_id = Uuid::new_v4();
    let log = h.logs.create(user_id, manual(300.0, 1)).await.unwrap();

    let changes = FoodLogChanges {
        consumed_at: Some(Utc.with_ymd_and_hms(2024, 5, 3, 12, 0, 0).unwrap()),
        meal_type: Some(MealType::Lunch),
        ..Default::default()
    };
    let updated = h.logs.update(user_id, log.id, changes).await.unwrap();
    assert_eq!(updated.log_date, date(3));
    assert_eq!(updated.meal_type, MealType::Lunch);
}

#[tokio::test]
async fn test_delete_other_users_log_is_not_found() {
    let h = harness();
    let log = h.logs.create(Uuid::new_v4(), manual(300.0, 1)).await.unwrap();

    assert!(matches!(
        h.logs.delete(Uuid::new_v4(), log.id).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_daily_summary_without_profile() {
    let h = harness();
    let user_id = Uuid::new_v4();
    h.logs.create(user_id, manual(300.0, 1)).await.unwrap();
    h.logs.create(user_id, manual(200.0, 1)).await.unwrap();
    h.logs.create(user_id, manual(999.0, 2)).await.unwrap();

    let summary = h.logs.daily_summary(user_id, date(1)).await.unwrap();
    assert_eq!(summary.entry_count, 2);
    assert_eq!(summary.totals.calories, 500.0);
    assert!(summary.targets.is_none());
    assert!(summary.remaining.is_none());
}

#[tokio::test]
async fn test_daily_summary_with_targets() {
    let h = harness();
    let user_id = Uuid::new_v4();
    h.profiles
        .upsert(
            user_id,
            ProfileUpdate {
                daily_calorie_target: Some(2000.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    h.logs.create(user_id, manual(500.0, 1)).await.unwrap();

    let summary = h.logs.daily_summary(user_id, date(1)).await.unwrap();
    assert_eq!(summary.targets.map(|t| t.source), Some(TargetSource::Profile));
    assert_eq!(summary.remaining.unwrap().calories, 1500.0);
}

#[tokio::test]
async fn test_range_summary_limits() {
    let h = harness();
    let user_id = Uuid::new_v4();
    h.logs.create(user_id, manual(400.0, 1)).await.unwrap();
    h.logs.create(user_id, manual(600.0, 3)).await.unwrap();

    let summary = h.logs.range_summary(user_id, date(1), date(7)).await.unwrap();
    assert_eq!(summary.days.len(), 7);
    assert_eq!(summary.days_logged, 2);
    assert_eq!(summary.daily_average.calories, 500.0);

    let too_long = h.logs.range_summary(user_id, date(1), date(1) + Duration::days(92)).await;
    assert!(matches!(
        too_long,
        Err(DomainError::ValidationErr(ValidationError::InvalidDate { .. }))
    ));

    let inverted = h.logs.list(user_id, date(5), date(1)).await;
    assert!(inverted.is_err());
}
