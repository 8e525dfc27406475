//! Profile CRUD and target resolution

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::entities::health_metric::MetricType;
use crate::domain::entities::profile::{ActivityLevel, Gender, NutritionGoal, UserProfile};
use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::repositories::{HealthMetricRepository, ProfileRepository};

use super::targets::{calculate_daily_targets, DailyTargets, TargetSource};

const MIN_HEIGHT_CM: f64 = 50.0;
const MAX_HEIGHT_CM: f64 = 272.0;
const MAX_AGE_YEARS: u32 = 130;
const MAX_TARGET_VALUE: f64 = 20_000.0;

/// Full replacement of a profile's editable fields
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub height_cm: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
    pub goal: Option<NutritionGoal>,
    pub daily_calorie_target: Option<f64>,
    pub protein_target_g: Option<f64>,
    pub carbs_target_g: Option<f64>,
    pub fat_target_g: Option<f64>,
    #[serde(default)]
    pub dietary_preferences: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    pub timezone: Option<String>,
}

pub struct ProfileService {
    profiles: Arc<dyn ProfileRepository>,
    metrics: Arc<dyn HealthMetricRepository>,
}

impl ProfileService {
    pub fn new(profiles: Arc<dyn ProfileRepository>, metrics: Arc<dyn HealthMetricRepository>) -> Self {
        Self { profiles, metrics }
    }

    pub async fn get(&self, user_id: Uuid) -> DomainResult<UserProfile> {
        self.profiles
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Profile"))
    }

    /// Creates the profile or replaces every editable field of the existing one
    pub async fn upsert(&self, user_id: Uuid, update: ProfileUpdate) -> DomainResult<UserProfile> {
        validate_update(&update, Utc::now().date_naive())?;

        let mut profile = self
            .profiles
            .find_by_user(user_id)
            .await?
            .unwrap_or_else(|| UserProfile::new(user_id));

        profile.date_of_birth = update.date_of_birth;
        profile.gender = update.gender;
        profile.height_cm = update.height_cm;
        profile.activity_level = update.activity_level;
        profile.goal = update.goal;
        profile.daily_calorie_target = update.daily_calorie_target;
        profile.protein_target_g = update.protein_target_g;
        profile.carbs_target_g = update.carbs_target_g;
        profile.fat_target_g = update.fat_target_g;
        profile.dietary_preferences = clean_list(update.dietary_preferences);
        profile.allergies = clean_list(update.allergies);
        profile.timezone = update
            .timezone
            .map(|tz| tz.trim().to_string())
            .filter(|tz| !tz.is_empty())
            .unwrap_or_else(|| "UTC".to_string());
        profile.updated_at = Utc::now();

        self.profiles.upsert(profile).await
    }

    pub async fn delete(&self, user_id: Uuid) -> DomainResult<()> {
        if self.profiles.delete(user_id).await? {
            Ok(())
        } else {
            Err(DomainError::not_found("Profile"))
        }
    }

    /// Daily targets for the user.
    ///
    /// An explicit calorie target on the profile wins; explicit macro targets
    /// override the 30/40/30 split individually. Otherwise targets are
    /// calculated from the latest weight measurement, height, age and gender.
    pub async fn targets(&self, user_id: Uuid) -> DomainResult<DailyTargets> {
        let profile = self.get(user_id).await?;

        if let Some(calories) = profile.daily_calorie_target {
            let split = DailyTargets::from_calories(calories, TargetSource::Profile);
            return Ok(DailyTargets {
                protein_g: profile.protein_target_g.unwrap_or(split.protein_g),
                carbs_g: profile.carbs_target_g.unwrap_or(split.carbs_g),
                fat_g: profile.fat_target_g.unwrap_or(split.fat_g),
                ..split
            });
        }

        let weight = self
            .metrics
            .latest_by_type(user_id, MetricType::Weight)
            .await?
            .map(|m| m.value);
        let age = profile.age_on(Utc::now().date_naive());

        let mut missing = Vec::new();
        if weight.is_none() {
            missing.push("weight");
        }
        if profile.height_cm.is_none() {
            missing.push("height_cm");
        }
        if age.is_none() {
            missing.push("date_of_birth");
        }
        if profile.gender.is_none() {
            missing.push("gender");
        }

        match (weight, profile.height_cm, age, profile.gender) {
            (Some(weight), Some(height), Some(age), Some(gender)) => Ok(calculate_daily_targets(
                weight,
                height,
                age,
                gender,
                profile.activity_level.unwrap_or(ActivityLevel::Sedentary),
                profile.goal.unwrap_or(NutritionGoal::Maintain),
            )),
            _ => Err(ValidationError::InsufficientProfileData {
                missing: missing.join(", "),
            }
            .into()),
        }
    }
}

fn validate_update(update: &ProfileUpdate, today: NaiveDate) -> DomainResult<()> {
    if let Some(height) = update.height_cm {
        if !height.is_finite() || !(MIN_HEIGHT_CM..=MAX_HEIGHT_CM).contains(&height) {
            return Err(ValidationError::OutOfRange {
                field: "height_cm".into(),
                min: MIN_HEIGHT_CM.to_string(),
                max: MAX_HEIGHT_CM.to_string(),
            }
            .into());
        }
    }

    if let Some(dob) = update.date_of_birth {
        if dob >= today {
            return Err(ValidationError::InvalidDate {
                reason: "date_of_birth must be in the past".into(),
            }
            .into());
        }
        let candidate = UserProfile {
            date_of_birth: Some(dob),
            ..UserProfile::new(Uuid::nil())
        };
        if candidate.age_on(today).map_or(true, |age| age > MAX_AGE_YEARS) {
            return Err(ValidationError::InvalidDate {
                reason: format!("age must not exceed {} years", MAX_AGE_YEARS),
            }
            .into());
        }
    }

    let targets = [
        ("daily_calorie_target", update.daily_calorie_target),
        ("protein_target_g", update.protein_target_g),
        ("carbs_target_g", update.carbs_target_g),
        ("fat_target_g", update.fat_target_g),
    ];
    for (field, value) in targets {
        if let Some(value) = value {
            if !value.is_finite() || value < 0.0 || value > MAX_TARGET_VALUE {
                return Err(ValidationError::OutOfRange {
                    field: field.into(),
                    min: "0".into(),
                    max: MAX_TARGET_VALUE.to_string(),
                }
                .into());
            }
        }
    }

    Ok(())
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = items
        .into_iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    cleaned.sort();
    cleaned.dedup();
    cleaned
}
