//! Nutrition profile attached to a user.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Gender used for BMR calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Habitual activity level for TDEE calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// 1-3 days/week
    Light,
    /// 3-5 days/week
    Moderate,
    /// 6-7 days/week
    Active,
    /// Hard training or physical job
    VeryActive,
}

impl ActivityLevel {
    /// TDEE multiplier applied to BMR
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

/// What the user is trying to achieve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NutritionGoal {
    LoseWeight,
    Maintain,
    GainWeight,
    BuildMuscle,
}

impl NutritionGoal {
    /// Daily calorie adjustment applied to TDEE
    pub fn calorie_adjustment(&self) -> f64 {
        match self {
            NutritionGoal::LoseWeight => -500.0,
            NutritionGoal::Maintain => 0.0,
            NutritionGoal::GainWeight => 300.0,
            NutritionGoal::BuildMuscle => 250.0,
        }
    }
}

str_enum!(Gender { Male => "male", Female => "female", Other => "other" });
str_enum!(ActivityLevel {
    Sedentary => "sedentary",
    Light => "light",
    Moderate => "moderate",
    Active => "active",
    VeryActive => "very_active",
});
str_enum!(NutritionGoal {
    LoseWeight => "lose_weight",
    Maintain => "maintain",
    GainWeight => "gain_weight",
    BuildMuscle => "build_muscle",
});

/// Nutrition profile of a user; at most one per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub height_cm: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
    pub goal: Option<NutritionGoal>,
    /// Explicit calorie target; overrides the computed one
    pub daily_calorie_target: Option<f64>,
    pub protein_target_g: Option<f64>,
    pub carbs_target_g: Option<f64>,
    pub fat_target_g: Option<f64>,
    pub dietary_preferences: Vec<String>,
    pub allergies: Vec<String>,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Creates an empty profile for a user
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            date_of_birth: None,
            gender: None,
            height_cm: None,
            activity_level: None,
            goal: None,
            daily_calorie_target: None,
            protein_target_g: None,
            carbs_target_g: None,
            fat_target_g: None,
            dietary_preferences: Vec::new(),
            allergies: Vec::new(),
            timezone: "UTC".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Age in whole years on the given date
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        let dob = self.date_of_birth?;
        let mut age = today.year() - dob.year();
        if (today.month(), today.day()) < (dob.month(), dob.day()) {
            age -= 1;
        }
        u32::try_from(age).ok()
    }
}
