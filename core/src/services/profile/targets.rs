//! Daily calorie and macronutrient targets

use serde::Serialize;

use crate::domain::entities::profile::{ActivityLevel, Gender, NutritionGoal};
use crate::domain::value_objects::{round2, KCAL_PER_G_CARBS, KCAL_PER_G_FAT, KCAL_PER_G_PROTEIN};

/// Floor applied to the computed basal metabolic rate
pub const MIN_BMR_KCAL: f64 = 1000.0;

const PROTEIN_SHARE: f64 = 0.30;
const CARBS_SHARE: f64 = 0.40;
const FAT_SHARE: f64 = 0.30;

/// Where a set of targets came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSource {
    /// Set explicitly on the profile
    Profile,
    /// Derived from body data, activity and goal
    Calculated,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyTargets {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub source: TargetSource,
}

impl DailyTargets {
    /// Splits `calories` 30/40/30 between protein, carbohydrates and fat
    pub fn from_calories(calories: f64, source: TargetSource) -> Self {
        Self {
            calories: round2(calories),
            protein_g: round2(calories * PROTEIN_SHARE / KCAL_PER_G_PROTEIN),
            carbs_g: round2(calories * CARBS_SHARE / KCAL_PER_G_CARBS),
            fat_g: round2(calories * FAT_SHARE / KCAL_PER_G_FAT),
            source,
        }
    }
}

/// Mifflin-St Jeor basal metabolic rate in kcal/day.
///
/// BMR = 10 × weight + 6.25 × height − 5 × age + s, where s is +5 for men,
/// −161 for women and the midpoint −78 otherwise.
pub fn calculate_bmr(weight_kg: f64, height_cm: f64, age: u32, gender: Gender) -> f64 {
    let gender_constant = match gender {
        Gender::Male => 5.0,
        Gender::Female => -161.0,
        Gender::Other => -78.0,
    };

    let bmr = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age) + gender_constant;
    bmr.max(MIN_BMR_KCAL)
}

/// BMR × activity multiplier + goal adjustment, split into macros
pub fn calculate_daily_targets(
    weight_kg: f64,
    height_cm: f64,
    age: u32,
    gender: Gender,
    activity: ActivityLevel,
    goal: NutritionGoal,
) -> DailyTargets {
    let tdee = calculate_bmr(weight_kg, height_cm, age, gender) * activity.multiplier();
    let calories = (tdee + goal.calorie_adjustment()).max(MIN_BMR_KCAL);

    DailyTargets::from_calories(calories, TargetSource::Calculated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmr_male() {
        // 10*80 + 6.25*180 - 5*30 + 5
        assert_eq!(calculate_bmr(80.0, 180.0, 30, Gender::Male), 1780.0);
    }

    #[test]
    fn test_bmr_female() {
        // 10*60 + 6.25*165 - 5*25 - 161
        assert_eq!(calculate_bmr(60.0, 165.0, 25, Gender::Female), 1345.25);
    }

    #[test]
    fn test_bmr_floor() {
        assert_eq!(calculate_bmr(25.0, 60.0, 100, Gender::Female), MIN_BMR_KCAL);
    }

    #[test]
    fn test_daily_targets_macro_split() {
        let targets = calculate_daily_targets(
            80.0,
            180.0,
            30,
            Gender::Male,
            ActivityLevel::Sedentary,
            NutritionGoal::Maintain,
        );

        assert_eq!(targets.calories, 2136.0);
        assert_eq!(targets.protein_g, 160.2);
        assert_eq!(targets.carbs_g, 213.6);
        assert_eq!(targets.fat_g, 71.2);
        assert_eq!(targets.source, TargetSource::Calculated);
    }

    #[test]
    fn test_goal_adjustment() {
        let maintain = calculate_daily_targets(
            70.0,
            170.0,
            40,
            Gender::Other,
            ActivityLevel::Moderate,
            NutritionGoal::Maintain,
        );
        let lose = calculate_daily_targets(
            70.0,
            170.0,
            40,
            Gender::Other,
            ActivityLevel::Moderate,
            NutritionGoal::LoseWeight,
        );
        assert_eq!(round2(maintain.calories - lose.calories), 500.0);
    }
}
