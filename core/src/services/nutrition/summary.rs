//! Aggregation of food log entries into daily and multi-day summaries

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::domain::entities::food_log::{FoodLog, MealType};
use crate::domain::value_objects::{round2, MacroPercentages, Nutrients};
use crate::services::profile::DailyTargets;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealSummary {
    pub meal_type: MealType,
    pub totals: Nutrients,
    pub entry_count: usize,
}

/// What is left of the day's targets; negative when exceeded
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RemainingTargets {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

impl RemainingTargets {
    pub fn between(targets: &DailyTargets, totals: &Nutrients) -> Self {
        Self {
            calories: round2(targets.calories - totals.calories),
            protein_g: round2(targets.protein_g - totals.protein_g),
            carbs_g: round2(targets.carbs_g - totals.carbohydrates_g),
            fat_g: round2(targets.fat_g - totals.fat_g),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub totals: Nutrients,
    /// One entry per meal type, in meal order, including empty meals
    pub by_meal: Vec<MealSummary>,
    pub entry_count: usize,
    pub targets: Option<DailyTargets>,
    pub remaining: Option<RemainingTargets>,
    pub macro_percentages: MacroPercentages,
}

impl DailySummary {
    pub fn build(date: NaiveDate, logs: &[FoodLog], targets: Option<DailyTargets>) -> Self {
        let totals = logs.iter().map(|l| &l.nutrients).sum::<Nutrients>().rounded();

        let by_meal = MealType::ALL
            .into_iter()
            .map(|meal_type| {
                let entries: Vec<&FoodLog> = logs.iter().filter(|l| l.meal_type == meal_type).collect();
                MealSummary {
                    meal_type,
                    totals: entries.iter().map(|l| &l.nutrients).sum::<Nutrients>().rounded(),
                    entry_count: entries.len(),
                }
            })
            .collect();

        Self {
            date,
            totals,
            by_meal,
            entry_count: logs.len(),
            remaining: targets.as_ref().map(|t| RemainingTargets::between(t, &totals)),
            targets,
            macro_percentages: totals.macro_percentages(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub totals: Nutrients,
    pub entry_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeSummary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Every day of the range, zero-filled when nothing was logged
    pub days: Vec<DaySummary>,
    pub totals: Nutrients,
    /// Average over the days that have entries
    pub daily_average: Nutrients,
    pub days_logged: usize,
}

impl RangeSummary {
    pub fn build(from: NaiveDate, to: NaiveDate, logs: &[FoodLog]) -> Self {
        let mut days = Vec::new();
        let mut date = from;
        while date <= to {
            let entries: Vec<&FoodLog> = logs.iter().filter(|l| l.log_date == date).collect();
            days.push(DaySummary {
                date,
                totals: entries.iter().map(|l| &l.nutrients).sum::<Nutrients>().rounded(),
                entry_count: entries.len(),
            });
            date += Duration::days(1);
        }

        let totals = logs.iter().map(|l| &l.nutrients).sum::<Nutrients>();
        let days_logged = days.iter().filter(|d| d.entry_count > 0).count();
        let daily_average = if days_logged == 0 {
            Nutrients::default()
        } else {
            totals.scale(1.0 / days_logged as f64).rounded()
        };

        Self {
            from,
            to,
            days,
            totals: totals.rounded(),
            daily_average,
            days_logged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::profile::TargetSource;
    use chrono::Utc;
    use uuid::Uuid;

    fn log(meal_type: MealType, date: NaiveDate, calories: f64, protein_g: f64) -> FoodLog {
        let nutrients = Nutrients {
            calories,
            protein_g,
            ..Default::default()
        };
        FoodLog::new(
            Uuid::new_v4(),
            None,
            "item".into(),
            meal_type,
            1.0,
            nutrients,
            Utc::now(),
            date,
            None,
        )
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_daily_summary_groups_meals() {
        let logs = vec![
            log(MealType::Breakfast, day(1), 300.0, 20.0),
            log(MealType::Breakfast, day(1), 100.0, 5.0),
            log(MealType::Dinner, day(1), 600.0, 40.0),
        ];
        let summary = DailySummary::build(day(1), &logs, None);

        assert_eq!(summary.totals.calories, 1000.0);
        assert_eq!(summary.entry_count, 3);
        assert_eq!(summary.by_meal.len(), 4);
        assert_eq!(summary.by_meal[0].entry_count, 2);
        assert_eq!(summary.by_meal[0].totals.calories, 400.0);
        assert_eq!(summary.by_meal[1].entry_count, 0);
        assert!(summary.remaining.is_none());
    }

    #[test]
    fn test_daily_summary_remaining() {
        let targets = DailyTargets::from_calories(2000.0, TargetSource::Profile);
        let logs = vec![log(MealType::Lunch, day(1), 2200.0, 50.0)];
        let summary = DailySummary::build(day(1), &logs, Some(targets));

        let remaining = summary.remaining.unwrap();
        assert_eq!(remaining.calories, -200.0);
        assert_eq!(remaining.protein_g, 100.0);
    }

    #[test]
    fn test_range_summary_fills_empty_days() {
        let logs = vec![
            log(MealType::Lunch, day(1), 1800.0, 0.0),
            log(MealType::Lunch, day(3), 2200.0, 0.0),
        ];
        let summary = RangeSummary::build(day(1), day(4), &logs);

        assert_eq!(summary.days.len(), 4);
        assert_eq!(summary.days[1].entry_count, 0);
        assert_eq!(summary.days[1].totals, Nutrients::default());
        assert_eq!(summary.totals.calories, 4000.0);
        assert_eq!(summary.days_logged, 2);
        assert_eq!(summary.daily_average.calories, 2000.0);
    }
}
