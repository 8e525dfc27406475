//! Health metric measurements (weight, blood pressure, sleep, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of health measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    Weight,
    BodyFat,
    BloodPressureSystolic,
    BloodPressureDiastolic,
    HeartRate,
    BloodGlucose,
    WaterIntake,
    SleepHours,
    Steps,
}

str_enum!(MetricType {
    Weight => "weight",
    BodyFat => "body_fat",
    BloodPressureSystolic => "blood_pressure_systolic",
    BloodPressureDiastolic => "blood_pressure_diastolic",
    HeartRate => "heart_rate",
    BloodGlucose => "blood_glucose",
    WaterIntake => "water_intake",
    SleepHours => "sleep_hours",
    Steps => "steps",
});

impl MetricType {
    pub const ALL: [MetricType; 9] = [
        MetricType::Weight,
        MetricType::BodyFat,
        MetricType::BloodPressureSystolic,
        MetricType::BloodPressureDiastolic,
        MetricType::HeartRate,
        MetricType::BloodGlucose,
        MetricType::WaterIntake,
        MetricType::SleepHours,
        MetricType::Steps,
    ];

    /// Canonical unit stored with every value of this type
    pub fn unit(&self) -> &'static str {
        match self {
            MetricType::Weight => "kg",
            MetricType::BodyFat => "%",
            MetricType::BloodPressureSystolic | MetricType::BloodPressureDiastolic => "mmHg",
            MetricType::HeartRate => "bpm",
            MetricType::BloodGlucose => "mg/dL",
            MetricType::WaterIntake => "ml",
            MetricType::SleepHours => "h",
            MetricType::Steps => "count",
        }
    }

    /// Inclusive range of plausible values
    pub fn valid_range(&self) -> (f64, f64) {
        match self {
            MetricType::Weight => (20.0, 500.0),
            MetricType::BodyFat => (2.0, 75.0),
            MetricType::BloodPressureSystolic => (50.0, 260.0),
            MetricType::BloodPressureDiastolic => (30.0, 160.0),
            MetricType::HeartRate => (20.0, 250.0),
            MetricType::BloodGlucose => (20.0, 600.0),
            MetricType::WaterIntake => (0.0, 10_000.0),
            MetricType::SleepHours => (0.0, 24.0),
            MetricType::Steps => (0.0, 200_000.0),
        }
    }

    pub fn accepts(&self, value: f64) -> bool {
        let (min, max) = self.valid_range();
        value.is_finite() && value >= min && value <= max
    }
}

/// A single recorded measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMetric {
    pub id: Uuid,
    pub user_id: Uuid,
    pub metric_type: MetricType,
    pub value: f64,
    pub unit: String,
    pub recorded_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HealthMetric {
    pub fn new(
        user_id: Uuid,
        metric_type: MetricType,
        value: f64,
        recorded_at: DateTime<Utc>,
        notes: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            metric_type,
            value,
            unit: metric_type.unit().to_string(),
            recorded_at,
            notes,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Filter for listing metrics
#[derive(Debug, Clone, Default)]
pub struct MetricFilter {
    pub metric_type: Option<MetricType>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl MetricFilter {
    pub fn matches(&self, metric: &HealthMetric) -> bool {
        self.metric_type.map_or(true, |t| metric.metric_type == t)
            && self.from.map_or(true, |from| metric.recorded_at >= from)
            && self.to.map_or(true, |to| metric.recorded_at <= to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_follows_type() {
        let metric = HealthMetric::new(Uuid::new_v4(), MetricType::HeartRate, 62.0, Utc::now(), None);
        assert_eq!(metric.unit, "bpm");
    }

    #[test]
    fn test_accepts_range_bounds() {
        assert!(MetricType::Weight.accepts(20.0));
        assert!(MetricType::Weight.accepts(500.0));
        assert!(!MetricType::Weight.accepts(19.9));
        assert!(!MetricType::SleepHours.accepts(f64::NAN));
    }

    #[test]
    fn test_filter_matches() {
        let metric = HealthMetric::new(Uuid::new_v4(), MetricType::Weight, 70.0, Utc::now(), None);
        let filter = MetricFilter {
            metric_type: Some(MetricType::Steps),
            ..Default::default()
        };
        assert!(!filter.matches(&metric));
        assert!(MetricFilter::default().matches(&metric));
    }
}
