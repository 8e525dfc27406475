//! Business services containing domain logic and use cases.

pub mod auth;
pub mod health;
pub mod nutrition;
pub mod profile;
pub mod session;
pub mod token;

// Re-export commonly used types
pub use auth::{AuthService, AuthServiceConfig, InMemoryRateLimitStore, RateLimitDecision, RateLimitStore};
pub use health::{HealthMetricService, MetricChanges, MetricSummary, NewMetric};
pub use nutrition::{
    DailySummary, FoodLogChanges, FoodLogService, FoodService, NewFood, NewFoodLog, RangeSummary,
};
pub use profile::{DailyTargets, ProfileService, ProfileUpdate, TargetSource};
pub use session::{
    SessionAnomaly, SessionCleanupResult, SessionCleanupService, SessionManagementService, SessionValidation,
};
pub use token::{TokenCleanupConfig, TokenCleanupService, TokenService, TokenServiceConfig};
