//! Repository traits and their in-memory implementations.
//!
//! MySQL implementations live in the infrastructure crate; the in-memory ones
//! back unit tests, HTTP integration tests and local experiments.

pub mod food;
pub mod food_log;
pub mod health_metric;
pub mod profile;
pub mod session;
pub mod token;
pub mod user;

pub use food::{FoodRepository, InMemoryFoodRepository};
pub use food_log::{FoodLogRepository, InMemoryFoodLogRepository};
pub use health_metric::{HealthMetricRepository, InMemoryHealthMetricRepository};
pub use profile::{InMemoryProfileRepository, ProfileRepository};
pub use session::{InMemorySessionRepository, SessionRepository};
pub use token::{InMemoryTokenRepository, TokenRepository};
pub use user::{InMemoryUserRepository, UserRepository};
