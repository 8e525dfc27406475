//! Domain entities representing core business objects.

/// String conversions for the enums persisted as text columns
macro_rules! str_enum {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name),+
                }
            }
        }

        impl std::str::FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($ty), s)),
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub mod food;
pub mod food_log;
pub mod health_metric;
pub mod profile;
pub mod session;
pub mod token;
pub mod user;

pub use food::Food;
pub use food_log::{FoodLog, MealType};
pub use health_metric::{HealthMetric, MetricFilter, MetricType};
pub use profile::{ActivityLevel, Gender, NutritionGoal, UserProfile};
pub use session::{TerminationReason, UserSession};
pub use token::{Claims, RefreshToken, TokenPair};
pub use user::User;
