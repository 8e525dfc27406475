//! Value objects representing immutable domain concepts.

pub mod auth_response;
pub mod client_info;
pub mod nutrients;

pub use auth_response::AuthResponse;
pub use client_info::ClientInfo;
pub use nutrients::{round2, MacroPercentages, Nutrients, KCAL_PER_G_CARBS, KCAL_PER_G_FAT, KCAL_PER_G_PROTEIN};
