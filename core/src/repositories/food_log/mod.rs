#[path = "trait.rs"]
mod trait_;
mod memory;

pub use memory::InMemoryFoodLogRepository;
pub use trait_::FoodLogRepository;
