#[path = "trait.rs"]
mod trait_;
mod memory;

pub use memory::InMemoryFoodRepository;
pub use trait_::FoodRepository;
