#[path = "trait.rs"]
mod trait_;
mod memory;

pub use memory::InMemoryHealthMetricRepository;
pub use trait_::HealthMetricRepository;
