#[path = "trait.rs"]
mod trait_;
mod memory;

pub use memory::InMemorySessionRepository;
pub use trait_::SessionRepository;
