#[path = "trait.rs"]
mod trait_;
mod memory;

pub use memory::InMemoryTokenRepository;
pub use trait_::TokenRepository;
