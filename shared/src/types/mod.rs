//! Type definitions shared by all layers

pub mod pagination;

pub use pagination::{PaginatedResponse, Pagination};
