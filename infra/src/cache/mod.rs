//! Redis cache access

pub mod redis_client;

pub use nl_shared::config::CacheConfig;
pub use redis_client::RedisClient;
