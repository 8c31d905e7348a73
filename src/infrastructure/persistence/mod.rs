pub mod memory_store;
pub mod null_store;
pub mod redis_store;

pub use memory_store::MemoryStore;
pub use null_store::NullStore;
pub use redis_store::RedisStore;
