/// Server services
pub mod auth;
pub mod cache;
pub mod file_storage;
pub mod likes;
pub mod otp;
pub mod producer;

pub use auth::AuthService;
pub use cache::{CacheStore, MemoryCache};
pub use file_storage::FileStorage;
pub use likes::LikeService;
pub use producer::{publish, LogProducer, MessageProducer, RabbitMqProducer};
