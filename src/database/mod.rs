pub mod db;
pub mod redis;

pub use db::{DB_NAME, connect_to_mongo};
pub use redis::{RedisClient, RedisService};
