pub mod value_cache;

pub use value_cache::{CacheEvent, SubscriptionHandle, ValueCache, ValueCacheConfig};
