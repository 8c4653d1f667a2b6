//! Livepreview block cache
//!
//! Content-addressed storage for rendered block HTML:
//!
//! - **Keys**: truncated SHA-256 of a block's text ([`content_hash`])
//! - **Store**: strict LRU with hit/miss/eviction accounting ([`BlockCache`])
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! max_size = 100
//! ```

mod config;
mod keys;
mod store;

pub use config::CacheConfig;
pub(crate) use config::DEFAULT_MAX_SIZE;
pub use keys::{CONTENT_HASH_BYTES, ContentHash, content_hash};
pub use store::{BlockCache, CacheError, CacheStats};

pub(crate) use store::{METRIC_BLOCK_CACHE_EVICT, METRIC_BLOCK_CACHE_HIT, METRIC_BLOCK_CACHE_MISS};
