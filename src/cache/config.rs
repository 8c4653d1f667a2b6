//! Block cache configuration.
//!
//! Controlled via the `[cache]` table of `livepreview.toml`.

use std::num::NonZeroUsize;

use serde::Deserialize;

use super::store::CacheError;

// Default values for cache configuration
pub(crate) const DEFAULT_MAX_SIZE: usize = 100;

/// Block cache configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of rendered blocks kept before LRU eviction.
    pub max_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            max_size: settings.max_size.get(),
        }
    }
}

impl CacheConfig {
    /// Returns the capacity as NonZeroUsize, rejecting zero.
    ///
    /// Unlike the lenient clamping used for optional limits, a zero-sized
    /// block cache is a misconfiguration and is surfaced to the caller.
    pub fn max_size_non_zero(&self) -> Result<NonZeroUsize, CacheError> {
        NonZeroUsize::new(self.max_size).ok_or(CacheError::InvalidCapacity {
            max_size: self.max_size,
        })
    }
}
