//! Store configuration parameters.

use swath_core::ConfigError;

/// Configuration for building a store.
///
/// Validated when a store is created; a store's capacity only changes
/// afterwards through an explicit resize.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Maximum number of entities the store can address.
    ///
    /// Default: 1_000_000. Chosen large so that most worlds never pay
    /// for a resize. Must be at least 1.
    pub capacity: u32,
}

impl StoreConfig {
    /// Default entity capacity.
    pub const DEFAULT_CAPACITY: u32 = 1_000_000;

    /// Create a config for the given capacity.
    pub fn new(capacity: u32) -> Self {
        Self { capacity }
    }

    /// Reject configurations no store can be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
