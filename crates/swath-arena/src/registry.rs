//! Caller-owned store registry.
//!
//! The [`Registry`] owns every live [`Store`] and is the only way to
//! create, resize, reset, or free one. Handles are allocated from a
//! monotonic counter starting at 1 and are never reused, so a handle
//! kept past [`Registry::free`] simply stops resolving.

use indexmap::IndexMap;
use swath_core::{SchemaNode, StoreHandle};
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::handle::Owned;
use crate::store::Store;

/// What to create a store from.
#[derive(Clone, Copy, Debug)]
pub enum Blueprint<'a> {
    /// Compile a new store from a schema.
    Schema(&'a SchemaNode),
    /// Reuse an already registered store.
    Store(StoreHandle),
}

impl<'a> From<&'a SchemaNode> for Blueprint<'a> {
    fn from(schema: &'a SchemaNode) -> Self {
        Self::Schema(schema)
    }
}

impl From<StoreHandle> for Blueprint<'_> {
    fn from(handle: StoreHandle) -> Self {
        Self::Store(handle)
    }
}

/// Every live store, keyed by handle.
#[derive(Debug)]
pub struct Registry {
    stores: IndexMap<StoreHandle, Store>,
    next_handle: u64,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            stores: IndexMap::new(),
            next_handle: 1,
        }
    }

    /// Create a store for `capacity` entities.
    ///
    /// From a schema this compiles and registers a new store. From the
    /// handle of a registered store nothing is rebuilt: the store's
    /// configured capacity is updated and the same handle is returned.
    /// Buffers only change size through [`Registry::resize_store`].
    pub fn create_store<'a>(
        &mut self,
        source: impl Into<Blueprint<'a>>,
        capacity: u32,
    ) -> Result<StoreHandle, StoreError> {
        match source.into() {
            Blueprint::Store(handle) => {
                StoreConfig::new(capacity).validate()?;
                let store = self
                    .stores
                    .get_mut(&handle)
                    .ok_or(StoreError::UnknownStore { handle })?;
                store.set_capacity(capacity);
                debug!(%handle, capacity, "reconfigured existing store");
                Ok(handle)
            }
            Blueprint::Schema(schema) => {
                let handle = StoreHandle(self.next_handle);
                let store = Store::build(schema, capacity, handle)?;
                self.next_handle += 1;
                self.stores.insert(handle, store);
                debug!(%handle, capacity, live = self.stores.len(), "registered store");
                Ok(handle)
            }
        }
    }

    /// [`Registry::create_store`] with the capacity taken from `config`.
    pub fn create_store_with<'a>(
        &mut self,
        source: impl Into<Blueprint<'a>>,
        config: &StoreConfig,
    ) -> Result<StoreHandle, StoreError> {
        self.create_store(source, config.capacity)
    }

    /// Grow a registered store to `new_capacity` entities.
    pub fn resize_store(&mut self, handle: StoreHandle, new_capacity: u32) -> Result<(), StoreError> {
        self.store_mut(handle)?.resize(new_capacity)
    }

    /// Zero a registered store's data buffers.
    pub fn reset_store(&mut self, handle: StoreHandle) -> Result<(), StoreError> {
        self.store_mut(handle)?.reset();
        Ok(())
    }

    /// Unregister a store and hand it back.
    ///
    /// Returns `None` if `handle` is not registered. Afterwards
    /// [`Registry::resolve`] no longer finds the store for anything it
    /// produced.
    pub fn free(&mut self, handle: StoreHandle) -> Option<Store> {
        let store = self.stores.shift_remove(&handle)?;
        debug!(%handle, live = self.stores.len(), "freed store");
        Some(store)
    }

    /// Registered store for `handle`.
    pub fn get(&self, handle: StoreHandle) -> Option<&Store> {
        self.stores.get(&handle)
    }

    /// Mutable registered store for `handle`.
    pub fn get_mut(&mut self, handle: StoreHandle) -> Option<&mut Store> {
        self.stores.get_mut(&handle)
    }

    /// Follow an owner back-reference to its store.
    pub fn resolve<O: Owned + ?Sized>(&self, item: &O) -> Option<&Store> {
        self.get(item.owner())
    }

    /// Whether `handle` is registered.
    pub fn contains(&self, handle: StoreHandle) -> bool {
        self.stores.contains_key(&handle)
    }

    /// Number of live stores.
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    /// Whether no store is registered.
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// Handles of every live store, in creation order.
    pub fn handles(&self) -> impl Iterator<Item = StoreHandle> + '_ {
        self.stores.keys().copied()
    }

    fn store_mut(&mut self, handle: StoreHandle) -> Result<&mut Store, StoreError> {
        self.stores
            .get_mut(&handle)
            .ok_or(StoreError::UnknownStore { handle })
    }
}
