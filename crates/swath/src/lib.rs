//! Swath: schema-driven structure-of-arrays storage for entity components.
//!
//! This is the top-level facade crate that re-exports the public API of
//! the Swath sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use swath::prelude::*;
//!
//! let schema = SchemaNode::group()
//!     .with("position", SchemaNode::array(PrimitiveType::F32, 3))
//!     .with("health", SchemaNode::scalar(PrimitiveType::U16));
//!
//! let mut registry = Registry::new();
//! let handle = registry.create_store(&schema, 4).unwrap();
//! let store = registry.get_mut(handle).unwrap();
//!
//! store.scalar_mut(&["health"]).unwrap().set(EntityId(2), 100u16).unwrap();
//! store
//!     .entity_data_mut::<f32>(&["position"], EntityId(1))
//!     .unwrap()
//!     .copy_from_slice(&[1.0, 2.0, 3.0]);
//!
//! // Entity 1's position lives at elements 3..6 of the shared f32 buffer.
//! let position = store.array(&["position"]).unwrap();
//! let view = store.entity_view(position, EntityId(1)).unwrap();
//! assert_eq!(view.offset(), 3);
//!
//! // Growing the store keeps the data but retires old views.
//! registry.resize_store(handle, 8).unwrap();
//! let store = registry.get(handle).unwrap();
//! assert!(store.view_data::<f32>(&view).is_err());
//! assert_eq!(
//!     store.entity_data::<f32>(&["position"], EntityId(1)).unwrap(),
//!     &[1.0, 2.0, 3.0]
//! );
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `swath-core` | Primitive types, schemas, ids |
//! | [`arena`] | `swath-arena` | Stores, buffers, views, registry |
//!
//! # Features
//!
//! - `serde`: deserialize [`SchemaNode`](types::SchemaNode) from JSON
//!   (or any serde format) using the `"f32"` / `{ "type", "length" }`
//!   schema notation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Primitive type catalog, schema tree, and identifiers (`swath-core`).
pub use swath_core as types;

/// Stores, shared buffers, shadows, views, and the registry (`swath-arena`).
///
/// [`arena::Registry`] is the entry point; everything else is reached
/// through the [`arena::Store`] it hands out.
pub use swath_arena as arena;

/// Common imports for typical Swath usage.
///
/// ```rust
/// use swath::prelude::*;
/// ```
pub mod prelude {
    // Schema and ids
    pub use swath_core::{EntityId, IndexWidth, PrimitiveType, SchemaNode, StoreHandle};

    // Stores
    pub use swath_arena::{
        ArrayField, EntityView, Owned, Registry, ScalarBuffer, ShadowKind, SharedBuffer, Store,
        StoreConfig,
    };

    // Errors
    pub use swath_arena::StoreError;
    pub use swath_core::ConfigError;
}
