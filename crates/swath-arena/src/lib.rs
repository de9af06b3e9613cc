//! Schema-driven structure-of-arrays storage for entity components.
//!
//! Compiles a [`SchemaNode`](swath_core::SchemaNode) and an entity
//! capacity into a [`Store`]: one contiguous buffer per scalar field and
//! one shared buffer per primitive type for fixed-length array fields.
//!
//! # Architecture
//!
//! ```text
//! Registry (caller-owned, StoreHandle → Store)
//! └── Store
//!     ├── StoreNode tree (mirrors the schema; leaves are ids)
//!     ├── ScalarBuffer[]  ← flattened list, one Column per scalar leaf
//!     ├── ArrayField[]    ← packed placements, in compile order
//!     ├── SharedBuffer × per-type (generation-tagged, one Column each)
//!     └── CursorTable     ← per-type element cursor from the last pass
//! ```
//!
//! Every scalar buffer and every shared buffer carries two [`Shadows`]
//! ("query" and "serialize") that change-detection consumers own.
//!
//! # Views
//!
//! Array fields are never handed out as raw slices. An [`EntityView`] is a
//! `(type, generation, offset, len)` descriptor resolved through the store;
//! resizing bumps the shared buffer's generation so a view taken before
//! the resize is rejected with [`StoreError::StaleView`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod column;
pub mod config;
pub mod error;
pub mod handle;
pub mod packer;
pub mod registry;
mod resize;
pub mod shadow;
pub mod store;

pub use column::{Column, Element};
pub use config::StoreConfig;
pub use error::StoreError;
pub use handle::{EntityView, Owned};
pub use packer::{round_up_to_4, ArrayField, ArrayPacker, CursorTable, SharedBuffer};
pub use registry::{Blueprint, Registry};
pub use shadow::{ShadowKind, Shadows};
pub use store::{ScalarBuffer, Store, StoreNode};
