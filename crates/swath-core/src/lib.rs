//! Core types for the Swath structure-of-arrays entity store.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the primitive type catalog, the declarative component schema, the
//! identifiers shared by every store, and configuration errors.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod schema;
pub mod types;

pub use error::ConfigError;
pub use id::{display_path, ArrayId, EntityId, FieldPath, ScalarId, StoreHandle};
pub use schema::SchemaNode;
pub use types::{clamp_u8, IndexWidth, PrimitiveType};
