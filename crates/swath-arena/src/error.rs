//! Store-level error types.

use swath_core::{ConfigError, EntityId, PrimitiveType, StoreHandle};
use thiserror::Error;

/// Errors that can occur while building, resizing, or reading a store.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The schema or capacity could not be compiled.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// No store is registered under this handle (never created, or freed).
    #[error("unknown store: {handle}")]
    UnknownStore {
        /// The handle that failed to resolve.
        handle: StoreHandle,
    },
    /// No leaf of the requested kind exists at this path.
    #[error("no such field: {path}")]
    NoSuchField {
        /// Dotted path that was looked up.
        path: String,
    },
    /// An entity id at or beyond the allocated capacity.
    #[error("entity {entity} out of range for capacity {capacity}")]
    EntityOutOfRange {
        /// The rejected entity.
        entity: EntityId,
        /// Capacity the buffers are allocated for.
        capacity: u32,
    },
    /// An [`EntityView`](crate::EntityView) taken before the last resize.
    #[error("stale view: generation {view_generation}, buffer is at {current_generation}")]
    StaleView {
        /// Generation recorded in the view.
        view_generation: u32,
        /// Current generation of the shared buffer.
        current_generation: u32,
    },
    /// A view that belongs to a different store.
    #[error("view owned by {view_owner} resolved against {store}")]
    ForeignView {
        /// Store the view was derived from.
        view_owner: StoreHandle,
        /// Store it was resolved against.
        store: StoreHandle,
    },
    /// An element range that does not fit inside its buffer.
    #[error("elements {start}..{end} out of bounds for buffer of {len}")]
    OutOfBounds {
        /// First requested element.
        start: usize,
        /// One past the last requested element.
        end: usize,
        /// Length of the buffer.
        len: usize,
    },
    /// Typed access with a Rust type that does not match the buffer.
    #[error("type mismatch: requested {expected}, buffer holds {found}")]
    TypeMismatch {
        /// Rust element type that was requested.
        expected: &'static str,
        /// Primitive type actually stored.
        found: PrimitiveType,
    },
    /// Resizing to fewer entities than are already allocated.
    #[error("cannot shrink store from {current} to {requested} entities")]
    ShrinkUnsupported {
        /// Currently allocated capacity.
        current: u32,
        /// Requested capacity.
        requested: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_convert_transparently() {
        let err: StoreError = ConfigError::ZeroCapacity.into();
        assert_eq!(err.to_string(), ConfigError::ZeroCapacity.to_string());
    }

    #[test]
    fn stale_view_message_names_generations() {
        let err = StoreError::StaleView {
            view_generation: 1,
            current_generation: 3,
        };
        assert_eq!(err.to_string(), "stale view: generation 1, buffer is at 3");
    }

    #[test]
    fn out_of_bounds_message_names_range() {
        let err = StoreError::OutOfBounds {
            start: 200,
            end: 203,
            len: 16,
        };
        assert_eq!(err.to_string(), "elements 200..203 out of bounds for buffer of 16");
    }
}
