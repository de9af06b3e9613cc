//! Strongly-typed identifiers and the [`FieldPath`] type alias.

use smallvec::SmallVec;
use std::fmt;

/// Identifies a realized store within a store registry.
///
/// Handles are allocated from a monotonic counter owned by the registry
/// and are never reused, so a handle that outlives its store can only
/// ever resolve to nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreHandle(pub u64);

impl fmt::Display for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store#{}", self.0)
    }
}

impl From<u64> for StoreHandle {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Index of one entity's slot across every buffer of a store.
///
/// Valid entity ids are `0..capacity`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl EntityId {
    /// The id as a slot index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for EntityId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Position of a scalar buffer in a store's flattened scalar list.
///
/// Assigned in compile order: `ScalarId(n)` is the n-th `Scalar` leaf
/// met during a depth-first walk of the schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScalarId(pub u32);

impl fmt::Display for ScalarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ScalarId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Position of an array field in a store's packed field list.
///
/// Assigned in compile order, which is also the order fields were packed
/// into their shared buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArrayId(pub u32);

impl fmt::Display for ArrayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ArrayId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Keys from the schema root down to one node.
///
/// Most schemas nest at most a couple of levels, so four inline keys
/// keep paths off the heap in the common case.
pub type FieldPath = SmallVec<[String; 4]>;

/// Render a path as `a.b.c` for diagnostics.
pub fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        return "<root>".to_string();
    }
    path.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_display_is_prefixed() {
        assert_eq!(StoreHandle(7).to_string(), "store#7");
    }

    #[test]
    fn entity_index_matches_raw_value() {
        assert_eq!(EntityId::from(42).index(), 42);
    }

    #[test]
    fn display_path_joins_keys() {
        let path: FieldPath = ["transform", "position"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(display_path(&path), "transform.position");
        assert_eq!(display_path(&[]), "<root>");
    }
}
