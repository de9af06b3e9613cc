//! Entity views and owner back-references.
//!
//! An [`EntityView`] encodes where one entity's slots for one array field
//! live inside a shared buffer. It is generation-scoped: the `generation`
//! field allows O(1) staleness checks against the buffer it points into.

use std::ops::Range;

use swath_core::{EntityId, IndexWidth, PrimitiveType, StoreHandle};

/// Non-owning descriptor of one (array field, entity) span.
///
/// Views are plain data. Resolve them with
/// [`Store::view_data`](crate::Store::view_data) and friends; the store
/// rejects views whose generation no longer matches the shared buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct EntityView {
    /// Store the view was derived from.
    pub(crate) owner: StoreHandle,
    /// Which shared buffer this view points into.
    pub(crate) ty: PrimitiveType,
    /// Generation of the shared buffer when the view was derived.
    pub(crate) generation: u32,
    /// Element offset of the first slot.
    pub(crate) offset: usize,
    /// Number of slots.
    pub(crate) len: u32,
    /// The entity this span belongs to.
    pub(crate) entity: EntityId,
    /// Index width of the field.
    pub(crate) index_width: IndexWidth,
}

impl EntityView {
    /// Primitive type of the shared buffer.
    pub fn ty(&self) -> PrimitiveType {
        self.ty
    }

    /// The generation this view belongs to.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Element offset of the first slot in the shared buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of slots.
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Whether the view spans no slots.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Element range inside the shared buffer.
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.len as usize
    }

    /// The entity this view belongs to.
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Smallest index width able to address this view's slots.
    pub fn index_width(&self) -> IndexWidth {
        self.index_width
    }

    /// Bytes per encoded index.
    pub fn index_bytes(&self) -> usize {
        self.index_width.bytes()
    }

    /// Size of the span in bytes.
    pub fn byte_len(&self) -> usize {
        self.len as usize * self.ty.bytes()
    }
}

/// Anything that remembers which store it came from.
///
/// The back-reference is a handle, not a pointer: once the store is freed
/// from its registry, [`Registry::resolve`](crate::Registry::resolve)
/// returns `None` for every item it handed out.
pub trait Owned {
    /// Handle of the owning store.
    fn owner(&self) -> StoreHandle;
}

impl Owned for EntityView {
    fn owner(&self) -> StoreHandle {
        self.owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(offset: usize, len: u32) -> EntityView {
        EntityView {
            owner: StoreHandle(1),
            ty: PrimitiveType::F32,
            generation: 2,
            offset,
            len,
            entity: EntityId(4),
            index_width: IndexWidth::for_length(len),
        }
    }

    #[test]
    fn range_spans_len_slots() {
        let v = view(12, 3);
        assert_eq!(v.range(), 12..15);
        assert_eq!(v.byte_len(), 12);
        assert!(!v.is_empty());
        assert_eq!(v.index_bytes(), 1);
        assert_eq!(v.owner(), StoreHandle(1));
    }
}
