//! Shadow copies for change detection.
//!
//! Every scalar buffer and every shared array buffer owns two shadows:
//! one for the query system and one for the serializer. The store only
//! guarantees that they exist, start as exact copies, and are rebuilt on
//! resize. Keeping them in step with the live data between resizes is the
//! job of whoever compares against them; a reset does not touch them.

use crate::column::Column;

/// Which consumer a shadow belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShadowKind {
    /// Snapshot used by queries to detect changed components.
    Query,
    /// Snapshot used by the serializer to emit only changed values.
    Serialize,
}

/// The query and serialize shadows of one buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct Shadows {
    query: Column,
    serialize: Column,
}

impl Shadows {
    /// Two independent copies of `source` as it is right now.
    pub fn of(source: &Column) -> Self {
        Self {
            query: source.clone(),
            serialize: source.clone(),
        }
    }

    /// Both shadows grown to `len`, each from its own prior contents.
    ///
    /// Used for scalar buffers so that whatever a consumer last recorded
    /// survives the resize.
    pub fn resized(&self, len: usize) -> Self {
        Self {
            query: self.query.resized(len),
            serialize: self.serialize.resized(len),
        }
    }

    /// Borrow one shadow.
    pub fn get(&self, kind: ShadowKind) -> &Column {
        match kind {
            ShadowKind::Query => &self.query,
            ShadowKind::Serialize => &self.serialize,
        }
    }

    /// Mutably borrow one shadow.
    pub fn get_mut(&mut self, kind: ShadowKind) -> &mut Column {
        match kind {
            ShadowKind::Query => &mut self.query,
            ShadowKind::Serialize => &mut self.serialize,
        }
    }

    /// Length shared by both shadows.
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.query.len(), self.serialize.len());
        self.query.len()
    }

    /// Whether the shadows are empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Combined size of both shadows in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.query.memory_bytes() + self.serialize.memory_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swath_core::PrimitiveType;

    fn filled(values: &[i32]) -> Column {
        let mut col = Column::zeroed(PrimitiveType::I32, values.len());
        col.as_mut_slice::<i32>().unwrap().copy_from_slice(values);
        col
    }

    #[test]
    fn shadows_start_as_exact_copies() {
        let source = filled(&[3, 1, 4]);
        let shadows = Shadows::of(&source);
        assert_eq!(shadows.get(ShadowKind::Query), &source);
        assert_eq!(shadows.get(ShadowKind::Serialize), &source);
        assert_eq!(shadows.len(), source.len());
    }

    #[test]
    fn shadows_are_independent_of_source_and_each_other() {
        let mut source = filled(&[1, 2]);
        let mut shadows = Shadows::of(&source);
        source.as_mut_slice::<i32>().unwrap()[0] = 99;
        shadows.get_mut(ShadowKind::Query).as_mut_slice::<i32>().unwrap()[1] = 7;

        assert_eq!(shadows.get(ShadowKind::Query).as_slice::<i32>().unwrap(), &[1, 7]);
        assert_eq!(shadows.get(ShadowKind::Serialize).as_slice::<i32>().unwrap(), &[1, 2]);
    }

    #[test]
    fn resized_grows_from_own_contents() {
        let source = filled(&[5, 6]);
        let mut shadows = Shadows::of(&source);
        shadows.get_mut(ShadowKind::Serialize).as_mut_slice::<i32>().unwrap()[0] = -5;

        let grown = shadows.resized(4);
        assert_eq!(grown.len(), 4);
        assert_eq!(grown.get(ShadowKind::Query).as_slice::<i32>().unwrap(), &[5, 6, 0, 0]);
        assert_eq!(
            grown.get(ShadowKind::Serialize).as_slice::<i32>().unwrap(),
            &[-5, 6, 0, 0]
        );
    }
}
