//! Array field packing into per-type shared buffers.
//!
//! All `Array` leaves of one primitive type share a single contiguous
//! [`SharedBuffer`]. Fields are laid out back to back in compile order:
//!
//! ```text
//! f32 shared buffer, capacity N
//! ├── position (len 3): [0, 3N)          entity e → [3e, 3e + 3)
//! ├── velocity (len 3): [3N, 6N)         entity e → [3N + 3e, 3N + 3e + 3)
//! └── padding up to a multiple of 4 elements
//! ```
//!
//! A per-type [`CursorTable`] names the first free element of each
//! buffer while a pass is running. It starts at zero on every build and
//! every resize, and only moves forward.

use std::ops::Range;

use indexmap::IndexMap;
use swath_core::{display_path, ConfigError, EntityId, IndexWidth, PrimitiveType, StoreHandle};

use crate::column::Column;
use crate::handle::Owned;
use crate::shadow::{ShadowKind, Shadows};

/// Round `n` up to the next multiple of four, or `None` on overflow.
pub fn round_up_to_4(n: usize) -> Option<usize> {
    n.div_ceil(4).checked_mul(4)
}

/// Per-type element cursor into the shared buffers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CursorTable {
    cursors: [usize; PrimitiveType::COUNT],
}

impl CursorTable {
    /// All cursors at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cursor for `ty`.
    pub fn get(&self, ty: PrimitiveType) -> usize {
        self.cursors[ty.ordinal()]
    }

    /// Move the cursor for `ty` forward by `by` elements.
    ///
    /// Returns the cursor position before the move, or `None` if the new
    /// position would overflow.
    pub fn advance(&mut self, ty: PrimitiveType, by: usize) -> Option<usize> {
        let slot = &mut self.cursors[ty.ordinal()];
        let start = *slot;
        *slot = start.checked_add(by)?;
        Some(start)
    }

    /// Every type with a non-zero cursor.
    pub fn iter(&self) -> impl Iterator<Item = (PrimitiveType, usize)> + '_ {
        PrimitiveType::ALL
            .into_iter()
            .map(|ty| (ty, self.get(ty)))
            .filter(|&(_, c)| c > 0)
    }
}

/// Placement of one `Array` leaf inside its type's shared buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArrayField {
    pub(crate) owner: StoreHandle,
    pub(crate) ty: PrimitiveType,
    pub(crate) length: u32,
    pub(crate) base: usize,
    pub(crate) index_width: IndexWidth,
    /// Generation of the shared buffer this placement was made for.
    pub(crate) generation: u32,
}

impl ArrayField {
    /// Element type.
    pub fn ty(&self) -> PrimitiveType {
        self.ty
    }

    /// Slots per entity.
    pub fn length(&self) -> u32 {
        self.length
    }

    /// First element of this field's region in the shared buffer.
    pub fn base(&self) -> usize {
        self.base
    }

    /// Smallest unsigned width able to index this field's slots.
    pub fn index_width(&self) -> IndexWidth {
        self.index_width
    }

    /// Generation of the shared buffer this placement belongs to.
    ///
    /// A resize moves fields to new bases, so a placement kept from before
    /// it no longer matches its buffer and views derived from it are
    /// rejected.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Element range holding `entity`'s slots.
    pub fn span(&self, entity: EntityId) -> Range<usize> {
        let len = self.length as usize;
        let from = self.base + entity.index() * len;
        from..from + len
    }

    /// Element range holding every entity's slots at `capacity`.
    pub fn region(&self, capacity: u32) -> Range<usize> {
        self.base..self.base + capacity as usize * self.length as usize
    }
}

impl Owned for ArrayField {
    fn owner(&self) -> StoreHandle {
        self.owner
    }
}

/// One shared buffer and its shadows.
///
/// The generation starts at zero and is bumped every time the buffer is
/// reallocated, which invalidates every [`EntityView`](crate::EntityView)
/// derived before.
#[derive(Clone, Debug, PartialEq)]
pub struct SharedBuffer {
    data: Column,
    shadows: Shadows,
    generation: u32,
}

impl SharedBuffer {
    /// Wrap `data` at its final size for this pass, shadowing it.
    pub(crate) fn new(data: Column, generation: u32) -> Self {
        Self {
            shadows: Shadows::of(&data),
            data,
            generation,
        }
    }

    /// Element type.
    pub fn ty(&self) -> PrimitiveType {
        self.data.ty()
    }

    /// Number of elements, including padding.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current generation.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Live data.
    pub fn data(&self) -> &Column {
        &self.data
    }

    /// Mutable live data.
    pub fn data_mut(&mut self) -> &mut Column {
        &mut self.data
    }

    /// Both shadows.
    pub fn shadows(&self) -> &Shadows {
        &self.shadows
    }

    /// One shadow.
    pub fn shadow(&self, kind: ShadowKind) -> &Column {
        self.shadows.get(kind)
    }

    /// One shadow, mutably.
    pub fn shadow_mut(&mut self, kind: ShadowKind) -> &mut Column {
        self.shadows.get_mut(kind)
    }

    /// Size of data plus shadows in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.data.memory_bytes() + self.shadows.memory_bytes()
    }
}

/// Assigns array fields their place in the shared buffers for one pass.
///
/// A packer lives for exactly one build or resize. Sizing
/// ([`ArrayPacker::plan`]) and placement ([`ArrayPacker::pack`]) are
/// separate so every shared buffer can be allocated once, at its final
/// size, before any data is copied.
#[derive(Debug)]
pub struct ArrayPacker {
    owner: StoreHandle,
    capacity: u32,
    cursors: CursorTable,
}

impl ArrayPacker {
    /// Start a pass for a store of `capacity` entities.
    pub fn new(owner: StoreHandle, capacity: u32) -> Self {
        Self {
            owner,
            capacity,
            cursors: CursorTable::new(),
        }
    }

    /// Element count of each shared buffer, keyed by type in first-seen order.
    ///
    /// Each buffer holds `round_up_to_4(Σ length × capacity)` elements, the
    /// sum running over the `(type, length)` leaves of that type only.
    pub fn plan<I>(leaves: I, capacity: u32) -> Result<IndexMap<PrimitiveType, usize>, ConfigError>
    where
        I: IntoIterator<Item = (PrimitiveType, u32)>,
    {
        let mut lengths: IndexMap<PrimitiveType, usize> = IndexMap::new();
        for (ty, length) in leaves {
            let sum = lengths.entry(ty).or_insert(0);
            *sum = sum.checked_add(length as usize).ok_or_else(|| overflow(ty))?;
        }

        lengths
            .into_iter()
            .map(|(ty, summed)| {
                summed
                    .checked_mul(capacity as usize)
                    .and_then(round_up_to_4)
                    .map(|len| (ty, len))
                    .ok_or_else(|| overflow(ty))
            })
            .collect()
    }

    /// Place the next field of type `ty` and advance that type's cursor
    /// by `capacity × length`.
    pub fn pack(
        &mut self,
        ty: PrimitiveType,
        length: u32,
        path: &[String],
    ) -> Result<ArrayField, ConfigError> {
        if length == 0 {
            return Err(ConfigError::MissingLength {
                path: display_path(path),
            });
        }
        let span = (self.capacity as usize)
            .checked_mul(length as usize)
            .ok_or_else(|| overflow(ty))?;
        let base = self.cursors.advance(ty, span).ok_or_else(|| overflow(ty))?;
        Ok(ArrayField {
            owner: self.owner,
            ty,
            length,
            base,
            index_width: IndexWidth::for_length(length),
            generation: 0,
        })
    }

    /// Cursor positions so far.
    pub fn cursors(&self) -> &CursorTable {
        &self.cursors
    }

    /// Finish the pass, keeping the final cursor positions.
    pub fn into_cursors(self) -> CursorTable {
        self.cursors
    }
}

fn overflow(ty: PrimitiveType) -> ConfigError {
    ConfigError::Overflow {
        what: format!("{ty} shared buffer"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: StoreHandle = StoreHandle(1);

    fn path(s: &str) -> Vec<String> {
        vec![s.to_string()]
    }

    #[test]
    fn round_up_to_4_rounds() {
        assert_eq!(round_up_to_4(0), Some(0));
        assert_eq!(round_up_to_4(1), Some(4));
        assert_eq!(round_up_to_4(12), Some(12));
        assert_eq!(round_up_to_4(13), Some(16));
        assert_eq!(round_up_to_4(usize::MAX), None);
    }

    #[test]
    fn plan_sizes_each_type_from_its_own_fields() {
        let plan = ArrayPacker::plan(
            [
                (PrimitiveType::F32, 3),
                (PrimitiveType::U8, 5),
                (PrimitiveType::F32, 2),
            ],
            10,
        )
        .unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[&PrimitiveType::F32], 50);
        // 5 * 10 = 50, padded to 52.
        assert_eq!(plan[&PrimitiveType::U8], 52);
        assert_eq!(
            plan.keys().copied().collect::<Vec<_>>(),
            [PrimitiveType::F32, PrimitiveType::U8]
        );
    }

    #[test]
    fn plan_reports_overflow() {
        let result = ArrayPacker::plan(
            std::iter::repeat_n((PrimitiveType::F64, u32::MAX), 3),
            u32::MAX,
        );
        assert!(matches!(result, Err(ConfigError::Overflow { .. })));
    }

    #[test]
    fn pack_advances_cursor_by_capacity_times_length() {
        let mut packer = ArrayPacker::new(OWNER, 4);
        let a = packer.pack(PrimitiveType::F32, 3, &path("a")).unwrap();
        let b = packer.pack(PrimitiveType::F32, 2, &path("b")).unwrap();
        let c = packer.pack(PrimitiveType::I8, 7, &path("c")).unwrap();

        assert_eq!(a.base(), 0);
        assert_eq!(b.base(), 12);
        assert_eq!(c.base(), 0);
        assert_eq!(packer.cursors().get(PrimitiveType::F32), 20);
        assert_eq!(packer.cursors().get(PrimitiveType::I8), 28);
        assert_eq!(packer.cursors().get(PrimitiveType::U16), 0);
    }

    #[test]
    fn spans_follow_entity_offsets() {
        let mut packer = ArrayPacker::new(OWNER, 4);
        packer.pack(PrimitiveType::F32, 3, &path("a")).unwrap();
        let b = packer.pack(PrimitiveType::F32, 2, &path("b")).unwrap();
        assert_eq!(b.span(EntityId(0)), 12..14);
        assert_eq!(b.span(EntityId(3)), 18..20);
        assert_eq!(b.region(4), 12..20);
    }

    #[test]
    fn pack_records_index_width() {
        let mut packer = ArrayPacker::new(OWNER, 1);
        let small = packer.pack(PrimitiveType::U8, 10, &path("s")).unwrap();
        let mid = packer.pack(PrimitiveType::U8, 300, &path("m")).unwrap();
        let big = packer.pack(PrimitiveType::U8, 70_000, &path("b")).unwrap();
        assert_eq!(small.index_width(), IndexWidth::U8);
        assert_eq!(mid.index_width(), IndexWidth::U16);
        assert_eq!(big.index_width(), IndexWidth::U32);
    }

    #[test]
    fn pack_rejects_missing_length() {
        let mut packer = ArrayPacker::new(OWNER, 8);
        let err = packer.pack(PrimitiveType::F32, 0, &path("pos")).unwrap_err();
        assert_eq!(err, ConfigError::MissingLength { path: "pos".into() });
        // The cursor did not move.
        assert_eq!(packer.cursors().get(PrimitiveType::F32), 0);
    }

    #[test]
    fn cursor_iter_skips_untouched_types() {
        let mut packer = ArrayPacker::new(OWNER, 2);
        packer.pack(PrimitiveType::I32, 1, &path("a")).unwrap();
        let cursors = packer.into_cursors();
        assert_eq!(cursors.iter().collect::<Vec<_>>(), [(PrimitiveType::I32, 2)]);
    }

    #[test]
    fn shared_buffer_shadows_match_data() {
        let buffer = SharedBuffer::new(Column::zeroed(PrimitiveType::F32, 12), 0);
        assert_eq!(buffer.shadow(ShadowKind::Query).len(), 12);
        assert_eq!(buffer.shadow(ShadowKind::Serialize).len(), 12);
        assert_eq!(buffer.memory_bytes(), 3 * 12 * 4);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn arb_type() -> impl Strategy<Value = PrimitiveType> {
            proptest::sample::select(PrimitiveType::ALL.to_vec())
        }

        proptest! {
            #[test]
            fn fields_of_one_type_never_overlap(
                fields in prop::collection::vec((arb_type(), 1u32..16), 1..12),
                capacity in 1u32..32,
            ) {
                let plan = ArrayPacker::plan(fields.iter().copied(), capacity).unwrap();
                let mut packer = ArrayPacker::new(OWNER, capacity);
                let packed: Vec<ArrayField> = fields
                    .iter()
                    .enumerate()
                    .map(|(i, &(ty, len))| packer.pack(ty, len, &[format!("f{i}")]).unwrap())
                    .collect();

                for (i, a) in packed.iter().enumerate() {
                    prop_assert!(a.region(capacity).end <= plan[&a.ty()]);
                    for b in &packed[i + 1..] {
                        if a.ty() == b.ty() {
                            let (ra, rb) = (a.region(capacity), b.region(capacity));
                            prop_assert!(ra.end <= rb.start || rb.end <= ra.start);
                        }
                    }
                }
            }

            #[test]
            fn cursor_ends_at_summed_region(
                lengths in prop::collection::vec(1u32..64, 1..8),
                capacity in 1u32..64,
            ) {
                let mut packer = ArrayPacker::new(OWNER, capacity);
                for (i, &len) in lengths.iter().enumerate() {
                    packer.pack(PrimitiveType::U16, len, &[format!("f{i}")]).unwrap();
                }
                let total: usize = lengths.iter().map(|&l| l as usize * capacity as usize).sum();
                prop_assert_eq!(packer.cursors().get(PrimitiveType::U16), total);
            }
        }
    }
}
