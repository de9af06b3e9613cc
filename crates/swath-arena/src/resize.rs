//! Growing a store in place.
//!
//! A resize is built in full before anything is installed: new scalar
//! buffers, a fresh packing of every array field, and one new shared
//! buffer per type with each field's old region copied to its new base.
//! Only then are the store's buffers swapped. On error the store is
//! unchanged.

use indexmap::IndexMap;
use swath_core::PrimitiveType;
use tracing::{debug, trace};

use crate::column::Column;
use crate::error::StoreError;
use crate::packer::{ArrayField, ArrayPacker, SharedBuffer};
use crate::store::{ScalarBuffer, Store};

impl Store {
    /// Grow every buffer to hold `new_capacity` entities.
    ///
    /// Scalar data and scalar shadows keep their prefixes. Array fields
    /// are repacked in their original order against zeroed cursors, and
    /// each field's old data moves to its new base. Every shared buffer's
    /// generation is bumped, so all previously derived
    /// [`EntityView`](crate::EntityView)s and
    /// [`ArrayField`](crate::ArrayField)s go stale. Shared-buffer shadows
    /// are rebuilt as copies of the new data.
    ///
    /// Shrinking is not supported.
    pub fn resize(&mut self, new_capacity: u32) -> Result<(), StoreError> {
        let old_capacity = self.allocated_capacity();
        if new_capacity < old_capacity {
            return Err(StoreError::ShrinkUnsupported {
                current: old_capacity,
                requested: new_capacity,
            });
        }

        let old_arrays = self.arrays();
        let sizes = ArrayPacker::plan(old_arrays.iter().map(|f| (f.ty, f.length)), new_capacity)?;

        let mut packer = ArrayPacker::new(self.handle(), new_capacity);
        let mut arrays = old_arrays
            .iter()
            .map(|f| packer.pack(f.ty, f.length, &[]))
            .collect::<Result<Vec<ArrayField>, _>>()?;

        let scalars: Vec<ScalarBuffer> = self
            .scalars()
            .iter()
            .map(|s| s.resized(new_capacity as usize))
            .collect();

        let mut shared: IndexMap<PrimitiveType, SharedBuffer> = IndexMap::with_capacity(sizes.len());
        for (ty, len) in sizes {
            let mut data = Column::zeroed(ty, len);
            let generation = match self.shared_buffer(ty) {
                Some(old) => {
                    for (before, after) in old_arrays.iter().zip(&arrays).filter(|(b, _)| b.ty == ty) {
                        let region = before.region(old_capacity);
                        data.copy_region_from(old.data(), region.start, after.base, region.len())?;
                    }
                    old.generation().wrapping_add(1)
                }
                None => 0,
            };
            trace!(handle = %self.handle(), %ty, len, generation, "reallocated shared array buffer");
            shared.insert(ty, SharedBuffer::new(data, generation));
        }

        for field in &mut arrays {
            if let Some(buffer) = shared.get(&field.ty) {
                field.generation = buffer.generation();
            }
        }

        let cursors = packer.into_cursors();
        self.install(new_capacity, scalars, arrays, shared, cursors);
        debug!(
            handle = %self.handle(),
            from = old_capacity,
            to = new_capacity,
            "resized store"
        );
        Ok(())
    }
}
