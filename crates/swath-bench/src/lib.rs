//! Benchmark profiles for swath stores.
//!
//! - [`reference_schema`]: a game-entity schema with nested groups and
//!   several array fields per type
//! - [`populate`]: deterministic fill of every scalar and array buffer

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use swath_arena::{Column, Store};
use swath_core::{PrimitiveType, ScalarId, SchemaNode};

/// Entity count used by the 10K benchmarks.
pub const REFERENCE_CAPACITY: u32 = 10_000;

/// Schema shaped like a typical simulation entity.
///
/// Three `f32` arrays share one buffer, so resize exercises per-field
/// relocation rather than a single prefix copy.
pub fn reference_schema() -> SchemaNode {
    SchemaNode::group()
        .with(
            "transform",
            SchemaNode::group()
                .with("position", SchemaNode::array(PrimitiveType::F32, 3))
                .with("rotation", SchemaNode::array(PrimitiveType::F32, 4))
                .with("scale", SchemaNode::array(PrimitiveType::F32, 3)),
        )
        .with("health", SchemaNode::scalar(PrimitiveType::U16))
        .with("team", SchemaNode::scalar(PrimitiveType::U8))
        .with("alive", SchemaNode::scalar(PrimitiveType::Bool))
        .with("inventory", SchemaNode::array(PrimitiveType::U32, 16))
        .with("color", SchemaNode::array(PrimitiveType::U8Clamped, 4))
        .with("mass", SchemaNode::scalar(PrimitiveType::F64))
}

/// Write a position-dependent pattern into every buffer of `store`.
pub fn populate(store: &mut Store) {
    for id in 0..store.scalars().len() {
        if let Some(scalar) = store.scalar_by_id_mut(ScalarId(id as u32)) {
            fill(scalar.data_mut());
        }
    }
    for ty in PrimitiveType::ALL {
        if let Some(buffer) = store.shared_buffer_mut(ty) {
            fill(buffer.data_mut());
        }
    }
}

fn fill(column: &mut Column) {
    macro_rules! pattern {
        ($t:ty) => {
            if let Ok(slice) = column.as_mut_slice::<$t>() {
                for (i, v) in slice.iter_mut().enumerate() {
                    *v = (i % 100) as $t;
                }
            }
        };
    }
    match column.ty() {
        PrimitiveType::Bool | PrimitiveType::U8 | PrimitiveType::U8Clamped => pattern!(u8),
        PrimitiveType::I8 => pattern!(i8),
        PrimitiveType::I16 => pattern!(i16),
        PrimitiveType::U16 => pattern!(u16),
        PrimitiveType::I32 => pattern!(i32),
        PrimitiveType::U32 => pattern!(u32),
        PrimitiveType::F32 => pattern!(f32),
        PrimitiveType::F64 => pattern!(f64),
    }
}
