//! Fixed schemas.

use swath_core::{PrimitiveType, SchemaNode};

/// `{ position: f32 × 3, health: ui16 }`.
pub fn position_health() -> SchemaNode {
    SchemaNode::group()
        .with("position", SchemaNode::array(PrimitiveType::F32, 3))
        .with("health", SchemaNode::scalar(PrimitiveType::U16))
}

/// Nested schema with two `f32` array fields sharing a buffer.
///
/// ```text
/// position: f32 × 3
/// health:   ui16
/// body:
///   mass:     f64
///   velocity: f32 × 2
///   flags:    ui8 × 5
/// tint:     ui8c
/// ```
pub fn multi_type() -> SchemaNode {
    SchemaNode::group()
        .with("position", SchemaNode::array(PrimitiveType::F32, 3))
        .with("health", SchemaNode::scalar(PrimitiveType::U16))
        .with(
            "body",
            SchemaNode::group()
                .with("mass", SchemaNode::scalar(PrimitiveType::F64))
                .with("velocity", SchemaNode::array(PrimitiveType::F32, 2))
                .with("flags", SchemaNode::array(PrimitiveType::U8, 5)),
        )
        .with("tint", SchemaNode::scalar(PrimitiveType::U8Clamped))
}

/// One scalar and one array field of every primitive type.
///
/// Scalars live under `scalars.<name>`, arrays under `arrays.<name>`
/// with length 2.
pub fn every_type() -> SchemaNode {
    let mut scalars = SchemaNode::group();
    let mut arrays = SchemaNode::group();
    for ty in PrimitiveType::ALL {
        scalars = scalars.with(ty.name(), SchemaNode::scalar(ty));
        arrays = arrays.with(ty.name(), SchemaNode::array(ty, 2));
    }
    SchemaNode::group()
        .with("scalars", scalars)
        .with("arrays", arrays)
}
