//! Proptest strategies for schemas.

use proptest::prelude::*;
use swath_core::{PrimitiveType, SchemaNode};

pub fn arb_primitive_type() -> impl Strategy<Value = PrimitiveType> {
    proptest::sample::select(PrimitiveType::ALL.to_vec())
}

/// A scalar or an array leaf of length 1..=8.
pub fn arb_leaf() -> impl Strategy<Value = SchemaNode> {
    prop_oneof![
        arb_primitive_type().prop_map(SchemaNode::scalar),
        (arb_primitive_type(), 1u32..=8).prop_map(|(ty, length)| SchemaNode::array(ty, length)),
    ]
}

/// Any valid schema, including a bare leaf at the root.
pub fn arb_schema() -> impl Strategy<Value = SchemaNode> {
    arb_leaf().prop_recursive(3, 24, 4, |inner| {
        prop::collection::btree_map("[a-z]{1,6}", inner, 1..5).prop_map(group_of)
    })
}

/// A group at the root with at least one child.
pub fn arb_group_schema() -> impl Strategy<Value = SchemaNode> {
    prop::collection::btree_map("[a-z]{1,6}", arb_schema(), 1..6).prop_map(group_of)
}

fn group_of(children: std::collections::BTreeMap<String, SchemaNode>) -> SchemaNode {
    children
        .into_iter()
        .fold(SchemaNode::group(), |group, (name, child)| group.with(name, child))
}
