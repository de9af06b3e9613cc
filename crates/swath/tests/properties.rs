//! Layout properties of freshly created, reset, resized, and freed stores.

use proptest::prelude::*;
use swath::prelude::*;
use swath_test_utils::{schemas, strategies};

fn scalars_only() -> SchemaNode {
    SchemaNode::group()
        .with("hp", SchemaNode::scalar(PrimitiveType::U16))
        .with("alive", SchemaNode::scalar(PrimitiveType::Bool))
        .with(
            "stats",
            SchemaNode::group()
                .with("speed", SchemaNode::scalar(PrimitiveType::F32))
                .with("armor", SchemaNode::scalar(PrimitiveType::I8)),
        )
}

#[test]
fn scalar_buffers_hold_capacity_zeroed_elements() {
    let mut registry = Registry::new();
    let handle = registry.create_store(&scalars_only(), 37).unwrap();
    let store = registry.get(handle).unwrap();

    assert_eq!(store.scalars().len(), 4);
    for scalar in store.scalars() {
        assert_eq!(scalar.len(), 37);
        assert!(scalar.data().is_zeroed());
    }
    assert_eq!(store.shared_buffers().count(), 0);
}

#[test]
fn same_type_array_fields_do_not_overlap() {
    let schema = SchemaNode::group()
        .with("a", SchemaNode::array(PrimitiveType::I16, 3))
        .with("b", SchemaNode::array(PrimitiveType::I16, 5));
    let store = Store::build(&schema, 6, StoreHandle(1)).unwrap();
    let (a, b) = (store.array(&["a"]).unwrap(), store.array(&["b"]).unwrap());

    for va in store.views(a).unwrap() {
        for vb in store.views(b).unwrap() {
            let (ra, rb) = (va.range(), vb.range());
            assert!(ra.end <= rb.start || rb.end <= ra.start, "{va:?} overlaps {vb:?}");
        }
    }
}

#[test]
fn index_width_tracks_array_length() {
    let schema = SchemaNode::group()
        .with("small", SchemaNode::array(PrimitiveType::U8, 10))
        .with("medium", SchemaNode::array(PrimitiveType::U8, 300))
        .with("large", SchemaNode::array(PrimitiveType::U8, 70_000));
    let store = Store::build(&schema, 1, StoreHandle(1)).unwrap();

    assert_eq!(store.array(&["small"]).unwrap().index_width(), IndexWidth::U8);
    assert_eq!(store.array(&["medium"]).unwrap().index_width(), IndexWidth::U16);
    assert_eq!(store.array(&["large"]).unwrap().index_width(), IndexWidth::U32);

    let view = store
        .entity_view(store.array(&["medium"]).unwrap(), EntityId(0))
        .unwrap();
    assert_eq!(view.index_bytes(), 2);
}

#[test]
fn reset_keeps_capacity_and_offsets() {
    let mut registry = Registry::new();
    let handle = registry.create_store(&schemas::multi_type(), 5).unwrap();
    let store = registry.get_mut(handle).unwrap();

    store.scalar_mut(&["body", "mass"]).unwrap().set(EntityId(4), 2.5f64).unwrap();
    store
        .entity_data_mut::<u8>(&["body", "flags"], EntityId(2))
        .unwrap()
        .fill(1);
    let velocity = store.array(&["body", "velocity"]).unwrap();
    let before: Vec<usize> = store.views(velocity).unwrap().map(|v| v.offset()).collect();

    registry.reset_store(handle).unwrap();

    let store = registry.get(handle).unwrap();
    assert_eq!(store.capacity(), 5);
    assert!(store.scalars().iter().all(|s| s.data().is_zeroed()));
    assert!(store.shared_buffers().all(|(_, b)| b.data().is_zeroed()));
    let after: Vec<usize> = store.views(velocity).unwrap().map(|v| v.offset()).collect();
    assert_eq!(before, after);
    assert!(store
        .entity_view(velocity, EntityId(0))
        .and_then(|v| store.view_data::<f32>(&v).map(|_| ()))
        .is_ok());
}

#[test]
fn free_severs_back_references_only() {
    let mut registry = Registry::new();
    let handle = registry.create_store(&schemas::position_health(), 3).unwrap();
    registry
        .get_mut(handle)
        .unwrap()
        .scalar_mut(&["health"])
        .unwrap()
        .set(EntityId(1), 42u16)
        .unwrap();

    let freed = registry.free(handle).unwrap();
    let health = freed.scalar(&["health"]).unwrap();

    assert!(registry.resolve(health).is_none());
    assert!(registry.resolve(&freed.array(&["position"]).unwrap()).is_none());
    assert!(registry.resolve(&freed).is_none());
    assert_eq!(health.get::<u16>(EntityId(1)).unwrap(), 42);
}

#[test]
fn recreating_from_a_store_keeps_buffer_identity() {
    let mut registry = Registry::new();
    let handle = registry.create_store(&schemas::position_health(), 4).unwrap();
    let ptr = |r: &Registry| {
        r.get(handle)
            .unwrap()
            .shared_buffer(PrimitiveType::F32)
            .unwrap()
            .data()
            .as_slice::<f32>()
            .unwrap()
            .as_ptr()
    };
    let before = ptr(&registry);

    let again = registry.create_store(handle, 1_000).unwrap();

    assert_eq!(again, handle);
    assert_eq!(ptr(&registry), before);
    assert_eq!(registry.get(handle).unwrap().capacity(), 1_000);
    assert_eq!(registry.len(), 1);
}

#[test]
fn resize_preserves_scalar_values() {
    const N: u32 = 6;
    const M: u32 = 15;
    let mut registry = Registry::new();
    let handle = registry.create_store(&schemas::position_health(), N).unwrap();
    {
        let health = registry.get_mut(handle).unwrap().scalar_mut(&["health"]).unwrap();
        for e in 0..N {
            health.set(EntityId(e), (e as u16 + 1) * 100).unwrap();
        }
    }

    registry.resize_store(handle, M).unwrap();

    let health = registry.get(handle).unwrap().scalar(&["health"]).unwrap();
    assert_eq!(health.len(), M as usize);
    for e in 0..N {
        assert_eq!(health.get::<u16>(EntityId(e)).unwrap(), (e as u16 + 1) * 100);
    }
    for e in N..M {
        assert_eq!(health.get::<u16>(EntityId(e)).unwrap(), 0);
    }
}

#[test]
fn position_health_scenario() {
    let mut registry = Registry::new();
    let handle = registry.create_store(&schemas::position_health(), 4).unwrap();
    let store = registry.get(handle).unwrap();

    assert_eq!(store.array_field_count(), 1);

    let shared = store.shared_buffer(PrimitiveType::F32).unwrap();
    let floor = swath::arena::round_up_to_4(3 * store.array_field_count() * 4).unwrap();
    assert!(shared.len() >= floor);

    let health = store.scalar(&["health"]).unwrap();
    assert_eq!(health.ty(), PrimitiveType::U16);
    assert_eq!(health.len(), 4);

    let position = store.array(&["position"]).unwrap();
    assert_eq!(position.index_width(), IndexWidth::U8);

    let views: Vec<EntityView> = store.views(position).unwrap().collect();
    assert_eq!(views.len(), 4);
    for (i, a) in views.iter().enumerate() {
        assert_eq!(a.len(), 3);
        assert_eq!(a.entity(), EntityId(i as u32));
        assert!(a.range().end <= shared.len());
        for b in &views[i + 1..] {
            assert!(a.range().end <= b.range().start || b.range().end <= a.range().start);
        }
    }
}

#[test]
fn every_primitive_type_gets_its_own_shared_buffer() {
    let store = Store::build(&schemas::every_type(), 3, StoreHandle(1)).unwrap();
    assert_eq!(store.scalars().len(), PrimitiveType::COUNT);
    assert_eq!(store.shared_buffers().count(), PrimitiveType::COUNT);
    for (ty, buffer) in store.shared_buffers() {
        assert_eq!(buffer.ty(), ty);
        // One field of length 2 at capacity 3 is 6 elements, padded to 8.
        assert_eq!(buffer.len(), 8);
    }
}

proptest! {
    #[test]
    fn views_stay_in_bounds_and_disjoint(schema in strategies::arb_group_schema(), capacity in 1u32..12) {
        let store = Store::build(&schema, capacity, StoreHandle(1)).unwrap();

        let mut spans: Vec<(PrimitiveType, std::ops::Range<usize>)> = Vec::new();
        for &field in store.arrays() {
            let len = store.shared_buffer(field.ty()).unwrap().len();
            prop_assert_eq!(len % 4, 0);
            for view in store.views(field).unwrap() {
                prop_assert!(view.range().end <= len);
                spans.push((view.ty(), view.range()));
            }
        }
        for (i, (ta, a)) in spans.iter().enumerate() {
            for (tb, b) in &spans[i + 1..] {
                if ta == tb {
                    prop_assert!(a.end <= b.start || b.end <= a.start);
                }
            }
        }
    }

    #[test]
    fn every_buffer_has_two_equal_length_shadows(schema in strategies::arb_schema(), capacity in 1u32..16) {
        let store = Store::build(&schema, capacity, StoreHandle(1)).unwrap();
        for scalar in store.scalars() {
            prop_assert_eq!(scalar.shadow(ShadowKind::Query).len(), scalar.len());
            prop_assert_eq!(scalar.shadow(ShadowKind::Serialize).len(), scalar.len());
        }
        for (_, buffer) in store.shared_buffers() {
            prop_assert_eq!(buffer.shadow(ShadowKind::Query).len(), buffer.len());
            prop_assert_eq!(buffer.shadow(ShadowKind::Serialize).len(), buffer.len());
        }
        prop_assert_eq!(store.arrays().len(), schema.array_field_count());
    }
}
