use host_model::MemoryShape;
use proptest::prelude::*;
use propsync_types::{ParamValue, PropertyKind, SubshapeKind};
use test_harness::helpers::p;
use test_harness::Scenario;

// ----------------------------------------------------------------------------
// Strategy helpers
// ----------------------------------------------------------------------------

fn arb_offset() -> impl Strategy<Value = (f64, f64, f64)> {
    (-1.0e3..1.0e3f64, -1.0e3..1.0e3f64, -1.0e3..1.0e3f64)
}

fn arb_size() -> impl Strategy<Value = (f64, f64, f64)> {
    (0.1..50.0f64, 0.1..50.0f64, 0.1..50.0f64)
}

// ----------------------------------------------------------------------------
// Properties
// ----------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// A box face assignment survives renumbering wherever the box sits.
    #[test]
    fn renumbered_box_keeps_face(offset in arb_offset(), size in arb_size(), face in 0usize..6) {
        let (x, y, z) = offset;
        let (w, h, d) = size;
        let mut s = Scenario::new();
        s.geometry("Block", MemoryShape::box_solid(p(x, y, z), w, h, d));
        s.property(
            PropertyKind::Physical,
            "Paint",
            "ElasticIsotropic",
            &[("E", ParamValue::Real(w))],
        )
        .unwrap();
        s.assign("Block", PropertyKind::Physical, SubshapeKind::Face, face, "Paint").unwrap();
        s.capture().unwrap();
        s.reimport_renumbered().unwrap();
        s.reconcile().unwrap();

        prop_assert!(s.assert_tally(1, 0).is_ok());
        prop_assert!(s
            .assert_assigned("Block", PropertyKind::Physical, SubshapeKind::Face, 5 - face, "Paint")
            .is_ok());
    }

    /// Replaying the same snapshot twice leaves the assignment state alone.
    #[test]
    fn replay_is_idempotent(offset in arb_offset(), vertex in 0usize..4) {
        let (x, y, z) = offset;
        let mut s = Scenario::new();
        s.geometry("Slab", MemoryShape::unit_square().translated(x, y, z));
        s.property(PropertyKind::Physical, "Mass", "Steel01", &[]).unwrap();
        s.assign("Slab", PropertyKind::Physical, SubshapeKind::Vertex, vertex, "Mass").unwrap();
        s.capture().unwrap();
        s.reimport_renumbered().unwrap();

        s.reconcile().unwrap();
        let first = test_harness::oracle::assignment_state(s.live().unwrap());
        s.reconcile().unwrap();
        let second = test_harness::oracle::assignment_state(s.live().unwrap());

        prop_assert_eq!(first.len(), 1);
        prop_assert_eq!(first, second);
    }
}
