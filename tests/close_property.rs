//! Property: every reachable resource in an arbitrary graph is closed
//! exactly once, every failure is contained as one diagnostic, and the
//! quiet closer never raises.

use std::sync::Arc;

use proptest::prelude::*;

use quiesce::testing::{CollectingSink, FailureMode, ProbeResource};
use quiesce::{CloseHandle, Managed, QuietCloser};

/// Shape blueprint for an arbitrary close graph, generated by proptest
/// and then instantiated with probe resources.
#[derive(Debug, Clone)]
enum Shape {
    Absent,
    Single(FailureMode),
    Sequence(Vec<Shape>),
    Array(Vec<Shape>),
    DeadWeak,
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    let leaf = prop_oneof![
        Just(Shape::Absent),
        Just(Shape::DeadWeak),
        prop_oneof![
            2 => Just(FailureMode::None),
            1 => Just(FailureMode::Recoverable),
            1 => Just(FailureMode::Fatal),
        ]
        .prop_map(Shape::Single),
    ];
    leaf.prop_recursive(4, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Shape::Sequence),
            prop::collection::vec(inner, 0..4).prop_map(Shape::Array),
        ]
    })
}

fn instantiate(
    shape: &Shape,
    probes: &mut Vec<(Arc<ProbeResource>, FailureMode)>,
) -> CloseHandle {
    match shape {
        Shape::Absent => CloseHandle::Absent,
        Shape::Single(failure) => {
            let probe = Arc::new(ProbeResource::named("probe").with_failure(*failure));
            probes.push((Arc::clone(&probe), *failure));
            CloseHandle::single(probe)
        }
        Shape::Sequence(children) => CloseHandle::Sequence(
            children.iter().map(|c| instantiate(c, probes)).collect(),
        ),
        Shape::Array(children) => CloseHandle::from(
            children
                .iter()
                .map(|c| instantiate(c, probes))
                .collect::<Vec<_>>()
                .into_boxed_slice(),
        ),
        Shape::DeadWeak => {
            let shared = Arc::new(CloseHandle::Absent);
            CloseHandle::downgrade(&shared)
        }
    }
}

proptest! {
    #[test]
    fn every_resource_closed_exactly_once(shape in shape_strategy()) {
        let sink = Arc::new(CollectingSink::new());
        let closer = QuietCloser::new(sink.clone());

        let mut probes = Vec::new();
        let root = instantiate(&shape, &mut probes);

        closer.close_handle(&root);

        for (probe, _) in &probes {
            prop_assert_eq!(probe.release_count(), 1);
            prop_assert!(probe.lifecycle().is_closed());
        }

        let failing = probes
            .iter()
            .filter(|(_, mode)| *mode != FailureMode::None)
            .count();
        prop_assert_eq!(sink.records().len(), failing);

        // a second pass is a no-op for every resource
        closer.close_handle(&root);
        for (probe, _) in &probes {
            prop_assert_eq!(probe.release_count(), 1);
        }
        prop_assert_eq!(sink.records().len(), failing);
    }
}
