//! Debug-time verification helpers for built schedulers.
//!
//! These functions are intended for testing and debug builds to catch
//! invariant violations early. They should be cheap.

use std::collections::BTreeMap;

use cubeplan_core::cuboid::CuboidId;

use crate::CuboidScheduler;

/// Every edge must aggregate: the child derivable from the parent, with the
/// parent retaining strictly more dimensions.
pub fn assert_edges_aggregate(scheduler: &CuboidScheduler) {
    for (parent, children) in scheduler.tree().edges() {
        for &child in children {
            assert!(
                parent.can_derive(child),
                "child {child} not derivable from parent {parent}"
            );
            assert!(
                parent.cardinality() > child.cardinality(),
                "edge {parent} -> {child} does not reduce cardinality"
            );
        }
    }
}

/// Every non-base member must appear as a child exactly once; the base never.
pub fn assert_single_parent(scheduler: &CuboidScheduler) {
    let mut parent_count: BTreeMap<CuboidId, usize> = BTreeMap::new();
    for (_, children) in scheduler.tree().edges() {
        for &child in children {
            *parent_count.entry(child).or_default() += 1;
        }
    }

    let base = scheduler.descriptor().base_cuboid_id();
    assert!(
        !parent_count.contains_key(&base),
        "base cuboid {base} recorded as a child"
    );
    for &cuboid in scheduler.all_cuboid_ids() {
        if cuboid == base {
            continue;
        }
        assert_eq!(
            parent_count.get(&cuboid),
            Some(&1),
            "{cuboid} does not have exactly one parent"
        );
    }
}

/// Every non-base member must be on some aggregation group's tree and within
/// that group's dimension cap; the base cuboid is exempt.
pub fn assert_members_on_tree(scheduler: &CuboidScheduler) {
    let descriptor = scheduler.descriptor();
    let base = descriptor.base_cuboid_id();
    for &cuboid in scheduler.all_cuboid_ids() {
        if cuboid == base {
            continue;
        }
        assert!(
            descriptor
                .groups()
                .iter()
                .any(|g| g.is_on_tree(cuboid) && g.check_dim_cap(cuboid)),
            "{cuboid} is on no aggregation group's tree"
        );
    }
}
