//! Query-time best-match resolution.
//!
//! A requested projection is promoted per group to the smallest mask that
//! respects the group's structural constraints, the tightest promotion wins,
//! and the winner is rounded up to the nearest materialized ancestor.

use std::collections::BTreeSet;

use cubeplan_core::aggregation::AggregationGroup;
use cubeplan_core::cuboid::{lowest_bit, CuboidId};
use cubeplan_core::descriptor::CubeDescriptor;
use cubeplan_core::error::{Error, Result};

use crate::enumerate::on_tree_parent;

/// Resolve the materialized cuboid that serves the projection `cuboid`.
pub(crate) fn find_best_match(
    descriptor: &CubeDescriptor,
    materialized: &BTreeSet<CuboidId>,
    cuboid: CuboidId,
) -> Result<CuboidId> {
    let mut candidates = BTreeSet::new();
    for group in descriptor.groups() {
        if let Some(candidate) = translate_to_on_tree(group, cuboid)? {
            candidates.insert(candidate);
        }
    }

    // No group can serve the projection; only the base cuboid can.
    let Some(&candidate) = candidates.iter().next() else {
        return Ok(descriptor.base_cuboid_id());
    };

    if materialized.contains(&candidate) {
        return Ok(candidate);
    }
    nearest_materialized_ancestor(descriptor, materialized, candidate)
}

/// Walk `on_tree_parent` upward from `cuboid` until a materialized cuboid
/// appears.
pub(crate) fn nearest_materialized_ancestor(
    descriptor: &CubeDescriptor,
    materialized: &BTreeSet<CuboidId>,
    cuboid: CuboidId,
) -> Result<CuboidId> {
    let mut parent = on_tree_parent(cuboid, descriptor);
    while let Some(p) = parent {
        if materialized.contains(&p) {
            return Ok(p);
        }
        parent = on_tree_parent(p, descriptor);
    }
    Err(Error::NoValidParent(cuboid))
}

/// Promote `cuboid` to the smallest mask satisfying the group's structural
/// constraints, or `None` when the group cannot serve it at all.
fn translate_to_on_tree(group: &AggregationGroup, cuboid: CuboidId) -> Result<Option<CuboidId>> {
    if cuboid.mask() & !group.full_mask() != 0 {
        // The partial cube does not contain all requested dims.
        return Ok(None);
    }

    let mut mask = cuboid.mask() | group.mandatory_mask();

    // Promote each partially-requested hierarchy to the lowest contiguous
    // prefix that includes the highest requested level.
    for hierarchy in group.hierarchies() {
        let intersect = mask & hierarchy.full_mask();
        if intersect == 0 || intersect == hierarchy.full_mask() {
            continue;
        }
        let mut start_fill = false;
        for &dim in hierarchy.dims().iter().rev() {
            if start_fill {
                mask |= dim;
            } else if mask & dim != 0 {
                start_fill = true;
            }
        }
    }

    // Partially-requested joints are pulled in whole.
    for &joint in group.joints() {
        let intersect = mask & joint;
        if intersect != 0 && intersect != joint {
            mask |= joint;
        }
    }

    let translated = CuboidId::new(mask);
    if group.is_on_tree(translated) {
        return Ok(Some(translated));
    }

    // The request carries no admissible column; widen by the cheapest one.
    let non_joint = group
        .joints()
        .iter()
        .fold(group.full_mask() ^ group.mandatory_mask(), |m, &j| m & !j);
    if non_joint != 0 {
        let non_joint_non_hierarchy = group
            .hierarchies()
            .iter()
            .fold(non_joint, |m, h| m & !h.full_mask());
        if non_joint_non_hierarchy != 0 {
            return Ok(Some(translated.with(lowest_bit(non_joint_non_hierarchy))));
        }
        // A hierarchy whose first level stays clear of every joint.
        for hierarchy in group.hierarchies() {
            let level0 = hierarchy.all_masks()[0];
            if level0 & group.joint_dims_mask() == 0 {
                return Ok(Some(translated.with(level0)));
            }
        }
    }

    let widened = match group.joints().iter().copied().map(CuboidId::new).min() {
        Some(joint) => translated.with(joint.mask()),
        None => translated,
    };
    if !group.is_on_tree(widened) {
        return Err(Error::AssertOnTree(widened));
    }
    Ok(Some(widened))
}
