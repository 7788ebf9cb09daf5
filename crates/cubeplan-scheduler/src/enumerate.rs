//! Per-group parent enumeration over the cuboid lattice.
//!
//! A parent candidate adds content to a child along one of four axes: the
//! missing mandatory bits, one plain dimension, one whole joint, or the next
//! uncovered hierarchy level. Candidates are filtered to on-tree cuboids, so
//! every result is a minimal valid superset of the child within its group.

use std::collections::BTreeSet;

use cubeplan_core::aggregation::AggregationGroup;
use cubeplan_core::cuboid::{set_bits, CuboidId};
use cubeplan_core::descriptor::CubeDescriptor;

/// All on-tree direct parent candidates of `child` within `group`.
///
/// For the grand total this yields the group's lowest cuboids; the caller is
/// expected to map `child == group.full_mask()` to the global base cuboid.
pub fn on_tree_parents_in_group(child: CuboidId, group: &AggregationGroup) -> BTreeSet<CuboidId> {
    let mut candidates = BTreeSet::new();
    let origin = child.mask();

    // A child missing mandatory bits has exactly one way up.
    if group.mandatory_mask() != 0 && fill_bit(origin, group.mandatory_mask(), &mut candidates) {
        candidates.retain(|&c| group.is_on_tree(c));
        return candidates;
    }

    for dim in set_bits(group.normal_dims_mask()) {
        fill_bit(origin, dim, &mut candidates);
    }
    for &joint in group.joints() {
        fill_bit(origin, joint, &mut candidates);
    }
    for hierarchy in group.hierarchies() {
        for &prefix in hierarchy.all_masks() {
            if fill_bit(origin, prefix, &mut candidates) {
                break;
            }
        }
    }

    candidates.retain(|&c| group.is_on_tree(c));
    candidates
}

fn fill_bit(origin: u64, other: u64, out: &mut BTreeSet<CuboidId>) -> bool {
    if origin & other == other {
        return false;
    }
    out.insert(CuboidId::new(origin | other));
    true
}

/// Union of parent candidates across every group that has `child` on its
/// tree. A child covering a group's whole mask gets the global base cuboid.
pub fn on_tree_parents(child: CuboidId, descriptor: &CubeDescriptor) -> BTreeSet<CuboidId> {
    let groups: Vec<&AggregationGroup> = descriptor
        .groups()
        .iter()
        .filter(|g| g.is_on_tree(child))
        .collect();
    on_tree_parents_across(child, &groups, descriptor)
}

/// Lowest cuboids of every aggregation group: the layer-0 seeds.
pub fn lowest_cuboids(descriptor: &CubeDescriptor) -> BTreeSet<CuboidId> {
    let groups: Vec<&AggregationGroup> = descriptor.groups().iter().collect();
    on_tree_parents_across(CuboidId::GRAND_TOTAL, &groups, descriptor)
}

/// The unique direct parent of `child` under the canonical select order, or
/// `None` for the base cuboid and for children no group can grow.
pub fn on_tree_parent(child: CuboidId, descriptor: &CubeDescriptor) -> Option<CuboidId> {
    on_tree_parents(child, descriptor).into_iter().next()
}

fn on_tree_parents_across(
    child: CuboidId,
    groups: &[&AggregationGroup],
    descriptor: &CubeDescriptor,
) -> BTreeSet<CuboidId> {
    let mut candidates = BTreeSet::new();
    if child == descriptor.base_cuboid_id() {
        return candidates;
    }
    for group in groups {
        if child.mask() == group.full_mask() {
            candidates.insert(descriptor.base_cuboid_id());
            return candidates;
        }
        candidates.extend(on_tree_parents_in_group(child, group));
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(mask: u64) -> CuboidId {
        CuboidId::new(mask)
    }

    fn ids(masks: &[u64]) -> BTreeSet<CuboidId> {
        masks.iter().map(|&m| id(m)).collect()
    }

    #[test]
    fn test_plain_dims_grow_one_bit_at_a_time() {
        let group = AggregationGroup::new(0b1111);
        assert_eq!(
            on_tree_parents_in_group(id(0b0001), &group),
            ids(&[0b0011, 0b0101, 0b1001])
        );
    }

    #[test]
    fn test_missing_mandatory_is_the_only_axis() {
        let group = AggregationGroup::new(0b1111).with_mandatory(0b0001);
        assert_eq!(
            on_tree_parents_in_group(CuboidId::GRAND_TOTAL, &group),
            ids(&[0b0001])
        );
    }

    #[test]
    fn test_joint_added_whole() {
        let group = AggregationGroup::new(0b1111).with_joint(0b0110);
        assert_eq!(
            on_tree_parents_in_group(id(0b0001), &group),
            ids(&[0b0111, 0b1001])
        );
    }

    #[test]
    fn test_hierarchy_adds_next_level_only() {
        let group = AggregationGroup::new(0b111).with_hierarchy(&[0b001, 0b010, 0b100]);
        assert_eq!(on_tree_parents_in_group(id(0b001), &group), ids(&[0b011]));
        assert_eq!(on_tree_parents_in_group(id(0b011), &group), ids(&[0b111]));
    }

    #[test]
    fn test_group_full_mask_maps_to_base() {
        let descriptor = CubeDescriptor::new(
            "partial",
            4,
            vec![AggregationGroup::new(0b0111)],
        );
        assert_eq!(on_tree_parents(id(0b0111), &descriptor), ids(&[0b1111]));
        assert!(on_tree_parents(id(0b1111), &descriptor).is_empty());
    }
}
