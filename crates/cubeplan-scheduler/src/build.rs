//! Bottom-up spanning-tree construction.
//!
//! Three passes over the lattice:
//! 1. expand parent layers from the lowest cuboids under dim capping,
//! 2. kick blacklisted cuboids out of the holder,
//! 3. pad every member with a parent, jumping over up to `forward` missing
//!    ancestors before admitting a new cuboid to the holder.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use cubeplan_core::config::PlannerConfig;
use cubeplan_core::cuboid::CuboidId;
use cubeplan_core::descriptor::CubeDescriptor;
use cubeplan_core::error::{Error, Result};

use crate::enumerate::{lowest_cuboids, on_tree_parent, on_tree_parents};

/// The materialized cuboid set plus the parent-to-children derivation map.
///
/// Maps are BTree-backed so iteration order is stable across runs and
/// platforms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanningTree {
    cuboids: BTreeSet<CuboidId>,
    children: BTreeMap<CuboidId, Vec<CuboidId>>,
}

impl SpanningTree {
    pub fn cuboids(&self) -> &BTreeSet<CuboidId> {
        &self.cuboids
    }

    pub fn len(&self) -> usize {
        self.cuboids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cuboids.is_empty()
    }

    pub fn contains(&self, cuboid: CuboidId) -> bool {
        self.cuboids.contains(&cuboid)
    }

    /// Children of `cuboid` in the derivation tree; empty for leaves.
    pub fn children_of(&self, cuboid: CuboidId) -> &[CuboidId] {
        self.children.get(&cuboid).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All `(parent, children)` edges, parents in canonical order.
    pub fn edges(&self) -> impl Iterator<Item = (CuboidId, &[CuboidId])> {
        self.children.iter().map(|(&p, c)| (p, c.as_slice()))
    }
}

/// Collect the cuboid set bottom-up, considering every factor including the
/// blacklist, and wire each member to a parent.
pub fn build_tree_bottom_up(
    descriptor: &CubeDescriptor,
    config: &PlannerConfig,
) -> Result<SpanningTree> {
    let forward = descriptor.parent_forward();
    let limit = config.max_combination_limit();

    let mut holder: BTreeSet<CuboidId> = BTreeSet::new();
    let mut children = lowest_cuboids(descriptor);
    while !children.is_empty() {
        // Checked before absorbing the layer; combination budgets in the wild
        // are calibrated to this exact semantics.
        if holder.len() as u64 > limit {
            return Err(Error::CombinatorialExplosion {
                reached: holder.len(),
                limit,
            });
        }
        holder.extend(children.iter().copied());
        children = on_tree_parents_by_layer(&children, descriptor);
        #[cfg(feature = "tracing")]
        tracing::trace!(
            holder = holder.len(),
            next_layer = children.len(),
            "expanded cuboid layer"
        );
    }
    holder.insert(descriptor.base_cuboid_id());

    holder.retain(|&c| !descriptor.is_blacked(c));

    let mut tree_children: BTreeMap<CuboidId, Vec<CuboidId>> = BTreeMap::new();
    let mut scan: VecDeque<CuboidId> = holder.iter().copied().collect();
    while let Some(current) = scan.pop_front() {
        let Some(parent) = parent_on_promise(current, &holder, forward, descriptor) else {
            continue;
        };
        if holder.insert(parent) {
            scan.push_back(parent);
        }
        tree_children.entry(parent).or_default().push(current);
    }

    #[cfg(feature = "tracing")]
    tracing::trace!(cuboids = holder.len(), "cuboid tree assembled");

    Ok(SpanningTree {
        cuboids: holder,
        children: tree_children,
    })
}

/// Parents of a whole layer. The base cuboid passes unconditionally; every
/// other parent must sit under some group's dimension cap.
fn on_tree_parents_by_layer(
    children: &BTreeSet<CuboidId>,
    descriptor: &CubeDescriptor,
) -> BTreeSet<CuboidId> {
    let mut parents = BTreeSet::new();
    for &child in children {
        parents.extend(on_tree_parents(child, descriptor));
    }
    parents.retain(|&p| {
        p == descriptor.base_cuboid_id()
            || descriptor
                .groups()
                .iter()
                .any(|g| g.is_on_tree(p) && g.check_dim_cap(p))
    });
    parents
}

/// Walk the unique parent chain upward, preferring the first ancestor already
/// in the holder. Once `forward` hops are spent the ancestor reached is
/// accepted even if it is new; the caller adds it to the holder.
fn parent_on_promise(
    child: CuboidId,
    holder: &BTreeSet<CuboidId>,
    forward: u32,
    descriptor: &CubeDescriptor,
) -> Option<CuboidId> {
    let mut parent = on_tree_parent(child, descriptor)?;
    let mut hops = forward;
    while !holder.contains(&parent) && hops > 0 {
        parent = on_tree_parent(parent, descriptor)?;
        hops -= 1;
    }
    Some(parent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubeplan_core::aggregation::AggregationGroup;

    fn id(mask: u64) -> CuboidId {
        CuboidId::new(mask)
    }

    #[test]
    fn test_unconstrained_cube_keeps_every_nonzero_cuboid() {
        let descriptor =
            CubeDescriptor::new("full", 3, vec![AggregationGroup::new(0b111)]);
        let tree = build_tree_bottom_up(&descriptor, &PlannerConfig::default()).unwrap();
        assert_eq!(tree.len(), 7);
        assert!(!tree.contains(CuboidId::GRAND_TOTAL));
        assert!(tree.contains(id(0b111)));
    }

    #[test]
    fn test_every_nonbase_member_gets_one_parent() {
        let descriptor =
            CubeDescriptor::new("full", 3, vec![AggregationGroup::new(0b111)]);
        let tree = build_tree_bottom_up(&descriptor, &PlannerConfig::default()).unwrap();
        let mut child_count = 0usize;
        for (_, children) in tree.edges() {
            child_count += children.len();
        }
        assert_eq!(child_count, tree.len() - 1);
    }

    #[test]
    fn test_explosion_guard_trips_before_absorbing_layer() {
        let descriptor =
            CubeDescriptor::new("wide", 20, vec![AggregationGroup::new((1 << 20) - 1)]);
        let config = PlannerConfig {
            aggr_group_max_combination: 10,
        };
        let err = build_tree_bottom_up(&descriptor, &config).unwrap_err();
        assert!(matches!(
            err,
            Error::CombinatorialExplosion { limit: 100, .. }
        ));
    }
}
