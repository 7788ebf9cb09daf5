//! Property tests over randomly generated cube descriptors.
//!
//! Groups are generated by assigning each dimension a disjoint role
//! (excluded, mandatory, joint, hierarchy, plain), so every descriptor is
//! structurally valid. Dimension caps are left off here: padding may
//! legitimately re-admit a capped-out ancestor once the forward budget is
//! spent, which the targeted scenario tests cover instead.

use std::collections::BTreeMap;

use proptest::prelude::*;

use cubeplan::{
    verify, AggregationGroup, CubeDescriptor, CuboidId, CuboidScheduler, PlannerConfig,
};

fn group_from_roles(roles: Vec<u8>) -> AggregationGroup {
    let mut full = 0u64;
    let mut mandatory = 0u64;
    let mut joint_a = 0u64;
    let mut joint_b = 0u64;
    let mut ladder = Vec::new();

    for (i, &role) in roles.iter().enumerate() {
        let bit = 1u64 << i;
        if role == 0 {
            continue;
        }
        full |= bit;
        match role {
            1 => mandatory |= bit,
            2 => joint_a |= bit,
            3 => joint_b |= bit,
            4 => ladder.push(bit),
            _ => {}
        }
    }
    if full == 0 {
        full = 1;
    }

    let mut group = AggregationGroup::new(full).with_mandatory(mandatory);
    // Degenerate single-dimension joints and ladders stay plain dimensions.
    if joint_a.count_ones() >= 2 {
        group = group.with_joint(joint_a);
    }
    if joint_b.count_ones() >= 2 {
        group = group.with_joint(joint_b);
    }
    if ladder.len() >= 2 {
        group = group.with_hierarchy(&ladder);
    }
    group
}

fn arb_group(dims: u32) -> impl Strategy<Value = AggregationGroup> {
    prop::collection::vec(0u8..7, dims as usize).prop_map(group_from_roles)
}

fn arb_descriptor() -> impl Strategy<Value = CubeDescriptor> {
    (2u32..=6).prop_flat_map(|dims| {
        let max_mask = (1u64 << dims) - 1;
        (
            prop::collection::vec(arb_group(dims), 1..=3),
            prop::collection::btree_set(1..max_mask, 0..=2usize),
        )
            .prop_map(move |(groups, blacklist)| {
                CubeDescriptor::new("prop-cube", dims, groups)
                    .with_blacklist(blacklist.into_iter().map(CuboidId::new))
            })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_spanning_tree_invariants(descriptor in arb_descriptor()) {
        let base = descriptor.base_cuboid_id();
        let scheduler =
            CuboidScheduler::new(descriptor.clone(), &PlannerConfig::default()).unwrap();

        prop_assert!(scheduler.all_cuboid_ids().contains(&base));
        for &cuboid in scheduler.all_cuboid_ids() {
            prop_assert!(!descriptor.is_blacked(cuboid));
        }

        verify::assert_edges_aggregate(&scheduler);
        verify::assert_single_parent(&scheduler);
        verify::assert_members_on_tree(&scheduler);
    }

    #[test]
    fn test_layers_partition_the_set(descriptor in arb_descriptor()) {
        let base = descriptor.base_cuboid_id();
        let scheduler =
            CuboidScheduler::new(descriptor, &PlannerConfig::default()).unwrap();

        let layers = scheduler.cuboids_by_layer().unwrap();
        prop_assert_eq!(&layers[0], &vec![base]);
        let total: usize = layers.iter().map(Vec::len).sum();
        prop_assert_eq!(total, scheduler.cuboid_count());

        // Each member sits in exactly one layer.
        let mut seen: BTreeMap<CuboidId, usize> = BTreeMap::new();
        for layer in layers {
            for &cuboid in layer {
                *seen.entry(cuboid).or_default() += 1;
            }
        }
        for (&cuboid, &count) in &seen {
            prop_assert_eq!(count, 1, "{} appears in {} layers", cuboid, count);
        }
    }

    #[test]
    fn test_best_match_serves_every_projection(descriptor in arb_descriptor()) {
        let max_mask = descriptor.max_cuboid_mask();
        let scheduler =
            CuboidScheduler::new(descriptor, &PlannerConfig::default()).unwrap();

        for mask in 0..=max_mask {
            let q = CuboidId::new(mask);
            let matched = scheduler.best_match(q).unwrap();
            prop_assert!(scheduler.all_cuboid_ids().contains(&matched));
            prop_assert!(matched.can_derive(q), "{} cannot derive {}", matched, q);
            prop_assert_eq!(scheduler.best_match(matched).unwrap(), matched);
        }
    }

    #[test]
    fn test_planning_is_reproducible(descriptor in arb_descriptor()) {
        let first =
            CuboidScheduler::new(descriptor.clone(), &PlannerConfig::default()).unwrap();
        let second =
            CuboidScheduler::new(descriptor, &PlannerConfig::default()).unwrap();

        prop_assert_eq!(first.all_cuboid_ids(), second.all_cuboid_ids());
        for &parent in first.all_cuboid_ids() {
            prop_assert_eq!(
                first.spanning_of(parent).unwrap(),
                second.spanning_of(parent).unwrap()
            );
        }
    }
}
