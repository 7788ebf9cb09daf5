//! Immutable cube descriptor: the declarative input the planner consumes.
//!
//! Parsing and validation of cube metadata happen upstream; this type only
//! carries the already-resolved masks and knobs the scheduler needs.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::aggregation::AggregationGroup;
use crate::cuboid::CuboidId;

/// How many missing ancestors the padding step may skip over when looking for
/// a parent already in the holder.
pub const DEFAULT_PARENT_FORWARD: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeDescriptor {
    name: String,
    dimension_count: u32,
    base_cuboid_id: CuboidId,
    aggregation_groups: Vec<AggregationGroup>,
    blacklist: BTreeSet<CuboidId>,
    parent_forward: u32,
}

impl CubeDescriptor {
    pub fn new(
        name: impl Into<String>,
        dimension_count: u32,
        aggregation_groups: Vec<AggregationGroup>,
    ) -> Self {
        let base_cuboid_id = CuboidId::base(dimension_count);
        Self {
            name: name.into(),
            dimension_count,
            base_cuboid_id,
            aggregation_groups,
            blacklist: BTreeSet::new(),
            parent_forward: DEFAULT_PARENT_FORWARD,
        }
    }

    /// Override the base cuboid, for masking schemes where the base is not
    /// the all-ones value.
    pub fn with_base_cuboid(mut self, base: CuboidId) -> Self {
        self.base_cuboid_id = base;
        self
    }

    pub fn with_blacklist(mut self, cuboids: impl IntoIterator<Item = CuboidId>) -> Self {
        self.blacklist.extend(cuboids);
        self
    }

    pub fn with_parent_forward(mut self, forward: u32) -> Self {
        self.parent_forward = forward;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimension_count(&self) -> u32 {
        self.dimension_count
    }

    pub fn base_cuboid_id(&self) -> CuboidId {
        self.base_cuboid_id
    }

    pub fn groups(&self) -> &[AggregationGroup] {
        &self.aggregation_groups
    }

    pub fn parent_forward(&self) -> u32 {
        self.parent_forward
    }

    /// Largest valid cuboid mask for this cube.
    pub fn max_cuboid_mask(&self) -> u64 {
        CuboidId::base(self.dimension_count).mask()
    }

    pub fn is_blacked(&self, cuboid: CuboidId) -> bool {
        self.blacklist.contains(&cuboid)
    }
}
