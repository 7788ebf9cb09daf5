//! Aggregation group constraint model.
//!
//! An aggregation group declares which cuboids inside its dimension mask are
//! worth materializing: mandatory dimensions every cuboid must carry, joints
//! whose dimensions appear all-or-none, and hierarchy ladders where a level
//! implies all levels below it.

use serde::{Deserialize, Serialize};

use crate::cuboid::CuboidId;

/// One hierarchy ladder: ordered single-dimension masks, lowest level first.
///
/// `all_masks[i]` is the union of levels `0..=i`; a cuboid respects the
/// ladder iff its intersection with `full_mask` equals one of these prefixes
/// (or is empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyMask {
    dims: Vec<u64>,
    full_mask: u64,
    all_masks: Vec<u64>,
}

impl HierarchyMask {
    pub fn new(dims: &[u64]) -> Self {
        let mut all_masks = Vec::with_capacity(dims.len());
        let mut acc = 0u64;
        for &dim in dims {
            acc |= dim;
            all_masks.push(acc);
        }
        Self {
            dims: dims.to_vec(),
            full_mask: acc,
            all_masks,
        }
    }

    /// Per-level dimension masks, lowest level first.
    pub fn dims(&self) -> &[u64] {
        &self.dims
    }

    pub fn full_mask(&self) -> u64 {
        self.full_mask
    }

    /// Prefix unions: `all_masks[i]` covers levels `0..=i`.
    pub fn all_masks(&self) -> &[u64] {
        &self.all_masks
    }
}

/// A declarative constraint bundle over a subset of the cube's dimensions.
///
/// Construction assumes the descriptor layer already validated the masks
/// (mandatory, joints, and hierarchies disjoint and inside the full mask).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationGroup {
    full_mask: u64,
    mandatory_mask: u64,
    joints: Vec<u64>,
    hierarchies: Vec<HierarchyMask>,
    joint_dims_mask: u64,
    hierarchy_dims_mask: u64,
    dim_cap: u32,
}

impl AggregationGroup {
    /// A group over `full_mask` with no further constraints.
    pub fn new(full_mask: u64) -> Self {
        Self {
            full_mask,
            mandatory_mask: 0,
            joints: Vec::new(),
            hierarchies: Vec::new(),
            joint_dims_mask: 0,
            hierarchy_dims_mask: 0,
            dim_cap: 0,
        }
    }

    pub fn with_mandatory(mut self, mask: u64) -> Self {
        self.mandatory_mask = mask;
        self
    }

    pub fn with_joint(mut self, mask: u64) -> Self {
        self.joints.push(mask);
        self.joints.sort_unstable();
        self.joint_dims_mask |= mask;
        self
    }

    /// Add a hierarchy ladder from per-level dimension masks, lowest first.
    pub fn with_hierarchy(mut self, dims: &[u64]) -> Self {
        let hierarchy = HierarchyMask::new(dims);
        self.hierarchy_dims_mask |= hierarchy.full_mask();
        self.hierarchies.push(hierarchy);
        self
    }

    /// Cap on effective dimensions; 0 disables the check.
    pub fn with_dim_cap(mut self, cap: u32) -> Self {
        self.dim_cap = cap;
        self
    }

    pub fn full_mask(&self) -> u64 {
        self.full_mask
    }

    pub fn mandatory_mask(&self) -> u64 {
        self.mandatory_mask
    }

    pub fn joints(&self) -> &[u64] {
        &self.joints
    }

    pub fn hierarchies(&self) -> &[HierarchyMask] {
        &self.hierarchies
    }

    /// Union of all joint masks.
    pub fn joint_dims_mask(&self) -> u64 {
        self.joint_dims_mask
    }

    /// Union of all hierarchy full masks.
    pub fn hierarchy_dims_mask(&self) -> u64 {
        self.hierarchy_dims_mask
    }

    pub fn dim_cap(&self) -> u32 {
        self.dim_cap
    }

    /// Dimensions of the group in no joint, no hierarchy, and not mandatory.
    pub fn normal_dims_mask(&self) -> u64 {
        self.full_mask & !self.mandatory_mask & !self.joint_dims_mask & !self.hierarchy_dims_mask
    }

    /// True if `cuboid` is a valid member of this group's tree: non-empty,
    /// inside the group's mask, carrying all mandatory bits, with every joint
    /// all-or-none and every hierarchy cut at a level boundary.
    pub fn is_on_tree(&self, cuboid: CuboidId) -> bool {
        if cuboid.is_empty() {
            return false;
        }
        if cuboid.mask() & !self.full_mask != 0 {
            return false;
        }
        self.check_mandatory(cuboid) && self.check_joints(cuboid) && self.check_hierarchies(cuboid)
    }

    fn check_mandatory(&self, cuboid: CuboidId) -> bool {
        cuboid.contains(self.mandatory_mask)
    }

    fn check_joints(&self, cuboid: CuboidId) -> bool {
        self.joints.iter().all(|&joint| {
            let intersect = cuboid.mask() & joint;
            intersect == 0 || intersect == joint
        })
    }

    fn check_hierarchies(&self, cuboid: CuboidId) -> bool {
        self.hierarchies.iter().all(|hierarchy| {
            let intersect = cuboid.mask() & hierarchy.full_mask();
            intersect == 0 || hierarchy.all_masks().contains(&intersect)
        })
    }

    /// True if `cuboid` stays within the group's effective-dimension cap.
    /// A joint counts once, a hierarchy counts once, remaining plain bits
    /// count one each. Mandatory bits appear in every cuboid of the group and
    /// are not counted. Cap 0 means unlimited.
    pub fn check_dim_cap(&self, cuboid: CuboidId) -> bool {
        if self.dim_cap == 0 {
            return true;
        }
        let relevant = cuboid.mask() & !self.mandatory_mask;
        let mut count = (relevant & !self.joint_dims_mask & !self.hierarchy_dims_mask).count_ones();
        count += self.joints.iter().filter(|&&j| relevant & j != 0).count() as u32;
        count += self
            .hierarchies
            .iter()
            .filter(|h| relevant & h.full_mask() != 0)
            .count() as u32;
        count <= self.dim_cap
    }
}
