#![forbid(unsafe_code)]
//! cubeplan-scheduler: materialize the cuboid set for a cube descriptor and
//! answer spanning/best-match queries over it.
//!
//! Responsibilities:
//! - Enumerate on-tree parent candidates per aggregation group (`enumerate`).
//! - Build the spanning tree bottom-up: layers, blacklist, padding (`build`).
//! - Resolve arbitrary projections onto materialized cuboids (`best_match`).
//!
//! **No I/O, no async** here. Planning is a pure function of the descriptor;
//! a built scheduler is immutable and freely shareable between readers.

pub mod build;
pub mod enumerate;
pub mod verify;

mod best_match;

use std::collections::BTreeSet;
use std::sync::OnceLock;

use cubeplan_core::config::PlannerConfig;
use cubeplan_core::cuboid::CuboidId;
use cubeplan_core::descriptor::CubeDescriptor;
use cubeplan_core::error::{Error, Result};

pub use build::{build_tree_bottom_up, SpanningTree};

/// The planner: holds the materialized cuboid set and the spanning tree for
/// one cube descriptor, computed eagerly at construction.
#[derive(Debug)]
pub struct CuboidScheduler {
    descriptor: CubeDescriptor,
    tree: SpanningTree,
    layers: OnceLock<Result<Vec<Vec<CuboidId>>>>,
}

impl CuboidScheduler {
    /// Plan the cube. Fails with `CombinatorialExplosion` when the descriptor
    /// yields more cuboids than the configured budget allows.
    pub fn new(descriptor: CubeDescriptor, config: &PlannerConfig) -> Result<Self> {
        let tree = build::build_tree_bottom_up(&descriptor, config)?;
        Ok(Self {
            descriptor,
            tree,
            layers: OnceLock::new(),
        })
    }

    pub fn descriptor(&self) -> &CubeDescriptor {
        &self.descriptor
    }

    pub fn tree(&self) -> &SpanningTree {
        &self.tree
    }

    /// Cardinality of the materialized set.
    pub fn cuboid_count(&self) -> usize {
        self.tree.len()
    }

    /// Read-only view of the materialized set, in canonical order.
    pub fn all_cuboid_ids(&self) -> &BTreeSet<CuboidId> {
        self.tree.cuboids()
    }

    /// Children of `cuboid` in the spanning tree, possibly empty.
    pub fn spanning_of(&self, cuboid: CuboidId) -> Result<&[CuboidId]> {
        self.check_range(cuboid)?;
        Ok(self.tree.children_of(cuboid))
    }

    /// Number of dimensions `cuboid` retains.
    pub fn cardinality(&self, cuboid: CuboidId) -> Result<u32> {
        self.check_range(cuboid)?;
        Ok(cuboid.cardinality())
    }

    /// Layered view of the tree, layer 0 being the base cuboid and each next
    /// layer the spanning of the previous one. Computed on first call and
    /// memoized; the layered total must cover the whole materialized set.
    pub fn cuboids_by_layer(&self) -> Result<&[Vec<CuboidId>]> {
        match self.layers.get_or_init(|| self.compute_layers()) {
            Ok(layers) => Ok(layers.as_slice()),
            Err(e) => Err(e.clone()),
        }
    }

    /// The materialized cuboid that serves the projection `cuboid`.
    pub fn best_match(&self, cuboid: CuboidId) -> Result<CuboidId> {
        best_match::find_best_match(&self.descriptor, self.tree.cuboids(), cuboid)
    }

    /// Nearest materialized proper ancestor of an on-tree cuboid.
    pub fn valid_parent(&self, cuboid: CuboidId) -> Result<CuboidId> {
        best_match::nearest_materialized_ancestor(&self.descriptor, self.tree.cuboids(), cuboid)
    }

    /// Stable identity for caches keyed by cube descriptor.
    pub fn responsible_key(&self) -> String {
        format!("CubeDescriptor-{}", self.descriptor.name())
    }

    fn check_range(&self, cuboid: CuboidId) -> Result<()> {
        let max = self.descriptor.max_cuboid_mask();
        if cuboid.mask() > max {
            return Err(Error::OutOfRange {
                cuboid: cuboid.mask(),
                max,
            });
        }
        Ok(())
    }

    fn compute_layers(&self) -> Result<Vec<Vec<CuboidId>>> {
        let mut layers: Vec<Vec<CuboidId>> = Vec::new();
        let mut current = vec![self.descriptor.base_cuboid_id()];
        let mut total = 0usize;
        loop {
            total += current.len();
            let mut next = Vec::new();
            for &parent in &current {
                next.extend_from_slice(self.tree.children_of(parent));
            }
            layers.push(current);
            if next.is_empty() {
                break;
            }
            current = next;
        }

        if total != self.cuboid_count() {
            return Err(Error::LayerCountMismatch {
                counted: total,
                expected: self.cuboid_count(),
            });
        }
        Ok(layers)
    }
}
