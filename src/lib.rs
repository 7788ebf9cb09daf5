#![forbid(unsafe_code)]
//! cubeplan: cuboid planning for OLAP cubes.
//!
//! Facade over the workspace crates:
//! - `cubeplan-core`: cuboid bitmasks, aggregation-group model, descriptor,
//!   configuration, errors.
//! - `cubeplan-scheduler`: spanning-tree construction and query resolution.

pub use cubeplan_core::aggregation::{AggregationGroup, HierarchyMask};
pub use cubeplan_core::config::PlannerConfig;
pub use cubeplan_core::cuboid::CuboidId;
pub use cubeplan_core::descriptor::{CubeDescriptor, DEFAULT_PARENT_FORWARD};
pub use cubeplan_core::error::{Error, Result};
pub use cubeplan_scheduler::{build_tree_bottom_up, CuboidScheduler, SpanningTree};

pub use cubeplan_scheduler::enumerate;
pub use cubeplan_scheduler::verify;
