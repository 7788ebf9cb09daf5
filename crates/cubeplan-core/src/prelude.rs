//! Convenient re-exports for downstream crates.

pub use crate::aggregation::{AggregationGroup, HierarchyMask};
pub use crate::config::PlannerConfig;
pub use crate::cuboid::CuboidId;
pub use crate::descriptor::{CubeDescriptor, DEFAULT_PARENT_FORWARD};
pub use crate::error::{Error, Result};
