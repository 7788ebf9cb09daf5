#![forbid(unsafe_code)]
//! cubeplan-core: cuboid bitmask primitives and the declarative cube model.
//!
//! Downstream crates consume:
//! - `CuboidId` with the canonical select order (cardinality, then mask),
//! - `AggregationGroup` constraints (`is_on_tree`, `check_dim_cap`),
//! - `CubeDescriptor` and `PlannerConfig`,
//! - the shared `Error`/`Result`.
//!
//! No I/O and no planning logic here; the scheduler crate owns the lattice
//! algorithms.

pub mod aggregation;
pub mod config;
pub mod cuboid;
pub mod descriptor;
pub mod error;
pub mod prelude;
