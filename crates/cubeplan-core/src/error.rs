use thiserror::Error;

use crate::cuboid::CuboidId;

/// Canonical result for the workspace.
pub type Result<T> = std::result::Result<T, Error>;

// Clone lets the memoized layer cache replay a failure to later callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Cuboid {cuboid} is out of scope 0-{max}")]
    OutOfRange { cuboid: u64, max: u64 },

    #[error("Too many cuboids for the cube. Cuboid combination reached {reached} and limit is {limit}. Abort planning.")]
    CombinatorialExplosion { reached: usize, limit: u64 },

    #[error("Can't find a valid parent for {0}")]
    NoValidParent(CuboidId),

    #[error("Layered cuboid total {counted} does not match materialized set size {expected}")]
    LayerCountMismatch { counted: usize, expected: usize },

    #[error("Translated {0} is not on the aggregation group's tree")]
    AssertOnTree(CuboidId),
}
