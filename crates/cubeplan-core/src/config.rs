//! Planner configuration knobs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Per-cube combination budget. The holder may grow to ten times this
    /// value before the build aborts. Negative means unbounded.
    pub aggr_group_max_combination: i64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            aggr_group_max_combination: 4096,
        }
    }
}

impl PlannerConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `CUBEPLAN_MAX_COMBINATION`: aggregation-group combination budget
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("CUBEPLAN_MAX_COMBINATION") {
            if let Ok(v) = s.parse::<i64>() {
                cfg.aggr_group_max_combination = v;
            }
        }

        cfg
    }

    /// Effective holder limit: ten times the configured budget; the negative
    /// sentinel maps to unbounded.
    pub fn max_combination_limit(&self) -> u64 {
        if self.aggr_group_max_combination < 0 {
            u64::MAX
        } else {
            (self.aggr_group_max_combination as u64).saturating_mul(10)
        }
    }
}
