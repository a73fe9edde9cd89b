//! Planner configuration.

use crate::properties::Distribution;
use serde::{Deserialize, Serialize};

/// Configuration knobs for the heuristic planner.
///
/// Every field has a default, so a partial JSON document such as
/// `{"source_type": "kafka"}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Upper bound on the number of rule conversions for one query.
    pub max_iterations: usize,
    /// Optional connector/source type used to select source-specific rules.
    pub source_type: Option<String>,
    /// Distribution required from the root of the physical plan.
    pub root_distribution: Distribution,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            source_type: None,
            root_distribution: Distribution::Any,
        }
    }
}
