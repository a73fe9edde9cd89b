//! Planning errors.
//!
//! Rejections raised by rules are user-facing: they abort planning of the query and
//! are reported to the query author verbatim.

use crate::properties::TraitSet;

/// Errors that can occur while converting a logical plan into a physical one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// A vectorized batch foreign aggregate was used in a streaming job.
    #[error(
        "Vectorized batch foreign UDAFs are not supported in streaming mode currently: [{}]",
        .functions.join(", ")
    )]
    UnsupportedCombination { functions: Vec<String> },
    /// Foreign aggregates and native extension aggregates in the same grouping.
    #[error(
        "Foreign UDAFs and native UDAFs cannot be used together: foreign [{}], native [{}]",
        .foreign.join(", "),
        .native.join(", ")
    )]
    IncompatibleAggregateMix {
        foreign: Vec<String>,
        native: Vec<String>,
    },
    /// No registered rule could produce a node with the requested traits.
    #[error("No plan found for {operator} with traits {required}")]
    NoPlan { operator: String, required: TraitSet },
    /// The logical plan is malformed.
    #[error("Invalid plan: {0}")]
    InvalidPlan(String),
    /// The rule application budget was exhausted.
    #[error("Rule application limit of {0} reached")]
    IterationLimit(usize),
}

pub type Result<T, E = PlanError> = std::result::Result<T, E>;
