//! # Native Group Aggregate Rule
//!
//! Converts a logical aggregate whose calls all run in the native runtime (built-ins
//! and native extensions) into a `StreamGroupAggregate`. Aggregates with foreign
//! calls are left to [`crate::foreign_agg::StreamForeignGroupAggregateRule`].
//!
//! ## Distribution
//!
//! A streaming group aggregate keeps one accumulator state per key, so every row of
//! a key must reach the same partition:
//!
//! - With group keys, the input is hash-partitioned on exactly those keys, in group
//!   order ([`aggregate_distribution`]).
//! - Without group keys there is one global state, and all rows go to a single
//!   partition.

use flowx_core::agg::AggregateCall;
use flowx_core::error::{PlanError, Result};
use flowx_core::expr::*;
use flowx_core::pattern::Pattern;
use flowx_core::plan::{PlanNode, PlanRef};
use flowx_core::properties::{Convention, Distribution};
use flowx_core::rule::{MatchResult, Rule, TraitPlanner};

/// Distribution a grouped aggregation requires from its input.
pub fn aggregate_distribution(group_set: &GroupSet) -> Distribution {
    if group_set.is_empty() {
        Distribution::Singleton
    } else {
        Distribution::hash(group_set.iter(), true)
    }
}

/// Borrow the group set and calls of a logical aggregate.
pub(crate) fn aggregate_parts(node: &PlanNode) -> Option<(&GroupSet, &[AggregateCall])> {
    match &node.op {
        Operator::Logical(LogicalOp::Aggregate {
            group_set,
            agg_calls,
        }) => Some((group_set, agg_calls.as_slice())),
        _ => None,
    }
}

/// Implement a logical aggregate without foreign calls as a stream group aggregate.
pub struct StreamGroupAggregateRule;

impl Rule for StreamGroupAggregateRule {
    fn name(&self) -> &str {
        "StreamGroupAggregate"
    }

    fn pattern(&self) -> Pattern {
        Pattern::aggregate()
    }

    fn out_convention(&self) -> Convention {
        Convention::StreamPhysical
    }

    fn matches(&self, node: &PlanRef) -> MatchResult {
        match aggregate_parts(node) {
            Some((_, calls)) if !calls.iter().any(|c| c.is_foreign(None)) => MatchResult::Match,
            _ => MatchResult::NoMatch,
        }
    }

    fn convert(&self, node: &PlanRef, planner: &mut dyn TraitPlanner) -> Result<PlanRef> {
        let (group_set, agg_calls) = aggregate_parts(node).ok_or_else(|| {
            PlanError::InvalidPlan(format!("{} cannot convert {}", self.name(), node.op))
        })?;
        let input = node.input(0).ok_or_else(|| {
            PlanError::InvalidPlan(format!("aggregate {} has no input", node.op))
        })?;

        let required = planner
            .empty_traits()
            .replace_distribution(aggregate_distribution(group_set))
            .replace_convention(Convention::StreamPhysical);
        let new_input = planner.change_traits(input, &required)?;

        Ok(PlanNode::new(
            Operator::Physical(PhysicalOp::StreamGroupAggregate {
                group_set: group_set.to_vec(),
                agg_calls: agg_calls.to_vec(),
            }),
            node.traits.replace_convention(Convention::StreamPhysical),
            node.row_type.clone(),
            vec![new_input],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_follows_group_order() {
        assert_eq!(
            aggregate_distribution(&GroupSet::new([3, 1])),
            Distribution::hash([3, 1], true)
        );
        assert_eq!(
            aggregate_distribution(&GroupSet::empty()),
            Distribution::Singleton
        );
    }
}
