//! # Foreign Group Aggregate Rule
//!
//! Converts a logical aggregate that calls foreign aggregate functions into a
//! `StreamForeignGroupAggregate`.
//!
//! ## Eligibility
//!
//! Every call is classified (see [`flowx_core::agg::classify`]) and the mix of
//! categories decides the outcome:
//!
//! | calls present                                | outcome                          |
//! |----------------------------------------------|----------------------------------|
//! | no foreign call                              | `NoMatch` (native rule applies)  |
//! | any vectorized batch foreign call            | `Reject(UnsupportedCombination)` |
//! | foreign general + native extension           | `Reject(IncompatibleAggregateMix)` |
//! | foreign general, optionally with built-ins   | `Match`                          |
//!
//! Vectorized batch functions need their whole input materialized, which an
//! unbounded stream never is. Native extensions keep their state in native
//! accumulators while foreign functions keep it in the foreign runtime, and a single
//! operator cannot drive both. Both cases are rejected outright: no other streaming
//! rule could plan them either, and the query author needs to see why.
//!
//! ## Conversion
//!
//! The input is requested hash-partitioned on the group keys (strict, in group
//! order), or on a single partition when there are none. The new node keeps the
//! logical node's traits with the convention switched to `StreamPhysical`.

use crate::impl_agg::{aggregate_distribution, aggregate_parts};
use flowx_core::agg::{classify, AggregateCall, FunctionCategory};
use flowx_core::error::{PlanError, Result};
use flowx_core::expr::*;
use flowx_core::pattern::Pattern;
use flowx_core::plan::{PlanNode, PlanRef};
use flowx_core::properties::Convention;
use flowx_core::rule::{MatchResult, Rule, TraitPlanner};
use tracing::debug;

/// Function names of an aggregate's calls, bucketed by how they are evaluated.
#[derive(Debug, Default)]
struct CallMix {
    general: Vec<String>,
    vector_batch: Vec<String>,
    native_extension: Vec<String>,
}

impl CallMix {
    fn of(calls: &[AggregateCall]) -> Self {
        let mut mix = CallMix::default();
        for call in calls {
            let name = call.function.name().to_string();
            match classify(call) {
                FunctionCategory::ForeignGeneral => mix.general.push(name),
                FunctionCategory::ForeignVectorBatch => mix.vector_batch.push(name),
                FunctionCategory::Builtin if !call.is_builtin() => mix.native_extension.push(name),
                FunctionCategory::Builtin => {}
            }
        }
        mix
    }

    fn check(self) -> MatchResult {
        if self.general.is_empty() && self.vector_batch.is_empty() {
            return MatchResult::NoMatch;
        }
        if !self.vector_batch.is_empty() {
            return MatchResult::Reject(PlanError::UnsupportedCombination {
                functions: self.vector_batch,
            });
        }
        if !self.native_extension.is_empty() {
            return MatchResult::Reject(PlanError::IncompatibleAggregateMix {
                foreign: self.general,
                native: self.native_extension,
            });
        }
        MatchResult::Match
    }
}

/// Implement a logical aggregate with foreign calls as a stream foreign group aggregate.
pub struct StreamForeignGroupAggregateRule;

impl Rule for StreamForeignGroupAggregateRule {
    fn name(&self) -> &str {
        "StreamForeignGroupAggregate"
    }

    fn pattern(&self) -> Pattern {
        Pattern::aggregate()
    }

    fn out_convention(&self) -> Convention {
        Convention::StreamPhysical
    }

    fn matches(&self, node: &PlanRef) -> MatchResult {
        match aggregate_parts(node) {
            Some((_, calls)) => CallMix::of(calls).check(),
            None => MatchResult::NoMatch,
        }
    }

    fn convert(&self, node: &PlanRef, planner: &mut dyn TraitPlanner) -> Result<PlanRef> {
        if !self.matches(node).into_result()? {
            return Err(PlanError::InvalidPlan(format!(
                "{} cannot convert {}",
                self.name(),
                node.op
            )));
        }
        let (group_set, agg_calls) = aggregate_parts(node).ok_or_else(|| {
            PlanError::InvalidPlan(format!("{} cannot convert {}", self.name(), node.op))
        })?;
        let input = node.input(0).ok_or_else(|| {
            PlanError::InvalidPlan(format!("aggregate {} has no input", node.op))
        })?;

        let distribution = aggregate_distribution(group_set);
        debug!("Foreign aggregate requires input distribution {distribution}");

        let required = planner
            .empty_traits()
            .replace_distribution(distribution)
            .replace_convention(Convention::StreamPhysical);
        let provided = node.traits.replace_convention(Convention::StreamPhysical);
        let new_input = planner.change_traits(input, &required)?;

        Ok(PlanNode::new(
            Operator::Physical(PhysicalOp::StreamForeignGroupAggregate {
                group_set: group_set.to_vec(),
                agg_calls: agg_calls.to_vec(),
            }),
            provided,
            node.row_type.clone(),
            vec![new_input],
        ))
    }
}
