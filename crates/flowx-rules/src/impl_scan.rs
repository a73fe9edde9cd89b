//! # Scan Conversion Rule
//!
//! Maps a logical Scan to a physical StreamScan, a continuous read from the source.
//!
//! ## Source Partitioning
//!
//! Some sources already deliver rows partitioned (for example a topic keyed by a
//! column). The logical scan records that partitioning and the stream scan provides
//! it as its distribution trait, so an aggregate grouped on the same key does not
//! need an extra exchange.

use flowx_core::error::{PlanError, Result};
use flowx_core::expr::*;
use flowx_core::pattern::Pattern;
use flowx_core::plan::{PlanNode, PlanRef};
use flowx_core::properties::{Convention, TraitSet};
use flowx_core::rule::{MatchResult, Rule, TraitPlanner};

/// Convert a logical scan into a stream scan.
pub struct StreamScanRule;

impl Rule for StreamScanRule {
    fn name(&self) -> &str {
        "StreamScan"
    }

    fn pattern(&self) -> Pattern {
        Pattern::scan()
    }

    fn out_convention(&self) -> Convention {
        Convention::StreamPhysical
    }

    fn matches(&self, _node: &PlanRef) -> MatchResult {
        MatchResult::Match
    }

    fn convert(&self, node: &PlanRef, _planner: &mut dyn TraitPlanner) -> Result<PlanRef> {
        let Operator::Logical(LogicalOp::Scan {
            table,
            partitioning,
        }) = &node.op
        else {
            return Err(PlanError::InvalidPlan(format!(
                "{} cannot convert {}",
                self.name(),
                node.op
            )));
        };

        Ok(PlanNode::new(
            Operator::Physical(PhysicalOp::StreamScan {
                table: table.clone(),
            }),
            TraitSet::new(Convention::StreamPhysical, partitioning.clone()),
            node.row_type.clone(),
            vec![],
        ))
    }
}
