//! # Declarative Pattern Matching for Rules
//!
//! Each rule declares a `Pattern` describing the shape of plan trees it can convert.
//! The planner checks the pattern before asking the rule anything else, so `matches`
//! and `convert` only ever see nodes of the right shape.
//!
//! ## Pattern Language
//!
//! - `Pattern::Operator(matcher, children)`: matches a node whose operator satisfies
//!   `matcher` and whose inputs match the given child patterns, position by position.
//! - `Pattern::Any`: matches any subtree. The usual child pattern.
//! - `Pattern::Leaf`: matches only nodes without inputs.

use crate::expr::{LogicalOpKind, Operator, PhysicalOpKind};
use crate::plan::PlanNode;

/// Pattern for matching plan trees.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Match an operator with child patterns.
    Operator(OpMatcher, Vec<Pattern>),
    /// Match any subtree.
    Any,
    /// Match a leaf node (no inputs).
    Leaf,
}

/// Matcher for operator types (without data).
#[derive(Debug, Clone)]
pub enum OpMatcher {
    LogicalOp(LogicalOpKind),
    PhysicalOp(PhysicalOpKind),
    AnyLogical,
    AnyPhysical,
}

impl Pattern {
    /// Match a logical scan.
    pub fn scan() -> Self {
        Pattern::Operator(OpMatcher::LogicalOp(LogicalOpKind::Scan), vec![])
    }

    /// Match a logical aggregate with one child.
    pub fn aggregate() -> Self {
        Pattern::Operator(
            OpMatcher::LogicalOp(LogicalOpKind::Aggregate),
            vec![Pattern::Any],
        )
    }
}

/// Check if a plan node matches a pattern.
pub fn matches(node: &PlanNode, pattern: &Pattern) -> bool {
    match pattern {
        Pattern::Any => true,
        Pattern::Leaf => node.inputs.is_empty(),
        Pattern::Operator(matcher, child_patterns) => {
            let op_matches = match (&node.op, matcher) {
                (Operator::Logical(l), OpMatcher::LogicalOp(kind)) => l.kind() == *kind,
                (Operator::Physical(p), OpMatcher::PhysicalOp(kind)) => p.kind() == *kind,
                (Operator::Logical(_), OpMatcher::AnyLogical) => true,
                (Operator::Physical(_), OpMatcher::AnyPhysical) => true,
                _ => false,
            };
            if !op_matches || node.inputs.len() != child_patterns.len() {
                return false;
            }
            node.inputs
                .iter()
                .zip(child_patterns)
                .all(|(input, child_pattern)| matches(input, child_pattern))
        }
    }
}
