//! # Plan Trees
//!
//! A query plan is a tree of immutable [`PlanNode`]s shared through `Arc`
//! ([`PlanRef`]). Rules never modify a node in place: a conversion builds a new node
//! that points at (possibly new) inputs, and untouched subtrees are shared between
//! the old and the new tree.
//!
//! Each node carries:
//! - the operator (`Operator`), logical or physical,
//! - its physical traits (`TraitSet`),
//! - its output row type,
//! - its inputs.

use crate::agg::AggregateCall;
use crate::error::{PlanError, Result};
use crate::expr::*;
use crate::properties::{Distribution, TraitSet};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::sync::Arc;

pub type PlanRef = Arc<PlanNode>;

/// A node of a (logical or physical) plan tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanNode {
    pub op: Operator,
    pub traits: TraitSet,
    pub row_type: RowType,
    pub inputs: Vec<PlanRef>,
}

impl PlanNode {
    pub fn new(op: Operator, traits: TraitSet, row_type: RowType, inputs: Vec<PlanRef>) -> PlanRef {
        Arc::new(Self {
            op,
            traits,
            row_type,
            inputs,
        })
    }

    /// A logical source read.
    pub fn logical_scan(table: TableRef, row_type: RowType, partitioning: Distribution) -> PlanRef {
        Self::new(
            Operator::Logical(LogicalOp::Scan {
                table,
                partitioning,
            }),
            TraitSet::logical(),
            row_type,
            vec![],
        )
    }

    /// A logical grouped aggregation over `input`.
    ///
    /// The output row type is the group columns (in group-set order) followed by one
    /// column per aggregate call. Fails if a group key or call argument does not
    /// refer to an input column.
    pub fn logical_aggregate(
        input: PlanRef,
        group_set: GroupSet,
        agg_calls: Vec<AggregateCall>,
    ) -> Result<PlanRef> {
        let input_type = &input.row_type;
        let mut fields = Vec::with_capacity(group_set.cardinality() + agg_calls.len());

        for key in group_set.iter() {
            let field = input_type.field(key).ok_or_else(|| {
                PlanError::InvalidPlan(format!(
                    "group key ${key} out of range for input with {} columns",
                    input_type.len()
                ))
            })?;
            fields.push(field.clone());
        }

        for (i, call) in agg_calls.iter().enumerate() {
            if let Some(bad) = call.referenced_ordinals().find(|o| *o >= input_type.len()) {
                return Err(PlanError::InvalidPlan(format!(
                    "aggregate call {call} references ${bad}, input has {} columns",
                    input_type.len()
                )));
            }
            let name = call.name.clone().unwrap_or_else(|| format!("EXPR${i}"));
            fields.push(Field::new(name, call.return_type, true));
        }

        Ok(Self::new(
            Operator::Logical(LogicalOp::Aggregate {
                group_set,
                agg_calls,
            }),
            TraitSet::logical(),
            RowType::new(fields),
            vec![input],
        ))
    }

    /// An exchange redistributing `input` into `distribution`.
    pub fn exchange(input: PlanRef, distribution: Distribution) -> PlanRef {
        let traits = input.traits.replace_distribution(distribution.clone());
        let row_type = input.row_type.clone();
        Self::new(
            Operator::Physical(PhysicalOp::Exchange { distribution }),
            traits,
            row_type,
            vec![input],
        )
    }

    pub fn kind(&self) -> OpKind {
        self.op.kind()
    }

    pub fn input(&self, index: usize) -> Option<&PlanRef> {
        self.inputs.get(index)
    }

    /// Render the tree, one node per line, children indented below their parent.
    pub fn explain(&self) -> String {
        let mut out = String::new();
        self.explain_into(&mut out, 0);
        out
    }

    fn explain_into(&self, out: &mut String, depth: usize) {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{:indent$}{} [{}]", "", self.op, self.traits, indent = depth * 2);
        for input in &self.inputs {
            input.explain_into(out, depth + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agg::{AggFunction, BuiltinAggKind};

    fn orders() -> PlanRef {
        PlanNode::logical_scan(
            TableRef {
                schema: "shop".into(),
                name: "orders".into(),
            },
            RowType::new(vec![
                Field::new("user_id", DataType::Int64, false),
                Field::new("amount", DataType::Float64, true),
                Field::new("region", DataType::Utf8, true),
            ]),
            Distribution::Any,
        )
    }

    #[test]
    fn test_aggregate_row_type() {
        let sum = AggregateCall::new(AggFunction::Builtin(BuiltinAggKind::Sum), vec![1], DataType::Float64)
            .with_name("total");
        let count = AggregateCall::new(AggFunction::Builtin(BuiltinAggKind::CountStar), vec![], DataType::Int64);
        let agg = PlanNode::logical_aggregate(orders(), GroupSet::new([2, 0]), vec![sum, count]).unwrap();

        let names: Vec<_> = agg.row_type.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["region", "user_id", "total", "EXPR$1"]);
        assert_eq!(agg.inputs.len(), 1);
        assert!(agg.op.is_logical());
    }

    #[test]
    fn test_aggregate_rejects_out_of_range_ordinals() {
        let err = PlanNode::logical_aggregate(orders(), GroupSet::new([3]), vec![]).unwrap_err();
        assert!(matches!(err, PlanError::InvalidPlan(_)));

        let sum = AggregateCall::new(AggFunction::Builtin(BuiltinAggKind::Sum), vec![7], DataType::Float64);
        let err = PlanNode::logical_aggregate(orders(), GroupSet::empty(), vec![sum]).unwrap_err();
        assert!(matches!(err, PlanError::InvalidPlan(msg) if msg.contains("$7")));
    }

    #[test]
    fn test_exchange_keeps_row_type_and_convention() {
        let scan = orders();
        let exchange = PlanNode::exchange(scan.clone(), Distribution::Singleton);
        assert_eq!(exchange.row_type, scan.row_type);
        assert_eq!(exchange.traits.convention, scan.traits.convention);
        assert_eq!(exchange.traits.distribution, Distribution::Singleton);
        assert!(Arc::ptr_eq(&exchange.inputs[0], &scan));
    }

    #[test]
    fn test_explain() {
        let agg = PlanNode::logical_aggregate(orders(), GroupSet::new([0]), vec![]).unwrap();
        let text = agg.explain();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("LogicalAggregate(group=[$0], aggs=[])"));
        assert!(lines[1].starts_with("  LogicalScan(table=shop.orders"));
    }
}
