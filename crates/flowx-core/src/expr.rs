//! # Operator and Row Types
//!
//! This module defines the plan representation used by the streaming planner.
//! It is organized into three layers:
//!
//! ## Row Types (`DataType`, `Field`, `RowType`)
//! Every plan node carries the shape of the rows it produces. The planner never
//! inspects values, only ordinals and declared types, so the type system is kept
//! deliberately small.
//!
//! ## Logical Operators (`LogicalOp`)
//! Logical operators describe *what* to compute without specifying *how*. A logical
//! `Aggregate` says "group the input by these columns and evaluate these calls"
//! but says nothing about where rows must live for the grouping to be correct.
//!
//! ## Physical Operators (`PhysicalOp`)
//! Physical operators describe *how* a streaming job executes the computation.
//! They are produced by converter rules, and each one knows which data distribution
//! it requires from its input (see [`crate::properties`]).
//!
//! ## Unified `Operator` Enum
//! The `Operator` enum wraps both logical and physical operators so that plan nodes
//! can store them uniformly. The `OpKind` discriminant allows pattern matching on
//! operator type without inspecting the operator's data fields.

use crate::agg::AggregateCall;
use crate::properties::Distribution;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a table in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    pub schema: String,
    pub name: String,
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Column types known to the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Boolean,
    Int32,
    Int64,
    Float64,
    Utf8,
    Timestamp,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Boolean => "BOOLEAN",
            DataType::Int32 => "INT",
            DataType::Int64 => "BIGINT",
            DataType::Float64 => "DOUBLE",
            DataType::Utf8 => "VARCHAR",
            DataType::Timestamp => "TIMESTAMP",
        };
        f.write_str(name)
    }
}

/// A single named column of a row type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
        }
    }
}

/// Ordered list of fields produced by a plan node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowType {
    pub fields: Vec<Field>,
}

impl RowType {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }
}

impl fmt::Display for RowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", field.name, field.data_type)?;
        }
        write!(f, ")")
    }
}

/// Grouping key of an aggregate: an ordered, duplicate-free list of input ordinals.
///
/// The order given by the caller is kept as-is. Hash distribution keys are derived
/// from this order, so two subtrees planned independently from the same group set
/// route equal key tuples to the same partition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupSet(Vec<usize>);

impl GroupSet {
    /// Build a group set, dropping repeated ordinals (the first occurrence wins).
    pub fn new(keys: impl IntoIterator<Item = usize>) -> Self {
        let mut ordinals = Vec::new();
        for key in keys {
            if !ordinals.contains(&key) {
                ordinals.push(key);
            }
        }
        Self(ordinals)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn cardinality(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.0.clone()
    }
}

impl fmt::Display for GroupSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_ordinals(f, &self.0)
    }
}

/// Write `[$0, $2]` style ordinal lists.
pub(crate) fn write_ordinals(f: &mut fmt::Formatter<'_>, ordinals: &[usize]) -> fmt::Result {
    write!(f, "[")?;
    for (i, o) in ordinals.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "${o}")?;
    }
    write!(f, "]")
}

/// Logical operators -- represent *what* to compute, not *how*.
///
/// Children are not stored inline; they live in the owning [`crate::plan::PlanNode`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOp {
    /// Source read. Always a leaf. `partitioning` is the distribution the source
    /// already delivers its rows in (for example a topic keyed by a column).
    Scan {
        table: TableRef,
        partitioning: Distribution,
    },
    /// Grouped aggregation: `GROUP BY group_set` evaluating `agg_calls` over the
    /// single child.
    Aggregate {
        group_set: GroupSet,
        agg_calls: Vec<AggregateCall>,
    },
}

/// Physical operators -- represent *how* a streaming job executes the computation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhysicalOp {
    /// Continuous read from a source. Provides the source's declared partitioning.
    StreamScan { table: TableRef },
    /// Exchange (shuffle): redistributes rows across execution partitions.
    /// Inserted by the enforcer when a child does not deliver the distribution
    /// its parent requires.
    Exchange { distribution: Distribution },
    /// Grouped aggregation evaluated entirely by the native runtime.
    StreamGroupAggregate {
        group_set: Vec<usize>,
        agg_calls: Vec<AggregateCall>,
    },
    /// Grouped aggregation whose calls include foreign (externally evaluated)
    /// functions. The operator keeps per-key accumulator state and forwards rows
    /// to the foreign runtime one at a time.
    StreamForeignGroupAggregate {
        group_set: Vec<usize>,
        agg_calls: Vec<AggregateCall>,
    },
}

/// Unified operator enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Logical(LogicalOp),
    Physical(PhysicalOp),
}

impl Operator {
    pub fn is_logical(&self) -> bool {
        matches!(self, Operator::Logical(_))
    }

    pub fn is_physical(&self) -> bool {
        matches!(self, Operator::Physical(_))
    }

    pub fn kind(&self) -> OpKind {
        match self {
            Operator::Logical(l) => OpKind::Logical(l.kind()),
            Operator::Physical(p) => OpKind::Physical(p.kind()),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Logical(LogicalOp::Scan {
                table,
                partitioning,
            }) => write!(f, "LogicalScan(table={table}, partitioning={partitioning})"),
            Operator::Logical(LogicalOp::Aggregate {
                group_set,
                agg_calls,
            }) => {
                write!(f, "LogicalAggregate(group={group_set}, aggs=")?;
                write_calls(f, agg_calls)?;
                write!(f, ")")
            }
            Operator::Physical(PhysicalOp::StreamScan { table }) => {
                write!(f, "StreamScan(table={table})")
            }
            Operator::Physical(PhysicalOp::Exchange { distribution }) => {
                write!(f, "Exchange(distribution={distribution})")
            }
            Operator::Physical(PhysicalOp::StreamGroupAggregate {
                group_set,
                agg_calls,
            }) => {
                write!(f, "StreamGroupAggregate(groupBy=")?;
                write_ordinals(f, group_set)?;
                write!(f, ", aggs=")?;
                write_calls(f, agg_calls)?;
                write!(f, ")")
            }
            Operator::Physical(PhysicalOp::StreamForeignGroupAggregate {
                group_set,
                agg_calls,
            }) => {
                write!(f, "StreamForeignGroupAggregate(groupBy=")?;
                write_ordinals(f, group_set)?;
                write!(f, ", aggs=")?;
                write_calls(f, agg_calls)?;
                write!(f, ")")
            }
        }
    }
}

fn write_calls(f: &mut fmt::Formatter<'_>, calls: &[AggregateCall]) -> fmt::Result {
    write!(f, "[")?;
    for (i, call) in calls.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{call}")?;
    }
    write!(f, "]")
}

/// Kind discriminant for pattern matching (without data).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Logical(LogicalOpKind),
    Physical(PhysicalOpKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOpKind {
    Scan,
    Aggregate,
}

impl LogicalOp {
    pub fn kind(&self) -> LogicalOpKind {
        match self {
            LogicalOp::Scan { .. } => LogicalOpKind::Scan,
            LogicalOp::Aggregate { .. } => LogicalOpKind::Aggregate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhysicalOpKind {
    StreamScan,
    Exchange,
    StreamGroupAggregate,
    StreamForeignGroupAggregate,
}

impl PhysicalOp {
    pub fn kind(&self) -> PhysicalOpKind {
        match self {
            PhysicalOp::StreamScan { .. } => PhysicalOpKind::StreamScan,
            PhysicalOp::Exchange { .. } => PhysicalOpKind::Exchange,
            PhysicalOp::StreamGroupAggregate { .. } => PhysicalOpKind::StreamGroupAggregate,
            PhysicalOp::StreamForeignGroupAggregate { .. } => {
                PhysicalOpKind::StreamForeignGroupAggregate
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_set_keeps_caller_order() {
        let keys = GroupSet::new([2, 0, 2, 1]);
        assert_eq!(keys.as_slice(), &[2, 0, 1]);
        assert_eq!(keys.cardinality(), 3);
        assert_eq!(keys.to_string(), "[$2, $0, $1]");
    }

    #[test]
    fn test_row_type_display() {
        let row = RowType::new(vec![
            Field::new("user_id", DataType::Int64, false),
            Field::new("amount", DataType::Float64, true),
        ]);
        assert_eq!(row.to_string(), "(user_id BIGINT, amount DOUBLE)");
        assert_eq!(row.field(1).map(|f| f.name.as_str()), Some("amount"));
        assert!(row.field(2).is_none());
    }
}
