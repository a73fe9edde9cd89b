//! # Aggregate Calls and Their Classification
//!
//! An [`AggregateCall`] is one aggregate invocation inside a logical aggregate, e.g.
//! `SUM($1)` or `weighted_avg($1, $2)`. The planner cares about *where* the function
//! is implemented, because that decides which physical operator can evaluate it:
//!
//! - **Built-in** functions ship with the native runtime (`COUNT`, `SUM`, ...).
//! - **Native extensions** are user-defined aggregates compiled against the native
//!   runtime. They run in-process like built-ins, but their state is managed by the
//!   user's accumulator implementation.
//! - **Foreign** functions are user-defined aggregates evaluated by an external
//!   language runtime through a bridge. They come in two flavours:
//!   - `General`: accumulator style, fed one row at a time. Works on unbounded input.
//!   - `VectorBatch`: evaluated over a fully materialized batch of rows. Needs finite
//!     input and therefore cannot run in a continuous streaming job.
//!
//! ## Classification
//!
//! [`classify`] collapses a call into a [`FunctionCategory`]. Native extensions and
//! built-ins both classify as [`FunctionCategory::Builtin`] since both execute in the
//! native runtime; rules that must tell them apart use [`AggregateCall::is_builtin`].
//! The category is always recomputed from the call and is never stored on a plan node.

use crate::expr::{write_ordinals, DataType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregate functions implemented by the native runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuiltinAggKind {
    Count,
    /// `COUNT(*)`, takes no arguments.
    CountStar,
    Sum,
    /// `SUM` that yields 0 instead of NULL on empty input.
    Sum0,
    Avg,
    Min,
    Max,
    FirstValue,
    LastValue,
    ListAgg,
    Collect,
}

impl BuiltinAggKind {
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinAggKind::Count | BuiltinAggKind::CountStar => "COUNT",
            BuiltinAggKind::Sum => "SUM",
            BuiltinAggKind::Sum0 => "$SUM0",
            BuiltinAggKind::Avg => "AVG",
            BuiltinAggKind::Min => "MIN",
            BuiltinAggKind::Max => "MAX",
            BuiltinAggKind::FirstValue => "FIRST_VALUE",
            BuiltinAggKind::LastValue => "LAST_VALUE",
            BuiltinAggKind::ListAgg => "LISTAGG",
            BuiltinAggKind::Collect => "COLLECT",
        }
    }
}

/// Evaluation style of a foreign aggregate function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForeignFunctionKind {
    /// Row-at-a-time accumulator.
    General,
    /// Vectorized over a materialized batch.
    VectorBatch,
}

/// Identity of the function an aggregate call invokes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggFunction {
    Builtin(BuiltinAggKind),
    Foreign {
        name: String,
        kind: ForeignFunctionKind,
    },
    NativeExtension {
        name: String,
    },
}

impl AggFunction {
    pub fn name(&self) -> &str {
        match self {
            AggFunction::Builtin(kind) => kind.name(),
            AggFunction::Foreign { name, .. } | AggFunction::NativeExtension { name } => name,
        }
    }
}

/// Where an aggregate call is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionCategory {
    /// Evaluated by the native runtime (built-in or native extension).
    Builtin,
    /// Foreign, row-at-a-time.
    ForeignGeneral,
    /// Foreign, over materialized batches.
    ForeignVectorBatch,
}

/// One aggregate invocation within a logical aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AggregateCall {
    pub function: AggFunction,
    /// Input column ordinals passed as arguments.
    pub args: Vec<usize>,
    pub distinct: bool,
    /// Ordinal of a boolean input column filtering the rows fed to this call.
    pub filter_arg: Option<usize>,
    pub return_type: DataType,
    /// Output column name; the planner falls back to `EXPR$<i>`.
    pub name: Option<String>,
}

impl AggregateCall {
    pub fn new(function: AggFunction, args: Vec<usize>, return_type: DataType) -> Self {
        Self {
            function,
            args,
            distinct: false,
            filter_arg: None,
            return_type,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    pub fn with_filter(mut self, filter_arg: usize) -> Self {
        self.filter_arg = Some(filter_arg);
        self
    }

    /// Whether this call is foreign, optionally of a specific kind.
    ///
    /// `None` matches any foreign kind.
    pub fn is_foreign(&self, kind: Option<ForeignFunctionKind>) -> bool {
        match (&self.function, kind) {
            (AggFunction::Foreign { .. }, None) => true,
            (AggFunction::Foreign { kind: actual, .. }, Some(expected)) => *actual == expected,
            _ => false,
        }
    }

    /// Whether this call is one of the runtime's own aggregate functions.
    pub fn is_builtin(&self) -> bool {
        matches!(self.function, AggFunction::Builtin(_))
    }

    /// Input ordinals referenced by this call, including the filter column.
    pub fn referenced_ordinals(&self) -> impl Iterator<Item = usize> + '_ {
        self.args.iter().copied().chain(self.filter_arg)
    }
}

impl fmt::Display for AggregateCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.function.name())?;
        if self.distinct {
            write!(f, "DISTINCT ")?;
        }
        if matches!(self.function, AggFunction::Builtin(BuiltinAggKind::CountStar)) {
            write!(f, "*")?;
        } else {
            for (i, a) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "${a}")?;
            }
        }
        write!(f, ")")?;
        if let Some(filter) = self.filter_arg {
            write!(f, " FILTER ")?;
            write_ordinals(f, &[filter])?;
        }
        Ok(())
    }
}

/// Classify an aggregate call by where it is evaluated.
pub fn classify(call: &AggregateCall) -> FunctionCategory {
    match &call.function {
        AggFunction::Builtin(_) | AggFunction::NativeExtension { .. } => FunctionCategory::Builtin,
        AggFunction::Foreign {
            kind: ForeignFunctionKind::General,
            ..
        } => FunctionCategory::ForeignGeneral,
        AggFunction::Foreign {
            kind: ForeignFunctionKind::VectorBatch,
            ..
        } => FunctionCategory::ForeignVectorBatch,
    }
}
