//! # Function Catalog
//!
//! The catalog resolves aggregate function names used in a query to their
//! definition: a built-in, a native extension, or a foreign function together with
//! its evaluation style. Logical planning uses it to build [`AggregateCall`]s.
//!
//! ## Trait Design
//!
//! `FunctionCatalog` sits behind a trait object (`dyn FunctionCatalog`) so that
//! different backends can supply definitions. `InMemoryFunctionCatalog` is a
//! HashMap-based implementation, pre-populated with the built-ins and extended
//! programmatically with user functions.
//!
//! Names are case-insensitive.

use crate::agg::{AggFunction, AggregateCall, BuiltinAggKind, ForeignFunctionKind};
use crate::error::{PlanError, Result};
use crate::expr::DataType;
use std::collections::HashMap;

/// Catalog of aggregate functions.
pub trait FunctionCatalog: Send + Sync {
    fn get_aggregate(&self, name: &str) -> Option<AggFunction>;
}

/// In-memory function catalog for testing and development.
#[derive(Debug, Clone)]
pub struct InMemoryFunctionCatalog {
    /// Function definitions keyed by lower-cased name.
    pub functions: HashMap<String, AggFunction>,
}

impl InMemoryFunctionCatalog {
    /// A catalog holding only the built-in aggregates.
    pub fn new() -> Self {
        let functions = [
            ("count", BuiltinAggKind::Count),
            ("sum", BuiltinAggKind::Sum),
            ("$sum0", BuiltinAggKind::Sum0),
            ("avg", BuiltinAggKind::Avg),
            ("min", BuiltinAggKind::Min),
            ("max", BuiltinAggKind::Max),
            ("first_value", BuiltinAggKind::FirstValue),
            ("last_value", BuiltinAggKind::LastValue),
            ("listagg", BuiltinAggKind::ListAgg),
            ("collect", BuiltinAggKind::Collect),
        ]
        .into_iter()
        .map(|(name, kind)| (name.to_string(), AggFunction::Builtin(kind)))
        .collect();
        Self { functions }
    }

    /// Register a foreign aggregate.
    pub fn register_foreign(&mut self, name: &str, kind: ForeignFunctionKind) {
        self.functions.insert(
            name.to_lowercase(),
            AggFunction::Foreign {
                name: name.to_string(),
                kind,
            },
        );
    }

    /// Register a native extension aggregate.
    pub fn register_native(&mut self, name: &str) {
        self.functions.insert(
            name.to_lowercase(),
            AggFunction::NativeExtension {
                name: name.to_string(),
            },
        );
    }

    /// Resolve `name` and build a call over `args`.
    ///
    /// `COUNT` without arguments resolves to `COUNT(*)`.
    pub fn aggregate_call(
        &self,
        name: &str,
        args: Vec<usize>,
        return_type: DataType,
    ) -> Result<AggregateCall> {
        let function = match self.get_aggregate(name) {
            Some(AggFunction::Builtin(BuiltinAggKind::Count)) if args.is_empty() => {
                AggFunction::Builtin(BuiltinAggKind::CountStar)
            }
            Some(function) => function,
            None => {
                return Err(PlanError::InvalidPlan(format!(
                    "unknown aggregate function '{name}'"
                )))
            }
        };
        Ok(AggregateCall::new(function, args, return_type))
    }
}

impl Default for InMemoryFunctionCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionCatalog for InMemoryFunctionCatalog {
    fn get_aggregate(&self, name: &str) -> Option<AggFunction> {
        self.functions.get(&name.to_lowercase()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agg::{classify, FunctionCategory};

    #[test]
    fn test_builtins_resolve() {
        let catalog = InMemoryFunctionCatalog::new();
        assert_eq!(
            catalog.get_aggregate("SUM"),
            Some(AggFunction::Builtin(BuiltinAggKind::Sum))
        );
        let count = catalog.aggregate_call("count", vec![], DataType::Int64).unwrap();
        assert_eq!(count.function, AggFunction::Builtin(BuiltinAggKind::CountStar));
    }

    #[test]
    fn test_user_functions_resolve() {
        let mut catalog = InMemoryFunctionCatalog::new();
        catalog.register_foreign("weighted_avg", ForeignFunctionKind::General);
        catalog.register_foreign("Median", ForeignFunctionKind::VectorBatch);
        catalog.register_native("top_k");

        let call = catalog.aggregate_call("WEIGHTED_AVG", vec![1, 2], DataType::Float64).unwrap();
        assert_eq!(classify(&call), FunctionCategory::ForeignGeneral);

        let call = catalog.aggregate_call("median", vec![1], DataType::Float64).unwrap();
        assert_eq!(classify(&call), FunctionCategory::ForeignVectorBatch);
        assert_eq!(call.function.name(), "Median");

        let call = catalog.aggregate_call("top_k", vec![0], DataType::Utf8).unwrap();
        assert!(!call.is_builtin());
        assert!(!call.is_foreign(None));
    }

    #[test]
    fn test_unknown_function() {
        let catalog = InMemoryFunctionCatalog::new();
        let err = catalog.aggregate_call("nope", vec![0], DataType::Int64).unwrap_err();
        assert_eq!(err.to_string(), "Invalid plan: unknown aggregate function 'nope'");
    }
}
