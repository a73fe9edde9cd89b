//! # Built-in Streaming Rules
//!
//! This crate provides the default converter rules taking a logical plan to the
//! `StreamPhysical` convention:
//!
//! - **`StreamScanRule`**: Implements a scan as a continuous source read.
//! - **`StreamForeignGroupAggregateRule`**: Implements a grouped aggregation that
//!   calls foreign aggregate functions. Rejects vectorized batch functions and
//!   mixes of foreign and native extension functions.
//! - **`StreamGroupAggregateRule`**: Implements a grouped aggregation evaluated
//!   entirely by the native runtime.

pub mod foreign_agg;
pub mod impl_agg;
pub mod impl_scan;

use flowx_core::rule::RuleRegistry;

/// Create a default rule registry with all streaming rules.
///
/// Source-specific rules can be added to the returned registry via
/// `add_source_rule_set()`.
pub fn default_rule_registry() -> RuleRegistry {
    let mut registry = RuleRegistry::new();

    registry.add_rule(Box::new(impl_scan::StreamScanRule));
    registry.add_rule(Box::new(foreign_agg::StreamForeignGroupAggregateRule));
    registry.add_rule(Box::new(impl_agg::StreamGroupAggregateRule));

    registry
}
