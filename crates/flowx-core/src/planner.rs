//! # Heuristic Trait Planner
//!
//! This module drives converter rules over a logical plan to produce a streaming
//! physical plan. It is deliberately simple: there is no cost model and no search
//! over alternatives. For every node the planner takes the first rule (in registry
//! order) that accepts it.
//!
//! ## How It Works
//!
//! Planning starts with [`HeuristicPlanner::optimize`], which asks for the root in
//! the `StreamPhysical` convention with the configured root distribution. From there
//! everything goes through [`TraitPlanner::change_traits`]:
//!
//! 1. **Convert**: if the node is not yet in the requested convention, find a rule
//!    whose pattern matches and whose `matches` answers `Match`, and let it convert
//!    the node. The rule will in turn call `change_traits` on the node's inputs with
//!    whatever traits it needs, so conversion proceeds top-down while the new tree
//!    is assembled bottom-up.
//! 2. **Enforce**: if the converted node does not deliver the requested
//!    distribution, wrap it in an `Exchange` (see [`crate::enforcer`]).
//!
//! ## Rejections
//!
//! A rule answering `Reject` ends planning immediately with its error. Later rules
//! are not consulted, since the rejection describes a query that cannot run at all.
//!
//! ## Termination
//!
//! Every successful rule match counts as one iteration. Planning fails with
//! `PlanError::IterationLimit` once `max_iterations` is exhausted.

use crate::config::PlannerConfig;
use crate::enforcer::enforce_distribution;
use crate::error::{PlanError, Result};
use crate::pattern::matches;
use crate::plan::PlanRef;
use crate::properties::{Convention, Distribution, TraitSet};
use crate::rule::{MatchResult, RuleRegistry, TraitPlanner};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Single-pass planner applying the first accepting rule to each node.
///
/// One planner handles one query; the rule registry is shared between planners.
pub struct HeuristicPlanner {
    /// Registry of converter rules to apply.
    pub rule_registry: Arc<RuleRegistry>,
    /// Configuration limits for planning.
    pub config: PlannerConfig,
    /// Running count of rule conversions.
    iterations: usize,
}

impl HeuristicPlanner {
    pub fn new(rule_registry: Arc<RuleRegistry>, config: PlannerConfig) -> Self {
        Self {
            rule_registry,
            config,
            iterations: 0,
        }
    }

    /// Number of rule conversions performed so far.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Convert a logical plan into a streaming physical plan.
    pub fn optimize(&mut self, root: &PlanRef) -> Result<PlanRef> {
        debug!("Starting streaming planning: root={}", root.op);

        let required = TraitSet::new(
            Convention::StreamPhysical,
            self.config.root_distribution.clone(),
        );
        let plan = self.change_traits(root, &required);

        match &plan {
            Ok(_) => debug!("Planning complete: iterations={}", self.iterations),
            Err(err) => warn!("Planning failed: {err}"),
        }
        plan
    }

    /// Convert `node` into `target` convention using the first accepting rule.
    fn convert_node(&mut self, node: &PlanRef, target: Convention) -> Result<PlanRef> {
        if node.traits.convention == target {
            return Ok(node.clone());
        }

        // Hold our own handle so rules can borrow the planner mutably.
        let registry = Arc::clone(&self.rule_registry);
        let source = self.config.source_type.clone();

        for rule in registry.converter_rules(source.as_deref(), node.traits.convention, target) {
            if !matches(node, &rule.pattern()) {
                continue;
            }

            match rule.matches(node) {
                MatchResult::NoMatch => {
                    trace!("Rule '{}' does not apply to {}", rule.name(), node.op);
                    continue;
                }
                MatchResult::Reject(err) => {
                    warn!("Rule '{}' rejected {}: {}", rule.name(), node.op, err);
                    return Err(err);
                }
                MatchResult::Match => {}
            }

            if self.iterations >= self.config.max_iterations {
                debug!("Hit iteration limit");
                return Err(PlanError::IterationLimit(self.config.max_iterations));
            }
            self.iterations += 1;

            trace!("Applying rule '{}' to {}", rule.name(), node.op);
            return rule.convert(node, self);
        }

        Err(PlanError::NoPlan {
            operator: node.op.to_string(),
            required: TraitSet::new(target, Distribution::Any),
        })
    }
}

impl TraitPlanner for HeuristicPlanner {
    fn empty_traits(&self) -> TraitSet {
        TraitSet::logical()
    }

    fn change_traits(&mut self, node: &PlanRef, required: &TraitSet) -> Result<PlanRef> {
        let converted = self.convert_node(node, required.convention)?;
        Ok(enforce_distribution(&converted, &required.distribution))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::*;
    use crate::pattern::Pattern;
    use crate::plan::PlanNode;
    use crate::rule::Rule;

    /// Logical scan to stream scan, providing the source partitioning.
    struct ScanRule;

    impl Rule for ScanRule {
        fn name(&self) -> &str {
            "TestScan"
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
                return Err(PlanError::InvalidPlan("expected scan".into()));
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

    /// Global aggregate requiring a singleton input; rejects aggregates with keys.
    struct GlobalAggRule;

    impl Rule for GlobalAggRule {
        fn name(&self) -> &str {
            "TestGlobalAgg"
        }

        fn pattern(&self) -> Pattern {
            Pattern::aggregate()
        }

        fn out_convention(&self) -> Convention {
            Convention::StreamPhysical
        }

        fn matches(&self, node: &PlanRef) -> MatchResult {
            match &node.op {
                Operator::Logical(LogicalOp::Aggregate { group_set, .. }) if group_set.is_empty() => {
                    MatchResult::Match
                }
                _ => MatchResult::Reject(PlanError::InvalidPlan("grouped".into())),
            }
        }

        fn convert(&self, node: &PlanRef, planner: &mut dyn TraitPlanner) -> Result<PlanRef> {
            let required = planner
                .empty_traits()
                .replace_convention(Convention::StreamPhysical)
                .replace_distribution(Distribution::Singleton);
            let input = planner.change_traits(&node.inputs[0], &required)?;
            Ok(PlanNode::new(
                Operator::Physical(PhysicalOp::StreamGroupAggregate {
                    group_set: vec![],
                    agg_calls: vec![],
                }),
                node.traits.replace_convention(Convention::StreamPhysical),
                node.row_type.clone(),
                vec![input],
            ))
        }
    }

    fn registry() -> Arc<RuleRegistry> {
        let mut registry = RuleRegistry::new();
        registry.add_rule(Box::new(ScanRule));
        registry.add_rule(Box::new(GlobalAggRule));
        Arc::new(registry)
    }

    fn scan(partitioning: Distribution) -> PlanRef {
        PlanNode::logical_scan(
            TableRef {
                schema: "s".into(),
                name: "t".into(),
            },
            RowType::new(vec![Field::new("k", DataType::Int64, false)]),
            partitioning,
        )
    }

    #[test]
    fn test_inserts_exchange_when_input_is_not_distributed() {
        let agg = PlanNode::logical_aggregate(scan(Distribution::Any), GroupSet::empty(), vec![]).unwrap();
        let mut planner = HeuristicPlanner::new(registry(), PlannerConfig::default());
        let plan = planner.optimize(&agg).unwrap();

        let exchange = &plan.inputs[0];
        assert_eq!(exchange.kind(), OpKind::Physical(PhysicalOpKind::Exchange));
        assert_eq!(exchange.traits.distribution, Distribution::Singleton);
        assert_eq!(
            exchange.inputs[0].kind(),
            OpKind::Physical(PhysicalOpKind::StreamScan)
        );
        assert_eq!(planner.iterations(), 2);
    }

    #[test]
    fn test_skips_exchange_when_source_already_satisfies() {
        let agg =
            PlanNode::logical_aggregate(scan(Distribution::Singleton), GroupSet::empty(), vec![]).unwrap();
        let mut planner = HeuristicPlanner::new(registry(), PlannerConfig::default());
        let plan = planner.optimize(&agg).unwrap();
        assert_eq!(
            plan.inputs[0].kind(),
            OpKind::Physical(PhysicalOpKind::StreamScan)
        );
    }

    #[test]
    fn test_root_distribution_is_enforced() {
        let config = PlannerConfig {
            root_distribution: Distribution::Broadcast,
            ..PlannerConfig::default()
        };
        let mut planner = HeuristicPlanner::new(registry(), config);
        let plan = planner.optimize(&scan(Distribution::Any)).unwrap();
        assert_eq!(plan.kind(), OpKind::Physical(PhysicalOpKind::Exchange));
        assert_eq!(plan.traits.distribution, Distribution::Broadcast);
    }

    #[test]
    fn test_rejection_stops_planning() {
        let agg = PlanNode::logical_aggregate(scan(Distribution::Any), GroupSet::new([0]), vec![]).unwrap();
        let mut planner = HeuristicPlanner::new(registry(), PlannerConfig::default());
        let err = planner.optimize(&agg).unwrap_err();
        assert_eq!(err, PlanError::InvalidPlan("grouped".into()));
    }

    #[test]
    fn test_no_rule_gives_no_plan() {
        let mut planner = HeuristicPlanner::new(Arc::new(RuleRegistry::new()), PlannerConfig::default());
        let err = planner.optimize(&scan(Distribution::Any)).unwrap_err();
        assert!(matches!(err, PlanError::NoPlan { ref operator, .. } if operator.starts_with("LogicalScan")));
    }

    #[test]
    fn test_iteration_limit() {
        let agg = PlanNode::logical_aggregate(scan(Distribution::Any), GroupSet::empty(), vec![]).unwrap();
        let config = PlannerConfig {
            max_iterations: 1,
            ..PlannerConfig::default()
        };
        let mut planner = HeuristicPlanner::new(registry(), config);
        assert_eq!(planner.optimize(&agg).unwrap_err(), PlanError::IterationLimit(1));
    }
}
