//! # Rule System
//!
//! This module defines the converter rule trait and the registry that feeds rules to
//! the planner.
//!
//! ## Converter Rules
//!
//! A converter rule maps a node of one convention (usually `Logical`) to an
//! equivalent node of another (e.g. `StreamPhysical`). Several rules may target the
//! same logical operator; each one decides for itself whether it applies, and the
//! planner takes the first one that does.
//!
//! ## Matching
//!
//! Matching happens in two steps:
//!
//! 1. The rule's structural `Pattern` is checked by the planner.
//! 2. The rule's `matches` inspects the node's contents and answers with a
//!    [`MatchResult`]:
//!    - `NoMatch`: the rule does not apply; the planner tries the next rule.
//!    - `Match`: the planner calls `convert`.
//!    - `Reject(err)`: the node has the right shape for this rule but contains a
//!      combination no physical strategy can execute. Planning stops with `err`
//!      instead of silently falling through to a generic "no plan" failure.
//!
//! ## Re-traiting Inputs
//!
//! Conversions usually need their inputs in a particular shape (a convention and a
//! distribution). Rules ask the planner for that through [`TraitPlanner`]; the
//! planner may convert the input recursively and insert enforcers.
//!
//! ## Rule Registry
//!
//! The `RuleRegistry` collects all rules and can include source-specific rule sets
//! (e.g., a connector shipping its own scan rule). Rule sets are keyed by
//! `source_type` so that connector rules only fire for their source.

use crate::error::{PlanError, Result};
use crate::pattern::Pattern;
use crate::plan::PlanRef;
use crate::properties::{Convention, TraitSet};
use std::collections::HashMap;

/// Outcome of asking a rule whether it applies to a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    NoMatch,
    Match,
    Reject(PlanError),
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Match)
    }

    /// Collapse into "applies or not", with rejections as errors.
    pub fn into_result(self) -> Result<bool> {
        match self {
            MatchResult::NoMatch => Ok(false),
            MatchResult::Match => Ok(true),
            MatchResult::Reject(err) => Err(err),
        }
    }
}

/// The planner services available to a rule during conversion.
pub trait TraitPlanner {
    /// A trait set with no requirements in the planner's default convention.
    fn empty_traits(&self) -> TraitSet;

    /// Return a plan equivalent to `node` that satisfies `required`.
    ///
    /// The returned subtree may be `node` itself, a conversion of it, or an
    /// enforcer (e.g. an exchange) on top of either.
    fn change_traits(&mut self, node: &PlanRef, required: &TraitSet) -> Result<PlanRef>;
}

/// A rule converting nodes from one convention to another.
pub trait Rule: Send + Sync {
    /// Unique name of this rule.
    fn name(&self) -> &str;

    /// Pattern that this rule matches against.
    fn pattern(&self) -> Pattern;

    /// Convention of the nodes this rule consumes.
    fn in_convention(&self) -> Convention {
        Convention::Logical
    }

    /// Convention of the nodes this rule produces.
    fn out_convention(&self) -> Convention;

    /// Decide whether this rule applies to `node`. Only called on pattern matches.
    fn matches(&self, node: &PlanRef) -> MatchResult;

    /// Convert `node`. Only called after `matches` returned `Match`.
    fn convert(&self, node: &PlanRef, planner: &mut dyn TraitPlanner) -> Result<PlanRef>;
}

/// A named set of rules (e.g., for a specific connector).
pub struct RuleSet {
    pub name: String,
    pub rules: Vec<Box<dyn Rule>>,
}

/// Registry of planning rules.
pub struct RuleRegistry {
    pub base_rules: Vec<Box<dyn Rule>>,
    pub source_rules: HashMap<String, RuleSet>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self {
            base_rules: Vec::new(),
            source_rules: HashMap::new(),
        }
    }

    pub fn add_rule(&mut self, rule: Box<dyn Rule>) {
        self.base_rules.push(rule);
    }

    pub fn add_source_rule_set(&mut self, name: impl Into<String>, rule_set: RuleSet) {
        self.source_rules.insert(name.into(), rule_set);
    }

    /// Get all active rules for a given source type.
    ///
    /// Source rules come first so that a connector can take over an operator before
    /// the generic rules see it.
    pub fn active_rules(&self, source: Option<&str>) -> Vec<&dyn Rule> {
        let mut rules: Vec<&dyn Rule> = Vec::new();
        if let Some(rs) = source.and_then(|s| self.source_rules.get(s)) {
            rules.extend(rs.rules.iter().map(|r| r.as_ref()));
        }
        rules.extend(self.base_rules.iter().map(|r| r.as_ref()));
        rules
    }

    /// Rules converting from `from` to `to`, in application order.
    pub fn converter_rules(
        &self,
        source: Option<&str>,
        from: Convention,
        to: Convention,
    ) -> Vec<&dyn Rule> {
        self.active_rules(source)
            .into_iter()
            .filter(|r| r.in_convention() == from && r.out_convention() == to)
            .collect()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
