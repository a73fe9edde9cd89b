//! # flowx-core: Streaming Physical Planning Core
//!
//! This crate implements the data structures and the driver used to turn a logical
//! query plan into a physical plan for a continuous (streaming) execution engine.
//!
//! ## Module Overview
//!
//! - **`expr`**: Row types and operator definitions (logical and physical).
//! - **`agg`**: Aggregate call descriptors and their classification into built-in
//!   and foreign categories.
//! - **`plan`**: Immutable, `Arc`-shared plan trees.
//! - **`properties`**: Physical traits (convention, distribution) and satisfaction.
//! - **`pattern`**: Declarative pattern matching for rule applicability checks.
//! - **`rule`**: The converter `Rule` trait, match outcomes and the `RuleRegistry`.
//! - **`enforcer`**: Exchange insertion for unsatisfied distributions.
//! - **`planner`**: The heuristic planner driving rule application.
//! - **`catalog`**: Aggregate function catalog.
//! - **`config`**: Planner configuration.
//! - **`error`**: Planning errors.

pub mod agg;
pub mod catalog;
pub mod config;
pub mod enforcer;
pub mod error;
pub mod expr;
pub mod pattern;
pub mod plan;
pub mod planner;
pub mod properties;
pub mod rule;
