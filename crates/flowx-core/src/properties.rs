//! # Physical Traits
//!
//! Traits describe physical characteristics of a plan node's output. A trait set
//! pairs two of them:
//!
//! - **Convention**: the execution mode a node belongs to. Logical nodes carry
//!   `Convention::Logical`; converter rules move them to `StreamPhysical` (continuous
//!   jobs over unbounded input) or `BatchPhysical`.
//! - **Distribution**: how rows are spread over execution partitions. Grouped
//!   aggregation needs every row of a key on the same partition, so the aggregation
//!   rules require a hash distribution on the group keys (or a single partition when
//!   there are no keys).
//!
//! ## Enforcement
//!
//! When a child cannot natively deliver the distribution its parent requires, the
//! planner inserts an `Exchange` enforcer on top of it (see [`crate::enforcer`]).
//!
//! ## The "Any" Distribution
//!
//! `Distribution::Any` as a requirement means "no requirement"; as a provided trait
//! it means "nothing is known about the partitioning".

use crate::expr::write_ordinals;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution mode of a plan node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Convention {
    Logical,
    StreamPhysical,
    BatchPhysical,
}

impl fmt::Display for Convention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Convention::Logical => "LOGICAL",
            Convention::StreamPhysical => "STREAM_PHYSICAL",
            Convention::BatchPhysical => "BATCH_PHYSICAL",
        };
        f.write_str(name)
    }
}

/// Partitioning of rows across execution partitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Distribution {
    /// No requirement / unknown partitioning.
    #[default]
    Any,
    /// All rows on one partition. Required by global (ungrouped) aggregation, which
    /// keeps a single accumulator state.
    Singleton,
    /// Hash-partitioned on the given input ordinals, in this order.
    ///
    /// A `strict` requirement is only met by a hash on exactly these keys; a
    /// non-strict one also accepts a hash on a non-empty subset of them.
    Hash { keys: Vec<usize>, strict: bool },
    /// Every row replicated to all partitions.
    Broadcast,
}

impl Distribution {
    pub fn hash(keys: impl IntoIterator<Item = usize>, strict: bool) -> Self {
        Distribution::Hash {
            keys: keys.into_iter().collect(),
            strict,
        }
    }

    /// Check whether a node providing `self` meets the `required` distribution.
    pub fn satisfies(&self, required: &Distribution) -> bool {
        match (required, self) {
            (Distribution::Any, _) => true,
            (Distribution::Singleton, Distribution::Singleton) => true,
            (Distribution::Broadcast, Distribution::Broadcast) => true,
            (
                Distribution::Hash {
                    keys: required_keys,
                    strict: true,
                },
                Distribution::Hash { keys, .. },
            ) => keys == required_keys,
            (
                Distribution::Hash {
                    keys: required_keys,
                    strict: false,
                },
                Distribution::Hash { keys, .. },
            ) => !keys.is_empty() && keys.iter().all(|k| required_keys.contains(k)),
            _ => false,
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distribution::Any => f.write_str("any"),
            Distribution::Singleton => f.write_str("single"),
            Distribution::Broadcast => f.write_str("broadcast"),
            Distribution::Hash { keys, .. } => {
                f.write_str("hash")?;
                write_ordinals(f, keys)
            }
        }
    }
}

/// The physical traits of a plan node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraitSet {
    pub convention: Convention,
    pub distribution: Distribution,
}

impl TraitSet {
    /// Traits of a freshly built logical node.
    pub fn logical() -> Self {
        Self {
            convention: Convention::Logical,
            distribution: Distribution::Any,
        }
    }

    pub fn new(convention: Convention, distribution: Distribution) -> Self {
        Self {
            convention,
            distribution,
        }
    }

    pub fn replace_convention(&self, convention: Convention) -> Self {
        Self {
            convention,
            distribution: self.distribution.clone(),
        }
    }

    pub fn replace_distribution(&self, distribution: Distribution) -> Self {
        Self {
            convention: self.convention,
            distribution,
        }
    }

    /// Check if this (provided) trait set meets the `required` one.
    pub fn satisfies(&self, required: &TraitSet) -> bool {
        self.convention == required.convention && self.distribution.satisfies(&required.distribution)
    }
}

impl Default for TraitSet {
    fn default() -> Self {
        Self::logical()
    }
}

impl fmt::Display for TraitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.convention, self.distribution)
    }
}
