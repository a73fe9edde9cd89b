//! # Distribution Enforcer
//!
//! An "enforcer" is a physical operator whose sole purpose is to give its input a
//! trait it does not natively have. For distributions the enforcer is the
//! `Exchange`: it shuffles rows so that, for example, all rows with the same group
//! key end up on the same partition.
//!
//! The enforcer is only added when needed. A source that is already partitioned by
//! the group keys feeds the aggregate directly.

use crate::plan::{PlanNode, PlanRef};
use crate::properties::Distribution;
use tracing::trace;

/// Return `node` unchanged if it satisfies `required`, otherwise an exchange over it.
pub fn enforce_distribution(node: &PlanRef, required: &Distribution) -> PlanRef {
    if node.traits.distribution.satisfies(required) {
        return node.clone();
    }

    trace!(
        "Adding exchange: {} -> {}",
        node.traits.distribution,
        required
    );
    PlanNode::exchange(node.clone(), required.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{DataType, Field, Operator, PhysicalOp, RowType, TableRef};
    use crate::properties::{Convention, TraitSet};
    use std::sync::Arc;

    fn stream_scan(distribution: Distribution) -> PlanRef {
        PlanNode::new(
            Operator::Physical(PhysicalOp::StreamScan {
                table: TableRef {
                    schema: "s".into(),
                    name: "t".into(),
                },
            }),
            TraitSet::new(Convention::StreamPhysical, distribution),
            RowType::new(vec![
                Field::new("k", DataType::Int64, false),
                Field::new("v", DataType::Int64, true),
            ]),
            vec![],
        )
    }

    #[test]
    fn test_satisfied_distribution_is_left_alone() {
        let scan = stream_scan(Distribution::hash([0], true));
        let enforced = enforce_distribution(&scan, &Distribution::hash([0], true));
        assert!(Arc::ptr_eq(&scan, &enforced));
    }

    #[test]
    fn test_missing_distribution_adds_exchange() {
        let scan = stream_scan(Distribution::Any);
        let enforced = enforce_distribution(&scan, &Distribution::Singleton);
        assert!(matches!(
            &enforced.op,
            Operator::Physical(PhysicalOp::Exchange { distribution }) if *distribution == Distribution::Singleton
        ));
        assert_eq!(enforced.traits.convention, Convention::StreamPhysical);
        assert!(Arc::ptr_eq(&enforced.inputs[0], &scan));
    }
}
