//! Named fetch strategies.

use std::fmt;

use crate::catalog::Relation;

/// How the order aggregate is pulled from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Roots only; every relation is resolved on demand.
    Naive,
    /// Roots fetch-joined with member and delivery; items on demand.
    ToOneJoin,
    /// Everything fetch-joined in one query; rows deduplicated per root.
    FullJoin,
    /// To-one join for roots, then one batched query for their items.
    TwoPhase,
    /// Scalar columns only, regrouped in memory.
    FlatProjection,
}

impl Strategy {
    /// All strategies.
    pub const ALL: [Strategy; 5] = [
        Strategy::Naive,
        Strategy::ToOneJoin,
        Strategy::FullJoin,
        Strategy::TwoPhase,
        Strategy::FlatProjection,
    ];

    /// Relations joined into the root query itself.
    pub fn root_query_joins(&self) -> &'static [Relation] {
        match self {
            Strategy::Naive => &[],
            Strategy::ToOneJoin | Strategy::TwoPhase => {
                &[Relation::OrderMember, Relation::OrderDelivery]
            }
            Strategy::FullJoin | Strategy::FlatProjection => &[
                Relation::OrderMember,
                Relation::OrderDelivery,
                Relation::OrderItems,
                Relation::OrderItemItem,
            ],
        }
    }

    /// Whether the root query yields exactly one row per root.
    pub fn is_row_per_root(&self) -> bool {
        !self
            .root_query_joins()
            .iter()
            .any(|relation| relation.cardinality().multiplies_rows())
    }

    /// Stable name.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Naive => "naive",
            Strategy::ToOneJoin => "to-one-join",
            Strategy::FullJoin => "full-join",
            Strategy::TwoPhase => "two-phase",
            Strategy::FlatProjection => "flat-projection",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_per_root() {
        assert!(Strategy::Naive.is_row_per_root());
        assert!(Strategy::ToOneJoin.is_row_per_root());
        assert!(Strategy::TwoPhase.is_row_per_root());
        assert!(!Strategy::FullJoin.is_row_per_root());
        assert!(!Strategy::FlatProjection.is_row_per_root());
    }
}
