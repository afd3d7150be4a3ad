//! Relations of the order aggregate.

/// Cardinality of a relation, seen from its owning side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Many owners share one target (foreign key on the owner).
    ManyToOne,
    /// One owner, one target (unique foreign key).
    OneToOne,
    /// One owner, many targets (foreign key on the target).
    OneToMany,
}

impl Cardinality {
    /// Whether joining this relation can multiply owner rows.
    pub fn multiplies_rows(&self) -> bool {
        matches!(self, Cardinality::OneToMany)
    }
}

/// Relations a strategy can traverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// `Order.member`
    OrderMember,
    /// `Order.delivery`
    OrderDelivery,
    /// `Order.orderItems`
    OrderItems,
    /// `OrderItem.item`
    OrderItemItem,
}

impl Relation {
    /// Cardinality of the relation.
    pub fn cardinality(&self) -> Cardinality {
        match self {
            Relation::OrderMember => Cardinality::ManyToOne,
            Relation::OrderDelivery => Cardinality::OneToOne,
            Relation::OrderItems => Cardinality::OneToMany,
            Relation::OrderItemItem => Cardinality::ManyToOne,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_collections_multiply_rows() {
        assert!(!Relation::OrderMember.cardinality().multiplies_rows());
        assert!(!Relation::OrderDelivery.cardinality().multiplies_rows());
        assert!(Relation::OrderItems.cardinality().multiplies_rows());
        assert!(!Relation::OrderItemItem.cardinality().multiplies_rows());
    }
}
