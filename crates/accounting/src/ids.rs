//! Typed identifiers for accounting entities and the aggregates they point at.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use coopledger_core::{AggregateId, impl_uuid_newtype};

macro_rules! uuid_id {
    ($(#[$meta:meta])* $t:ident, $name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $t(Uuid);

        impl_uuid_newtype!($t, $name);
    };
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $t:ident, $name:literal) => {
        uuid_id!($(#[$meta])* $t, $name);

        impl From<$t> for AggregateId {
            fn from(value: $t) -> Self {
                AggregateId::from_uuid(value.0)
            }
        }
    };
}

entity_id!(
    /// Identity of a [`crate::BudgetDetail`].
    BudgetDetailId,
    "BudgetDetailId"
);
entity_id!(
    /// Identity of a [`crate::DeferredRevenue`].
    DeferredRevenueId,
    "DeferredRevenueId"
);
entity_id!(
    /// Identity of a [`crate::DepreciationMethod`].
    DepreciationMethodId,
    "DepreciationMethodId"
);
entity_id!(
    /// Identity of an [`crate::InvoiceLineItem`].
    InvoiceLineItemId,
    "InvoiceLineItemId"
);
entity_id!(
    /// Identity of a [`crate::PatronageCapital`] allocation.
    PatronageCapitalId,
    "PatronageCapitalId"
);
entity_id!(
    /// Identity of a [`crate::PaymentAllocation`].
    PaymentAllocationId,
    "PaymentAllocationId"
);
entity_id!(
    /// Identity of a [`crate::SecurityDeposit`].
    SecurityDepositId,
    "SecurityDepositId"
);

uuid_id!(
    /// Parent budget of a budget line.
    BudgetId,
    "BudgetId"
);
uuid_id!(
    /// Chart-of-accounts entry.
    AccountId,
    "AccountId"
);
uuid_id!(InvoiceId, "InvoiceId");
uuid_id!(PaymentId, "PaymentId");
uuid_id!(
    /// Cooperative member (patronage capital, deposits).
    MemberId,
    "MemberId"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_id_converts_to_aggregate_id() {
        let id = SecurityDepositId::new();
        let aggregate: AggregateId = id.into();
        assert_eq!(aggregate.as_uuid(), id.as_uuid());
    }

    #[test]
    fn parse_error_names_the_id_type() {
        let err = "xyz".parse::<MemberId>().unwrap_err();
        assert!(err.to_string().contains("MemberId"));
    }
}
