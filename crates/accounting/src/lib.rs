//! Accounting entities for a cooperative utility: budget lines, deferred
//! revenue, depreciation methods, invoice lines, patronage capital, payment
//! allocations and security deposits.
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns. Each
//! entity is built through its validating `create` factory, changed through
//! named methods, and (where it has a lifecycle) queues domain events for an
//! external dispatcher to drain after commit.

pub mod budget_detail;
pub mod deferred_revenue;
pub mod depreciation_method;
pub mod ids;
pub mod invoice_line_item;
mod money;
pub mod patronage_capital;
pub mod payment_allocation;
pub mod security_deposit;

pub use budget_detail::{BudgetDetail, BudgetDetailRecord, BudgetDetailUpdate};
pub use deferred_revenue::{
    DeferredRevenue, DeferredRevenueEvent, DeferredRevenueRecord, DeferredRevenueUpdate,
};
pub use depreciation_method::{
    DepreciationMethod, DepreciationMethodEvent, DepreciationMethodRecord,
    DepreciationMethodUpdate,
};
pub use ids::{
    AccountId, BudgetDetailId, BudgetId, DeferredRevenueId, DepreciationMethodId, InvoiceId,
    InvoiceLineItemId, MemberId, PatronageCapitalId, PaymentAllocationId, PaymentId,
    SecurityDepositId,
};
pub use invoice_line_item::{InvoiceLineItem, InvoiceLineItemRecord, InvoiceLineItemUpdate};
pub use patronage_capital::{
    PatronageCapital, PatronageCapitalEvent, PatronageCapitalRecord, PatronageCapitalStatus,
};
pub use payment_allocation::{PaymentAllocation, PaymentAllocationRecord, PaymentAllocationUpdate};
pub use security_deposit::{
    SecurityDeposit, SecurityDepositEvent, SecurityDepositRecord, SecurityDepositUpdate,
};
