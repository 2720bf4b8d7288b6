//! End-to-end lifecycles across the accounting entities, the way a service
//! layer would drive them inside one unit of work.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use coopledger_accounting::{
    BudgetDetail, BudgetId, AccountId, DeferredRevenue, InvoiceId, InvoiceLineItem,
    InvoiceLineItemUpdate, MemberId, PatronageCapital, PatronageCapitalEvent,
    PatronageCapitalRecord, PatronageCapitalStatus, PaymentAllocation, PaymentId,
    SecurityDeposit, SecurityDepositEvent,
};
use coopledger_core::{AggregateRoot, DomainError, UserId};
use coopledger_events::Event;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn patronage_capital_rotation_scenario() {
    coopledger_observability::init();

    let member_id = MemberId::new();
    let mut capital = PatronageCapital::create(member_id, 2024, dec!(1000.00), None, None).unwrap();
    assert_eq!(capital.status(), PatronageCapitalStatus::Allocated);
    assert_eq!(capital.amount_retired(), Decimal::ZERO);

    capital.retire(dec!(400.00)).unwrap();
    assert_eq!(capital.amount_retired(), dec!(400.00));
    assert_eq!(capital.status(), PatronageCapitalStatus::PartiallyRetired);

    capital.retire(dec!(600.00)).unwrap();
    assert_eq!(capital.amount_retired(), dec!(1000.00));
    assert_eq!(capital.status(), PatronageCapitalStatus::Retired);

    let err = capital.retire(dec!(1)).unwrap_err();
    assert!(matches!(err, DomainError::InvalidOperation(_)));
    assert_eq!(capital.amount_retired(), dec!(1000.00));
    assert_eq!(capital.status(), PatronageCapitalStatus::Retired);

    let envelopes = capital.drain_enveloped(1);
    let types: Vec<_> = envelopes.iter().map(|e| e.event_type().to_string()).collect();
    assert_eq!(
        types,
        vec![
            "accounting.patronage_capital.allocated",
            "accounting.patronage_capital.partially_retired",
            "accounting.patronage_capital.fully_retired",
        ]
    );
    assert!(envelopes.windows(2).all(|w| w[0].sequence_number() + 1 == w[1].sequence_number()));
    assert!(!capital.has_pending_events());
}

#[test]
fn security_deposit_refund_scenario() {
    let mut deposit =
        SecurityDeposit::create(MemberId::new(), dec!(150.00), date(2024, 1, 10), None, None)
            .unwrap();

    deposit.refund(date(2025, 1, 10), Some("CHK1001")).unwrap();
    assert!(deposit.is_refunded());
    assert_eq!(deposit.refund_reference(), Some("CHK1001"));

    assert!(deposit.refund(date(2025, 1, 11), Some("CHK1002")).is_err());

    let events = deposit.take_events();
    assert!(matches!(events.last(), Some(SecurityDepositEvent::Refunded(_))));
    assert!(events.iter().all(|e| e.occurred_at() <= Utc::now()));
}

#[test]
fn deferred_revenue_recognized_once() {
    let mut revenue =
        DeferredRevenue::create("DR-0042", date(2025, 12, 31), dec!(2400), None, None).unwrap();
    revenue.recognize(date(2025, 12, 31)).unwrap();

    let err = revenue.recognize(date(2026, 1, 31)).unwrap_err();
    assert!(matches!(err, DomainError::InvalidOperation(_)));
    assert!(revenue.is_recognized());
    assert_eq!(revenue.recognized_date(), Some(date(2025, 12, 31)));
}

#[test]
fn data_entities_validate_their_numbers() {
    assert!(
        BudgetDetail::create(BudgetId::new(), AccountId::new(), dec!(-0.01), None, None).is_err()
    );
    assert!(InvoiceLineItem::create(InvoiceId::new(), "Pole rental", dec!(0), dec!(5), None).is_err());
    assert!(PaymentAllocation::create(PaymentId::new(), InvoiceId::new(), dec!(0), None, None).is_err());

    let budget = BudgetDetail::create(BudgetId::new(), AccountId::new(), dec!(0), None, None).unwrap();
    assert_eq!(budget.variance_percentage().unwrap(), Decimal::ZERO);

    let mut line =
        InvoiceLineItem::create(InvoiceId::new(), "Pole rental", dec!(2), dec!(17.25), None)
            .unwrap();
    line.update(InvoiceLineItemUpdate {
        quantity: Some(dec!(3)),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(line.total_price(), dec!(51.75));
}

#[test]
fn persisted_record_round_trips_through_json() {
    let mut capital =
        PatronageCapital::create(MemberId::new(), 2023, dec!(500), Some("general rotation"), None)
            .unwrap();
    capital.retire(dec!(125.50)).unwrap();
    capital.audit_mut().record_created(Some(UserId::new()), Utc::now());
    let pending = capital.take_events();
    assert!(matches!(pending[0], PatronageCapitalEvent::Allocated(_)));

    let json = serde_json::to_value(capital.to_record()).unwrap();
    assert_eq!(json["status"], "PartiallyRetired");
    assert_eq!(json["description"], "general rotation");

    let record: PatronageCapitalRecord = serde_json::from_value(json).unwrap();
    let restored = PatronageCapital::rehydrate(record);
    assert_eq!(restored, capital);
    assert!(!restored.has_pending_events());
    assert_eq!(restored.remaining_balance(), dec!(374.50));
}
