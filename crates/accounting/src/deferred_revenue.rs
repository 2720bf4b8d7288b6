//! Deferred (unearned) revenue awaiting recognition.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use coopledger_core::{
    AggregateRoot, AnnotationLimits, Annotations, AuditInfo, DomainError, DomainResult, Entity,
    text,
};
use coopledger_events::{Event, EventEnvelope, EventQueue};

use crate::ids::DeferredRevenueId;
use crate::money;

const MAX_NUMBER_LENGTH: usize = 50;
const ANNOTATION_LIMITS: AnnotationLimits = AnnotationLimits::new(500, 2000);

/// Aggregate root: DeferredRevenue.
///
/// `Unrecognized → Recognized`, exactly once. Once recognized the entry is
/// frozen: updates and a second recognition are rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredRevenue {
    id: DeferredRevenueId,
    deferred_revenue_number: String,
    recognition_date: NaiveDate,
    amount: Decimal,
    is_recognized: bool,
    recognized_date: Option<NaiveDate>,
    annotations: Annotations,
    audit: AuditInfo,
    events: EventQueue<DeferredRevenueEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeferredRevenueUpdate {
    pub deferred_revenue_number: Option<String>,
    pub recognition_date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

/// Persisted shape of a [`DeferredRevenue`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredRevenueRecord {
    pub id: DeferredRevenueId,
    pub deferred_revenue_number: String,
    pub recognition_date: NaiveDate,
    pub amount: Decimal,
    pub is_recognized: bool,
    pub recognized_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub audit: AuditInfo,
}

/// Event: DeferredRevenueCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredRevenueCreated {
    pub deferred_revenue_id: DeferredRevenueId,
    pub deferred_revenue_number: String,
    pub recognition_date: NaiveDate,
    pub amount: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DeferredRevenueUpdated (snapshot after the change).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredRevenueUpdated {
    pub deferred_revenue_id: DeferredRevenueId,
    pub deferred_revenue_number: String,
    pub recognition_date: NaiveDate,
    pub amount: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DeferredRevenueRecognized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeferredRevenueRecognized {
    pub deferred_revenue_id: DeferredRevenueId,
    pub deferred_revenue_number: String,
    pub amount: Decimal,
    pub recognized_date: NaiveDate,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeferredRevenueEvent {
    Created(DeferredRevenueCreated),
    Updated(DeferredRevenueUpdated),
    Recognized(DeferredRevenueRecognized),
}

impl Event for DeferredRevenueEvent {
    fn event_type(&self) -> &'static str {
        match self {
            DeferredRevenueEvent::Created(_) => "accounting.deferred_revenue.created",
            DeferredRevenueEvent::Updated(_) => "accounting.deferred_revenue.updated",
            DeferredRevenueEvent::Recognized(_) => "accounting.deferred_revenue.recognized",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            DeferredRevenueEvent::Created(e) => e.occurred_at,
            DeferredRevenueEvent::Updated(e) => e.occurred_at,
            DeferredRevenueEvent::Recognized(e) => e.occurred_at,
        }
    }
}

impl DeferredRevenue {
    pub const AGGREGATE_TYPE: &'static str = "accounting.deferred_revenue";

    pub fn create(
        deferred_revenue_number: &str,
        recognition_date: NaiveDate,
        amount: Decimal,
        description: Option<&str>,
        notes: Option<&str>,
    ) -> DomainResult<Self> {
        let deferred_revenue_number = text::required(
            "deferred revenue number",
            deferred_revenue_number,
            MAX_NUMBER_LENGTH,
        )?;
        let amount = money::ensure_positive("deferred revenue amount", amount)?;
        let annotations = Annotations::new(description, notes, ANNOTATION_LIMITS)?;

        let mut revenue = Self {
            id: DeferredRevenueId::new(),
            deferred_revenue_number,
            recognition_date,
            amount,
            is_recognized: false,
            recognized_date: None,
            annotations,
            audit: AuditInfo::default(),
            events: EventQueue::new(),
        };
        revenue
            .events
            .record(DeferredRevenueEvent::Created(DeferredRevenueCreated {
                deferred_revenue_id: revenue.id,
                deferred_revenue_number: revenue.deferred_revenue_number.clone(),
                recognition_date,
                amount,
                occurred_at: Utc::now(),
            }));
        debug!(deferred_revenue_id = %revenue.id, %amount, "deferred revenue created");
        Ok(revenue)
    }

    pub fn update(&mut self, changes: DeferredRevenueUpdate) -> DomainResult<&mut Self> {
        if self.is_recognized {
            return Err(DomainError::invalid_operation(
                "cannot modify recognized deferred revenue",
            ));
        }

        let number = changes
            .deferred_revenue_number
            .as_deref()
            .map(|n| text::required("deferred revenue number", n, MAX_NUMBER_LENGTH))
            .transpose()?;
        let amount = changes
            .amount
            .map(|a| money::ensure_positive("deferred revenue amount", a))
            .transpose()?;
        let annotations = self.annotations.revised(
            changes.description.as_deref(),
            changes.notes.as_deref(),
            ANNOTATION_LIMITS,
        )?;

        let mut changed = false;
        if let Some(number) = number.filter(|n| *n != self.deferred_revenue_number) {
            self.deferred_revenue_number = number;
            changed = true;
        }
        if let Some(date) = changes.recognition_date.filter(|d| *d != self.recognition_date) {
            self.recognition_date = date;
            changed = true;
        }
        if let Some(amount) = amount.filter(|a| *a != self.amount) {
            self.amount = amount;
            changed = true;
        }
        if annotations != self.annotations {
            self.annotations = annotations;
            changed = true;
        }

        if changed {
            self.events
                .record(DeferredRevenueEvent::Updated(DeferredRevenueUpdated {
                    deferred_revenue_id: self.id,
                    deferred_revenue_number: self.deferred_revenue_number.clone(),
                    recognition_date: self.recognition_date,
                    amount: self.amount,
                    occurred_at: Utc::now(),
                }));
            debug!(deferred_revenue_id = %self.id, "deferred revenue updated");
        }
        Ok(self)
    }

    /// Recognize the revenue as earned on `recognized_date`.
    pub fn recognize(&mut self, recognized_date: NaiveDate) -> DomainResult<&mut Self> {
        if self.is_recognized {
            return Err(DomainError::invalid_operation(
                "deferred revenue already recognized",
            ));
        }

        self.is_recognized = true;
        self.recognized_date = Some(recognized_date);
        self.events
            .record(DeferredRevenueEvent::Recognized(DeferredRevenueRecognized {
                deferred_revenue_id: self.id,
                deferred_revenue_number: self.deferred_revenue_number.clone(),
                amount: self.amount,
                recognized_date,
                occurred_at: Utc::now(),
            }));
        info!(deferred_revenue_id = %self.id, %recognized_date, amount = %self.amount, "deferred revenue recognized");
        Ok(self)
    }

    pub fn id_typed(&self) -> DeferredRevenueId {
        self.id
    }

    pub fn deferred_revenue_number(&self) -> &str {
        &self.deferred_revenue_number
    }

    pub fn recognition_date(&self) -> NaiveDate {
        self.recognition_date
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn is_recognized(&self) -> bool {
        self.is_recognized
    }

    pub fn recognized_date(&self) -> Option<NaiveDate> {
        self.recognized_date
    }

    pub fn description(&self) -> Option<&str> {
        self.annotations.description()
    }

    pub fn notes(&self) -> Option<&str> {
        self.annotations.notes()
    }

    pub fn audit(&self) -> &AuditInfo {
        &self.audit
    }

    pub fn audit_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit
    }

    /// Drain queued events as envelopes numbered from `next_sequence`.
    pub fn drain_enveloped(&mut self, next_sequence: u64) -> Vec<EventEnvelope<DeferredRevenueEvent>> {
        self.events
            .drain_enveloped(self.id.into(), Self::AGGREGATE_TYPE, next_sequence)
    }

    pub fn to_record(&self) -> DeferredRevenueRecord {
        DeferredRevenueRecord {
            id: self.id,
            deferred_revenue_number: self.deferred_revenue_number.clone(),
            recognition_date: self.recognition_date,
            amount: self.amount,
            is_recognized: self.is_recognized,
            recognized_date: self.recognized_date,
            description: self.annotations.description().map(str::to_string),
            notes: self.annotations.notes().map(str::to_string),
            audit: self.audit.clone(),
        }
    }

    /// Rebuild from storage without validation or events. Persistence layer only.
    pub fn rehydrate(record: DeferredRevenueRecord) -> Self {
        Self {
            id: record.id,
            deferred_revenue_number: record.deferred_revenue_number,
            recognition_date: record.recognition_date,
            amount: record.amount,
            is_recognized: record.is_recognized,
            recognized_date: record.recognized_date,
            annotations: Annotations::from_parts(record.description, record.notes),
            audit: record.audit,
            events: EventQueue::new(),
        }
    }
}

impl Entity for DeferredRevenue {
    type Id = DeferredRevenueId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for DeferredRevenue {
    type Event = DeferredRevenueEvent;

    fn pending_events(&self) -> &[Self::Event] {
        self.events.pending()
    }

    fn take_events(&mut self) -> Vec<Self::Event> {
        self.events.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn revenue() -> DeferredRevenue {
        DeferredRevenue::create("DR-2025-001", date(2025, 3, 31), dec!(1200.00), None, None)
            .unwrap()
    }

    #[test]
    fn create_queues_created_event() {
        let revenue = revenue();
        assert!(!revenue.is_recognized());
        assert_eq!(revenue.recognized_date(), None);

        match revenue.pending_events() {
            [DeferredRevenueEvent::Created(e)] => {
                assert_eq!(e.deferred_revenue_id, revenue.id_typed());
                assert_eq!(e.amount, dec!(1200.00));
                assert_eq!(e.deferred_revenue_number, "DR-2025-001");
            }
            other => panic!("expected a single Created event, got {other:?}"),
        }
    }

    #[test]
    fn create_rejects_non_positive_amount() {
        for amount in [dec!(0), dec!(-10)] {
            let err = DeferredRevenue::create("DR-1", date(2025, 1, 1), amount, None, None)
                .unwrap_err();
            assert_eq!(err, DomainError::validation("deferred revenue amount must be positive"));
        }
    }

    #[test]
    fn create_requires_number() {
        let err = DeferredRevenue::create("  ", date(2025, 1, 1), dec!(1), None, None)
            .unwrap_err();
        assert_eq!(err, DomainError::validation("deferred revenue number is required"));
    }

    #[test]
    fn second_recognition_fails_and_keeps_first_date() {
        let mut revenue = revenue();
        revenue.recognize(date(2025, 4, 1)).unwrap();

        let err = revenue.recognize(date(2025, 5, 1)).unwrap_err();
        match err {
            DomainError::InvalidOperation(msg) if msg.contains("already recognized") => {}
            other => panic!("expected InvalidOperation, got {other:?}"),
        }
        assert!(revenue.is_recognized());
        assert_eq!(revenue.recognized_date(), Some(date(2025, 4, 1)));

        let events = revenue.take_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].event_type(), "accounting.deferred_revenue.recognized");
    }

    #[test]
    fn recognized_revenue_cannot_be_updated() {
        let mut revenue = revenue();
        revenue.recognize(date(2025, 4, 1)).unwrap();

        let err = revenue
            .update(DeferredRevenueUpdate {
                amount: Some(dec!(99)),
                ..Default::default()
            })
            .unwrap_err();
        assert!(err.is_invalid_operation());
        assert_eq!(revenue.amount(), dec!(1200.00));
    }

    #[test]
    fn no_op_update_queues_nothing() {
        let mut revenue = revenue();
        revenue.take_events();

        revenue
            .update(DeferredRevenueUpdate {
                amount: Some(dec!(1200)),
                deferred_revenue_number: Some(" DR-2025-001 ".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert!(!revenue.has_pending_events());

        revenue
            .update(DeferredRevenueUpdate {
                recognition_date: Some(date(2025, 6, 30)),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(revenue.recognition_date(), date(2025, 6, 30));
        assert!(matches!(
            revenue.pending_events(),
            [DeferredRevenueEvent::Updated(_)]
        ));
    }

    #[test]
    fn failed_update_is_atomic() {
        let mut revenue = revenue();
        let before = revenue.clone();

        let err = revenue
            .update(DeferredRevenueUpdate {
                deferred_revenue_number: Some("DR-NEW".to_string()),
                amount: Some(dec!(0)),
                ..Default::default()
            })
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(revenue, before);
    }

    #[test]
    fn number_is_capped_at_fifty_chars() {
        let exact = "N".repeat(MAX_NUMBER_LENGTH);
        assert!(DeferredRevenue::create(&exact, date(2025, 1, 1), dec!(1), None, None).is_ok());

        let long = "N".repeat(MAX_NUMBER_LENGTH + 1);
        let err = DeferredRevenue::create(&long, date(2025, 1, 1), dec!(1), None, None)
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::validation("deferred revenue number cannot exceed 50 characters")
        );
    }

    #[test]
    fn description_is_capped_below_notes() {
        let description = "d".repeat(500);
        let notes = "n".repeat(2000);
        assert!(
            DeferredRevenue::create(
                "DR-1",
                date(2025, 1, 1),
                dec!(1),
                Some(&description),
                Some(&notes)
            )
            .is_ok()
        );

        let long = "d".repeat(501);
        let err = DeferredRevenue::create("DR-1", date(2025, 1, 1), dec!(1), Some(&long), None)
            .unwrap_err();
        assert_eq!(err, DomainError::validation("description cannot exceed 500 characters"));

        let long = "n".repeat(2001);
        let err = DeferredRevenue::create("DR-1", date(2025, 1, 1), dec!(1), None, Some(&long))
            .unwrap_err();
        assert_eq!(err, DomainError::validation("notes cannot exceed 2000 characters"));
    }

    #[test]
    fn over_long_text_on_update_changes_nothing() {
        let mut revenue = revenue();
        revenue.take_events();
        let before = revenue.clone();

        let err = revenue
            .update(DeferredRevenueUpdate {
                deferred_revenue_number: Some("N".repeat(MAX_NUMBER_LENGTH + 1)),
                amount: Some(dec!(1500)),
                ..Default::default()
            })
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(revenue, before);

        let err = revenue
            .update(DeferredRevenueUpdate {
                amount: Some(dec!(1500)),
                description: Some("d".repeat(501)),
                ..Default::default()
            })
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(revenue, before);
        assert!(!revenue.has_pending_events());
    }

    #[test]
    fn drain_enveloped_uses_entity_identity() {
        let mut revenue = revenue();
        revenue.recognize(date(2025, 4, 1)).unwrap();

        let envelopes = revenue.drain_enveloped(1);
        assert_eq!(envelopes.len(), 2);
        assert_eq!(envelopes[0].aggregate_type(), DeferredRevenue::AGGREGATE_TYPE);
        assert_eq!(envelopes[1].sequence_number(), 2);
        assert_eq!(
            envelopes[1].aggregate_id(),
            coopledger_core::AggregateId::from(revenue.id_typed())
        );
        assert!(!revenue.has_pending_events());
    }
}
