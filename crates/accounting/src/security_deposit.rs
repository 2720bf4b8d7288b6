//! Member security deposits held against service and refunded once.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use coopledger_core::{
    AggregateRoot, AnnotationLimits, Annotations, AuditInfo, DomainError, DomainResult, Entity,
    text,
};
use coopledger_events::{Event, EventEnvelope, EventQueue};

use crate::ids::{MemberId, SecurityDepositId};
use crate::money;

const MAX_REFUND_REFERENCE_LENGTH: usize = 100;
const ANNOTATION_LIMITS: AnnotationLimits = AnnotationLimits::new(500, 2000);

/// Aggregate root: SecurityDeposit.
///
/// `Held → Refunded`, exactly once. A refunded deposit is frozen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityDeposit {
    id: SecurityDepositId,
    member_id: MemberId,
    deposit_amount: Decimal,
    deposit_date: NaiveDate,
    is_refunded: bool,
    refunded_date: Option<NaiveDate>,
    refund_reference: Option<String>,
    annotations: Annotations,
    audit: AuditInfo,
    events: EventQueue<SecurityDepositEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityDepositUpdate {
    pub deposit_amount: Option<Decimal>,
    pub deposit_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

/// Persisted shape of a [`SecurityDeposit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityDepositRecord {
    pub id: SecurityDepositId,
    pub member_id: MemberId,
    pub deposit_amount: Decimal,
    pub deposit_date: NaiveDate,
    pub is_refunded: bool,
    pub refunded_date: Option<NaiveDate>,
    pub refund_reference: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub audit: AuditInfo,
}

/// Event: SecurityDepositReceived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityDepositReceived {
    pub security_deposit_id: SecurityDepositId,
    pub member_id: MemberId,
    pub deposit_amount: Decimal,
    pub deposit_date: NaiveDate,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SecurityDepositUpdated (snapshot after the change).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityDepositUpdated {
    pub security_deposit_id: SecurityDepositId,
    pub member_id: MemberId,
    pub deposit_amount: Decimal,
    pub deposit_date: NaiveDate,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SecurityDepositRefunded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityDepositRefunded {
    pub security_deposit_id: SecurityDepositId,
    pub member_id: MemberId,
    pub deposit_amount: Decimal,
    pub refunded_date: NaiveDate,
    pub refund_reference: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityDepositEvent {
    Received(SecurityDepositReceived),
    Updated(SecurityDepositUpdated),
    Refunded(SecurityDepositRefunded),
}

impl Event for SecurityDepositEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SecurityDepositEvent::Received(_) => "accounting.security_deposit.received",
            SecurityDepositEvent::Updated(_) => "accounting.security_deposit.updated",
            SecurityDepositEvent::Refunded(_) => "accounting.security_deposit.refunded",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            SecurityDepositEvent::Received(e) => e.occurred_at,
            SecurityDepositEvent::Updated(e) => e.occurred_at,
            SecurityDepositEvent::Refunded(e) => e.occurred_at,
        }
    }
}

impl SecurityDeposit {
    pub const AGGREGATE_TYPE: &'static str = "accounting.security_deposit";

    pub fn create(
        member_id: MemberId,
        deposit_amount: Decimal,
        deposit_date: NaiveDate,
        description: Option<&str>,
        notes: Option<&str>,
    ) -> DomainResult<Self> {
        let deposit_amount = money::ensure_positive("deposit amount", deposit_amount)?;
        let annotations = Annotations::new(description, notes, ANNOTATION_LIMITS)?;

        let mut deposit = Self {
            id: SecurityDepositId::new(),
            member_id,
            deposit_amount,
            deposit_date,
            is_refunded: false,
            refunded_date: None,
            refund_reference: None,
            annotations,
            audit: AuditInfo::default(),
            events: EventQueue::new(),
        };
        deposit
            .events
            .record(SecurityDepositEvent::Received(SecurityDepositReceived {
                security_deposit_id: deposit.id,
                member_id,
                deposit_amount,
                deposit_date,
                occurred_at: Utc::now(),
            }));
        debug!(security_deposit_id = %deposit.id, %member_id, %deposit_amount, "security deposit received");
        Ok(deposit)
    }

    pub fn update(&mut self, changes: SecurityDepositUpdate) -> DomainResult<&mut Self> {
        if self.is_refunded {
            return Err(DomainError::invalid_operation(
                "cannot modify a refunded security deposit",
            ));
        }

        let deposit_amount = changes
            .deposit_amount
            .map(|a| money::ensure_positive("deposit amount", a))
            .transpose()?;
        let annotations = self.annotations.revised(
            changes.description.as_deref(),
            changes.notes.as_deref(),
            ANNOTATION_LIMITS,
        )?;

        let mut changed = false;
        if let Some(amount) = deposit_amount.filter(|a| *a != self.deposit_amount) {
            self.deposit_amount = amount;
            changed = true;
        }
        if let Some(date) = changes.deposit_date.filter(|d| *d != self.deposit_date) {
            self.deposit_date = date;
            changed = true;
        }
        if annotations != self.annotations {
            self.annotations = annotations;
            changed = true;
        }

        if changed {
            self.events
                .record(SecurityDepositEvent::Updated(SecurityDepositUpdated {
                    security_deposit_id: self.id,
                    member_id: self.member_id,
                    deposit_amount: self.deposit_amount,
                    deposit_date: self.deposit_date,
                    occurred_at: Utc::now(),
                }));
            debug!(security_deposit_id = %self.id, "security deposit updated");
        }
        Ok(self)
    }

    /// Refund the full deposit. `reference` is the check or transfer number.
    pub fn refund(
        &mut self,
        refunded_date: NaiveDate,
        reference: Option<&str>,
    ) -> DomainResult<&mut Self> {
        if self.is_refunded {
            return Err(DomainError::invalid_operation(
                "security deposit already refunded",
            ));
        }
        if refunded_date < self.deposit_date {
            return Err(DomainError::validation(
                "refund date cannot be before the deposit date",
            ));
        }
        let reference = text::optional("refund reference", reference, MAX_REFUND_REFERENCE_LENGTH)?;

        self.is_refunded = true;
        self.refunded_date = Some(refunded_date);
        self.refund_reference = reference;
        self.events
            .record(SecurityDepositEvent::Refunded(SecurityDepositRefunded {
                security_deposit_id: self.id,
                member_id: self.member_id,
                deposit_amount: self.deposit_amount,
                refunded_date,
                refund_reference: self.refund_reference.clone(),
                occurred_at: Utc::now(),
            }));
        info!(security_deposit_id = %self.id, %refunded_date, amount = %self.deposit_amount, "security deposit refunded");
        Ok(self)
    }

    pub fn id_typed(&self) -> SecurityDepositId {
        self.id
    }

    pub fn member_id(&self) -> MemberId {
        self.member_id
    }

    pub fn deposit_amount(&self) -> Decimal {
        self.deposit_amount
    }

    pub fn deposit_date(&self) -> NaiveDate {
        self.deposit_date
    }

    pub fn is_refunded(&self) -> bool {
        self.is_refunded
    }

    pub fn refunded_date(&self) -> Option<NaiveDate> {
        self.refunded_date
    }

    pub fn refund_reference(&self) -> Option<&str> {
        self.refund_reference.as_deref()
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

    pub fn drain_enveloped(
        &mut self,
        next_sequence: u64,
    ) -> Vec<EventEnvelope<SecurityDepositEvent>> {
        self.events
            .drain_enveloped(self.id.into(), Self::AGGREGATE_TYPE, next_sequence)
    }

    pub fn to_record(&self) -> SecurityDepositRecord {
        SecurityDepositRecord {
            id: self.id,
            member_id: self.member_id,
            deposit_amount: self.deposit_amount,
            deposit_date: self.deposit_date,
            is_refunded: self.is_refunded,
            refunded_date: self.refunded_date,
            refund_reference: self.refund_reference.clone(),
            description: self.annotations.description().map(str::to_string),
            notes: self.annotations.notes().map(str::to_string),
            audit: self.audit.clone(),
        }
    }

    /// Rebuild from storage without validation or events. Persistence layer only.
    pub fn rehydrate(record: SecurityDepositRecord) -> Self {
        Self {
            id: record.id,
            member_id: record.member_id,
            deposit_amount: record.deposit_amount,
            deposit_date: record.deposit_date,
            is_refunded: record.is_refunded,
            refunded_date: record.refunded_date,
            refund_reference: record.refund_reference,
            annotations: Annotations::from_parts(record.description, record.notes),
            audit: record.audit,
            events: EventQueue::new(),
        }
    }
}

impl Entity for SecurityDeposit {
    type Id = SecurityDepositId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for SecurityDeposit {
    type Event = SecurityDepositEvent;

    fn pending_events(&self) -> &[Self::Event] {
        self.events.pending()
    }

    fn take_events(&mut self) -> Vec<Self::Event> {
        self.events.drain()
    }
}
