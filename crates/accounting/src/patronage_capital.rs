//! Patronage capital allocated to a cooperative member for a fiscal year and
//! retired (paid out) over time.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use coopledger_core::{
    AggregateRoot, AnnotationLimits, Annotations, AuditInfo, DomainError, DomainResult, Entity,
};
use coopledger_events::{Event, EventEnvelope, EventQueue};

use crate::ids::{MemberId, PatronageCapitalId};
use crate::money;

/// Fiscal years must be strictly later than this.
pub const MIN_FISCAL_YEAR: i32 = 1900;

const ANNOTATION_LIMITS: AnnotationLimits = AnnotationLimits::new(500, 2000);

/// Retirement status. `retire` derives it from retired vs. allocated;
/// `update_allocated_amount` can send a retired entry back to `Allocated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatronageCapitalStatus {
    Allocated,
    PartiallyRetired,
    Retired,
}

impl PatronageCapitalStatus {
    fn derive(allocated: Decimal, retired: Decimal) -> Self {
        if retired.is_zero() {
            Self::Allocated
        } else if retired >= allocated {
            Self::Retired
        } else {
            Self::PartiallyRetired
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allocated => "Allocated",
            Self::PartiallyRetired => "PartiallyRetired",
            Self::Retired => "Retired",
        }
    }
}

impl core::fmt::Display for PatronageCapitalStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate root: PatronageCapital.
///
/// Invariant: `0 <= amount_retired <= amount_allocated`, and `amount_retired`
/// never decreases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatronageCapital {
    id: PatronageCapitalId,
    member_id: MemberId,
    fiscal_year: i32,
    amount_allocated: Decimal,
    amount_retired: Decimal,
    status: PatronageCapitalStatus,
    annotations: Annotations,
    audit: AuditInfo,
    events: EventQueue<PatronageCapitalEvent>,
}

/// Persisted shape of a [`PatronageCapital`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatronageCapitalRecord {
    pub id: PatronageCapitalId,
    pub member_id: MemberId,
    pub fiscal_year: i32,
    pub amount_allocated: Decimal,
    pub amount_retired: Decimal,
    pub status: PatronageCapitalStatus,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub audit: AuditInfo,
}

/// Event: PatronageCapitalAllocated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatronageCapitalAllocated {
    pub patronage_capital_id: PatronageCapitalId,
    pub member_id: MemberId,
    pub fiscal_year: i32,
    pub amount_allocated: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PatronageCapitalPartiallyRetired / PatronageCapitalFullyRetired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatronageCapitalRetirement {
    pub patronage_capital_id: PatronageCapitalId,
    pub member_id: MemberId,
    pub fiscal_year: i32,
    /// Amount retired by this call.
    pub amount: Decimal,
    /// Cumulative amount retired after this call.
    pub amount_retired: Decimal,
    pub remaining_balance: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PatronageCapitalAllocationRevised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatronageCapitalAllocationRevised {
    pub patronage_capital_id: PatronageCapitalId,
    pub member_id: MemberId,
    pub previous_amount: Decimal,
    pub new_amount: Decimal,
    pub status: PatronageCapitalStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PatronageCapitalUpdated (annotations changed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatronageCapitalUpdated {
    pub patronage_capital_id: PatronageCapitalId,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatronageCapitalEvent {
    Allocated(PatronageCapitalAllocated),
    PartiallyRetired(PatronageCapitalRetirement),
    FullyRetired(PatronageCapitalRetirement),
    AllocationRevised(PatronageCapitalAllocationRevised),
    Updated(PatronageCapitalUpdated),
}

impl Event for PatronageCapitalEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PatronageCapitalEvent::Allocated(_) => "accounting.patronage_capital.allocated",
            PatronageCapitalEvent::PartiallyRetired(_) => {
                "accounting.patronage_capital.partially_retired"
            }
            PatronageCapitalEvent::FullyRetired(_) => "accounting.patronage_capital.fully_retired",
            PatronageCapitalEvent::AllocationRevised(_) => {
                "accounting.patronage_capital.allocation_revised"
            }
            PatronageCapitalEvent::Updated(_) => "accounting.patronage_capital.updated",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            PatronageCapitalEvent::Allocated(e) => e.occurred_at,
            PatronageCapitalEvent::PartiallyRetired(e) | PatronageCapitalEvent::FullyRetired(e) => {
                e.occurred_at
            }
            PatronageCapitalEvent::AllocationRevised(e) => e.occurred_at,
            PatronageCapitalEvent::Updated(e) => e.occurred_at,
        }
    }
}

impl PatronageCapital {
    pub const AGGREGATE_TYPE: &'static str = "accounting.patronage_capital";

    pub fn create(
        member_id: MemberId,
        fiscal_year: i32,
        amount_allocated: Decimal,
        description: Option<&str>,
        notes: Option<&str>,
    ) -> DomainResult<Self> {
        if fiscal_year <= MIN_FISCAL_YEAR {
            return Err(DomainError::validation(format!(
                "fiscal year must be after {MIN_FISCAL_YEAR}"
            )));
        }
        let amount_allocated = money::ensure_positive("allocated amount", amount_allocated)?;
        let annotations = Annotations::new(description, notes, ANNOTATION_LIMITS)?;

        let mut capital = Self {
            id: PatronageCapitalId::new(),
            member_id,
            fiscal_year,
            amount_allocated,
            amount_retired: Decimal::ZERO,
            status: PatronageCapitalStatus::Allocated,
            annotations,
            audit: AuditInfo::default(),
            events: EventQueue::new(),
        };
        capital
            .events
            .record(PatronageCapitalEvent::Allocated(PatronageCapitalAllocated {
                patronage_capital_id: capital.id,
                member_id,
                fiscal_year,
                amount_allocated,
                occurred_at: Utc::now(),
            }));
        debug!(patronage_capital_id = %capital.id, %member_id, fiscal_year, %amount_allocated, "patronage capital allocated");
        Ok(capital)
    }

    /// Change the free-text annotations. Queues `Updated` when they differ.
    pub fn update(&mut self, description: Option<&str>, notes: Option<&str>) -> DomainResult<&mut Self> {
        let annotations = self.annotations.revised(description, notes, ANNOTATION_LIMITS)?;
        if annotations != self.annotations {
            self.annotations = annotations;
            self.events
                .record(PatronageCapitalEvent::Updated(PatronageCapitalUpdated {
                    patronage_capital_id: self.id,
                    description: self.annotations.description().map(str::to_string),
                    notes: self.annotations.notes().map(str::to_string),
                    occurred_at: Utc::now(),
                }));
        }
        Ok(self)
    }

    /// Retire (pay out) `amount` of the remaining balance.
    pub fn retire(&mut self, amount: Decimal) -> DomainResult<&mut Self> {
        let amount = money::ensure_positive("retirement amount", amount)?;
        let remaining = self.remaining_balance();
        if amount > remaining {
            return Err(DomainError::invalid_operation(format!(
                "retirement amount {amount} exceeds remaining balance {remaining}"
            )));
        }

        self.amount_retired += amount;
        self.status = PatronageCapitalStatus::derive(self.amount_allocated, self.amount_retired);

        let retirement = PatronageCapitalRetirement {
            patronage_capital_id: self.id,
            member_id: self.member_id,
            fiscal_year: self.fiscal_year,
            amount,
            amount_retired: self.amount_retired,
            remaining_balance: self.remaining_balance(),
            occurred_at: Utc::now(),
        };
        let event = match self.status {
            PatronageCapitalStatus::Retired => PatronageCapitalEvent::FullyRetired(retirement),
            _ => PatronageCapitalEvent::PartiallyRetired(retirement),
        };
        self.events.record(event);
        info!(
            patronage_capital_id = %self.id,
            %amount,
            amount_retired = %self.amount_retired,
            status = %self.status,
            "patronage capital retired"
        );
        Ok(self)
    }

    /// Revise the allocated amount. The new amount must stay positive and may
    /// not drop below what has already been retired. Raising the base of a
    /// fully retired allocation reopens it as `Allocated`.
    pub fn update_allocated_amount(&mut self, new_amount: Decimal) -> DomainResult<&mut Self> {
        let new_amount = money::ensure_positive("allocated amount", new_amount)?;
        if new_amount < self.amount_retired {
            return Err(DomainError::invalid_operation(format!(
                "allocated amount {new_amount} cannot be less than amount already retired {}",
                self.amount_retired
            )));
        }
        if new_amount == self.amount_allocated {
            return Ok(self);
        }

        let previous_amount = self.amount_allocated;
        self.amount_allocated = new_amount;
        self.status = match self.status {
            _ if self.amount_retired >= new_amount => PatronageCapitalStatus::Retired,
            PatronageCapitalStatus::Retired => PatronageCapitalStatus::Allocated,
            current => current,
        };
        self.events.record(PatronageCapitalEvent::AllocationRevised(
            PatronageCapitalAllocationRevised {
                patronage_capital_id: self.id,
                member_id: self.member_id,
                previous_amount,
                new_amount,
                status: self.status,
                occurred_at: Utc::now(),
            },
        ));
        info!(patronage_capital_id = %self.id, %previous_amount, %new_amount, status = %self.status, "patronage capital allocation revised");
        Ok(self)
    }

    /// Allocated − retired.
    pub fn remaining_balance(&self) -> Decimal {
        self.amount_allocated - self.amount_retired
    }

    pub fn id_typed(&self) -> PatronageCapitalId {
        self.id
    }

    pub fn member_id(&self) -> MemberId {
        self.member_id
    }

    pub fn fiscal_year(&self) -> i32 {
        self.fiscal_year
    }

    pub fn amount_allocated(&self) -> Decimal {
        self.amount_allocated
    }

    pub fn amount_retired(&self) -> Decimal {
        self.amount_retired
    }

    pub fn status(&self) -> PatronageCapitalStatus {
        self.status
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
    ) -> Vec<EventEnvelope<PatronageCapitalEvent>> {
        self.events
            .drain_enveloped(self.id.into(), Self::AGGREGATE_TYPE, next_sequence)
    }

    pub fn to_record(&self) -> PatronageCapitalRecord {
        PatronageCapitalRecord {
            id: self.id,
            member_id: self.member_id,
            fiscal_year: self.fiscal_year,
            amount_allocated: self.amount_allocated,
            amount_retired: self.amount_retired,
            status: self.status,
            description: self.annotations.description().map(str::to_string),
            notes: self.annotations.notes().map(str::to_string),
            audit: self.audit.clone(),
        }
    }

    /// Rebuild from storage without validation or events. Persistence layer only.
    pub fn rehydrate(record: PatronageCapitalRecord) -> Self {
        Self {
            id: record.id,
            member_id: record.member_id,
            fiscal_year: record.fiscal_year,
            amount_allocated: record.amount_allocated,
            amount_retired: record.amount_retired,
            status: record.status,
            annotations: Annotations::from_parts(record.description, record.notes),
            audit: record.audit,
            events: EventQueue::new(),
        }
    }
}

impl Entity for PatronageCapital {
    type Id = PatronageCapitalId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for PatronageCapital {
    type Event = PatronageCapitalEvent;

    fn pending_events(&self) -> &[Self::Event] {
        self.events.pending()
    }

    fn take_events(&mut self) -> Vec<Self::Event> {
        self.events.drain()
    }
}
