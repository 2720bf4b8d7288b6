//! Application of (part of) a payment to an invoice.
//!
//! Only the allocation's own amount is checked here. Whether the allocations
//! of a payment add up to more than the payment is the service layer's call.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use coopledger_core::{
    AnnotationLimits, Annotations, AuditInfo, DomainResult, Entity, MAX_ANNOTATION_LENGTH,
};

use crate::ids::{InvoiceId, PaymentAllocationId, PaymentId};
use crate::money;

const ANNOTATION_LIMITS: AnnotationLimits = AnnotationLimits::new(MAX_ANNOTATION_LENGTH, 500);

/// Entity: PaymentAllocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentAllocation {
    id: PaymentAllocationId,
    payment_id: PaymentId,
    invoice_id: InvoiceId,
    amount: Decimal,
    annotations: Annotations,
    audit: AuditInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentAllocationUpdate {
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

/// Persisted shape of a [`PaymentAllocation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAllocationRecord {
    pub id: PaymentAllocationId,
    pub payment_id: PaymentId,
    pub invoice_id: InvoiceId,
    pub amount: Decimal,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub audit: AuditInfo,
}

impl PaymentAllocation {
    pub fn create(
        payment_id: PaymentId,
        invoice_id: InvoiceId,
        amount: Decimal,
        description: Option<&str>,
        notes: Option<&str>,
    ) -> DomainResult<Self> {
        let amount = money::ensure_positive("allocation amount", amount)?;
        let annotations = Annotations::new(description, notes, ANNOTATION_LIMITS)?;

        let allocation = Self {
            id: PaymentAllocationId::new(),
            payment_id,
            invoice_id,
            amount,
            annotations,
            audit: AuditInfo::default(),
        };
        debug!(payment_allocation_id = %allocation.id, %payment_id, %invoice_id, %amount, "payment allocated");
        Ok(allocation)
    }

    pub fn update(&mut self, changes: PaymentAllocationUpdate) -> DomainResult<&mut Self> {
        let amount = changes
            .amount
            .map(|a| money::ensure_positive("allocation amount", a))
            .transpose()?;
        let annotations = self.annotations.revised(
            changes.description.as_deref(),
            changes.notes.as_deref(),
            ANNOTATION_LIMITS,
        )?;

        if let Some(amount) = amount.filter(|a| *a != self.amount) {
            debug!(payment_allocation_id = %self.id, old = %self.amount, new = %amount, "payment allocation amount changed");
            self.amount = amount;
        }
        self.annotations = annotations;
        Ok(self)
    }

    pub fn id_typed(&self) -> PaymentAllocationId {
        self.id
    }

    pub fn payment_id(&self) -> PaymentId {
        self.payment_id
    }

    pub fn invoice_id(&self) -> InvoiceId {
        self.invoice_id
    }

    pub fn amount(&self) -> Decimal {
        self.amount
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

    pub fn to_record(&self) -> PaymentAllocationRecord {
        PaymentAllocationRecord {
            id: self.id,
            payment_id: self.payment_id,
            invoice_id: self.invoice_id,
            amount: self.amount,
            description: self.annotations.description().map(str::to_string),
            notes: self.annotations.notes().map(str::to_string),
            audit: self.audit.clone(),
        }
    }

    /// Rebuild from storage without validation. Persistence layer only.
    pub fn rehydrate(record: PaymentAllocationRecord) -> Self {
        Self {
            id: record.id,
            payment_id: record.payment_id,
            invoice_id: record.invoice_id,
            amount: record.amount,
            annotations: Annotations::from_parts(record.description, record.notes),
            audit: record.audit,
        }
    }
}

impl Entity for PaymentAllocation {
    type Id = PaymentAllocationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
