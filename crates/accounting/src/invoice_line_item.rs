//! A single priced line on an invoice.
//!
//! Pure data entity: no events. `total_price` is derived and always equals
//! `quantity × unit_price`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use coopledger_core::{AuditInfo, DomainError, DomainResult, Entity, MAX_ANNOTATION_LENGTH, text};

use crate::ids::{AccountId, InvoiceId, InvoiceLineItemId};
use crate::money;

/// Maximum length of a line description.
pub const MAX_LINE_DESCRIPTION_LENGTH: usize = 500;

/// Entity: InvoiceLineItem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceLineItem {
    id: InvoiceLineItemId,
    invoice_id: InvoiceId,
    description: String,
    quantity: Decimal,
    unit_price: Decimal,
    total_price: Decimal,
    account_id: Option<AccountId>,
    notes: Option<String>,
    audit: AuditInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceLineItemUpdate {
    pub description: Option<String>,
    pub quantity: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub account_id: Option<AccountId>,
    pub notes: Option<String>,
}

/// Persisted shape of an [`InvoiceLineItem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLineItemRecord {
    pub id: InvoiceLineItemId,
    pub invoice_id: InvoiceId,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub account_id: Option<AccountId>,
    pub notes: Option<String>,
    pub audit: AuditInfo,
}

fn line_total(quantity: Decimal, unit_price: Decimal) -> DomainResult<Decimal> {
    quantity
        .checked_mul(unit_price)
        .ok_or_else(|| DomainError::validation("invoice line total overflow"))
}

impl InvoiceLineItem {
    pub fn create(
        invoice_id: InvoiceId,
        description: &str,
        quantity: Decimal,
        unit_price: Decimal,
        account_id: Option<AccountId>,
    ) -> DomainResult<Self> {
        let description = text::required("description", description, MAX_LINE_DESCRIPTION_LENGTH)?;
        let quantity = money::ensure_positive("quantity", quantity)?;
        let unit_price = money::ensure_non_negative("unit price", unit_price)?;
        let total_price = line_total(quantity, unit_price)?;

        let item = Self {
            id: InvoiceLineItemId::new(),
            invoice_id,
            description,
            quantity,
            unit_price,
            total_price,
            account_id,
            notes: None,
            audit: AuditInfo::default(),
        };
        debug!(invoice_line_item_id = %item.id, %invoice_id, %total_price, "invoice line item created");
        Ok(item)
    }

    pub fn update(&mut self, changes: InvoiceLineItemUpdate) -> DomainResult<&mut Self> {
        let description = changes
            .description
            .as_deref()
            .map(|v| text::required("description", v, MAX_LINE_DESCRIPTION_LENGTH))
            .transpose()?;
        let quantity = changes
            .quantity
            .map(|q| money::ensure_positive("quantity", q))
            .transpose()?
            .filter(|q| *q != self.quantity);
        let unit_price = changes
            .unit_price
            .map(|p| money::ensure_non_negative("unit price", p))
            .transpose()?
            .filter(|p| *p != self.unit_price);
        let notes = match changes.notes.as_deref() {
            Some(v) => text::optional("notes", Some(v), MAX_ANNOTATION_LENGTH)?,
            None => self.notes.clone(),
        };
        let total_price = if quantity.is_some() || unit_price.is_some() {
            Some(line_total(
                quantity.unwrap_or(self.quantity),
                unit_price.unwrap_or(self.unit_price),
            )?)
        } else {
            None
        };

        if let Some(description) = description {
            self.description = description;
        }
        if let Some(account_id) = changes.account_id {
            self.account_id = Some(account_id);
        }
        self.notes = notes;
        if let Some(total_price) = total_price {
            self.quantity = quantity.unwrap_or(self.quantity);
            self.unit_price = unit_price.unwrap_or(self.unit_price);
            self.total_price = total_price;
            debug!(invoice_line_item_id = %self.id, %total_price, "invoice line item repriced");
        }
        Ok(self)
    }

    pub fn id_typed(&self) -> InvoiceLineItemId {
        self.id
    }

    pub fn invoice_id(&self) -> InvoiceId {
        self.invoice_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn total_price(&self) -> Decimal {
        self.total_price
    }

    pub fn account_id(&self) -> Option<AccountId> {
        self.account_id
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn audit(&self) -> &AuditInfo {
        &self.audit
    }

    pub fn audit_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit
    }

    pub fn to_record(&self) -> InvoiceLineItemRecord {
        InvoiceLineItemRecord {
            id: self.id,
            invoice_id: self.invoice_id,
            description: self.description.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            total_price: self.total_price,
            account_id: self.account_id,
            notes: self.notes.clone(),
            audit: self.audit.clone(),
        }
    }

    /// Rebuild from storage without validation. The stored `total_price` is
    /// taken as-is. Persistence layer only.
    pub fn rehydrate(record: InvoiceLineItemRecord) -> Self {
        Self {
            id: record.id,
            invoice_id: record.invoice_id,
            description: record.description,
            quantity: record.quantity,
            unit_price: record.unit_price,
            total_price: record.total_price,
            account_id: record.account_id,
            notes: record.notes,
            audit: record.audit,
        }
    }
}

impl Entity for InvoiceLineItem {
    type Id = InvoiceLineItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
