//! Depreciation method catalogue entry (straight line, declining balance, ...).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use coopledger_core::{
    AggregateRoot, AnnotationLimits, Annotations, AuditInfo, DomainError, DomainResult, Entity,
    text,
};
use coopledger_events::{Event, EventEnvelope, EventQueue};

use crate::ids::DepreciationMethodId;

const MAX_METHOD_CODE_LENGTH: usize = 32;
const MAX_NAME_LENGTH: usize = 256;
const MAX_FORMULA_LENGTH: usize = 1024;

/// Aggregate root: DepreciationMethod.
///
/// Created active. `Active ⇄ Inactive`; toggling into the current state is
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepreciationMethod {
    id: DepreciationMethodId,
    method_code: String,
    name: String,
    calculation_formula: String,
    is_active: bool,
    annotations: Annotations,
    audit: AuditInfo,
    events: EventQueue<DepreciationMethodEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepreciationMethodUpdate {
    pub method_code: Option<String>,
    pub name: Option<String>,
    pub calculation_formula: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

/// Persisted shape of a [`DepreciationMethod`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepreciationMethodRecord {
    pub id: DepreciationMethodId,
    pub method_code: String,
    pub name: String,
    pub calculation_formula: String,
    pub is_active: bool,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub audit: AuditInfo,
}

/// Event: DepreciationMethodCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepreciationMethodCreated {
    pub depreciation_method_id: DepreciationMethodId,
    pub method_code: String,
    pub name: String,
    pub calculation_formula: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DepreciationMethodUpdated (snapshot after the change).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepreciationMethodUpdated {
    pub depreciation_method_id: DepreciationMethodId,
    pub method_code: String,
    pub name: String,
    pub calculation_formula: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: DepreciationMethodActivated / DepreciationMethodDeactivated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepreciationMethodToggled {
    pub depreciation_method_id: DepreciationMethodId,
    pub method_code: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepreciationMethodEvent {
    Created(DepreciationMethodCreated),
    Updated(DepreciationMethodUpdated),
    Activated(DepreciationMethodToggled),
    Deactivated(DepreciationMethodToggled),
}

impl Event for DepreciationMethodEvent {
    fn event_type(&self) -> &'static str {
        match self {
            DepreciationMethodEvent::Created(_) => "accounting.depreciation_method.created",
            DepreciationMethodEvent::Updated(_) => "accounting.depreciation_method.updated",
            DepreciationMethodEvent::Activated(_) => "accounting.depreciation_method.activated",
            DepreciationMethodEvent::Deactivated(_) => {
                "accounting.depreciation_method.deactivated"
            }
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            DepreciationMethodEvent::Created(e) => e.occurred_at,
            DepreciationMethodEvent::Updated(e) => e.occurred_at,
            DepreciationMethodEvent::Activated(e) | DepreciationMethodEvent::Deactivated(e) => {
                e.occurred_at
            }
        }
    }
}

impl DepreciationMethod {
    pub const AGGREGATE_TYPE: &'static str = "accounting.depreciation_method";

    pub fn create(
        method_code: &str,
        name: &str,
        calculation_formula: &str,
        description: Option<&str>,
        notes: Option<&str>,
    ) -> DomainResult<Self> {
        let method_code = text::required("method code", method_code, MAX_METHOD_CODE_LENGTH)?;
        let name = text::required("name", name, MAX_NAME_LENGTH)?;
        let calculation_formula =
            text::required("calculation formula", calculation_formula, MAX_FORMULA_LENGTH)?;
        let annotations = Annotations::new(description, notes, AnnotationLimits::default())?;

        let mut method = Self {
            id: DepreciationMethodId::new(),
            method_code,
            name,
            calculation_formula,
            is_active: true,
            annotations,
            audit: AuditInfo::default(),
            events: EventQueue::new(),
        };
        method
            .events
            .record(DepreciationMethodEvent::Created(DepreciationMethodCreated {
                depreciation_method_id: method.id,
                method_code: method.method_code.clone(),
                name: method.name.clone(),
                calculation_formula: method.calculation_formula.clone(),
                occurred_at: Utc::now(),
            }));
        debug!(depreciation_method_id = %method.id, method_code = %method.method_code, "depreciation method created");
        Ok(method)
    }

    pub fn update(&mut self, changes: DepreciationMethodUpdate) -> DomainResult<&mut Self> {
        let method_code = changes
            .method_code
            .as_deref()
            .map(|v| text::required("method code", v, MAX_METHOD_CODE_LENGTH))
            .transpose()?;
        let name = changes
            .name
            .as_deref()
            .map(|v| text::required("name", v, MAX_NAME_LENGTH))
            .transpose()?;
        let calculation_formula = changes
            .calculation_formula
            .as_deref()
            .map(|v| text::required("calculation formula", v, MAX_FORMULA_LENGTH))
            .transpose()?;
        let annotations = self.annotations.revised(
            changes.description.as_deref(),
            changes.notes.as_deref(),
            AnnotationLimits::default(),
        )?;

        let mut changed = false;
        if let Some(v) = method_code.filter(|v| *v != self.method_code) {
            self.method_code = v;
            changed = true;
        }
        if let Some(v) = name.filter(|v| *v != self.name) {
            self.name = v;
            changed = true;
        }
        if let Some(v) = calculation_formula.filter(|v| *v != self.calculation_formula) {
            self.calculation_formula = v;
            changed = true;
        }
        if annotations != self.annotations {
            self.annotations = annotations;
            changed = true;
        }

        if changed {
            self.events
                .record(DepreciationMethodEvent::Updated(DepreciationMethodUpdated {
                    depreciation_method_id: self.id,
                    method_code: self.method_code.clone(),
                    name: self.name.clone(),
                    calculation_formula: self.calculation_formula.clone(),
                    occurred_at: Utc::now(),
                }));
            debug!(depreciation_method_id = %self.id, "depreciation method updated");
        }
        Ok(self)
    }

    pub fn activate(&mut self) -> DomainResult<&mut Self> {
        if self.is_active {
            return Err(DomainError::invalid_operation(
                "depreciation method is already active",
            ));
        }
        self.is_active = true;
        let toggled = self.toggled();
        self.events.record(DepreciationMethodEvent::Activated(toggled));
        info!(depreciation_method_id = %self.id, "depreciation method activated");
        Ok(self)
    }

    pub fn deactivate(&mut self) -> DomainResult<&mut Self> {
        if !self.is_active {
            return Err(DomainError::invalid_operation(
                "depreciation method is already inactive",
            ));
        }
        self.is_active = false;
        let toggled = self.toggled();
        self.events.record(DepreciationMethodEvent::Deactivated(toggled));
        info!(depreciation_method_id = %self.id, "depreciation method deactivated");
        Ok(self)
    }

    fn toggled(&self) -> DepreciationMethodToggled {
        DepreciationMethodToggled {
            depreciation_method_id: self.id,
            method_code: self.method_code.clone(),
            occurred_at: Utc::now(),
        }
    }

    pub fn id_typed(&self) -> DepreciationMethodId {
        self.id
    }

    pub fn method_code(&self) -> &str {
        &self.method_code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn calculation_formula(&self) -> &str {
        &self.calculation_formula
    }

    pub fn is_active(&self) -> bool {
        self.is_active
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
    ) -> Vec<EventEnvelope<DepreciationMethodEvent>> {
        self.events
            .drain_enveloped(self.id.into(), Self::AGGREGATE_TYPE, next_sequence)
    }

    pub fn to_record(&self) -> DepreciationMethodRecord {
        DepreciationMethodRecord {
            id: self.id,
            method_code: self.method_code.clone(),
            name: self.name.clone(),
            calculation_formula: self.calculation_formula.clone(),
            is_active: self.is_active,
            description: self.annotations.description().map(str::to_string),
            notes: self.annotations.notes().map(str::to_string),
            audit: self.audit.clone(),
        }
    }

    /// Rebuild from storage without validation or events. Persistence layer only.
    pub fn rehydrate(record: DepreciationMethodRecord) -> Self {
        Self {
            id: record.id,
            method_code: record.method_code,
            name: record.name,
            calculation_formula: record.calculation_formula,
            is_active: record.is_active,
            annotations: Annotations::from_parts(record.description, record.notes),
            audit: record.audit,
            events: EventQueue::new(),
        }
    }
}

impl Entity for DepreciationMethod {
    type Id = DepreciationMethodId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for DepreciationMethod {
    type Event = DepreciationMethodEvent;

    fn pending_events(&self) -> &[Self::Event] {
        self.events.pending()
    }

    fn take_events(&mut self) -> Vec<Self::Event> {
        self.events.drain()
    }
}
