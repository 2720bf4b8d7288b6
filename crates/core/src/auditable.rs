//! The auditable base every accounting entity carries.
//!
//! Audit metadata is stamped by the persistence layer (one unit of work per
//! request), never by entity business logic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainResult;
use crate::id::UserId;
use crate::text;
use crate::value_object::ValueObject;

/// Size of the shared `description`/`notes` columns. Entities may cap lower.
pub const MAX_ANNOTATION_LENGTH: usize = 2048;

/// Per-entity length caps for [`Annotations`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationLimits {
    pub description: usize,
    pub notes: usize,
}

impl AnnotationLimits {
    pub const fn new(description: usize, notes: usize) -> Self {
        Self { description, notes }
    }
}

impl Default for AnnotationLimits {
    fn default() -> Self {
        Self::new(MAX_ANNOTATION_LENGTH, MAX_ANNOTATION_LENGTH)
    }
}

/// Created/modified timestamps and actors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditInfo {
    pub created_on: Option<DateTime<Utc>>,
    pub created_by: Option<UserId>,
    pub last_modified_on: Option<DateTime<Utc>>,
    pub last_modified_by: Option<UserId>,
}

impl AuditInfo {
    /// Stamp creation. Also counts as the first modification.
    pub fn record_created(&mut self, by: Option<UserId>, at: DateTime<Utc>) {
        self.created_on = Some(at);
        self.created_by = by;
        self.record_modified(by, at);
    }

    pub fn record_modified(&mut self, by: Option<UserId>, at: DateTime<Utc>) {
        self.last_modified_on = Some(at);
        self.last_modified_by = by;
    }
}

/// Optional free-text annotations (`description`, `notes`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    description: Option<String>,
    notes: Option<String>,
}

impl ValueObject for Annotations {}

impl Annotations {
    pub fn new(
        description: Option<&str>,
        notes: Option<&str>,
        limits: AnnotationLimits,
    ) -> DomainResult<Self> {
        Ok(Self {
            description: text::optional("description", description, limits.description)?,
            notes: text::optional("notes", notes, limits.notes)?,
        })
    }

    /// Reassemble stored annotations without re-validating them.
    ///
    /// Only for rehydrating persisted entities.
    pub fn from_parts(description: Option<String>, notes: Option<String>) -> Self {
        Self { description, notes }
    }

    /// Build the annotations that result from an update.
    ///
    /// `None` keeps the current value; `Some` replaces it, and a blank
    /// replacement clears it.
    pub fn revised(
        &self,
        description: Option<&str>,
        notes: Option<&str>,
        limits: AnnotationLimits,
    ) -> DomainResult<Self> {
        let description = match description {
            Some(value) => text::optional("description", Some(value), limits.description)?,
            None => self.description.clone(),
        };
        let notes = match notes {
            Some(value) => text::optional("notes", Some(value), limits.notes)?,
            None => self.notes.clone(),
        };
        Ok(Self { description, notes })
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }
}
