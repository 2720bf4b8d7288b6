//! `coopledger-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod auditable;
pub mod entity;
pub mod error;
pub mod id;
pub mod text;
pub mod value_object;

pub use aggregate::AggregateRoot;
pub use auditable::{AnnotationLimits, Annotations, AuditInfo, MAX_ANNOTATION_LENGTH};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{AggregateId, UserId};
pub use value_object::ValueObject;
