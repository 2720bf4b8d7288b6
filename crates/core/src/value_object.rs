//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity** and are **immutable**: to "modify" one,
/// build a new value. Two value objects with the same attributes are equal.
///
/// - `Annotations { description: Some("Q1"), notes: None }` is a value object
/// - `BudgetDetail { id: BudgetDetailId(..), .. }` is an entity
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
