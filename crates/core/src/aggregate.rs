//! Aggregate root trait for entities that queue domain events.

use crate::entity::Entity;

/// Aggregate root: an entity that is its own consistency boundary and
/// records what happened to it as domain events.
///
/// Events are only *queued* here. Dispatching them is left to whoever owns the
/// unit of work: after a successful commit it calls [`AggregateRoot::take_events`]
/// and hands the result to a publisher. Aggregates must not perform IO.
pub trait AggregateRoot: Entity {
    type Event: Clone + core::fmt::Debug;

    /// Events recorded since the last drain, oldest first.
    fn pending_events(&self) -> &[Self::Event];

    /// Drain the queued events, leaving the queue empty.
    fn take_events(&mut self) -> Vec<Self::Event>;

    fn has_pending_events(&self) -> bool {
        !self.pending_events().is_empty()
    }
}
