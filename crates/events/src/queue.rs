//! Outbound event queue owned by an entity.
//!
//! The entity appends; the unit of work drains after a successful commit and
//! hands the events to the dispatcher. Nothing here publishes anything.

use serde::{Deserialize, Serialize};

use coopledger_core::AggregateId;

use crate::envelope::EventEnvelope;
use crate::event::Event;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventQueue<E> {
    events: Vec<E>,
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<E> EventQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: E) {
        self.events.push(event);
    }

    pub fn pending(&self) -> &[E] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove and return every queued event, oldest first.
    pub fn drain(&mut self) -> Vec<E> {
        std::mem::take(&mut self.events)
    }
}

impl<E: Event> EventQueue<E> {
    /// Drain the queue into envelopes numbered from `next_sequence`.
    pub fn drain_enveloped(
        &mut self,
        aggregate_id: AggregateId,
        aggregate_type: &str,
        next_sequence: u64,
    ) -> Vec<EventEnvelope<E>> {
        envelope_all(aggregate_id, aggregate_type, next_sequence, self.drain())
    }
}

/// Wrap already-drained events into envelopes numbered from `next_sequence`.
pub fn envelope_all<E: Event>(
    aggregate_id: AggregateId,
    aggregate_type: &str,
    next_sequence: u64,
    events: Vec<E>,
) -> Vec<EventEnvelope<E>> {
    events
        .into_iter()
        .zip(next_sequence..)
        .map(|(event, seq)| EventEnvelope::wrap(aggregate_id, aggregate_type, seq, event))
        .collect()
}
