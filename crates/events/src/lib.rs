//! Domain events: the event contract, the entity-owned outbound queue and the
//! envelope handed to the external dispatcher.

pub mod envelope;
pub mod event;
pub mod queue;

pub use envelope::EventEnvelope;
pub use event::Event;
pub use queue::{EventQueue, envelope_all};
