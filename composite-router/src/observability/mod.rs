//! Shared observability vocabulary for structured `tracing` events.

pub mod events;
pub mod fields;
