//! Data-plane layer.
//!
//! The delivery path behind resolved bindings: a [`QueueStore`] that holds pending
//! messages per queue, and [`Consumer`] handles that receive from one binding and
//! release it on drop.

pub(crate) mod consumer;
pub(crate) mod queue_store;
