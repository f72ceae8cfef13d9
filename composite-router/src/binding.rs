/********************************************************************************
 * Copyright (c) 2024 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Binding data model: routing types, queue declarations and live queue bindings.

use std::fmt::{Debug, Display, Formatter};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::naming::CompositeName;

/// How a message sent to an address reaches the queues bound to it.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum RoutingType {
    /// Each message goes to exactly one bound queue (load shared).
    Anycast,
    /// Each message goes to every bound queue (fan-out).
    Multicast,
}

impl Display for RoutingType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutingType::Anycast => f.write_str("ANYCAST"),
            RoutingType::Multicast => f.write_str("MULTICAST"),
        }
    }
}

/// Creation command for one queue binding.
///
/// ```
/// use composite_router::{QueueDeclaration, RoutingType};
///
/// let declaration = QueueDeclaration::new("address.anycast", "q1", RoutingType::Anycast)
///     .durable(true);
/// assert!(!declaration.is_auto_delete());
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueueDeclaration {
    pub(crate) address: String,
    pub(crate) queue_name: String,
    pub(crate) routing_type: RoutingType,
    pub(crate) durable: bool,
    pub(crate) temporary: bool,
    pub(crate) auto_created: bool,
}

impl QueueDeclaration {
    pub fn new(address: &str, queue_name: &str, routing_type: RoutingType) -> Self {
        Self {
            address: address.to_string(),
            queue_name: queue_name.to_string(),
            routing_type,
            durable: false,
            temporary: false,
            auto_created: false,
        }
    }

    pub fn durable(mut self, durable: bool) -> Self {
        self.durable = durable;
        self
    }

    /// Temporary queues are deleted when their last consumer detaches.
    pub fn temporary(mut self, temporary: bool) -> Self {
        self.temporary = temporary;
        self
    }

    /// Marks a queue the broker created on a client's behalf; deleted like a temporary one.
    pub fn auto_created(mut self, auto_created: bool) -> Self {
        self.auto_created = auto_created;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    pub fn is_auto_delete(&self) -> bool {
        self.temporary || self.auto_created
    }
}

struct BindingState {
    queue_name: String,
    address: String,
    routing_type: RoutingType,
    durable: bool,
    temporary: bool,
    auto_created: bool,
    message_count: AtomicU64,
    consumer_count: AtomicUsize,
    removed: AtomicBool,
}

/// One queue bound to one address.
///
/// Cloning is cheap and every clone observes the same counters. Only the registry
/// creates bindings; other components hold clones for the length of one call.
/// Equality is identity: a queue deleted and re-declared under the same name is a
/// different binding.
#[derive(Clone)]
pub struct QueueBinding {
    state: Arc<BindingState>,
}

impl QueueBinding {
    pub(crate) fn from_declaration(declaration: QueueDeclaration) -> Self {
        Self {
            state: Arc::new(BindingState {
                queue_name: declaration.queue_name,
                address: declaration.address,
                routing_type: declaration.routing_type,
                durable: declaration.durable,
                temporary: declaration.temporary,
                auto_created: declaration.auto_created,
                message_count: AtomicU64::new(0),
                consumer_count: AtomicUsize::new(0),
                removed: AtomicBool::new(false),
            }),
        }
    }

    pub fn queue_name(&self) -> &str {
        &self.state.queue_name
    }

    pub fn address(&self) -> &str {
        &self.state.address
    }

    pub fn routing_type(&self) -> RoutingType {
        self.state.routing_type
    }

    pub fn is_durable(&self) -> bool {
        self.state.durable
    }

    pub fn is_temporary(&self) -> bool {
        self.state.temporary
    }

    pub fn is_auto_created(&self) -> bool {
        self.state.auto_created
    }

    pub fn is_auto_delete(&self) -> bool {
        self.state.temporary || self.state.auto_created
    }

    /// `address::queue` for this binding.
    pub fn fully_qualified_name(&self) -> CompositeName {
        CompositeName::qualified(self.address(), self.queue_name())
    }

    pub fn message_count(&self) -> u64 {
        self.state.message_count.load(Ordering::Acquire)
    }

    pub fn consumer_count(&self) -> usize {
        self.state.consumer_count.load(Ordering::Acquire)
    }

    /// `true` once the registry has dropped this binding.
    pub fn is_removed(&self) -> bool {
        self.state.removed.load(Ordering::Acquire)
    }

    /// Called by queue stores after a message was enqueued on this binding.
    pub fn record_enqueued(&self) {
        self.state.message_count.fetch_add(1, Ordering::AcqRel);
    }

    /// Called by queue stores after a message left this binding.
    pub fn record_delivered(&self) {
        let _ = self.state.message_count.fetch_update(
            Ordering::AcqRel,
            Ordering::Acquire,
            |count| count.checked_sub(1),
        );
    }

    /// Called by queue stores when a binding's pending messages are discarded.
    pub fn reset_message_count(&self) {
        self.state.message_count.store(0, Ordering::Release);
    }

    pub(crate) fn increment_consumers(&self) -> usize {
        self.state.consumer_count.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub(crate) fn decrement_consumers(&self) -> usize {
        match self.state.consumer_count.fetch_update(
            Ordering::AcqRel,
            Ordering::Acquire,
            |count| count.checked_sub(1),
        ) {
            Ok(previous) => previous - 1,
            Err(_) => 0,
        }
    }

    pub(crate) fn mark_removed(&self) {
        self.state.removed.store(true, Ordering::Release);
    }

    pub(crate) fn same_binding(&self, other: &QueueBinding) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// Stable while any clone of this binding is alive.
    pub(crate) fn identity(&self) -> usize {
        Arc::as_ptr(&self.state) as usize
    }
}

impl PartialEq for QueueBinding {
    fn eq(&self, other: &Self) -> bool {
        self.same_binding(other)
    }
}

impl Eq for QueueBinding {}

impl Debug for QueueBinding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueBinding")
            .field("queue_name", &self.queue_name())
            .field("address", &self.address())
            .field("routing_type", &self.routing_type())
            .field("durable", &self.is_durable())
            .field("auto_delete", &self.is_auto_delete())
            .field("message_count", &self.message_count())
            .field("consumer_count", &self.consumer_count())
            .finish()
    }
}

/// Point-in-time view of one address and the queues bound to it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddressInfo {
    pub name: String,
    pub routing_types: Vec<RoutingType>,
    /// Bound queue names in binding order.
    pub queue_names: Vec<String>,
    pub auto_created: bool,
}

#[cfg(test)]
mod tests {
    use super::{QueueBinding, QueueDeclaration, RoutingType};

    fn binding() -> QueueBinding {
        QueueBinding::from_declaration(QueueDeclaration::new(
            "address.anycast",
            "q1",
            RoutingType::Anycast,
        ))
    }

    #[test]
    fn clones_share_counters_and_identity() {
        let original = binding();
        let clone = original.clone();

        clone.record_enqueued();
        clone.record_enqueued();
        original.record_delivered();

        assert_eq!(original.message_count(), 1);
        assert_eq!(original, clone);
        assert_ne!(original, binding());
    }

    #[test]
    fn counters_never_go_below_zero() {
        let binding = binding();

        binding.record_delivered();
        assert_eq!(binding.message_count(), 0);
        assert_eq!(binding.decrement_consumers(), 0);
        assert_eq!(binding.increment_consumers(), 1);
        assert_eq!(binding.decrement_consumers(), 0);
    }

    #[test]
    fn fully_qualified_name_joins_address_and_queue() {
        assert_eq!(
            binding().fully_qualified_name().to_string(),
            "address.anycast::q1"
        );
    }

    #[test]
    fn temporary_and_auto_created_queues_auto_delete() {
        let declaration = QueueDeclaration::new("a", "q", RoutingType::Multicast);
        assert!(!declaration.is_auto_delete());
        assert!(declaration.clone().temporary(true).is_auto_delete());
        assert!(declaration.auto_created(true).is_auto_delete());
    }
}
