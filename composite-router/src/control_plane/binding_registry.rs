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

//! Address → queue binding table with snapshot reads.

use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::binding::{AddressInfo, QueueBinding, QueueDeclaration, RoutingType};
use crate::control_plane::binding_lifecycle::{
    AddressTransition, BindingLifecycleGuard, DetachOutcome,
};
use crate::error::RoutingError;
use crate::observability::{events, fields};

const COMPONENT: &str = "binding_registry";

#[derive(Clone)]
pub(crate) struct AddressEntry {
    pub(crate) name: String,
    pub(crate) routing_types: Vec<RoutingType>,
    pub(crate) bindings: Vec<QueueBinding>,
    pub(crate) auto_created: bool,
    anycast_cursor: Arc<AtomicUsize>,
}

impl AddressEntry {
    fn new(name: &str, routing_type: RoutingType, auto_created: bool) -> Self {
        Self {
            name: name.to_string(),
            routing_types: vec![routing_type],
            bindings: Vec::new(),
            auto_created,
            anycast_cursor: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn info(&self) -> AddressInfo {
        AddressInfo {
            name: self.name.clone(),
            routing_types: self.routing_types.clone(),
            queue_names: self
                .bindings
                .iter()
                .map(|binding| binding.queue_name().to_string())
                .collect(),
            auto_created: self.auto_created,
        }
    }

    pub(crate) fn find_queue(&self, queue_name: &str) -> Option<&QueueBinding> {
        self.bindings
            .iter()
            .find(|binding| binding.queue_name() == queue_name)
    }

    /// Bindings of one routing type, in binding order.
    pub(crate) fn bindings_of(&self, routing_type: RoutingType) -> Vec<QueueBinding> {
        self.bindings
            .iter()
            .filter(|binding| binding.routing_type() == routing_type)
            .cloned()
            .collect()
    }

    /// Picks the next anycast binding in round-robin order.
    ///
    /// The cursor is shared by every snapshot of this address, so rotation continues
    /// across registry updates.
    pub(crate) fn next_anycast(&self) -> Option<QueueBinding> {
        let candidates = self.bindings_of(RoutingType::Anycast);
        if candidates.is_empty() {
            return None;
        }

        let position = self.anycast_cursor.fetch_add(1, Ordering::Relaxed) % candidates.len();
        candidates.into_iter().nth(position)
    }
}

/// Immutable view of the whole binding table at one version.
#[derive(Clone, Default)]
pub(crate) struct RegistrySnapshot {
    pub(crate) version: u64,
    pub(crate) addresses: HashMap<String, AddressEntry>,
    pub(crate) queues: HashMap<String, QueueBinding>,
}

impl RegistrySnapshot {
    pub(crate) fn address(&self, address: &str) -> Option<&AddressEntry> {
        self.addresses.get(address)
    }

    pub(crate) fn queue(&self, queue_name: &str) -> Option<&QueueBinding> {
        self.queues.get(queue_name)
    }

    pub(crate) fn ensure_address(
        &mut self,
        address: &str,
        routing_type: RoutingType,
        auto_created: bool,
    ) -> AddressTransition {
        match self.addresses.get_mut(address) {
            Some(entry) if entry.routing_types.contains(&routing_type) => {
                AddressTransition::Unchanged
            }
            Some(entry) => {
                entry.routing_types.push(routing_type);
                entry.routing_types.sort();
                AddressTransition::Merged
            }
            None => {
                self.addresses.insert(
                    address.to_string(),
                    AddressEntry::new(address, routing_type, auto_created),
                );
                AddressTransition::Created
            }
        }
    }

    pub(crate) fn insert_binding(&mut self, binding: QueueBinding) {
        if let Some(entry) = self.addresses.get_mut(binding.address()) {
            entry.bindings.push(binding.clone());
        }
        self.queues.insert(binding.queue_name().to_string(), binding);
    }

    pub(crate) fn remove_binding(&mut self, queue_name: &str) -> Option<QueueBinding> {
        let binding = self.queues.remove(queue_name)?;
        if let Some(entry) = self.addresses.get_mut(binding.address()) {
            entry
                .bindings
                .retain(|candidate| !candidate.same_binding(&binding));
        }
        Some(binding)
    }
}

/// Live mapping of addresses to their bound queues.
///
/// Owns every [`QueueBinding`]. Readers never block: each read loads the current
/// snapshot and works on it, so a binding is either fully visible or not visible at
/// all. Writers are serialized by the lifecycle guard.
pub struct BindingRegistry {
    table: ArcSwap<RegistrySnapshot>,
    lifecycle: BindingLifecycleGuard,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::with_auto_delete(true)
    }

    /// `auto_delete_created` controls whether broker-auto-created queues are removed
    /// with their last consumer. Temporary queues are always removed.
    pub fn with_auto_delete(auto_delete_created: bool) -> Self {
        Self {
            table: ArcSwap::from_pointee(RegistrySnapshot::default()),
            lifecycle: BindingLifecycleGuard::new(auto_delete_created),
        }
    }

    pub(crate) fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.table.load_full()
    }

    /// Registers `address`, merging `routing_type` into an existing entry.
    pub fn create_address(
        &self,
        address: &str,
        routing_type: RoutingType,
    ) -> Result<AddressInfo, RoutingError> {
        self.declare_address(address, routing_type, false)
    }

    pub(crate) fn declare_address(
        &self,
        address: &str,
        routing_type: RoutingType,
        auto_created: bool,
    ) -> Result<AddressInfo, RoutingError> {
        let (transition, info) =
            self.lifecycle
                .ensure_address(&self.table, address, routing_type, auto_created)?;

        match transition {
            AddressTransition::Created => info!(
                event = events::ADDRESS_CREATE_OK,
                component = COMPONENT,
                address,
                routing_type = %routing_type,
                auto_created,
                "address created"
            ),
            AddressTransition::Merged => debug!(
                event = events::ADDRESS_ROUTING_TYPE_MERGED,
                component = COMPONENT,
                address,
                routing_type = %routing_type,
                routing_types = fields::format_routing_types(&info.routing_types).as_str(),
                "routing type added to existing address"
            ),
            AddressTransition::Unchanged => {}
        }

        Ok(info)
    }

    /// Binds a new non-temporary queue to `address`.
    pub fn create_binding(
        &self,
        address: &str,
        queue_name: &str,
        routing_type: RoutingType,
        durable: bool,
    ) -> Result<QueueBinding, RoutingError> {
        self.declare_binding(
            QueueDeclaration::new(address, queue_name, routing_type).durable(durable),
        )
    }

    /// Binds a queue described by `declaration`, registering its address if needed.
    ///
    /// Fails with [`RoutingError::DuplicateQueue`] when the queue name is taken under
    /// any address; of two racing declarations for one name exactly one succeeds.
    pub fn declare_binding(
        &self,
        declaration: QueueDeclaration,
    ) -> Result<QueueBinding, RoutingError> {
        let address = declaration.address.clone();
        let queue_name = declaration.queue_name.clone();

        match self.lifecycle.declare(&self.table, declaration) {
            Ok(binding) => {
                info!(
                    event = events::BINDING_CREATE_OK,
                    component = COMPONENT,
                    address = address.as_str(),
                    queue = queue_name.as_str(),
                    routing_type = %binding.routing_type(),
                    durable = binding.is_durable(),
                    auto_delete = binding.is_auto_delete(),
                    "queue binding created"
                );
                Ok(binding)
            }
            Err(err) => {
                warn!(
                    event = events::BINDING_CREATE_REJECTED,
                    component = COMPONENT,
                    address = address.as_str(),
                    queue = queue_name.as_str(),
                    err = %err,
                    "queue binding rejected"
                );
                Err(err)
            }
        }
    }

    /// Removes the binding named `queue_name`. Absent names are reported as not found.
    pub fn remove_binding(&self, queue_name: &str) -> Result<QueueBinding, RoutingError> {
        match self.remove_binding_if_present(queue_name) {
            Some(binding) => Ok(binding),
            None => {
                debug!(
                    event = events::BINDING_REMOVE_MISSING,
                    component = COMPONENT,
                    queue = queue_name,
                    "no binding to remove"
                );
                Err(RoutingError::not_found(queue_name))
            }
        }
    }

    /// Idempotent removal for internal cleanup paths.
    pub(crate) fn remove_binding_if_present(&self, queue_name: &str) -> Option<QueueBinding> {
        let removed = self.lifecycle.remove(&self.table, queue_name)?;
        info!(
            event = events::BINDING_REMOVE_OK,
            component = COMPONENT,
            address = removed.address(),
            queue = queue_name,
            "queue binding removed"
        );
        Some(removed)
    }

    /// Current bindings of `address` in binding order. Unknown addresses yield nothing.
    pub fn bindings_for_address(&self, address: &str) -> Vec<QueueBinding> {
        self.table
            .load()
            .address(address)
            .map(|entry| entry.bindings.clone())
            .unwrap_or_default()
    }

    pub fn binding_by_queue_name(&self, queue_name: &str) -> Option<QueueBinding> {
        self.table.load().queue(queue_name).cloned()
    }

    pub fn address_info(&self, address: &str) -> Option<AddressInfo> {
        self.table.load().address(address).map(AddressEntry::info)
    }

    /// All addresses, sorted by name.
    pub fn addresses(&self) -> Vec<AddressInfo> {
        let snapshot = self.table.load();
        let mut addresses: Vec<AddressInfo> =
            snapshot.addresses.values().map(AddressEntry::info).collect();
        addresses.sort_by(|left, right| left.name.cmp(&right.name));
        addresses
    }

    pub fn queue_count(&self) -> usize {
        self.table.load().queues.len()
    }

    /// Monotonic version of the published snapshot; bumps on every mutation.
    pub fn version(&self) -> u64 {
        self.table.load().version
    }

    /// Counts a consumer on `binding`. Fails if the binding was removed meanwhile.
    pub fn attach_consumer(&self, binding: &QueueBinding) -> Result<usize, RoutingError> {
        match self.lifecycle.attach_consumer(&self.table, binding) {
            Ok(consumers) => {
                debug!(
                    event = events::CONSUMER_ATTACH_OK,
                    component = COMPONENT,
                    queue = binding.queue_name(),
                    consumers,
                    "consumer attached"
                );
                Ok(consumers)
            }
            Err(err) => {
                debug!(
                    event = events::CONSUMER_ATTACH_REJECTED,
                    component = COMPONENT,
                    queue = binding.queue_name(),
                    err = %err,
                    "consumer attach rejected"
                );
                Err(err)
            }
        }
    }

    /// Releases one consumer of `binding`, deleting auto-delete queues left without any.
    pub fn detach_consumer(&self, binding: &QueueBinding) -> DetachOutcome {
        let outcome = self.lifecycle.detach_consumer(&self.table, binding);
        match &outcome {
            DetachOutcome::Detached { remaining } => debug!(
                event = events::CONSUMER_DETACH,
                component = COMPONENT,
                queue = binding.queue_name(),
                consumers = *remaining,
                "consumer detached"
            ),
            DetachOutcome::Deleted => info!(
                event = events::BINDING_AUTO_DELETE,
                component = COMPONENT,
                address = binding.address(),
                queue = binding.queue_name(),
                "auto-delete queue removed after last consumer detached"
            ),
        }
        outcome
    }

    /// Drops every address and binding. Used at broker teardown.
    pub fn clear(&self) -> Vec<QueueBinding> {
        let removed = self.lifecycle.clear(&self.table);
        info!(
            event = events::REGISTRY_CLEARED,
            component = COMPONENT,
            removed = removed.len(),
            "binding registry cleared"
        );
        removed
    }
}

impl Default for BindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
