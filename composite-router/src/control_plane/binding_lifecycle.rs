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

//! Write side of the binding table.
//!
//! All transitions run under one writer lock and end with a single snapshot swap,
//! so readers observe either the state before a transition or the state after it.
//! Consumer attach/detach share the same lock: an auto-delete queue cannot gain a
//! consumer while its last consumer is tearing it down.

use arc_swap::ArcSwap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::binding::{AddressInfo, QueueBinding, QueueDeclaration, RoutingType};
use crate::control_plane::binding_registry::RegistrySnapshot;
use crate::error::RoutingError;
use crate::naming::DELIMITER;

/// Effect of registering an address.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum AddressTransition {
    Created,
    Merged,
    Unchanged,
}

/// Effect of releasing one consumer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DetachOutcome {
    /// The binding stays; `remaining` consumers are still attached.
    Detached { remaining: usize },
    /// The binding was auto-delete and has been removed.
    Deleted,
}

struct WriterState {
    version: u64,
}

pub(crate) struct BindingLifecycleGuard {
    writer: Mutex<WriterState>,
    auto_delete_created: bool,
}

impl BindingLifecycleGuard {
    pub(crate) fn new(auto_delete_created: bool) -> Self {
        Self {
            writer: Mutex::new(WriterState { version: 0 }),
            auto_delete_created,
        }
    }

    // Snapshots are swapped whole, so a panic mid-transition leaves nothing half-written.
    fn lock(&self) -> MutexGuard<'_, WriterState> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn commit(
        writer: &mut WriterState,
        table: &ArcSwap<RegistrySnapshot>,
        mut next: RegistrySnapshot,
    ) {
        writer.version += 1;
        next.version = writer.version;
        table.store(Arc::new(next));
    }

    pub(crate) fn ensure_address(
        &self,
        table: &ArcSwap<RegistrySnapshot>,
        address: &str,
        routing_type: RoutingType,
        auto_created: bool,
    ) -> Result<(AddressTransition, AddressInfo), RoutingError> {
        validate_address_name(address)?;

        let mut writer = self.lock();
        let mut next = RegistrySnapshot::clone(&table.load());
        let transition = next.ensure_address(address, routing_type, auto_created);
        let info = next
            .address(address)
            .map(|entry| entry.info())
            .ok_or_else(|| RoutingError::not_found(address))?;

        if transition != AddressTransition::Unchanged {
            Self::commit(&mut writer, table, next);
        }
        Ok((transition, info))
    }

    pub(crate) fn declare(
        &self,
        table: &ArcSwap<RegistrySnapshot>,
        declaration: QueueDeclaration,
    ) -> Result<QueueBinding, RoutingError> {
        validate_address_name(&declaration.address)?;
        validate_queue_name(&declaration.queue_name)?;

        let mut writer = self.lock();
        let current = table.load_full();
        if current.queue(&declaration.queue_name).is_some() {
            return Err(RoutingError::duplicate_queue(&declaration.queue_name));
        }

        let mut next = RegistrySnapshot::clone(&current);
        let auto_created = declaration.auto_created;
        let binding = QueueBinding::from_declaration(declaration);
        next.ensure_address(binding.address(), binding.routing_type(), auto_created);
        next.insert_binding(binding.clone());
        Self::commit(&mut writer, table, next);

        Ok(binding)
    }

    pub(crate) fn remove(
        &self,
        table: &ArcSwap<RegistrySnapshot>,
        queue_name: &str,
    ) -> Option<QueueBinding> {
        let mut writer = self.lock();
        Self::remove_locked(&mut writer, table, queue_name)
    }

    fn remove_locked(
        writer: &mut WriterState,
        table: &ArcSwap<RegistrySnapshot>,
        queue_name: &str,
    ) -> Option<QueueBinding> {
        let current = table.load_full();
        current.queue(queue_name)?;

        let mut next = RegistrySnapshot::clone(&current);
        let removed = next.remove_binding(queue_name)?;
        removed.mark_removed();
        Self::commit(writer, table, next);
        Some(removed)
    }

    pub(crate) fn attach_consumer(
        &self,
        table: &ArcSwap<RegistrySnapshot>,
        binding: &QueueBinding,
    ) -> Result<usize, RoutingError> {
        let _writer = self.lock();
        let current = table.load();
        match current.queue(binding.queue_name()) {
            Some(live) if live.same_binding(binding) => Ok(binding.increment_consumers()),
            _ => Err(RoutingError::not_found(binding.queue_name())),
        }
    }

    pub(crate) fn detach_consumer(
        &self,
        table: &ArcSwap<RegistrySnapshot>,
        binding: &QueueBinding,
    ) -> DetachOutcome {
        let mut writer = self.lock();
        let remaining = binding.decrement_consumers();
        let auto_delete =
            binding.is_temporary() || (binding.is_auto_created() && self.auto_delete_created);

        if remaining > 0 || !auto_delete || binding.is_removed() {
            return DetachOutcome::Detached { remaining };
        }

        let is_live = table
            .load()
            .queue(binding.queue_name())
            .is_some_and(|live| live.same_binding(binding));
        if is_live && Self::remove_locked(&mut writer, table, binding.queue_name()).is_some() {
            DetachOutcome::Deleted
        } else {
            DetachOutcome::Detached { remaining }
        }
    }

    pub(crate) fn clear(&self, table: &ArcSwap<RegistrySnapshot>) -> Vec<QueueBinding> {
        let mut writer = self.lock();
        let current = table.load_full();
        let removed: Vec<QueueBinding> = current.queues.values().cloned().collect();
        for binding in &removed {
            binding.mark_removed();
        }
        Self::commit(&mut writer, table, RegistrySnapshot::default());
        removed
    }
}

fn validate_address_name(address: &str) -> Result<(), RoutingError> {
    if address.is_empty() {
        return Err(RoutingError::invalid_destination(
            address,
            "address name is empty",
        ));
    }
    if address.contains(DELIMITER) {
        return Err(RoutingError::invalid_destination(
            address,
            "address name contains the '::' delimiter",
        ));
    }
    Ok(())
}

fn validate_queue_name(queue_name: &str) -> Result<(), RoutingError> {
    if queue_name.is_empty() {
        return Err(RoutingError::invalid_destination(
            queue_name,
            "queue name is empty",
        ));
    }
    if queue_name.contains(DELIMITER) {
        return Err(RoutingError::invalid_destination(
            queue_name,
            "queue name contains the '::' delimiter",
        ));
    }
    Ok(())
}
