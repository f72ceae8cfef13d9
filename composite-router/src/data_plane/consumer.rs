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

use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;

use crate::binding::QueueBinding;
use crate::control_plane::binding_lifecycle::DetachOutcome;
use crate::control_plane::binding_registry::BindingRegistry;
use crate::data_plane::queue_store::QueueStore;
use crate::error::RoutingError;
use crate::message::Message;

/// A consumer attached to exactly one queue binding.
///
/// Dropping the consumer detaches it. When it was the last consumer of a temporary
/// or auto-created queue, the queue is removed and its pending messages discarded.
pub struct Consumer {
    binding: QueueBinding,
    registry: Arc<BindingRegistry>,
    store: Arc<dyn QueueStore>,
}

impl Consumer {
    pub(crate) fn attach(
        binding: QueueBinding,
        registry: Arc<BindingRegistry>,
        store: Arc<dyn QueueStore>,
    ) -> Result<Self, RoutingError> {
        registry.attach_consumer(&binding)?;
        Ok(Self {
            binding,
            registry,
            store,
        })
    }

    pub fn binding(&self) -> &QueueBinding {
        &self.binding
    }

    pub fn queue_name(&self) -> &str {
        self.binding.queue_name()
    }

    pub fn address(&self) -> &str {
        self.binding.address()
    }

    /// Waits up to `wait` for the next message. `None` on timeout or once the queue
    /// has been removed.
    pub async fn receive(&self, wait: Duration) -> Option<Arc<Message>> {
        self.store.receive(&self.binding, wait).await
    }

    pub async fn receive_no_wait(&self) -> Option<Arc<Message>> {
        self.store.receive(&self.binding, Duration::ZERO).await
    }

    /// Detaches now instead of at end of scope.
    pub fn close(self) {}
}

impl Drop for Consumer {
    fn drop(&mut self) {
        if self.registry.detach_consumer(&self.binding) == DetachOutcome::Deleted {
            self.store.discard(&self.binding);
        }
    }
}

impl Debug for Consumer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Consumer")
            .field("queue_name", &self.queue_name())
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
