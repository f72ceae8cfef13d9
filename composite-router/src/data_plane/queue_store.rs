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

//! Queue storage seam and the in-memory default.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::pin::pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::binding::QueueBinding;
use crate::message::Message;
use crate::observability::events;

const COMPONENT: &str = "queue_store";

/// Storage for messages that were routed to a queue binding.
///
/// Implementations keep [`QueueBinding::message_count`] current through
/// [`QueueBinding::record_enqueued`] and [`QueueBinding::record_delivered`].
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Appends `message` to the queue behind `binding`.
    async fn enqueue(&self, binding: &QueueBinding, message: Arc<Message>);

    /// Takes the oldest message, waiting up to `wait` for one to arrive.
    async fn receive(&self, binding: &QueueBinding, wait: Duration) -> Option<Arc<Message>>;

    /// Drops everything pending for `binding`. Called when the binding is removed.
    fn discard(&self, binding: &QueueBinding);
}

#[derive(Default)]
struct SlotState {
    messages: VecDeque<Arc<Message>>,
    closed: bool,
}

#[derive(Default)]
struct QueueSlot {
    state: Mutex<SlotState>,
    available: Notify,
}

impl QueueSlot {
    fn state(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// The binding clone pins the identity key for as long as the entry exists.
type SlotEntry = (QueueBinding, Arc<QueueSlot>);

/// FIFO per queue binding, kept in memory. Competing consumers on one queue each
/// get distinct messages.
///
/// Slots belong to one binding, not to a queue name: a queue deleted and declared
/// again under the same name starts empty, and handles to the old binding never
/// see its messages.
#[derive(Default)]
pub struct InMemoryQueueStore {
    slots: Mutex<HashMap<usize, SlotEntry>>,
}

impl InMemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<usize, SlotEntry>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Slot of a live binding. `None` once the binding has been removed.
    fn slot(&self, binding: &QueueBinding) -> Option<Arc<QueueSlot>> {
        let mut slots = self.slots();
        if binding.is_removed() {
            return None;
        }
        let (_, slot) = slots
            .entry(binding.identity())
            .or_insert_with(|| (binding.clone(), Arc::default()));
        Some(slot.clone())
    }

    /// Messages currently held for the live queue named `queue_name`.
    pub fn depth(&self, queue_name: &str) -> usize {
        self.slots()
            .values()
            .filter(|(binding, _)| binding.queue_name() == queue_name && !binding.is_removed())
            .map(|(_, slot)| slot.state().messages.len())
            .sum()
    }

    fn take(slot: &QueueSlot, binding: &QueueBinding) -> Option<Arc<Message>> {
        let mut state = slot.state();
        if state.closed {
            return None;
        }
        let message = state.messages.pop_front()?;
        binding.record_delivered();
        Some(message)
    }
}

#[async_trait]
impl QueueStore for InMemoryQueueStore {
    async fn enqueue(&self, binding: &QueueBinding, message: Arc<Message>) {
        let accepted = match self.slot(binding) {
            Some(slot) => {
                let mut state = slot.state();
                // Checked under the slot lock: discard closes the slot under it too.
                if state.closed || binding.is_removed() {
                    false
                } else {
                    state.messages.push_back(message.clone());
                    binding.record_enqueued();
                    drop(state);
                    slot.available.notify_one();
                    true
                }
            }
            None => false,
        };

        if accepted {
            trace!(
                event = events::QUEUE_ENQUEUE,
                component = COMPONENT,
                queue = binding.queue_name(),
                msg_id = %message.id(),
                "message enqueued"
            );
        } else {
            debug!(
                event = events::QUEUE_DISCARD,
                component = COMPONENT,
                queue = binding.queue_name(),
                msg_id = %message.id(),
                "dropping message for removed queue"
            );
        }
    }

    async fn receive(&self, binding: &QueueBinding, wait: Duration) -> Option<Arc<Message>> {
        let slot = self.slot(binding)?;
        let deadline = Instant::now() + wait;

        loop {
            let mut notified = pin!(slot.available.notified());
            // Registered before the checks below so a discard in between still wakes us.
            notified.as_mut().enable();

            if let Some(message) = Self::take(&slot, binding) {
                return Some(message);
            }
            if binding.is_removed() || slot.state().closed {
                return None;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Self::take(&slot, binding);
            }
        }
    }

    fn discard(&self, binding: &QueueBinding) {
        let removed = self.slots().remove(&binding.identity());
        let Some((_, slot)) = removed else {
            binding.reset_message_count();
            return;
        };

        let dropped = {
            let mut state = slot.state();
            state.closed = true;
            let dropped = state.messages.len();
            state.messages.clear();
            binding.reset_message_count();
            dropped
        };
        slot.available.notify_waiters();
        debug!(
            event = events::QUEUE_DISCARD,
            component = COMPONENT,
            queue = binding.queue_name(),
            dropped,
            "queue discarded"
        );
    }
}
