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

use async_trait::async_trait;
use composite_router::{InMemoryQueueStore, Message, QueueBinding, QueueStore};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory store that also records every enqueue per queue name.
#[derive(Default)]
pub struct CountingQueueStore {
    inner: InMemoryQueueStore,
    enqueued: Mutex<HashMap<String, usize>>,
    discarded: Mutex<Vec<String>>,
}

impl CountingQueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueued_for(&self, queue_name: &str) -> usize {
        self.enqueued
            .lock()
            .unwrap()
            .get(queue_name)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_enqueued(&self) -> usize {
        self.enqueued.lock().unwrap().values().sum()
    }

    pub fn discarded(&self) -> Vec<String> {
        self.discarded.lock().unwrap().clone()
    }

    pub fn depth(&self, queue_name: &str) -> usize {
        self.inner.depth(queue_name)
    }
}

#[async_trait]
impl QueueStore for CountingQueueStore {
    async fn enqueue(&self, binding: &QueueBinding, message: Arc<Message>) {
        if !binding.is_removed() {
            *self
                .enqueued
                .lock()
                .unwrap()
                .entry(binding.queue_name().to_string())
                .or_default() += 1;
        }
        self.inner.enqueue(binding, message).await;
    }

    async fn receive(&self, binding: &QueueBinding, wait: Duration) -> Option<Arc<Message>> {
        self.inner.receive(binding, wait).await
    }

    fn discard(&self, binding: &QueueBinding) {
        self.discarded
            .lock()
            .unwrap()
            .push(binding.queue_name().to_string());
        self.inner.discard(binding);
    }
}
