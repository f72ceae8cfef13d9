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

//! Deterministic benchmark fixtures for the Criterion harness.

use std::sync::Arc;

use crate::binding::{QueueDeclaration, RoutingType};
use crate::broker::Broker;
use crate::control_plane::binding_registry::BindingRegistry;
use crate::error::RoutingError;
use crate::message::Message;
use crate::naming::CompositeName;
use crate::routing::resolver::{Intent, RoutingResolver};
use crate::settings::BrokerSettings;

fn address_name(index: usize) -> String {
    format!("bench.address.{index}")
}

fn queue_name(index: usize, slot: usize) -> String {
    format!("bench.queue.{index}.{slot}")
}

fn populated_registry(
    addresses: usize,
    queues_per_address: usize,
    routing_type: RoutingType,
) -> Result<Arc<BindingRegistry>, RoutingError> {
    let registry = Arc::new(BindingRegistry::new());
    for index in 0..addresses {
        for slot in 0..queues_per_address {
            registry.create_binding(
                &address_name(index),
                &queue_name(index, slot),
                routing_type,
                true,
            )?;
        }
    }
    Ok(registry)
}

/// Parses a fixed mix of qualified, queue-only and plain names.
pub struct NameParseFixture {
    names: Vec<String>,
}

impl NameParseFixture {
    pub fn new(rows: usize) -> Self {
        let names = (0..rows)
            .map(|index| match index % 3 {
                0 => CompositeName::format(&address_name(index), &queue_name(index, 0)),
                1 => format!("::{}", queue_name(index, 0)),
                _ => address_name(index),
            })
            .collect();
        Self { names }
    }

    pub fn qualified_count(&self) -> usize {
        self.names
            .iter()
            .filter(|name| CompositeName::parse(name).is_qualified())
            .count()
    }
}

/// Resolves names against a registry of `addresses * queues_per_address` bindings.
pub struct ResolutionFixture {
    resolver: RoutingResolver,
    fully_qualified: Vec<String>,
    addresses: Vec<String>,
}

impl ResolutionFixture {
    pub fn anycast(addresses: usize, queues_per_address: usize) -> Result<Self, RoutingError> {
        Self::new(addresses, queues_per_address, RoutingType::Anycast)
    }

    pub fn multicast(addresses: usize, queues_per_address: usize) -> Result<Self, RoutingError> {
        Self::new(addresses, queues_per_address, RoutingType::Multicast)
    }

    fn new(
        addresses: usize,
        queues_per_address: usize,
        routing_type: RoutingType,
    ) -> Result<Self, RoutingError> {
        let registry = populated_registry(addresses, queues_per_address, routing_type)?;
        let fully_qualified = (0..addresses)
            .map(|index| CompositeName::format(&address_name(index), &queue_name(index, 0)))
            .collect();
        let addresses = (0..addresses).map(address_name).collect();
        Ok(Self {
            resolver: RoutingResolver::new(registry),
            fully_qualified,
            addresses,
        })
    }

    /// Resolves every fully qualified name for a consumer; returns how many resolved.
    pub fn resolve_fully_qualified(&self) -> usize {
        self.fully_qualified
            .iter()
            .filter(|name| self.resolver.resolve(name, Intent::Consume).is_ok())
            .count()
    }

    /// Resolves every address for a send of `routing_type`; returns the bindings hit.
    pub fn resolve_addresses(&self, routing_type: RoutingType) -> usize {
        self.addresses
            .iter()
            .filter_map(|name| self.resolver.resolve(name, Intent::Send(routing_type)).ok())
            .map(|target| target.bindings().len())
            .sum()
    }
}

/// Declares and removes one binding against a populated registry.
pub struct BindingChurnFixture {
    registry: Arc<BindingRegistry>,
}

impl BindingChurnFixture {
    pub fn new(rows: usize) -> Result<Self, RoutingError> {
        Ok(Self {
            registry: populated_registry(rows, 1, RoutingType::Anycast)?,
        })
    }

    pub fn declare_and_remove(&self) -> bool {
        let declared = self
            .registry
            .declare_binding(QueueDeclaration::new(
                "bench.churn",
                "bench.churn.queue",
                RoutingType::Multicast,
            ))
            .is_ok();
        let removed = self.registry.remove_binding("bench.churn.queue").is_ok();
        declared && removed
    }
}

/// Sends one message through a broker to `subscribers` multicast subscribers and
/// drains them again. Returns the number of enqueued copies.
pub async fn run_multicast_send_once(subscribers: usize) -> usize {
    let broker = Broker::new("bench", BrokerSettings::default());
    let mut consumers = Vec::with_capacity(subscribers);
    for _ in 0..subscribers {
        match broker.subscribe("bench.topic") {
            Ok(consumer) => consumers.push(consumer),
            Err(_) => return 0,
        }
    }

    let enqueued = broker
        .send("bench.topic", RoutingType::Multicast, Message::new("payload"))
        .await
        .unwrap_or(0);
    for consumer in &consumers {
        let _ = consumer.receive_no_wait().await;
    }
    enqueued
}

#[cfg(test)]
mod tests {
    use super::{
        run_multicast_send_once, BindingChurnFixture, NameParseFixture, ResolutionFixture,
    };
    use crate::binding::RoutingType;

    #[test]
    fn fixtures_resolve_what_they_build() {
        let parse = NameParseFixture::new(9);
        assert_eq!(parse.qualified_count(), 6);

        let anycast = ResolutionFixture::anycast(4, 3).expect("fixture should build");
        assert_eq!(anycast.resolve_fully_qualified(), 4);
        assert_eq!(anycast.resolve_addresses(RoutingType::Anycast), 4);

        let multicast = ResolutionFixture::multicast(4, 3).expect("fixture should build");
        assert_eq!(multicast.resolve_addresses(RoutingType::Multicast), 12);

        let churn = BindingChurnFixture::new(8).expect("fixture should build");
        assert!(churn.declare_and_remove());
        assert!(churn.declare_and_remove());
    }

    #[tokio::test]
    async fn multicast_send_reaches_every_subscriber() {
        assert_eq!(run_multicast_send_once(5).await, 5);
    }
}
