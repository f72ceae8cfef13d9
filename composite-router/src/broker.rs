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

use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::binding::{AddressInfo, QueueBinding, QueueDeclaration, RoutingType};
use crate::control_plane::binding_registry::BindingRegistry;
use crate::data_plane::consumer::Consumer;
use crate::data_plane::queue_store::{InMemoryQueueStore, QueueStore};
use crate::error::RoutingError;
use crate::message::Message;
use crate::naming::CompositeName;
use crate::observability::{events, fields};
use crate::query::{AddressQueryResult, QueryService, QueueQueryResult};
use crate::routing::resolver::{Intent, ResolvedTarget, RoutingResolver};
use crate::settings::BrokerSettings;

const COMPONENT: &str = "broker";

/// Owner of one binding registry and the components resolving against it.
///
/// Created at broker startup and torn down with [`Broker::shutdown`]. Everything
/// resolving names gets the registry injected from here.
///
/// ```
/// use std::time::Duration;
/// use composite_router::{Broker, BrokerSettings, Message, QueueDeclaration, RoutingType};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let broker = Broker::new("doc-broker", BrokerSettings::default());
/// for queue in ["q1", "q2"] {
///     broker
///         .create_queue(QueueDeclaration::new("address.anycast", queue, RoutingType::Anycast))
///         .unwrap();
/// }
///
/// // Anycast sends to the address are shared between its queues.
/// for _ in 0..2 {
///     broker
///         .send("address.anycast", RoutingType::Anycast, Message::new("hello"))
///         .await
///         .unwrap();
/// }
///
/// let consumer = broker.create_consumer("address.anycast::q2").unwrap();
/// assert!(consumer.receive(Duration::from_secs(1)).await.is_some());
/// assert_eq!(broker.query_queue("address.anycast::q2").message_count, Some(0));
/// # });
/// ```
pub struct Broker {
    name: String,
    settings: BrokerSettings,
    registry: Arc<BindingRegistry>,
    resolver: RoutingResolver,
    query: QueryService,
    store: Arc<dyn QueueStore>,
}

impl Broker {
    pub fn new(name: &str, settings: BrokerSettings) -> Self {
        Self::with_store(name, settings, Arc::new(InMemoryQueueStore::new()))
    }

    /// Builds a broker delivering into `store`.
    pub fn with_store(name: &str, settings: BrokerSettings, store: Arc<dyn QueueStore>) -> Self {
        let registry = Arc::new(BindingRegistry::with_auto_delete(
            settings.auto_delete_queues,
        ));

        info!(
            event = events::BROKER_START,
            component = COMPONENT,
            broker = name,
            auto_create_queues = settings.auto_create_queues,
            auto_create_addresses = settings.auto_create_addresses,
            auto_delete_queues = settings.auto_delete_queues,
            "broker started"
        );

        Self {
            name: name.to_string(),
            settings,
            resolver: RoutingResolver::new(registry.clone()),
            query: QueryService::new(registry.clone()),
            registry,
            store,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &BrokerSettings {
        &self.settings
    }

    pub fn registry(&self) -> &Arc<BindingRegistry> {
        &self.registry
    }

    pub fn resolver(&self) -> &RoutingResolver {
        &self.resolver
    }

    pub fn query_service(&self) -> &QueryService {
        &self.query
    }

    pub fn create_address(
        &self,
        address: &str,
        routing_type: RoutingType,
    ) -> Result<AddressInfo, RoutingError> {
        self.registry.create_address(address, routing_type)
    }

    pub fn create_queue(&self, declaration: QueueDeclaration) -> Result<QueueBinding, RoutingError> {
        self.registry.declare_binding(declaration)
    }

    /// Deletes a queue and discards whatever it still holds.
    pub fn delete_queue(&self, queue_name: &str) -> Result<QueueBinding, RoutingError> {
        let binding = self.registry.remove_binding(queue_name)?;
        self.store.discard(&binding);
        Ok(binding)
    }

    /// Routes `message` to the bindings `name` resolves to for a send.
    ///
    /// Returns how many queues enqueued it. A multicast address without subscribers
    /// accepts the message and enqueues it nowhere.
    pub async fn send(
        &self,
        name: &str,
        routing_type: RoutingType,
        message: Message,
    ) -> Result<usize, RoutingError> {
        let target = match self.resolver.resolve(name, Intent::Send(routing_type)) {
            Ok(target) => target,
            Err(err) if err.is_not_found() => self.auto_create_for_send(name, routing_type, err)?,
            Err(err) => return Err(err),
        };

        let message = Arc::new(message);
        let bindings = target.bindings();
        if bindings.is_empty() {
            debug!(
                event = events::SEND_DROPPED_NO_BINDINGS,
                component = COMPONENT,
                broker = self.name.as_str(),
                destination = name,
                msg_id = %message.id(),
                "no bindings matched, message dropped"
            );
            return Ok(0);
        }

        for binding in bindings {
            self.store.enqueue(binding, message.clone()).await;
        }

        debug!(
            event = events::SEND_DISPATCH,
            component = COMPONENT,
            broker = self.name.as_str(),
            destination = name,
            routing_type = %routing_type,
            msg_id = %message.id(),
            targets = fields::format_queue_names(bindings).as_str(),
            "message dispatched"
        );
        Ok(bindings.len())
    }

    /// Attaches a consumer to the one queue `name` resolves to.
    pub fn create_consumer(&self, name: &str) -> Result<Consumer, RoutingError> {
        let binding = match self.resolve_queue(name) {
            Ok(binding) => binding,
            Err(err) if err.is_not_found() && !CompositeName::parse(name).is_qualified() => {
                self.auto_create_queue(name, err)?;
                self.resolve_queue(name)?
            }
            Err(err) => return Err(err),
        };

        Consumer::attach(binding, self.registry.clone(), self.store.clone())
    }

    /// Subscribes to a multicast address through a fresh temporary queue.
    ///
    /// The queue gets a unique name, receives every message multicast to `address`
    /// from now on and disappears when the returned consumer is dropped.
    pub fn subscribe(&self, address: &str) -> Result<Consumer, RoutingError> {
        if CompositeName::parse(address).is_qualified() {
            return Err(RoutingError::invalid_destination(
                address,
                "subscriptions take a plain address",
            ));
        }

        if self.registry.address_info(address).is_none() {
            if !self.settings.auto_create_addresses {
                return Err(RoutingError::not_found(address));
            }
            self.registry
                .declare_address(address, RoutingType::Multicast, true)?;
            info!(
                event = events::AUTO_CREATE_ADDRESS,
                component = COMPONENT,
                broker = self.name.as_str(),
                address,
                "multicast address auto-created for subscriber"
            );
        }

        let queue_name = Uuid::new_v4().to_string();
        let binding = self.registry.declare_binding(
            QueueDeclaration::new(address, &queue_name, RoutingType::Multicast).temporary(true),
        )?;

        Consumer::attach(binding, self.registry.clone(), self.store.clone())
    }

    pub fn query_queue(&self, name: &str) -> QueueQueryResult {
        self.query.query_queue(name)
    }

    pub fn query_address(&self, name: &str) -> AddressQueryResult {
        self.query.query_address(name)
    }

    /// Drops every binding and its stored messages.
    pub fn shutdown(&self) {
        let removed = self.registry.clear();
        for binding in &removed {
            self.store.discard(binding);
        }
        info!(
            event = events::BROKER_SHUTDOWN,
            component = COMPONENT,
            broker = self.name.as_str(),
            removed = removed.len(),
            "broker shut down"
        );
    }

    fn resolve_queue(&self, name: &str) -> Result<QueueBinding, RoutingError> {
        self.resolver
            .resolve(name, Intent::Consume)?
            .into_queue()
            .ok_or_else(|| RoutingError::not_found(name))
    }

    fn auto_create_for_send(
        &self,
        name: &str,
        routing_type: RoutingType,
        err: RoutingError,
    ) -> Result<ResolvedTarget, RoutingError> {
        if CompositeName::parse(name).is_qualified() {
            return Err(err);
        }

        match routing_type {
            RoutingType::Multicast => {
                if !self.settings.auto_create_addresses {
                    return Err(err);
                }
                self.registry
                    .declare_address(name, RoutingType::Multicast, true)?;
                info!(
                    event = events::AUTO_CREATE_ADDRESS,
                    component = COMPONENT,
                    broker = self.name.as_str(),
                    address = name,
                    "multicast address auto-created for producer"
                );
            }
            RoutingType::Anycast => self.auto_create_queue(name, err)?,
        }

        self.resolver.resolve(name, Intent::Send(routing_type))
    }

    fn auto_create_queue(&self, name: &str, err: RoutingError) -> Result<(), RoutingError> {
        if !self.settings.auto_create_queues {
            return Err(err);
        }

        match self.registry.declare_binding(
            QueueDeclaration::new(name, name, RoutingType::Anycast).auto_created(true),
        ) {
            Ok(_) => {
                info!(
                    event = events::AUTO_CREATE_QUEUE,
                    component = COMPONENT,
                    broker = self.name.as_str(),
                    queue = name,
                    "anycast queue auto-created"
                );
                Ok(())
            }
            // Another client created it first.
            Err(RoutingError::DuplicateQueue { .. }) => Ok(()),
            Err(other) => Err(other),
        }
    }
}
