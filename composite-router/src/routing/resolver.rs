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

//! Intent-driven resolution of composite names to bindings.

use std::slice;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::binding::{AddressInfo, QueueBinding, RoutingType};
use crate::control_plane::binding_registry::{BindingRegistry, RegistrySnapshot};
use crate::error::RoutingError;
use crate::naming::{CompositeName, NameForm};
use crate::observability::{events, fields};

const COMPONENT: &str = "routing_resolver";

/// What the caller is about to do with the resolved name.
///
/// Decides how an unqualified name is read: as an address or as a queue.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Intent {
    /// Producer send with the given routing semantics.
    Send(RoutingType),
    /// Consumer attach.
    Consume,
    /// Administrative lookup.
    Query,
}

/// Outcome of a successful resolution.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolvedTarget {
    /// Exactly one queue.
    Queue(QueueBinding),
    /// Every multicast binding of `address` at resolution time. May be empty.
    FanOut {
        address: String,
        bindings: Vec<QueueBinding>,
    },
    /// An address hit from a query.
    Address(AddressInfo),
}

impl ResolvedTarget {
    /// Bindings a send hands the message to. Address hits carry none.
    pub fn bindings(&self) -> &[QueueBinding] {
        match self {
            ResolvedTarget::Queue(binding) => slice::from_ref(binding),
            ResolvedTarget::FanOut { bindings, .. } => bindings,
            ResolvedTarget::Address(_) => &[],
        }
    }

    pub fn as_queue(&self) -> Option<&QueueBinding> {
        match self {
            ResolvedTarget::Queue(binding) => Some(binding),
            _ => None,
        }
    }

    pub fn into_queue(self) -> Option<QueueBinding> {
        match self {
            ResolvedTarget::Queue(binding) => Some(binding),
            _ => None,
        }
    }
}

/// Resolves names against an injected [`BindingRegistry`].
#[derive(Clone)]
pub struct RoutingResolver {
    registry: Arc<BindingRegistry>,
}

impl RoutingResolver {
    pub fn new(registry: Arc<BindingRegistry>) -> Self {
        Self { registry }
    }

    /// Resolves `raw_name` for `intent`.
    ///
    /// Fully qualified names select one queue under one address regardless of intent.
    /// Queue-only names (`::queue`) select by queue name alone. Address-only and empty
    /// qualified names are invalid for sends and consumers and not found for queries.
    /// Unqualified names are read according to `intent`.
    pub fn resolve(&self, raw_name: &str, intent: Intent) -> Result<ResolvedTarget, RoutingError> {
        let name = CompositeName::parse(raw_name);
        let snapshot = self.registry.snapshot();
        let result = Self::resolve_in(&snapshot, raw_name, &name, intent);

        match &result {
            Ok(target) => trace!(
                event = events::RESOLVE_OK,
                component = COMPONENT,
                destination = raw_name,
                intent = fields::format_intent(&intent).as_str(),
                targets = fields::format_queue_names(target.bindings()).as_str(),
                snapshot_version = snapshot.version,
                "name resolved"
            ),
            Err(RoutingError::InvalidDestination { reason, .. }) => debug!(
                event = events::RESOLVE_INVALID_DESTINATION,
                component = COMPONENT,
                destination = raw_name,
                intent = fields::format_intent(&intent).as_str(),
                reason = *reason,
                "invalid destination"
            ),
            Err(_) => debug!(
                event = events::RESOLVE_NOT_FOUND,
                component = COMPONENT,
                destination = raw_name,
                intent = fields::format_intent(&intent).as_str(),
                snapshot_version = snapshot.version,
                "destination not found"
            ),
        }

        result
    }

    fn resolve_in(
        snapshot: &RegistrySnapshot,
        raw_name: &str,
        name: &CompositeName,
        intent: Intent,
    ) -> Result<ResolvedTarget, RoutingError> {
        match (name, name.form()) {
            (CompositeName::Qualified { address, queue }, NameForm::FullyQualified) => snapshot
                .address(address)
                .and_then(|entry| entry.find_queue(queue))
                .cloned()
                .map(ResolvedTarget::Queue)
                .ok_or_else(|| RoutingError::not_found(raw_name)),
            (CompositeName::Qualified { queue, .. }, NameForm::QueueOnly) => snapshot
                .queue(queue)
                .cloned()
                .map(ResolvedTarget::Queue)
                .ok_or_else(|| RoutingError::not_found(raw_name)),
            (CompositeName::Qualified { .. }, form) => match intent {
                Intent::Query => Err(RoutingError::not_found(raw_name)),
                Intent::Send(_) | Intent::Consume if form == NameForm::AddressOnly => Err(
                    RoutingError::invalid_destination(raw_name, "qualified name has no queue part"),
                ),
                Intent::Send(_) | Intent::Consume => Err(RoutingError::invalid_destination(
                    raw_name,
                    "qualified name has neither address nor queue",
                )),
            },
            (CompositeName::Unqualified(plain), _) => {
                Self::resolve_unqualified(snapshot, raw_name, plain, intent)
            }
        }
    }

    fn resolve_unqualified(
        snapshot: &RegistrySnapshot,
        raw_name: &str,
        plain: &str,
        intent: Intent,
    ) -> Result<ResolvedTarget, RoutingError> {
        match intent {
            Intent::Send(RoutingType::Multicast) => snapshot
                .address(plain)
                .map(|entry| ResolvedTarget::FanOut {
                    address: entry.name.clone(),
                    bindings: entry.bindings_of(RoutingType::Multicast),
                })
                .ok_or_else(|| RoutingError::not_found(raw_name)),
            Intent::Send(RoutingType::Anycast) => {
                if let Some(binding) = snapshot.address(plain).and_then(|entry| entry.next_anycast())
                {
                    trace!(
                        event = events::ANYCAST_SELECT,
                        component = COMPONENT,
                        address = plain,
                        queue = binding.queue_name(),
                        "anycast binding selected"
                    );
                    return Ok(ResolvedTarget::Queue(binding));
                }
                Self::queue_by_name(snapshot, raw_name, plain)
            }
            Intent::Consume => Self::queue_by_name(snapshot, raw_name, plain),
            Intent::Query => match snapshot.address(plain) {
                Some(entry) => Ok(ResolvedTarget::Address(entry.info())),
                None => Self::queue_by_name(snapshot, raw_name, plain),
            },
        }
    }

    fn queue_by_name(
        snapshot: &RegistrySnapshot,
        raw_name: &str,
        queue_name: &str,
    ) -> Result<ResolvedTarget, RoutingError> {
        snapshot
            .queue(queue_name)
            .cloned()
            .map(ResolvedTarget::Queue)
            .ok_or_else(|| RoutingError::not_found(raw_name))
    }
}

#[cfg(test)]
mod tests {
    use super::{Intent, ResolvedTarget, RoutingResolver};
    use crate::binding::RoutingType;
    use crate::control_plane::binding_registry::BindingRegistry;
    use crate::error::RoutingError;
    use std::sync::Arc;

    fn resolver_with(bindings: &[(&str, &str, RoutingType)]) -> RoutingResolver {
        let registry = Arc::new(BindingRegistry::new());
        for (address, queue, routing_type) in bindings {
            registry
                .create_binding(address, queue, *routing_type, true)
                .expect("binding should be created");
        }
        RoutingResolver::new(registry)
    }

    fn queue_name(target: ResolvedTarget) -> String {
        target
            .as_queue()
            .expect("target should be a single queue")
            .queue_name()
            .to_string()
    }

    #[test]
    fn fully_qualified_name_selects_that_queue_for_every_intent() {
        let resolver = resolver_with(&[
            ("address.anycast", "q1", RoutingType::Anycast),
            ("address.anycast", "q2", RoutingType::Anycast),
            ("address.anycast", "q3", RoutingType::Anycast),
        ]);

        for intent in [
            Intent::Consume,
            Intent::Query,
            Intent::Send(RoutingType::Anycast),
            Intent::Send(RoutingType::Multicast),
        ] {
            let target = resolver
                .resolve("address.anycast::q2", intent)
                .expect("qualified name should resolve");
            assert_eq!(queue_name(target), "q2");
        }
    }

    #[test]
    fn fully_qualified_name_under_the_wrong_address_is_not_found() {
        let resolver = resolver_with(&[
            ("address.a", "q1", RoutingType::Anycast),
            ("address.b", "q2", RoutingType::Anycast),
        ]);

        assert_eq!(
            resolver.resolve("address.b::q1", Intent::Consume),
            Err(RoutingError::NotFound {
                name: "address.b::q1".to_string()
            })
        );
    }

    #[test]
    fn queue_only_name_ignores_the_address() {
        let resolver = resolver_with(&[("address.anycast", "q1", RoutingType::Anycast)]);

        let target = resolver
            .resolve("::q1", Intent::Consume)
            .expect("queue-only name should resolve");
        assert_eq!(queue_name(target), "q1");
        assert!(resolver
            .resolve("::missing", Intent::Consume)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn malformed_qualified_names_are_invalid_for_consumers_and_producers() {
        let resolver = resolver_with(&[("address.anycast", "q1", RoutingType::Anycast)]);

        for raw in ["q1::", "address.anycast::", "::"] {
            for intent in [Intent::Consume, Intent::Send(RoutingType::Anycast)] {
                assert!(matches!(
                    resolver.resolve(raw, intent),
                    Err(RoutingError::InvalidDestination { .. })
                ));
            }
            assert!(resolver
                .resolve(raw, Intent::Query)
                .unwrap_err()
                .is_not_found());
        }
    }

    #[test]
    fn multicast_send_snapshots_only_multicast_bindings() {
        let resolver = resolver_with(&[
            ("events", "sub-1", RoutingType::Multicast),
            ("events", "worker", RoutingType::Anycast),
            ("events", "sub-2", RoutingType::Multicast),
        ]);

        match resolver
            .resolve("events", Intent::Send(RoutingType::Multicast))
            .expect("address should resolve")
        {
            ResolvedTarget::FanOut { address, bindings } => {
                assert_eq!(address, "events");
                let names: Vec<&str> = bindings.iter().map(|b| b.queue_name()).collect();
                assert_eq!(names, ["sub-1", "sub-2"]);
            }
            other => panic!("expected fan-out, got {other:?}"),
        }
    }

    #[test]
    fn multicast_send_to_unknown_address_is_not_found() {
        let resolver = resolver_with(&[]);

        assert!(resolver
            .resolve("nowhere", Intent::Send(RoutingType::Multicast))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn fan_out_target_is_not_affected_by_later_bindings() {
        let registry = Arc::new(BindingRegistry::new());
        registry
            .create_binding("events", "sub-1", RoutingType::Multicast, false)
            .expect("binding should be created");
        let resolver = RoutingResolver::new(registry.clone());

        let target = resolver
            .resolve("events", Intent::Send(RoutingType::Multicast))
            .expect("address should resolve");
        registry
            .create_binding("events", "sub-2", RoutingType::Multicast, false)
            .expect("binding should be created");

        assert_eq!(target.bindings().len(), 1);
        assert_eq!(registry.bindings_for_address("events").len(), 2);
    }

    #[test]
    fn anycast_send_to_address_rotates_across_queues() {
        let resolver = resolver_with(&[
            ("address.anycast", "q1", RoutingType::Anycast),
            ("address.anycast", "q2", RoutingType::Anycast),
            ("address.anycast", "q3", RoutingType::Anycast),
        ]);

        let picks: Vec<String> = (0..6)
            .map(|_| {
                resolver
                    .resolve("address.anycast", Intent::Send(RoutingType::Anycast))
                    .map(queue_name)
                    .expect("address should resolve")
            })
            .collect();

        assert_eq!(picks, ["q1", "q2", "q3", "q1", "q2", "q3"]);
    }

    #[test]
    fn anycast_send_and_consume_fall_back_to_queue_name() {
        let resolver = resolver_with(&[("address.anycast", "q1", RoutingType::Anycast)]);

        let sent = resolver
            .resolve("q1", Intent::Send(RoutingType::Anycast))
            .expect("queue name should resolve");
        let consumed = resolver
            .resolve("q1", Intent::Consume)
            .expect("queue name should resolve");

        assert_eq!(queue_name(sent), "q1");
        assert_eq!(queue_name(consumed), "q1");
        assert!(resolver
            .resolve("address.anycast", Intent::Consume)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn query_prefers_address_then_queue() {
        let resolver = resolver_with(&[("address.anycast", "q1", RoutingType::Anycast)]);

        match resolver
            .resolve("address.anycast", Intent::Query)
            .expect("address should resolve")
        {
            ResolvedTarget::Address(info) => assert_eq!(info.queue_names, ["q1"]),
            other => panic!("expected address, got {other:?}"),
        }
        assert_eq!(
            queue_name(
                resolver
                    .resolve("q1", Intent::Query)
                    .expect("queue should resolve")
            ),
            "q1"
        );
        assert!(resolver
            .resolve("missing", Intent::Query)
            .unwrap_err()
            .is_not_found());
    }
}
