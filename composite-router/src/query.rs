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

//! Read-only queue and address queries for management and diagnostics.

use std::sync::Arc;

use crate::binding::{QueueBinding, RoutingType};
use crate::control_plane::binding_registry::BindingRegistry;
use crate::naming::{CompositeName, NameForm};
use crate::routing::resolver::{Intent, ResolvedTarget, RoutingResolver};

/// Result of [`QueryService::query_queue`].
///
/// `name` mirrors the form of the query: a qualified query reports `address::queue`,
/// a plain query reports the plain queue name.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct QueueQueryResult {
    pub exists: bool,
    pub name: Option<CompositeName>,
    pub address: Option<String>,
    pub routing_type: Option<RoutingType>,
    pub durable: Option<bool>,
    pub temporary: Option<bool>,
    pub message_count: Option<u64>,
    pub consumer_count: Option<usize>,
}

impl QueueQueryResult {
    fn missing() -> Self {
        Self::default()
    }

    fn found(name: CompositeName, binding: &QueueBinding) -> Self {
        Self {
            exists: true,
            name: Some(name),
            address: Some(binding.address().to_string()),
            routing_type: Some(binding.routing_type()),
            durable: Some(binding.is_durable()),
            temporary: Some(binding.is_temporary()),
            message_count: Some(binding.message_count()),
            consumer_count: Some(binding.consumer_count()),
        }
    }
}

/// Result of [`QueryService::query_address`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AddressQueryResult {
    pub exists: bool,
    pub address: Option<String>,
    pub routing_types: Vec<RoutingType>,
    pub queue_names: Vec<String>,
    pub auto_created: bool,
}

#[derive(Clone)]
pub struct QueryService {
    registry: Arc<BindingRegistry>,
    resolver: RoutingResolver,
}

impl QueryService {
    pub fn new(registry: Arc<BindingRegistry>) -> Self {
        Self {
            resolver: RoutingResolver::new(registry.clone()),
            registry,
        }
    }

    /// Looks up a queue by fully qualified, queue-only or plain name.
    ///
    /// Never fails: unknown and malformed names report `exists == false`.
    pub fn query_queue(&self, raw_name: &str) -> QueueQueryResult {
        let name = CompositeName::parse(raw_name);

        match self.resolver.resolve(raw_name, Intent::Query) {
            Ok(ResolvedTarget::Queue(binding)) => {
                let reported = match name.form() {
                    NameForm::Unqualified => name,
                    _ => binding.fully_qualified_name(),
                };
                QueueQueryResult::found(reported, &binding)
            }
            // A plain name matched an address; the caller asked about a queue.
            Ok(ResolvedTarget::Address(_)) => match self.registry.binding_by_queue_name(raw_name) {
                Some(binding) => QueueQueryResult::found(name, &binding),
                None => QueueQueryResult::missing(),
            },
            Ok(ResolvedTarget::FanOut { .. }) | Err(_) => QueueQueryResult::missing(),
        }
    }

    /// Looks up an address. Qualified names query their address part.
    pub fn query_address(&self, raw_name: &str) -> AddressQueryResult {
        let name = CompositeName::parse(raw_name);
        let address = match &name {
            CompositeName::Unqualified(plain) => Some(plain.as_str()),
            CompositeName::Qualified { .. } => name.address_part(),
        };

        match address.and_then(|address| self.registry.address_info(address)) {
            Some(info) => AddressQueryResult {
                exists: true,
                address: Some(info.name),
                routing_types: info.routing_types,
                queue_names: info.queue_names,
                auto_created: info.auto_created,
            },
            None => AddressQueryResult::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::QueryService;
    use crate::binding::RoutingType;
    use crate::control_plane::binding_registry::BindingRegistry;
    use crate::naming::CompositeName;
    use std::sync::Arc;

    fn query_service() -> QueryService {
        let registry = Arc::new(BindingRegistry::new());
        registry
            .create_binding("address.anycast", "q1", RoutingType::Anycast, true)
            .expect("binding should be created");
        registry
            .create_binding("orders", "orders", RoutingType::Anycast, true)
            .expect("binding should be created");
        QueryService::new(registry)
    }

    #[test]
    fn reported_name_mirrors_the_query_form() {
        let query = query_service();

        let qualified = query.query_queue("address.anycast::q1");
        assert!(qualified.exists);
        assert_eq!(
            qualified.name,
            Some(CompositeName::qualified("address.anycast", "q1"))
        );
        assert_eq!(qualified.address.as_deref(), Some("address.anycast"));
        assert_eq!(qualified.message_count, Some(0));

        let plain = query.query_queue("q1");
        assert!(plain.exists);
        assert_eq!(plain.name, Some(CompositeName::unqualified("q1")));
        assert_eq!(plain.address.as_deref(), Some("address.anycast"));
    }

    #[test]
    fn queue_only_query_reports_the_fully_qualified_name() {
        let result = query_service().query_queue("::q1");

        assert!(result.exists);
        assert_eq!(
            result.name.map(|name| name.to_string()).as_deref(),
            Some("address.anycast::q1")
        );
    }

    #[test]
    fn plain_name_shared_by_address_and_queue_reports_the_queue() {
        let result = query_service().query_queue("orders");

        assert!(result.exists);
        assert_eq!(result.name, Some(CompositeName::unqualified("orders")));
        assert_eq!(result.routing_type, Some(RoutingType::Anycast));
    }

    #[test]
    fn address_without_queue_of_that_name_does_not_exist_as_queue() {
        let result = query_service().query_queue("address.anycast");

        assert!(!result.exists);
        assert!(result.name.is_none());
    }

    #[test]
    fn malformed_and_unknown_names_do_not_exist() {
        let query = query_service();

        for raw in ["address.anycast::", "::", "address.anycast::q9", "q9"] {
            assert!(!query.query_queue(raw).exists, "{raw} should not exist");
        }
    }

    #[test]
    fn query_address_accepts_plain_and_qualified_names() {
        let query = query_service();

        let plain = query.query_address("address.anycast");
        assert!(plain.exists);
        assert_eq!(plain.queue_names, ["q1"]);
        assert_eq!(plain.routing_types, [RoutingType::Anycast]);

        let qualified = query.query_address("address.anycast::q1");
        assert_eq!(qualified, plain);

        assert!(!query.query_address("::q1").exists);
        assert!(!query.query_address("nowhere").exists);
    }
}
