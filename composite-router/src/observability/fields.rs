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

//! Canonical structured field keys and value-format helpers.

use crate::binding::{QueueBinding, RoutingType};
use crate::routing::resolver::Intent;

pub const EVENT: &str = "event";
pub const COMPONENT: &str = "component";
pub const BROKER: &str = "broker";

pub const DESTINATION: &str = "destination";
pub const ADDRESS: &str = "address";
pub const QUEUE: &str = "queue";
pub const ROUTING_TYPE: &str = "routing_type";
pub const INTENT: &str = "intent";
pub const TARGETS: &str = "targets";
pub const MSG_ID: &str = "msg_id";
pub const CONSUMERS: &str = "consumers";
pub const SNAPSHOT_VERSION: &str = "snapshot_version";
pub const ERR: &str = "err";

pub const NONE: &str = "none";

pub fn format_intent(intent: &Intent) -> String {
    match intent {
        Intent::Send(routing_type) => format!("send:{routing_type}"),
        Intent::Consume => "consume".to_string(),
        Intent::Query => "query".to_string(),
    }
}

pub fn format_routing_types(routing_types: &[RoutingType]) -> String {
    if routing_types.is_empty() {
        return NONE.to_string();
    }

    routing_types
        .iter()
        .map(RoutingType::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Comma-separated queue names, in binding order.
pub fn format_queue_names(bindings: &[QueueBinding]) -> String {
    if bindings.is_empty() {
        return NONE.to_string();
    }

    bindings
        .iter()
        .map(QueueBinding::queue_name)
        .collect::<Vec<_>>()
        .join(",")
}
