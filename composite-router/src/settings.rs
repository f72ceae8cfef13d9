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

/// Broker-wide address settings.
///
/// Auto-creation only ever applies to unqualified names; a fully qualified name
/// always refers to something that must already exist.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BrokerSettings {
    /// Create an anycast queue named after the address when a consumer or an anycast
    /// producer targets an unknown plain name.
    pub auto_create_queues: bool,
    /// Create a multicast address placeholder when a multicast producer or a
    /// subscriber targets an unknown address.
    pub auto_create_addresses: bool,
    /// Remove auto-created queues once their last consumer detaches.
    pub auto_delete_queues: bool,
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            auto_create_queues: true,
            auto_create_addresses: true,
            auto_delete_queues: true,
        }
    }
}
