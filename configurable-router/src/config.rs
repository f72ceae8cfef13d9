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

use composite_router::BrokerSettings;
use serde::{Deserialize, Serialize};

fn enabled() -> bool {
    true
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub(crate) router_config: RouterConfig,
    pub(crate) topology_config: TopologyConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    pub(crate) name: String,
    #[serde(default = "enabled")]
    pub(crate) auto_create_queues: bool,
    #[serde(default = "enabled")]
    pub(crate) auto_create_addresses: bool,
    #[serde(default = "enabled")]
    pub(crate) auto_delete_queues: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct TopologyConfig {
    pub(crate) file_path: String,
}

impl RouterConfig {
    pub fn settings(&self) -> BrokerSettings {
        BrokerSettings {
            auto_create_queues: self.auto_create_queues,
            auto_create_addresses: self.auto_create_addresses,
            auto_delete_queues: self.auto_delete_queues,
        }
    }
}
