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

//! Loads a static address/queue topology from a JSON file and declares it on a
//! [`Broker`].
//!
//! ```json
//! {
//!   "addresses": [
//!     { "name": "address.anycast", "routing_type": "anycast",
//!       "queues": [{ "name": "q1" }, { "name": "q2", "durable": false }] }
//!   ]
//! }
//! ```

use composite_router::{Broker, QueueDeclaration, RoutingError, RoutingType};
use serde::Deserialize;
use std::fs::{self, canonicalize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("static topology file not found: {path}")]
    NotFound {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to read static topology file {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to parse static topology file {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("unable to declare topology entry")]
    Declare(#[from] RoutingError),
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum RoutingTypeDefinition {
    Anycast,
    Multicast,
}

impl From<RoutingTypeDefinition> for RoutingType {
    fn from(value: RoutingTypeDefinition) -> Self {
        match value {
            RoutingTypeDefinition::Anycast => RoutingType::Anycast,
            RoutingTypeDefinition::Multicast => RoutingType::Multicast,
        }
    }
}

fn default_durable() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct QueueDefinition {
    pub name: String,
    #[serde(default = "default_durable")]
    pub durable: bool,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AddressDefinition {
    pub name: String,
    pub routing_type: RoutingTypeDefinition,
    #[serde(default)]
    pub queues: Vec<QueueDefinition>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Topology {
    #[serde(default)]
    pub addresses: Vec<AddressDefinition>,
}

/// Totals of one [`TopologyStaticFile::apply`] run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AppliedTopology {
    pub addresses: usize,
    pub queues: usize,
}

pub struct TopologyStaticFile {
    static_file: String,
}

impl TopologyStaticFile {
    pub fn new(static_file: String) -> Self {
        TopologyStaticFile { static_file }
    }

    pub fn load(&self) -> Result<Topology, TopologyError> {
        let topology_json_file = PathBuf::from(self.static_file.clone());
        debug!("topology_json_file: {topology_json_file:?}");

        let topology_json_file =
            canonicalize(topology_json_file).map_err(|source| TopologyError::NotFound {
                path: self.static_file.clone(),
                source,
            })?;

        let data = fs::read_to_string(&topology_json_file).map_err(|source| {
            TopologyError::Read {
                path: self.static_file.clone(),
                source,
            }
        })?;

        serde_json::from_str(&data).map_err(|source| TopologyError::Parse {
            path: self.static_file.clone(),
            source,
        })
    }

    /// Declares every address and queue of the file on `broker`.
    ///
    /// Stops at the first entry the broker rejects; entries declared before it stay.
    pub fn apply(&self, broker: &Broker) -> Result<AppliedTopology, TopologyError> {
        let topology = self.load()?;
        let mut applied = AppliedTopology::default();

        for address in &topology.addresses {
            let routing_type = RoutingType::from(address.routing_type);
            broker.create_address(&address.name, routing_type)?;
            applied.addresses += 1;

            for queue in &address.queues {
                broker.create_queue(
                    QueueDeclaration::new(&address.name, &queue.name, routing_type)
                        .durable(queue.durable),
                )?;
                debug!(
                    address = address.name.as_str(),
                    queue = queue.name.as_str(),
                    "static queue declared"
                );
                applied.queues += 1;
            }
        }

        info!(
            file = self.static_file.as_str(),
            addresses = applied.addresses,
            queues = applied.queues,
            "static topology applied"
        );
        Ok(applied)
    }
}
