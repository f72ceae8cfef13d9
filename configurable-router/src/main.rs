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

mod config;

use crate::config::Config;
use clap::Parser;
use composite_router::Broker;
use std::fs;
use thiserror::Error;
use topology_static_file::{TopologyError, TopologyStaticFile};
use tracing::info;

#[derive(Parser)]
#[command()]
struct RouterArgs {
    #[arg(short, long, value_name = "FILE")]
    config: String,

    /// Queue or address name to query after startup. Repeatable; when given, the
    /// router exits once the queries have been answered.
    #[arg(short, long, value_name = "NAME")]
    query: Vec<String>,
}

#[derive(Debug, Error)]
enum RouterError {
    #[error("unable to read config file {path}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to parse config file {path}")]
    ConfigParse {
        path: String,
        #[source]
        source: json5::Error,
    },
    #[error("unable to apply static topology")]
    Topology(#[from] TopologyError),
    #[error("unable to wait for shutdown signal")]
    Signal(#[source] std::io::Error),
}

fn load_config(path: &str) -> Result<Config, RouterError> {
    let contents = fs::read_to_string(path).map_err(|source| RouterError::ConfigRead {
        path: path.to_string(),
        source,
    })?;
    json5::from_str(&contents).map_err(|source| RouterError::ConfigParse {
        path: path.to_string(),
        source,
    })
}

fn log_binding_table(broker: &Broker) {
    for address in broker.registry().addresses() {
        info!(
            address = address.name.as_str(),
            routing_types = ?address.routing_types,
            queues = ?address.queue_names,
            "address"
        );
    }
}

fn run_query(broker: &Broker, name: &str) {
    let queue = broker.query_queue(name);
    if queue.exists {
        info!(
            query = name,
            queue_name = ?queue.name.map(|queue_name| queue_name.to_string()),
            address = ?queue.address,
            routing_type = ?queue.routing_type,
            durable = ?queue.durable,
            message_count = ?queue.message_count,
            consumer_count = ?queue.consumer_count,
            "queue"
        );
        return;
    }

    let address = broker.query_address(name);
    if address.exists {
        info!(
            query = name,
            address = ?address.address,
            routing_types = ?address.routing_types,
            queues = ?address.queue_names,
            "address"
        );
    } else {
        info!(query = name, "no such queue or address");
    }
}

#[tokio::main]
async fn main() -> Result<(), RouterError> {
    let _ = tracing_subscriber::fmt::try_init();

    info!("Started configurable-router");

    let args = RouterArgs::parse();
    let config = load_config(&args.config)?;

    let broker = Broker::new(
        &config.router_config.name,
        config.router_config.settings(),
    );
    TopologyStaticFile::new(config.topology_config.file_path.clone()).apply(&broker)?;
    log_binding_table(&broker);

    if args.query.is_empty() {
        tokio::signal::ctrl_c().await.map_err(RouterError::Signal)?;
    } else {
        for name in &args.query {
            run_query(&broker, name);
        }
    }

    broker.shutdown();
    Ok(())
}
