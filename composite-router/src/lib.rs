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

//! # composite-router
//!
//! `composite-router` resolves client-supplied destination names against a live
//! registry of addresses and the queues bound to them.
//!
//! A destination is either a plain name (`orders`), read as an address or a queue
//! depending on what the client is doing, or a fully qualified name
//! (`address::queue`) that selects exactly one queue under one address.
//!
//! ## Queues under one address
//!
//! ```
//! use std::time::Duration;
//! use composite_router::{Broker, BrokerSettings, Message, QueueDeclaration, RoutingType};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let broker = Broker::new("quick-start", BrokerSettings::default());
//! for queue in ["q1", "q2", "q3"] {
//!     broker
//!         .create_queue(QueueDeclaration::new("address.anycast", queue, RoutingType::Anycast))
//!         .unwrap();
//! }
//!
//! let q2 = broker.create_consumer("address.anycast::q2").unwrap();
//! for _ in 0..3 {
//!     broker
//!         .send("address.anycast", RoutingType::Anycast, Message::new("m"))
//!         .await
//!         .unwrap();
//! }
//! assert!(q2.receive(Duration::from_secs(1)).await.is_some());
//!
//! let fqqn = broker.query_queue("address.anycast::q2");
//! assert!(fqqn.exists);
//! assert_eq!(fqqn.name.unwrap().to_string(), "address.anycast::q2");
//! assert_eq!(fqqn.address.as_deref(), Some("address.anycast"));
//! assert_eq!(fqqn.message_count, Some(0));
//!
//! assert_eq!(broker.query_queue("q2").name.unwrap().to_string(), "q2");
//! # });
//! ```
//!
//! ## Malformed names
//!
//! ```
//! use composite_router::{Broker, BrokerSettings, QueueDeclaration, RoutingError, RoutingType};
//!
//! let broker = Broker::new("names", BrokerSettings::default());
//! broker
//!     .create_queue(QueueDeclaration::new("address.anycast", "q1", RoutingType::Anycast))
//!     .unwrap();
//!
//! // An empty address part selects the queue by name alone.
//! assert_eq!(broker.create_consumer("::q1").unwrap().address(), "address.anycast");
//! assert!(matches!(
//!     broker.create_consumer("q1::"),
//!     Err(RoutingError::InvalidDestination { .. })
//! ));
//! assert!(matches!(
//!     broker.create_consumer("::"),
//!     Err(RoutingError::InvalidDestination { .. })
//! ));
//! ```
//!
//! - Naming: composite name codec
//! - Control plane: address/binding registry and its write-side lifecycle guard
//! - Routing: intent-driven resolution of names to bindings
//! - Query: read-only queue and address inspection
//! - Data plane: queue storage and consumers
//!
//! The workspace uses `tracing` for logs/events.
//! Library code emits events/spans and does not initialize a global subscriber.
//! Binaries and tests are responsible for one-time `tracing_subscriber`
//! initialization at process boundaries.

mod binding;
pub use binding::{AddressInfo, QueueBinding, QueueDeclaration, RoutingType};

mod broker;
pub use broker::Broker;

mod control_plane;
pub use control_plane::binding_lifecycle::DetachOutcome;
pub use control_plane::binding_registry::BindingRegistry;

mod data_plane;
pub use data_plane::consumer::Consumer;
pub use data_plane::queue_store::{InMemoryQueueStore, QueueStore};

mod error;
pub use error::RoutingError;

mod message;
pub use message::Message;

mod naming;
pub use naming::{CompositeName, NameForm, DELIMITER};

#[doc(hidden)]
pub mod observability;

mod query;
pub use query::{AddressQueryResult, QueryService, QueueQueryResult};

mod routing;
pub use routing::resolver::{Intent, ResolvedTarget, RoutingResolver};

mod settings;
pub use settings::BrokerSettings;

#[doc(hidden)]
pub mod benchmark_support;
