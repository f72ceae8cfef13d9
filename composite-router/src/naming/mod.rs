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

//! Composite name codec.
//!
//! A composite name joins an address and a queue with [`DELIMITER`]:
//!
//! ```
//! use composite_router::{CompositeName, NameForm};
//!
//! let name = CompositeName::parse("address.anycast::q1");
//! assert_eq!(name.form(), NameForm::FullyQualified);
//! assert_eq!(name.address_part(), Some("address.anycast"));
//! assert_eq!(name.queue_part(), Some("q1"));
//! assert_eq!(name.to_string(), "address.anycast::q1");
//!
//! // Without the delimiter the caller decides whether it names an address or a queue.
//! assert_eq!(CompositeName::parse("q1").form(), NameForm::Unqualified);
//! ```

pub(crate) mod composite_name;

pub use composite_name::{CompositeName, NameForm, DELIMITER};
