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

mod counting_queue_store;
pub use counting_queue_store::CountingQueueStore;

mod integration_test_logging;
pub use integration_test_logging::init_logging;

mod integration_test_messages;
pub use integration_test_messages::{drain, numbered_message, sequence_of, SEQUENCE_PROPERTY};
