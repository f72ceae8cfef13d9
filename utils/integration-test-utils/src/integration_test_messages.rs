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

use composite_router::{Consumer, Message};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const SEQUENCE_PROPERTY: &str = "sequence";

pub fn numbered_message(sequence: usize) -> Message {
    Message::new(format!("message-{sequence}"))
        .with_property(SEQUENCE_PROPERTY, sequence.to_string())
}

pub fn sequence_of(message: &Message) -> Option<usize> {
    message.property(SEQUENCE_PROPERTY)?.parse().ok()
}

/// Receives until `consumer` stays empty for `quiet`.
pub async fn drain(consumer: &Consumer, quiet: Duration) -> Vec<Arc<Message>> {
    let mut received = Vec::new();
    while let Some(message) = consumer.receive(quiet).await {
        received.push(message);
    }
    debug!(
        queue = consumer.queue_name(),
        received = received.len(),
        "consumer drained"
    );
    received
}
