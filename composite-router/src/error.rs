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

//! Failure kinds reported by the registry and the resolver.

use thiserror::Error;

/// None of these are transient; callers get them synchronously and decide what to do
/// (for example auto-create on [`RoutingError::NotFound`]).
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RoutingError {
    #[error("queue '{queue}' already exists")]
    DuplicateQueue { queue: String },

    #[error("destination '{name}' not found")]
    NotFound { name: String },

    #[error("invalid destination '{name}': {reason}")]
    InvalidDestination { name: String, reason: &'static str },
}

impl RoutingError {
    pub(crate) fn duplicate_queue(queue: &str) -> Self {
        RoutingError::DuplicateQueue {
            queue: queue.to_string(),
        }
    }

    pub(crate) fn not_found(name: &str) -> Self {
        RoutingError::NotFound {
            name: name.to_string(),
        }
    }

    pub(crate) fn invalid_destination(name: &str, reason: &'static str) -> Self {
        RoutingError::InvalidDestination {
            name: name.to_string(),
            reason,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RoutingError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::RoutingError;

    #[test]
    fn display_names_the_offending_destination() {
        assert_eq!(
            RoutingError::duplicate_queue("q1").to_string(),
            "queue 'q1' already exists"
        );
        assert_eq!(
            RoutingError::not_found("address.anycast::q9").to_string(),
            "destination 'address.anycast::q9' not found"
        );
        assert_eq!(
            RoutingError::invalid_destination("::", "no queue name").to_string(),
            "invalid destination '::': no queue name"
        );
    }
}
