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

use std::fmt::{Display, Formatter};

/// Separator between the address part and the queue part of a qualified name.
pub const DELIMITER: &str = "::";

/// Shape of a parsed name, keyed by which segments are present and non-empty.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NameForm {
    /// No delimiter at all. The operation decides between address and queue.
    Unqualified,
    /// `address::queue`
    FullyQualified,
    /// `::queue`
    QueueOnly,
    /// `address::`
    AddressOnly,
    /// `::`
    Empty,
}

impl NameForm {
    /// Address-only and empty qualified names identify no queue.
    pub fn is_malformed(&self) -> bool {
        matches!(self, NameForm::AddressOnly | NameForm::Empty)
    }
}

/// A client-supplied destination name split at the first [`DELIMITER`].
///
/// Lives only for the duration of one resolve call; nothing in the registry keeps
/// a `CompositeName` around.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum CompositeName {
    Unqualified(String),
    Qualified { address: String, queue: String },
}

impl CompositeName {
    /// Splits `raw` on the first occurrence of [`DELIMITER`].
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(DELIMITER) {
            Some((address, queue)) => CompositeName::Qualified {
                address: address.to_string(),
                queue: queue.to_string(),
            },
            None => CompositeName::Unqualified(raw.to_string()),
        }
    }

    /// Builds the qualified form of `address` and `queue`.
    pub fn qualified(address: impl Into<String>, queue: impl Into<String>) -> Self {
        CompositeName::Qualified {
            address: address.into(),
            queue: queue.into(),
        }
    }

    pub fn unqualified(name: impl Into<String>) -> Self {
        CompositeName::Unqualified(name.into())
    }

    /// Formats the wire form `<address>::<queue>`.
    ///
    /// `CompositeName::parse(&CompositeName::format(a, q))` yields `a` and `q` back for
    /// any parts that do not themselves contain the delimiter.
    pub fn format(address: &str, queue: &str) -> String {
        format!("{address}{DELIMITER}{queue}")
    }

    pub fn form(&self) -> NameForm {
        match self {
            CompositeName::Unqualified(_) => NameForm::Unqualified,
            CompositeName::Qualified { address, queue } => {
                match (address.is_empty(), queue.is_empty()) {
                    (false, false) => NameForm::FullyQualified,
                    (true, false) => NameForm::QueueOnly,
                    (false, true) => NameForm::AddressOnly,
                    (true, true) => NameForm::Empty,
                }
            }
        }
    }

    pub fn is_qualified(&self) -> bool {
        matches!(self, CompositeName::Qualified { .. })
    }

    /// Address segment of a qualified name. `None` when unqualified or empty.
    pub fn address_part(&self) -> Option<&str> {
        match self {
            CompositeName::Qualified { address, .. } if !address.is_empty() => {
                Some(address.as_str())
            }
            _ => None,
        }
    }

    /// Queue segment of a qualified name. `None` when unqualified or empty.
    pub fn queue_part(&self) -> Option<&str> {
        match self {
            CompositeName::Qualified { queue, .. } if !queue.is_empty() => Some(queue.as_str()),
            _ => None,
        }
    }

    /// The bare name of an unqualified name.
    pub fn plain(&self) -> Option<&str> {
        match self {
            CompositeName::Unqualified(name) => Some(name.as_str()),
            CompositeName::Qualified { .. } => None,
        }
    }
}

impl Display for CompositeName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CompositeName::Unqualified(name) => f.write_str(name),
            CompositeName::Qualified { address, queue } => {
                write!(f, "{address}{DELIMITER}{queue}")
            }
        }
    }
}

impl From<&str> for CompositeName {
    fn from(raw: &str) -> Self {
        CompositeName::parse(raw)
    }
}
