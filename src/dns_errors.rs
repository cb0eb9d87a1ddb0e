// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Validation and DNS provider error types for nodedns.
//!
//! This module provides specialized error types for:
//! - Node data that cannot be turned into an A record (bad name, no addresses)
//! - DNS provider failures (network, non-2xx responses, unexpected payloads)
//!
//! The reconciler never retries internally. Every error here is surfaced to the
//! controller, which requeues the node according to its error policy.

use thiserror::Error;

/// Errors raised when a node cannot be mapped to a DNS record.
///
/// These conditions will not resolve on their own. They are surfaced so the
/// failure is visible on every retry until an operator fixes the node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The node name is empty, so no record name or zone can be derived
    #[error("DNS record name not found: node name is empty")]
    EmptyName,

    /// The node name contains no `.` separator
    ///
    /// Only fully-qualified node names are published, since the zone is
    /// derived from the name itself.
    #[error("Node name '{name}' is not fully qualified (no '.' separator)")]
    NotFullyQualified {
        /// The offending node name
        name: String,
    },

    /// The node reports no addresses at all in `status.addresses`
    #[error("IP addresses not found in node {name}")]
    MissingAddresses {
        /// The node name
        name: String,
    },
}

/// Errors returned by a [`DnsActions`](crate::provider::DnsActions) implementation.
///
/// All variants are retryable from the controller's point of view; they differ
/// in how they are logged and counted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DnsError {
    /// The provider could not be reached (DNS resolution, connect, timeout)
    ///
    /// Returned when the HTTP client fails before a response status is known.
    #[error("Transport error talking to DNS provider at {endpoint}: {reason}")]
    Transport {
        /// The provider URL that was being called
        endpoint: String,
        /// Underlying client error
        reason: String,
    },

    /// The provider answered with a non-2xx status
    #[error("DNS provider API call error: {status}")]
    ProviderApi {
        /// Status line text (e.g. `422 Unprocessable Entity`)
        status: String,
        /// Response body, if any was readable
        body: String,
    },

    /// The provider answered 2xx but the body did not have the expected shape
    ///
    /// This usually means the provider API changed underneath us.
    #[error("Unexpected response from DNS provider at {endpoint}: {reason}")]
    ProviderProtocol {
        /// The provider URL that was being called
        endpoint: String,
        /// Decode failure detail
        reason: String,
    },
}

impl DnsError {
    /// Stable label for logs and metrics.
    #[must_use]
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::ProviderApi { .. } => "provider_api",
            Self::ProviderProtocol { .. } => "provider_protocol",
        }
    }
}

#[cfg(test)]
#[path = "dns_errors_tests.rs"]
mod dns_errors_tests;
