// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! DNS provider capability.
//!
//! The reconciler only ever talks to a DNS provider through [`DnsActions`].
//! Exactly one implementation is selected at startup (see [`crate::config`])
//! and shared read-only across all reconciliations behind an `Arc`.
//!
//! # Available Providers
//!
//! - [`powerdns::PowerDnsProvider`] - PowerDNS authoritative server HTTP API

pub mod powerdns;

use crate::dns_errors::DnsError;

pub use powerdns::PowerDnsProvider;

/// Current state of a node's A record as seen by the provider.
///
/// Rebuilt on every reconciliation and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DnsRecord {
    /// Whether an A record exists at the name
    pub found: bool,
    /// Record type of the matched entry (`Some("A")` when found)
    pub record_type: Option<String>,
    /// Record contents (IP addresses) in provider order
    pub contents: Vec<String>,
}

impl DnsRecord {
    /// A record view for a name with no A record.
    #[must_use]
    pub fn not_found() -> Self {
        Self::default()
    }

    /// Order-sensitive comparison against the desired contents.
    ///
    /// A provider returning the same addresses in a different order is
    /// reported as a mismatch.
    #[must_use]
    pub fn matches(&self, desired: &[String]) -> bool {
        self.contents.as_slice() == desired
    }
}

/// CRUD operations on a single A record, addressed by `(name, zone)`.
///
/// `create_record` and `update_record` both replace the full content set; they
/// are separate only so callers read clearly. All operations are idempotent.
#[async_trait::async_trait]
pub trait DnsActions: Send + Sync {
    /// Short provider name for logs and metrics labels.
    fn provider_name(&self) -> &'static str;

    /// Read the A record at `name` in `zone`.
    ///
    /// A missing record is not an error; it is reported with `found == false`.
    ///
    /// # Errors
    ///
    /// Returns a [`DnsError`] on transport failure, non-2xx status, or an
    /// unexpected response body.
    async fn get_record(&self, name: &str, zone: &str) -> Result<DnsRecord, DnsError>;

    /// Create the A record at `name` with exactly `contents`.
    ///
    /// # Errors
    ///
    /// Returns a [`DnsError`] on transport failure or non-2xx status.
    async fn create_record(&self, name: &str, zone: &str, contents: &[String])
        -> Result<(), DnsError>;

    /// Replace the A record at `name` with exactly `contents`.
    ///
    /// # Errors
    ///
    /// Returns a [`DnsError`] on transport failure or non-2xx status.
    async fn update_record(&self, name: &str, zone: &str, contents: &[String])
        -> Result<(), DnsError>;

    /// Remove the A record at `name`. Succeeds if nothing existed.
    ///
    /// # Errors
    ///
    /// Returns a [`DnsError`] on transport failure or non-2xx status.
    async fn delete_record(&self, name: &str, zone: &str) -> Result<(), DnsError>;
}
