// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the nodedns operator.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Kubernetes Constants
// ============================================================================

/// Finalizer placed on every tracked `Node` until its A record has been removed
pub const NODE_FINALIZER: &str = "node.example.com/finalizer";

/// Kind name used as the resource label in logs and metrics
pub const KIND_NODE: &str = "Node";

/// Node address type whose addresses are published in DNS
pub const NODE_ADDRESS_INTERNAL_IP: &str = "InternalIP";

/// Node address type for externally routable addresses (not published)
pub const NODE_ADDRESS_EXTERNAL_IP: &str = "ExternalIP";

// ============================================================================
// DNS Protocol Constants
// ============================================================================

/// Separator between DNS labels
pub const DNS_LABEL_SEPARATOR: char = '.';

/// Record type managed by the operator
pub const RECORD_TYPE_A: &str = "A";

/// TTL applied to every A record written to the provider (1 day)
pub const DEFAULT_DNS_RECORD_TTL_SECS: u32 = 86400;

// ============================================================================
// PowerDNS API Constants
// ============================================================================

/// Header carrying the static PowerDNS API key
pub const POWERDNS_API_KEY_HEADER: &str = "X-API-Key";

/// PowerDNS server id used in every zone URL
pub const POWERDNS_SERVER_ID: &str = "localhost";

/// Timeout applied to every PowerDNS HTTP request
pub const DNS_PROVIDER_TIMEOUT_SECS: u64 = 10;

/// `changetype` for a full replace of an rrset
pub const CHANGETYPE_REPLACE: &str = "REPLACE";

/// `changetype` for removing an rrset
pub const CHANGETYPE_DELETE: &str = "DELETE";

// ============================================================================
// Controller Requeue Constants
// ============================================================================

/// Requeue duration for controller errors (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Requeue duration after an optimistic-concurrency conflict on a node write
pub const CONFLICT_REQUEUE_DURATION_SECS: u64 = 5;

/// Default resync interval after a successful reconciliation (5 minutes)
pub const DEFAULT_RESYNC_INTERVAL_SECS: u64 = 300;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Default listen address for the metrics HTTP server
pub const DEFAULT_METRICS_ADDR: &str = "0.0.0.0:8080";

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Path for the liveness endpoint
pub const HEALTH_SERVER_PATH: &str = "/healthz";
