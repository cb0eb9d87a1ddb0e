// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context for the node controller.
//!
//! Every reconciliation receives an `Arc<Context>` holding the node store and
//! the single DNS provider chosen at startup. Both are shared read-only; the
//! context has no mutable state.

use std::sync::Arc;
use std::time::Duration;

use crate::nodes::NodeStore;
use crate::provider::DnsActions;

/// Shared context passed to the node controller.
#[derive(Clone)]
pub struct Context {
    /// Fetch/replace access to `Node` objects
    pub nodes: Arc<dyn NodeStore>,

    /// The configured DNS provider
    pub dns: Arc<dyn DnsActions>,

    /// How long to wait before re-checking a converged node
    pub resync_interval: Duration,
}

impl Context {
    /// Create a new context.
    #[must_use]
    pub fn new(
        nodes: Arc<dyn NodeStore>,
        dns: Arc<dyn DnsActions>,
        resync_interval: Duration,
    ) -> Self {
        Self {
            nodes,
            dns,
            resync_interval,
        }
    }
}
