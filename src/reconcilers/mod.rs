// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes reconciliation logic for nodes.
//!
//! nodedns follows the standard Kubernetes controller pattern:
//!
//! 1. **Watch** - The controller watches `Node` objects
//! 2. **Reconcile** - Compare the node's addresses with its A record
//! 3. **Update** - Create, update or delete the record at the DNS provider
//! 4. **Finalize** - Hold the node with a finalizer until its record is gone
//!
//! # Available Reconcilers
//!
//! - [`reconcile_node`] - Keeps a node's A record in sync with its addresses
//!
//! # Example: Using the Reconciler
//!
//! ```rust,no_run
//! use nodedns::context::Context;
//! use nodedns::reconcilers::{reconcile_node, ReconcileOutcome};
//!
//! async fn reconcile(ctx: &Context) -> anyhow::Result<()> {
//!     if reconcile_node(ctx, "worker-1.example.com").await? == ReconcileOutcome::Requeue {
//!         // node changed underneath us, try again shortly
//!     }
//!     Ok(())
//! }
//! ```

pub mod finalizers;
pub mod node;

#[cfg(test)]
pub(crate) mod test_support;

pub use node::{desired_addresses, reconcile_node, ReconcileError, ReconcileOutcome};
