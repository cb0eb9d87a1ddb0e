// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Node reconciliation logic.
//!
//! Keeps the A record `<node name>` in the zone derived from the node name in
//! sync with the node's `InternalIP` addresses, and removes it before the node
//! object is allowed to go away.
//!
//! Each call re-derives everything from the node object and the provider; the
//! only state carried between calls is the finalizer on the node itself:
//!
//! | Node state | Finalizer | Action |
//! |------------|-----------|--------|
//! | gone | - | nothing |
//! | live | absent | add finalizer, then create/update record |
//! | live | present | create/update record if it differs |
//! | deleting | any | delete record, then drop finalizer |
//!
//! At most one node write and one DNS mutation happen per call. Nothing is
//! retried here; errors and [`ReconcileOutcome::Requeue`] go back to the
//! controller, which schedules the next attempt.

use k8s_openapi::api::core::v1::{Node, NodeAddress};
use kube::ResourceExt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::constants::{NODE_ADDRESS_INTERNAL_IP, NODE_FINALIZER};
use crate::context::Context;
use crate::dns_errors::{DnsError, ValidationError};
use crate::metrics;
use crate::nodes::NodeStoreError;
use crate::provider::DnsRecord;
use crate::reconcilers::finalizers::{ensure_finalizer, remove_finalizer};
use crate::zone::resolve_zone;

/// Result of a reconciliation that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Node and record are converged (or the node is gone)
    Done,
    /// A node write lost an optimistic-concurrency race; try again soon
    Requeue,
}

/// Failures surfaced to the controller.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Node data cannot be published (bad name, no addresses)
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The DNS provider call failed
    #[error(transparent)]
    Dns(#[from] DnsError),

    /// Fetching the node failed for a reason other than not-found
    #[error("Failed to fetch node: {0}")]
    NodeFetch(#[source] NodeStoreError),

    /// Writing the node back failed for a reason other than conflict/not-found
    #[error("Failed to update node: {0}")]
    NodeWrite(#[source] NodeStoreError),
}

impl ReconcileError {
    /// Stable label for logs and metrics.
    #[must_use]
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Dns(e) => e.error_class(),
            Self::NodeFetch(_) => "node_fetch",
            Self::NodeWrite(_) => "node_write",
        }
    }
}

/// All addresses reported in `status.addresses`.
fn reported_addresses(node: &Node) -> &[NodeAddress] {
    node.status
        .as_ref()
        .and_then(|status| status.addresses.as_deref())
        .unwrap_or_default()
}

/// Record contents the node should publish: its `InternalIP` addresses in
/// report order.
///
/// `ExternalIP`, `Hostname` and other address types are not published.
#[must_use]
pub fn desired_addresses(node: &Node) -> Vec<String> {
    reported_addresses(node)
        .iter()
        .filter(|a| a.type_ == NODE_ADDRESS_INTERNAL_IP)
        .map(|a| a.address.clone())
        .collect()
}

/// Map the result of a finalizer write onto the reconcile flow.
///
/// `Ok(true)` means continue, `Ok(false)` means stop and requeue.
fn finalizer_write_result(
    name: &str,
    result: Result<bool, NodeStoreError>,
) -> Result<bool, ReconcileError> {
    match result {
        Ok(_) => Ok(true),
        Err(e) if e.is_transient() => {
            info!(node = %name, reason = %e, "Node changed while updating finalizer, requeueing");
            Ok(false)
        }
        Err(e) => Err(ReconcileError::NodeWrite(e)),
    }
}

/// Reconcile the A record for the node called `name`.
///
/// # Errors
///
/// - [`ReconcileError::Validation`] if the node has no addresses or its name
///   is not fully qualified
/// - [`ReconcileError::Dns`] if any provider call fails
/// - [`ReconcileError::NodeFetch`] / [`ReconcileError::NodeWrite`] for API
///   failures other than not-found or conflict
pub async fn reconcile_node(ctx: &Context, name: &str) -> Result<ReconcileOutcome, ReconcileError> {
    let Some(node) = ctx
        .nodes
        .get(name)
        .await
        .map_err(ReconcileError::NodeFetch)?
    else {
        debug!(node = %name, "Node not found, nothing to reconcile");
        return Ok(ReconcileOutcome::Done);
    };

    let node_name = node.name_any();

    if reported_addresses(&node).is_empty() {
        return Err(ValidationError::MissingAddresses { name: node_name }.into());
    }

    let desired = desired_addresses(&node);
    let zone = resolve_zone(&node_name)?;

    let current = ctx.dns.get_record(&node_name, &zone).await?;
    debug!(
        node = %node_name,
        zone = %zone,
        found = current.found,
        current = ?current.contents,
        desired = ?desired,
        "Fetched current DNS record"
    );

    if node.metadata.deletion_timestamp.is_some() {
        return cleanup_node_record(ctx, &node, &node_name, &zone).await;
    }

    let added = ensure_finalizer(ctx.nodes.as_ref(), &node, NODE_FINALIZER).await;
    if !finalizer_write_result(&node_name, added)? {
        return Ok(ReconcileOutcome::Requeue);
    }

    sync_node_record(ctx, &node_name, &zone, &current, &desired).await?;

    Ok(ReconcileOutcome::Done)
}

/// Delete the record, then release the node.
async fn cleanup_node_record(
    ctx: &Context,
    node: &Node,
    name: &str,
    zone: &str,
) -> Result<ReconcileOutcome, ReconcileError> {
    info!(node = %name, zone = %zone, "Node is being deleted, removing A record");

    ctx.dns.delete_record(name, zone).await?;
    metrics::record_dns_record_change("delete");

    let removed = remove_finalizer(ctx.nodes.as_ref(), node, NODE_FINALIZER).await;
    if !finalizer_write_result(name, removed)? {
        return Ok(ReconcileOutcome::Requeue);
    }

    Ok(ReconcileOutcome::Done)
}

/// Create or update the record so it holds exactly `desired`.
async fn sync_node_record(
    ctx: &Context,
    name: &str,
    zone: &str,
    current: &DnsRecord,
    desired: &[String],
) -> Result<(), DnsError> {
    if !current.found {
        info!(node = %name, zone = %zone, contents = ?desired, "Creating A record");
        ctx.dns.create_record(name, zone, desired).await?;
        metrics::record_dns_record_change("create");
        return Ok(());
    }

    if current.matches(desired) {
        debug!(node = %name, zone = %zone, "A record already up to date");
        return Ok(());
    }

    if current.contents.len() == desired.len()
        && desired.iter().all(|ip| current.contents.contains(ip))
    {
        warn!(
            node = %name,
            current = ?current.contents,
            desired = ?desired,
            "A record differs only in address order, rewriting"
        );
    }

    info!(
        node = %name,
        zone = %zone,
        from = ?current.contents,
        to = ?desired,
        "Updating A record"
    );
    ctx.dns.update_record(name, zone, desired).await?;
    metrics::record_dns_record_change("update");

    Ok(())
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod node_tests;
