// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Finalizer management for `Node` objects.
//!
//! The finalizer keeps a node object around until its A record has been
//! removed from the DNS provider. Writes go through [`NodeStore::replace`],
//! so a node that changed since it was read is rejected instead of having its
//! other finalizers overwritten.
//!
//! # Example
//!
//! ```rust,ignore
//! use nodedns::reconcilers::finalizers::{ensure_finalizer, remove_finalizer};
//!
//! if node.metadata.deletion_timestamp.is_some() {
//!     // ... clean up external state first ...
//!     remove_finalizer(store, &node, NODE_FINALIZER).await?;
//! } else {
//!     ensure_finalizer(store, &node, NODE_FINALIZER).await?;
//! }
//! ```

use k8s_openapi::api::core::v1::Node;
use kube::ResourceExt;
use tracing::info;

use crate::nodes::{NodeStore, NodeStoreError};

/// Whether `finalizer` is present on `node`.
#[must_use]
pub fn has_finalizer(node: &Node, finalizer: &str) -> bool {
    node.finalizers().iter().any(|f| f == finalizer)
}

/// Append `finalizer` to the node's list. Returns `false` if already present.
pub fn add_finalizer(node: &mut Node, finalizer: &str) -> bool {
    if has_finalizer(node, finalizer) {
        return false;
    }
    node.finalizers_mut().push(finalizer.to_string());
    true
}

/// Drop every occurrence of `finalizer`. Returns `false` if it was absent.
pub fn strip_finalizer(node: &mut Node, finalizer: &str) -> bool {
    if !has_finalizer(node, finalizer) {
        return false;
    }
    node.finalizers_mut().retain(|f| f != finalizer);
    true
}

/// Add a finalizer to a node if not already present.
///
/// The operation is idempotent - calling it multiple times has no effect if
/// the finalizer is already present.
///
/// # Returns
///
/// `Ok(true)` if the node was written, `Ok(false)` if nothing was needed.
///
/// # Errors
///
/// Returns the [`NodeStoreError`] of the conditional write.
pub async fn ensure_finalizer(
    store: &dyn NodeStore,
    node: &Node,
    finalizer: &str,
) -> Result<bool, NodeStoreError> {
    let mut updated = node.clone();
    if !add_finalizer(&mut updated, finalizer) {
        return Ok(false);
    }

    let name = node.name_any();
    info!("Adding finalizer {} to Node {}", finalizer, name);
    store.replace(&updated).await?;
    info!("Successfully added finalizer {} to Node {}", finalizer, name);

    Ok(true)
}

/// Remove a finalizer from a node if present.
///
/// Only call this after the external cleanup it guards has succeeded.
///
/// # Returns
///
/// `Ok(true)` if the node was written, `Ok(false)` if nothing was needed.
///
/// # Errors
///
/// Returns the [`NodeStoreError`] of the conditional write.
pub async fn remove_finalizer(
    store: &dyn NodeStore,
    node: &Node,
    finalizer: &str,
) -> Result<bool, NodeStoreError> {
    let mut updated = node.clone();
    if !strip_finalizer(&mut updated, finalizer) {
        return Ok(false);
    }

    let name = node.name_any();
    info!("Removing finalizer {} from Node {}", finalizer, name);
    store.replace(&updated).await?;
    info!("Successfully removed finalizer {} from Node {}", finalizer, name);

    Ok(true)
}

#[cfg(test)]
#[path = "finalizers_tests.rs"]
mod finalizers_tests;
