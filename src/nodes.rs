// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Access to `Node` objects in the Kubernetes API.
//!
//! The reconciler needs exactly two operations: fetch a node by name and
//! write it back with optimistic concurrency. They sit behind [`NodeStore`]
//! so the reconciliation logic can run against an in-memory store in tests.

use k8s_openapi::api::core::v1::Node;
use kube::api::PostParams;
use kube::{Api, Client, ResourceExt};
use thiserror::Error;
use tracing::debug;

/// Failures of a [`NodeStore`] operation.
///
/// `Conflict` and `NotFound` on a write are expected under concurrent
/// modification and are turned into a requeue by the reconciler.
#[derive(Error, Debug)]
pub enum NodeStoreError {
    /// The node changed since it was read (HTTP 409)
    #[error("Node '{name}' was modified since it was read")]
    Conflict {
        /// Node name
        name: String,
    },

    /// The node was deleted since it was read (HTTP 404)
    #[error("Node '{name}' no longer exists")]
    NotFound {
        /// Node name
        name: String,
    },

    /// Any other API failure
    #[error("Kubernetes API error for node '{name}': {source}")]
    Api {
        /// Node name
        name: String,
        /// Underlying client error
        #[source]
        source: kube::Error,
    },
}

impl NodeStoreError {
    /// Map a kube error for `name` onto the store error taxonomy.
    #[must_use]
    pub fn from_kube(name: &str, err: kube::Error) -> Self {
        match &err {
            kube::Error::Api(api_err) if api_err.code == 409 => Self::Conflict {
                name: name.to_string(),
            },
            kube::Error::Api(api_err) if api_err.code == 404 => Self::NotFound {
                name: name.to_string(),
            },
            _ => Self::Api {
                name: name.to_string(),
                source: err,
            },
        }
    }

    /// Whether this failure should requeue the node rather than surface.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::NotFound { .. })
    }
}

/// Fetch and conditionally update nodes.
#[async_trait::async_trait]
pub trait NodeStore: Send + Sync {
    /// Fetch a node by name. `Ok(None)` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`NodeStoreError::Api`] for any failure other than not-found.
    async fn get(&self, name: &str) -> Result<Option<Node>, NodeStoreError>;

    /// Write `node` back, failing if it changed since it was read.
    ///
    /// # Errors
    ///
    /// Returns [`NodeStoreError::Conflict`] or [`NodeStoreError::NotFound`]
    /// for concurrent modification, [`NodeStoreError::Api`] otherwise.
    async fn replace(&self, node: &Node) -> Result<(), NodeStoreError>;
}

/// [`NodeStore`] backed by the Kubernetes API server.
///
/// `replace` sends the node's `resourceVersion`, so the API server rejects the
/// write with 409 if the node changed in between.
#[derive(Clone)]
pub struct KubeNodeStore {
    api: Api<Node>,
}

impl KubeNodeStore {
    /// Create a store over the cluster-scoped `Node` API.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            api: Api::all(client),
        }
    }
}

#[async_trait::async_trait]
impl NodeStore for KubeNodeStore {
    async fn get(&self, name: &str) -> Result<Option<Node>, NodeStoreError> {
        self.api
            .get_opt(name)
            .await
            .map_err(|e| NodeStoreError::from_kube(name, e))
    }

    async fn replace(&self, node: &Node) -> Result<(), NodeStoreError> {
        let name = node.name_any();
        debug!(
            node = %name,
            resource_version = ?node.resource_version(),
            "Replacing node"
        );

        self.api
            .replace(&name, &PostParams::default(), node)
            .await
            .map(|_| ())
            .map_err(|e| NodeStoreError::from_kube(&name, e))
    }
}

#[cfg(test)]
#[path = "nodes_tests.rs"]
mod nodes_tests;
