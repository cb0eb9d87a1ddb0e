// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

#![allow(unexpected_cfgs)]

//! # nodedns - Node DNS Operator for Kubernetes
//!
//! nodedns is a Kubernetes operator written in Rust that keeps one DNS `A`
//! record per node in sync with the node's internal IP addresses.
//!
//! ## Overview
//!
//! Whenever a node appears, changes its reported addresses, or is deleted, the
//! operator creates, updates, or deletes the record `<node name>` in the zone
//! derived from that name. A finalizer on the node guarantees the record is
//! removed before the node object disappears.
//!
//! ## Modules
//!
//! - [`reconcilers`] - The node reconciliation state machine
//! - [`provider`] - The DNS provider capability and the PowerDNS adapter
//! - [`zone`] - Zone resolution from node names
//! - [`nodes`] - Fetch/replace access to `Node` objects
//! - [`config`] - Startup configuration and provider selection
//! - [`metrics`] - Prometheus metrics
//!
//! ## Example
//!
//! ```rust,no_run
//! use nodedns::{context::Context, nodes::KubeNodeStore, provider::PowerDnsProvider};
//! use nodedns::reconcilers::reconcile_node;
//! use std::{sync::Arc, time::Duration};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = kube::Client::try_default().await?;
//! let dns = PowerDnsProvider::new("http://pdns:8081", "api-key")?;
//! let ctx = Context::new(
//!     Arc::new(KubeNodeStore::new(client)),
//!     Arc::new(dns),
//!     Duration::from_secs(300),
//! );
//!
//! reconcile_node(&ctx, "worker-1.example.com").await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod context;
pub mod dns_errors;
pub mod metrics;
pub mod nodes;
pub mod provider;
pub mod reconcilers;
pub mod zone;
