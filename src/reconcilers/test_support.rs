// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory fakes for the `NodeStore` and `DnsActions` seams.

use k8s_openapi::api::core::v1::{Node, NodeAddress, NodeStatus};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use k8s_openapi::jiff::Timestamp;
use kube::ResourceExt;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::context::Context;
use crate::dns_errors::DnsError;
use crate::nodes::{NodeStore, NodeStoreError};
use crate::provider::{DnsActions, DnsRecord};

// ============================================================================
// Node builders
// ============================================================================

pub fn address(kind: &str, ip: &str) -> NodeAddress {
    NodeAddress {
        type_: kind.to_string(),
        address: ip.to_string(),
    }
}

pub fn internal(ip: &str) -> NodeAddress {
    address("InternalIP", ip)
}

pub fn node(name: &str, addresses: Vec<NodeAddress>, finalizers: &[&str]) -> Node {
    Node {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            resource_version: Some("1".to_string()),
            finalizers: if finalizers.is_empty() {
                None
            } else {
                Some(finalizers.iter().map(|f| (*f).to_string()).collect())
            },
            ..Default::default()
        },
        spec: None,
        status: Some(NodeStatus {
            addresses: Some(addresses),
            ..Default::default()
        }),
    }
}

pub fn deleting(mut node: Node) -> Node {
    node.metadata.deletion_timestamp = Some(Time(Timestamp::now()));
    node
}

pub fn ips(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| (*s).to_string()).collect()
}

// ============================================================================
// NodeStore fake
// ============================================================================

/// Failure to inject into the next `replace` call.
#[derive(Clone, Copy, Debug)]
pub enum WriteFailure {
    Conflict,
    NotFound,
    Server,
}

#[derive(Default)]
pub struct FakeNodeStore {
    nodes: Mutex<HashMap<String, Node>>,
    next_write_failure: Mutex<Option<WriteFailure>>,
    writes: Mutex<u32>,
}

impl FakeNodeStore {
    pub fn with_node(node: Node) -> Self {
        let store = Self::default();
        store.put(node);
        store
    }

    pub fn put(&self, node: Node) {
        self.nodes.lock().unwrap().insert(node.name_any(), node);
    }

    pub fn node(&self, name: &str) -> Option<Node> {
        self.nodes.lock().unwrap().get(name).cloned()
    }

    pub fn fail_next_write(&self, failure: WriteFailure) {
        *self.next_write_failure.lock().unwrap() = Some(failure);
    }

    pub fn writes(&self) -> u32 {
        *self.writes.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl NodeStore for FakeNodeStore {
    async fn get(&self, name: &str) -> Result<Option<Node>, NodeStoreError> {
        Ok(self.node(name))
    }

    async fn replace(&self, node: &Node) -> Result<(), NodeStoreError> {
        let name = node.name_any();
        if let Some(failure) = self.next_write_failure.lock().unwrap().take() {
            return Err(match failure {
                WriteFailure::Conflict => NodeStoreError::Conflict { name },
                WriteFailure::NotFound => NodeStoreError::NotFound { name },
                WriteFailure::Server => NodeStoreError::Api {
                    name,
                    source: kube::Error::Api(Box::new(kube::core::Status {
                        status: Some(kube::core::response::StatusSummary::Failure),
                        message: "etcdserver: request timed out".to_string(),
                        reason: "InternalError".to_string(),
                        code: 500,
                        ..Default::default()
                    })),
                },
            });
        }

        *self.writes.lock().unwrap() += 1;
        self.put(node.clone());
        Ok(())
    }
}

// ============================================================================
// DnsActions fake
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DnsCall {
    Get(String, String),
    Create(String, String, Vec<String>),
    Update(String, String, Vec<String>),
    Delete(String, String),
}

impl DnsCall {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::Get(..))
    }
}

/// Provider holding at most one A record per name.
#[derive(Default)]
pub struct FakeDns {
    records: Mutex<HashMap<String, Vec<String>>>,
    calls: Mutex<Vec<DnsCall>>,
    failing: Mutex<HashSet<&'static str>>,
}

impl FakeDns {
    pub fn with_record(name: &str, contents: &[&str]) -> Self {
        let dns = Self::default();
        dns.records
            .lock()
            .unwrap()
            .insert(name.to_string(), ips(contents));
        dns
    }

    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().unwrap().insert(operation);
    }

    pub fn heal(&self) {
        self.failing.lock().unwrap().clear();
    }

    pub fn calls(&self) -> Vec<DnsCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutations(&self) -> Vec<DnsCall> {
        self.calls().into_iter().filter(DnsCall::is_mutation).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn record(&self, name: &str) -> Option<Vec<String>> {
        self.records.lock().unwrap().get(name).cloned()
    }

    fn check(&self, operation: &'static str) -> Result<(), DnsError> {
        if self.failing.lock().unwrap().contains(operation) {
            return Err(DnsError::ProviderApi {
                status: "500 Internal Server Error".to_string(),
                body: String::new(),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DnsActions for FakeDns {
    fn provider_name(&self) -> &'static str {
        "fake"
    }

    async fn get_record(&self, name: &str, zone: &str) -> Result<DnsRecord, DnsError> {
        self.calls
            .lock()
            .unwrap()
            .push(DnsCall::Get(name.to_string(), zone.to_string()));
        self.check("get")?;

        Ok(self
            .record(name)
            .map_or_else(DnsRecord::not_found, |contents| DnsRecord {
                found: true,
                record_type: Some("A".to_string()),
                contents,
            }))
    }

    async fn create_record(
        &self,
        name: &str,
        zone: &str,
        contents: &[String],
    ) -> Result<(), DnsError> {
        self.calls.lock().unwrap().push(DnsCall::Create(
            name.to_string(),
            zone.to_string(),
            contents.to_vec(),
        ));
        self.check("create")?;
        self.records
            .lock()
            .unwrap()
            .insert(name.to_string(), contents.to_vec());
        Ok(())
    }

    async fn update_record(
        &self,
        name: &str,
        zone: &str,
        contents: &[String],
    ) -> Result<(), DnsError> {
        self.calls.lock().unwrap().push(DnsCall::Update(
            name.to_string(),
            zone.to_string(),
            contents.to_vec(),
        ));
        self.check("update")?;
        self.records
            .lock()
            .unwrap()
            .insert(name.to_string(), contents.to_vec());
        Ok(())
    }

    async fn delete_record(&self, name: &str, zone: &str) -> Result<(), DnsError> {
        self.calls
            .lock()
            .unwrap()
            .push(DnsCall::Delete(name.to_string(), zone.to_string()));
        self.check("delete")?;
        self.records.lock().unwrap().remove(name);
        Ok(())
    }
}

pub fn context(store: &Arc<FakeNodeStore>, dns: &Arc<FakeDns>) -> Context {
    Context::new(store.clone(), dns.clone(), Duration::from_secs(300))
}
