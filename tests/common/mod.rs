// Common test utilities for integration tests

use k8s_openapi::api::core::v1::Node;
use kube::{
    api::{Api, DeleteParams, Patch, PatchParams, PostParams},
    client::Client,
};
use serde_json::json;
use std::time::Duration;
use tokio::time::sleep;

/// Get a Kubernetes client or skip the test if not in a cluster
pub async fn get_kube_client_or_skip() -> Option<Client> {
    match Client::try_default().await {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("Skipping integration test: not running in Kubernetes cluster: {}", e);
            None
        }
    }
}

/// Register a fake node object with the given internal addresses.
///
/// Nothing runs on it; the API server just stores the object.
pub async fn create_test_node(
    client: &Client,
    name: &str,
    internal_ips: &[&str],
) -> Result<Node, Box<dyn std::error::Error>> {
    let nodes: Api<Node> = Api::all(client.clone());

    let addresses: Vec<_> = internal_ips
        .iter()
        .map(|ip| json!({ "type": "InternalIP", "address": ip }))
        .collect();

    let node: Node = serde_json::from_value(json!({
        "apiVersion": "v1",
        "kind": "Node",
        "metadata": {
            "name": name,
            "labels": {
                "test": "integration",
                "managed-by": "nodedns-test"
            }
        },
        "spec": {
            "taints": [{ "key": "nodedns-test", "effect": "NoSchedule" }]
        },
        "status": {
            "addresses": addresses
        }
    }))?;

    match nodes.create(&PostParams::default(), &node).await {
        Ok(created) => {
            println!("Created test node: {}", name);
            Ok(created)
        }
        Err(kube::Error::Api(ae)) if ae.code == 409 => {
            println!("Test node already exists: {}", name);
            Ok(nodes.get(name).await?)
        }
        Err(e) => Err(Box::new(e)),
    }
}

/// Delete a test node, stripping all finalizers first so nothing lingers
pub async fn cleanup_test_node(
    client: &Client,
    name: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let nodes: Api<Node> = Api::all(client.clone());

    let strip = json!({ "metadata": { "finalizers": null } });
    let _ = nodes
        .patch(name, &PatchParams::default(), &Patch::Merge(&strip))
        .await;

    match nodes.delete(name, &DeleteParams::default()).await {
        Ok(_) => {
            println!("Deleted test node: {}", name);
            Ok(())
        }
        Err(kube::Error::Api(ae)) if ae.code == 404 => Ok(()),
        Err(e) => Err(Box::new(e)),
    }
}

/// Wait for a specified duration
pub async fn wait_for_ready(duration: Duration) {
    println!("Waiting {:?} for resources to be ready...", duration);
    sleep(duration).await;
}
