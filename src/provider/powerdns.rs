// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! PowerDNS HTTP API adapter.
//!
//! Every operation is a single request against the zone endpoint
//! `{server}/api/v1/servers/localhost/zones/{zone}.`:
//!
//! | Operation | Method | Body |
//! |-----------|--------|------|
//! | get       | `GET`  | none |
//! | create/update | `PATCH` | rrset with `changetype: REPLACE` |
//! | delete    | `PATCH` | rrset with `changetype: DELETE` |
//!
//! Requests authenticate with the static `X-API-Key` header and carry a fixed
//! timeout. Nothing is retried here; failures are classified into
//! [`DnsError`] and handed back to the reconciler.

use reqwest::{Client as HttpClient, Method};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

use super::{DnsActions, DnsRecord};
use crate::constants::{
    CHANGETYPE_DELETE, CHANGETYPE_REPLACE, DEFAULT_DNS_RECORD_TTL_SECS,
    DNS_PROVIDER_TIMEOUT_SECS, POWERDNS_API_KEY_HEADER, POWERDNS_SERVER_ID, RECORD_TYPE_A,
};
use crate::dns_errors::DnsError;
use crate::metrics;

/// Provider name used in logs and metrics
const PROVIDER_NAME: &str = "powerdns";

// ============================================================================
// Wire types
// ============================================================================

/// Zone document returned by `GET .../zones/{zone}.`
#[derive(Deserialize, Debug)]
struct ZoneResponse {
    rrsets: Vec<RrSet>,
}

#[derive(Deserialize, Debug)]
struct RrSet {
    name: String,
    #[serde(rename = "type")]
    record_type: String,
    records: Vec<RecordContent>,
}

#[derive(Deserialize, Debug)]
struct RecordContent {
    content: String,
}

/// Body of a `PATCH .../zones/{zone}.` request
#[derive(Serialize, Debug)]
pub(crate) struct PatchRequest {
    rrsets: Vec<RrSetChange>,
}

#[derive(Serialize, Debug)]
struct RrSetChange {
    changetype: &'static str,
    #[serde(rename = "type")]
    record_type: &'static str,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    ttl: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    records: Option<Vec<RecordChange>>,
}

#[derive(Serialize, Debug)]
struct RecordChange {
    content: String,
    disabled: bool,
}

impl PatchRequest {
    /// Full replace of the A rrset at `name` with `contents`.
    pub(crate) fn replace(name: &str, contents: &[String]) -> Self {
        Self {
            rrsets: vec![RrSetChange {
                changetype: CHANGETYPE_REPLACE,
                record_type: RECORD_TYPE_A,
                name: rooted(name),
                ttl: Some(DEFAULT_DNS_RECORD_TTL_SECS),
                records: Some(
                    contents
                        .iter()
                        .map(|content| RecordChange {
                            content: content.clone(),
                            disabled: false,
                        })
                        .collect(),
                ),
            }],
        }
    }

    /// Removal of the A rrset at `name`.
    pub(crate) fn delete(name: &str) -> Self {
        Self {
            rrsets: vec![RrSetChange {
                changetype: CHANGETYPE_DELETE,
                record_type: RECORD_TYPE_A,
                name: rooted(name),
                ttl: None,
                records: None,
            }],
        }
    }
}

/// PowerDNS names are always absolute.
fn rooted(name: &str) -> String {
    format!("{name}.")
}

/// Build the API base URL from a server address
///
/// Converts "pdns.dns.svc.cluster.local:8081" or "pdns:8081"
/// to `<http://pdns.dns.svc.cluster.local:8081>` or `<http://pdns:8081>`
pub(crate) fn build_api_url(server: &str) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        server.trim_end_matches('/').to_string()
    } else {
        format!("http://{}", server.trim_end_matches('/'))
    }
}

/// Extract the A record at `record_name` from a zone document.
fn find_a_record(zone: ZoneResponse, record_name: &str) -> DnsRecord {
    let wanted = rooted(record_name);

    zone.rrsets
        .into_iter()
        .find(|rrset| rrset.name == wanted && rrset.record_type == RECORD_TYPE_A)
        .map_or_else(DnsRecord::not_found, |rrset| DnsRecord {
            found: true,
            record_type: Some(rrset.record_type),
            contents: rrset.records.into_iter().map(|r| r.content).collect(),
        })
}

// ============================================================================
// Provider
// ============================================================================

/// [`DnsActions`] backed by the PowerDNS authoritative server HTTP API.
///
/// The HTTP client is built once and reused by every reconciliation; the
/// provider holds no per-call state. The API key is never logged.
#[derive(Clone)]
pub struct PowerDnsProvider {
    client: HttpClient,
    base_url: String,
    api_key: String,
}

impl PowerDnsProvider {
    /// Create a provider with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (TLS backend init).
    pub fn new(server: &str, api_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_timeout(
            server,
            api_key,
            Duration::from_secs(DNS_PROVIDER_TIMEOUT_SECS),
        )
    }

    /// Create a provider with a custom request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (TLS backend init).
    pub fn with_timeout(
        server: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: build_api_url(server),
            api_key: api_key.into(),
        })
    }

    /// Zone endpoint for `zone`, always with a trailing dot.
    #[must_use]
    pub fn zone_url(&self, zone: &str) -> String {
        format!(
            "{}/api/v1/servers/{POWERDNS_SERVER_ID}/zones/{zone}.",
            self.base_url
        )
    }

    /// Send one request and return the response body of a 2xx answer.
    async fn request(
        &self,
        operation: &'static str,
        method: Method,
        url: &str,
        body: Option<&PatchRequest>,
    ) -> Result<String, DnsError> {
        let start = Instant::now();
        let result = self.request_internal(method, url, body).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.error_class(),
        };
        metrics::record_dns_request(PROVIDER_NAME, operation, outcome, start.elapsed());

        result
    }

    async fn request_internal(
        &self,
        method: Method,
        url: &str,
        body: Option<&PatchRequest>,
    ) -> Result<String, DnsError> {
        debug!(
            method = %method,
            url = %url,
            body = ?body,
            "HTTP API request to PowerDNS"
        );

        let mut request = self
            .client
            .request(method.clone(), url)
            .header(POWERDNS_API_KEY_HEADER, &self.api_key);

        if let Some(body_data) = body {
            request = request.json(body_data);
        }

        let response = request.send().await.map_err(|e| {
            error!(
                method = %method,
                url = %url,
                timeout = e.is_timeout(),
                connect = e.is_connect(),
                error = %e,
                "HTTP request to PowerDNS failed"
            );
            DnsError::Transport {
                endpoint: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(
                method = %method,
                url = %url,
                status = %status,
                error = %error_text,
                "PowerDNS API request failed"
            );
            return Err(DnsError::ProviderApi {
                status: status.to_string(),
                body: error_text,
            });
        }

        let text = response.text().await.map_err(|e| DnsError::Transport {
            endpoint: url.to_string(),
            reason: format!("failed to read response body: {e}"),
        })?;

        debug!(
            method = %method,
            url = %url,
            status = %status,
            response_len = text.len(),
            "PowerDNS API request successful"
        );

        Ok(text)
    }

    async fn replace_record(
        &self,
        operation: &'static str,
        name: &str,
        zone: &str,
        contents: &[String],
    ) -> Result<(), DnsError> {
        let url = self.zone_url(zone);
        let body = PatchRequest::replace(name, contents);

        self.request(operation, Method::PATCH, &url, Some(&body))
            .await
            .map(|_| ())
    }
}

#[async_trait::async_trait]
impl DnsActions for PowerDnsProvider {
    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn get_record(&self, name: &str, zone: &str) -> Result<DnsRecord, DnsError> {
        let url = self.zone_url(zone);
        let text = self.request("get", Method::GET, &url, None).await?;

        let zone_doc: ZoneResponse = serde_json::from_str(&text).map_err(|e| {
            warn!(
                url = %url,
                error = %e,
                "PowerDNS response did not match the expected zone schema; provider contract may have changed"
            );
            DnsError::ProviderProtocol {
                endpoint: url.clone(),
                reason: e.to_string(),
            }
        })?;

        Ok(find_a_record(zone_doc, name))
    }

    async fn create_record(
        &self,
        name: &str,
        zone: &str,
        contents: &[String],
    ) -> Result<(), DnsError> {
        self.replace_record("create", name, zone, contents).await
    }

    async fn update_record(
        &self,
        name: &str,
        zone: &str,
        contents: &[String],
    ) -> Result<(), DnsError> {
        self.replace_record("update", name, zone, contents).await
    }

    async fn delete_record(&self, name: &str, zone: &str) -> Result<(), DnsError> {
        let url = self.zone_url(zone);
        let body = PatchRequest::delete(name);

        self.request("delete", Method::PATCH, &url, Some(&body))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
#[path = "powerdns_tests.rs"]
mod powerdns_tests;
