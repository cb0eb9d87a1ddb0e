// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Process configuration.
//!
//! Configuration is read once at startup from command-line flags or their
//! environment variables and never re-read. The DNS provider selector is
//! resolved here into the single [`DnsActions`] instance the controller uses
//! for the lifetime of the process.
//!
//! | Flag | Environment | Default |
//! |------|-------------|---------|
//! | `--dns-type` | `DNS_TYPE` | required |
//! | `--powerdns-server` | `POWERDNS_SERVER` | required for `powerdns` |
//! | `--powerdns-key` | `POWERDNS_KEY` | required for `powerdns` |
//! | `--resync-interval-secs` | `RESYNC_INTERVAL_SECS` | `300` |
//! | `--metrics-addr` | `METRICS_ADDR` | `0.0.0.0:8080` |

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::constants::{DEFAULT_METRICS_ADDR, DEFAULT_RESYNC_INTERVAL_SECS};
use crate::provider::powerdns::build_api_url;
use crate::provider::{DnsActions, PowerDnsProvider};

/// Errors detected while turning configuration into a provider.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A setting the selected provider needs was not given
    #[error("Missing required setting --{flag} (env {env}) for DNS provider '{provider}'")]
    MissingSetting {
        /// Provider that needs the setting
        provider: &'static str,
        /// Command-line flag name
        flag: &'static str,
        /// Environment variable name
        env: &'static str,
    },

    /// The provider endpoint is not a valid URL
    #[error("Invalid DNS provider endpoint '{value}': {reason}")]
    InvalidEndpoint {
        /// The configured value
        value: String,
        /// Parse failure detail
        reason: String,
    },

    /// The HTTP client for the provider could not be built
    #[error("Failed to build HTTP client for DNS provider: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Supported DNS providers.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    /// PowerDNS authoritative server HTTP API
    #[value(name = "powerdns")]
    PowerDns,
}

impl ProviderKind {
    /// Name used in logs and error messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PowerDns => "powerdns",
        }
    }
}

/// Command-line / environment configuration.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "nodedns",
    version,
    about = "Keep DNS A records in sync with Kubernetes node addresses"
)]
pub struct Config {
    /// DNS provider to manage records in
    #[arg(long, env = "DNS_TYPE", value_enum, ignore_case = true)]
    pub dns_type: ProviderKind,

    /// PowerDNS API endpoint, e.g. `http://pdns.dns.svc:8081`
    #[arg(long, env = "POWERDNS_SERVER")]
    pub powerdns_server: Option<String>,

    /// PowerDNS API key sent in the `X-API-Key` header
    #[arg(long, env = "POWERDNS_KEY", hide_env_values = true)]
    pub powerdns_key: Option<String>,

    /// Seconds to wait before re-checking a converged node
    #[arg(long, env = "RESYNC_INTERVAL_SECS", default_value_t = DEFAULT_RESYNC_INTERVAL_SECS)]
    pub resync_interval_secs: u64,

    /// Listen address for the `/metrics` and `/healthz` endpoints
    #[arg(long, env = "METRICS_ADDR", default_value = DEFAULT_METRICS_ADDR)]
    pub metrics_addr: SocketAddr,
}

/// Validated, provider-specific settings.
#[derive(Clone, PartialEq, Eq)]
pub enum ProviderSettings {
    /// PowerDNS endpoint and credential
    PowerDns {
        /// Normalized API base URL
        server: String,
        /// Static API key
        api_key: String,
    },
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PowerDns { server, .. } => f
                .debug_struct("PowerDns")
                .field("server", server)
                .field("api_key", &"<redacted>")
                .finish(),
        }
    }
}

fn required(
    value: Option<&String>,
    provider: ProviderKind,
    flag: &'static str,
    env: &'static str,
) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .ok_or(ConfigError::MissingSetting {
            provider: provider.as_str(),
            flag,
            env,
        })
}

impl Config {
    /// Resync interval as a [`Duration`].
    #[must_use]
    pub fn resync_interval(&self) -> Duration {
        Duration::from_secs(self.resync_interval_secs)
    }

    /// Validate the settings of the selected provider.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSetting`] or
    /// [`ConfigError::InvalidEndpoint`].
    pub fn provider_settings(&self) -> Result<ProviderSettings, ConfigError> {
        match self.dns_type {
            ProviderKind::PowerDns => {
                let server = required(
                    self.powerdns_server.as_ref(),
                    self.dns_type,
                    "powerdns-server",
                    "POWERDNS_SERVER",
                )?;
                let api_key = required(
                    self.powerdns_key.as_ref(),
                    self.dns_type,
                    "powerdns-key",
                    "POWERDNS_KEY",
                )?;

                let server = build_api_url(&server);
                url::Url::parse(&server).map_err(|e| ConfigError::InvalidEndpoint {
                    value: server.clone(),
                    reason: e.to_string(),
                })?;

                Ok(ProviderSettings::PowerDns { server, api_key })
            }
        }
    }

    /// Build the one DNS provider this process will use.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the settings are invalid or the HTTP
    /// client cannot be created.
    pub fn build_provider(&self) -> Result<Arc<dyn DnsActions>, ConfigError> {
        match self.provider_settings()? {
            ProviderSettings::PowerDns { server, api_key } => {
                Ok(Arc::new(PowerDnsProvider::new(&server, api_key)?))
            }
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
