// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Cloudflare v4 REST API client.
//!
//! Thin transport layer implementing [`RemoteGateway`] over reqwest with
//! Bearer-token auth. Every response is wrapped in the Cloudflare envelope
//! (`success`/`errors`/`result`); this module unwraps it, logs failures with
//! the operation and target identifiers, and converts them into the
//! non-throwing sentinel values the engine expects. There is no internal
//! retry: a failed mutation is corrected by a later event or the next scan.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info};

use super::{DnsRecord, IngressRule, RemoteGateway};
use crate::constants::CLOUDFLARE_API_BASE;
use crate::entries::DnsRecordKind;

/// Cloudflare API client.
///
/// Cheap to clone; the underlying reqwest client is reference-counted.
#[derive(Debug, Clone)]
pub struct CloudflareClient {
    http: HttpClient,
    base_url: String,
    api_token: String,
    /// Log full request/response bodies at debug level
    api_debug: bool,
}

/// One entry of the `errors` array in the Cloudflare response envelope.
#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// The Cloudflare response envelope.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ZoneWire {
    id: String,
}

#[derive(Debug, Deserialize)]
struct DnsRecordWire {
    id: String,
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct RecordIdWire {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TunnelConfigurationWire {
    #[serde(default)]
    config: Option<TunnelConfigWire>,
}

#[derive(Debug, Deserialize)]
struct TunnelConfigWire {
    #[serde(default)]
    ingress: Option<Vec<IngressRule>>,
}

impl CloudflareClient {
    /// Create a client against the production Cloudflare API.
    #[must_use]
    pub fn new(api_token: impl Into<String>, api_debug: bool) -> Self {
        Self::with_base_url(CLOUDFLARE_API_BASE, api_token, api_debug)
    }

    /// Create a client against an alternative base URL. Used by tests to
    /// point at a local mock server.
    #[must_use]
    pub fn with_base_url(
        base_url: impl Into<String>,
        api_token: impl Into<String>,
        api_debug: bool,
    ) -> Self {
        Self {
            http: HttpClient::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: api_token.into(),
            api_debug,
        }
    }

    /// Execute one API call and unwrap the response envelope into its
    /// `result` payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent, the response is not
    /// a success status, the envelope reports `success: false`, or the
    /// payload does not deserialize.
    async fn request<T: serde::de::DeserializeOwned, B: Serialize + std::fmt::Debug>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Option<T>> {
        let url = format!("{}{}", self.base_url, path);

        if self.api_debug {
            debug!(method = %method, url = %url, body = ?body, "cloudflare api request");
        }

        let mut request = self.http.request(method.clone(), &url);
        if let Some(payload) = body {
            request = request.json(payload);
        }

        let response = request
            .header("Authorization", format!("Bearer {}", self.api_token))
            .send()
            .await
            .context(format!("failed to send {method} {url}"))?;

        let status = response.status();
        let text = response.text().await.context("failed to read response body")?;

        if self.api_debug {
            debug!(status = %status, body = %text, "cloudflare api response");
        }

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            anyhow::bail!("{method} {url} returned HTTP {status}: {text}");
        }

        let envelope: ApiEnvelope<T> =
            serde_json::from_str(&text).context("failed to parse response envelope")?;
        if !envelope.success {
            let details: Vec<String> = envelope
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.code, e.message))
                .collect();
            anyhow::bail!("{method} {url} failed: {}", details.join("; "));
        }

        Ok(envelope.result)
    }
}

#[async_trait]
impl RemoteGateway for CloudflareClient {
    async fn zone_id(&self, zone_name: &str) -> Option<String> {
        let path = format!("/zones?name={zone_name}&per_page=1");
        match self.request::<Vec<ZoneWire>, ()>(Method::GET, &path, None).await {
            Ok(zones) => zones.and_then(|z| z.into_iter().next()).map(|z| z.id),
            Err(err) => {
                error!("GET /zones failed for zone \"{zone_name}\": {err:#}");
                None
            }
        }
    }

    async fn dns_records(&self, zone_id: &str) -> Option<Vec<DnsRecord>> {
        let path = format!("/zones/{zone_id}/dns_records");
        match self
            .request::<Vec<DnsRecordWire>, ()>(Method::GET, &path, None)
            .await
        {
            Ok(Some(records)) => Some(
                records
                    .into_iter()
                    .filter_map(|record| {
                        let kind = match record.kind.as_str() {
                            "A" => DnsRecordKind::A,
                            "CNAME" => DnsRecordKind::CNAME,
                            _ => return None,
                        };
                        Some(DnsRecord {
                            id: record.id,
                            name: record.name,
                            kind,
                            value: record.content,
                        })
                    })
                    .collect(),
            ),
            Ok(None) => None,
            Err(err) => {
                error!("GET /zones/{zone_id}/dns_records failed: {err:#}");
                None
            }
        }
    }

    async fn dns_record_id(&self, zone_id: &str, name: &str) -> Option<String> {
        let path = format!("/zones/{zone_id}/dns_records?name={name}&per_page=1");
        match self
            .request::<Vec<RecordIdWire>, ()>(Method::GET, &path, None)
            .await
        {
            Ok(records) => records.and_then(|r| r.into_iter().next()).map(|r| r.id),
            Err(err) => {
                error!("GET /zones/{zone_id}/dns_records failed for \"{name}\": {err:#}");
                None
            }
        }
    }

    async fn create_dns_record(
        &self,
        kind: DnsRecordKind,
        zone_id: &str,
        name: &str,
        value: &str,
        proxied: bool,
    ) -> bool {
        let path = format!("/zones/{zone_id}/dns_records");
        let body = json!({
            "type": kind.to_string(),
            "name": name,
            "content": value,
            "proxied": proxied,
        });
        match self
            .request::<serde_json::Value, serde_json::Value>(Method::POST, &path, Some(&body))
            .await
        {
            Ok(_) => {
                info!("created {kind} record \"{name}\" -> \"{value}\" in zone {zone_id}");
                true
            }
            Err(err) => {
                error!("POST /zones/{zone_id}/dns_records failed for \"{name}\": {err:#}");
                false
            }
        }
    }

    async fn delete_dns_record(&self, zone_id: &str, record_id: &str) -> bool {
        let path = format!("/zones/{zone_id}/dns_records/{record_id}");
        match self
            .request::<serde_json::Value, ()>(Method::DELETE, &path, None)
            .await
        {
            Ok(_) => {
                info!("deleted record {record_id} from zone {zone_id}");
                true
            }
            Err(err) => {
                error!("DELETE /zones/{zone_id}/dns_records/{record_id} failed: {err:#}");
                false
            }
        }
    }

    async fn tunnel_ingress(&self, account_id: &str, tunnel_id: &str) -> Option<Vec<IngressRule>> {
        let path = format!("/accounts/{account_id}/cfd_tunnel/{tunnel_id}/configurations");
        match self
            .request::<TunnelConfigurationWire, ()>(Method::GET, &path, None)
            .await
        {
            // An unconfigured tunnel (missing config or ingress) serves the
            // single default catch-all.
            Ok(Some(configuration)) => {
                let rules = configuration
                    .config
                    .and_then(|config| config.ingress)
                    .filter(|rules| !rules.is_empty())
                    .unwrap_or_else(|| vec![IngressRule::catch_all()]);
                Some(rules)
            }
            Ok(None) => None,
            Err(err) => {
                error!(
                    "GET /accounts/{account_id}/cfd_tunnel/{tunnel_id}/configurations failed: {err:#}"
                );
                None
            }
        }
    }

    async fn replace_tunnel_ingress(
        &self,
        account_id: &str,
        tunnel_id: &str,
        rules: &[IngressRule],
    ) -> bool {
        let path = format!("/accounts/{account_id}/cfd_tunnel/{tunnel_id}/configurations");
        let body = json!({ "config": { "ingress": rules } });
        match self
            .request::<serde_json::Value, serde_json::Value>(Method::PUT, &path, Some(&body))
            .await
        {
            Ok(_) => {
                info!(
                    "replaced ingress for tunnel {tunnel_id} ({} rules)",
                    rules.len()
                );
                true
            }
            Err(err) => {
                error!(
                    "PUT /accounts/{account_id}/cfd_tunnel/{tunnel_id}/configurations failed: {err:#}"
                );
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod client_tests;
