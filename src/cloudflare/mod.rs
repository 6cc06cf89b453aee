// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Cloudflare remote-resource gateway.
//!
//! The reconcilers never talk HTTP; they program against [`RemoteGateway`],
//! the capability interface to the two remote resources tunnely manages
//! (zone record sets and tunnel ingress rule lists). Three implementations
//! compose like the layers of an onion:
//!
//! - [`client::CloudflareClient`] - the real thing, speaking the Cloudflare
//!   v4 REST API over reqwest
//! - [`dry_run::DryRunGateway`] - skips every mutating call, logging what
//!   would have been done
//! - [`cache::CachedGateway`] - pass-scoped memoization of the read calls,
//!   so a scan over hundreds of containers costs one remote read per
//!   distinct zone and tunnel
//!
//! Every operation is non-throwing: remote failures are logged here at the
//! boundary and surface as `None`/`false`. Callers decide whether an absent
//! value is fatal to the entry they are processing.

pub mod cache;
pub mod client;
pub mod dry_run;

pub use cache::CachedGateway;
pub use client::CloudflareClient;
pub use dry_run::DryRunGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::constants::CATCH_ALL_SERVICE;
use crate::entries::DnsRecordKind;

/// A DNS record as it exists remotely, reduced to the fields the
/// reconcilers compare on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    /// Remote record id, needed for deletion
    pub id: String,
    /// Fully qualified record name
    pub name: String,
    /// Record kind; listings are pre-filtered to A/CNAME
    pub kind: DnsRecordKind,
    /// Record content
    pub value: String,
}

/// One tunnel ingress rule. The last rule of a configuration is always the
/// hostname-less catch-all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressRule {
    /// Upstream service URL, or a `http_status:` directive for the catch-all
    pub service: String,
    /// Public hostname this rule matches; absent on the catch-all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// Origin request overrides; serialized as `{}` when present but empty
    #[serde(rename = "originRequest", skip_serializing_if = "Option::is_none")]
    pub origin_request: Option<OriginRequest>,
}

impl IngressRule {
    /// The default rule every ingress list must end with.
    #[must_use]
    pub fn catch_all() -> Self {
        Self {
            service: CATCH_ALL_SERVICE.to_string(),
            hostname: None,
            origin_request: None,
        }
    }

    /// Whether this rule is the hostname-less catch-all.
    #[must_use]
    pub fn is_catch_all(&self) -> bool {
        self.hostname.is_none()
    }
}

/// Origin request settings carried on an ingress rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginRequest {
    /// Disable TLS verification towards the origin
    #[serde(rename = "noTLSVerify", skip_serializing_if = "Option::is_none")]
    pub no_tls_verify: Option<bool>,
}

/// Capability interface to the remote DNS and tunnel resources.
///
/// All failure paths are non-throwing: lookups return `None` and mutations
/// return `false`, with the diagnostic logged by the implementation. The
/// transport (auth, HTTP semantics, status mapping) is entirely the
/// implementor's concern.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Resolve a zone name to its id. `None` when the zone does not exist
    /// on the account or the lookup failed.
    async fn zone_id(&self, zone_name: &str) -> Option<String>;

    /// List a zone's A and CNAME records. `None` when the zone id is
    /// unknown or the listing failed.
    async fn dns_records(&self, zone_id: &str) -> Option<Vec<DnsRecord>>;

    /// Find the id of the record with the given name. `None` when absent.
    async fn dns_record_id(&self, zone_id: &str, name: &str) -> Option<String>;

    /// Create a DNS record. `false` on failure.
    async fn create_dns_record(
        &self,
        kind: DnsRecordKind,
        zone_id: &str,
        name: &str,
        value: &str,
        proxied: bool,
    ) -> bool;

    /// Delete a DNS record by id. `false` on failure.
    async fn delete_dns_record(&self, zone_id: &str, record_id: &str) -> bool;

    /// Fetch a tunnel's ingress rule list. A tunnel with no configured
    /// ingress yields the single-element catch-all list; `None` means the
    /// tunnel is unknown or the fetch failed.
    async fn tunnel_ingress(&self, account_id: &str, tunnel_id: &str) -> Option<Vec<IngressRule>>;

    /// Replace a tunnel's entire ingress rule list. `false` on failure.
    async fn replace_tunnel_ingress(
        &self,
        account_id: &str,
        tunnel_id: &str,
        rules: &[IngressRule],
    ) -> bool;
}

/// The one gateway capability the label parser needs: zone name to id.
///
/// Split out so the parser stays unit-testable with a two-line resolver
/// instead of a full gateway.
#[async_trait]
pub trait ZoneResolver: Send + Sync {
    /// Resolve a zone name to its id, `None` when unknown.
    async fn resolve_zone_id(&self, zone_name: &str) -> Option<String>;
}

#[async_trait]
impl<G: RemoteGateway> ZoneResolver for G {
    async fn resolve_zone_id(&self, zone_name: &str) -> Option<String> {
        self.zone_id(zone_name).await
    }
}
