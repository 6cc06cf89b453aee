// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Desired-state entry types derived from container labels.
//!
//! A container's labels produce zero or more [`DesiredEntry`] values. The
//! two variants have disjoint targets: a [`DnsEntry`] only touches a zone,
//! while a [`TunnelEntry`] touches both a zone (through its CNAME
//! projection) and a tunnel's ingress rule list. Routing happens by `match`
//! in the reconcilers.
//!
//! Comparison rules are asymmetric on purpose: DNS record names compare
//! case-sensitively, tunnel ingress hostnames compare case-insensitively.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::TUNNEL_DOMAIN_SUFFIX;

/// DNS record kinds the reconciler manages. Every other kind present in a
/// zone is invisible to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DnsRecordKind {
    /// IPv4 address record
    A,
    /// Canonical name record
    CNAME,
}

impl fmt::Display for DnsRecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::CNAME => write!(f, "CNAME"),
        }
    }
}

/// A single DNS record that should exist in a zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsEntry {
    /// Record kind (A or CNAME)
    pub kind: DnsRecordKind,
    /// Fully qualified record name
    pub name: String,
    /// Record content: an IP for A, a target name for CNAME
    pub value: String,
    /// Id of the zone the record belongs to
    pub zone_id: String,
    /// Whether Cloudflare proxies the record
    pub proxied: bool,
}

impl DnsEntry {
    /// Dedup/equality identity: `(kind, zone_id, name)`. The value and the
    /// proxied flag are deliberately excluded, so two entries writing
    /// different targets to the same name collide.
    #[must_use]
    pub fn identity(&self) -> (DnsRecordKind, &str, &str) {
        (self.kind, self.zone_id.as_str(), self.name.as_str())
    }
}

impl fmt::Display for DnsEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.kind, self.name, self.value)
    }
}

/// A public hostname routed through a Cloudflare Tunnel to an upstream
/// service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelEntry {
    /// Public hostname to expose
    pub hostname: String,
    /// Upstream service URL (http/https)
    pub service: String,
    /// Registrable zone name derived from the hostname
    pub zone_name: String,
    /// Resolved id of that zone
    pub zone_id: String,
    /// Tunnel carrying the traffic
    pub tunnel_id: String,
    /// Optional `noTLSVerify` override for the origin request; `None` means
    /// the label was absent, which is distinct from `Some(false)`
    pub no_tls_verify: Option<bool>,
}

impl TunnelEntry {
    /// The DNS projection of this hostname: a proxied CNAME pointing at the
    /// tunnel's `cfargotunnel.com` endpoint.
    #[must_use]
    pub fn dns_entry(&self) -> DnsEntry {
        DnsEntry {
            kind: DnsRecordKind::CNAME,
            name: self.hostname.clone(),
            value: tunnel_dns_value(&self.tunnel_id),
            zone_id: self.zone_id.clone(),
            proxied: true,
        }
    }
}

impl fmt::Display for TunnelEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.hostname, self.service)
    }
}

/// A desired-state entry derived from one container's labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesiredEntry {
    /// Tunnel-routed hostname: one ingress rule plus one proxied CNAME
    Tunnel(TunnelEntry),
    /// Plain DNS record declaration
    Dns(DnsEntry),
}

impl fmt::Display for DesiredEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tunnel(entry) => entry.fmt(f),
            Self::Dns(entry) => entry.fmt(f),
        }
    }
}

/// CNAME content for a tunnel-routed hostname.
#[must_use]
pub fn tunnel_dns_value(tunnel_id: &str) -> String {
    format!("{tunnel_id}.{TUNNEL_DOMAIN_SUFFIX}")
}

/// Registrable zone of a hostname: its last two dot-separated labels
/// (`api.svc.example.com` -> `example.com`).
///
/// Known limitation: multi-label public suffixes such as `co.uk` are not
/// recognized, so `shop.example.co.uk` derives `co.uk`. Any future
/// public-suffix-list handling replaces this one function.
#[must_use]
pub fn registrable_zone(hostname: &str) -> String {
    let labels: Vec<&str> = hostname.split('.').collect();
    if labels.len() <= 2 {
        return hostname.to_string();
    }
    labels[labels.len() - 2..].join(".")
}

#[cfg(test)]
#[path = "entries_tests.rs"]
mod entries_tests;
