// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-tunnel accumulator of pending ingress rule mutations.
//!
//! A [`TunnelAggregate`] holds the tunnel's full ingress rule list for one
//! pass, mutates it in memory, and - only if something actually changed -
//! replaces the remote list in a single call on
//! [`commit`](TunnelAggregate::commit).
//!
//! The last rule is always the hostname-less catch-all and must stay last
//! across every insert and remove. Hostname matching is case-insensitive
//! here, unlike DNS record name comparison in the zone aggregate.

use tracing::{error, info, warn};

use crate::cloudflare::{IngressRule, OriginRequest, RemoteGateway};
use crate::entries::TunnelEntry;
use crate::errors::EntryError;

/// Pending ingress state for one tunnel.
pub struct TunnelAggregate<'a, G> {
    gateway: &'a G,
    account_id: String,
    tunnel_id: String,
    rules: Vec<IngressRule>,
    dirty: bool,
}

impl<'a, G: RemoteGateway> TunnelAggregate<'a, G> {
    /// Create the aggregate for a tunnel, fetching its current rule list.
    /// An unconfigured tunnel starts from the single catch-all rule.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::TunnelIngressUnavailable`] when the
    /// configuration fetch fails; the caller skips the entry that needed
    /// this tunnel.
    pub async fn load(
        gateway: &'a G,
        account_id: &str,
        tunnel_id: &str,
    ) -> Result<Self, EntryError> {
        let rules = gateway.tunnel_ingress(account_id, tunnel_id).await.ok_or_else(|| {
            EntryError::TunnelIngressUnavailable {
                account_id: account_id.to_string(),
                tunnel_id: tunnel_id.to_string(),
            }
        })?;

        Ok(Self {
            gateway,
            account_id: account_id.to_string(),
            tunnel_id: tunnel_id.to_string(),
            rules,
            dirty: false,
        })
    }

    /// Insert a rule for the entry's hostname immediately before the
    /// catch-all. A hostname already routed (case-insensitive) is an
    /// informational no-op.
    pub fn add_ingress(&mut self, entry: &TunnelEntry) {
        if self.contains_hostname(&entry.hostname) {
            info!(
                "Public hostname \"{}\" for tunnel \"{}\" already exists",
                entry.hostname, entry.tunnel_id
            );
            return;
        }

        let position = self.rules.len().saturating_sub(1);
        self.rules.insert(position, ingress_rule(entry));
        info!(
            "Adding public hostname \"{}\" -> \"{}\" for tunnel \"{}\"",
            entry.hostname, entry.service, entry.tunnel_id
        );
        self.dirty = true;
    }

    /// Remove every rule matching the entry's hostname
    /// (case-insensitive). Nothing matching is a warning, not an error.
    pub fn remove_ingress(&mut self, entry: &TunnelEntry) {
        info!(
            "Removing public hostname \"{}\" for tunnel \"{}\"",
            entry.hostname, entry.tunnel_id
        );
        let hostname_lower = entry.hostname.to_lowercase();
        let before = self.rules.len();
        self.rules.retain(|rule| {
            rule.hostname
                .as_deref()
                .map_or(true, |hostname| hostname.to_lowercase() != hostname_lower)
        });

        if self.rules.len() == before {
            warn!(
                "No public hostname \"{}\" for tunnel \"{}\"",
                entry.hostname, entry.tunnel_id
            );
        } else {
            self.dirty = true;
        }
    }

    /// Whether the in-memory list differs from what was fetched.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The current in-memory rule list.
    #[must_use]
    pub fn rules(&self) -> &[IngressRule] {
        &self.rules
    }

    /// Replace the remote rule list in one call, if anything changed.
    pub async fn commit(&mut self) {
        if !self.dirty {
            return;
        }
        info!(
            "Updating ingress for tunnel {} ({} rules)",
            self.tunnel_id,
            self.rules.len()
        );
        if !self
            .gateway
            .replace_tunnel_ingress(&self.account_id, &self.tunnel_id, &self.rules)
            .await
        {
            error!(
                "Failed to update tunnel ingress for tunnel \"{}\"",
                self.tunnel_id
            );
        }
        self.dirty = false;
    }

    fn contains_hostname(&self, hostname: &str) -> bool {
        let hostname_lower = hostname.to_lowercase();
        self.rules.iter().any(|rule| {
            rule.hostname
                .as_deref()
                .is_some_and(|existing| existing.to_lowercase() == hostname_lower)
        })
    }
}

/// Build the ingress rule body for a tunnel-routed hostname. The origin
/// request is present but empty when no override is set.
fn ingress_rule(entry: &TunnelEntry) -> IngressRule {
    IngressRule {
        service: entry.service.clone(),
        hostname: Some(entry.hostname.clone()),
        origin_request: Some(OriginRequest {
            no_tls_verify: entry.no_tls_verify,
        }),
    }
}

#[cfg(test)]
#[path = "tunnel_tests.rs"]
mod tunnel_tests;
