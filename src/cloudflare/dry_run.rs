// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Dry-run gateway decorator.
//!
//! Wraps a [`RemoteGateway`] so that every mutating operation is skipped and
//! logged as "would ..." while reads pass through untouched. Diffing,
//! caching and aggregation behave exactly as in a live run; only the final
//! writes are suppressed, which makes `--dry-run` output a faithful preview.

use async_trait::async_trait;
use tracing::info;

use super::{DnsRecord, IngressRule, RemoteGateway};
use crate::entries::DnsRecordKind;

/// Mutation-skipping decorator over a [`RemoteGateway`].
pub struct DryRunGateway<G> {
    inner: G,
}

impl<G: RemoteGateway> DryRunGateway<G> {
    /// Wrap a gateway; reads delegate to it, writes are logged no-ops.
    #[must_use]
    pub fn new(inner: G) -> Self {
        Self { inner }
    }

    /// The wrapped gateway.
    #[must_use]
    pub fn inner(&self) -> &G {
        &self.inner
    }
}

#[async_trait]
impl<G: RemoteGateway> RemoteGateway for DryRunGateway<G> {
    async fn zone_id(&self, zone_name: &str) -> Option<String> {
        self.inner.zone_id(zone_name).await
    }

    async fn dns_records(&self, zone_id: &str) -> Option<Vec<DnsRecord>> {
        self.inner.dns_records(zone_id).await
    }

    async fn dns_record_id(&self, zone_id: &str, name: &str) -> Option<String> {
        self.inner.dns_record_id(zone_id, name).await
    }

    async fn create_dns_record(
        &self,
        kind: DnsRecordKind,
        zone_id: &str,
        name: &str,
        value: &str,
        _proxied: bool,
    ) -> bool {
        info!("dry-run: would create {kind} record \"{name}\" -> \"{value}\" in zone {zone_id}");
        true
    }

    async fn delete_dns_record(&self, zone_id: &str, record_id: &str) -> bool {
        info!("dry-run: would delete record {record_id} from zone {zone_id}");
        true
    }

    async fn tunnel_ingress(&self, account_id: &str, tunnel_id: &str) -> Option<Vec<IngressRule>> {
        self.inner.tunnel_ingress(account_id, tunnel_id).await
    }

    async fn replace_tunnel_ingress(
        &self,
        _account_id: &str,
        tunnel_id: &str,
        rules: &[IngressRule],
    ) -> bool {
        info!(
            "dry-run: would replace ingress for tunnel {tunnel_id} ({} rules)",
            rules.len()
        );
        true
    }
}

#[cfg(test)]
#[path = "dry_run_tests.rs"]
mod dry_run_tests;
