// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Pass-scoped memoization of gateway reads.
//!
//! The Cloudflare API is rate-limited and slow relative to label parsing, so
//! a reconciliation pass over many containers must not re-fetch the same
//! zone or tunnel state per container. [`CachedGateway`] decorates any
//! [`RemoteGateway`] and memoizes each read by its full argument tuple:
//! identical arguments within one pass return the same answer from memory,
//! whatever that answer was. The cache is never invalidated mid-pass;
//! consumers that mutate remote state track their own pending view (the
//! aggregates) instead of re-reading through here. Mutations pass through
//! untouched.
//!
//! Construct one per pass and drop it with the pass; nothing survives into
//! the next one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{DnsRecord, IngressRule, RemoteGateway};
use crate::entries::DnsRecordKind;

/// Memoizing decorator over a [`RemoteGateway`].
pub struct CachedGateway {
    inner: Arc<dyn RemoteGateway>,
    zone_ids: Mutex<HashMap<String, Option<String>>>,
    dns_records: Mutex<HashMap<String, Option<Vec<DnsRecord>>>>,
    dns_record_ids: Mutex<HashMap<(String, String), Option<String>>>,
    tunnel_ingress: Mutex<HashMap<(String, String), Option<Vec<IngressRule>>>>,
}

impl CachedGateway {
    /// Wrap a gateway for the duration of one pass.
    #[must_use]
    pub fn new(inner: Arc<dyn RemoteGateway>) -> Self {
        Self {
            inner,
            zone_ids: Mutex::new(HashMap::new()),
            dns_records: Mutex::new(HashMap::new()),
            dns_record_ids: Mutex::new(HashMap::new()),
            tunnel_ingress: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RemoteGateway for CachedGateway {
    async fn zone_id(&self, zone_name: &str) -> Option<String> {
        if let Some(cached) = self.zone_ids.lock().expect("cache lock").get(zone_name) {
            return cached.clone();
        }
        let value = self.inner.zone_id(zone_name).await;
        self.zone_ids
            .lock()
            .expect("cache lock")
            .insert(zone_name.to_string(), value.clone());
        value
    }

    async fn dns_records(&self, zone_id: &str) -> Option<Vec<DnsRecord>> {
        if let Some(cached) = self.dns_records.lock().expect("cache lock").get(zone_id) {
            return cached.clone();
        }
        let value = self.inner.dns_records(zone_id).await;
        self.dns_records
            .lock()
            .expect("cache lock")
            .insert(zone_id.to_string(), value.clone());
        value
    }

    async fn dns_record_id(&self, zone_id: &str, name: &str) -> Option<String> {
        let key = (zone_id.to_string(), name.to_string());
        if let Some(cached) = self.dns_record_ids.lock().expect("cache lock").get(&key) {
            return cached.clone();
        }
        let value = self.inner.dns_record_id(zone_id, name).await;
        self.dns_record_ids
            .lock()
            .expect("cache lock")
            .insert(key, value.clone());
        value
    }

    async fn create_dns_record(
        &self,
        kind: DnsRecordKind,
        zone_id: &str,
        name: &str,
        value: &str,
        proxied: bool,
    ) -> bool {
        self.inner
            .create_dns_record(kind, zone_id, name, value, proxied)
            .await
    }

    async fn delete_dns_record(&self, zone_id: &str, record_id: &str) -> bool {
        self.inner.delete_dns_record(zone_id, record_id).await
    }

    async fn tunnel_ingress(&self, account_id: &str, tunnel_id: &str) -> Option<Vec<IngressRule>> {
        let key = (account_id.to_string(), tunnel_id.to_string());
        if let Some(cached) = self.tunnel_ingress.lock().expect("cache lock").get(&key) {
            return cached.clone();
        }
        let value = self.inner.tunnel_ingress(account_id, tunnel_id).await;
        self.tunnel_ingress
            .lock()
            .expect("cache lock")
            .insert(key, value.clone());
        value
    }

    async fn replace_tunnel_ingress(
        &self,
        account_id: &str,
        tunnel_id: &str,
        rules: &[IngressRule],
    ) -> bool {
        self.inner
            .replace_tunnel_ingress(account_id, tunnel_id, rules)
            .await
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod cache_tests;
