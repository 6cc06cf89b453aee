// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared test double for the remote gateway.
//!
//! [`MockGateway`] serves canned zone/record/ingress state and records
//! every call as a rendered string, so tests can assert both what was
//! returned and exactly which remote operations a pass performed, in
//! order.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::cloudflare::{DnsRecord, IngressRule, RemoteGateway};
use crate::entries::DnsRecordKind;

/// Recording gateway stub with canned responses.
#[derive(Default)]
pub struct MockGateway {
    zone_ids: HashMap<String, String>,
    records: HashMap<String, Vec<DnsRecord>>,
    record_ids: HashMap<(String, String), String>,
    ingress: HashMap<(String, String), Vec<IngressRule>>,
    unavailable_zones: HashSet<String>,
    unavailable_tunnels: HashSet<String>,
    fail_creates: bool,
    fail_deletes: bool,
    fail_replacements: bool,
    calls: Mutex<Vec<String>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `zone_name` to `zone_id`.
    pub fn with_zone(mut self, zone_name: &str, zone_id: &str) -> Self {
        self.zone_ids.insert(zone_name.to_string(), zone_id.to_string());
        self
    }

    /// Serve existing CNAME records (by name) for a zone. Zones without an
    /// entry serve an empty record list.
    pub fn with_record_names(mut self, zone_id: &str, names: &[&str]) -> Self {
        let records = names
            .iter()
            .enumerate()
            .map(|(index, name)| DnsRecord {
                id: format!("record-{index}"),
                name: (*name).to_string(),
                kind: DnsRecordKind::CNAME,
                value: String::new(),
            })
            .collect();
        self.records.insert(zone_id.to_string(), records);
        self
    }

    /// Serve a record id for a `(zone_id, name)` lookup.
    pub fn with_record_id(mut self, zone_id: &str, name: &str, record_id: &str) -> Self {
        self.record_ids.insert(
            (zone_id.to_string(), name.to_string()),
            record_id.to_string(),
        );
        self
    }

    /// Serve an ingress rule list for a tunnel. Tunnels without an entry
    /// serve the single catch-all, like an unconfigured tunnel.
    pub fn with_ingress(mut self, account_id: &str, tunnel_id: &str, rules: Vec<IngressRule>) -> Self {
        self.ingress
            .insert((account_id.to_string(), tunnel_id.to_string()), rules);
        self
    }

    /// Make `dns_records` fail for a zone.
    pub fn with_unavailable_zone(mut self, zone_id: &str) -> Self {
        self.unavailable_zones.insert(zone_id.to_string());
        self
    }

    /// Make `tunnel_ingress` fail for a tunnel.
    pub fn with_unavailable_tunnel(mut self, account_id: &str, tunnel_id: &str) -> Self {
        self.unavailable_tunnels
            .insert(format!("{account_id}/{tunnel_id}"));
        self
    }

    pub fn failing_creates(mut self) -> Self {
        self.fail_creates = true;
        self
    }

    pub fn failing_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    pub fn failing_replacements(mut self) -> Self {
        self.fail_replacements = true;
        self
    }

    /// Every call so far, rendered in invocation order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    /// Number of recorded calls starting with `prefix`.
    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    fn record_call(&self, call: String) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

#[async_trait]
impl RemoteGateway for MockGateway {
    async fn zone_id(&self, zone_name: &str) -> Option<String> {
        self.record_call(format!("zone_id {zone_name}"));
        self.zone_ids.get(zone_name).cloned()
    }

    async fn dns_records(&self, zone_id: &str) -> Option<Vec<DnsRecord>> {
        self.record_call(format!("dns_records {zone_id}"));
        if self.unavailable_zones.contains(zone_id) {
            return None;
        }
        Some(self.records.get(zone_id).cloned().unwrap_or_default())
    }

    async fn dns_record_id(&self, zone_id: &str, name: &str) -> Option<String> {
        self.record_call(format!("dns_record_id {zone_id} {name}"));
        self.record_ids
            .get(&(zone_id.to_string(), name.to_string()))
            .cloned()
    }

    async fn create_dns_record(
        &self,
        kind: DnsRecordKind,
        zone_id: &str,
        name: &str,
        value: &str,
        proxied: bool,
    ) -> bool {
        self.record_call(format!(
            "create_dns_record {kind} {zone_id} {name} {value} {proxied}"
        ));
        !self.fail_creates
    }

    async fn delete_dns_record(&self, zone_id: &str, record_id: &str) -> bool {
        self.record_call(format!("delete_dns_record {zone_id} {record_id}"));
        !self.fail_deletes
    }

    async fn tunnel_ingress(&self, account_id: &str, tunnel_id: &str) -> Option<Vec<IngressRule>> {
        self.record_call(format!("tunnel_ingress {account_id} {tunnel_id}"));
        if self
            .unavailable_tunnels
            .contains(&format!("{account_id}/{tunnel_id}"))
        {
            return None;
        }
        Some(
            self.ingress
                .get(&(account_id.to_string(), tunnel_id.to_string()))
                .cloned()
                .unwrap_or_else(|| vec![IngressRule::catch_all()]),
        )
    }

    async fn replace_tunnel_ingress(
        &self,
        account_id: &str,
        tunnel_id: &str,
        rules: &[IngressRule],
    ) -> bool {
        let rendered = serde_json::to_string(rules).expect("serialize rules");
        self.record_call(format!(
            "replace_tunnel_ingress {account_id} {tunnel_id} {rendered}"
        ));
        !self.fail_replacements
    }
}
