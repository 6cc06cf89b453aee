// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-zone accumulator of pending DNS record mutations.
//!
//! A [`ZoneAggregate`] exists for one reconciliation pass. On creation it
//! snapshots the zone's existing record names once (through the caching
//! gateway, so many aggregates over one pass still cost one listing per
//! zone), then stages additions and removals, and flushes everything in a
//! single [`commit`](ZoneAggregate::commit).
//!
//! Record name comparison here is case-sensitive, unlike ingress hostname
//! matching; see the tunnel aggregate.

use std::collections::HashSet;

use tracing::{error, info, warn};

use crate::cloudflare::RemoteGateway;
use crate::entries::{DnsEntry, DnsRecordKind};
use crate::errors::EntryError;

/// Pending DNS mutations for one zone.
pub struct ZoneAggregate<'a, G> {
    gateway: &'a G,
    zone_id: String,
    /// Names present remotely when the pass started
    existing_names: HashSet<String>,
    /// Staged creations, insertion order preserved
    staged_adds: Vec<DnsEntry>,
    /// Identities of staged creations, for duplicate rejection
    staged_keys: HashSet<(DnsRecordKind, String, String)>,
    /// Remote record ids staged for deletion, insertion order preserved
    staged_removals: Vec<String>,
    staged_removal_ids: HashSet<String>,
}

impl<'a, G: RemoteGateway> ZoneAggregate<'a, G> {
    /// Create the aggregate for a zone, snapshotting its record names.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::ZoneRecordsUnavailable`] when the record
    /// listing fails; the caller skips the entry that needed this zone.
    pub async fn load(gateway: &'a G, zone_id: &str) -> Result<Self, EntryError> {
        let records =
            gateway
                .dns_records(zone_id)
                .await
                .ok_or_else(|| EntryError::ZoneRecordsUnavailable {
                    zone_id: zone_id.to_string(),
                })?;

        Ok(Self {
            gateway,
            zone_id: zone_id.to_string(),
            existing_names: records.into_iter().map(|record| record.name).collect(),
            staged_adds: Vec::new(),
            staged_keys: HashSet::new(),
            staged_removals: Vec::new(),
            staged_removal_ids: HashSet::new(),
        })
    }

    /// Stage a record creation.
    ///
    /// A name already present in the remote snapshot is an informational
    /// no-op; an identity already staged in this pass is a conflict - the
    /// first staged entry wins and the duplicate is dropped with an error
    /// log.
    pub fn add_dns_record(&mut self, entry: &DnsEntry) {
        if self.existing_names.contains(&entry.name) {
            info!("DNS record for \"{}\" already exists", entry.name);
            return;
        }

        let key = (entry.kind, entry.zone_id.clone(), entry.name.clone());
        if self.staged_keys.contains(&key) {
            error!(
                "duplicate DNS record for \"{}\" \"{}\"",
                entry.name, entry.zone_id
            );
            return;
        }

        self.staged_keys.insert(key);
        self.staged_adds.push(entry.clone());
    }

    /// Stage a record removal by resolving the name to its remote id.
    ///
    /// Removal of an absent record is a warning, not an error.
    pub async fn remove_dns_record(&mut self, entry: &DnsEntry) {
        info!("Removing {} DNS record \"{}\"", entry.kind, entry.name);
        match self.gateway.dns_record_id(&self.zone_id, &entry.name).await {
            Some(record_id) => {
                if self.staged_removal_ids.insert(record_id.clone()) {
                    self.staged_removals.push(record_id);
                }
            }
            None => {
                warn!("No {} DNS record \"{}\"", entry.kind, entry.name);
            }
        }
    }

    /// Whether anything is staged.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.staged_adds.is_empty() || !self.staged_removals.is_empty()
    }

    /// Flush staged mutations: all deletions first, then all creations, so
    /// a record being replaced never collides with its own old name. Each
    /// call stands alone - a failure is logged and the rest still run.
    pub async fn commit(&mut self) {
        for record_id in self.staged_removals.drain(..) {
            if !self.gateway.delete_dns_record(&self.zone_id, &record_id).await {
                error!("Failed to remove DNS record ID {record_id}");
            }
        }
        self.staged_removal_ids.clear();

        for entry in self.staged_adds.drain(..) {
            info!(
                "Adding {} DNS record \"{}\" -> \"{}\"",
                entry.kind, entry.name, entry.value
            );
            if !self
                .gateway
                .create_dns_record(
                    entry.kind,
                    &entry.zone_id,
                    &entry.name,
                    &entry.value,
                    entry.proxied,
                )
                .await
            {
                error!("Failed to add {} DNS record \"{}\"", entry.kind, entry.name);
            }
        }
        self.staged_keys.clear();
    }
}

#[cfg(test)]
#[path = "zone_tests.rs"]
mod zone_tests;
