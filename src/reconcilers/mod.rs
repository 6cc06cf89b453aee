// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! The reconciliation driver.
//!
//! A [`Pass`] is one reconcile-and-commit cycle: either the startup batch
//! over a container snapshot ([`reconcile_containers`]) or a single
//! lifecycle event ([`handle_event`]). The driver parses labels into
//! desired entries, routes each entry to the aggregate owning its zone or
//! tunnel (created lazily, first-touch order), and finally commits every
//! touched aggregate exactly once - zones before tunnels - so each remote
//! resource sees at most one write per pass.
//!
//! Failure policy is isolate-and-continue throughout: a container with bad
//! labels, an entry whose zone cannot be resolved, or a failed remote call
//! is logged and skipped; nothing aborts the pass. There is no retry state
//! either - correction comes from the next event or the next scan.

pub mod tunnel;
pub mod zone;

pub use tunnel::TunnelAggregate;
pub use zone::ZoneAggregate;

use tracing::{debug, error, info};

use crate::cloudflare::RemoteGateway;
use crate::docker::{ContainerEvent, ContainerEventKind, Workload};
use crate::entries::DesiredEntry;
use crate::errors::EntryError;
use crate::labels::{namespace_labels, parse_labels};

/// One reconciliation pass over aggregates it creates lazily.
///
/// The pass exclusively owns its aggregates; they are dropped with it.
/// Aggregates commit in the order they were first touched, which follows
/// input order and keeps call sequences deterministic.
pub struct Pass<'a, G> {
    gateway: &'a G,
    account_id: String,
    zones: Vec<(String, ZoneAggregate<'a, G>)>,
    tunnels: Vec<(String, TunnelAggregate<'a, G>)>,
}

impl<'a, G: RemoteGateway> Pass<'a, G> {
    /// Start a pass against a gateway (normally the per-pass caching
    /// decorator).
    #[must_use]
    pub fn new(gateway: &'a G, account_id: &str) -> Self {
        Self {
            gateway,
            account_id: account_id.to_string(),
            zones: Vec::new(),
            tunnels: Vec::new(),
        }
    }

    /// Route one entry through the add path.
    ///
    /// # Errors
    ///
    /// Returns an error when the owning zone or tunnel aggregate cannot be
    /// created; whatever was already staged for other aggregates stands.
    pub async fn add(&mut self, entry: &DesiredEntry) -> Result<(), EntryError> {
        match entry {
            DesiredEntry::Dns(dns) => {
                self.zone(&dns.zone_id).await?.add_dns_record(dns);
            }
            DesiredEntry::Tunnel(tunnel) => {
                let dns = tunnel.dns_entry();
                self.zone(&tunnel.zone_id).await?.add_dns_record(&dns);
                self.tunnel(&tunnel.tunnel_id).await?.add_ingress(tunnel);
            }
        }
        Ok(())
    }

    /// Route one entry through the remove path.
    ///
    /// # Errors
    ///
    /// Same contract as [`add`](Pass::add).
    pub async fn remove(&mut self, entry: &DesiredEntry) -> Result<(), EntryError> {
        match entry {
            DesiredEntry::Dns(dns) => {
                self.zone(&dns.zone_id).await?.remove_dns_record(dns).await;
            }
            DesiredEntry::Tunnel(tunnel) => {
                let dns = tunnel.dns_entry();
                self.zone(&tunnel.zone_id).await?.remove_dns_record(&dns).await;
                self.tunnel(&tunnel.tunnel_id).await?.remove_ingress(tunnel);
            }
        }
        Ok(())
    }

    /// Commit every touched aggregate exactly once, zones first.
    pub async fn commit(&mut self) {
        for (_, zone) in &mut self.zones {
            zone.commit().await;
        }
        for (_, tunnel) in &mut self.tunnels {
            tunnel.commit().await;
        }
    }

    async fn zone(&mut self, zone_id: &str) -> Result<&mut ZoneAggregate<'a, G>, EntryError> {
        if let Some(index) = self.zones.iter().position(|(id, _)| id == zone_id) {
            return Ok(&mut self.zones[index].1);
        }
        let aggregate = ZoneAggregate::load(self.gateway, zone_id).await?;
        self.zones.push((zone_id.to_string(), aggregate));
        Ok(&mut self.zones.last_mut().expect("aggregate just added").1)
    }

    async fn tunnel(&mut self, tunnel_id: &str) -> Result<&mut TunnelAggregate<'a, G>, EntryError> {
        if let Some(index) = self.tunnels.iter().position(|(id, _)| id == tunnel_id) {
            return Ok(&mut self.tunnels[index].1);
        }
        let aggregate = TunnelAggregate::load(self.gateway, &self.account_id, tunnel_id).await?;
        self.tunnels.push((tunnel_id.to_string(), aggregate));
        Ok(&mut self.tunnels.last_mut().expect("aggregate just added").1)
    }
}

/// Startup batch: reconcile every running labeled container in the
/// snapshot, then commit all touched aggregates once.
pub async fn reconcile_containers<G: RemoteGateway>(
    gateway: &G,
    account_id: &str,
    default_tunnel_id: &str,
    workloads: &[Workload],
) {
    let mut pass = Pass::new(gateway, account_id);

    for workload in workloads {
        debug!("inspecting container \"{}\"", workload.name);
        if !workload.running {
            continue;
        }
        let labels = namespace_labels(&workload.labels);
        if labels.is_empty() {
            continue;
        }

        match parse_labels(gateway, default_tunnel_id, &labels).await {
            Ok(entries) => {
                for entry in &entries {
                    if let Err(err) = pass.add(entry).await {
                        error!("{} ({}): {}", workload.name, entry, err);
                    }
                }
            }
            Err(err) => error!("{}: {}", workload.name, err),
        }
    }

    pass.commit().await;
}

/// Steady state: reconcile a single container lifecycle event in its own
/// pass, committing only the aggregates this event touched.
pub async fn handle_event<G: RemoteGateway>(
    gateway: &G,
    account_id: &str,
    default_tunnel_id: &str,
    event: &ContainerEvent,
) {
    let labels = namespace_labels(&event.labels);
    if labels.is_empty() {
        return;
    }

    info!(
        "docker event \"{}\" for container \"{}\"",
        event.kind, event.container_name
    );

    let entries = match parse_labels(gateway, default_tunnel_id, &labels).await {
        Ok(entries) => entries,
        Err(err) => {
            error!("{}: {}", event.container_name, err);
            return;
        }
    };

    let mut pass = Pass::new(gateway, account_id);
    for entry in &entries {
        let result = match event.kind {
            ContainerEventKind::Start => pass.add(entry).await,
            ContainerEventKind::Die => pass.remove(entry).await,
        };
        if let Err(err) = result {
            error!("{} ({}): {}", event.container_name, entry, err);
        }
    }

    pass.commit().await;
}
