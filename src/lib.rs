// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # Tunnely - Cloudflare Tunnel hostname operator for Docker
//!
//! Tunnely watches Docker containers for `cloudflare.` labels declaring
//! public hostnames and DNS records, and reconciles that desired state
//! against Cloudflare: the zone's DNS record set and the tunnel's ingress
//! rule list.
//!
//! ## How a pass works
//!
//! Container labels are parsed into typed desired entries, routed into
//! per-zone and per-tunnel aggregates (created lazily, one per distinct
//! id), which diff against remote state fetched once per pass through a
//! caching gateway, and finally each touched aggregate flushes at most one
//! write to its remote resource. The same machinery runs in two modes: a
//! startup scan over all running containers, and one pass per container
//! `start`/`die` event afterwards.
//!
//! One bad container, entry or remote call never stops the rest: failures
//! are logged and skipped, and the remote service converges on the next
//! event or scan.
//!
//! ## Modules
//!
//! - [`labels`] - label parsing and validation (pure)
//! - [`entries`] - desired-state entry types
//! - [`cloudflare`] - remote gateway trait, HTTP client, caching and
//!   dry-run decorators
//! - [`reconcilers`] - zone/tunnel aggregates and the pass driver
//! - [`docker`] - container snapshots and lifecycle event watch
//! - [`config`] - required environment settings
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use tunnely::cloudflare::{CachedGateway, CloudflareClient, RemoteGateway};
//! use tunnely::docker::{ContainerEvent, ContainerEventKind};
//! use tunnely::reconcilers::handle_event;
//!
//! # async fn example() {
//! let client: Arc<dyn RemoteGateway> = Arc::new(CloudflareClient::new("api-token", false));
//!
//! let event = ContainerEvent {
//!     kind: ContainerEventKind::Start,
//!     container_name: "web".to_string(),
//!     labels: std::collections::HashMap::from([(
//!         "cloudflare.zero_trust.access.tunnel.public_hostname".to_string(),
//!         "web.example.com".to_string(),
//!     )]),
//! };
//!
//! // One pass: fresh cache, touched aggregates commit once.
//! let gateway = CachedGateway::new(Arc::clone(&client));
//! handle_event(&gateway, "account-id", "default-tunnel-id", &event).await;
//! # }
//! ```

pub mod cloudflare;
pub mod config;
pub mod constants;
pub mod docker;
pub mod entries;
pub mod errors;
pub mod labels;
pub mod reconcilers;

#[cfg(test)]
pub mod test_support;
