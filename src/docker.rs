// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Docker Engine collaborator: container snapshots and lifecycle events.
//!
//! Everything the engine needs from Docker is reduced to two shapes: a
//! [`Workload`] (name, running state, labels) for the startup scan, and a
//! [`ContainerEvent`] (`start`/`die` plus labels) for steady state. The
//! event watcher runs as its own task and hands events to the single
//! reconciliation consumer over an unbounded mpsc channel, decoupling the
//! Docker event stream from slow remote calls.
//!
//! Malformed or unrecognized events are logged and dropped; the watcher
//! never takes the daemon down.

use std::collections::HashMap;
use std::fmt;

use anyhow::{Context, Result};
use bollard::container::ListContainersOptions;
use bollard::models::{ContainerSummary, EventMessage, EventMessageTypeEnum};
use bollard::system::EventsOptions;
use bollard::Docker;
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::constants::CONTAINER_STATE_RUNNING;

/// Lifecycle transitions the reconciler reacts to. Every other Docker
/// action is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerEventKind {
    /// Container started; its declarations are added
    Start,
    /// Container died; its declarations are removed
    Die,
}

impl ContainerEventKind {
    /// Map a Docker event action to a kind, `None` for anything else.
    #[must_use]
    pub fn from_action(action: &str) -> Option<Self> {
        match action {
            "start" => Some(Self::Start),
            "die" => Some(Self::Die),
            _ => None,
        }
    }
}

impl fmt::Display for ContainerEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Die => write!(f, "die"),
        }
    }
}

/// One container lifecycle event, carrying the actor attributes Docker
/// attaches (the container's labels plus `name`, `image`, ...).
#[derive(Debug, Clone)]
pub struct ContainerEvent {
    /// What happened
    pub kind: ContainerEventKind,
    /// Container name from the actor attributes
    pub container_name: String,
    /// Actor attributes, consulted for `cloudflare.` labels
    pub labels: HashMap<String, String>,
}

/// A container as seen by the startup scan.
#[derive(Debug, Clone)]
pub struct Workload {
    /// Container name without the leading slash
    pub name: String,
    /// Whether the container is currently running
    pub running: bool,
    /// Container labels
    pub labels: HashMap<String, String>,
}

/// Snapshot every container (running or not) for the startup scan.
///
/// # Errors
///
/// Returns an error when the Docker API call fails.
pub async fn list_workloads(docker: &Docker) -> Result<Vec<Workload>> {
    let containers = docker
        .list_containers(Some(ListContainersOptions::<String> {
            all: true,
            ..Default::default()
        }))
        .await
        .context("failed to list containers")?;

    Ok(containers.into_iter().map(workload_from_summary).collect())
}

/// Watch container `start`/`die` events and forward them over the channel.
///
/// Runs until the event stream or the receiving side closes. Stream errors
/// are logged and the stream is re-polled; conversion failures drop the
/// single event.
pub async fn watch_events(docker: Docker, events_tx: mpsc::UnboundedSender<ContainerEvent>) {
    let mut filters = HashMap::new();
    filters.insert("type".to_string(), vec!["container".to_string()]);
    filters.insert(
        "event".to_string(),
        vec!["start".to_string(), "die".to_string()],
    );

    let mut stream = docker.events(Some(EventsOptions::<String> {
        filters,
        ..Default::default()
    }));

    while let Some(result) = stream.next().await {
        match result {
            Ok(message) => {
                let Some(event) = event_from_message(&message) else {
                    debug!("ignoring docker event: {message:?}");
                    continue;
                };
                if events_tx.send(event).is_err() {
                    // Consumer is gone; shutting down.
                    return;
                }
            }
            Err(err) => error!("docker event stream error: {err}"),
        }
    }

    warn!("docker event stream closed");
}

/// Reduce a container summary to the fields the scan needs. Docker
/// prefixes names with a slash.
fn workload_from_summary(summary: ContainerSummary) -> Workload {
    let name = summary
        .names
        .unwrap_or_default()
        .into_iter()
        .next()
        .map(|name| name.trim_start_matches('/').to_string())
        .unwrap_or_default();

    Workload {
        name,
        running: summary.state.as_deref() == Some(CONTAINER_STATE_RUNNING),
        labels: summary.labels.unwrap_or_default(),
    }
}

/// Convert a raw Docker event into a [`ContainerEvent`], `None` for
/// non-container events, unrecognized actions, or events missing the
/// expected actor attributes.
fn event_from_message(message: &EventMessage) -> Option<ContainerEvent> {
    if message.typ != Some(EventMessageTypeEnum::CONTAINER) {
        return None;
    }
    let kind = ContainerEventKind::from_action(message.action.as_deref()?)?;
    let attributes = message.actor.as_ref()?.attributes.as_ref()?;
    let container_name = attributes.get("name")?.clone();

    Some(ContainerEvent {
        kind,
        container_name,
        labels: attributes.clone(),
    })
}

#[cfg(test)]
#[path = "docker_tests.rs"]
mod docker_tests;
