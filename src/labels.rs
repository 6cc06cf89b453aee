// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Container label parsing and validation.
//!
//! Turns a container's `cloudflare.`-namespaced labels into typed
//! [`DesiredEntry`] values. Three declaration kinds may coexist on one
//! container and are returned in a fixed order: tunnel-routed hostnames
//! first, then CNAME declarations, then A declarations.
//!
//! The parser itself performs no I/O. The one remote-dependent step, zone
//! name to zone id, goes through the caller-supplied [`ZoneResolver`], so
//! every validation rule is unit-testable without a network.

use std::collections::HashMap;

use url::Url;

use crate::cloudflare::ZoneResolver;
use crate::constants::{
    FALSE_TOKENS, LABEL_A_IP, LABEL_A_NAME, LABEL_CNAME_NAME, LABEL_CNAME_TARGET, LABEL_NAMESPACE,
    LABEL_TUNNEL_HOSTNAME, LABEL_TUNNEL_ID, LABEL_TUNNEL_NO_TLS_VERIFY, LABEL_TUNNEL_SERVICE,
    TRUE_TOKENS,
};
use crate::entries::{registrable_zone, DesiredEntry, DnsEntry, DnsRecordKind, TunnelEntry};
use crate::errors::{EntryError, LabelError};

/// Filter a label map down to the recognized namespace.
///
/// An empty result means the container carries nothing for tunnely and is
/// skipped without parsing.
#[must_use]
pub fn namespace_labels(labels: &HashMap<String, String>) -> HashMap<String, String> {
    labels
        .iter()
        .filter(|(key, _)| key.starts_with(LABEL_NAMESPACE))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Parse one container's labels into desired-state entries.
///
/// # Errors
///
/// Returns [`EntryError::Label`] when any declared value fails validation,
/// or [`EntryError::ZoneNotFound`] when a derived zone name does not
/// resolve. Either way the whole container is skipped; partially applying a
/// container's declarations would leave it half-published.
pub async fn parse_labels<R: ZoneResolver + ?Sized>(
    resolver: &R,
    default_tunnel_id: &str,
    labels: &HashMap<String, String>,
) -> Result<Vec<DesiredEntry>, EntryError> {
    let mut entries = tunnel_entries(resolver, default_tunnel_id, labels).await?;
    entries.extend(cname_entries(resolver, labels).await?);
    entries.extend(a_entries(resolver, labels).await?);
    Ok(entries)
}

/// Tunnel-routed hostname declarations.
async fn tunnel_entries<R: ZoneResolver + ?Sized>(
    resolver: &R,
    default_tunnel_id: &str,
    labels: &HashMap<String, String>,
) -> Result<Vec<DesiredEntry>, EntryError> {
    let hostnames = names_from_label(labels, LABEL_TUNNEL_HOSTNAME)?;
    if hostnames.is_empty() {
        return Ok(Vec::new());
    }

    let service = validate_service(label_value(labels, LABEL_TUNNEL_SERVICE))?;
    let tunnel_id = label_value(labels, LABEL_TUNNEL_ID)
        .unwrap_or(default_tunnel_id)
        .to_string();
    let no_tls_verify = validate_bool_token(label_value(labels, LABEL_TUNNEL_NO_TLS_VERIFY))?;

    let mut entries = Vec::with_capacity(hostnames.len());
    for hostname in hostnames {
        let zone_name = registrable_zone(&hostname);
        let zone_id = resolve_zone(resolver, &zone_name).await?;
        entries.push(DesiredEntry::Tunnel(TunnelEntry {
            hostname,
            service: service.clone(),
            zone_name,
            zone_id,
            tunnel_id: tunnel_id.clone(),
            no_tls_verify,
        }));
    }
    Ok(entries)
}

/// CNAME declarations: a name list sharing one target.
async fn cname_entries<R: ZoneResolver + ?Sized>(
    resolver: &R,
    labels: &HashMap<String, String>,
) -> Result<Vec<DesiredEntry>, EntryError> {
    let names = names_from_label(labels, LABEL_CNAME_NAME)?;
    if names.is_empty() {
        return Ok(Vec::new());
    }
    let target = label_value(labels, LABEL_CNAME_TARGET)
        .ok_or(LabelError::CnameTargetMissing)?
        .to_string();

    dns_entries(resolver, names, target, DnsRecordKind::CNAME).await
}

/// A record declarations: a name list sharing one IP.
async fn a_entries<R: ZoneResolver + ?Sized>(
    resolver: &R,
    labels: &HashMap<String, String>,
) -> Result<Vec<DesiredEntry>, EntryError> {
    let names = names_from_label(labels, LABEL_A_NAME)?;
    if names.is_empty() {
        return Ok(Vec::new());
    }
    let ip = label_value(labels, LABEL_A_IP)
        .ok_or(LabelError::AddressMissing)?
        .to_string();

    dns_entries(resolver, names, ip, DnsRecordKind::A).await
}

async fn dns_entries<R: ZoneResolver + ?Sized>(
    resolver: &R,
    names: Vec<String>,
    value: String,
    kind: DnsRecordKind,
) -> Result<Vec<DesiredEntry>, EntryError> {
    let mut entries = Vec::with_capacity(names.len());
    for name in names {
        let zone_name = registrable_zone(&name);
        let zone_id = resolve_zone(resolver, &zone_name).await?;
        entries.push(DesiredEntry::Dns(DnsEntry {
            kind,
            name,
            value: value.clone(),
            zone_id,
            proxied: false,
        }));
    }
    Ok(entries)
}

async fn resolve_zone<R: ZoneResolver + ?Sized>(
    resolver: &R,
    zone_name: &str,
) -> Result<String, EntryError> {
    resolver
        .resolve_zone_id(zone_name)
        .await
        .ok_or_else(|| EntryError::ZoneNotFound {
            zone: zone_name.to_string(),
        })
}

/// A label value, trimmed; `None` when the label is absent or blank.
fn label_value<'a>(labels: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    labels
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

/// Split a comma-separated name-list label: trim each element, drop
/// duplicates keeping first-seen order, validate each as a hostname. An
/// absent or blank label yields an empty list; a blank *element* is an
/// error.
fn names_from_label(
    labels: &HashMap<String, String>,
    key: &str,
) -> Result<Vec<String>, LabelError> {
    let Some(raw) = label_value(labels, key) else {
        return Ok(Vec::new());
    };

    let mut names = Vec::new();
    for name in raw.split(',').map(str::trim) {
        if names.iter().any(|seen| seen == name) {
            continue;
        }
        names.push(validate_hostname(name)?);
    }
    Ok(names)
}

/// A hostname needs at least two non-empty dot-separated labels.
fn validate_hostname(hostname: &str) -> Result<String, LabelError> {
    let labels: Vec<&str> = hostname.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(LabelError::InvalidHostname {
            hostname: hostname.to_string(),
        });
    }
    Ok(hostname.to_string())
}

/// The service must be an absolute http/https URL with a host.
fn validate_service(service: Option<&str>) -> Result<String, LabelError> {
    let service = service.ok_or(LabelError::ServiceMissing)?;
    let parsed = Url::parse(service).map_err(|_| LabelError::InvalidServiceUrl {
        service: service.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(LabelError::InvalidServiceScheme {
                service: service.to_string(),
                scheme: scheme.to_string(),
            })
        }
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(LabelError::InvalidServiceUrl {
            service: service.to_string(),
        });
    }
    Ok(service.to_string())
}

/// Fixed truthy/falsy token sets; anything else non-empty is an error and
/// an absent value stays unset (distinct from `false`).
fn validate_bool_token(value: Option<&str>) -> Result<Option<bool>, LabelError> {
    let Some(token) = value else {
        return Ok(None);
    };
    if TRUE_TOKENS.contains(&token) {
        return Ok(Some(true));
    }
    if FALSE_TOKENS.contains(&token) {
        return Ok(Some(false));
    }
    Err(LabelError::InvalidBoolToken {
        value: token.to_string(),
    })
}

#[cfg(test)]
#[path = "labels_tests.rs"]
mod labels_tests;
