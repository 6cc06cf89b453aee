// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for label parsing and per-entry reconciliation.
//!
//! The taxonomy mirrors how failures are handled:
//!
//! - [`LabelError`] - a container declared something invalid; the container
//!   is skipped, everything else keeps processing.
//! - [`EntryError`] - a single desired entry could not be routed (its zone or
//!   tunnel state is unavailable); the entry is skipped.
//! - [`ConfigError`] - required startup configuration is missing; the only
//!   fatal class, reported once with every missing name.
//!
//! Remote call failures never surface as errors above the gateway boundary;
//! the gateway logs them and returns sentinel values instead.

use thiserror::Error;

/// A container label failed validation.
///
/// Always recoverable: the offending container is logged and skipped while
/// the rest of the batch or event stream continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    /// A hostname in a name-list label is empty or has fewer than two
    /// dot-separated labels.
    #[error("hostname \"{hostname}\" must be like \"domain.com\" or \"subdomain.domain.com\"")]
    InvalidHostname {
        /// The offending value as found in the label
        hostname: String,
    },

    /// The tunnel service label is missing or empty while public hostnames
    /// are declared.
    #[error("service not specified")]
    ServiceMissing,

    /// The tunnel service label does not parse as an absolute URL with a host.
    #[error("service \"{service}\" is not a valid URL")]
    InvalidServiceUrl {
        /// The offending value
        service: String,
    },

    /// The tunnel service URL uses a scheme other than http or https.
    #[error("service \"{service}\" has unsupported scheme \"{scheme}\"")]
    InvalidServiceScheme {
        /// The offending value
        service: String,
        /// The scheme that was rejected
        scheme: String,
    },

    /// The `notlsverify` label holds a token outside the accepted
    /// truthy/falsy sets.
    #[error("invalid notlsverify value: \"{value}\"")]
    InvalidBoolToken {
        /// The offending value
        value: String,
    },

    /// A CNAME name list is declared without a target.
    #[error("target not specified for CNAME")]
    CnameTargetMissing,

    /// An A name list is declared without an IP.
    #[error("ip not specified for A")]
    AddressMissing,
}

/// A desired entry could not be parsed or routed to its aggregates.
///
/// Recoverable: the entry (or the whole container, when raised during
/// parsing) is logged and skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    /// Label validation failed
    #[error(transparent)]
    Label(#[from] LabelError),

    /// The zone name derived from a hostname does not exist on the account
    /// (or the lookup failed); nothing can be written for this entry.
    #[error("could not find zone name \"{zone}\"")]
    ZoneNotFound {
        /// The registrable zone name that failed to resolve
        zone: String,
    },

    /// The DNS record listing for a zone was unavailable, so no aggregate
    /// could be built for it.
    #[error("could not list DNS records for zone id \"{zone_id}\"")]
    ZoneRecordsUnavailable {
        /// The zone whose record listing failed
        zone_id: String,
    },

    /// The ingress configuration for a tunnel was unavailable, so no
    /// aggregate could be built for it.
    #[error("could not find tunnel ingress for account \"{account_id}\" and tunnel \"{tunnel_id}\"")]
    TunnelIngressUnavailable {
        /// The account owning the tunnel
        account_id: String,
        /// The tunnel whose configuration failed to load
        tunnel_id: String,
    },
}

/// Required startup configuration is absent.
///
/// This is the only fatal error class: the process logs the missing names
/// and exits with status 1.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// One or more required environment variables are unset or empty.
    #[error("{} environment variables are not set", .names.join(", "))]
    MissingEnvironment {
        /// Every missing variable name, in declaration order
        names: Vec<String>,
    },
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
