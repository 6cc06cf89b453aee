// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Label keys, environment variable names and fixed protocol values.
//!
//! All container labels consulted by tunnely live under the `cloudflare.`
//! namespace; everything outside it is ignored.

// ============================================================================
// Label Namespace
// ============================================================================

/// Prefix identifying the labels tunnely consumes. Containers without at
/// least one label under this prefix are skipped entirely.
pub const LABEL_NAMESPACE: &str = "cloudflare.";

/// Comma-separated list of public hostnames to route through a tunnel
pub const LABEL_TUNNEL_HOSTNAME: &str = "cloudflare.zero_trust.access.tunnel.public_hostname";

/// Upstream service URL the tunnel forwards the hostnames to (http/https)
pub const LABEL_TUNNEL_SERVICE: &str = "cloudflare.zero_trust.access.tunnel.service";

/// Optional tunnel id override; the configured default tunnel is used when absent
pub const LABEL_TUNNEL_ID: &str = "cloudflare.zero_trust.access.tunnel.id";

/// Optional `noTLSVerify` flag for the origin request
pub const LABEL_TUNNEL_NO_TLS_VERIFY: &str = "cloudflare.zero_trust.access.tunnel.tls.notlsverify";

/// Comma-separated list of CNAME record names
pub const LABEL_CNAME_NAME: &str = "cloudflare.dns.cname.name";

/// Single CNAME target shared by every name in the CNAME list
pub const LABEL_CNAME_TARGET: &str = "cloudflare.dns.cname.target";

/// Comma-separated list of A record names
pub const LABEL_A_NAME: &str = "cloudflare.dns.a.name";

/// Single IPv4 address shared by every name in the A list
pub const LABEL_A_IP: &str = "cloudflare.dns.a.ip";

// ============================================================================
// Label Values
// ============================================================================

/// Tokens accepted as `true` for boolean labels
pub const TRUE_TOKENS: [&str; 6] = ["true", "True", "TRUE", "t", "T", "1"];

/// Tokens accepted as `false` for boolean labels
pub const FALSE_TOKENS: [&str; 6] = ["false", "False", "FALSE", "f", "F", "0"];

// ============================================================================
// Environment Variables
// ============================================================================

/// Cloudflare account id (required)
pub const ENV_ACCOUNT_ID: &str = "CLOUDFLARE_ACCOUNT_ID";

/// Cloudflare API token (required)
pub const ENV_API_KEY: &str = "CLOUDFLARE_API_KEY";

/// Default tunnel id used when a container does not override it (required)
pub const ENV_TUNNEL_ID: &str = "CLOUDFLARE_TUNNEL_ID";

// ============================================================================
// Cloudflare Protocol Values
// ============================================================================

/// Service of the catch-all ingress rule that must terminate every rule list
pub const CATCH_ALL_SERVICE: &str = "http_status:404";

/// Domain suffix of the CNAME target for tunnel-routed hostnames
pub const TUNNEL_DOMAIN_SUFFIX: &str = "cfargotunnel.com";

/// Base URL of the Cloudflare v4 REST API
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Docker container state that makes a container eligible for the startup scan
pub const CONTAINER_STATE_RUNNING: &str = "running";
