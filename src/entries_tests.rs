// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for the desired-state entry types and pure derivations.

#[cfg(test)]
mod tests {
    use crate::entries::{
        registrable_zone, tunnel_dns_value, DnsEntry, DnsRecordKind, TunnelEntry,
    };

    fn tunnel_entry() -> TunnelEntry {
        TunnelEntry {
            hostname: "host.example.com".to_string(),
            service: "http://service:80".to_string(),
            zone_name: "example.com".to_string(),
            zone_id: "example_zone_id".to_string(),
            tunnel_id: "tunnel_id".to_string(),
            no_tls_verify: None,
        }
    }

    #[test]
    fn test_registrable_zone_two_labels_is_itself() {
        assert_eq!(registrable_zone("example.com"), "example.com");
    }

    #[test]
    fn test_registrable_zone_takes_last_two_labels() {
        assert_eq!(registrable_zone("host.example.com"), "example.com");
        assert_eq!(registrable_zone("api.svc.example.com"), "example.com");
    }

    #[test]
    fn test_registrable_zone_multi_label_suffix_limitation() {
        // Known limitation: public suffix lists are not consulted.
        assert_eq!(registrable_zone("shop.example.co.uk"), "co.uk");
    }

    #[test]
    fn test_tunnel_dns_value() {
        assert_eq!(tunnel_dns_value("tunnel_id"), "tunnel_id.cfargotunnel.com");
    }

    #[test]
    fn test_dns_projection_is_proxied_cname_at_the_tunnel() {
        let dns = tunnel_entry().dns_entry();
        assert_eq!(dns.kind, DnsRecordKind::CNAME);
        assert_eq!(dns.name, "host.example.com");
        assert_eq!(dns.value, "tunnel_id.cfargotunnel.com");
        assert_eq!(dns.zone_id, "example_zone_id");
        assert!(dns.proxied);
    }

    #[test]
    fn test_identity_ignores_value_and_proxied() {
        let left = DnsEntry {
            kind: DnsRecordKind::CNAME,
            name: "host.example.com".to_string(),
            value: "one.example.com".to_string(),
            zone_id: "example_zone_id".to_string(),
            proxied: true,
        };
        let right = DnsEntry {
            value: "two.example.com".to_string(),
            proxied: false,
            ..left.clone()
        };
        assert_eq!(left.identity(), right.identity());
    }

    #[test]
    fn test_record_kind_display() {
        assert_eq!(DnsRecordKind::A.to_string(), "A");
        assert_eq!(DnsRecordKind::CNAME.to_string(), "CNAME");
    }

    #[test]
    fn test_entry_display_for_logs() {
        assert_eq!(
            tunnel_entry().to_string(),
            "host.example.com -> http://service:80"
        );
    }
}
