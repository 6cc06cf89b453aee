// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for the dry-run decorator.

#[cfg(test)]
mod tests {
    use crate::cloudflare::{DryRunGateway, RemoteGateway};
    use crate::entries::DnsRecordKind;
    use crate::test_support::MockGateway;

    #[tokio::test]
    async fn test_reads_pass_through() {
        let gateway = DryRunGateway::new(
            MockGateway::new()
                .with_zone("example.com", "example_zone_id")
                .with_record_id("example_zone_id", "host.example.com", "record_id"),
        );

        assert_eq!(
            gateway.zone_id("example.com").await.as_deref(),
            Some("example_zone_id")
        );
        assert_eq!(
            gateway
                .dns_record_id("example_zone_id", "host.example.com")
                .await
                .as_deref(),
            Some("record_id")
        );
        assert!(gateway.dns_records("example_zone_id").await.is_some());
        assert!(gateway.tunnel_ingress("account_id", "tunnel_id").await.is_some());
    }

    #[tokio::test]
    async fn test_mutations_are_skipped_but_report_success() {
        let mock = MockGateway::new();
        let gateway = DryRunGateway::new(mock);

        assert!(
            gateway
                .create_dns_record(
                    DnsRecordKind::CNAME,
                    "example_zone_id",
                    "host.example.com",
                    "target.example.com",
                    true,
                )
                .await
        );
        assert!(gateway.delete_dns_record("example_zone_id", "record_id").await);
        assert!(
            gateway
                .replace_tunnel_ingress("account_id", "tunnel_id", &[])
                .await
        );
    }

    #[tokio::test]
    async fn test_inner_gateway_never_sees_a_mutation() {
        let gateway = DryRunGateway::new(MockGateway::new());

        gateway
            .create_dns_record(
                DnsRecordKind::A,
                "example_zone_id",
                "bare.example.com",
                "203.0.113.10",
                false,
            )
            .await;
        gateway.delete_dns_record("example_zone_id", "record_id").await;
        gateway
            .replace_tunnel_ingress("account_id", "tunnel_id", &[])
            .await;
        gateway.zone_id("example.com").await;

        // Only the read reached the wrapped gateway.
        assert_eq!(gateway.inner().calls(), vec!["zone_id example.com"]);
    }
}
