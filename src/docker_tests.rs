// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for Docker event and container summary conversion.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use bollard::models::{ContainerSummary, EventActor, EventMessage, EventMessageTypeEnum};

    use crate::docker::{event_from_message, workload_from_summary, ContainerEventKind};

    fn attributes(name: &str) -> HashMap<String, String> {
        HashMap::from([
            ("name".to_string(), name.to_string()),
            (
                "cloudflare.zero_trust.access.tunnel.public_hostname".to_string(),
                "host.example.com".to_string(),
            ),
        ])
    }

    fn container_event(action: &str, actor: Option<EventActor>) -> EventMessage {
        EventMessage {
            typ: Some(EventMessageTypeEnum::CONTAINER),
            action: Some(action.to_string()),
            actor,
            ..Default::default()
        }
    }

    #[test]
    fn test_event_kind_from_action() {
        assert_eq!(
            ContainerEventKind::from_action("start"),
            Some(ContainerEventKind::Start)
        );
        assert_eq!(
            ContainerEventKind::from_action("die"),
            Some(ContainerEventKind::Die)
        );
        assert_eq!(ContainerEventKind::from_action("restart"), None);
    }

    #[test]
    fn test_container_start_event_converts() {
        let message = container_event(
            "start",
            Some(EventActor {
                id: Some("abc123".to_string()),
                attributes: Some(attributes("web")),
            }),
        );

        let event = event_from_message(&message).unwrap();
        assert_eq!(event.kind, ContainerEventKind::Start);
        assert_eq!(event.container_name, "web");
        assert!(event
            .labels
            .contains_key("cloudflare.zero_trust.access.tunnel.public_hostname"));
    }

    #[test]
    fn test_non_container_event_is_dropped() {
        let message = EventMessage {
            typ: Some(EventMessageTypeEnum::NETWORK),
            action: Some("start".to_string()),
            ..Default::default()
        };

        assert!(event_from_message(&message).is_none());
    }

    #[test]
    fn test_unrecognized_action_is_dropped() {
        let message = container_event(
            "pause",
            Some(EventActor {
                id: None,
                attributes: Some(attributes("web")),
            }),
        );

        assert!(event_from_message(&message).is_none());
    }

    #[test]
    fn test_event_missing_actor_attributes_is_dropped() {
        assert!(event_from_message(&container_event("die", None)).is_none());

        let no_name = container_event(
            "die",
            Some(EventActor {
                id: None,
                attributes: Some(HashMap::new()),
            }),
        );
        assert!(event_from_message(&no_name).is_none());
    }

    #[test]
    fn test_workload_from_summary_strips_name_slash() {
        let summary = ContainerSummary {
            names: Some(vec!["/web".to_string()]),
            state: Some("running".to_string()),
            labels: Some(attributes("web")),
            ..Default::default()
        };

        let workload = workload_from_summary(summary);
        assert_eq!(workload.name, "web");
        assert!(workload.running);
        assert!(!workload.labels.is_empty());
    }

    #[test]
    fn test_workload_from_summary_non_running_state() {
        let summary = ContainerSummary {
            names: Some(vec!["/web".to_string()]),
            state: Some("exited".to_string()),
            ..Default::default()
        };

        let workload = workload_from_summary(summary);
        assert!(!workload.running);
        assert!(workload.labels.is_empty());
    }
}
