use safety_map_server_models::{ApiEmergencyEvent, ApiReport};
use tokio::sync::broadcast;

/// Default capacity of the broadcast channel backing [`EventBus`].
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// A live event pushed to connected alert-stream clients.
#[derive(Debug, Clone)]
pub enum LiveEvent {
    /// A new incident report was accepted.
    ReportCreated(ApiReport),
    /// An SOS was triggered.
    EmergencyAlert(ApiEmergencyEvent),
}

impl LiveEvent {
    /// SSE event name for this variant.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ReportCreated(_) => "REPORT_CREATED",
            Self::EmergencyAlert(_) => "EMERGENCY_ALERT",
        }
    }

    /// JSON payload for this event.
    #[must_use]
    pub fn payload(&self) -> String {
        let serialized = match self {
            Self::ReportCreated(report) => serde_json::to_string(report),
            Self::EmergencyAlert(event) => serde_json::to_string(event),
        };
        serialized.unwrap_or_else(|e| {
            log::error!("Failed to serialize live event: {e:?}");
            "{}".to_string()
        })
    }
}

/// Formats a [`LiveEvent`] as a server-sent-events frame.
#[must_use]
pub fn sse_frame(event: &LiveEvent) -> String {
    format!("event: {}\ndata: {}\n\n", event.name(), event.payload())
}

/// Fan-out bus for live events. Cloning shares the underlying channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<LiveEvent>,
}

impl EventBus {
    /// Creates a bus whose channel buffers up to `capacity` events per
    /// subscriber before older ones are dropped.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all current subscribers. Events published
    /// while no subscriber is connected are discarded.
    pub fn publish(&self, event: LiveEvent) {
        let delivered = self.sender.send(event).unwrap_or(0);
        log::trace!("Published live event to {delivered} subscriber(s)");
    }

    /// Opens a new subscription starting at the next published event.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LiveEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use safety_map_incident_models::{IncidentSeverity, IncidentType, ReportStatus};

    use super::*;

    fn sample_report(id: u64) -> ApiReport {
        ApiReport {
            id,
            user_id: "anonymous".to_string(),
            latitude: 28.6139,
            longitude: 77.2090,
            incident_type: IncidentType::Theft,
            severity: IncidentSeverity::High,
            severity_value: 4,
            description: "Phone snatched near the metro exit".to_string(),
            reported_at: chrono::Utc::now(),
            verified: false,
            upvotes: 0,
            downvotes: 0,
            status: ReportStatus::Active,
        }
    }

    #[test]
    fn publish_without_subscribers_is_a_no_op() {
        let bus = EventBus::default();
        bus.publish(LiveEvent::ReportCreated(sample_report(1)));
    }

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(LiveEvent::ReportCreated(sample_report(7)));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.name(), "REPORT_CREATED");
        match event {
            LiveEvent::ReportCreated(report) => assert_eq!(report.id, 7),
            LiveEvent::EmergencyAlert(_) => panic!("expected a report event"),
        }
    }

    #[tokio::test]
    async fn slow_subscriber_observes_lag_then_newest_events() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();

        for id in 1..=4 {
            bus.publish(LiveEvent::ReportCreated(sample_report(id)));
        }

        match rx.recv().await {
            Err(broadcast::error::RecvError::Lagged(skipped)) => assert_eq!(skipped, 2),
            other => panic!("expected lag, got {other:?}"),
        }
        match rx.recv().await.unwrap() {
            LiveEvent::ReportCreated(report) => assert_eq!(report.id, 3),
            LiveEvent::EmergencyAlert(_) => panic!("expected a report event"),
        }
    }

    #[test]
    fn sse_frame_has_event_and_data_lines() {
        let frame = sse_frame(&LiveEvent::ReportCreated(sample_report(2)));

        assert!(frame.starts_with("event: REPORT_CREATED\ndata: {"));
        assert!(frame.ends_with("\n\n"));
        assert!(frame.contains("\"severity\":\"HIGH\""));
    }
}
