use std::sync::Mutex;

use super::{EventPublisher, WorldUpdateEvent};

/// Best-effort delta event publisher.
///
/// State durability is intentionally decoupled from notification delivery:
/// by the time an event reaches this type the mutation is already committed,
/// so every transport failure (including "not connected") is caught, logged,
/// and discarded. Nothing is ever rolled back here.
pub struct DeltaPublisher {
    sink: Mutex<Box<dyn EventPublisher>>,
}

impl DeltaPublisher {
    pub fn new(sink: Box<dyn EventPublisher>) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    /// Serialize and publish `event` to its user topic, swallowing failures.
    pub fn publish(&self, event: &WorldUpdateEvent) {
        let topic = event.topic();
        let payload = match serde_json::to_vec(event) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(topic, error = %err, "delta event failed to serialize; dropped");
                return;
            }
        };
        let mut sink = match self.sink.lock() {
            Ok(sink) => sink,
            Err(_) => {
                tracing::warn!(topic, "delta sink poisoned; event dropped");
                return;
            }
        };
        if let Err(err) = sink.publish(&topic, &payload) {
            tracing::warn!(
                topic,
                snapshot_version = event.snapshot_version,
                error = %err,
                "delta publish failed; state change already committed"
            );
        } else {
            tracing::debug!(
                topic,
                snapshot_version = event.snapshot_version,
                changes = event.changes.len(),
                "delta event published"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{BufferPublisher, PublishError};

    struct DisconnectedPublisher;

    impl EventPublisher for DisconnectedPublisher {
        fn publish(&mut self, _topic: &str, _payload: &[u8]) -> Result<(), PublishError> {
            Err(PublishError::NotConnected)
        }
    }

    #[test]
    fn publishes_to_user_topic() {
        let buffer = BufferPublisher::new();
        let publisher = DeltaPublisher::new(Box::new(buffer.clone()));

        publisher.publish(&WorldUpdateEvent::new("demo", "alice", 1, 2, vec![]));

        let events = buffer.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "users.alice.world-updates");
    }

    #[test]
    fn transport_failure_is_swallowed() {
        let publisher = DeltaPublisher::new(Box::new(DisconnectedPublisher));
        // Must not panic or surface the error.
        publisher.publish(&WorldUpdateEvent::new("demo", "alice", 1, 2, vec![]));
    }
}
