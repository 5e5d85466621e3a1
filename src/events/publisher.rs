//! Publisher trait and the bundled implementations.

use std::fmt;
use std::sync::{Arc, Mutex};

#[cfg(feature = "emitter")]
use event_emitter_rs::EventEmitter;

/// Trait for publishing event payloads to a topic.
///
/// This is the transport capability the store consumes; delivery itself is
/// someone else's problem. Implementations may fail — the delta publisher
/// treats every failure as non-fatal.
pub trait EventPublisher: Send {
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), PublishError>;
}

/// Error type for publish operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// No connection to the transport.
    NotConnected,
    /// Connection to the transport failed.
    ConnectionFailed(String),
    /// Serialization of the payload failed.
    SerializationFailed(String),
    /// The transport rejected the event.
    Rejected(String),
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishError::NotConnected => write!(f, "not connected"),
            PublishError::ConnectionFailed(msg) => write!(f, "connection failed: {}", msg),
            PublishError::SerializationFailed(msg) => write!(f, "serialization failed: {}", msg),
            PublishError::Rejected(msg) => write!(f, "event rejected: {}", msg),
        }
    }
}

impl std::error::Error for PublishError {}

/// A publisher that writes events to the log. The default sink.
pub struct LogPublisher;

impl EventPublisher for LogPublisher {
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        tracing::info!(topic, payload = %String::from_utf8_lossy(payload), "event published");
        Ok(())
    }
}

/// A publisher that captures events in a shared buffer, for tests and
/// local inspection. Clone-friendly: clones share the buffer.
#[derive(Clone, Default)]
pub struct BufferPublisher {
    events: Arc<Mutex<Vec<(String, String)>>>,
}

impl BufferPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `(topic, payload)` pairs published so far.
    pub fn events(&self) -> Vec<(String, String)> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(_) => Vec::new(),
        }
    }
}

impl EventPublisher for BufferPublisher {
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        let mut events = self
            .events
            .lock()
            .map_err(|_| PublishError::Rejected("buffer poisoned".to_string()))?;
        events.push((
            topic.to_string(),
            String::from_utf8_lossy(payload).into_owned(),
        ));
        Ok(())
    }
}

/// A publisher that emits events via an `EventEmitter` for in-process
/// subscribers.
#[cfg(feature = "emitter")]
pub struct EmitterPublisher {
    emitter: EventEmitter,
}

#[cfg(feature = "emitter")]
impl EmitterPublisher {
    pub fn new(emitter: EventEmitter) -> Self {
        Self { emitter }
    }
}

#[cfg(feature = "emitter")]
impl EventPublisher for EmitterPublisher {
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        // The emitter wants UTF-8; payloads here are always JSON.
        let payload_str = String::from_utf8_lossy(payload).into_owned();
        self.emitter.emit(topic, payload_str);
        Ok(())
    }
}
