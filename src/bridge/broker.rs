//! Fan-out interface for bridged-client lifecycle events and status metadata.
//!
//! The broker never owns a [`BridgedClient`][super::BridgedClient]; it is handed a reference
//! to identify which session an event belongs to and reports back by identifier, keeping
//! ownership one-way (client owns connection, broker observes the client).

use std::fmt;

/// Lifecycle and protocol events a [`crate::bridge::BridgedClient`] reports to its broker.
#[derive(Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum BridgeEvent {
    /// Registration with the IRC network completed.
    ClientConnected,
    /// The connection instance reported a terminal disconnect.
    ClientDisconnected {
        /// The last known disconnect reason, if any was recorded.
        reason: Option<String>,
    },
    /// The session's own nick changed, whether self- or server-initiated.
    NickChange {
        /// The nick before the change.
        old: String,
        /// The nick after the change.
        new: String,
    },
    /// A `JoinChannel` attempt failed with a terminal protocol error.
    JoinError {
        /// The channel the join targeted.
        channel: String,
        /// The lowercase numeric-error identifier (e.g. `err_bannedfromchan`).
        code: String,
    },
}

/// A human-readable status line delivered to the home side, alongside the client it concerns.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Metadata {
    /// The identifier of the session the metadata concerns (the instance id).
    pub instance_id: String,
    /// Human-readable text.
    pub text: String,
    /// When set, the broker must surface `text` to the end user regardless of verbosity
    /// configuration (used for critical protocol errors).
    pub force_notice: bool,
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Consumer of a bridged client's lifecycle events and status metadata.
///
/// Implementations typically forward to the home-side protocol; this crate only specifies
/// the interface and ships [`LoggingEventBroker`] as a default, test-friendly implementation.
pub trait EventBroker: Send + Sync {
    /// Called once per event, identified by `instance_id`.
    fn on_event(&self, instance_id: &str, event: BridgeEvent);

    /// Called to deliver a status line; see [`Metadata::force_notice`].
    fn on_metadata(&self, metadata: Metadata);
}

/// Default [`EventBroker`] that logs every event and metadata line via `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingEventBroker;

impl EventBroker for LoggingEventBroker {
    fn on_event(&self, instance_id: &str, event: BridgeEvent) {
        match &event {
            BridgeEvent::ClientConnected => {
                tracing::info!(instance_id, "client-connected");
            }
            BridgeEvent::ClientDisconnected { reason } => {
                tracing::info!(instance_id, ?reason, "client-disconnected");
            }
            BridgeEvent::NickChange { old, new } => {
                tracing::info!(instance_id, old, new, "nick-change");
            }
            BridgeEvent::JoinError { channel, code } => {
                tracing::warn!(instance_id, channel, code, "join-error");
            }
        }
    }

    fn on_metadata(&self, metadata: Metadata) {
        if metadata.force_notice {
            tracing::warn!(instance_id = %metadata.instance_id, "{}", metadata.text);
        } else {
            tracing::debug!(instance_id = %metadata.instance_id, "{}", metadata.text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingBroker {
        events: Mutex<Vec<(String, BridgeEvent)>>,
        metadata: Mutex<Vec<Metadata>>,
    }

    impl EventBroker for RecordingBroker {
        fn on_event(&self, instance_id: &str, event: BridgeEvent) {
            self.events.lock().unwrap().push((instance_id.to_string(), event));
        }
        fn on_metadata(&self, metadata: Metadata) {
            self.metadata.lock().unwrap().push(metadata);
        }
    }

    #[test]
    fn records_events_by_instance_id() {
        let broker = RecordingBroker::default();
        broker.on_event("inst-1", BridgeEvent::ClientConnected);
        let events = broker.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "inst-1");
        assert_eq!(events[0].1, BridgeEvent::ClientConnected);
    }

    #[test]
    fn force_notice_flag_is_preserved() {
        let broker = RecordingBroker::default();
        broker.on_metadata(Metadata {
            instance_id: "inst-1".into(),
            text: "banned".into(),
            force_notice: true,
        });
        assert!(broker.metadata.lock().unwrap()[0].force_notice);
    }
}
