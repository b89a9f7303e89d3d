//! Event fan-out to any number of observers
//!
//! Publishing never blocks: every observer has a bounded backlog, and an
//! observer that falls further behind than that is told how many events it
//! lost and then disconnected. Other observers and the publishing download
//! tasks are unaffected.

use crate::types::Event;
use tokio::sync::broadcast;

/// Destination for state-transition events
///
/// The state machine only knows this trait, so tests can capture events
/// without a real subscriber.
pub trait EventSink: Send + Sync {
    /// Publish an event to all current observers
    fn publish(&self, event: Event);
}

/// Many-producer, many-consumer event fan-out
#[derive(Clone, Debug)]
pub struct EventBroadcaster {
    tx: broadcast::Sender<Event>,
}

impl EventBroadcaster {
    /// Create a broadcaster with the given per-observer backlog
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Register a new observer
    ///
    /// The observer only sees events published from now on. Current state of
    /// earlier downloads is available from the registry.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: Some(self.tx.subscribe()),
        }
    }

    /// Remove an observer
    pub fn unsubscribe(&self, subscription: Subscription) {
        drop(subscription);
    }

    /// Number of connected observers
    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl EventSink for EventBroadcaster {
    fn publish(&self, event: Event) {
        tracing::trace!(event = event.name(), download_id = ?event.download_id(), "publishing event");
        // Err only means nobody is listening
        self.tx.send(event).ok();
    }
}

/// Why a subscription stopped delivering events
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SubscriptionError {
    /// The observer fell behind and was disconnected
    #[error("observer fell behind by {skipped} events and was disconnected")]
    Overloaded {
        /// Number of events the observer missed
        skipped: u64,
    },
    /// The subscription has ended
    #[error("event stream closed")]
    Closed,
}

/// One observer's view of the event stream
#[derive(Debug)]
pub struct Subscription {
    rx: Option<broadcast::Receiver<Event>>,
}

impl Subscription {
    /// Wait for the next event
    ///
    /// After an `Overloaded` error the subscription is closed for good and
    /// every later call returns `Closed`.
    pub async fn recv(&mut self) -> Result<Event, SubscriptionError> {
        let Some(rx) = self.rx.as_mut() else {
            return Err(SubscriptionError::Closed);
        };

        match rx.recv().await {
            Ok(event) => Ok(event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event observer fell behind, disconnecting");
                self.rx = None;
                Err(SubscriptionError::Overloaded { skipped })
            }
            Err(broadcast::error::RecvError::Closed) => {
                self.rx = None;
                Err(SubscriptionError::Closed)
            }
        }
    }

    /// Whether the subscription can still deliver events
    pub fn is_open(&self) -> bool {
        self.rx.is_some()
    }
}
