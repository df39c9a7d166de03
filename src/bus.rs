// src/bus.rs

//! In-process publish/subscribe bus shared by the detector, the discovery
//! phase and whatever consumes package changes.
//!
//! Backed by a `tokio::sync::broadcast` channel: every subscriber sees every
//! event posted after it subscribed, in posting order.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

use crate::descriptor::{PackageChange, SourceDescriptor, TargetDescriptor};

/// Default capacity of the broadcast ring buffer.
pub const DEFAULT_BUS_CAPACITY: usize = 256;

/// Events flowing over the bus.
#[derive(Debug, Clone)]
pub enum BusEvent {
    /// Discovery finished; these are the known source packages.
    SourceInitialized(Arc<SourceDescriptor>),
    /// A (new) target was selected for development.
    TargetSelected(Arc<TargetDescriptor>),
    /// One coalesced batch of package changes.
    PackagesChanged(Vec<PackageChange>),
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

impl BusEvent {
    fn label(&self) -> &'static str {
        match self {
            BusEvent::SourceInitialized(_) => "sourceInitialized",
            BusEvent::TargetSelected(_) => "targetSelected",
            BusEvent::PackagesChanged(_) => "packagesChanged",
            BusEvent::ShutdownRequested => "shutdownRequested",
        }
    }
}

/// Cloneable handle to the bus.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<BusEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUS_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Register a new listener. It only sees events posted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.tx.subscribe()
    }

    /// Post an event to all current listeners.
    ///
    /// Returns the number of listeners that received it. Posting with no
    /// listeners is not an error; the event is simply dropped.
    pub fn post(&self, event: BusEvent) -> usize {
        let label = event.label();
        match self.tx.send(event) {
            Ok(n) => {
                debug!(event = label, listeners = n, "posted bus event");
                n
            }
            Err(_) => {
                debug!(event = label, "posted bus event with no listeners");
                0
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_events_in_posting_order() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.post(BusEvent::PackagesChanged(Vec::new()));
        bus.post(BusEvent::ShutdownRequested);

        assert!(matches!(rx.recv().await, Ok(BusEvent::PackagesChanged(_))));
        assert!(matches!(rx.recv().await, Ok(BusEvent::ShutdownRequested)));
    }

    #[test]
    fn posting_without_listeners_is_not_an_error() {
        let bus = EventBus::new();
        assert_eq!(bus.post(BusEvent::ShutdownRequested), 0);
    }
}
