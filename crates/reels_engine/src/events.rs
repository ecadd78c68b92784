use std::sync::{Arc, PoisonError, RwLock};

use reels_core::ReelEvent;
use tokio::sync::mpsc;

/// Receives pipeline notifications. Called synchronously; must not block.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &ReelEvent);
}

impl<F> EventSink for F
where
    F: Fn(&ReelEvent) + Send + Sync,
{
    fn emit(&self, event: &ReelEvent) {
        self(event)
    }
}

/// Forwards events into an unbounded channel.
pub struct ChannelEventSink {
    tx: mpsc::UnboundedSender<ReelEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::UnboundedSender<ReelEvent>) -> Self {
        Self { tx }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ReelEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: &ReelEvent) {
        let _ = self.tx.send(event.clone());
    }
}

/// Fan-out point for listeners. Delivery follows registration order.
#[derive(Clone, Default)]
pub struct EventHub {
    listeners: Arc<RwLock<Vec<Arc<dyn EventSink>>>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, sink: Arc<dyn EventSink>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sink);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn emit(&self, event: ReelEvent) {
        // Listeners may subscribe from inside a callback; deliver from a copy.
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener.emit(&event);
        }
    }
}
