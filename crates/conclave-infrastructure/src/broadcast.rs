//! Broadcast-channel event bus.
//!
//! Fans session events out to subscribers over per-session
//! `tokio::sync::broadcast` channels. Delivery is best-effort: lagging
//! receivers drop events on their side, and a send with no subscribers is
//! not an error. The persisted conversation remains the authoritative
//! record.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::sync::broadcast;
use tracing::debug;

use conclave_core::event::{EventBroadcaster, SessionEvent};

const CHANNEL_CAPACITY: usize = 64;

/// Per-session broadcast fan-out.
#[derive(Default)]
pub struct BroadcastEventBus {
    channels: RwLock<HashMap<String, broadcast::Sender<SessionEvent>>>,
}

impl BroadcastEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to one session's event stream.
    ///
    /// Subscribing before the session exists is fine; the channel is
    /// created on first use from either side.
    pub async fn subscribe(&self, session_id: &str) -> broadcast::Receiver<SessionEvent> {
        let mut channels = self.channels.write().await;
        channels
            .entry(session_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Drops a session's channel once no more events are expected.
    pub async fn remove(&self, session_id: &str) {
        let mut channels = self.channels.write().await;
        channels.remove(session_id);
    }
}

#[async_trait]
impl EventBroadcaster for BroadcastEventBus {
    async fn broadcast(&self, session_id: &str, event: SessionEvent) {
        let sender = {
            let channels = self.channels.read().await;
            channels.get(session_id).cloned()
        };
        let Some(sender) = sender else {
            // Nobody ever subscribed; nothing to deliver.
            return;
        };
        if sender.send(event).is_err() {
            debug!(
                session_id = %session_id,
                "[BroadcastEventBus] No active subscribers, event dropped"
            );
        }
    }
}
