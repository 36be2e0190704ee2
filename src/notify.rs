use dashmap::DashMap;
use tokio::sync::broadcast;
use ulid::Ulid;

use crate::model::Event;

const CHANNEL_CAPACITY: usize = 256;

/// Broadcast hub for booking lifecycle events, one channel per user.
pub struct NotifyHub {
    channels: DashMap<Ulid, broadcast::Sender<Event>>,
}

impl Default for NotifyHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyHub {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Subscribe to a user's events. Creates the channel if needed.
    pub fn subscribe(&self, user: Ulid) -> broadcast::Receiver<Event> {
        let sender = self
            .channels
            .entry(user)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);
        sender.subscribe()
    }

    /// Send a notification. No-op if nobody is listening.
    pub fn send(&self, user: Ulid, event: &Event) {
        if let Some(sender) = self.channels.get(&user) {
            let _ = sender.send(event.clone());
        }
    }
}
