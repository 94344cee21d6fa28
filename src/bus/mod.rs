//! Event bus for portal notifications
//!
//! Uses tokio::sync::broadcast for pub/sub. Views and the CLI subscribe to
//! show transient notifications and to re-render when a cache slot changes.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::role::Role;

/// Severity of a transient notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

/// Cached collection that changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheSlot {
    Appointments,
    Dashboard,
    Profile,
    Doctors,
    Users,
}

/// Events published on the bus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum PortalEvent {
    /// Transient message for the user (toast)
    Notification {
        role: Role,
        level: Level,
        message: String,
    },
    SessionChanged { role: Role, authenticated: bool },
    CacheUpdated { role: Role, slot: CacheSlot },
    CacheCleared { role: Role },
}

/// Event bus handle for publishing and subscribing
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PortalEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, event: PortalEvent) {
        // No subscribers is fine
        let _ = self.sender.send(event);
    }

    pub fn notify(&self, role: Role, level: Level, message: impl Into<String>) {
        self.publish(PortalEvent::Notification {
            role,
            level,
            message: message.into(),
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PortalEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    /// 256 events
    fn default() -> Self {
        Self::new(256)
    }
}

/// Shared event bus wrapped in Arc for thread-safe sharing
pub type SharedBus = Arc<EventBus>;

pub fn create_bus() -> SharedBus {
    Arc::new(EventBus::default())
}
