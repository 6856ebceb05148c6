//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`GamificationEvent`]s.
//! It is injected into the engine as `Arc<EventBus>`; whichever UI or
//! background component is currently interested subscribes, and nothing
//! holds a process-global mutable callback. Publishing with zero
//! subscribers is a silent no-op.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use viblog_core::actions::PointAction;
use viblog_core::types::DbId;

// ---------------------------------------------------------------------------
// GamificationEvent
// ---------------------------------------------------------------------------

/// A point-in-time gamification event, delivered to current listeners.
///
/// Events are fire-and-forget: they duplicate information already durable
/// in the store (ledger rows, grants, notifications) so a dropped event is
/// never a correctness problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GamificationEvent {
    XpAwarded {
        visitor_id: DbId,
        action: PointAction,
        points: i32,
        new_total: i64,
    },
    LevelUp {
        visitor_id: DbId,
        level: i32,
    },
    BadgeEarned {
        visitor_id: DbId,
        badge_slug: String,
    },
    StreakMilestone {
        visitor_id: DbId,
        days: i32,
    },
    DailyTasksCompleted {
        visitor_id: DbId,
        day: chrono::NaiveDate,
    },
}

/// An event stamped with its publication time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishedEvent {
    pub event: GamificationEvent,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so any number of subscribers can
/// independently receive every published event.
pub struct EventBus {
    sender: broadcast::Sender<PublishedEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest un-consumed messages are dropped
    /// and slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: GamificationEvent) {
        // Ignore the SendError -- it only means there are zero receivers.
        let _ = self.sender.send(PublishedEvent {
            event,
            timestamp: Utc::now(),
        });
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
