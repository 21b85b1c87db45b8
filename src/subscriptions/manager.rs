//! Fan-out of stack notifications to channel subscribers.

use crossbeam_channel::{bounded, Sender};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use super::types::{
    DropReason, SubscriptionConfig, SubscriptionHandle, SubscriptionId, UndoEvent, UndoEvents,
};

/// Internal subscription state.
struct Subscription {
    config: SubscriptionConfig,
    sender: Sender<UndoEvent>,
}

impl Subscription {
    /// Try to send an event. Returns false if buffer is full (subscriber will be dropped).
    fn try_send(&self, event: UndoEvent) -> bool {
        self.sender.try_send(event).is_ok()
    }
}

/// Broadcasts stack notifications to any number of subscriptions.
///
/// Install an `Arc<EventBroadcaster>` as a stack's subscriber and keep a
/// clone to add or remove listeners later. Receivers may live on other
/// threads even though the stack itself does not.
pub struct EventBroadcaster {
    /// Active subscriptions by ID.
    subscriptions: RwLock<HashMap<SubscriptionId, Subscription>>,
    /// Counter for generating subscription IDs.
    next_id: AtomicU64,
}

impl EventBroadcaster {
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a new subscription.
    pub fn subscribe(&self, config: SubscriptionConfig) -> SubscriptionHandle {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = bounded(config.buffer_size);

        self.subscriptions
            .write()
            .insert(id, Subscription { config, sender });

        SubscriptionHandle { id, receiver }
    }

    /// Unsubscribe and clean up.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut subs = self.subscriptions.write();
        if let Some(sub) = subs.remove(&id) {
            // Best effort
            let _ = sub.sender.try_send(UndoEvent::Dropped {
                reason: DropReason::Unsubscribed,
            });
        }
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Send `event` to every matching subscription. Drops subscribers that
    /// fail to receive.
    pub fn broadcast(&self, event: UndoEvent) {
        let mut to_remove = Vec::new();

        {
            let subs = self.subscriptions.read();
            for (id, sub) in subs.iter() {
                if sub.config.filter.matches(&event) && !sub.try_send(event.clone()) {
                    to_remove.push(*id);
                }
            }
        }

        if !to_remove.is_empty() {
            let mut subs = self.subscriptions.write();
            for id in to_remove {
                if let Some(sub) = subs.remove(&id) {
                    debug!(subscription = id.0, "dropping slow undo event subscriber");
                    let _ = sub.sender.try_send(UndoEvent::Dropped {
                        reason: DropReason::BufferOverflow,
                    });
                }
            }
        }
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoEvents for Arc<EventBroadcaster> {
    fn index_changed(&mut self, index: usize) {
        self.broadcast(UndoEvent::IndexChanged { index });
    }

    fn clean_changed(&mut self, clean: bool) {
        self.broadcast(UndoEvent::CleanChanged { clean });
    }

    fn can_undo_changed(&mut self, can_undo: bool) {
        self.broadcast(UndoEvent::CanUndoChanged { can_undo });
    }

    fn can_redo_changed(&mut self, can_redo: bool) {
        self.broadcast(UndoEvent::CanRedoChanged { can_redo });
    }

    fn undo_text_changed(&mut self, text: &str) {
        self.broadcast(UndoEvent::UndoTextChanged {
            text: text.to_string(),
        });
    }

    fn redo_text_changed(&mut self, text: &str) {
        self.broadcast(UndoEvent::RedoTextChanged {
            text: text.to_string(),
        });
    }
}
