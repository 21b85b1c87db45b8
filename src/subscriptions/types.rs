//! Notification contract and subscription types.

use serde::{Deserialize, Serialize};

/// Callbacks fired synchronously by an [`UndoStack`](crate::UndoStack).
///
/// Every method defaults to a no-op, so subscribers implement only what
/// they render.
pub trait UndoEvents {
    fn index_changed(&mut self, _index: usize) {}
    fn clean_changed(&mut self, _clean: bool) {}
    fn can_undo_changed(&mut self, _can_undo: bool) {}
    fn can_redo_changed(&mut self, _can_redo: bool) {}
    fn undo_text_changed(&mut self, _text: &str) {}
    fn redo_text_changed(&mut self, _text: &str) {}
}

/// Owned form of a stack notification, as delivered over a channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UndoEvent {
    IndexChanged { index: usize },
    CleanChanged { clean: bool },
    CanUndoChanged { can_undo: bool },
    CanRedoChanged { can_redo: bool },
    UndoTextChanged { text: String },
    RedoTextChanged { text: String },

    /// Subscription was dropped; no further events follow.
    Dropped { reason: DropReason },
}

/// Why a subscription was dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Send buffer overflowed (slow consumer).
    BufferOverflow,
    /// Explicitly unsubscribed.
    Unsubscribed,
}

/// Which notifications a subscription receives.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// `IndexChanged`.
    pub include_index: bool,
    /// `CleanChanged`.
    pub include_clean: bool,
    /// `CanUndoChanged` and `CanRedoChanged`.
    pub include_availability: bool,
    /// `UndoTextChanged` and `RedoTextChanged`.
    pub include_text: bool,
}

impl EventFilter {
    /// Everything.
    pub fn all() -> Self {
        Self {
            include_index: true,
            include_clean: true,
            include_availability: true,
            include_text: true,
        }
    }

    /// Only clean-state transitions (dirty markers in a title bar).
    pub fn clean() -> Self {
        Self {
            include_clean: true,
            ..Default::default()
        }
    }

    /// Availability and text (undo/redo menu entries).
    pub fn menu() -> Self {
        Self {
            include_availability: true,
            include_text: true,
            ..Default::default()
        }
    }

    pub(crate) fn matches(&self, event: &UndoEvent) -> bool {
        match event {
            UndoEvent::IndexChanged { .. } => self.include_index,
            UndoEvent::CleanChanged { .. } => self.include_clean,
            UndoEvent::CanUndoChanged { .. } | UndoEvent::CanRedoChanged { .. } => {
                self.include_availability
            }
            UndoEvent::UndoTextChanged { .. } | UndoEvent::RedoTextChanged { .. } => {
                self.include_text
            }
            UndoEvent::Dropped { .. } => true,
        }
    }
}

/// Configuration for a subscription.
#[derive(Clone, Debug)]
pub struct SubscriptionConfig {
    /// Max buffered events before dropping subscriber.
    /// Default: 1000
    pub buffer_size: usize,

    /// Filter criteria.
    pub filter: EventFilter,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            buffer_size: 1000,
            filter: EventFilter::all(),
        }
    }
}

/// Unique identifier for a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Handle to receive events of one subscription.
pub struct SubscriptionHandle {
    pub id: SubscriptionId,
    /// Channel to receive events.
    pub receiver: crossbeam_channel::Receiver<UndoEvent>,
}

impl SubscriptionHandle {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<UndoEvent, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<UndoEvent, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<UndoEvent, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Collect every event currently buffered.
    pub fn drain(&self) -> Vec<UndoEvent> {
        self.receiver.try_iter().collect()
    }
}
