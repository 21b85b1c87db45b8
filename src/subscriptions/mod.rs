//! Notifications emitted by undo stacks.
//!
//! A stack reports cursor, clean-state, availability and text changes
//! through the [`UndoEvents`] callbacks. [`EventBroadcaster`] implements
//! those callbacks by fanning events out to bounded channels:
//!
//! ```ignore
//! let broadcaster = Arc::new(EventBroadcaster::new());
//! stack.set_subscriber(Box::new(Arc::clone(&broadcaster)));
//!
//! let handle = broadcaster.subscribe(SubscriptionConfig {
//!     filter: EventFilter::menu(),
//!     ..Default::default()
//! });
//!
//! stack.push(cmd);
//! for event in handle.drain() {
//!     println!("{:?}", event);
//! }
//! ```

mod manager;
mod types;

pub use manager::EventBroadcaster;
pub use types::{
    DropReason, EventFilter, SubscriptionConfig, SubscriptionHandle, SubscriptionId, UndoEvent,
    UndoEvents,
};
