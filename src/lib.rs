//! # Undo Engine
//!
//! A generic undo/redo command stack that can be serialized together with
//! the object it edits.
//!
//! ## Core Concepts
//!
//! - **Commands**: reversible edits, grouped into trees for macros
//! - **Stacks**: a linear history with a cursor, clean tracking and limits
//! - **Groups**: one stack per open document, one of them active
//! - **Envelopes**: a stack plus metadata, encoded as URL-safe text
//!
//! ## Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use serde::{Deserialize, Serialize};
//! use undo_engine::{Command, HistoryEnvelope, UndoCommand, UndoStack};
//!
//! #[derive(Clone, Debug, Serialize, Deserialize)]
//! struct Add(i64);
//!
//! impl Command for Add {
//!     type Subject = i64;
//!
//!     fn apply(&mut self, total: &mut i64) {
//!         *total += self.0;
//!     }
//!
//!     fn revert(&mut self, total: &mut i64) {
//!         *total -= self.0;
//!     }
//! }
//!
//! let total = Rc::new(RefCell::new(0));
//! let mut stack = UndoStack::new(Rc::clone(&total));
//! stack.push(UndoCommand::new("add 5", Add(5)));
//! stack.push(UndoCommand::new("add 2", Add(2)));
//! stack.undo();
//! assert_eq!(*total.borrow(), 5);
//! assert_eq!(stack.redo_text(), "add 2");
//!
//! let text = HistoryEnvelope::new("totals", 1, stack).encode(true)?;
//! let restored = HistoryEnvelope::<Add>::decode(&text)?;
//! assert_eq!(*restored.stack().subject().borrow(), 5);
//! # Ok::<(), undo_engine::HistoryError>(())
//! ```

pub mod codec;
pub mod command;
pub mod envelope;
pub mod error;
pub mod group;
pub mod stack;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use command::{Command, Property, PropertyCommand, UndoCommand};
pub use envelope::HistoryEnvelope;
pub use error::{HistoryError, Result};
pub use group::UndoGroup;
pub use stack::UndoStack;
pub use subscriptions::{
    DropReason, EventBroadcaster, EventFilter, SubscriptionConfig, SubscriptionHandle,
    SubscriptionId, UndoEvent, UndoEvents,
};
pub use types::{EncodeOptions, StackConfig, StackId, DEFAULT_COMPRESSION_LEVEL};
