//! Multi-document coordination.
//!
//! An [`UndoGroup`] holds one stack per edited subject and forwards undo and
//! redo to whichever stack is active.

mod registry;

pub use registry::UndoGroup;
