//! Commands: the reversible units stored on a stack.
//!
//! [`Command`] is the behavior contract implemented by application code.
//! [`UndoCommand`] wraps a command with display text and owned children,
//! which is how macros and compound commands are represented.

mod node;
mod property;

pub use node::{Command, UndoCommand};
pub use property::{Property, PropertyCommand};
