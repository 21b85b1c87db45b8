//! The command contract and the composite command tree.

use serde::{Deserialize, Serialize};

/// A reversible change to a subject.
///
/// Implementors are usually the variants of one application enum: the enum
/// is the registry of command kinds, and serde's variant tags are what
/// revive the right behavior when a history is decoded.
///
/// `apply` and `revert` must be inverses: applying then reverting leaves the
/// subject observably unchanged.
pub trait Command {
    /// The edited object.
    type Subject;

    /// Perform the forward effect.
    fn apply(&mut self, subject: &mut Self::Subject);

    /// Perform the reverse effect.
    fn revert(&mut self, subject: &mut Self::Subject);

    /// Compression identity. `None` means the command never merges.
    fn merge_id(&self) -> Option<u32> {
        None
    }

    /// Fold `next` (already applied) into this command.
    ///
    /// Returns the replacement for this command whose `apply` has the effect
    /// of both, or `None` when the two cannot be combined.
    fn merge(&self, next: &Self) -> Option<Self>
    where
        Self: Sized,
    {
        let _ = next;
        None
    }
}

/// A node of the command tree stored on an [`UndoStack`](crate::UndoStack).
///
/// A node carries display text, an optional action and an ordered list of
/// owned children. A node without children applies its action; a composite
/// (macro) applies its children in order and reverts them in reverse order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UndoCommand<C> {
    text: String,
    action: Option<C>,
    children: Vec<UndoCommand<C>>,
}

impl<C> UndoCommand<C> {
    /// Create a leaf command.
    pub fn new(text: impl Into<String>, action: C) -> Self {
        Self {
            text: text.into(),
            action: Some(action),
            children: Vec::new(),
        }
    }

    /// Create an empty composite command. Children are added with
    /// [`add_child`](Self::add_child) or [`with_child`](Self::with_child).
    pub fn composite(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: None,
            children: Vec::new(),
        }
    }

    /// Append `child` and return a reference to it.
    pub fn add_child(&mut self, child: UndoCommand<C>) -> &mut UndoCommand<C> {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Builder form of [`add_child`](Self::add_child).
    pub fn with_child(mut self, child: UndoCommand<C>) -> Self {
        self.children.push(child);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// The action of a leaf command.
    pub fn action(&self) -> Option<&C> {
        self.action.as_ref()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Child at `index`, or `None` when out of range.
    pub fn child(&self, index: usize) -> Option<&UndoCommand<C>> {
        self.children.get(index)
    }

    pub fn children(&self) -> &[UndoCommand<C>] {
        &self.children
    }

    pub(crate) fn last_child_mut(&mut self) -> Option<&mut UndoCommand<C>> {
        self.children.last_mut()
    }

    pub(crate) fn push_child(&mut self, child: UndoCommand<C>) {
        self.children.push(child);
    }
}

impl<C: Command> UndoCommand<C> {
    /// Apply the action, then every child in order.
    pub fn apply(&mut self, subject: &mut C::Subject) {
        if let Some(action) = self.action.as_mut() {
            action.apply(subject);
        }
        for child in &mut self.children {
            child.apply(subject);
        }
    }

    /// Revert every child in reverse order, then the action.
    pub fn revert(&mut self, subject: &mut C::Subject) {
        for child in self.children.iter_mut().rev() {
            child.revert(subject);
        }
        if let Some(action) = self.action.as_mut() {
            action.revert(subject);
        }
    }

    /// Compression identity of this node. Composites never merge.
    pub fn merge_id(&self) -> Option<u32> {
        if !self.children.is_empty() {
            return None;
        }
        self.action.as_ref().and_then(Command::merge_id)
    }

    /// Try to fold `next` into this node.
    ///
    /// On success the action is replaced by the merged one and the node takes
    /// the text of `next`.
    pub fn try_merge(&mut self, next: &UndoCommand<C>) -> bool {
        let id = match self.merge_id() {
            Some(id) => id,
            None => return false,
        };
        if next.merge_id() != Some(id) {
            return false;
        }

        let merged = match (self.action.as_ref(), next.action.as_ref()) {
            (Some(current), Some(incoming)) => current.merge(incoming),
            _ => None,
        };

        match merged {
            Some(action) => {
                self.action = Some(action);
                self.text = next.text.clone();
                true
            }
            None => false,
        }
    }
}
