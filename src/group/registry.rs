//! Registry of stacks with one active member.

use crate::command::Command;
use crate::stack::UndoStack;
use crate::types::StackId;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// A set of undo stacks, one per open document, with at most one active.
///
/// The group owns its stacks, so a stack belongs to at most one group at a
/// time; moving it elsewhere goes through [`remove`](Self::remove) or
/// [`adopt`](Self::adopt). Undo/redo queries are forwarded to the active
/// stack and report neutral values when there is none.
pub struct UndoGroup<C: Command> {
    /// Member stacks in insertion order.
    stacks: Vec<(StackId, UndoStack<C>)>,

    /// Currently active stack.
    active: Option<StackId>,

    /// Next stack ID to assign.
    next_id: u64,
}

impl<C: Command> UndoGroup<C> {
    pub fn new() -> Self {
        Self {
            stacks: Vec::new(),
            active: None,
            next_id: 1,
        }
    }

    /// Add a stack and return its id.
    ///
    /// A group never holds two stacks for the same subject: if a member
    /// already edits this subject (same handle), the incoming stack is
    /// handed back untouched in `Err`.
    pub fn add(&mut self, stack: UndoStack<C>) -> Result<StackId, UndoStack<C>> {
        if let Some(id) = self.find_by_subject(stack.subject()) {
            debug!(stack = %id, "subject already has a stack in this group");
            return Err(stack);
        }

        let id = StackId(self.next_id);
        self.next_id += 1;
        self.stacks.push((id, stack));
        Ok(id)
    }

    /// Id of the member editing `subject`, creating an empty stack for it
    /// if there is none.
    pub fn create_stack(&mut self, subject: Rc<RefCell<C::Subject>>) -> StackId {
        if let Some(id) = self.find_by_subject(&subject) {
            return id;
        }
        let id = StackId(self.next_id);
        self.next_id += 1;
        self.stacks.push((id, UndoStack::new(subject)));
        id
    }

    /// Move the stack `id` out of `other` into this group.
    ///
    /// Returns the id assigned here, or `None` when `other` has no such
    /// stack or this group already edits its subject. In both cases `other`
    /// is left unchanged.
    pub fn adopt(&mut self, other: &mut UndoGroup<C>, id: StackId) -> Option<StackId> {
        let subject = other.stack(id)?.subject();
        if self.find_by_subject(subject).is_some() {
            return None;
        }
        let stack = other.remove(id)?;
        self.add(stack).ok()
    }

    /// Remove a stack and hand it back. Clears the active pointer if it
    /// pointed at the removed stack.
    pub fn remove(&mut self, id: StackId) -> Option<UndoStack<C>> {
        let pos = self.stacks.iter().position(|(sid, _)| *sid == id)?;
        if self.active == Some(id) {
            self.active = None;
        }
        Some(self.stacks.remove(pos).1)
    }

    /// Release every stack.
    pub fn clear(&mut self) -> Vec<UndoStack<C>> {
        self.active = None;
        self.stacks.drain(..).map(|(_, stack)| stack).collect()
    }

    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    pub fn contains(&self, id: StackId) -> bool {
        self.stacks.iter().any(|(sid, _)| *sid == id)
    }

    /// Member stacks in insertion order.
    pub fn stacks(&self) -> impl Iterator<Item = (StackId, &UndoStack<C>)> + '_ {
        self.stacks.iter().map(|(id, stack)| (*id, stack))
    }

    pub fn stack(&self, id: StackId) -> Option<&UndoStack<C>> {
        self.stacks
            .iter()
            .find(|(sid, _)| *sid == id)
            .map(|(_, stack)| stack)
    }

    pub fn stack_mut(&mut self, id: StackId) -> Option<&mut UndoStack<C>> {
        self.stacks
            .iter_mut()
            .find(|(sid, _)| *sid == id)
            .map(|(_, stack)| stack)
    }

    // --- Active stack ---

    pub fn active(&self) -> Option<StackId> {
        self.active
    }

    /// Point the group at another stack (or none).
    ///
    /// This is a pointer change only: an id that is not a member is
    /// accepted, and forwarding then behaves as if no stack were active.
    pub fn set_active(&mut self, id: Option<StackId>) {
        if self.active == id {
            return;
        }
        self.active = id;
    }

    pub fn is_active(&self, id: StackId) -> bool {
        self.active == Some(id)
    }

    pub fn active_stack(&self) -> Option<&UndoStack<C>> {
        self.stack(self.active?)
    }

    pub fn active_stack_mut(&mut self) -> Option<&mut UndoStack<C>> {
        let id = self.active?;
        self.stack_mut(id)
    }

    // --- Forwarding ---

    pub fn undo(&mut self) {
        if let Some(stack) = self.active_stack_mut() {
            stack.undo();
        }
    }

    pub fn redo(&mut self) {
        if let Some(stack) = self.active_stack_mut() {
            stack.redo();
        }
    }

    pub fn can_undo(&self) -> bool {
        self.active_stack().is_some_and(UndoStack::can_undo)
    }

    pub fn can_redo(&self) -> bool {
        self.active_stack().is_some_and(UndoStack::can_redo)
    }

    pub fn undo_text(&self) -> &str {
        self.active_stack().map_or("", UndoStack::undo_text)
    }

    pub fn redo_text(&self) -> &str {
        self.active_stack().map_or("", UndoStack::redo_text)
    }

    /// True when no stack is active or the active one is clean.
    pub fn is_clean(&self) -> bool {
        self.active_stack().map_or(true, UndoStack::is_clean)
    }

    fn find_by_subject(&self, subject: &Rc<RefCell<C::Subject>>) -> Option<StackId> {
        self.stacks
            .iter()
            .find(|(_, stack)| Rc::ptr_eq(stack.subject(), subject))
            .map(|(id, _)| *id)
    }
}

impl<C: Command> Default for UndoGroup<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Command> fmt::Debug for UndoGroup<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoGroup")
            .field("stacks", &self.stacks.iter().map(|(id, _)| *id).collect::<Vec<_>>())
            .field("active", &self.active)
            .finish()
    }
}
