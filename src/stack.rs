//! The undo stack: linear history with a cursor.
//!
//! Commands are applied when pushed. The cursor (`index`) counts how many
//! history entries are currently applied; entries past it can be redone
//! until the next push discards them.

use crate::command::{Command, UndoCommand};
use crate::subscriptions::UndoEvents;
use crate::types::StackConfig;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// A stack of reversible commands editing one subject.
///
/// The subject is shared with the caller through `Rc<RefCell<_>>`; the stack
/// only borrows it while applying or reverting commands.
///
/// # Panics
///
/// Operations that run commands (`push`, `undo`, `redo`, `set_index`)
/// panic if the subject is already borrowed elsewhere at that moment.
pub struct UndoStack<C: Command> {
    /// The edited object.
    subject: Rc<RefCell<C::Subject>>,

    /// Top-level history.
    commands: Vec<UndoCommand<C>>,

    /// Number of applied history entries.
    idx: usize,

    /// Clean baseline, `None` once the baseline command was discarded.
    clean_idx: Option<usize>,

    /// Max retained history entries (0 = unbounded).
    undo_limit: usize,

    /// Number of open macros. The outermost one is the last history entry
    /// and each nested one is the last child of its parent.
    macro_depth: usize,

    subscriber: Option<Box<dyn UndoEvents>>,
}

impl<C: Command> UndoStack<C> {
    /// Create an empty, unbounded stack.
    pub fn new(subject: Rc<RefCell<C::Subject>>) -> Self {
        Self::with_config(subject, StackConfig::default())
    }

    /// Create an empty stack with the given configuration.
    pub fn with_config(subject: Rc<RefCell<C::Subject>>, config: StackConfig) -> Self {
        Self {
            subject,
            commands: Vec::new(),
            idx: 0,
            clean_idx: Some(0),
            undo_limit: config.undo_limit,
            macro_depth: 0,
            subscriber: None,
        }
    }

    /// Rebuild a stack from decoded parts. Callers validate the indices.
    pub(crate) fn restore(
        subject: Rc<RefCell<C::Subject>>,
        commands: Vec<UndoCommand<C>>,
        idx: usize,
        clean_idx: Option<usize>,
        undo_limit: usize,
        macro_depth: usize,
    ) -> Self {
        Self {
            subject,
            commands,
            idx,
            clean_idx,
            undo_limit,
            macro_depth,
            subscriber: None,
        }
    }

    /// Shared handle to the edited subject.
    pub fn subject(&self) -> &Rc<RefCell<C::Subject>> {
        &self.subject
    }

    /// Install the notification subscriber, replacing any previous one.
    pub fn set_subscriber(&mut self, subscriber: Box<dyn UndoEvents>) {
        self.subscriber = Some(subscriber);
    }

    /// Remove and return the notification subscriber.
    pub fn take_subscriber(&mut self) -> Option<Box<dyn UndoEvents>> {
        self.subscriber.take()
    }

    // --- History ---

    /// Apply `cmd` and record it.
    ///
    /// Inside a macro the command becomes a child of the innermost open
    /// macro. Otherwise every redoable entry is discarded first. In both
    /// cases the command may instead be merged into its predecessor.
    pub fn push(&mut self, mut cmd: UndoCommand<C>) {
        cmd.apply(&mut *self.subject.borrow_mut());

        if self.macro_depth > 0 {
            let Some(parent) = self.innermost_macro_mut() else {
                warn!("UndoStack::push: open macro is missing from history");
                return;
            };
            let merged = match parent.last_child_mut() {
                Some(last) => last.try_merge(&cmd),
                None => false,
            };
            if !merged {
                parent.push_child(cmd);
            }
            return;
        }

        let was_clean = self.is_clean();
        self.truncate_redo();

        // The clean baseline entry never absorbs a merge.
        if self.idx > 0 && self.clean_idx != Some(self.idx) {
            let idx = self.idx;
            if self.commands[idx - 1].try_merge(&cmd) {
                debug!(index = idx, "merged command into previous history entry");
                self.emit_cursor_state();
                return;
            }
        }

        self.commands.push(cmd);
        self.check_undo_limit();
        self.commit_index(self.idx + 1, was_clean);
    }

    /// Revert the command before the cursor.
    pub fn undo(&mut self) {
        if self.is_macro_open() {
            warn!("UndoStack::undo: cannot undo in the middle of a macro");
            return;
        }
        if self.idx == 0 {
            return;
        }

        let was_clean = self.is_clean();
        let index = self.idx - 1;
        self.commands[index].revert(&mut *self.subject.borrow_mut());
        self.commit_index(index, was_clean);
    }

    /// Re-apply the command after the cursor.
    pub fn redo(&mut self) {
        if self.is_macro_open() {
            warn!("UndoStack::redo: cannot redo in the middle of a macro");
            return;
        }
        if self.idx == self.commands.len() {
            return;
        }

        let was_clean = self.is_clean();
        let index = self.idx;
        self.commands[index].apply(&mut *self.subject.borrow_mut());
        self.commit_index(index + 1, was_clean);
    }

    /// Move the cursor to `index` (clamped to `count()`), undoing or
    /// redoing every command in between one at a time.
    pub fn set_index(&mut self, index: usize) {
        if self.is_macro_open() {
            warn!("UndoStack::set_index: cannot set index in the middle of a macro");
            return;
        }

        let target = index.min(self.commands.len());
        let was_clean = self.is_clean();
        trace!(from = self.idx, to = target, "walking undo cursor");

        {
            let mut subject = self.subject.borrow_mut();
            let mut i = self.idx;
            while i < target {
                self.commands[i].apply(&mut *subject);
                i += 1;
            }
            while i > target {
                i -= 1;
                self.commands[i].revert(&mut *subject);
            }
        }

        self.commit_index(target, was_clean);
    }

    /// Discard the whole history. The subject is left as it is.
    pub fn clear(&mut self) {
        if self.commands.is_empty() {
            return;
        }

        let was_clean = self.is_clean();
        debug!(discarded = self.commands.len(), "clearing undo stack");

        self.macro_depth = 0;
        self.commands.clear();
        self.idx = 0;
        self.clean_idx = Some(0);

        if let Some(sub) = self.subscriber.as_mut() {
            sub.index_changed(0);
            sub.can_undo_changed(false);
            sub.undo_text_changed("");
            sub.can_redo_changed(false);
            sub.redo_text_changed("");
            if !was_clean {
                sub.clean_changed(true);
            }
        }
    }

    // --- Macros ---

    /// Open a macro. Commands pushed until the matching [`end_macro`]
    /// become its children and are undone as one history entry.
    ///
    /// [`end_macro`]: Self::end_macro
    pub fn begin_macro(&mut self, text: impl Into<String>) {
        let cmd = UndoCommand::composite(text);

        if self.macro_depth == 0 {
            self.truncate_redo();
            self.commands.push(cmd);
        } else {
            match self.innermost_macro_mut() {
                Some(parent) => parent.push_child(cmd),
                None => {
                    warn!("UndoStack::begin_macro: open macro is missing from history");
                    return;
                }
            }
        }

        self.macro_depth += 1;

        if self.macro_depth == 1 {
            if let Some(sub) = self.subscriber.as_mut() {
                sub.can_undo_changed(false);
                sub.undo_text_changed("");
                sub.can_redo_changed(false);
                sub.redo_text_changed("");
            }
        }
    }

    /// Close the innermost open macro. Closing the outermost one commits it
    /// as a single history entry.
    pub fn end_macro(&mut self) {
        if self.macro_depth == 0 {
            warn!("UndoStack::end_macro: no matching begin_macro");
            return;
        }

        self.macro_depth -= 1;

        if self.macro_depth == 0 {
            let was_clean = self.clean_idx == Some(self.idx);
            self.check_undo_limit();
            self.commit_index(self.idx + 1, was_clean);
        }
    }

    pub fn is_macro_open(&self) -> bool {
        self.macro_depth > 0
    }

    /// Number of currently open (nested) macros.
    pub fn macro_depth(&self) -> usize {
        self.macro_depth
    }

    // --- Clean state ---

    /// Mark the current cursor position as the clean baseline.
    pub fn set_clean(&mut self) {
        if self.is_macro_open() {
            warn!("UndoStack::set_clean: cannot set clean in the middle of a macro");
            return;
        }

        let was_clean = self.is_clean();
        self.clean_idx = Some(self.idx);
        self.emit_clean_transition(was_clean);
    }

    /// Whether the cursor sits on the clean baseline (never while a macro
    /// is open).
    pub fn is_clean(&self) -> bool {
        !self.is_macro_open() && self.clean_idx == Some(self.idx)
    }

    /// Clean baseline, or `None` once the baseline command was discarded.
    pub fn clean_index(&self) -> Option<usize> {
        self.clean_idx
    }

    // --- Limits ---

    pub fn undo_limit(&self) -> usize {
        self.undo_limit
    }

    /// Change the maximum history length (0 = unbounded).
    ///
    /// Only honored while the stack is empty; otherwise the call is logged
    /// and the previous limit stays in effect.
    pub fn set_undo_limit(&mut self, limit: usize) {
        if !self.commands.is_empty() {
            warn!(
                current = self.undo_limit,
                requested = limit,
                "UndoStack::set_undo_limit: an undo limit can only be set when the stack is empty"
            );
            return;
        }
        if limit == self.undo_limit {
            return;
        }

        debug!(limit, "undo limit changed");
        self.undo_limit = limit;
        self.check_undo_limit();
    }

    // --- Queries ---

    /// Number of top-level history entries (an open macro counts once).
    pub fn count(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Cursor: number of applied history entries.
    pub fn index(&self) -> usize {
        self.idx
    }

    pub fn can_undo(&self) -> bool {
        !self.is_macro_open() && self.idx > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.is_macro_open() && self.idx < self.commands.len()
    }

    /// Text of the command [`undo`](Self::undo) would revert, or "".
    pub fn undo_text(&self) -> &str {
        if self.is_macro_open() || self.idx == 0 {
            return "";
        }
        self.text(self.idx - 1)
    }

    /// Text of the command [`redo`](Self::redo) would apply, or "".
    pub fn redo_text(&self) -> &str {
        if self.is_macro_open() {
            return "";
        }
        self.text(self.idx)
    }

    /// History entry at `index`.
    pub fn command(&self, index: usize) -> Option<&UndoCommand<C>> {
        self.commands.get(index)
    }

    /// Text of the history entry at `index`, or "" when out of range.
    pub fn text(&self, index: usize) -> &str {
        self.commands.get(index).map_or("", UndoCommand::text)
    }

    pub fn commands(&self) -> &[UndoCommand<C>] {
        &self.commands
    }

    // --- Internals ---

    fn innermost_macro_mut(&mut self) -> Option<&mut UndoCommand<C>> {
        let mut node = self.commands.last_mut()?;
        for _ in 1..self.macro_depth {
            node = node.last_child_mut()?;
        }
        Some(node)
    }

    /// Drop redoable entries; a baseline among them becomes undefined.
    fn truncate_redo(&mut self) {
        if self.commands.len() > self.idx {
            trace!(
                discarded = self.commands.len() - self.idx,
                "discarding redoable commands"
            );
            self.commands.truncate(self.idx);
        }
        if matches!(self.clean_idx, Some(clean) if clean > self.idx) {
            self.clean_idx = None;
        }
    }

    /// Evict the oldest entries beyond the undo limit. Top level only.
    fn check_undo_limit(&mut self) {
        if self.undo_limit == 0 || self.is_macro_open() || self.commands.len() <= self.undo_limit
        {
            return;
        }

        let evicted = self.commands.len() - self.undo_limit;
        self.commands.drain(..evicted);
        self.idx = self.idx.saturating_sub(evicted);
        self.clean_idx = match self.clean_idx {
            Some(clean) if clean >= evicted => Some(clean - evicted),
            _ => None,
        };

        debug!(
            evicted,
            limit = self.undo_limit,
            "undo limit reached, dropped oldest commands"
        );
    }

    fn commit_index(&mut self, index: usize, was_clean: bool) {
        if self.idx != index {
            self.idx = index;
            self.emit_cursor_state();
        }
        self.emit_clean_transition(was_clean);
    }

    fn emit_cursor_state(&mut self) {
        if self.subscriber.is_none() {
            return;
        }

        let index = self.idx;
        let can_undo = self.can_undo();
        let undo_text = self.undo_text().to_string();
        let can_redo = self.can_redo();
        let redo_text = self.redo_text().to_string();

        if let Some(sub) = self.subscriber.as_mut() {
            sub.index_changed(index);
            sub.can_undo_changed(can_undo);
            sub.undo_text_changed(&undo_text);
            sub.can_redo_changed(can_redo);
            sub.redo_text_changed(&redo_text);
        }
    }

    fn emit_clean_transition(&mut self, was_clean: bool) {
        let clean = self.is_clean();
        if clean != was_clean {
            if let Some(sub) = self.subscriber.as_mut() {
                sub.clean_changed(clean);
            }
        }
    }
}

impl<C: Command> fmt::Debug for UndoStack<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoStack")
            .field("index", &self.idx)
            .field("count", &self.commands.len())
            .field("clean_index", &self.clean_idx)
            .field("undo_limit", &self.undo_limit)
            .field("macro_depth", &self.macro_depth)
            .finish_non_exhaustive()
    }
}
