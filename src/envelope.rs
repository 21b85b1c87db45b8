//! Serializable wrapper around an undo stack.
//!
//! A [`HistoryEnvelope`] carries a stack (with its subject) plus caller
//! metadata: an identifier, a version tag and free-form string extras.
//! None of the metadata is interpreted here; a caller that finds an
//! unexpected version decides on its own how to migrate.

use crate::codec;
use crate::command::{Command, UndoCommand};
use crate::error::{HistoryError, Result};
use crate::stack::UndoStack;
use crate::types::EncodeOptions;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// A stack plus the metadata that travels with it through encode/decode.
pub struct HistoryEnvelope<C: Command> {
    id: String,
    version: u32,
    stack: UndoStack<C>,
    extras: BTreeMap<String, String>,
}

/// Wire layout used for encoding. Field order must match [`EnvelopeData`].
#[derive(Serialize)]
#[serde(bound(serialize = "C: Serialize, C::Subject: Serialize"))]
struct EnvelopeRef<'a, C: Command> {
    id: &'a str,
    version: u32,
    subject: &'a C::Subject,
    commands: &'a [UndoCommand<C>],
    index: usize,
    clean_index: Option<usize>,
    undo_limit: usize,
    macro_depth: usize,
    extras: &'a BTreeMap<String, String>,
}

/// Owned counterpart of [`EnvelopeRef`] produced by decoding.
#[derive(Deserialize)]
#[serde(bound(deserialize = "C: DeserializeOwned, C::Subject: DeserializeOwned"))]
struct EnvelopeData<C: Command> {
    id: String,
    version: u32,
    subject: C::Subject,
    commands: Vec<UndoCommand<C>>,
    index: usize,
    clean_index: Option<usize>,
    undo_limit: usize,
    macro_depth: usize,
    extras: BTreeMap<String, String>,
}

impl<C: Command> HistoryEnvelope<C> {
    pub fn new(id: impl Into<String>, version: u32, stack: UndoStack<C>) -> Self {
        Self {
            id: id.into(),
            version,
            stack,
            extras: BTreeMap::new(),
        }
    }

    /// Caller-chosen subject identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn stack(&self) -> &UndoStack<C> {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut UndoStack<C> {
        &mut self.stack
    }

    /// Unwrap the stack, discarding the metadata.
    pub fn into_stack(self) -> UndoStack<C> {
        self.stack
    }

    pub fn extras(&self) -> &BTreeMap<String, String> {
        &self.extras
    }

    pub fn extras_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.extras
    }

    /// Set an extension value, returning the previous one.
    pub fn insert_extra(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.extras.insert(key.into(), value.into())
    }

    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extras.get(key).map(String::as_str)
    }

    /// Whether both envelopes carry the same identifier, version and extras.
    pub fn same_metadata(&self, other: &Self) -> bool {
        self.id == other.id && self.version == other.version && self.extras == other.extras
    }
}

impl<C> HistoryEnvelope<C>
where
    C: Command + Serialize,
    C::Subject: Serialize,
{
    /// Encode the whole envelope (subject, history, cursor and metadata)
    /// as URL-safe text, optionally gzip-compressed.
    pub fn encode(&self, compress: bool) -> Result<String> {
        let options = if compress {
            EncodeOptions::compressed()
        } else {
            EncodeOptions::raw()
        };
        self.encode_with(&options)
    }

    pub fn encode_with(&self, options: &EncodeOptions) -> Result<String> {
        let subject = self.stack.subject().borrow();
        let wire = EnvelopeRef {
            id: &self.id,
            version: self.version,
            subject: &*subject,
            commands: self.stack.commands(),
            index: self.stack.index(),
            clean_index: self.stack.clean_index(),
            undo_limit: self.stack.undo_limit(),
            macro_depth: self.stack.macro_depth(),
            extras: &self.extras,
        };

        let text = codec::encode(&wire, options)?;
        debug!(
            id = %self.id,
            version = self.version,
            commands = self.stack.count(),
            compress = options.compress,
            len = text.len(),
            "encoded history envelope"
        );
        Ok(text)
    }
}

impl<C> HistoryEnvelope<C>
where
    C: Command + DeserializeOwned,
    C::Subject: DeserializeOwned,
{
    /// Rebuild an envelope from [`encode`](Self::encode) output.
    ///
    /// The restored stack owns a fresh subject handle and has no subscriber.
    pub fn decode(text: &str) -> Result<Self> {
        let data: EnvelopeData<C> = codec::decode(text)?;
        validate(&data)?;

        debug!(
            id = %data.id,
            version = data.version,
            commands = data.commands.len(),
            index = data.index,
            "decoded history envelope"
        );

        let stack = UndoStack::restore(
            Rc::new(RefCell::new(data.subject)),
            data.commands,
            data.index,
            data.clean_index,
            data.undo_limit,
            data.macro_depth,
        );

        Ok(Self {
            id: data.id,
            version: data.version,
            stack,
            extras: data.extras,
        })
    }
}

/// Reject cursor state that no sequence of stack operations can produce.
fn validate<C: Command>(data: &EnvelopeData<C>) -> Result<()> {
    let count = data.commands.len();

    if data.index > count {
        return Err(HistoryError::Corruption(format!(
            "index {} beyond {} commands",
            data.index, count
        )));
    }
    if let Some(clean) = data.clean_index {
        if clean > count {
            return Err(HistoryError::Corruption(format!(
                "clean index {} beyond {} commands",
                clean, count
            )));
        }
    }

    // An open macro is pushed before the limit is enforced.
    let retained = count - usize::from(data.macro_depth > 0 && count > 0);
    if data.undo_limit > 0 && retained > data.undo_limit {
        return Err(HistoryError::Corruption(format!(
            "{} commands exceed undo limit {}",
            retained, data.undo_limit
        )));
    }

    if data.macro_depth > 0 {
        // An open macro is the single entry past the cursor.
        if data.index + 1 != count {
            return Err(HistoryError::Corruption(format!(
                "open macro requires index {} to precede the last of {} commands",
                data.index, count
            )));
        }
        if matches!(data.clean_index, Some(clean) if clean > data.index) {
            return Err(HistoryError::Corruption(
                "clean index points past an open macro".into(),
            ));
        }
        let mut node = &data.commands[count - 1];
        for level in 1..data.macro_depth {
            node = node.children().last().ok_or_else(|| {
                HistoryError::Corruption(format!(
                    "macro depth {} but nesting ends at level {}",
                    data.macro_depth, level
                ))
            })?;
        }
    }

    Ok(())
}

impl<C: Command> fmt::Debug for HistoryEnvelope<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryEnvelope")
            .field("id", &self.id)
            .field("version", &self.version)
            .field("stack", &self.stack)
            .field("extras", &self.extras)
            .finish()
    }
}
