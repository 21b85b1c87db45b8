//! Core value types shared across the crate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a stack inside an [`UndoGroup`](crate::UndoGroup).
///
/// Ids are assigned by the group on insertion and are only meaningful
/// for the group that handed them out.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StackId(pub u64);

impl fmt::Debug for StackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StackId({})", self.0)
    }
}

impl fmt::Display for StackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stack configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StackConfig {
    /// Maximum number of retained history entries (0 = unbounded).
    pub undo_limit: usize,
}

impl StackConfig {
    /// Configuration with a bounded history.
    pub fn bounded(undo_limit: usize) -> Self {
        Self { undo_limit }
    }
}

/// Default gzip level used when compression is requested.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Options for [`HistoryEnvelope::encode_with`](crate::HistoryEnvelope::encode_with).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Run the binary payload through gzip before text encoding.
    pub compress: bool,

    /// Gzip level (0-9). Ignored when `compress` is false.
    pub level: u32,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            compress: false,
            level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

impl EncodeOptions {
    /// Raw pipeline: binary frame straight to text.
    pub fn raw() -> Self {
        Self::default()
    }

    /// Compressed pipeline with the default gzip level.
    pub fn compressed() -> Self {
        Self {
            compress: true,
            ..Default::default()
        }
    }
}
