//! Typed get/set commands.
//!
//! A [`Property`] names one value of a subject through a get/set pair. A
//! [`PropertyCommand`] remembers the value it replaces, so setting a field
//! becomes undoable without a hand-written command.

use super::node::Command;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Accessor pair for one value of a subject.
///
/// Usually implemented on a zero-sized marker type:
///
/// ```
/// use undo_engine::Property;
///
/// struct Point { x: i32 }
/// struct PointX;
///
/// impl Property for PointX {
///     type Subject = Point;
///     type Value = i32;
///     fn get(subject: &Point) -> i32 { subject.x }
///     fn set(subject: &mut Point, value: i32) { subject.x = value; }
/// }
/// ```
pub trait Property {
    type Subject;
    type Value: Clone;

    /// When set, consecutive commands on this property coalesce into one.
    const MERGE_ID: Option<u32> = None;

    fn get(subject: &Self::Subject) -> Self::Value;
    fn set(subject: &mut Self::Subject, value: Self::Value);
}

/// Sets a [`Property`] to a new value; reverting restores the captured
/// old value.
#[derive(Serialize, Deserialize)]
#[serde(bound(
    serialize = "P::Value: Serialize",
    deserialize = "P::Value: Deserialize<'de>"
))]
pub struct PropertyCommand<P: Property> {
    old_value: P::Value,
    new_value: P::Value,
    #[serde(skip)]
    property: PhantomData<P>,
}

impl<P: Property> PropertyCommand<P> {
    /// Capture the current value of the property and remember `new_value`.
    ///
    /// Nothing is written here; the stack applies the command on push.
    pub fn new(subject: &P::Subject, new_value: P::Value) -> Self {
        Self {
            old_value: P::get(subject),
            new_value,
            property: PhantomData,
        }
    }

    pub fn old_value(&self) -> &P::Value {
        &self.old_value
    }

    pub fn new_value(&self) -> &P::Value {
        &self.new_value
    }
}

impl<P: Property> Command for PropertyCommand<P> {
    type Subject = P::Subject;

    fn apply(&mut self, subject: &mut P::Subject) {
        P::set(subject, self.new_value.clone());
    }

    fn revert(&mut self, subject: &mut P::Subject) {
        P::set(subject, self.old_value.clone());
    }

    fn merge_id(&self) -> Option<u32> {
        P::MERGE_ID
    }

    fn merge(&self, next: &Self) -> Option<Self> {
        P::MERGE_ID?;
        Some(Self {
            old_value: self.old_value.clone(),
            new_value: next.new_value.clone(),
            property: PhantomData,
        })
    }
}

impl<P: Property> Clone for PropertyCommand<P> {
    fn clone(&self) -> Self {
        Self {
            old_value: self.old_value.clone(),
            new_value: self.new_value.clone(),
            property: PhantomData,
        }
    }
}

impl<P: Property> PartialEq for PropertyCommand<P>
where
    P::Value: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.old_value == other.old_value && self.new_value == other.new_value
    }
}

impl<P: Property> fmt::Debug for PropertyCommand<P>
where
    P::Value: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyCommand")
            .field("old_value", &self.old_value)
            .field("new_value", &self.new_value)
            .finish()
    }
}
