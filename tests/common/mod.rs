//! Shared fixtures: a scene of items, a point edited through properties,
//! and a plain counter.

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use undo_engine::{Command, Property, PropertyCommand, UndoCommand, UndoStack};

/// Merge id shared by all move commands.
pub const MOVE_MERGE_ID: u32 = 1234;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn shared<T>(value: T) -> Rc<RefCell<T>> {
    Rc::new(RefCell::new(value))
}

// --- Scene ---

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub items: Vec<Item>,
}

impl Scene {
    pub fn item(&self, id: u32) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    fn item_mut(&mut self, id: u32) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.id == id)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SceneCommand {
    Add { item: Item },
    Delete { id: u32, removed: Option<(usize, Item)> },
    Move { id: u32, dx: i32, dy: i32 },
}

impl Command for SceneCommand {
    type Subject = Scene;

    fn apply(&mut self, scene: &mut Scene) {
        match self {
            SceneCommand::Add { item } => scene.items.push(item.clone()),
            SceneCommand::Delete { id, removed } => {
                *removed = scene
                    .items
                    .iter()
                    .position(|item| item.id == *id)
                    .map(|pos| (pos, scene.items.remove(pos)));
            }
            SceneCommand::Move { id, dx, dy } => {
                if let Some(item) = scene.item_mut(*id) {
                    item.x += *dx;
                    item.y += *dy;
                }
            }
        }
    }

    fn revert(&mut self, scene: &mut Scene) {
        match self {
            SceneCommand::Add { item } => {
                scene.items.retain(|other| other.id != item.id);
            }
            SceneCommand::Delete { removed, .. } => {
                if let Some((pos, item)) = removed.take() {
                    scene.items.insert(pos, item);
                }
            }
            SceneCommand::Move { id, dx, dy } => {
                if let Some(item) = scene.item_mut(*id) {
                    item.x -= *dx;
                    item.y -= *dy;
                }
            }
        }
    }

    fn merge_id(&self) -> Option<u32> {
        match self {
            SceneCommand::Move { .. } => Some(MOVE_MERGE_ID),
            _ => None,
        }
    }

    fn merge(&self, next: &Self) -> Option<Self> {
        match (self, next) {
            (
                SceneCommand::Move { id, dx, dy },
                SceneCommand::Move {
                    id: next_id,
                    dx: next_dx,
                    dy: next_dy,
                },
            ) if id == next_id => Some(SceneCommand::Move {
                id: *id,
                dx: dx + next_dx,
                dy: dy + next_dy,
            }),
            _ => None,
        }
    }
}

pub fn add_item(id: u32, x: i32, y: i32) -> UndoCommand<SceneCommand> {
    UndoCommand::new(
        format!("Add item {id}"),
        SceneCommand::Add {
            item: Item { id, x, y },
        },
    )
}

pub fn delete_item(id: u32) -> UndoCommand<SceneCommand> {
    UndoCommand::new(
        format!("Delete item {id}"),
        SceneCommand::Delete { id, removed: None },
    )
}

pub fn move_item(id: u32, dx: i32, dy: i32) -> UndoCommand<SceneCommand> {
    UndoCommand::new(format!("Move item {id}"), SceneCommand::Move { id, dx, dy })
}

pub fn scene_stack() -> UndoStack<SceneCommand> {
    UndoStack::new(shared(Scene::default()))
}

// --- Point ---

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

pub struct PointX;
pub struct PointY;

impl Property for PointX {
    type Subject = Point;
    type Value = i32;
    const MERGE_ID: Option<u32> = Some(1);

    fn get(point: &Point) -> i32 {
        point.x
    }

    fn set(point: &mut Point, value: i32) {
        point.x = value;
    }
}

impl Property for PointY {
    type Subject = Point;
    type Value = i32;

    fn get(point: &Point) -> i32 {
        point.y
    }

    fn set(point: &mut Point, value: i32) {
        point.y = value;
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PointCommand {
    X(PropertyCommand<PointX>),
    Y(PropertyCommand<PointY>),
}

impl Command for PointCommand {
    type Subject = Point;

    fn apply(&mut self, point: &mut Point) {
        match self {
            PointCommand::X(cmd) => cmd.apply(point),
            PointCommand::Y(cmd) => cmd.apply(point),
        }
    }

    fn revert(&mut self, point: &mut Point) {
        match self {
            PointCommand::X(cmd) => cmd.revert(point),
            PointCommand::Y(cmd) => cmd.revert(point),
        }
    }

    fn merge_id(&self) -> Option<u32> {
        match self {
            PointCommand::X(cmd) => cmd.merge_id(),
            PointCommand::Y(cmd) => cmd.merge_id(),
        }
    }

    fn merge(&self, next: &Self) -> Option<Self> {
        match (self, next) {
            (PointCommand::X(a), PointCommand::X(b)) => a.merge(b).map(PointCommand::X),
            (PointCommand::Y(a), PointCommand::Y(b)) => a.merge(b).map(PointCommand::Y),
            _ => None,
        }
    }
}

pub fn set_x(stack: &UndoStack<PointCommand>, x: i32) -> UndoCommand<PointCommand> {
    let cmd = PropertyCommand::<PointX>::new(&stack.subject().borrow(), x);
    UndoCommand::new(format!("Set x to {x}"), PointCommand::X(cmd))
}

pub fn set_y(stack: &UndoStack<PointCommand>, y: i32) -> UndoCommand<PointCommand> {
    let cmd = PropertyCommand::<PointY>::new(&stack.subject().borrow(), y);
    UndoCommand::new(format!("Set y to {y}"), PointCommand::Y(cmd))
}

// --- Counter ---

/// Overwrites a counter; never merges.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SetCounter {
    pub old: i64,
    pub new: i64,
}

impl Command for SetCounter {
    type Subject = i64;

    fn apply(&mut self, counter: &mut i64) {
        *counter = self.new;
    }

    fn revert(&mut self, counter: &mut i64) {
        *counter = self.old;
    }
}

pub fn counter_stack() -> UndoStack<SetCounter> {
    UndoStack::new(shared(0))
}

/// Push a command setting the counter to `value`, labelled with the value.
pub fn set_counter(stack: &mut UndoStack<SetCounter>, value: i64) {
    let old = *stack.subject().borrow();
    stack.push(UndoCommand::new(
        value.to_string(),
        SetCounter { old, new: value },
    ));
}

pub fn counter(stack: &UndoStack<SetCounter>) -> i64 {
    *stack.subject().borrow()
}
