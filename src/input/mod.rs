//! Platform-agnostic input events and the gesture state machine.

mod controller;
mod event;

pub use controller::{DragState, InputController};
pub use event::{InputEvent, PointerButton, TouchPoint};
