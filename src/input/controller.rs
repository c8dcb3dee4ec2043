//! Converts raw input events into viewer commands.
//!
//! The `InputController` owns all transient gesture state (drag mode, last
//! sample position, section-mode flag). It is the only thing between
//! normalized window events and the engine's
//! [`execute`](crate::RenderEngine::execute) method.

use glam::Vec2;

use super::event::{InputEvent, PointerButton};
use crate::engine::ViewerCommand;

/// Current drag gesture, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    /// No button or touch held.
    #[default]
    Idle,
    /// Primary button or single touch held — deltas rotate the camera.
    Rotating,
    /// Secondary button or two-finger touch held — deltas pan the target.
    Panning,
}

/// Converts raw input events into [`ViewerCommand`]s.
///
/// One controller instance serves both mouse and touch: a single touch
/// enters the same `Rotating` state as the primary button, two fingers
/// enter `Panning`, and touch moves feed the same pixel-delta contract as
/// pointer moves, so the camera code stays input-device-agnostic.
#[derive(Debug, Default)]
pub struct InputController {
    /// Active drag gesture.
    drag: DragState,
    /// Position of the last processed sample, in physical pixels.
    last_pos: Vec2,
    /// Whether the wheel drives the sectioning plane instead of zoom.
    section_mode: bool,
}

impl InputController {
    /// Controller in the idle state with section mode off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current drag gesture.
    #[must_use]
    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    /// Whether wheel input drives the sectioning plane.
    #[must_use]
    pub fn section_mode(&self) -> bool {
        self.section_mode
    }

    /// Route wheel input to the sectioning plane (`true`) or to zoom
    /// (`false`).
    pub fn set_section_mode(&mut self, on: bool) {
        self.section_mode = on;
    }

    /// Flip the section-mode flag.
    pub fn toggle_section_mode(&mut self) {
        self.section_mode = !self.section_mode;
    }

    /// Process one event, producing at most one command.
    pub fn handle_event(&mut self, event: InputEvent) -> Option<ViewerCommand> {
        match event {
            InputEvent::PointerDown { button, x, y } => {
                self.begin_drag(button_gesture(button), x, y);
                None
            }
            InputEvent::PointerMoved { x, y } => self.handle_move(x, y),
            InputEvent::TouchStart { primary, secondary } => {
                let gesture = if secondary.is_some() {
                    DragState::Panning
                } else {
                    DragState::Rotating
                };
                self.begin_drag(gesture, primary.x, primary.y);
                None
            }
            InputEvent::TouchMoved { primary, .. } => self.handle_move(primary.x, primary.y),
            InputEvent::PointerUp | InputEvent::TouchEnd => {
                self.drag = DragState::Idle;
                None
            }
            InputEvent::Wheel { delta } => {
                if self.section_mode {
                    Some(ViewerCommand::Section { delta })
                } else {
                    Some(ViewerCommand::Zoom { delta })
                }
            }
        }
    }

    fn begin_drag(&mut self, gesture: DragState, x: f32, y: f32) {
        self.drag = gesture;
        self.last_pos = Vec2::new(x, y);
    }

    fn handle_move(&mut self, x: f32, y: f32) -> Option<ViewerCommand> {
        let pos = Vec2::new(x, y);
        let delta = pos - self.last_pos;
        match self.drag {
            DragState::Idle => None,
            DragState::Rotating => {
                self.last_pos = pos;
                Some(ViewerCommand::Rotate { delta })
            }
            DragState::Panning => {
                self.last_pos = pos;
                Some(ViewerCommand::Pan { delta })
            }
        }
    }
}

fn button_gesture(button: PointerButton) -> DragState {
    match button {
        PointerButton::Primary => DragState::Rotating,
        PointerButton::Secondary => DragState::Panning,
        PointerButton::Middle => DragState::Idle,
    }
}

#[cfg(test)]
mod tests {
    use crate::input::TouchPoint;

    use super::*;

    fn touch_point(x: f32, y: f32) -> TouchPoint {
        TouchPoint { x, y }
    }

    #[test]
    fn idle_moves_produce_nothing() {
        let mut c = InputController::new();
        assert_eq!(c.handle_event(InputEvent::PointerMoved { x: 50.0, y: 50.0 }), None);
    }

    #[test]
    fn primary_drag_rotates_with_pixel_deltas() {
        let mut c = InputController::new();
        assert_eq!(
            c.handle_event(InputEvent::PointerDown {
                button: PointerButton::Primary,
                x: 100.0,
                y: 100.0
            }),
            None
        );
        assert_eq!(c.drag_state(), DragState::Rotating);

        let cmd = c.handle_event(InputEvent::PointerMoved { x: 110.0, y: 96.0 });
        assert_eq!(
            cmd,
            Some(ViewerCommand::Rotate {
                delta: Vec2::new(10.0, -4.0)
            })
        );

        // Deltas are relative to the last sample, not the press point.
        let cmd = c.handle_event(InputEvent::PointerMoved { x: 111.0, y: 96.0 });
        assert_eq!(
            cmd,
            Some(ViewerCommand::Rotate {
                delta: Vec2::new(1.0, 0.0)
            })
        );
    }

    #[test]
    fn secondary_drag_pans() {
        let mut c = InputController::new();
        let _ = c.handle_event(InputEvent::PointerDown {
            button: PointerButton::Secondary,
            x: 0.0,
            y: 0.0,
        });
        assert_eq!(c.drag_state(), DragState::Panning);
        let cmd = c.handle_event(InputEvent::PointerMoved { x: -5.0, y: 2.0 });
        assert_eq!(
            cmd,
            Some(ViewerCommand::Pan {
                delta: Vec2::new(-5.0, 2.0)
            })
        );
    }

    #[test]
    fn release_returns_to_idle() {
        let mut c = InputController::new();
        let _ = c.handle_event(InputEvent::PointerDown {
            button: PointerButton::Primary,
            x: 0.0,
            y: 0.0,
        });
        assert_eq!(c.handle_event(InputEvent::PointerUp), None);
        assert_eq!(c.drag_state(), DragState::Idle);
        assert_eq!(c.handle_event(InputEvent::PointerMoved { x: 9.0, y: 9.0 }), None);
    }

    #[test]
    fn middle_button_is_ignored() {
        let mut c = InputController::new();
        let _ = c.handle_event(InputEvent::PointerDown {
            button: PointerButton::Middle,
            x: 0.0,
            y: 0.0,
        });
        assert_eq!(c.drag_state(), DragState::Idle);
    }

    #[test]
    fn wheel_zooms_unless_section_mode_is_on() {
        let mut c = InputController::new();
        assert_eq!(
            c.handle_event(InputEvent::Wheel { delta: 3.0 }),
            Some(ViewerCommand::Zoom { delta: 3.0 })
        );

        c.set_section_mode(true);
        assert_eq!(
            c.handle_event(InputEvent::Wheel { delta: 3.0 }),
            Some(ViewerCommand::Section { delta: 3.0 })
        );

        c.toggle_section_mode();
        assert!(!c.section_mode());
        assert_eq!(
            c.handle_event(InputEvent::Wheel { delta: -1.0 }),
            Some(ViewerCommand::Zoom { delta: -1.0 })
        );
    }

    #[test]
    fn single_touch_rotates_like_the_primary_button() {
        let mut c = InputController::new();
        let _ = c.handle_event(InputEvent::TouchStart {
            primary: touch_point(10.0, 10.0),
            secondary: None,
        });
        assert_eq!(c.drag_state(), DragState::Rotating);

        let cmd = c.handle_event(InputEvent::TouchMoved {
            primary: touch_point(14.0, 12.0),
            secondary: None,
        });
        assert_eq!(
            cmd,
            Some(ViewerCommand::Rotate {
                delta: Vec2::new(4.0, 2.0)
            })
        );
    }

    #[test]
    fn two_finger_touch_pans() {
        let mut c = InputController::new();
        let _ = c.handle_event(InputEvent::TouchStart {
            primary: touch_point(10.0, 10.0),
            secondary: Some(touch_point(40.0, 10.0)),
        });
        assert_eq!(c.drag_state(), DragState::Panning);

        let cmd = c.handle_event(InputEvent::TouchMoved {
            primary: touch_point(12.0, 13.0),
            secondary: Some(touch_point(42.0, 13.0)),
        });
        assert_eq!(
            cmd,
            Some(ViewerCommand::Pan {
                delta: Vec2::new(2.0, 3.0)
            })
        );
    }

    #[test]
    fn touch_end_returns_to_idle() {
        let mut c = InputController::new();
        let _ = c.handle_event(InputEvent::TouchStart {
            primary: touch_point(0.0, 0.0),
            secondary: None,
        });
        assert_eq!(c.handle_event(InputEvent::TouchEnd), None);
        assert_eq!(c.drag_state(), DragState::Idle);
    }
}
