/// Platform-agnostic input events.
///
/// The host window layer (winit, or an embedding application) normalizes
/// its native events into these before handing them to
/// [`InputController`](super::InputController), so the camera code never
/// sees a platform type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer button pressed at an absolute position.
    PointerDown {
        /// Which button went down.
        button: PointerButton,
        /// Horizontal position in physical pixels.
        x: f32,
        /// Vertical position in physical pixels.
        y: f32,
    },
    /// Pointer moved to an absolute position.
    PointerMoved {
        /// Horizontal position in physical pixels.
        x: f32,
        /// Vertical position in physical pixels.
        y: f32,
    },
    /// Pointer button released.
    PointerUp,
    /// Scroll wheel or pinch delta (positive = toward the scene).
    Wheel {
        /// Scroll amount.
        delta: f32,
    },
    /// One or two touch points went down.
    TouchStart {
        /// First touch point.
        primary: TouchPoint,
        /// Second touch point, when two fingers are down.
        secondary: Option<TouchPoint>,
    },
    /// Active touch points moved.
    TouchMoved {
        /// First touch point.
        primary: TouchPoint,
        /// Second touch point, when two fingers are down.
        secondary: Option<TouchPoint>,
    },
    /// All touch points lifted.
    TouchEnd,
}

/// Platform-agnostic pointer button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Primary (left) button — drives rotation.
    Primary,
    /// Secondary (right) button — drives panning.
    Secondary,
    /// Middle button (wheel click).
    Middle,
}

/// A single touch contact position in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    /// Horizontal position.
    pub x: f32,
    /// Vertical position.
    pub y: f32,
}

#[cfg(feature = "viewer")]
impl From<winit::event::MouseButton> for PointerButton {
    fn from(button: winit::event::MouseButton) -> Self {
        match button {
            winit::event::MouseButton::Right => Self::Secondary,
            winit::event::MouseButton::Middle => Self::Middle,
            _ => Self::Primary,
        }
    }
}
