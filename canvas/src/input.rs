//! Input model: tools, modifier keys, mouse buttons, and the gesture state machine.
//!
//! This module defines the types consumed by the input engine. `Tool` and
//! `Modifiers` capture the user's intent at the time of a pointer event.
//! `InputState` is the active gesture being tracked between pointer-down and
//! pointer-up, carrying all context needed to compute incremental deltas and
//! emit final surface mutations on release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::color::{Color, Fill};
use crate::consts::DEFAULT_BRUSH_WIDTH;
use crate::doc::{Bounds, ObjectId};
use crate::hit::ResizeAnchor;

/// Which tool is currently active. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Select, move and resize existing objects.
    Select,
    /// Freehand drawing (default).
    #[default]
    Pen,
    /// Freehand drawing in the background color.
    Eraser,
    /// Insert a rectangle at the default position.
    Rectangle,
    /// Insert a circle at the default position.
    Circle,
    /// Insert a text object and start editing it.
    Text,
    /// Drag the viewport.
    Pan,
}

impl Tool {
    /// Whether pointer drags with this tool capture a freehand stroke.
    #[must_use]
    pub fn is_drawing(self) -> bool {
        matches!(self, Self::Pen | Self::Eraser)
    }

    /// Whether a click with this tool inserts a new object.
    #[must_use]
    pub fn is_inserting(self) -> bool {
        matches!(self, Self::Rectangle | Self::Circle | Self::Text)
    }

    /// CSS cursor shown while the tool is active.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::Select => "default",
            Self::Pen | Self::Eraser => "crosshair",
            Self::Rectangle | Self::Circle => "copy",
            Self::Text => "text",
            Self::Pan => "grab",
        }
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key as reported by the browser (e.g. `"Delete"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_owned())
    }

    /// Case-insensitive comparison against a key name.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Style applied to newly drawn strokes and inserted objects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    /// Stroke color for pen, shapes and text fill.
    pub color: Color,
    /// Stroke width for pen, eraser and shape outlines.
    pub width: f64,
    /// Interior of inserted rectangles and circles.
    pub fill: Fill,
}

impl Default for Brush {
    fn default() -> Self {
        Self { color: Color::BLACK, width: DEFAULT_BRUSH_WIDTH, fill: Fill::Transparent }
    }
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Currently active tool.
    pub tool: Tool,
    /// The id of the currently selected object, if any.
    pub selected_id: Option<ObjectId>,
    /// The text object being edited in place, if any.
    pub editing_text: Option<ObjectId>,
    /// Current drawing style.
    pub brush: Brush,
}

/// Internal state for the input state machine.
///
/// Each active variant carries gesture context needed to compute deltas and
/// emit final actions on pointer-up.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// A freehand stroke is being captured.
    Drawing {
        /// Surface-space points collected so far.
        points: Vec<Point>,
        /// Stroke color fixed at pointer-down (background for the eraser).
        color: Color,
        /// Stroke width fixed at pointer-down.
        width: f64,
    },
    /// The user is panning the viewport.
    Panning {
        /// Screen-space position of the previous pointer event.
        last_screen: Point,
    },
    /// The user is moving an existing object.
    DraggingObject {
        /// Id of the object being dragged.
        id: ObjectId,
        /// Surface-space position of the pointer at the previous event.
        last_world: Point,
        /// Bounds at the start of the drag, used to detect a real move.
        orig: Bounds,
    },
    /// The user is resizing an object by one of its corner handles.
    ResizingObject {
        /// Id of the object being resized.
        id: ObjectId,
        /// Which corner handle is being dragged.
        anchor: ResizeAnchor,
        /// Bounds at the start of the resize.
        orig: Bounds,
    },
}
