//! Replayable design scripts.
//!
//! A script is a JSON array of steps that drive an [`EngineCore`] exactly as
//! the toolbar and pointer would: select a tool, click, drag, type, undo.
//! The CLI uses it to produce designs headlessly, and tests use it to pin
//! down end-to-end behavior.
//!
//! ```json
//! [
//!   {"op": "tool", "tool": "rectangle"},
//!   {"op": "click", "x": 10, "y": 10},
//!   {"op": "tool", "tool": "pen"},
//!   {"op": "stroke", "points": [[10, 10], [60, 40], [90, 80]]},
//!   {"op": "undo"}
//! ]
//! ```
//!
//! Coordinates are screen pixels; the current camera maps them to surface
//! coordinates.

use canvas::camera::Point;
use canvas::color::{Color, Fill};
use canvas::doc::Shape;
use canvas::engine::{Action, EngineCore};
use canvas::history::HistoryError;
use canvas::input::{Button, Key, Modifiers, Tool, WheelDelta};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("invalid script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("step {step}: {source}")]
    History { step: usize, source: HistoryError },
    #[error("step {step}: no text object is selected or being edited")]
    NoTextTarget { step: usize },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Tool { tool: Tool },
    Color { color: Color },
    Width { width: f64 },
    Fill { fill: Fill },
    Click { x: f64, y: f64 },
    Stroke { points: Vec<[f64; 2]> },
    Drag { from: [f64; 2], to: [f64; 2] },
    Wheel {
        x: f64,
        y: f64,
        #[serde(default)]
        dx: f64,
        dy: f64,
        #[serde(default)]
        ctrl: bool,
    },
    /// Replace the content of the text being edited (or the selected text),
    /// then leave editing.
    Text { content: String },
    Key {
        key: String,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        shift: bool,
        #[serde(default)]
        meta: bool,
    },
    Undo,
    Redo,
    ZoomIn,
    ZoomOut,
    ResetZoom,
    Clear,
    Delete,
}

/// Parse a JSON script.
///
/// # Errors
///
/// Returns [`ScriptError::Parse`] for malformed JSON or unknown steps.
pub fn parse(json: &str) -> Result<Vec<Step>, ScriptError> {
    Ok(serde_json::from_str(json)?)
}

/// Apply every step in order and collect the emitted actions.
///
/// Stops at the first failing step; steps before it stay applied.
///
/// # Errors
///
/// [`ScriptError::History`] when an undo/redo snapshot fails,
/// [`ScriptError::NoTextTarget`] for a `text` step with nothing to edit.
pub fn replay(engine: &mut EngineCore, steps: &[Step]) -> Result<Vec<Action>, ScriptError> {
    let mut actions = Vec::new();
    for (step, op) in steps.iter().enumerate() {
        let emitted = apply(engine, step, op)?;
        debug!(step, ?op, actions = emitted.len(), "script step");
        actions.extend(emitted);
    }
    Ok(actions)
}

fn apply(engine: &mut EngineCore, step: usize, op: &Step) -> Result<Vec<Action>, ScriptError> {
    let none = Modifiers::default();
    let history = |source| ScriptError::History { step, source };

    let actions = match op {
        Step::Tool { tool } => engine.set_tool(*tool),
        Step::Color { color } => {
            engine.set_brush_color(*color);
            Vec::new()
        }
        Step::Width { width } => {
            engine.set_brush_width(*width);
            Vec::new()
        }
        Step::Fill { fill } => {
            engine.set_fill(*fill);
            Vec::new()
        }
        Step::Click { x, y } => {
            let pt = Point::new(*x, *y);
            let mut actions = engine.on_pointer_down(pt, Button::Primary, none);
            actions.extend(engine.on_pointer_up(pt, Button::Primary, none));
            actions
        }
        Step::Stroke { points } => {
            let Some((first, rest)) = points.split_first() else {
                return Ok(Vec::new());
            };
            let mut actions = engine.on_pointer_down(point(*first), Button::Primary, none);
            for p in rest {
                actions.extend(engine.on_pointer_move(point(*p), none));
            }
            let last = rest.last().unwrap_or(first);
            actions.extend(engine.on_pointer_up(point(*last), Button::Primary, none));
            actions
        }
        Step::Drag { from, to } => {
            let mut actions = engine.on_pointer_down(point(*from), Button::Primary, none);
            actions.extend(engine.on_pointer_move(point(*to), none));
            actions.extend(engine.on_pointer_up(point(*to), Button::Primary, none));
            actions
        }
        Step::Wheel { x, y, dx, dy, ctrl } => {
            let modifiers = Modifiers { ctrl: *ctrl, ..none };
            engine.on_wheel(Point::new(*x, *y), WheelDelta { dx: *dx, dy: *dy }, modifiers)
        }
        Step::Text { content } => {
            let target = engine.editing_text().or_else(|| engine.selection());
            let Some(id) = target.filter(|id| engine.object(id).is_some_and(|o| matches!(o.shape, Shape::Text { .. }))) else {
                return Err(ScriptError::NoTextTarget { step });
            };
            let mut actions = engine.set_text(&id, content);
            actions.extend(engine.end_text_edit());
            actions
        }
        Step::Key { key, ctrl, shift, meta } => {
            let modifiers = Modifiers { ctrl: *ctrl, shift: *shift, meta: *meta, alt: false };
            engine.on_key_down(&Key::new(key), modifiers)
        }
        Step::Undo => engine.undo().map_err(history)?,
        Step::Redo => engine.redo().map_err(history)?,
        Step::ZoomIn => engine.zoom_in(),
        Step::ZoomOut => engine.zoom_out(),
        Step::ResetZoom => engine.reset_zoom(),
        Step::Clear => engine.clear_all(),
        Step::Delete => engine.delete_selected(),
    };
    Ok(actions)
}

fn point([x, y]: [f64; 2]) -> Point {
    Point::new(x, y)
}

#[cfg(test)]
#[path = "script_test.rs"]
mod tests;
