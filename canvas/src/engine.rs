//! Tool state machine and editing operations.
//!
//! DESIGN
//! ======
//! `EngineCore` owns the surface, its history, the UI state (tool, selection,
//! brush) and the in-flight gesture. Every input handler mutates that state
//! and returns a list of [`Action`]s describing what the host should react
//! to. Nothing here touches a graphics API, so the whole machine is testable
//! natively. `Engine` (feature `web`) wraps the core together with the
//! browser canvas it draws to.
//!
//! A checkpoint is taken after every committed change: a finished stroke, an
//! inserted shape, a moved or resized object, a text edit, a deletion, a
//! clear. Camera changes are never checkpointed.
//!
//! ERROR HANDLING
//! ==============
//! Input handlers cannot fail from the host's point of view. A checkpoint or
//! restore error inside a handler is logged with `warn!` and the surface is
//! left consistent. The explicit `undo`/`redo` calls return the
//! [`HistoryError`] so a host can report it.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use tracing::{debug, warn};

use crate::camera::{Camera, Point};
use crate::color::{Color, Fill};
use crate::consts::{
    DEFAULT_CIRCLE_CX, DEFAULT_CIRCLE_CY, DEFAULT_CIRCLE_RADIUS, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE,
    DEFAULT_RECT_SIZE, DEFAULT_RECT_X, DEFAULT_RECT_Y, DEFAULT_TEXT_CONTENT, DEFAULT_TEXT_X, DEFAULT_TEXT_Y,
};
use crate::doc::{Bounds, Drawable, ObjectId, Shape, Surface};
use crate::hit::{HitPart, ResizeAnchor, hit_test};
use crate::history::{History, HistoryError};
use crate::input::{Brush, Button, InputState, Key, Modifiers, Tool, UiState, WheelDelta};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ObjectCreated(Drawable),
    /// Full object state after a committed change.
    ObjectUpdated(Drawable),
    ObjectDeleted { id: ObjectId },
    Cleared,
    /// Open an in-place editor for the text object.
    EditTextRequested { id: ObjectId, content: String },
    SetCursor(String),
    HistoryChanged { can_undo: bool, can_redo: bool },
    RenderNeeded,
}

/// Core engine state: all logic that doesn't depend on the canvas element.
#[derive(Debug)]
pub struct EngineCore {
    pub surface: Surface,
    pub history: History,
    pub ui: UiState,
    pub input: InputState,
}

impl EngineCore {
    /// Engine over a fresh, empty surface.
    ///
    /// # Errors
    ///
    /// Returns a [`HistoryError`] if the initial snapshot cannot be taken.
    pub fn new(width: u32, height: u32, background: Color) -> Result<Self, HistoryError> {
        Self::from_surface(Surface::new(width, height, background))
    }

    /// Engine over an existing surface; its current objects become the
    /// first and only history snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`HistoryError`] if the initial snapshot cannot be taken.
    pub fn from_surface(surface: Surface) -> Result<Self, HistoryError> {
        let mut history = History::new();
        history.checkpoint(&surface)?;
        Ok(Self { surface, history, ui: UiState::default(), input: InputState::Idle })
    }

    // =============================================================
    // Tool and brush
    // =============================================================

    /// Switch the active tool.
    ///
    /// A stroke still being drawn is committed first. Leaving `Select`
    /// clears the selection and any text edit.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        let mut actions = self.finish_gesture();
        if tool != Tool::Select {
            self.ui.selected_id = None;
            self.ui.editing_text = None;
        }
        if self.ui.tool != tool {
            debug!(from = ?self.ui.tool, to = ?tool, "tool switched");
        }
        self.ui.tool = tool;
        actions.push(Action::SetCursor(tool.cursor().to_owned()));
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn set_brush_color(&mut self, color: Color) {
        self.ui.brush.color = color;
    }

    /// Set the stroke width; non-positive or non-finite widths are ignored.
    pub fn set_brush_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.ui.brush.width = width;
        }
    }

    pub fn set_fill(&mut self, fill: Fill) {
        self.ui.brush.fill = fill;
    }

    // =============================================================
    // Pointer input
    // =============================================================

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if button == Button::Secondary {
            return Vec::new();
        }
        let mut actions = self.finish_gesture();
        if button == Button::Middle {
            self.input = InputState::Panning { last_screen: screen_pt };
            actions.push(Action::SetCursor("grabbing".into()));
            return actions;
        }

        let world = self.surface.camera.screen_to_world(screen_pt);
        if self.ui.editing_text.take().is_some() {
            actions.push(Action::RenderNeeded);
        }

        let tool = self.ui.tool;
        match tool {
            t if t.is_drawing() => {
                let color = if t == Tool::Eraser { self.surface.background() } else { self.ui.brush.color };
                self.input = InputState::Drawing { points: vec![world], color, width: self.ui.brush.width };
                actions.push(Action::RenderNeeded);
            }
            t if t.is_inserting() => actions.extend(self.insert_default(t)),
            Tool::Select => actions.extend(self.begin_select(world)),
            // Pan
            _ => {
                self.input = InputState::Panning { last_screen: screen_pt };
                actions.push(Action::SetCursor("grabbing".into()));
            }
        }
        actions
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        let world = self.surface.camera.screen_to_world(screen_pt);
        match &mut self.input {
            InputState::Idle => Vec::new(),
            InputState::Drawing { points, .. } => {
                if points.last() == Some(&world) {
                    return Vec::new();
                }
                points.push(world);
                vec![Action::RenderNeeded]
            }
            InputState::Panning { last_screen } => {
                let (dx, dy) = (screen_pt.x - last_screen.x, screen_pt.y - last_screen.y);
                *last_screen = screen_pt;
                self.surface.camera.pan_by(dx, dy);
                vec![Action::RenderNeeded]
            }
            InputState::DraggingObject { id, last_world, .. } => {
                let (dx, dy) = (world.x - last_world.x, world.y - last_world.y);
                *last_world = world;
                let id = *id;
                if let Some(obj) = self.surface.get_mut(&id) {
                    obj.shape.translate(dx, dy);
                }
                vec![Action::RenderNeeded]
            }
            InputState::ResizingObject { id, anchor, orig } => {
                let corner = anchor_corner(*orig, *anchor);
                let target = anchor.apply(*orig, world.x - corner.x, world.y - corner.y);
                let id = *id;
                if let Some(obj) = self.surface.get_mut(&id) {
                    obj.shape.set_bounds(target);
                }
                vec![Action::RenderNeeded]
            }
        }
    }

    pub fn on_pointer_up(&mut self, _screen_pt: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        self.finish_gesture()
    }

    /// Command+wheel zooms one step around the pointer; plain wheel pans.
    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        let camera = &mut self.surface.camera;
        if modifiers.command() {
            if delta.dy == 0.0 {
                return Vec::new();
            }
            let anchor = camera.screen_to_world(screen_pt);
            if delta.dy < 0.0 {
                camera.zoom_in();
            } else {
                camera.zoom_out();
            }
            keep_under_pointer(camera, anchor, screen_pt);
        } else {
            camera.pan_by(-delta.dx, -delta.dy);
        }
        vec![Action::RenderNeeded]
    }

    // =============================================================
    // Keyboard input
    // =============================================================

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        if modifiers.command() {
            let redo = (key.is("z") && modifiers.shift) || key.is("y");
            let undo = key.is("z") && !modifiers.shift;
            let result = if redo {
                self.redo()
            } else if undo {
                self.undo()
            } else {
                return Vec::new();
            };
            return match result {
                Ok(actions) => actions,
                Err(e) => {
                    warn!(error = %e, "history restore failed");
                    Vec::new()
                }
            };
        }

        if key.is("Escape") {
            if self.ui.editing_text.take().is_some() {
                return vec![Action::RenderNeeded];
            }
            if self.ui.selected_id.take().is_some() {
                return vec![Action::RenderNeeded];
            }
            return Vec::new();
        }

        if (key.is("Delete") || key.is("Backspace")) && self.ui.editing_text.is_none() {
            return self.delete_selected();
        }

        Vec::new()
    }

    // =============================================================
    // Editing operations
    // =============================================================

    /// Replace the content of a text object and checkpoint.
    ///
    /// Returns no actions when `id` is not a text object or the content is
    /// unchanged.
    pub fn set_text(&mut self, id: &ObjectId, text: &str) -> Vec<Action> {
        let Some(obj) = self.surface.get_mut(id) else {
            return Vec::new();
        };
        let Shape::Text { content, .. } = &mut obj.shape else {
            return Vec::new();
        };
        if content == text {
            return Vec::new();
        }
        text.clone_into(content);
        let updated = obj.clone();

        let mut actions = vec![Action::ObjectUpdated(updated)];
        self.checkpoint(&mut actions);
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Leave in-place text editing; the object stays selected.
    pub fn end_text_edit(&mut self) -> Vec<Action> {
        if self.ui.editing_text.take().is_some() {
            vec![Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    /// Remove the selected object and checkpoint.
    pub fn delete_selected(&mut self) -> Vec<Action> {
        let Some(id) = self.ui.selected_id.take() else {
            return Vec::new();
        };
        self.ui.editing_text = None;
        if self.surface.remove(&id).is_none() {
            return Vec::new();
        }
        let mut actions = vec![Action::ObjectDeleted { id }];
        self.checkpoint(&mut actions);
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Remove every object and checkpoint. No-op on an empty surface.
    pub fn clear_all(&mut self) -> Vec<Action> {
        let mut actions = self.finish_gesture();
        if self.surface.is_empty() {
            return actions;
        }
        self.surface.clear();
        self.ui.selected_id = None;
        self.ui.editing_text = None;
        actions.push(Action::Cleared);
        self.checkpoint(&mut actions);
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Step back one snapshot.
    ///
    /// A stroke in progress is committed before stepping back, so the undo
    /// removes it. Returns no actions at the oldest snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::CorruptSnapshot`] if the target snapshot
    /// cannot be restored; the surface is unchanged.
    pub fn undo(&mut self) -> Result<Vec<Action>, HistoryError> {
        let mut actions = self.finish_gesture();
        if self.history.undo(&mut self.surface)? {
            debug!(cursor = ?self.history.cursor(), "undo");
            self.after_restore(&mut actions);
        }
        Ok(actions)
    }

    /// Step forward one snapshot. Returns no actions at the newest snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::CorruptSnapshot`] if the target snapshot
    /// cannot be restored; the surface is unchanged.
    pub fn redo(&mut self) -> Result<Vec<Action>, HistoryError> {
        let mut actions = self.finish_gesture();
        if self.history.redo(&mut self.surface)? {
            debug!(cursor = ?self.history.cursor(), "redo");
            self.after_restore(&mut actions);
        }
        Ok(actions)
    }

    // =============================================================
    // Viewport
    // =============================================================

    pub fn zoom_in(&mut self) -> Vec<Action> {
        self.surface.camera.zoom_in();
        vec![Action::RenderNeeded]
    }

    pub fn zoom_out(&mut self) -> Vec<Action> {
        self.surface.camera.zoom_out();
        vec![Action::RenderNeeded]
    }

    /// Zoom 1.0 and pan at the origin.
    pub fn reset_zoom(&mut self) -> Vec<Action> {
        self.surface.camera.reset();
        vec![Action::RenderNeeded]
    }

    // =============================================================
    // Queries
    // =============================================================

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.ui.tool
    }

    #[must_use]
    pub fn brush(&self) -> Brush {
        self.ui.brush
    }

    #[must_use]
    pub fn selection(&self) -> Option<ObjectId> {
        self.ui.selected_id
    }

    /// The text object currently being edited in place, if any.
    #[must_use]
    pub fn editing_text(&self) -> Option<ObjectId> {
        self.ui.editing_text
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.surface.camera
    }

    #[must_use]
    pub fn object(&self, id: &ObjectId) -> Option<&Drawable> {
        self.surface.get(id)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Points of the stroke currently being drawn, for live preview.
    #[must_use]
    pub fn pending_stroke(&self) -> Option<(&[Point], Color, f64)> {
        match &self.input {
            InputState::Drawing { points, color, width } => Some((points, *color, *width)),
            _ => None,
        }
    }

    // =============================================================
    // Internals
    // =============================================================

    /// End the current gesture, committing whatever it produced.
    fn finish_gesture(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        match std::mem::take(&mut self.input) {
            InputState::Idle => {}
            InputState::Drawing { points, color, width } => {
                let obj = Drawable::new(Shape::Stroke { points, color, width });
                self.surface.push(obj.clone());
                actions.push(Action::ObjectCreated(obj));
                self.checkpoint(&mut actions);
                actions.push(Action::RenderNeeded);
            }
            InputState::Panning { .. } => {
                actions.push(Action::SetCursor(self.ui.tool.cursor().to_owned()));
            }
            InputState::DraggingObject { id, orig, .. } | InputState::ResizingObject { id, orig, .. } => {
                let Some(obj) = self.surface.get(&id) else {
                    return actions;
                };
                if obj.shape.bounds() != orig {
                    actions.push(Action::ObjectUpdated(obj.clone()));
                    self.checkpoint(&mut actions);
                    actions.push(Action::RenderNeeded);
                }
            }
        }
        actions
    }

    fn begin_select(&mut self, world: Point) -> Vec<Action> {
        let camera = self.surface.camera;
        let Some(hit) = hit_test(world, &self.surface, &camera, self.ui.selected_id) else {
            return if self.ui.selected_id.take().is_some() { vec![Action::RenderNeeded] } else { Vec::new() };
        };
        let Some(orig) = self.surface.get(&hit.object_id).map(|o| o.shape.bounds()) else {
            return Vec::new();
        };

        self.ui.selected_id = Some(hit.object_id);
        self.input = match hit.part {
            HitPart::Body => InputState::DraggingObject { id: hit.object_id, last_world: world, orig },
            HitPart::ResizeHandle(anchor) => InputState::ResizingObject { id: hit.object_id, anchor, orig },
        };
        vec![Action::RenderNeeded]
    }

    fn insert_default(&mut self, tool: Tool) -> Vec<Action> {
        let Brush { color, width, fill } = self.ui.brush;
        let shape = match tool {
            Tool::Rectangle => Shape::Rect {
                x: DEFAULT_RECT_X,
                y: DEFAULT_RECT_Y,
                width: DEFAULT_RECT_SIZE,
                height: DEFAULT_RECT_SIZE,
                stroke: color,
                stroke_width: width,
                fill,
            },
            Tool::Circle => Shape::Circle {
                cx: DEFAULT_CIRCLE_CX,
                cy: DEFAULT_CIRCLE_CY,
                radius: DEFAULT_CIRCLE_RADIUS,
                stroke: color,
                stroke_width: width,
                fill,
            },
            Tool::Text => Shape::Text {
                x: DEFAULT_TEXT_X,
                y: DEFAULT_TEXT_Y,
                content: DEFAULT_TEXT_CONTENT.to_owned(),
                font_size: DEFAULT_FONT_SIZE,
                font_family: DEFAULT_FONT_FAMILY.to_owned(),
                fill: color,
            },
            _ => return Vec::new(),
        };

        let obj = Drawable::new(shape);
        let id = obj.id;
        debug!(%id, kind = obj.shape.kind(), "inserted object");
        self.surface.push(obj.clone());
        let mut actions = vec![Action::ObjectCreated(obj)];
        self.checkpoint(&mut actions);

        if tool == Tool::Text {
            self.ui.selected_id = Some(id);
            self.ui.editing_text = Some(id);
            actions.push(Action::EditTextRequested { id, content: DEFAULT_TEXT_CONTENT.to_owned() });
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    fn checkpoint(&mut self, actions: &mut Vec<Action>) {
        if let Err(e) = self.history.checkpoint(&self.surface) {
            warn!(error = %e, "checkpoint failed; change is not undoable");
        }
        actions.push(self.history_changed());
    }

    /// Drop references to objects the restored snapshot no longer holds.
    fn after_restore(&mut self, actions: &mut Vec<Action>) {
        if self.ui.selected_id.is_some_and(|id| self.surface.get(&id).is_none()) {
            self.ui.selected_id = None;
        }
        if self.ui.editing_text.is_some_and(|id| self.surface.get(&id).is_none()) {
            self.ui.editing_text = None;
        }
        actions.push(self.history_changed());
        actions.push(Action::RenderNeeded);
    }

    fn history_changed(&self) -> Action {
        Action::HistoryChanged { can_undo: self.history.can_undo(), can_redo: self.history.can_redo() }
    }
}

fn anchor_corner(bounds: Bounds, anchor: ResizeAnchor) -> Point {
    let [nw, ne, se, sw] = bounds.corners();
    match anchor {
        ResizeAnchor::Nw => nw,
        ResizeAnchor::Ne => ne,
        ResizeAnchor::Se => se,
        ResizeAnchor::Sw => sw,
    }
}

/// Adjust the pan so `world` is drawn at `screen` again after a zoom change.
fn keep_under_pointer(camera: &mut Camera, world: Point, screen: Point) {
    let now = camera.world_to_screen(world);
    camera.pan_by(screen.x - now.x, screen.y - now.y);
}

// =============================================================
// Browser engine
// =============================================================

#[cfg(feature = "web")]
pub use web_engine::Engine;

#[cfg(feature = "web")]
mod web_engine {
    use std::collections::HashMap;

    use wasm_bindgen::{JsCast, JsValue};
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

    use super::{Action, EngineCore};
    use crate::camera::Point;
    use crate::input::{Button, Key, Modifiers, Tool, WheelDelta};

    /// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
    pub struct Engine {
        canvas: HtmlCanvasElement,
        images: HashMap<String, HtmlImageElement>,
        pub core: EngineCore,
    }

    impl Engine {
        /// Create a new engine bound to the given canvas element.
        #[must_use]
        pub fn new(canvas: HtmlCanvasElement, core: EngineCore) -> Self {
            Self { canvas, images: HashMap::new(), core }
        }

        /// Make a loaded image element available for `Shape::Image` objects with this `src`.
        pub fn register_image(&mut self, src: &str, element: HtmlImageElement) {
            self.images.insert(src.to_owned(), element);
        }

        pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
            self.core.set_tool(tool)
        }

        pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
            self.core.on_pointer_down(screen_pt, button, modifiers)
        }

        pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
            self.core.on_pointer_move(screen_pt, modifiers)
        }

        pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
            self.core.on_pointer_up(screen_pt, button, modifiers)
        }

        pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
            self.core.on_wheel(screen_pt, delta, modifiers)
        }

        pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
            self.core.on_key_down(key, modifiers)
        }

        /// Draw the current state to the canvas.
        ///
        /// # Errors
        ///
        /// Returns the browser's error if no 2D context is available.
        pub fn render(&self) -> Result<(), JsValue> {
            let ctx = self
                .canvas
                .get_context("2d")?
                .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
                .dyn_into::<CanvasRenderingContext2d>()?;
            crate::render::web::draw(&ctx, &self.core, &self.images)
        }
    }
}
