//! Document model: drawable objects and the surface that owns them.
//!
//! This module defines what is on the canvas (`Drawable`, `Shape`), the
//! axis-aligned `Bounds` used by selection and resize, and the `Surface`
//! that owns the object sequence together with the fixed canvas dimensions,
//! background and the view camera.
//!
//! Objects are stored in a `Vec` whose order is the draw order: later objects
//! are painted on top. The history module serializes exactly this sequence;
//! dimensions, background and camera are never part of a snapshot.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::{Camera, Point};
use crate::color::{Color, Fill};
use crate::consts::{MIN_OBJECT_SIZE, TEXT_AVG_ADVANCE, TEXT_LINE_HEIGHT};

/// Unique identifier for a drawable object.
pub type ObjectId = Uuid;

/// Axis-aligned box in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Smallest box containing every point, or `None` for an empty slice.
    #[must_use]
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Grow the box by `margin` on every side.
    #[must_use]
    pub fn inflate(self, margin: f64) -> Self {
        Self::new(self.x - margin, self.y - margin, self.width + margin * 2.0, self.height + margin * 2.0)
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// The four corners, clockwise from top-left.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y),
            Point::new(self.x + self.width, self.y + self.height),
            Point::new(self.x, self.y + self.height),
        ]
    }
}

/// Geometry and style of a drawable object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Shape {
    /// Freehand polyline produced by the pen or eraser.
    Stroke { points: Vec<Point>, color: Color, width: f64 },
    /// Axis-aligned rectangle anchored at its top-left corner.
    Rect { x: f64, y: f64, width: f64, height: f64, stroke: Color, stroke_width: f64, fill: Fill },
    /// Circle by center and radius.
    Circle { cx: f64, cy: f64, radius: f64, stroke: Color, stroke_width: f64, fill: Fill },
    /// Single- or multi-line text anchored at its top-left corner.
    Text { x: f64, y: f64, content: String, font_size: f64, font_family: String, fill: Color },
    /// Raster image whose pixels live in the session's asset store under `src`.
    Image { x: f64, y: f64, width: f64, height: f64, src: String },
}

impl Shape {
    /// Lowercase kind name, matching the serialized tag.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Stroke { .. } => "stroke",
            Self::Rect { .. } => "rect",
            Self::Circle { .. } => "circle",
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
        }
    }

    /// Axis-aligned bounds. Stroke bounds include half the stroke width.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        match self {
            Self::Stroke { points, width, .. } => Bounds::from_points(points)
                .unwrap_or(Bounds::new(0.0, 0.0, 0.0, 0.0))
                .inflate(width / 2.0),
            Self::Rect { x, y, width, height, .. } | Self::Image { x, y, width, height, .. } => {
                Bounds::new(*x, *y, *width, *height)
            }
            Self::Circle { cx, cy, radius, .. } => Bounds::new(cx - radius, cy - radius, radius * 2.0, radius * 2.0),
            Self::Text { x, y, content, font_size, .. } => {
                let (cols, rows) = text_extent(content);
                Bounds::new(*x, *y, cols * font_size * TEXT_AVG_ADVANCE, rows * font_size * TEXT_LINE_HEIGHT)
            }
        }
    }

    /// Move the shape by a surface-space delta.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        match self {
            Self::Stroke { points, .. } => {
                for p in points {
                    p.x += dx;
                    p.y += dy;
                }
            }
            Self::Rect { x, y, .. } | Self::Text { x, y, .. } | Self::Image { x, y, .. } => {
                *x += dx;
                *y += dy;
            }
            Self::Circle { cx, cy, .. } => {
                *cx += dx;
                *cy += dy;
            }
        }
    }

    /// Fit the shape into `target`, the way a resize handle drag does.
    ///
    /// Rectangles and images take the box exactly. Circles stay round: the
    /// radius follows the shorter side and the center follows the box center.
    /// Text scales its font size with the box height. Strokes scale every
    /// point relative to their own bounds.
    pub fn set_bounds(&mut self, target: Bounds) {
        let target = Bounds::new(
            target.x,
            target.y,
            target.width.max(MIN_OBJECT_SIZE),
            target.height.max(MIN_OBJECT_SIZE),
        );
        let current = self.bounds();
        match self {
            Self::Rect { x, y, width, height, .. } | Self::Image { x, y, width, height, .. } => {
                *x = target.x;
                *y = target.y;
                *width = target.width;
                *height = target.height;
            }
            Self::Circle { cx, cy, radius, .. } => {
                let c = target.center();
                *cx = c.x;
                *cy = c.y;
                *radius = target.width.min(target.height) / 2.0;
            }
            Self::Text { x, y, font_size, .. } => {
                if current.height > 0.0 {
                    *font_size = (*font_size * target.height / current.height).max(MIN_OBJECT_SIZE);
                }
                *x = target.x;
                *y = target.y;
            }
            Self::Stroke { points, .. } => {
                let sx = if current.width > 0.0 { target.width / current.width } else { 1.0 };
                let sy = if current.height > 0.0 { target.height / current.height } else { 1.0 };
                for p in points {
                    p.x = target.x + (p.x - current.x) * sx;
                    p.y = target.y + (p.y - current.y) * sy;
                }
            }
        }
    }
}

/// Longest line length in characters and number of lines.
#[allow(clippy::cast_precision_loss)]
fn text_extent(content: &str) -> (f64, f64) {
    let mut cols = 0usize;
    let mut rows = 0usize;
    for line in content.split('\n') {
        cols = cols.max(line.chars().count());
        rows += 1;
    }
    (cols as f64, rows as f64)
}

/// One discrete object on the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawable {
    /// Unique identifier for this object.
    pub id: ObjectId,
    /// Geometry and style.
    #[serde(flatten)]
    pub shape: Shape,
}

impl Drawable {
    /// Wrap a shape with a fresh id.
    #[must_use]
    pub fn new(shape: Shape) -> Self {
        Self { id: Uuid::new_v4(), shape }
    }
}

/// The drawing surface: fixed canvas, ordered objects and view camera.
#[derive(Debug, Clone)]
pub struct Surface {
    width: u32,
    height: u32,
    background: Color,
    objects: Vec<Drawable>,
    empty: bool,
    /// View transform. Not part of history and ignored by export.
    pub camera: Camera,
}

impl Surface {
    /// Create an empty surface. Dimensions are clamped to at least 1×1.
    #[must_use]
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            background,
            objects: Vec::new(),
            empty: true,
            camera: Camera::default(),
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn background(&self) -> Color {
        self.background
    }

    /// Append an object on top of the z-order.
    pub fn push(&mut self, obj: Drawable) {
        self.objects.push(obj);
        self.empty = false;
    }

    /// Remove an object by id, returning it if it was present.
    pub fn remove(&mut self, id: &ObjectId) -> Option<Drawable> {
        let idx = self.objects.iter().position(|o| o.id == *id)?;
        let removed = self.objects.remove(idx);
        if self.objects.is_empty() {
            self.empty = true;
        }
        Some(removed)
    }

    /// Remove every object.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.empty = true;
    }

    #[must_use]
    pub fn get(&self, id: &ObjectId) -> Option<&Drawable> {
        self.objects.iter().find(|o| o.id == *id)
    }

    pub fn get_mut(&mut self, id: &ObjectId) -> Option<&mut Drawable> {
        self.objects.iter_mut().find(|o| o.id == *id)
    }

    /// Objects in draw order (bottom first).
    #[must_use]
    pub fn objects(&self) -> &[Drawable] {
        &self.objects
    }

    /// Replace the whole object sequence, as history restore does.
    pub fn replace_objects(&mut self, objects: Vec<Drawable>) {
        self.empty = objects.is_empty();
        self.objects = objects;
    }

    /// Number of objects on the surface.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` when there is nothing to export.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.empty
    }
}
