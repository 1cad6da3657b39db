//! Shared numeric constants for the canvas crate.

// ── Viewport ────────────────────────────────────────────────────

/// Smallest allowed zoom factor.
pub const ZOOM_MIN: f64 = 0.1;

/// Largest allowed zoom factor.
pub const ZOOM_MAX: f64 = 3.0;

/// Multiplicative step applied by a single zoom in / zoom out.
pub const ZOOM_STEP: f64 = 1.2;

// ── History ─────────────────────────────────────────────────────

/// Maximum number of snapshots retained by the undo history.
pub const HISTORY_CAPACITY: usize = 20;

// ── Tool defaults ───────────────────────────────────────────────

/// Top-left corner where the rectangle tool places new rectangles.
pub const DEFAULT_RECT_X: f64 = 100.0;
pub const DEFAULT_RECT_Y: f64 = 100.0;
pub const DEFAULT_RECT_SIZE: f64 = 100.0;

/// Center and radius used by the circle tool.
pub const DEFAULT_CIRCLE_CX: f64 = 150.0;
pub const DEFAULT_CIRCLE_CY: f64 = 150.0;
pub const DEFAULT_CIRCLE_RADIUS: f64 = 50.0;

/// Anchor and style of freshly created text objects.
pub const DEFAULT_TEXT_X: f64 = 100.0;
pub const DEFAULT_TEXT_Y: f64 = 100.0;
pub const DEFAULT_TEXT_CONTENT: &str = "Type here";
pub const DEFAULT_FONT_SIZE: f64 = 20.0;
pub const DEFAULT_FONT_FAMILY: &str = "Arial";

/// Brush width used by pen, eraser and shape outlines until changed.
pub const DEFAULT_BRUSH_WIDTH: f64 = 3.0;

// ── Text layout ─────────────────────────────────────────────────

/// Line advance as a multiple of the font size.
pub const TEXT_LINE_HEIGHT: f64 = 1.16;

/// Average glyph advance as a multiple of the font size, used for bounds.
pub const TEXT_AVG_ADVANCE: f64 = 0.6;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for handles and thin strokes.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Smallest width/height an object can be resized to, in world units.
pub const MIN_OBJECT_SIZE: f64 = 1.0;

// ── Images ──────────────────────────────────────────────────────

/// Largest edge accepted for a decoded seed image.
pub const MAX_IMAGE_EDGE: u32 = 8192;
