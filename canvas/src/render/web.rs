//! Live view: draws the engine state to a 2D canvas context.
//!
//! This is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It reads the surface, the camera, the pending stroke and the selection and
//! produces pixels; it never mutates engine state. Unlike the raster adapter
//! the camera transform is applied, so the view follows zoom and pan.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.

use std::collections::HashMap;
use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::camera::Point;
use crate::color::{Color, Fill};
use crate::consts::{HANDLE_RADIUS_PX, TEXT_LINE_HEIGHT};
use crate::doc::{Drawable, Shape};
use crate::engine::EngineCore;

/// Selection dash segment length in screen pixels.
const SELECTION_DASH_PX: f64 = 4.0;
const SELECTION_COLOR: &str = "#1E90FF";
/// Drawn outside the surface so its edges stay visible when panned.
const DESK_COLOR: &str = "#e5e5e5";

/// Draw the full scene: desk, surface, objects, pending stroke, selection.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(
    ctx: &CanvasRenderingContext2d,
    core: &EngineCore,
    images: &HashMap<String, HtmlImageElement>,
) -> Result<(), JsValue> {
    let surface = &core.surface;
    let camera = surface.camera;

    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
    if let Some(canvas) = ctx.canvas() {
        ctx.set_fill_style_str(DESK_COLOR);
        ctx.fill_rect(0.0, 0.0, f64::from(canvas.width()), f64::from(canvas.height()));
    }
    ctx.translate(camera.pan_x, camera.pan_y)?;
    ctx.scale(camera.zoom, camera.zoom)?;

    ctx.set_fill_style_str(&surface.background().to_hex());
    ctx.fill_rect(0.0, 0.0, f64::from(surface.width()), f64::from(surface.height()));

    for obj in surface.objects() {
        draw_object(ctx, obj, images)?;
    }

    if let Some((points, color, width)) = core.pending_stroke() {
        draw_stroke(ctx, points, color, width)?;
    }

    if let Some(obj) = core.selection().and_then(|id| surface.get(&id)) {
        draw_selection(ctx, obj, camera.zoom)?;
    }

    Ok(())
}

// =============================================================
// Object dispatch
// =============================================================

fn draw_object(
    ctx: &CanvasRenderingContext2d,
    obj: &Drawable,
    images: &HashMap<String, HtmlImageElement>,
) -> Result<(), JsValue> {
    match &obj.shape {
        Shape::Stroke { points, color, width } => draw_stroke(ctx, points, *color, *width),
        Shape::Rect { x, y, width, height, stroke, stroke_width, fill } => {
            ctx.begin_path();
            ctx.rect(*x, *y, *width, *height);
            fill_and_stroke(ctx, *fill, *stroke, *stroke_width);
            Ok(())
        }
        Shape::Circle { cx, cy, radius, stroke, stroke_width, fill } => {
            ctx.begin_path();
            ctx.arc(*cx, *cy, *radius, 0.0, 2.0 * PI)?;
            fill_and_stroke(ctx, *fill, *stroke, *stroke_width);
            Ok(())
        }
        Shape::Text { x, y, content, font_size, font_family, fill } => {
            ctx.set_fill_style_str(&fill.to_hex());
            ctx.set_font(&format!("{font_size}px {font_family}"));
            ctx.set_text_align("left");
            ctx.set_text_baseline("top");
            let mut line_y = *y;
            for line in content.split('\n') {
                ctx.fill_text(line, *x, line_y)?;
                line_y += font_size * TEXT_LINE_HEIGHT;
            }
            Ok(())
        }
        Shape::Image { x, y, width, height, src } => match images.get(src) {
            Some(img) => ctx.draw_image_with_html_image_element_and_dw_and_dh(img, *x, *y, *width, *height),
            None => Ok(()),
        },
    }
}

// =============================================================
// Shape renderers
// =============================================================

fn draw_stroke(ctx: &CanvasRenderingContext2d, points: &[Point], color: Color, width: f64) -> Result<(), JsValue> {
    ctx.set_fill_style_str(&color.to_hex());
    ctx.set_stroke_style_str(&color.to_hex());
    match points {
        [] => {}
        [dot] => {
            ctx.begin_path();
            ctx.arc(dot.x, dot.y, width / 2.0, 0.0, 2.0 * PI)?;
            ctx.fill();
        }
        [first, rest @ ..] => {
            ctx.set_line_width(width);
            ctx.set_line_cap("round");
            ctx.set_line_join("round");
            ctx.begin_path();
            ctx.move_to(first.x, first.y);
            for p in rest {
                ctx.line_to(p.x, p.y);
            }
            ctx.stroke();
        }
    }
    Ok(())
}

/// Fill and stroke the current path.
fn fill_and_stroke(ctx: &CanvasRenderingContext2d, fill: Fill, stroke: Color, stroke_width: f64) {
    if let Some(color) = fill.color() {
        ctx.set_fill_style_str(&color.to_hex());
        ctx.fill();
    }
    if stroke_width > 0.0 && stroke.a > 0 {
        ctx.set_stroke_style_str(&stroke.to_hex());
        ctx.set_line_width(stroke_width);
        ctx.set_line_join("miter");
        ctx.stroke();
    }
}

// =============================================================
// Selection
// =============================================================

fn draw_selection(ctx: &CanvasRenderingContext2d, obj: &Drawable, zoom: f64) -> Result<(), JsValue> {
    let b = obj.shape.bounds();
    let dash_world = SELECTION_DASH_PX / zoom;

    ctx.save();
    ctx.set_stroke_style_str(SELECTION_COLOR);
    ctx.set_line_width(1.0 / zoom);
    let dash_array = js_sys::Array::new();
    dash_array.push(&dash_world.into());
    dash_array.push(&dash_world.into());
    ctx.set_line_dash(&dash_array)?;
    ctx.stroke_rect(b.x, b.y, b.width, b.height);
    ctx.set_line_dash(&js_sys::Array::new())?;

    let handle = HANDLE_RADIUS_PX / zoom / 2.0;
    ctx.set_fill_style_str("#fff");
    for corner in b.corners() {
        ctx.fill_rect(corner.x - handle, corner.y - handle, handle * 2.0, handle * 2.0);
        ctx.stroke_rect(corner.x - handle, corner.y - handle, handle * 2.0, handle * 2.0);
    }

    ctx.restore();
    Ok(())
}
