//! Offscreen rasterization with tiny-skia.
//!
//! Draws at 1:1 surface resolution, background first, then every object in
//! z-order. The camera is ignored: what is exported is the whole surface, not
//! the part currently in view.

#[cfg(test)]
#[path = "raster_test.rs"]
mod raster_test;

use image::{Rgba, RgbaImage};
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke,
    Transform,
};
use tracing::debug;

use super::Rasterizer;
use super::font::Font;
use crate::assets::AssetStore;
use crate::color::{Color, Fill};
use crate::doc::{Drawable, Shape, Surface};
use crate::export::ExportError;

/// Software rasterizer.
///
/// `font` is `None` only when no font source could be loaded; a surface with
/// text then fails to rasterize with [`ExportError::MissingFont`].
#[derive(Debug, Clone)]
pub struct SkiaRasterizer {
    font: Option<Font>,
}

impl SkiaRasterizer {
    /// Rasterizer using [`Font::fallback`] for text.
    #[must_use]
    pub fn new() -> Self {
        Self { font: Font::fallback() }
    }

    /// Rasterizer that outlines text with `font`.
    #[must_use]
    pub fn with_font(font: Font) -> Self {
        Self { font: Some(font) }
    }

    fn draw_object(&self, pixmap: &mut Pixmap, obj: &Drawable, assets: &AssetStore) -> Result<(), ExportError> {
        match &obj.shape {
            Shape::Stroke { points, color, width } => draw_stroke(pixmap, points, *color, *width),
            Shape::Rect { x, y, width, height, stroke, stroke_width, fill } => {
                if let Some(rect) = Rect::from_xywh(f(*x), f(*y), f(*width), f(*height)) {
                    let path = PathBuilder::from_rect(rect);
                    fill_and_stroke(pixmap, &path, *fill, *stroke, *stroke_width);
                }
            }
            Shape::Circle { cx, cy, radius, stroke, stroke_width, fill } => {
                if let Some(path) = PathBuilder::from_circle(f(*cx), f(*cy), f(*radius)) {
                    fill_and_stroke(pixmap, &path, *fill, *stroke, *stroke_width);
                }
            }
            Shape::Text { x, y, content, font_size, fill, .. } => {
                let Some(font) = &self.font else {
                    return Err(ExportError::MissingFont { id: obj.id });
                };
                if let Some(path) = font.text_path(content, f(*x), f(*y), f(*font_size)) {
                    pixmap.fill_path(&path, &paint(*fill), FillRule::Winding, Transform::identity(), None);
                }
            }
            Shape::Image { x, y, width, height, src } => {
                let Some(img) = assets.get(src) else {
                    debug!(id = %obj.id, %src, "image asset missing; skipped in raster");
                    return Ok(());
                };
                draw_image(pixmap, img, *x, *y, *width, *height);
            }
        }
        Ok(())
    }
}

impl Default for SkiaRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for SkiaRasterizer {
    fn rasterize(&self, surface: &Surface, assets: &AssetStore) -> Result<RgbaImage, ExportError> {
        let (width, height) = (surface.width(), surface.height());
        let mut pixmap = Pixmap::new(width, height).ok_or(ExportError::InvalidDimensions { width, height })?;

        let bg = surface.background();
        pixmap.fill(tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));

        for obj in surface.objects() {
            self.draw_object(&mut pixmap, obj, assets)?;
        }

        Ok(to_image(&pixmap))
    }
}

// =============================================================
// Shape renderers
// =============================================================

fn draw_stroke(pixmap: &mut Pixmap, points: &[crate::camera::Point], color: Color, width: f64) {
    match points {
        [] => {}
        [dot] => {
            if let Some(path) = PathBuilder::from_circle(f(dot.x), f(dot.y), f(width / 2.0).max(0.5)) {
                pixmap.fill_path(&path, &paint(color), FillRule::Winding, Transform::identity(), None);
            }
        }
        [first, rest @ ..] => {
            let mut pb = PathBuilder::new();
            pb.move_to(f(first.x), f(first.y));
            for p in rest {
                pb.line_to(f(p.x), f(p.y));
            }
            let Some(path) = pb.finish() else {
                return;
            };
            let stroke = Stroke { width: f(width), line_cap: LineCap::Round, line_join: LineJoin::Round, ..Stroke::default() };
            pixmap.stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
        }
    }
}

fn fill_and_stroke(pixmap: &mut Pixmap, path: &tiny_skia::Path, fill: Fill, stroke: Color, stroke_width: f64) {
    if let Some(color) = fill.color() {
        pixmap.fill_path(path, &paint(color), FillRule::Winding, Transform::identity(), None);
    }
    if stroke_width > 0.0 && stroke.a > 0 {
        let style = Stroke { width: f(stroke_width), line_join: LineJoin::Miter, ..Stroke::default() };
        pixmap.stroke_path(path, &paint(stroke), &style, Transform::identity(), None);
    }
}

fn draw_image(pixmap: &mut Pixmap, img: &RgbaImage, x: f64, y: f64, width: f64, height: f64) {
    let Some(src) = to_pixmap(img) else {
        return;
    };
    let sx = width / f64::from(img.width());
    let sy = height / f64::from(img.height());
    let transform = Transform::from_row(f(sx), 0.0, 0.0, f(sy), f(x), f(y));
    let paint = PixmapPaint { quality: FilterQuality::Bilinear, ..PixmapPaint::default() };
    pixmap.draw_pixmap(0, 0, src.as_ref(), &paint, transform, None);
}

// =============================================================
// Helpers
// =============================================================

#[allow(clippy::cast_possible_truncation)]
fn f(v: f64) -> f32 {
    v as f32
}

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

/// Premultiplied pixmap to straight-alpha RGBA.
fn to_image(pixmap: &Pixmap) -> RgbaImage {
    let mut out = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in out.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    out
}

/// Straight-alpha RGBA to a premultiplied pixmap.
fn to_pixmap(img: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(img.width(), img.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}
