#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::{Camera, Point};
use crate::consts::HANDLE_RADIUS_PX;
use crate::doc::{Bounds, Drawable, ObjectId, Shape, Surface};

/// Which part of an object was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeAnchor),
}

/// Corner handle of a selection box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    Nw,
    Ne,
    Se,
    Sw,
}

impl ResizeAnchor {
    /// All anchors in the same clockwise order as [`Bounds::corners`].
    pub const ALL: [Self; 4] = [Self::Nw, Self::Ne, Self::Se, Self::Sw];

    /// Bounds after dragging this corner by `(dx, dy)`; the opposite corner stays put.
    #[must_use]
    pub fn apply(self, orig: Bounds, dx: f64, dy: f64) -> Bounds {
        let (mut x0, mut y0) = (orig.x, orig.y);
        let (mut x1, mut y1) = (orig.x + orig.width, orig.y + orig.height);
        match self {
            Self::Nw => {
                x0 += dx;
                y0 += dy;
            }
            Self::Ne => {
                x1 += dx;
                y0 += dy;
            }
            Self::Se => {
                x1 += dx;
                y1 += dy;
            }
            Self::Sw => {
                x0 += dx;
                y1 += dy;
            }
        }
        Bounds::new(x0.min(x1), y0.min(y1), (x1 - x0).abs(), (y1 - y0).abs())
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub object_id: ObjectId,
    pub part: HitPart,
}

/// Test which object (if any) is under `world_pt`.
///
/// Handles of the selected object win over everything else; then objects are
/// checked top-most first. The handle slop is a fixed screen distance, so it
/// shrinks in surface units as the camera zooms in.
#[must_use]
pub fn hit_test(world_pt: Point, surface: &Surface, camera: &Camera, selected_id: Option<ObjectId>) -> Option<Hit> {
    let slop = camera.screen_dist_to_world(HANDLE_RADIUS_PX);

    if let Some(sel) = selected_id.and_then(|id| surface.get(&id)) {
        let corners = sel.shape.bounds().corners();
        for (anchor, corner) in ResizeAnchor::ALL.into_iter().zip(corners) {
            if corner.distance(world_pt) <= slop {
                return Some(Hit { object_id: sel.id, part: HitPart::ResizeHandle(anchor) });
            }
        }
    }

    surface
        .objects()
        .iter()
        .rev()
        .find(|obj| hits_body(obj, world_pt, slop))
        .map(|obj| Hit { object_id: obj.id, part: HitPart::Body })
}

fn hits_body(obj: &Drawable, pt: Point, slop: f64) -> bool {
    match &obj.shape {
        Shape::Stroke { points, width, .. } => {
            let reach = width / 2.0 + slop;
            match points.as_slice() {
                [] => false,
                [only] => only.distance(pt) <= reach,
                pts => pts.windows(2).any(|w| distance_to_segment(pt, w[0], w[1]) <= reach),
            }
        }
        Shape::Circle { cx, cy, radius, .. } => Point::new(*cx, *cy).distance(pt) <= radius + slop,
        _ => obj.shape.bounds().contains(pt),
    }
}

/// Shortest distance from `p` to the segment `a`–`b`.
#[must_use]
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}
