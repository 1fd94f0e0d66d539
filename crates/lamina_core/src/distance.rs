//! Clamped-point distance field
//!
//! Drives soft falloff (shadow opacity, edge feathering) outside a layer's
//! silhouette.

use crate::geometry::{Point, Rect};

/// Distance from `point` to the box `bounds` shrunk by `corner_radius + inset`
/// on every side.
///
/// The point is clamped component-wise into
/// `[bounds.xy + r + inset, bounds.xy + bounds.wh - r - inset]` and the
/// Euclidean distance to the clamped point is returned. The result is always
/// `>= 0` and is zero anywhere inside that inner box.
///
/// This is an approximation. It measures distance to an axis-aligned box, not
/// to the rounded boundary: outside a rounded rect with radius `r` and
/// `inset == 0`, the distance to the silhouette is roughly `result - r`. Only
/// once `inset` exceeds the corner radius does it behave like a true rounded
/// rect distance. When the box inverts (radius plus inset larger than half a
/// side) the clamp collapses onto the upper edge; the result stays finite and
/// non-negative.
pub fn distance_to_rounded_rect(point: Point, bounds: &Rect, corner_radius: f32, inset: f32) -> f32 {
    let shrink = corner_radius + inset;
    let min_x = bounds.x() + shrink;
    let min_y = bounds.y() + shrink;
    let max_x = bounds.x() + bounds.width() - shrink;
    let max_y = bounds.y() + bounds.height() - shrink;

    // `f32::clamp` panics on an inverted range, so clamp by hand.
    let nearest = Point::new(point.x.max(min_x).min(max_x), point.y.max(min_y).min(max_y));
    point.distance_to(nearest)
}
