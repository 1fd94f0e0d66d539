//! Shape containment kernel
//!
//! Point-in-shape predicates for the two shape kinds a layer can have: an
//! axis-aligned rectangle and a uniformly rounded rectangle. Each kind also
//! answers whether a point falls inside its border ring.
//!
//! Every predicate is closed-form arithmetic over its arguments: no loops, no
//! allocation, no shared state. They are meant to be evaluated once per sample
//! by the shading stage and are safe to call from any number of threads.
//! Precondition violations (negative extents, oversized corner radius,
//! negative border width) produce a degenerate shape, never a panic.
//!
//! The WGSL functions in the layer shader are line-for-line ports of the
//! functions in this module.

use crate::distance::distance_to_rounded_rect;
use crate::geometry::{Point, Rect};

/// A rectangle with all four corners rounded by the same radius
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RoundedRect {
    pub bounds: Rect,
    pub corner_radius: f32,
}

impl RoundedRect {
    /// Create a rounded rect, clamping the radius into
    /// `[0, min(width, height) / 2]`.
    pub fn new(bounds: Rect, corner_radius: f32) -> Self {
        Self {
            bounds,
            corner_radius: clamp_corner_radius(&bounds, corner_radius),
        }
    }

    /// Create a rounded rect that keeps `corner_radius` as given.
    ///
    /// This is how the shading stage sees a layer: the radius comes straight
    /// from the layer record and is never validated.
    pub const fn unclamped(bounds: Rect, corner_radius: f32) -> Self {
        Self {
            bounds,
            corner_radius,
        }
    }

    /// Whether the radius satisfies `0 <= r <= min(width, height) / 2`
    pub fn has_valid_radius(&self) -> bool {
        self.corner_radius >= 0.0 && self.corner_radius <= self.bounds.min_side() * 0.5
    }
}

/// Clamp a corner radius into `[0, min(width, height) / 2]`.
///
/// Never panics: a negative limit (negative extents) or NaN collapses the
/// radius to zero.
pub fn clamp_corner_radius(bounds: &Rect, corner_radius: f32) -> f32 {
    if !(corner_radius > 0.0) {
        return 0.0;
    }
    let limit = bounds.min_side() * 0.5;
    corner_radius.min(limit).max(0.0)
}

/// Offset of `point` from the center of `bounds`, folded into the positive
/// quadrant.
#[inline]
fn folded_offset(bounds: &Rect, point: Point) -> (f32, f32) {
    let center = bounds.center();
    ((point.x - center.x).abs(), (point.y - center.y).abs())
}

/// L∞ box test around the center: `max(|dx| - hx, |dy| - hy) <= 0`
#[inline]
fn box_test(dx: f32, dy: f32, hx: f32, hy: f32) -> f32 {
    (dx - hx).max(dy - hy)
}

/// Rounded-box test: squared distance from the corner rounding center, or 0
/// along the straight edges. Compare against `radius²`.
#[inline]
fn rounded_box_test(dx: f32, dy: f32, sx: f32, sy: f32) -> f32 {
    let qx = (dx - sx).max(0.0);
    let qy = (dy - sy).max(0.0);
    qx * qx + qy * qy
}

/// Whether `point` lies inside `rect` (edges inclusive)
pub fn rect_contains(rect: &Rect, point: Point) -> bool {
    let (dx, dy) = folded_offset(rect, point);
    let half = rect.half_extents();
    box_test(dx, dy, half.width, half.height) <= 0.0
}

/// Whether `point` lies in the ring of thickness `border_width` just inside
/// the edge of `rect`.
///
/// The outer edge is inclusive; the inner edge belongs to the interior.
pub fn rect_border_contains(rect: &Rect, border_width: f32, point: Point) -> bool {
    let (dx, dy) = folded_offset(rect, point);
    let half = rect.half_extents();
    let outer = box_test(dx, dy, half.width, half.height);
    let inner = box_test(
        dx,
        dy,
        half.width - border_width,
        half.height - border_width,
    );
    outer <= 0.0 && inner > 0.0
}

/// Whether `point` lies inside the rounded rect (edges inclusive)
pub fn rounded_rect_contains(rect: &RoundedRect, point: Point) -> bool {
    let (dx, dy) = folded_offset(&rect.bounds, point);
    let half = rect.bounds.half_extents();
    let r = rect.corner_radius;
    rounded_box_test(dx, dy, half.width - r, half.height - r) <= r * r
}

/// Whether `point` lies in the border ring of the rounded rect.
///
/// The hole is its own rounded rect: the bounds inset by `border_width` on
/// every side, with the corner radius shrunk by the same amount and floored at
/// zero. Once the border eats the whole radius the hole has square corners.
pub fn rounded_rect_border_contains(rect: &RoundedRect, border_width: f32, point: Point) -> bool {
    let (dx, dy) = folded_offset(&rect.bounds, point);
    let half = rect.bounds.half_extents();
    let r = rect.corner_radius;

    let outer = rounded_box_test(dx, dy, half.width - r, half.height - r);

    let inner_r = (r - border_width).max(0.0);
    let inner_hx = (half.width * 2.0 - 2.0 * border_width) * 0.5 - inner_r;
    let inner_hy = (half.height * 2.0 - 2.0 * border_width) * 0.5 - inner_r;
    let inner = rounded_box_test(dx, dy, inner_hx, inner_hy);

    outer <= r * r && inner > inner_r * inner_r
}

/// Common capability set of the shape kinds
pub trait ShapeGeometry {
    /// The shape's bounding rectangle
    fn bounds(&self) -> Rect;

    /// Corner radius; zero for square corners
    fn corner_radius(&self) -> f32;

    /// Whether `point` lies inside the shape
    fn contains(&self, point: Point) -> bool;

    /// Whether `point` lies in the border ring of width `border_width`
    fn border_contains(&self, border_width: f32, point: Point) -> bool;

    /// Approximate distance from `point` to the shape's core box, shrunk by
    /// the corner radius and then by `inset`.
    ///
    /// See [`distance_to_rounded_rect`] for what the approximation means.
    fn distance(&self, point: Point, inset: f32) -> f32 {
        distance_to_rounded_rect(point, &self.bounds(), self.corner_radius(), inset)
    }
}

impl ShapeGeometry for Rect {
    fn bounds(&self) -> Rect {
        *self
    }

    fn corner_radius(&self) -> f32 {
        0.0
    }

    fn contains(&self, point: Point) -> bool {
        rect_contains(self, point)
    }

    fn border_contains(&self, border_width: f32, point: Point) -> bool {
        rect_border_contains(self, border_width, point)
    }
}

impl ShapeGeometry for RoundedRect {
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn corner_radius(&self) -> f32 {
        self.corner_radius
    }

    fn contains(&self, point: Point) -> bool {
        rounded_rect_contains(self, point)
    }

    fn border_contains(&self, border_width: f32, point: Point) -> bool {
        rounded_rect_border_contains(self, border_width, point)
    }
}

/// A layer shape, tagged by kind
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Rect(Rect),
    RoundedRect(RoundedRect),
}

impl Shape {
    /// Pick the shape kind for a layer: square corners unless the radius is
    /// positive. The radius is not clamped.
    pub fn for_layer(bounds: Rect, corner_radius: f32) -> Self {
        if corner_radius > 0.0 {
            RoundedRect::unclamped(bounds, corner_radius).into()
        } else {
            bounds.into()
        }
    }
}

impl From<Rect> for Shape {
    fn from(rect: Rect) -> Self {
        Shape::Rect(rect)
    }
}

impl From<RoundedRect> for Shape {
    fn from(rect: RoundedRect) -> Self {
        Shape::RoundedRect(rect)
    }
}

impl ShapeGeometry for Shape {
    fn bounds(&self) -> Rect {
        match self {
            Shape::Rect(rect) => rect.bounds(),
            Shape::RoundedRect(rect) => rect.bounds(),
        }
    }

    fn corner_radius(&self) -> f32 {
        match self {
            Shape::Rect(rect) => rect.corner_radius(),
            Shape::RoundedRect(rect) => rect.corner_radius(),
        }
    }

    fn contains(&self, point: Point) -> bool {
        match self {
            Shape::Rect(rect) => rect.contains(point),
            Shape::RoundedRect(rect) => rect.contains(point),
        }
    }

    fn border_contains(&self, border_width: f32, point: Point) -> bool {
        match self {
            Shape::Rect(rect) => rect.border_contains(border_width, point),
            Shape::RoundedRect(rect) => rect.border_contains(border_width, point),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quickcheck_macros::quickcheck;

    // Generated coordinates are quarter units so the f32 arithmetic below is
    // exact.
    fn unit(v: i16) -> f32 {
        (v / 8) as f32 * 0.25
    }

    fn unit_len(v: u16) -> f32 {
        (v / 16) as f32 * 0.25
    }

    fn rounded(x: f32, y: f32, w: f32, h: f32, r: f32) -> RoundedRect {
        RoundedRect::unclamped(Rect::new(x, y, w, h), r)
    }

    #[test]
    fn rect_contains_center_and_edges() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);

        assert!(rect_contains(&rect, Point::new(50.0, 25.0)));
        assert!(rect_contains(&rect, Point::new(51.0, 25.0)));
        assert!(!rect_contains(&rect, Point::new(-1.0, 25.0)));

        // Edges are inclusive
        assert!(rect_contains(&rect, Point::new(0.0, 0.0)));
        assert!(rect_contains(&rect, Point::new(100.0, 50.0)));
        assert!(!rect_contains(&rect, Point::new(100.5, 25.0)));
        assert!(!rect_contains(&rect, Point::new(50.0, 50.5)));
    }

    #[test]
    fn rect_border_ring() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);

        assert!(rect_border_contains(&rect, 5.0, Point::new(2.0, 25.0)));
        assert!(rect_border_contains(&rect, 5.0, Point::new(50.0, 48.0)));
        assert!(rect_border_contains(&rect, 5.0, Point::new(0.0, 0.0)));
        assert!(!rect_border_contains(&rect, 5.0, Point::new(50.0, 25.0)));
        assert!(!rect_border_contains(&rect, 5.0, Point::new(-1.0, 25.0)));

        // The inner edge belongs to the interior
        assert!(!rect_border_contains(&rect, 5.0, Point::new(5.0, 25.0)));
    }

    #[test]
    fn zero_border_is_empty_ring() {
        let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
        assert!(!rect_border_contains(&rect, 0.0, Point::new(50.0, 25.0)));
        assert!(!rect_border_contains(&rect, 0.0, Point::new(10.0, 10.0)));
    }

    #[test]
    fn rounded_rect_corner() {
        let rect = rounded(0.0, 0.0, 100.0, 100.0, 20.0);

        assert!(!rounded_rect_contains(&rect, Point::new(5.0, 5.0)));
        assert!(rounded_rect_contains(&rect, Point::new(20.0, 20.0)));
        assert!(rounded_rect_contains(&rect, Point::new(50.0, 0.0)));
        assert!(rounded_rect_contains(&rect, Point::new(0.0, 50.0)));
        assert!(!rounded_rect_contains(&rect, Point::new(0.0, 0.0)));
        assert!(!rounded_rect_contains(&rect, Point::new(100.0, 100.0)));

        // Point on the rounding circle along the diagonal
        let on_arc = 20.0 - 20.0 / 2f32.sqrt() + 0.01;
        assert!(rounded_rect_contains(&rect, Point::new(on_arc, on_arc)));
    }

    #[test]
    fn rounded_rect_border_ring() {
        let rect = rounded(0.0, 0.0, 100.0, 100.0, 20.0);

        assert!(!rounded_rect_border_contains(&rect, 5.0, Point::new(2.0, 2.0)));
        assert!(rounded_rect_border_contains(&rect, 5.0, Point::new(7.0, 7.0)));
        assert!(!rounded_rect_border_contains(&rect, 5.0, Point::new(40.0, 40.0)));

        // Both rounding centers sit at (20, 20); this point is 2.8 units from
        // them, well inside the 15-unit inner radius.
        assert!(!rounded_rect_border_contains(&rect, 5.0, Point::new(18.0, 18.0)));

        // Straight edges
        assert!(rounded_rect_border_contains(&rect, 5.0, Point::new(50.0, 3.0)));
        assert!(!rounded_rect_border_contains(&rect, 5.0, Point::new(50.0, 6.0)));
    }

    #[test]
    fn rounded_border_is_uniform_at_corners() {
        // Walk outward from the rounding center along the diagonal. The ring
        // should span exactly `border_width` units, same as along an edge.
        let rect = rounded(0.0, 0.0, 100.0, 100.0, 20.0);
        let border = 5.0;
        let diag = 1.0 / 2f32.sqrt();

        let mut inside_ring = 0;
        for step in 0..200 {
            let t = step as f32 * 0.1;
            let p = Point::new(20.0 - t * diag, 20.0 - t * diag);
            if rounded_rect_border_contains(&rect, border, p) {
                inside_ring += 1;
            }
        }
        // Distances in (15, 20] at 0.1 spacing
        assert!((49..=51).contains(&inside_ring), "ring width {inside_ring}");
    }

    #[test]
    fn border_wider_than_radius_squares_the_hole() {
        let rect = rounded(0.0, 0.0, 100.0, 100.0, 4.0);

        // Inner rect is [10, 90] with square corners
        assert!(!rounded_rect_border_contains(&rect, 10.0, Point::new(10.5, 10.5)));
        assert!(rounded_rect_border_contains(&rect, 10.0, Point::new(9.5, 10.5)));
        assert!(rounded_rect_border_contains(&rect, 10.0, Point::new(5.0, 5.0)));
    }

    #[test]
    fn degenerate_inputs_do_not_panic() {
        let p = Point::new(1.0, 1.0);
        let negative = Rect::new(0.0, 0.0, -10.0, -10.0);
        assert!(!rect_contains(&negative, p));

        let oversized = rounded(0.0, 0.0, 10.0, 10.0, 50.0);
        let _ = rounded_rect_contains(&oversized, p);
        let _ = rounded_rect_border_contains(&oversized, -3.0, p);

        let nan = Point::new(f32::NAN, 0.0);
        let _ = rect_contains(&Rect::new(0.0, 0.0, 10.0, 10.0), nan);
        let _ = rect_border_contains(&Rect::new(0.0, 0.0, 10.0, 10.0), f32::INFINITY, nan);
        let _ = rounded_rect_contains(&rounded(0.0, 0.0, 10.0, 10.0, f32::NAN), nan);
    }

    #[test]
    fn clamping_constructor() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 40.0);
        assert_eq!(RoundedRect::new(bounds, 50.0).corner_radius, 20.0);
        assert_eq!(RoundedRect::new(bounds, -5.0).corner_radius, 0.0);
        assert_eq!(RoundedRect::new(bounds, f32::NAN).corner_radius, 0.0);
        assert_eq!(RoundedRect::new(bounds, 8.0).corner_radius, 8.0);

        assert_eq!(RoundedRect::unclamped(bounds, 50.0).corner_radius, 50.0);
        assert!(!RoundedRect::unclamped(bounds, 50.0).has_valid_radius());
        assert!(RoundedRect::new(bounds, 50.0).has_valid_radius());

        let negative = Rect::new(0.0, 0.0, -4.0, 10.0);
        assert_eq!(clamp_corner_radius(&negative, 3.0), 0.0);
    }

    #[test]
    fn shape_dispatch() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);

        let square = Shape::for_layer(bounds, 0.0);
        assert!(matches!(square, Shape::Rect(_)));
        assert!(square.contains(Point::new(1.0, 1.0)));
        assert_eq!(square.corner_radius(), 0.0);

        let round = Shape::for_layer(bounds, 20.0);
        assert!(matches!(round, Shape::RoundedRect(_)));
        assert!(!round.contains(Point::new(1.0, 1.0)));
        assert!(round.border_contains(5.0, Point::new(7.0, 7.0)));
        assert_eq!(round.bounds(), bounds);

        assert_eq!(round.distance(Point::new(50.0, 50.0), 0.0), 0.0);
        assert_eq!(square.distance(Point::new(110.0, 50.0), 0.0), 10.0);
    }

    #[quickcheck]
    fn rect_contains_its_center(x: i16, y: i16, w: u16, h: u16) -> bool {
        let rect = Rect::new(unit(x), unit(y), unit_len(w), unit_len(h));
        rect_contains(&rect, rect.center())
    }

    #[quickcheck]
    fn zero_radius_matches_rect(x: i16, y: i16, w: u16, h: u16, px: i16, py: i16) -> bool {
        let rect = Rect::new(unit(x), unit(y), unit_len(w), unit_len(h));
        let p = Point::new(unit(px), unit(py));
        rounded_rect_contains(&RoundedRect::unclamped(rect, 0.0), p) == rect_contains(&rect, p)
    }

    #[quickcheck]
    fn border_implies_contains(w: u16, h: u16, b: u16, px: i16, py: i16) -> bool {
        let rect = Rect::new(0.0, 0.0, unit_len(w), unit_len(h));
        let p = Point::new(unit(px), unit(py));
        !rect_border_contains(&rect, unit_len(b), p) || rect_contains(&rect, p)
    }

    #[quickcheck]
    fn border_disjoint_from_shrunk_rect(w: u16, h: u16, b: u16, px: i16, py: i16) -> bool {
        let b = unit_len(b);
        let rect = Rect::new(0.0, 0.0, unit_len(w), unit_len(h));
        let shrunk = rect.inset(b, b);
        let p = Point::new(unit(px), unit(py));
        !(rect_border_contains(&rect, b, p) && rect_contains(&shrunk, p))
    }

    #[quickcheck]
    fn rounded_border_stays_inside_shape(w: u16, h: u16, r: u16, b: u16, px: i16, py: i16) -> bool {
        let bounds = Rect::new(0.0, 0.0, unit_len(w), unit_len(h));
        let rect = RoundedRect::new(bounds, unit_len(r));
        let p = Point::new(unit(px), unit(py));
        !rounded_rect_border_contains(&rect, unit_len(b), p) || rounded_rect_contains(&rect, p)
    }
}
