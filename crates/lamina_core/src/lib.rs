//! Lamina Core
//!
//! The geometry kernel of the Lamina layer compositor:
//!
//! - **Geometry types**: points, sizes, rects, 4x4 transforms and colors
//! - **Shape kernel**: containment and border-ring predicates for rectangles
//!   and uniformly rounded rectangles
//! - **Distance field**: clamped-point distance used for shadow falloff
//! - **Layer style**: host-side renderable properties of a layer
//!
//! # Example
//!
//! ```rust
//! use lamina_core::{Point, Rect, RoundedRect, ShapeGeometry};
//!
//! let card = RoundedRect::new(Rect::new(0.0, 0.0, 100.0, 100.0), 20.0);
//!
//! assert!(card.contains(Point::new(20.0, 20.0)));
//! assert!(!card.contains(Point::new(5.0, 5.0)));
//! assert!(card.border_contains(5.0, Point::new(7.0, 7.0)));
//! ```

pub mod distance;
pub mod geometry;
pub mod shape;
pub mod style;

pub use distance::distance_to_rounded_rect;
pub use geometry::{Color, Mat4, Point, Rect, Size};
pub use shape::{
    clamp_corner_radius, rect_border_contains, rect_contains, rounded_rect_border_contains,
    rounded_rect_contains, RoundedRect, Shape, ShapeGeometry,
};
pub use style::{LayerStyle, MIN_VISIBLE_OPACITY};
