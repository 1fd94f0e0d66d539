//! Host-side layer style
//!
//! [`LayerStyle`] holds the renderable properties of one layer as the layer
//! tree knows them. The GPU crate flattens it into a fixed-layout layer record.
//! Defaults follow the usual compositing-layer conventions: centered anchor
//! point, no background, no border, and a shadow that is configured but fully
//! transparent until `shadow_opacity` is raised.

use crate::geometry::{Color, Mat4, Point, Rect, Size};
use crate::shape::{clamp_corner_radius, Shape};

/// Layers at or below this opacity are skipped entirely
pub const MIN_VISIBLE_OPACITY: f32 = 0.01;

/// Renderable properties of a single layer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerStyle {
    /// Layer-local bounds (x, y, width, height)
    pub bounds: Rect,
    /// Position of the anchor point in the parent's coordinate space
    pub position: Point,
    /// Pivot within the bounds, normalized to `[0, 1]`
    pub anchor_point: Point,
    /// Transform applied around the anchor point
    pub transform: Mat4,
    /// Device pixels per layer unit
    pub contents_scale: f32,
    pub background_color: Option<Color>,
    pub border_color: Option<Color>,
    pub border_width: f32,
    pub corner_radius: f32,
    /// Clip sublayers to the (rounded) bounds
    pub masks_to_bounds: bool,
    pub shadow_offset: Size,
    pub shadow_color: Option<Color>,
    pub shadow_radius: f32,
    pub shadow_opacity: f32,
    pub opacity: f32,
    pub hidden: bool,
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            bounds: Rect::ZERO,
            position: Point::ZERO,
            anchor_point: Point::new(0.5, 0.5),
            transform: Mat4::IDENTITY,
            contents_scale: 1.0,
            background_color: None,
            border_color: None,
            border_width: 0.0,
            corner_radius: 0.0,
            masks_to_bounds: false,
            shadow_offset: Size::new(0.0, -3.0),
            shadow_color: Some(Color::BLACK),
            shadow_radius: 3.0,
            shadow_opacity: 0.0,
            opacity: 1.0,
            hidden: false,
        }
    }
}

impl LayerStyle {
    /// Create a style with the given bounds, positioned at its own center
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            position: bounds.center(),
            ..Default::default()
        }
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn with_anchor_point(mut self, anchor_point: Point) -> Self {
        self.anchor_point = anchor_point;
        self
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_contents_scale(mut self, scale: f32) -> Self {
        self.contents_scale = scale;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = Some(color);
        self
    }

    pub fn with_border(mut self, width: f32, color: Color) -> Self {
        self.border_width = width;
        self.border_color = Some(color);
        self
    }

    pub fn with_corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = radius;
        self
    }

    pub fn with_masks_to_bounds(mut self, masks: bool) -> Self {
        self.masks_to_bounds = masks;
        self
    }

    /// Set shadow offset, blur radius, color and opacity
    pub fn with_shadow(mut self, offset: Size, radius: f32, color: Color, opacity: f32) -> Self {
        self.shadow_offset = offset;
        self.shadow_radius = radius;
        self.shadow_color = Some(color);
        self.shadow_opacity = opacity;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Whether the layer produces any output at all
    pub fn is_renderable(&self) -> bool {
        !self.hidden && self.opacity > MIN_VISIBLE_OPACITY
    }

    /// Corner radius limited to half the smaller side
    pub fn clamped_corner_radius(&self) -> f32 {
        let clamped = clamp_corner_radius(&self.bounds, self.corner_radius);
        if clamped != self.corner_radius {
            tracing::trace!(
                requested = self.corner_radius,
                clamped,
                "corner radius exceeds bounds, clamping"
            );
        }
        clamped
    }

    /// The layer's shape with the radius as stored
    pub fn shape(&self) -> Shape {
        Shape::for_layer(self.bounds, self.corner_radius)
    }

    /// Transform from this layer's space (in device pixels) to the root.
    ///
    /// `parent * position * anchor * transform * anchor⁻¹`: the layer's own
    /// transform pivots around the anchor point, and the anchor lands on
    /// `position` in the parent.
    pub fn local_transform(&self, parent: &Mat4) -> Mat4 {
        let s = self.contents_scale;
        let w = self.bounds.width();
        let h = self.bounds.height();
        let mid = self.bounds.center();

        let anchor_x = self.anchor_point.x * w * s;
        let anchor_y = self.anchor_point.y * h * s;
        let anchor = Mat4::translation(anchor_x, anchor_y, 0.0);
        let anchor_inv = Mat4::translation(-anchor_x, -anchor_y, 0.0);
        let position = Mat4::translation(
            (self.position.x - mid.x) * s,
            (self.position.y - mid.y) * s,
            0.0,
        );

        parent
            .mul(&position)
            .mul(&anchor)
            .mul(&self.transform)
            .mul(&anchor_inv)
    }

    /// Transform that maps the unit square onto the layer on screen
    pub fn screen_transform(&self, local: &Mat4) -> Mat4 {
        let s = self.contents_scale;
        local.mul(&Mat4::scale(
            self.bounds.width() * s,
            self.bounds.height() * s,
            1.0,
        ))
    }
}
