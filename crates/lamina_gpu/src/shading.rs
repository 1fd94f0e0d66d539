//! CPU reference of the layer shading stage
//!
//! Mirrors the fragment logic of [`crate::shaders::LAYER_SHADER`] so the
//! classification and blending can be tested without a GPU, and so software
//! paths can shade the same records. Every function reads the record as-is:
//! no clamping, no validation.

use lamina_core::{Color, Point, ShapeGeometry};

use crate::config::RendererConfig;
use crate::primitives::LayerRecord;

/// What a sample sees of a layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleClass {
    /// Outside the layer and its shadow
    Background,
    /// Inside the shape, off the border ring
    Fill,
    /// On the border ring
    Border,
    /// Outside the shape, under the shadow penumbra
    Shadow,
}

/// Shadow alpha at `point`.
///
/// Full strength inside the offset shape, fading linearly to zero at
/// `shadow_radius` units outside it. Distance to the silhouette is the
/// clamped distance to the core box minus the corner radius, exact along the
/// straight edges and around the corner arcs. A zero radius gives a hard edge.
pub fn shadow_alpha(record: &LayerRecord, point: Point) -> f32 {
    if !record.has_shadow() {
        return 0.0;
    }
    let shape = record.shadow_shape();
    let strength = record.shadow_color[3] * record.shadow_opacity;

    if record.shadow_radius > 0.0 {
        let d = (shape.distance(point, 0.0) - shape.corner_radius()).max(0.0);
        strength * (1.0 - (d / record.shadow_radius).min(1.0))
    } else if shape.contains(point) {
        strength
    } else {
        0.0
    }
}

/// Classify one sample against a layer
pub fn classify_sample(record: &LayerRecord, point: Point) -> SampleClass {
    let shape = record.shape();
    if record.border_width > 0.0 && shape.border_contains(record.border_width, point) {
        SampleClass::Border
    } else if shape.contains(point) {
        SampleClass::Fill
    } else if shadow_alpha(record, point) > 0.0 {
        SampleClass::Shadow
    } else {
        SampleClass::Background
    }
}

/// Whether sublayer content at `point` survives the layer's
/// `masks_to_bounds` clip
pub fn clip_contains(record: &LayerRecord, point: Point) -> bool {
    !record.masks_to_bounds() || record.shape().contains(point)
}

/// Source-over composite of straight-alpha colors
pub fn over(src: Color, dst: Color) -> Color {
    let a = src.a + dst.a * (1.0 - src.a);
    if a <= 0.0 {
        return Color::TRANSPARENT;
    }
    let mix = |s: f32, d: f32| (s * src.a + d * dst.a * (1.0 - src.a)) / a;
    Color::rgba(mix(src.r, dst.r), mix(src.g, dst.g), mix(src.b, dst.b), a)
}

/// Color of the layer at one sample, straight alpha
pub fn shade_sample(record: &LayerRecord, point: Point) -> Color {
    match classify_sample(record, point) {
        SampleClass::Background => Color::TRANSPARENT,
        SampleClass::Fill => record.background(),
        SampleClass::Border => over(record.border(), record.background()),
        SampleClass::Shadow => record.shadow().with_alpha(shadow_alpha(record, point)),
    }
}

/// Standard multisample positions, offsets from the pixel center in pixels
pub fn sample_positions(sample_count: u32) -> &'static [[f32; 2]] {
    const ONE: [[f32; 2]; 1] = [[0.0, 0.0]];
    const TWO: [[f32; 2]; 2] = [[0.25, 0.25], [-0.25, -0.25]];
    const FOUR: [[f32; 2]; 4] = [
        [-0.125, -0.375],
        [0.375, -0.125],
        [-0.375, 0.125],
        [0.125, 0.375],
    ];
    const EIGHT: [[f32; 2]; 8] = [
        [0.0625, -0.1875],
        [-0.0625, 0.1875],
        [0.3125, 0.0625],
        [-0.1875, -0.3125],
        [-0.3125, 0.3125],
        [-0.4375, -0.0625],
        [0.1875, 0.4375],
        [0.4375, -0.4375],
    ];
    match sample_count {
        2 => &TWO,
        4 => &FOUR,
        8 => &EIGHT,
        _ => &ONE,
    }
}

/// Resolve the pixel whose top-left corner is `pixel` by shading each of the
/// configured `sample_count` samples and averaging in premultiplied space.
///
/// Sample counts without a standard pattern shade the pixel center only.
pub fn shade_pixel(record: &LayerRecord, pixel: Point, config: &RendererConfig) -> Color {
    let positions = sample_positions(config.sample_count);
    let mut sum = [0.0f32; 4];
    for [dx, dy] in positions {
        let c = shade_sample(record, Point::new(pixel.x + 0.5 + dx, pixel.y + 0.5 + dy));
        sum[0] += c.r * c.a;
        sum[1] += c.g * c.a;
        sum[2] += c.b * c.a;
        sum[3] += c.a;
    }
    let n = positions.len() as f32;
    let a = sum[3] / n;
    if a <= 0.0 {
        return Color::TRANSPARENT;
    }
    Color::rgba(sum[0] / n / a, sum[1] / n / a, sum[2] / n / a, a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lamina_core::Rect;

    use quickcheck_macros::quickcheck;

    fn card() -> LayerRecord {
        let mut record = LayerRecord::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        record.corner_radius = 20.0;
        record.border_width = 5.0;
        record.background_color = Color::WHITE.to_array();
        record.border_color = Color::BLUE.to_array();
        record
    }

    fn with_shadow(mut record: LayerRecord, radius: f32) -> LayerRecord {
        record.shadow_color = Color::BLACK.to_array();
        record.shadow_opacity = 0.5;
        record.shadow_radius = radius;
        record.shadow_offset = [10.0, 10.0];
        record
    }

    #[test]
    fn classification() {
        let record = card();
        assert_eq!(classify_sample(&record, Point::new(50.0, 50.0)), SampleClass::Fill);
        assert_eq!(classify_sample(&record, Point::new(7.0, 7.0)), SampleClass::Border);
        assert_eq!(classify_sample(&record, Point::new(50.0, 2.0)), SampleClass::Border);
        assert_eq!(classify_sample(&record, Point::new(2.0, 2.0)), SampleClass::Background);
        assert_eq!(classify_sample(&record, Point::new(150.0, 50.0)), SampleClass::Background);
    }

    #[test]
    fn zero_border_never_classifies_border() {
        let mut record = card();
        record.border_width = 0.0;
        assert_eq!(classify_sample(&record, Point::new(50.0, 0.5)), SampleClass::Fill);
    }

    #[test]
    fn shadow_falls_off_with_distance() {
        let record = with_shadow(card(), 10.0);

        // Inside the offset shape but outside the layer
        let under = shadow_alpha(&record, Point::new(105.0, 50.0));
        assert_eq!(under, 0.5);
        assert_eq!(classify_sample(&record, Point::new(105.0, 50.0)), SampleClass::Shadow);

        // Halfway through the penumbra past the shadow's right edge at x = 110
        let half = shadow_alpha(&record, Point::new(115.0, 50.0));
        assert!((half - 0.25).abs() < 1e-6);

        assert_eq!(shadow_alpha(&record, Point::new(121.0, 50.0)), 0.0);
        assert_eq!(classify_sample(&record, Point::new(121.0, 50.0)), SampleClass::Background);
    }

    #[test]
    fn hard_shadow_without_radius() {
        let record = with_shadow(card(), 0.0);
        assert_eq!(shadow_alpha(&record, Point::new(105.0, 50.0)), 0.5);
        assert_eq!(shadow_alpha(&record, Point::new(111.0, 50.0)), 0.0);
    }

    #[test]
    fn no_shadow_when_opacity_is_zero() {
        let mut record = with_shadow(card(), 10.0);
        record.shadow_opacity = 0.0;
        assert_eq!(shadow_alpha(&record, Point::new(105.0, 50.0)), 0.0);
    }

    #[test]
    fn shading_colors() {
        let record = with_shadow(card(), 10.0);
        assert_eq!(shade_sample(&record, Point::new(50.0, 50.0)), Color::WHITE);
        assert_eq!(shade_sample(&record, Point::new(7.0, 7.0)), Color::BLUE);
        assert_eq!(shade_sample(&record, Point::new(-50.0, 50.0)), Color::TRANSPARENT);

        let shadow = shade_sample(&record, Point::new(105.0, 50.0));
        assert_eq!(shadow, Color::rgba(0.0, 0.0, 0.0, 0.5));
    }

    #[test]
    fn translucent_border_blends_over_background() {
        let mut record = card();
        record.border_color = Color::BLUE.with_alpha(0.5).to_array();
        let c = shade_sample(&record, Point::new(50.0, 2.0));
        assert_eq!(c.a, 1.0);
        assert!((c.r - 0.5).abs() < 1e-6);
        assert!((c.b - 1.0).abs() < 1e-6);
    }

    #[test]
    fn masks_to_bounds_clip() {
        let mut record = card();
        assert!(clip_contains(&record, Point::new(-10.0, -10.0)));

        record.masks_to_bounds = 1;
        assert!(!clip_contains(&record, Point::new(-10.0, -10.0)));
        assert!(!clip_contains(&record, Point::new(1.0, 1.0)));
        assert!(clip_contains(&record, Point::new(50.0, 50.0)));
    }

    #[test]
    fn pixel_coverage() {
        let mut record = LayerRecord::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        record.background_color = Color::RED.to_array();
        let config = RendererConfig::default();

        // Fully inside
        assert_eq!(shade_pixel(&record, Point::new(4.0, 4.0), &config), Color::RED);
        // Fully outside
        assert_eq!(
            shade_pixel(&record, Point::new(20.0, 4.0), &config),
            Color::TRANSPARENT
        );

        // Straddling the edge at x = 10 with the left half covered
        let edge = shade_pixel(&record, Point::new(9.5, 4.0), &config);
        assert!((edge.a - 0.5).abs() < 1e-6);
        assert_eq!(edge.r, 1.0);
    }

    #[test]
    fn pixel_coverage_follows_sample_count() {
        let mut record = LayerRecord::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        record.background_color = Color::RED.to_array();

        // Pixel center at x = 10 sits on the inclusive edge
        let single = RendererConfig {
            sample_count: 1,
            ..Default::default()
        };
        assert_eq!(shade_pixel(&record, Point::new(9.5, 4.0), &single).a, 1.0);

        let eight = RendererConfig {
            sample_count: 8,
            ..Default::default()
        };
        let edge = shade_pixel(&record, Point::new(9.5, 4.0), &eight);
        assert!((edge.a - 0.5).abs() < 1e-6);
    }

    #[test]
    fn sample_patterns() {
        for count in [1, 2, 4, 8] {
            let positions = sample_positions(count);
            assert_eq!(positions.len(), count as usize);
            assert!(positions
                .iter()
                .all(|[x, y]| x.abs() < 0.5 && y.abs() < 0.5));
        }
        assert_eq!(sample_positions(3).len(), 1);
    }

    fn quarter(v: i16) -> f32 {
        v as f32 * 0.25
    }

    #[quickcheck]
    fn shadow_alpha_is_bounded(x: i16, y: i16, radius: u8) -> bool {
        let record = with_shadow(card(), radius as f32);
        let alpha = shadow_alpha(&record, Point::new(quarter(x), quarter(y)));
        (0.0..=0.5).contains(&alpha)
    }

    #[quickcheck]
    fn only_the_shape_is_painted_by_fill_and_border(x: i16, y: i16) -> bool {
        let record = with_shadow(card(), 10.0);
        let point = Point::new(quarter(x), quarter(y));
        let inside = record.shape().contains(point);
        match classify_sample(&record, point) {
            SampleClass::Fill | SampleClass::Border => inside,
            SampleClass::Shadow | SampleClass::Background => !inside,
        }
    }
}
