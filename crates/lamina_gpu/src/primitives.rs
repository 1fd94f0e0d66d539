//! GPU layer records
//!
//! Defines the fixed-layout record that carries one composited layer to the
//! shading stage. The structure uses `#[repr(C, align(16))]` and implements
//! `bytemuck::Pod` for direct GPU buffer copies.
//!
//! The shading stage addresses fields by byte offset, not by name, so the
//! layout below is a wire contract. Do not reorder fields.
//!
//! Memory layout:
//! - transform: `mat4x4<f32>`         (64 bytes, offset 0)
//! - contents_transform: `mat4x4<f32>` (64 bytes, offset 64)
//! - position: `vec2<f32>`            (8 bytes, offset 128)
//! - anchor_point: `vec2<f32>`        (8 bytes, offset 136)
//! - bounds: `vec4<f32>`              (16 bytes, offset 144)
//! - background_color: `vec4<f32>`    (16 bytes, offset 160)
//! - border_color: `vec4<f32>`        (16 bytes, offset 176)
//! - border_width: `f32`              (4 bytes, offset 192)
//! - corner_radius: `f32`             (4 bytes, offset 196)
//! - masks_to_bounds: `i32`           (4 bytes, offset 200)
//! - shadow_offset: `vec2<f32>`       (8 bytes, offset 204)
//! - shadow_color: `vec4<f32>`        (16 bytes, offset 212)
//! - shadow_radius: `f32`             (4 bytes, offset 228)
//! - shadow_opacity: `f32`            (4 bytes, offset 232)
//! - padding                          (20 bytes, offset 236)
//!
//! Total: 256 bytes

use lamina_core::{Color, LayerStyle, Mat4, Rect, Shape};

use crate::config::CornerRadiusPolicy;
use crate::error::{LayerError, Result};

/// Size of one layer record in bytes
pub const LAYER_RECORD_SIZE: usize = 256;

/// One composited layer as the shading stage sees it (matches the
/// `LAYER_*` offsets in the layer shader)
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LayerRecord {
    /// Maps the unit square onto the layer on screen (column-major)
    pub transform: [[f32; 4]; 4],
    /// Maps layer contents into the layer (column-major)
    pub contents_transform: [[f32; 4]; 4],
    /// Layer origin in parent space
    pub position: [f32; 2],
    /// Normalized pivot within the bounds
    pub anchor_point: [f32; 2],
    /// Bounds (x, y, width, height) in layer-local space
    pub bounds: [f32; 4],
    /// Background color (RGBA)
    pub background_color: [f32; 4],
    /// Border color (RGBA)
    pub border_color: [f32; 4],
    /// Uniform border thickness
    pub border_width: f32,
    /// Uniform corner radius
    pub corner_radius: f32,
    /// Clip contents to bounds (0 or 1)
    pub masks_to_bounds: i32,
    /// Shadow displacement (x, y)
    pub shadow_offset: [f32; 2],
    /// Shadow color (RGBA)
    pub shadow_color: [f32; 4],
    /// Shadow blur radius
    pub shadow_radius: f32,
    /// Shadow alpha multiplier
    pub shadow_opacity: f32,
    /// Reserved, always zero
    pub _padding: [u32; 5],
}

/// Alignment of one layer record in bytes
pub const LAYER_RECORD_ALIGN: usize = 16;

const _: () = assert!(std::mem::size_of::<LayerRecord>() == LAYER_RECORD_SIZE);
const _: () = assert!(std::mem::align_of::<LayerRecord>() == LAYER_RECORD_ALIGN);

/// Shape of a field's data, used to derive vertex formats
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Mat4,
    Vec2,
    Vec4,
    Float,
    Int,
    Padding,
}

impl FieldKind {
    /// Number of vertex attribute slots the field occupies
    pub fn rows(self) -> u32 {
        match self {
            FieldKind::Mat4 => 4,
            FieldKind::Padding => 0,
            _ => 1,
        }
    }

    /// Format of each vertex attribute row
    pub fn vertex_format(self) -> Option<wgpu::VertexFormat> {
        match self {
            FieldKind::Mat4 | FieldKind::Vec4 => Some(wgpu::VertexFormat::Float32x4),
            FieldKind::Vec2 => Some(wgpu::VertexFormat::Float32x2),
            FieldKind::Float => Some(wgpu::VertexFormat::Float32),
            FieldKind::Int => Some(wgpu::VertexFormat::Sint32),
            FieldKind::Padding => None,
        }
    }
}

/// One row of the record layout table
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerField {
    pub name: &'static str,
    pub offset: usize,
    pub size: usize,
    pub kind: FieldKind,
}

const fn field(name: &'static str, offset: usize, size: usize, kind: FieldKind) -> LayerField {
    LayerField {
        name,
        offset,
        size,
        kind,
    }
}

/// Byte offsets of every record field
pub mod offsets {
    pub const TRANSFORM: usize = 0;
    pub const CONTENTS_TRANSFORM: usize = 64;
    pub const POSITION: usize = 128;
    pub const ANCHOR_POINT: usize = 136;
    pub const BOUNDS: usize = 144;
    pub const BACKGROUND_COLOR: usize = 160;
    pub const BORDER_COLOR: usize = 176;
    pub const BORDER_WIDTH: usize = 192;
    pub const CORNER_RADIUS: usize = 196;
    pub const MASKS_TO_BOUNDS: usize = 200;
    pub const SHADOW_OFFSET: usize = 204;
    pub const SHADOW_COLOR: usize = 212;
    pub const SHADOW_RADIUS: usize = 228;
    pub const SHADOW_OPACITY: usize = 232;
    pub const PADDING: usize = 236;
}

/// The record layout, in memory order
pub const LAYER_FIELDS: [LayerField; 15] = [
    field("transform", offsets::TRANSFORM, 64, FieldKind::Mat4),
    field("contentsTransform", offsets::CONTENTS_TRANSFORM, 64, FieldKind::Mat4),
    field("position", offsets::POSITION, 8, FieldKind::Vec2),
    field("anchorPoint", offsets::ANCHOR_POINT, 8, FieldKind::Vec2),
    field("bounds", offsets::BOUNDS, 16, FieldKind::Vec4),
    field("backgroundColor", offsets::BACKGROUND_COLOR, 16, FieldKind::Vec4),
    field("borderColor", offsets::BORDER_COLOR, 16, FieldKind::Vec4),
    field("borderWidth", offsets::BORDER_WIDTH, 4, FieldKind::Float),
    field("cornerRadius", offsets::CORNER_RADIUS, 4, FieldKind::Float),
    field("masksToBounds", offsets::MASKS_TO_BOUNDS, 4, FieldKind::Int),
    field("shadowOffset", offsets::SHADOW_OFFSET, 8, FieldKind::Vec2),
    field("shadowColor", offsets::SHADOW_COLOR, 16, FieldKind::Vec4),
    field("shadowRadius", offsets::SHADOW_RADIUS, 4, FieldKind::Float),
    field("shadowOpacity", offsets::SHADOW_OPACITY, 4, FieldKind::Float),
    field("padding", offsets::PADDING, 20, FieldKind::Padding),
];

const fn attr(format: wgpu::VertexFormat, offset: usize, location: u32) -> wgpu::VertexAttribute {
    wgpu::VertexAttribute {
        format,
        offset: offset as wgpu::BufferAddress,
        shader_location: location,
    }
}

/// Per-instance vertex attributes, one per record field (matrices take four
/// consecutive locations, one per column)
pub const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 20] = {
    use offsets::*;
    use wgpu::VertexFormat::{Float32, Float32x2, Float32x4, Sint32};
    [
        // transform: mat4x4<f32>
        attr(Float32x4, TRANSFORM, 0),
        attr(Float32x4, TRANSFORM + 16, 1),
        attr(Float32x4, TRANSFORM + 32, 2),
        attr(Float32x4, TRANSFORM + 48, 3),
        // contents_transform: mat4x4<f32>
        attr(Float32x4, CONTENTS_TRANSFORM, 4),
        attr(Float32x4, CONTENTS_TRANSFORM + 16, 5),
        attr(Float32x4, CONTENTS_TRANSFORM + 32, 6),
        attr(Float32x4, CONTENTS_TRANSFORM + 48, 7),
        attr(Float32x2, POSITION, 8),
        attr(Float32x2, ANCHOR_POINT, 9),
        attr(Float32x4, BOUNDS, 10),
        attr(Float32x4, BACKGROUND_COLOR, 11),
        attr(Float32x4, BORDER_COLOR, 12),
        attr(Float32, BORDER_WIDTH, 13),
        attr(Float32, CORNER_RADIUS, 14),
        attr(Sint32, MASKS_TO_BOUNDS, 15),
        attr(Float32x2, SHADOW_OFFSET, 16),
        attr(Float32x4, SHADOW_COLOR, 17),
        attr(Float32, SHADOW_RADIUS, 18),
        attr(Float32, SHADOW_OPACITY, 19),
    ]
};

impl Default for LayerRecord {
    fn default() -> Self {
        Self {
            transform: Mat4::IDENTITY.cols,
            contents_transform: Mat4::IDENTITY.cols,
            position: [0.0; 2],
            anchor_point: [0.5, 0.5],
            bounds: [0.0; 4],
            background_color: [0.0; 4],
            border_color: [0.0; 4],
            border_width: 0.0,
            corner_radius: 0.0,
            masks_to_bounds: 0,
            shadow_offset: [0.0; 2],
            shadow_color: [0.0; 4],
            shadow_radius: 0.0,
            shadow_opacity: 0.0,
            _padding: [0; 5],
        }
    }
}

impl LayerRecord {
    /// Number of vertex attribute locations the instance layout uses
    pub const INSTANCE_ATTRIBUTE_COUNT: u32 = INSTANCE_ATTRIBUTES.len() as u32;

    /// Create a record covering `bounds` with every style field cleared
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds: bounds.to_array(),
            ..Default::default()
        }
    }

    /// Flatten a layer style into a record.
    ///
    /// Returns the record and the layer's local transform, which is the parent
    /// transform for its sublayers. Absent colors encode as transparent zero.
    pub fn from_style(
        style: &LayerStyle,
        parent_transform: &Mat4,
        policy: CornerRadiusPolicy,
    ) -> (Self, Mat4) {
        let local = style.local_transform(parent_transform);
        let screen = style.screen_transform(&local).to_cols_array();

        let corner_radius = match policy {
            CornerRadiusPolicy::Clamp => style.clamped_corner_radius(),
            CornerRadiusPolicy::Preserve => style.corner_radius,
        };
        let color = |c: Option<Color>| c.map_or([0.0; 4], |c| c.to_array());

        let record = Self {
            transform: screen,
            contents_transform: screen,
            position: style.position.to_array(),
            anchor_point: style.anchor_point.to_array(),
            bounds: style.bounds.to_array(),
            background_color: color(style.background_color),
            border_color: color(style.border_color),
            border_width: style.border_width,
            corner_radius,
            masks_to_bounds: style.masks_to_bounds as i32,
            shadow_offset: [style.shadow_offset.width, style.shadow_offset.height],
            shadow_color: color(style.shadow_color),
            shadow_radius: style.shadow_radius,
            shadow_opacity: style.shadow_opacity,
            _padding: [0; 5],
        };
        (record, local)
    }

    /// Decode a record from exactly [`LAYER_RECORD_SIZE`] bytes. The slice
    /// need not be aligned.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bytemuck::try_pod_read_unaligned(bytes).map_err(|_| LayerError::InvalidLength {
            expected: LAYER_RECORD_SIZE,
            actual: bytes.len(),
        })
    }

    /// The record's bytes, in the order the shading stage reads them
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    pub fn to_bytes(&self) -> [u8; LAYER_RECORD_SIZE] {
        let mut out = [0u8; LAYER_RECORD_SIZE];
        out.copy_from_slice(self.as_bytes());
        out
    }

    /// Vertex buffer layout that feeds records as per-instance attributes.
    ///
    /// Needs a device limit of at least
    /// [`LayerRecord::INSTANCE_ATTRIBUTE_COUNT`] vertex attributes; the
    /// storage-buffer path in the layer shader has no such requirement.
    pub fn instance_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: LAYER_RECORD_SIZE as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &INSTANCE_ATTRIBUTES,
        }
    }

    pub fn bounds_rect(&self) -> Rect {
        Rect::from_array(self.bounds)
    }

    /// Layer shape with the radius exactly as recorded
    pub fn shape(&self) -> Shape {
        Shape::for_layer(self.bounds_rect(), self.corner_radius)
    }

    /// Shape of the drop shadow: the layer shape moved by the shadow offset
    pub fn shadow_shape(&self) -> Shape {
        let [dx, dy] = self.shadow_offset;
        Shape::for_layer(self.bounds_rect().offset(dx, dy), self.corner_radius)
    }

    pub fn masks_to_bounds(&self) -> bool {
        self.masks_to_bounds != 0
    }

    pub fn background(&self) -> Color {
        Color::from_array(self.background_color)
    }

    pub fn border(&self) -> Color {
        Color::from_array(self.border_color)
    }

    pub fn shadow(&self) -> Color {
        Color::from_array(self.shadow_color)
    }

    pub fn has_background(&self) -> bool {
        self.background().is_visible()
    }

    pub fn has_border(&self) -> bool {
        self.border_width > 0.0 && self.border().is_visible()
    }

    pub fn has_shadow(&self) -> bool {
        self.shadow_opacity > 0.0 && self.shadow().is_visible()
    }

    /// How far outside the bounds the layer can paint, in layer units
    pub fn paint_extent(&self, shadow_extent_factor: f32) -> f32 {
        if !self.has_shadow() {
            return 0.0;
        }
        let [dx, dy] = self.shadow_offset;
        self.shadow_radius.max(0.0) * shadow_extent_factor + dx.abs().max(dy.abs())
    }
}
