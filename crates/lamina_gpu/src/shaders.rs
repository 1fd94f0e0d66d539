//! GPU shaders for layer compositing
//!
//! One WGSL module renders every layer pass:
//! - Drop shadows with linear falloff outside the layer silhouette
//! - Background fills clipped to the (rounded) layer shape
//! - Border rings, drawn after the layer's sublayers
//!
//! Records are read from a storage buffer of raw 32-bit words rather than a
//! WGSL struct: several fields sit at offsets WGSL's alignment rules cannot
//! express (`shadow_offset` at 204, `shadow_color` at 212), so the shader
//! addresses each field by the same byte offset the Rust field table uses.

use bytemuck::{Pod, Zeroable};
use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::config::RendererConfig;
use crate::error::{LayerError, Result};

/// Layer compositing shader
///
/// Bindings:
/// - `@group(0) @binding(0)`: [`LayerUniforms`]
/// - `@group(0) @binding(1)`: the batch's record bytes, read-only storage
///
/// Draw six vertices per instance, with the instance index as the record
/// slot. Fragment outputs are straight alpha.
pub const LAYER_SHADER: &str = r#"
// ============================================================================
// Lamina Layer Shader
// ============================================================================

struct Uniforms {
    viewport_size: vec2<f32>,
    shadow_extent_factor: f32,
    _padding: f32,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    // Position in the layer's bounds space
    @location(0) local_pos: vec2<f32>,
    @location(1) @interpolate(flat) slot: u32,
}

@group(0) @binding(0) var<uniform> uniforms: Uniforms;
@group(0) @binding(1) var<storage, read> layer_words: array<f32>;

// Record layout: 256 bytes per layer, byte offsets
const LAYER_WORDS: u32 = 64u;
const LAYER_TRANSFORM: u32 = 0u;
const LAYER_BOUNDS: u32 = 144u;
const LAYER_BACKGROUND_COLOR: u32 = 160u;
const LAYER_BORDER_COLOR: u32 = 176u;
const LAYER_BORDER_WIDTH: u32 = 192u;
const LAYER_CORNER_RADIUS: u32 = 196u;
const LAYER_MASKS_TO_BOUNDS: u32 = 200u;
const LAYER_SHADOW_OFFSET: u32 = 204u;
const LAYER_SHADOW_COLOR: u32 = 212u;
const LAYER_SHADOW_RADIUS: u32 = 228u;
const LAYER_SHADOW_OPACITY: u32 = 232u;

// ============================================================================
// Record access
// ============================================================================

fn word(slot: u32, offset: u32) -> f32 {
    return layer_words[slot * LAYER_WORDS + offset / 4u];
}

fn vec2_at(slot: u32, offset: u32) -> vec2<f32> {
    return vec2<f32>(word(slot, offset), word(slot, offset + 4u));
}

fn vec4_at(slot: u32, offset: u32) -> vec4<f32> {
    return vec4<f32>(
        word(slot, offset),
        word(slot, offset + 4u),
        word(slot, offset + 8u),
        word(slot, offset + 12u),
    );
}

// Column-major, one column per 16 bytes
fn mat4_at(slot: u32, offset: u32) -> mat4x4<f32> {
    return mat4x4<f32>(
        vec4_at(slot, offset),
        vec4_at(slot, offset + 16u),
        vec4_at(slot, offset + 32u),
        vec4_at(slot, offset + 48u),
    );
}

// ============================================================================
// Shape kernel
// ============================================================================
// Ports of lamina_core::shape and lamina_core::distance. Change both sides
// together; the CPU shading reference tests the Rust side.

fn folded_offset(bounds: vec4<f32>, p: vec2<f32>) -> vec2<f32> {
    let center = bounds.xy + bounds.zw * 0.5;
    return abs(p - center);
}

fn box_test(d: vec2<f32>, extent: vec2<f32>) -> f32 {
    let q = d - extent;
    return max(q.x, q.y);
}

fn rounded_box_test(d: vec2<f32>, straight: vec2<f32>) -> f32 {
    let q = max(d - straight, vec2<f32>(0.0));
    return dot(q, q);
}

fn rect_contains(bounds: vec4<f32>, p: vec2<f32>) -> bool {
    return box_test(folded_offset(bounds, p), bounds.zw * 0.5) <= 0.0;
}

fn rect_border_contains(bounds: vec4<f32>, border_width: f32, p: vec2<f32>) -> bool {
    let d = folded_offset(bounds, p);
    let extent = bounds.zw * 0.5;
    let outer = box_test(d, extent);
    let inner = box_test(d, extent - vec2<f32>(border_width));
    return outer <= 0.0 && inner > 0.0;
}

fn rounded_rect_contains(bounds: vec4<f32>, r: f32, p: vec2<f32>) -> bool {
    let d = folded_offset(bounds, p);
    let extent = bounds.zw * 0.5;
    return rounded_box_test(d, extent - vec2<f32>(r)) <= r * r;
}

fn rounded_rect_border_contains(bounds: vec4<f32>, r: f32, border_width: f32, p: vec2<f32>) -> bool {
    let d = folded_offset(bounds, p);
    let extent = bounds.zw * 0.5;
    let outer = rounded_box_test(d, extent - vec2<f32>(r));

    let inner_r = max(r - border_width, 0.0);
    let inner_extent = (bounds.zw - vec2<f32>(2.0 * border_width)) * 0.5 - vec2<f32>(inner_r);
    let inner = rounded_box_test(d, inner_extent);

    return outer <= r * r && inner > inner_r * inner_r;
}

fn distance_to_rounded_rect(p: vec2<f32>, bounds: vec4<f32>, r: f32, inset: f32) -> f32 {
    let shrink = r + inset;
    let lo = bounds.xy + vec2<f32>(shrink);
    let hi = bounds.xy + bounds.zw - vec2<f32>(shrink);
    let closest = min(max(p, lo), hi);
    return distance(p, closest);
}

// ============================================================================
// Per-layer tests
// ============================================================================

fn layer_contains(slot: u32, p: vec2<f32>) -> bool {
    let bounds = vec4_at(slot, LAYER_BOUNDS);
    let r = word(slot, LAYER_CORNER_RADIUS);
    if r > 0.0 {
        return rounded_rect_contains(bounds, r, p);
    }
    return rect_contains(bounds, p);
}

fn layer_border_contains(slot: u32, p: vec2<f32>) -> bool {
    let bounds = vec4_at(slot, LAYER_BOUNDS);
    let r = word(slot, LAYER_CORNER_RADIUS);
    let border_width = word(slot, LAYER_BORDER_WIDTH);
    if border_width <= 0.0 {
        return false;
    }
    if r > 0.0 {
        return rounded_rect_border_contains(bounds, r, border_width, p);
    }
    return rect_border_contains(bounds, border_width, p);
}

// Whether sublayer content at `p` survives this layer's masksToBounds clip
fn layer_clip_contains(slot: u32, p: vec2<f32>) -> bool {
    let masks = bitcast<i32>(word(slot, LAYER_MASKS_TO_BOUNDS));
    return masks == 0 || layer_contains(slot, p);
}

fn has_shadow(slot: u32) -> bool {
    let color = vec4_at(slot, LAYER_SHADOW_COLOR);
    return word(slot, LAYER_SHADOW_OPACITY) > 0.0 && color.a != 0.0;
}

fn shadow_alpha(slot: u32, p: vec2<f32>) -> f32 {
    if !has_shadow(slot) {
        return 0.0;
    }
    let bounds = vec4_at(slot, LAYER_BOUNDS);
    let offset = vec2_at(slot, LAYER_SHADOW_OFFSET);
    let shadow_bounds = vec4<f32>(bounds.xy + offset, bounds.zw);
    let r = word(slot, LAYER_CORNER_RADIUS);
    let radius = word(slot, LAYER_SHADOW_RADIUS);
    let strength = vec4_at(slot, LAYER_SHADOW_COLOR).a * word(slot, LAYER_SHADOW_OPACITY);

    if radius > 0.0 {
        let rr = max(r, 0.0);
        let d = max(distance_to_rounded_rect(p, shadow_bounds, rr, 0.0) - rr, 0.0);
        return strength * (1.0 - min(d / radius, 1.0));
    }

    var inside = rect_contains(shadow_bounds, p);
    if r > 0.0 {
        inside = rounded_rect_contains(shadow_bounds, r, p);
    }
    return select(0.0, strength, inside);
}

// How far outside its bounds a layer paints
fn paint_extent(slot: u32) -> f32 {
    if !has_shadow(slot) {
        return 0.0;
    }
    let offset = abs(vec2_at(slot, LAYER_SHADOW_OFFSET));
    let radius = max(word(slot, LAYER_SHADOW_RADIUS), 0.0);
    return radius * uniforms.shadow_extent_factor + max(offset.x, offset.y);
}

// ============================================================================
// Entry points
// ============================================================================

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @builtin(instance_index) slot: u32,
) -> VertexOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(0.0, 0.0),
        vec2<f32>(1.0, 0.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(0.0, 0.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(0.0, 1.0),
    );
    let corner = corners[vertex_index];

    let bounds = vec4_at(slot, LAYER_BOUNDS);
    let extent = paint_extent(slot);
    let local_pos = bounds.xy - vec2<f32>(extent) + corner * (bounds.zw + vec2<f32>(2.0 * extent));

    // The record transform maps the unit square onto the layer
    let size = max(bounds.zw, vec2<f32>(1e-6));
    let unit = (local_pos - bounds.xy) / size;
    let screen = mat4_at(slot, LAYER_TRANSFORM) * vec4<f32>(unit, 0.0, 1.0);

    let ndc = vec2<f32>(
        screen.x / uniforms.viewport_size.x * 2.0 - screen.w,
        screen.w - screen.y / uniforms.viewport_size.y * 2.0,
    );

    var out: VertexOutput;
    out.position = vec4<f32>(ndc, screen.z, screen.w);
    out.local_pos = local_pos;
    out.slot = slot;
    return out;
}

@fragment
fn fs_shadow(in: VertexOutput) -> @location(0) vec4<f32> {
    // Shadow only shows where the layer itself is not filled
    if layer_contains(in.slot, in.local_pos) {
        discard;
    }
    let alpha = shadow_alpha(in.slot, in.local_pos);
    if alpha <= 0.0 {
        discard;
    }
    return vec4<f32>(vec4_at(in.slot, LAYER_SHADOW_COLOR).rgb, alpha);
}

@fragment
fn fs_background(in: VertexOutput) -> @location(0) vec4<f32> {
    if !layer_contains(in.slot, in.local_pos) {
        discard;
    }
    return vec4_at(in.slot, LAYER_BACKGROUND_COLOR);
}

@fragment
fn fs_border(in: VertexOutput) -> @location(0) vec4<f32> {
    if !layer_border_contains(in.slot, in.local_pos) {
        discard;
    }
    return vec4_at(in.slot, LAYER_BORDER_COLOR);
}

// Coverage of the masksToBounds clip, for a stencil or mask target
@fragment
fn fs_clip_mask(in: VertexOutput) -> @location(0) vec4<f32> {
    if !layer_clip_contains(in.slot, in.local_pos) {
        discard;
    }
    return vec4<f32>(1.0);
}
"#;

/// Vertex entry point
pub const VS_MAIN: &str = "vs_main";
/// Fragment entry point of the shadow pass
pub const FS_SHADOW: &str = "fs_shadow";
/// Fragment entry point of the background pass
pub const FS_BACKGROUND: &str = "fs_background";
/// Fragment entry point of the border pass
pub const FS_BORDER: &str = "fs_border";
/// Fragment entry point writing the `masks_to_bounds` clip into a stencil or
/// mask target
pub const FS_CLIP_MASK: &str = "fs_clip_mask";

/// Vertices drawn per layer instance
pub const VERTICES_PER_LAYER: u32 = 6;

/// Uniforms for [`LAYER_SHADER`]
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LayerUniforms {
    /// Viewport size in device pixels
    pub viewport_size: [f32; 2],
    pub shadow_extent_factor: f32,
    pub _padding: f32,
}

impl LayerUniforms {
    pub fn new(width: f32, height: f32, config: &RendererConfig) -> Self {
        Self {
            viewport_size: [width, height],
            shadow_extent_factor: config.shadow_extent_factor,
            _padding: 0.0,
        }
    }
}

/// Descriptor for creating the layer shader module on a device
pub fn layer_shader_descriptor() -> wgpu::ShaderModuleDescriptor<'static> {
    wgpu::ShaderModuleDescriptor {
        label: Some("Lamina Layer Shader"),
        source: wgpu::ShaderSource::Wgsl(LAYER_SHADER.into()),
    }
}

/// Parse and validate [`LAYER_SHADER`] without a device
pub fn parse_layer_shader() -> Result<naga::Module> {
    let module = naga::front::wgsl::parse_str(LAYER_SHADER)
        .map_err(|e| LayerError::Shader(e.emit_to_string(LAYER_SHADER)))?;

    Validator::new(ValidationFlags::all(), Capabilities::default())
        .validate(&module)
        .map_err(|e| LayerError::Shader(e.to_string()))?;

    tracing::debug!(
        entry_points = module.entry_points.len(),
        functions = module.functions.len(),
        "layer shader validated"
    );
    Ok(module)
}
