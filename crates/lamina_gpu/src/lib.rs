//! Lamina GPU Layer Records
//!
//! Host and GPU sides of the per-layer shading contract.
//!
//! # Features
//!
//! - **Layer records**: the fixed 256-byte per-layer descriptor and its field table
//! - **Batches**: contiguous record slots plus ordered shadow/background/border passes
//! - **Shading stage**: WGSL layer shader, validated with naga, and a CPU reference
//! - **Configuration**: TOML-loadable renderer settings

pub mod batch;
pub mod config;
pub mod error;
pub mod primitives;
pub mod shaders;
pub mod shading;

pub use batch::{LayerBatch, RenderOp};
pub use config::{CornerRadiusPolicy, RendererConfig};
pub use error::{LayerError, Result};
pub use primitives::{
    offsets, FieldKind, LayerField, LayerRecord, INSTANCE_ATTRIBUTES, LAYER_FIELDS,
    LAYER_RECORD_SIZE,
};
pub use shaders::{parse_layer_shader, LayerUniforms, LAYER_SHADER};
pub use shading::{classify_sample, clip_contains, shade_pixel, shade_sample, shadow_alpha, SampleClass};
