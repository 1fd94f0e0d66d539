//! Renderer configuration
//!
//! Loaded from TOML; every field has a default so an empty document is a
//! valid configuration.
//!
//! ```toml
//! max_layers = 4000
//! sample_count = 4
//! corner_radius_policy = "preserve"
//! shadow_extent_factor = 2.5
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// What the record builder does with a corner radius larger than half the
/// smaller side of the bounds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerRadiusPolicy {
    /// Clamp into `[0, min(width, height) / 2]` when the record is built
    #[default]
    Clamp,
    /// Write the radius as given; the shape degenerates in the shader
    Preserve,
}

/// Renderer configuration
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Maximum number of layer records per batch
    pub max_layers: usize,
    /// MSAA sample count; each sample is shaded separately
    pub sample_count: u32,
    /// Corner radius handling when building records
    pub corner_radius_policy: CornerRadiusPolicy,
    /// How far the drawn quad extends past the layer bounds, in multiples of
    /// the shadow radius
    pub shadow_extent_factor: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            max_layers: 2_000, // 500 KB of records
            sample_count: 4,
            corner_radius_policy: CornerRadiusPolicy::Clamp,
            shadow_extent_factor: 3.0,
        }
    }
}

impl RendererConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: RendererConfig = toml::from_str(text)?;
        tracing::debug!(?config, "parsed renderer config");
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        tracing::debug!("loading renderer config from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LayerError;

    #[test]
    fn empty_document_is_default() {
        let config = RendererConfig::from_toml_str("").unwrap();
        assert_eq!(config, RendererConfig::default());
        assert_eq!(config.corner_radius_policy, CornerRadiusPolicy::Clamp);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config = RendererConfig::from_toml_str(
            r#"
            max_layers = 16
            corner_radius_policy = "preserve"
            "#,
        )
        .unwrap();
        assert_eq!(config.max_layers, 16);
        assert_eq!(config.corner_radius_policy, CornerRadiusPolicy::Preserve);
        assert_eq!(config.sample_count, 4);
        assert_eq!(config.shadow_extent_factor, 3.0);
    }

    #[test]
    fn malformed_document_is_an_error() {
        let err = RendererConfig::from_toml_str("corner_radius_policy = \"round\"").unwrap_err();
        assert!(matches!(err, LayerError::Config(_)));

        let err = RendererConfig::from_toml_str("max_layers = \"many\"").unwrap_err();
        assert!(matches!(err, LayerError::Config(_)));
    }

    #[test]
    fn serialization_round_trips() {
        let config = RendererConfig {
            max_layers: 12,
            sample_count: 1,
            corner_radius_policy: CornerRadiusPolicy::Preserve,
            shadow_extent_factor: 2.5,
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(RendererConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = RendererConfig::load("/nonexistent/lamina/renderer.toml").unwrap_err();
        assert!(matches!(err, LayerError::Io(_)));
    }
}
