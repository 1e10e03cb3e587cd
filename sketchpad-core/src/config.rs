//! Sketchpad configuration.
//!
//! Loaded from a JSON file. Every field has a default, so an empty object
//! (or no file at all) gives the stock 800x600 pad with a black 5px brush.
//! Unknown fields are rejected to catch typos.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::export::ExportConfig;
use crate::history::DEFAULT_MAX_STATES;
use crate::layout::LayoutConfig;
use crate::raster::MAX_EXPORT_SCALE;
use crate::tools::{BrushSettings, MAX_BRUSH_WIDTH, MIN_BRUSH_WIDTH};
use crate::Color;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub background: Color,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background: Color::WHITE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PadConfig {
    pub canvas: CanvasConfig,
    pub brush: BrushSettings,
    pub history_capacity: usize,
    pub layout: LayoutConfig,
    pub export: ExportConfig,
    /// Draw a brush-sized ring instead of the system cursor.
    pub cursor_preview: bool,
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            brush: BrushSettings::default(),
            history_capacity: DEFAULT_MAX_STATES,
            layout: LayoutConfig::default(),
            export: ExportConfig::default(),
            cursor_preview: true,
        }
    }
}

impl PadConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            tracing::error!(
                width = self.canvas.width,
                height = self.canvas.height,
                "canvas dimensions must be non-zero"
            );
            return Err(ConfigError::InvalidCanvas {
                width: self.canvas.width,
                height: self.canvas.height,
            });
        }

        if !(MIN_BRUSH_WIDTH..=MAX_BRUSH_WIDTH).contains(&self.brush.width) {
            tracing::error!(width = self.brush.width, "brush width out of range");
            return Err(ConfigError::InvalidBrushWidth {
                width: self.brush.width,
            });
        }

        if self.history_capacity == 0 {
            tracing::error!("history capacity cannot be zero");
            return Err(ConfigError::InvalidHistoryCapacity);
        }

        if let Some(ratio) = self.layout.aspect_ratio {
            if !(ratio.is_finite() && ratio > 0.0) {
                tracing::error!(ratio, "aspect ratio must be positive");
                return Err(ConfigError::InvalidLayout {
                    reason: format!("aspect_ratio {} must be positive", ratio),
                });
            }
        }

        let max_width = self.layout.max_width;
        if max_width.is_nan() || max_width < 1.0 || self.layout.border < 0.0 {
            tracing::error!(
                max_width = self.layout.max_width,
                border = self.layout.border,
                "invalid layout bounds"
            );
            return Err(ConfigError::InvalidLayout {
                reason: format!(
                    "max_width {} must be >= 1 and border {} >= 0",
                    self.layout.max_width, self.layout.border
                ),
            });
        }

        let scale = self.export.scale;
        if !(scale.is_finite() && scale > 0.0 && scale <= MAX_EXPORT_SCALE) {
            tracing::error!(scale, max = MAX_EXPORT_SCALE, "export scale out of range");
            return Err(ConfigError::InvalidExportScale { scale });
        }

        if scale > 4.0 {
            tracing::warn!(scale, "large export scale (recommended: 1-4)");
        }

        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("canvas dimensions must be non-zero: {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },

    #[error("brush width {width} must be between 1 and 50")]
    InvalidBrushWidth { width: u32 },

    #[error("history capacity must be at least 1")]
    InvalidHistoryCapacity,

    #[error("invalid layout: {reason}")]
    InvalidLayout { reason: String },

    #[error("export scale must be in (0, {max}], got {scale}", max = MAX_EXPORT_SCALE)]
    InvalidExportScale { scale: f32 },
}

/// Load and validate a config file.
pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<PadConfig> {
    let path = path.as_ref();
    let data =
        fs::read_to_string(path).with_context(|| format!("read config file: {}", path.display()))?;
    let config: PadConfig = serde_json::from_str(&data).context("parse config json")?;
    config.validate().context("validate config")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = PadConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.history_capacity, 50);
        assert_eq!(config.export.scale, 2.0);
        assert_eq!(config.brush.width, 5);
        assert_eq!(config.brush.color, Color::BLACK);
    }

    #[test]
    fn test_empty_object_is_default() {
        let config: PadConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, PadConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let json = r##"{"brush": {"color": "#ff0000"}, "layout": {"aspect_ratio": null}}"##;
        let config: PadConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.brush.color, Color::rgb(255, 0, 0));
        assert_eq!(config.brush.width, 5);
        assert_eq!(config.layout.aspect_ratio, None);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(serde_json::from_str::<PadConfig>(r#"{"histroy_capacity": 3}"#).is_err());
    }

    #[test]
    fn test_invalid_values() {
        let mut config = PadConfig::default();
        config.history_capacity = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidHistoryCapacity)
        ));

        let mut config = PadConfig::default();
        config.brush.width = 51;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBrushWidth { width: 51 })
        ));

        let mut config = PadConfig::default();
        config.export.scale = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidExportScale { .. })
        ));

        let mut config = PadConfig::default();
        config.export.scale = 1e9;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidExportScale { .. })
        ));

        config.export.scale = MAX_EXPORT_SCALE;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_config_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("sketchpad.json");
        fs::write(&path, r#"{"history_capacity": 10, "cursor_preview": false}"#).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.history_capacity, 10);
        assert!(!config.cursor_preview);

        fs::write(&path, r#"{"history_capacity": 0}"#).unwrap();
        assert!(load_config(&path).is_err());
    }
}
