//! PNG export of the drawing.
//!
//! The surface is rendered at a fixed upscale factor and written next to
//! earlier exports with a timestamped name, so repeated downloads never
//! overwrite each other.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Upscale factor applied to the display size.
    pub scale: f32,
    pub directory: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            scale: 2.0,
            directory: PathBuf::from("."),
        }
    }
}

/// `drawing-<timestamp>.png`, where the timestamp is ISO 8601 UTC with `:`
/// and `.` turned into `-` and the milliseconds dropped.
pub fn file_name(now: DateTime<Utc>) -> String {
    format!("drawing-{}.png", now.format("%Y-%m-%dT%H-%M-%S"))
}

/// Write encoded PNG bytes into `dir`, creating it when missing.
pub fn write_png(dir: impl AsRef<Path>, png: &[u8], now: DateTime<Utc>) -> anyhow::Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("create export dir: {}", dir.display()))?;

    let path = dir.join(file_name(now));
    fs::write(&path, png).with_context(|| format!("write export file: {}", path.display()))?;
    info!("Exported {} bytes to {}", png.len(), path.display());
    Ok(path)
}
