//! sketchpad-core: drawing surface, undo history and tool state for the sketchpad.
//!
//! Design rules:
//! - Snapshots are opaque to the history; only the surface knows their format.
//! - Undo/redo at the ends of the history are no-ops, never errors.
//! - Nothing here touches a window; the UI crate drives a `Session`.
//! - All state structs are serializable so snapshots and config can round-trip.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
pub mod cursor;
pub mod export;
pub mod history;
pub mod input;
pub mod layout;
pub mod raster;
pub mod session;
pub mod surface;
pub mod tools;

pub use config::{ConfigError, PadConfig};
pub use cursor::CursorPreview;
pub use history::History;
pub use input::{PointerInput, Shortcut, StrokeBuilder, TouchPhase};
pub use layout::{CanvasLayout, ResizeDebouncer};
pub use session::{HistoryButtons, Session, SessionError};
pub use surface::{Renderer, Snapshot, Stroke, Surface, SurfaceError};
pub use tools::{Brush, BrushSettings, ToolMode};

/// A point in surface coordinates (pixels from the top-left corner).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An 8-bit RGBA color. Serialized as `#rrggbb` (opaque) or `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build a color from a CSS-style alpha in `[0.0, 1.0]`.
    pub fn with_alpha(self, alpha: f32) -> Self {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { a, ..self }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| ColorError::MissingHash(s.to_string()))?;
        if !hex.is_ascii() || !matches!(hex.len(), 6 | 8) {
            return Err(ColorError::InvalidLength(s.to_string()));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| ColorError::InvalidDigit(s.to_string()))
        };

        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Color::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Errors from parsing hex colors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("color must start with '#': {0}")]
    MissingHash(String),

    #[error("color must have 6 or 8 hex digits: {0}")]
    InvalidLength(String),

    #[error("invalid hex digit in color: {0}")]
    InvalidDigit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color_picker_value() {
        assert_eq!("#000000".parse::<Color>(), Ok(Color::BLACK));
        assert_eq!("#FF8000".parse::<Color>(), Ok(Color::rgb(255, 128, 0)));
        assert_eq!(
            "#ffffffcc".parse::<Color>(),
            Ok(Color::rgba(255, 255, 255, 204))
        );
    }

    #[test]
    fn test_reject_malformed_colors() {
        assert!(matches!(
            "000000".parse::<Color>(),
            Err(ColorError::MissingHash(_))
        ));
        assert!(matches!(
            "#fff".parse::<Color>(),
            Err(ColorError::InvalidLength(_))
        ));
        assert!(matches!(
            "#gg0000".parse::<Color>(),
            Err(ColorError::InvalidDigit(_))
        ));
    }

    #[test]
    fn test_color_display() {
        assert_eq!(Color::rgb(18, 52, 86).to_string(), "#123456");
        assert_eq!(Color::WHITE.with_alpha(0.8).to_string(), "#ffffffcc");
    }
}
