// Drawing tools and brush settings.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Color;

pub const MIN_BRUSH_WIDTH: u32 = 1;
pub const MAX_BRUSH_WIDTH: u32 = 50;

/// Which tool the pointer currently drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolMode {
    #[default]
    Draw,
    Eraser,
}

impl ToolMode {
    pub fn name(&self) -> &'static str {
        match self {
            ToolMode::Draw => "Draw",
            ToolMode::Eraser => "Eraser",
        }
    }
}

/// The color and width the user picked. Survives tool switches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrushSettings {
    pub color: Color,
    pub width: u32,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 5,
        }
    }
}

/// The brush a new stroke is painted with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub color: Color,
    pub width: f32,
}

impl Brush {
    /// Resolve the effective brush for `mode`. The eraser paints
    /// `background` at twice the width.
    pub fn for_mode(mode: ToolMode, settings: &BrushSettings, background: Color) -> Self {
        let brush = match mode {
            ToolMode::Draw => Brush {
                color: settings.color,
                width: settings.width as f32,
            },
            ToolMode::Eraser => Brush {
                color: background,
                width: settings.width as f32 * 2.0,
            },
        };
        debug!(
            "{} brush: width {} color {}",
            mode.name(),
            brush.width,
            brush.color
        );
        brush
    }
}

pub fn clamp_width(width: u32) -> u32 {
    width.clamp(MIN_BRUSH_WIDTH, MAX_BRUSH_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_brush() {
        let settings = BrushSettings {
            color: Color::rgb(255, 0, 0),
            width: 7,
        };
        let brush = Brush::for_mode(ToolMode::Draw, &settings, Color::WHITE);
        assert_eq!(brush.color, Color::rgb(255, 0, 0));
        assert_eq!(brush.width, 7.0);
    }

    #[test]
    fn test_eraser_is_wider_and_background() {
        let settings = BrushSettings {
            color: Color::rgb(255, 0, 0),
            width: 7,
        };
        let brush = Brush::for_mode(ToolMode::Eraser, &settings, Color::WHITE);
        assert_eq!(brush.color, Color::WHITE);
        assert_eq!(brush.width, 14.0);

        let paper = Color::rgb(200, 0, 0);
        let brush = Brush::for_mode(ToolMode::Eraser, &settings, paper);
        assert_eq!(brush.color, paper);
    }

    #[test]
    fn test_eraser_width_does_not_overflow() {
        let settings = BrushSettings {
            color: Color::BLACK,
            width: u32::MAX,
        };
        let brush = Brush::for_mode(ToolMode::Eraser, &settings, Color::WHITE);
        assert_eq!(brush.width, u32::MAX as f32 * 2.0);
    }

    #[test]
    fn test_clamp_width() {
        assert_eq!(clamp_width(0), 1);
        assert_eq!(clamp_width(25), 25);
        assert_eq!(clamp_width(500), 50);
    }
}
