// Custom cursor preview: a ring sized like the brush that follows the pointer.

use crate::tools::{BrushSettings, ToolMode};
use crate::Color;

const DRAWING_OPACITY: f32 = 0.3;

/// How the preview ring should look for the current tool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorPreview {
    /// Diameter in surface pixels.
    pub size: f32,
    pub fill: Color,
    pub border: Color,
    pub border_width: f32,
    pub opacity: f32,
    pub visible: bool,
}

impl CursorPreview {
    pub fn new(mode: ToolMode, settings: &BrushSettings) -> Self {
        let mut preview = Self {
            size: 0.0,
            fill: Color::TRANSPARENT,
            border: Color::BLACK.with_alpha(0.5),
            border_width: 2.0,
            opacity: 1.0,
            visible: false,
        };
        preview.update(mode, settings);
        preview
    }

    pub fn update(&mut self, mode: ToolMode, settings: &BrushSettings) {
        match mode {
            ToolMode::Eraser => {
                self.size = settings.width as f32 * 2.0;
                self.fill = Color::WHITE.with_alpha(0.8);
                self.border = Color::BLACK.with_alpha(0.3);
                self.border_width = 2.0;
            }
            ToolMode::Draw => {
                self.size = settings.width as f32;
                self.fill = Color::TRANSPARENT;
                self.border = settings.color;
                self.border_width = (self.size / 10.0).max(2.0);
            }
        }
    }

    pub fn set_hovering(&mut self, hovering: bool) {
        self.visible = hovering;
    }

    pub fn set_drawing(&mut self, drawing: bool) {
        self.opacity = if drawing { DRAWING_OPACITY } else { 1.0 };
    }
}
