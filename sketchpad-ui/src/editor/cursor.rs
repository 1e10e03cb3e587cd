// Paints the brush-sized cursor ring.

use egui::{Pos2, Stroke};
use sketchpad_core::CursorPreview;

use super::canvas::to_color32;

pub fn paint_cursor(painter: &egui::Painter, pos: Pos2, preview: &CursorPreview) {
    if !preview.visible {
        return;
    }

    let radius = preview.size / 2.0;
    let fill = to_color32(preview.fill).gamma_multiply(preview.opacity);
    let border = to_color32(preview.border).gamma_multiply(preview.opacity);

    painter.circle_filled(pos, radius, fill);
    painter.circle_stroke(pos, radius, Stroke::new(preview.border_width, border));
}
