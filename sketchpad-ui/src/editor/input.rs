// Translates egui input into sketchpad input.

use egui::{Event, Key, Rect, TouchId};
use sketchpad_core::input::translate_touch;
use sketchpad_core::{PointerInput, Shortcut, TouchPhase};

use super::canvas::to_surface;

/// Undo/redo shortcuts pressed this frame, in order.
pub fn shortcuts(events: &[Event]) -> Vec<Shortcut> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Key {
                key,
                pressed: true,
                modifiers,
                ..
            } => key_char(*key)
                .and_then(|c| Shortcut::from_key(c, modifiers.command, modifiers.shift)),
            _ => None,
        })
        .collect()
}

fn key_char(key: Key) -> Option<char> {
    match key {
        Key::Z => Some('z'),
        Key::Y => Some('y'),
        _ => None,
    }
}

/// Turns raw touches into pointer input so a finger draws like a mouse.
#[derive(Debug, Default)]
pub struct TouchTranslator {
    primary: Option<TouchId>,
}

impl TouchTranslator {
    /// Touches must start inside `canvas` to draw.
    pub fn translate(&mut self, events: &[Event], canvas: Rect) -> Vec<PointerInput> {
        let mut inputs = Vec::new();
        for event in events {
            let Event::Touch { id, phase, pos, .. } = event else {
                continue;
            };

            let phase = match phase {
                egui::TouchPhase::Start => TouchPhase::Start,
                egui::TouchPhase::Move => TouchPhase::Move,
                egui::TouchPhase::End => TouchPhase::End,
                egui::TouchPhase::Cancel => TouchPhase::Cancel,
            };

            if phase == TouchPhase::Start && self.primary.is_none() && canvas.contains(*pos) {
                self.primary = Some(*id);
            }
            let index = if self.primary == Some(*id) { 0 } else { 1 };
            if index == 0 && matches!(phase, TouchPhase::End | TouchPhase::Cancel) {
                self.primary = None;
            }

            if let Some(input) = translate_touch(phase, index, to_surface(canvas.min, *pos)) {
                inputs.push(input);
            }
        }
        inputs
    }
}
