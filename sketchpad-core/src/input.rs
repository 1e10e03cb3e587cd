// Input translation: keyboard shortcuts, touch-to-pointer and stroke building.

use tracing::{debug, trace, warn};

use crate::tools::Brush;
use crate::{Point, Stroke};

/// History actions bound to the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
}

impl Shortcut {
    /// Map a key press to an action. `command` is Ctrl, or Cmd on macOS.
    pub fn from_key(key: char, command: bool, shift: bool) -> Option<Self> {
        if !command {
            return None;
        }
        match key.to_ascii_lowercase() {
            'z' if shift => Some(Shortcut::Redo),
            'z' => Some(Shortcut::Undo),
            'y' => Some(Shortcut::Redo),
            _ => None,
        }
    }
}

/// Mouse-style pointer input over the canvas, in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Down(Point),
    Move(Point),
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// Translate a touch event into pointer input. Only the first touch draws.
pub fn translate_touch(
    phase: TouchPhase,
    touch_index: usize,
    position: Point,
) -> Option<PointerInput> {
    if touch_index != 0 {
        trace!("Ignoring secondary touch {}", touch_index);
        return None;
    }
    Some(match phase {
        TouchPhase::Start => PointerInput::Down(position),
        TouchPhase::Move => PointerInput::Move(position),
        TouchPhase::End | TouchPhase::Cancel => PointerInput::Up,
    })
}

/// Collects pointer input into a stroke.
#[derive(Debug, Default)]
pub struct StrokeBuilder {
    active: Option<Stroke>,
}

impl StrokeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_drawing(&self) -> bool {
        self.active.is_some()
    }

    pub fn current(&self) -> Option<&Stroke> {
        self.active.as_ref()
    }

    /// Feed one input. Returns the stroke when it completes.
    pub fn handle(&mut self, input: PointerInput, brush: Brush) -> Option<Stroke> {
        match input {
            PointerInput::Down(point) => {
                if self.active.is_some() {
                    warn!("Pointer down while a stroke was active, restarting stroke");
                }
                let mut stroke = Stroke::new(brush.color, brush.width);
                stroke.push(point);
                debug!("Stroke started at ({}, {})", point.x, point.y);
                self.active = Some(stroke);
                None
            }
            PointerInput::Move(point) => {
                if let Some(stroke) = self.active.as_mut() {
                    if stroke.points.last() != Some(&point) {
                        trace!("Stroke point ({}, {})", point.x, point.y);
                        stroke.push(point);
                    }
                }
                None
            }
            PointerInput::Up => {
                let stroke = self.active.take();
                match &stroke {
                    Some(stroke) => {
                        debug!("Stroke completed with {} point(s)", stroke.points.len())
                    }
                    None => trace!("Pointer up without an active stroke"),
                }
                stroke
            }
        }
    }
}
