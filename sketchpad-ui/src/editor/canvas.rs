// On-screen canvas for the sketchpad.
// Wraps the core surface and paints it with egui.

use egui::{Color32, Pos2, Rect, Shape, Stroke as EguiStroke};
use futures::channel::oneshot;
use sketchpad_core::{Color, Point, Renderer, Snapshot, Stroke, Surface, SurfaceError};
use tracing::{debug, trace};

/// Renderer backed by an egui painter.
///
/// A loaded snapshot counts as complete only once it has been painted, so
/// the completion signal is held until `frame_painted`.
#[derive(Debug)]
pub struct CanvasView {
    surface: Surface,
    pending_load: Option<oneshot::Sender<()>>,
}

impl CanvasView {
    pub fn new(surface: Surface) -> Self {
        debug!(
            "Creating canvas view of size {}x{}",
            surface.width(),
            surface.height()
        );
        Self {
            surface,
            pending_load: None,
        }
    }

    /// Paint the surface, plus any stroke still being drawn, into `rect`.
    pub fn paint(&self, painter: &egui::Painter, rect: Rect, in_progress: Option<&Stroke>) {
        painter.rect_filled(rect, 0.0, to_color32(self.surface.background()));
        for stroke in self.surface.strokes() {
            paint_stroke(painter, rect.min, stroke);
        }
        if let Some(stroke) = in_progress {
            paint_stroke(painter, rect.min, stroke);
        }
    }

    /// Signal that the last loaded snapshot is on screen.
    pub fn frame_painted(&mut self) {
        if let Some(done) = self.pending_load.take() {
            trace!("Loaded snapshot painted");
            if done.send(()).is_err() {
                trace!("Load completion had no listener");
            }
        }
    }
}

impl Renderer for CanvasView {
    fn serialize(&self) -> Result<Snapshot, SurfaceError> {
        self.surface.serialize()
    }

    fn load(
        &mut self,
        snapshot: &Snapshot,
        done: oneshot::Sender<()>,
    ) -> Result<(), SurfaceError> {
        self.surface.restore(snapshot)?;
        // A newer load supersedes one that was never painted.
        self.pending_load = Some(done);
        Ok(())
    }

    fn clear(&mut self) {
        self.surface.clear();
    }

    fn background(&self) -> Color {
        self.surface.background()
    }

    fn add_stroke(&mut self, stroke: Stroke) {
        self.surface.add_stroke(stroke);
    }

    fn set_dimensions(&mut self, width: u32, height: u32) {
        self.surface.set_dimensions(width, height);
    }

    fn dimensions(&self) -> (u32, u32) {
        self.surface.dimensions()
    }

    fn export_png(&self, scale: f32) -> Result<Vec<u8>, SurfaceError> {
        self.surface.export_png(scale)
    }
}

pub fn to_color32(color: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

pub fn from_color32(color: Color32) -> Color {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    Color::rgba(r, g, b, a)
}

pub fn to_screen(origin: Pos2, point: Point) -> Pos2 {
    Pos2::new(origin.x + point.x, origin.y + point.y)
}

pub fn to_surface(origin: Pos2, pos: Pos2) -> Point {
    Point::new(pos.x - origin.x, pos.y - origin.y)
}

fn paint_stroke(painter: &egui::Painter, origin: Pos2, stroke: &Stroke) {
    let color = to_color32(stroke.color);
    let radius = stroke.width / 2.0;
    let points: Vec<Pos2> = stroke
        .points
        .iter()
        .map(|p| to_screen(origin, *p))
        .collect();

    match points.as_slice() {
        [] => {}
        [only] => {
            painter.circle_filled(*only, radius, color);
        }
        [first, .., last] => {
            // Round caps; egui lines end square.
            painter.circle_filled(*first, radius, color);
            painter.circle_filled(*last, radius, color);
            painter.add(Shape::line(points.clone(), EguiStroke::new(stroke.width, color)));
        }
    }
}
