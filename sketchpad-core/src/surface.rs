// The drawable surface: background plus committed strokes.
// Snapshots capture the drawable state only; display dimensions are not part of them.

use futures::channel::oneshot;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::raster::{self, MAX_EXPORT_SCALE};
use crate::{Color, Point};

/// Opaque serialized capture of the whole drawable state at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(String);

impl Snapshot {
    pub fn new(data: impl Into<String>) -> Self {
        Self(data.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One completed freehand path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub points: Vec<Point>,
    pub color: Color,
    pub width: f32,
}

impl Stroke {
    pub fn new(color: Color, width: f32) -> Self {
        Self {
            points: Vec::new(),
            color,
            width,
        }
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }
}

/// The part of the surface that snapshots capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SurfaceState {
    background: Color,
    #[serde(default)]
    strokes: Vec<Stroke>,
}

/// What the session needs from whatever renders the drawing.
pub trait Renderer {
    fn serialize(&self) -> Result<Snapshot, SurfaceError>;

    /// Replace the drawable state with `snapshot`. `done` fires once the
    /// replacement is visible; it is dropped unsent if loading fails.
    fn load(&mut self, snapshot: &Snapshot, done: oneshot::Sender<()>)
        -> Result<(), SurfaceError>;

    /// Reset to the configured background with no strokes.
    fn clear(&mut self);

    /// Background color currently displayed. The eraser paints with it.
    fn background(&self) -> Color;

    fn add_stroke(&mut self, stroke: Stroke);

    fn set_dimensions(&mut self, width: u32, height: u32);

    fn dimensions(&self) -> (u32, u32);

    /// Rasterize at `scale` times the display size and encode as PNG.
    fn export_png(&self, scale: f32) -> Result<Vec<u8>, SurfaceError>;
}

/// In-memory surface. Loading completes immediately.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    width: u32,
    height: u32,
    background: Color,
    base_background: Color,
    strokes: Vec<Stroke>,
}

impl Surface {
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        info!(
            "Creating new surface of size {}x{} with background {}",
            width, height, background
        );
        Self {
            width: width.max(1),
            height: height.max(1),
            background,
            base_background: background,
            strokes: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Decode a snapshot and replace the drawable state.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), SurfaceError> {
        let state: SurfaceState = serde_json::from_str(snapshot.as_str())?;
        debug!(
            "Restoring surface with {} stroke(s) over {}",
            state.strokes.len(),
            state.background
        );
        self.background = state.background;
        self.strokes = state.strokes;
        Ok(())
    }
}

impl Default for Surface {
    fn default() -> Self {
        Surface::new(800, 600, Color::WHITE)
    }
}

impl Renderer for Surface {
    fn serialize(&self) -> Result<Snapshot, SurfaceError> {
        let state = SurfaceState {
            background: self.background,
            strokes: self.strokes.clone(),
        };
        let json = serde_json::to_string(&state).map_err(SurfaceError::Encode)?;
        trace!("Serialized surface into {} bytes", json.len());
        Ok(Snapshot(json))
    }

    fn load(
        &mut self,
        snapshot: &Snapshot,
        done: oneshot::Sender<()>,
    ) -> Result<(), SurfaceError> {
        self.restore(snapshot)?;
        if done.send(()).is_err() {
            trace!("Load completion had no listener");
        }
        Ok(())
    }

    fn clear(&mut self) {
        info!("Clearing surface");
        self.strokes.clear();
        self.background = self.base_background;
    }

    fn background(&self) -> Color {
        self.background
    }

    fn add_stroke(&mut self, stroke: Stroke) {
        if stroke.points.is_empty() {
            warn!("Ignoring stroke without points");
            return;
        }
        debug!(
            "Adding stroke with {} point(s), width {} and color {}",
            stroke.points.len(),
            stroke.width,
            stroke.color
        );
        self.strokes.push(stroke);
    }

    fn set_dimensions(&mut self, width: u32, height: u32) {
        debug!(
            "Resizing surface from {}x{} to {}x{}",
            self.width, self.height, width, height
        );
        self.width = width.max(1);
        self.height = height.max(1);
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn export_png(&self, scale: f32) -> Result<Vec<u8>, SurfaceError> {
        if !(scale.is_finite() && scale > 0.0 && scale <= MAX_EXPORT_SCALE) {
            return Err(SurfaceError::InvalidScale(scale));
        }
        let image = raster::rasterize(self, scale);
        raster::encode_png(&image)
    }
}

/// Surface-level errors.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("snapshot could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("surface could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("export scale must be in (0, {max}], got {0}", max = MAX_EXPORT_SCALE)]
    InvalidScale(f32),

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}
