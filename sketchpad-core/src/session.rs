//! Drawing session for the sketchpad.
//!
//! A session is the unit of work for one open pad. It owns:
//! - the renderer holding the drawing
//! - the undo/redo history of snapshots
//! - tool mode and brush settings
//! - the optional cursor preview
//! - the undo/redo button state shown by the UI
//!
//! Restoring a snapshot completes asynchronously: the renderer signals a
//! one-shot channel once the drawing is visible, and the button state only
//! refreshes after `poll_restore` observes that signal.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use futures::channel::oneshot;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::PadConfig;
use crate::cursor::CursorPreview;
use crate::export::{self, ExportConfig};
use crate::history::History;
use crate::input::{PointerInput, StrokeBuilder};
use crate::layout::{CanvasLayout, LayoutConfig};
use crate::surface::{Renderer, Snapshot, Stroke, SurfaceError};
use crate::tools::{self, Brush, BrushSettings, ToolMode};
use crate::Color;

const DISABLED_OPACITY: f32 = 0.5;

/// Enabled state of the undo and redo buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryButtons {
    pub undo_enabled: bool,
    pub redo_enabled: bool,
}

impl HistoryButtons {
    pub fn undo_opacity(&self) -> f32 {
        if self.undo_enabled {
            1.0
        } else {
            DISABLED_OPACITY
        }
    }

    pub fn redo_opacity(&self) -> f32 {
        if self.redo_enabled {
            1.0
        } else {
            DISABLED_OPACITY
        }
    }
}

pub struct Session<R: Renderer> {
    renderer: R,
    history: History,
    mode: ToolMode,
    brush: BrushSettings,
    strokes: StrokeBuilder,
    cursor: Option<CursorPreview>,
    buttons: HistoryButtons,
    pending_restore: Option<oneshot::Receiver<()>>,
    layout: LayoutConfig,
    export: ExportConfig,
}

impl<R: Renderer> Session<R> {
    /// Start a session and record the blank surface as the first state.
    pub fn new(renderer: R, config: &PadConfig) -> Result<Self, SessionError> {
        let brush = BrushSettings {
            color: config.brush.color,
            width: tools::clamp_width(config.brush.width),
        };
        let mode = ToolMode::default();
        let cursor = config
            .cursor_preview
            .then(|| CursorPreview::new(mode, &brush));

        let mut session = Self {
            renderer,
            history: History::new(config.history_capacity),
            mode,
            brush,
            strokes: StrokeBuilder::new(),
            cursor,
            buttons: HistoryButtons::default(),
            pending_restore: None,
            layout: config.layout,
            export: config.export.clone(),
        };
        session.save_state()?;
        info!(
            "Started drawing session with history capacity {}",
            session.history.capacity()
        );
        Ok(session)
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn brush_settings(&self) -> BrushSettings {
        self.brush
    }

    /// The brush the next stroke will use.
    pub fn active_brush(&self) -> Brush {
        Brush::for_mode(self.mode, &self.brush, self.renderer.background())
    }

    pub fn cursor(&self) -> Option<&CursorPreview> {
        self.cursor.as_ref()
    }

    pub fn buttons(&self) -> HistoryButtons {
        self.buttons
    }

    pub fn is_drawing(&self) -> bool {
        self.strokes.is_drawing()
    }

    /// The stroke being drawn, for live preview.
    pub fn stroke_in_progress(&self) -> Option<&Stroke> {
        self.strokes.current()
    }

    pub fn is_restoring(&self) -> bool {
        self.pending_restore.is_some()
    }

    /// Feed pointer input. Completed strokes are committed and recorded.
    pub fn pointer(&mut self, input: PointerInput) -> Result<(), SessionError> {
        let brush = self.active_brush();
        let completed = self.strokes.handle(input, brush);

        if let Some(cursor) = self.cursor.as_mut() {
            cursor.set_drawing(self.strokes.is_drawing());
        }

        if let Some(stroke) = completed {
            self.renderer.add_stroke(stroke);
            self.save_state()?;
        }
        Ok(())
    }

    /// Show or hide the cursor preview as the pointer enters or leaves the canvas.
    pub fn set_hovering(&mut self, hovering: bool) {
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.set_hovering(hovering);
        }
    }

    /// Step back one state. The cursor only moves once the renderer accepted the snapshot.
    pub fn undo(&mut self) -> Result<bool, SessionError> {
        let Some(snapshot) = self.history.peek_undo() else {
            return Ok(false);
        };
        let (done, pending) = oneshot::channel();
        if let Err(err) = self.renderer.load(snapshot, done) {
            warn!("Undo failed, staying on state {:?}: {}", self.history.cursor(), err);
            return Err(err.into());
        }
        self.history.undo();
        self.pending_restore = Some(pending);
        Ok(true)
    }

    /// Step forward one state. The cursor only moves once the renderer accepted the snapshot.
    pub fn redo(&mut self) -> Result<bool, SessionError> {
        let Some(snapshot) = self.history.peek_redo() else {
            return Ok(false);
        };
        let (done, pending) = oneshot::channel();
        if let Err(err) = self.renderer.load(snapshot, done) {
            warn!("Redo failed, staying on state {:?}: {}", self.history.cursor(), err);
            return Err(err.into());
        }
        self.history.redo();
        self.pending_restore = Some(pending);
        Ok(true)
    }

    /// Check whether a snapshot restore finished. Refreshes the buttons when it has.
    pub fn poll_restore(&mut self) -> bool {
        let Some(pending) = self.pending_restore.as_mut() else {
            return false;
        };
        match pending.try_recv() {
            Ok(Some(())) => {
                debug!("Snapshot restore completed");
            }
            Ok(None) => return false,
            Err(oneshot::Canceled) => {
                warn!("Snapshot restore was abandoned by the renderer");
            }
        }
        self.pending_restore = None;
        self.refresh_buttons();
        true
    }

    /// Clear the drawing. Does nothing unless the user confirmed.
    pub fn clear(&mut self, confirmed: bool) -> Result<bool, SessionError> {
        if !confirmed {
            debug!("Clear cancelled");
            return Ok(false);
        }
        self.renderer.clear();
        self.save_state()?;
        Ok(true)
    }

    pub fn set_mode(&mut self, mode: ToolMode) {
        info!("Switching to {} tool", mode.name());
        self.mode = mode;
        self.refresh_cursor();
    }

    pub fn set_color(&mut self, color: Color) {
        debug!("Brush color set to {}", color);
        self.brush.color = color;
        self.refresh_cursor();
    }

    pub fn set_width(&mut self, width: u32) {
        let clamped = tools::clamp_width(width);
        if clamped != width {
            warn!("Brush width {} clamped to {}", width, clamped);
        }
        self.brush.width = clamped;
        self.refresh_cursor();
    }

    /// Fit the renderer to a container of the given size.
    pub fn resize(&mut self, container_width: f32, container_height: f32) -> CanvasLayout {
        let layout = CanvasLayout::fit(&self.layout, container_width, container_height);
        if self.renderer.dimensions() != (layout.width, layout.height) {
            self.renderer.set_dimensions(layout.width, layout.height);
        }
        layout
    }

    /// Render the drawing as PNG at the export scale.
    pub fn export_png(&self) -> Result<Vec<u8>, SessionError> {
        Ok(self.renderer.export_png(self.export.scale)?)
    }

    /// Export into the configured directory as `drawing-<timestamp>.png`.
    pub fn export(&self, now: DateTime<Utc>) -> anyhow::Result<PathBuf> {
        let png = self.export_png()?;
        export::write_png(&self.export.directory, &png, now)
    }

    fn save_state(&mut self) -> Result<(), SessionError> {
        let snapshot: Snapshot = self.renderer.serialize()?;
        self.history.record(snapshot);
        self.refresh_buttons();
        Ok(())
    }

    fn refresh_buttons(&mut self) {
        self.buttons = HistoryButtons {
            undo_enabled: self.history.can_undo(),
            redo_enabled: self.history.can_redo(),
        };
        debug!(
            "History buttons: undo={} redo={}",
            self.buttons.undo_enabled, self.buttons.redo_enabled
        );
    }

    fn refresh_cursor(&mut self) {
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.update(self.mode, &self.brush);
        }
    }
}

/// Session-level errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Point, Surface};

    fn session() -> Session<Surface> {
        Session::new(Surface::default(), &PadConfig::default()).unwrap()
    }

    fn draw(session: &mut Session<Surface>, from: (f32, f32), to: (f32, f32)) {
        session
            .pointer(PointerInput::Down(Point::new(from.0, from.1)))
            .unwrap();
        session
            .pointer(PointerInput::Move(Point::new(to.0, to.1)))
            .unwrap();
        session.pointer(PointerInput::Up).unwrap();
    }

    #[test]
    fn test_new_session_seeds_history() {
        let session = session();
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history().cursor(), Some(0));
        assert_eq!(session.buttons(), HistoryButtons::default());
        assert_eq!(session.buttons().undo_opacity(), 0.5);
    }

    #[test]
    fn test_stroke_records_state() {
        let mut session = session();
        draw(&mut session, (1.0, 1.0), (5.0, 5.0));

        assert_eq!(session.renderer().strokes().len(), 1);
        assert_eq!(session.history().len(), 2);
        assert!(session.buttons().undo_enabled);
        assert!(!session.buttons().redo_enabled);
    }

    #[test]
    fn test_buttons_refresh_after_restore() {
        let mut session = session();
        draw(&mut session, (1.0, 1.0), (5.0, 5.0));

        assert!(session.undo().unwrap());
        assert!(session.is_restoring());
        // Not refreshed until the restore is observed.
        assert!(session.buttons().undo_enabled);

        assert!(session.poll_restore());
        assert!(!session.buttons().undo_enabled);
        assert!(session.buttons().redo_enabled);
        assert!(session.renderer().strokes().is_empty());
        assert!(!session.poll_restore());
    }

    /// Surface whose loads can be made to fail.
    #[derive(Debug, Default)]
    struct FlakySurface {
        inner: Surface,
        fail_loads: bool,
    }

    impl Renderer for FlakySurface {
        fn serialize(&self) -> Result<Snapshot, SurfaceError> {
            self.inner.serialize()
        }

        fn load(
            &mut self,
            snapshot: &Snapshot,
            done: oneshot::Sender<()>,
        ) -> Result<(), SurfaceError> {
            if self.fail_loads {
                return self.inner.load(&Snapshot::new("corrupt"), done);
            }
            self.inner.load(snapshot, done)
        }

        fn clear(&mut self) {
            self.inner.clear();
        }

        fn background(&self) -> Color {
            self.inner.background()
        }

        fn add_stroke(&mut self, stroke: Stroke) {
            self.inner.add_stroke(stroke);
        }

        fn set_dimensions(&mut self, width: u32, height: u32) {
            self.inner.set_dimensions(width, height);
        }

        fn dimensions(&self) -> (u32, u32) {
            self.inner.dimensions()
        }

        fn export_png(&self, scale: f32) -> Result<Vec<u8>, SurfaceError> {
            self.inner.export_png(scale)
        }
    }

    fn stroke_on(session: &mut Session<FlakySurface>, x: f32) {
        session.pointer(PointerInput::Down(Point::new(x, x))).unwrap();
        session.pointer(PointerInput::Up).unwrap();
    }

    #[test]
    fn test_failed_undo_keeps_cursor() {
        let mut session = Session::new(FlakySurface::default(), &PadConfig::default()).unwrap();
        stroke_on(&mut session, 1.0);
        stroke_on(&mut session, 2.0);
        let buttons = session.buttons();

        session.renderer_mut().fail_loads = true;
        assert!(matches!(
            session.undo(),
            Err(SessionError::Surface(SurfaceError::Decode(_)))
        ));
        assert_eq!(session.history().cursor(), Some(2));
        assert!(!session.is_restoring());
        assert_eq!(session.buttons(), buttons);
        assert_eq!(
            session.history().current(),
            Some(&session.renderer().serialize().unwrap())
        );

        // Once loads work again, a single undo lands one step back.
        session.renderer_mut().fail_loads = false;
        assert!(session.undo().unwrap());
        assert!(session.poll_restore());
        assert_eq!(session.history().cursor(), Some(1));
        assert_eq!(session.renderer().inner.strokes().len(), 1);
    }

    #[test]
    fn test_failed_redo_keeps_cursor() {
        let mut session = Session::new(FlakySurface::default(), &PadConfig::default()).unwrap();
        stroke_on(&mut session, 1.0);
        assert!(session.undo().unwrap());
        assert!(session.poll_restore());

        session.renderer_mut().fail_loads = true;
        assert!(session.redo().is_err());
        assert_eq!(session.history().cursor(), Some(0));
        assert!(session.buttons().redo_enabled);
        assert!(session.renderer().inner.strokes().is_empty());

        session.renderer_mut().fail_loads = false;
        assert!(session.redo().unwrap());
        assert!(session.poll_restore());
        assert_eq!(session.history().cursor(), Some(1));
        assert_eq!(session.renderer().inner.strokes().len(), 1);
    }

    #[test]
    fn test_undo_at_start_is_noop() {
        let mut session = session();
        assert!(!session.undo().unwrap());
        assert!(!session.redo().unwrap());
        assert!(!session.is_restoring());
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let mut session = session();
        draw(&mut session, (1.0, 1.0), (5.0, 5.0));

        assert!(!session.clear(false).unwrap());
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.renderer().strokes().len(), 1);

        assert!(session.clear(true).unwrap());
        assert_eq!(session.history().len(), 3);
        assert!(session.renderer().strokes().is_empty());
    }

    #[test]
    fn test_eraser_uses_canvas_background() {
        let paper = Color::rgb(200, 0, 0);
        let mut config = PadConfig::default();
        config.canvas.background = paper;
        let surface = Surface::new(20, 20, paper);
        let mut session = Session::new(surface, &config).unwrap();

        session.set_mode(ToolMode::Eraser);
        draw(&mut session, (1.0, 1.0), (5.0, 5.0));
        assert_eq!(session.renderer().strokes()[0].color, paper);

        assert!(session.clear(true).unwrap());
        assert_eq!(session.renderer().background(), paper);
    }

    #[test]
    fn test_eraser_strokes() {
        let mut session = session();
        session.set_width(8);
        session.set_mode(ToolMode::Eraser);
        draw(&mut session, (1.0, 1.0), (5.0, 5.0));

        let stroke = &session.renderer().strokes()[0];
        assert_eq!(stroke.color, Color::WHITE);
        assert_eq!(stroke.width, 16.0);
    }

    #[test]
    fn test_color_change_in_eraser_mode() {
        let mut session = session();
        session.set_mode(ToolMode::Eraser);
        session.set_color(Color::rgb(0, 255, 0));
        assert_eq!(session.active_brush().color, Color::WHITE);

        session.set_mode(ToolMode::Draw);
        assert_eq!(session.active_brush().color, Color::rgb(0, 255, 0));
    }

    #[test]
    fn test_cursor_follows_tool() {
        let mut session = session();
        session.set_width(20);
        assert_eq!(session.cursor().unwrap().size, 20.0);
        session.set_mode(ToolMode::Eraser);
        assert_eq!(session.cursor().unwrap().size, 40.0);

        session.pointer(PointerInput::Down(Point::new(0.0, 0.0))).unwrap();
        assert_eq!(session.cursor().unwrap().opacity, 0.3);
        session.pointer(PointerInput::Up).unwrap();
        assert_eq!(session.cursor().unwrap().opacity, 1.0);
    }

    #[test]
    fn test_cursor_preview_disabled() {
        let config = PadConfig {
            cursor_preview: false,
            ..PadConfig::default()
        };
        let mut session = Session::new(Surface::default(), &config).unwrap();
        session.set_mode(ToolMode::Eraser);
        session.set_hovering(true);
        assert!(session.cursor().is_none());
    }

    #[test]
    fn test_resize_applies_layout() {
        let mut session = session();
        let layout = session.resize(406.0, 1000.0);
        assert_eq!((layout.width, layout.height), (400, 300));
        assert_eq!(session.renderer().dimensions(), (400, 300));
    }

    #[test]
    fn test_width_clamped() {
        let mut session = session();
        session.set_width(0);
        assert_eq!(session.brush_settings().width, 1);
    }
}
