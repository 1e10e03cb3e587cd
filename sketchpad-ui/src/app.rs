// The sketchpad window: toolbar on top, canvas below.

use std::time::Instant;

use chrono::Utc;
use egui::{Align2, Button, CursorIcon, PointerButton, Sense, Vec2};
use sketchpad_core::config::PadConfig;
use sketchpad_core::{
    PointerInput, Renderer, ResizeDebouncer, Session, SessionError, Shortcut, Surface, ToolMode,
};
use tracing::{debug, error, info};

use crate::editor::canvas::{from_color32, to_color32, to_surface};
use crate::editor::{paint_cursor, shortcuts, CanvasView, TouchTranslator};

pub struct SketchpadApp {
    session: Session<CanvasView>,
    resize: ResizeDebouncer,
    container: Option<(f32, f32)>,
    centered: bool,
    touches: TouchTranslator,
    confirm_clear: bool,
    status: Option<String>,
}

impl SketchpadApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: PadConfig) -> Result<Self, SessionError> {
        cc.egui_ctx.set_visuals(egui::Visuals::light());

        let surface = Surface::new(
            config.canvas.width,
            config.canvas.height,
            config.canvas.background,
        );
        let session = Session::new(CanvasView::new(surface), &config)?;

        Ok(Self {
            session,
            resize: ResizeDebouncer::from_config(&config.layout),
            container: None,
            centered: false,
            touches: TouchTranslator::default(),
            confirm_clear: false,
            status: None,
        })
    }

    fn undo(&mut self) {
        let result = self.session.undo();
        report(&mut self.status, "Undo", result);
    }

    fn redo(&mut self) {
        let result = self.session.redo();
        report(&mut self.status, "Redo", result);
    }

    fn download(&mut self) {
        match self.session.export(Utc::now()) {
            Ok(path) => {
                info!("Saved drawing to {}", path.display());
                self.status = Some(format!("Saved {}", path.display()));
            }
            Err(err) => {
                error!("Export failed: {err:#}");
                self.status = Some(format!("Export failed: {err:#}"));
            }
        }
    }

    fn render_toolbar(&mut self, ui: &mut egui::Ui) {
        let buttons = self.session.buttons();

        ui.horizontal(|ui| {
            let undo = ui
                .scope(|ui| {
                    ui.set_opacity(buttons.undo_opacity());
                    ui.add_enabled(buttons.undo_enabled, Button::new("↶ Undo"))
                })
                .inner;
            if undo.clicked() {
                self.undo();
            }

            let redo = ui
                .scope(|ui| {
                    ui.set_opacity(buttons.redo_opacity());
                    ui.add_enabled(buttons.redo_enabled, Button::new("↷ Redo"))
                })
                .inner;
            if redo.clicked() {
                self.redo();
            }

            ui.separator();

            let mode = self.session.mode();
            for tool in [ToolMode::Draw, ToolMode::Eraser] {
                if ui.selectable_label(mode == tool, tool.name()).clicked() && mode != tool {
                    self.session.set_mode(tool);
                }
            }

            ui.separator();

            let settings = self.session.brush_settings();
            let mut color = to_color32(settings.color);
            if ui.color_edit_button_srgba(&mut color).changed() {
                self.session.set_color(from_color32(color));
            }

            let mut width = settings.width;
            if ui
                .add(egui::Slider::new(&mut width, 1..=50).text("Size"))
                .changed()
            {
                self.session.set_width(width);
            }

            ui.separator();

            if ui.button("Clear").clicked() {
                self.confirm_clear = true;
            }
            if ui.button("Download").clicked() {
                self.download();
            }

            if let Some(status) = &self.status {
                ui.separator();
                ui.label(status);
            }
        });
    }

    fn render_confirm_clear(&mut self, ctx: &egui::Context) {
        if !self.confirm_clear {
            return;
        }

        let mut answer = None;
        egui::Window::new("Clear canvas")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label("Are you sure you want to clear the canvas?");
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        answer = Some(true);
                    }
                    if ui.button("Cancel").clicked() {
                        answer = Some(false);
                    }
                });
            });

        if let Some(confirmed) = answer {
            self.confirm_clear = false;
            let result = self.session.clear(confirmed);
            report(&mut self.status, "Clear", result);
        }
    }

    fn render_canvas(&mut self, ui: &mut egui::Ui) {
        let available = ui.available_size();
        let container = (available.x, available.y);
        let now = Instant::now();
        if self.container != Some(container) {
            if self.container.is_none() {
                // First frame: fit without waiting.
                let layout = self.session.resize(container.0, container.1);
                self.centered = layout.centered;
            } else {
                self.resize.request(container, now);
            }
            self.container = Some(container);
        }
        if let Some((width, height)) = self.resize.poll(now) {
            let layout = self.session.resize(width, height);
            self.centered = layout.centered;
        }
        if let Some(remaining) = self.resize.remaining(now) {
            ui.ctx().request_repaint_after(remaining);
        }

        let (width, height) = self.session.renderer().dimensions();
        let size = Vec2::new(width as f32, height as f32);
        let (rect, response) = if self.centered {
            ui.vertical_centered(|ui| ui.allocate_exact_size(size, Sense::drag()))
                .inner
        } else {
            ui.allocate_exact_size(size, Sense::drag())
        };

        let origin = rect.min;
        let mut inputs = Vec::new();
        let (touching, events) = ui.input(|i| (i.any_touches(), i.events.clone()));
        if touching || events.iter().any(|e| matches!(e, egui::Event::Touch { .. })) {
            inputs.extend(self.touches.translate(&events, rect));
        } else {
            let pos = response.interact_pointer_pos();
            if response.drag_started_by(PointerButton::Primary) {
                if let Some(pos) = pos {
                    inputs.push(PointerInput::Down(to_surface(origin, pos)));
                }
            } else if response.dragged_by(PointerButton::Primary) {
                if let Some(pos) = pos {
                    inputs.push(PointerInput::Move(to_surface(origin, pos)));
                }
            }
            if response.drag_stopped() {
                inputs.push(PointerInput::Up);
            }
        }
        for input in inputs {
            if let Err(err) = self.session.pointer(input) {
                error!("Failed to record stroke: {err}");
                self.status = Some(format!("Failed to record stroke: {err}"));
            }
        }

        let hovering = response.hovered() || self.session.is_drawing();
        self.session.set_hovering(hovering);

        let painter = ui.painter_at(rect);
        self.session
            .renderer()
            .paint(&painter, rect, self.session.stroke_in_progress());

        if hovering {
            match self.session.cursor() {
                Some(preview) => {
                    ui.ctx().set_cursor_icon(CursorIcon::None);
                    if let Some(pos) = ui.ctx().pointer_hover_pos() {
                        paint_cursor(ui.painter(), pos, preview);
                    }
                }
                None => ui.ctx().set_cursor_icon(CursorIcon::Crosshair),
            }
        }

        self.session.renderer_mut().frame_painted();
        if self.session.poll_restore() {
            ui.ctx().request_repaint();
        }
    }
}

/// Show a failed action in the status line; a later success clears it.
fn report(status: &mut Option<String>, action: &str, result: Result<bool, SessionError>) {
    match result {
        Ok(true) => *status = None,
        Ok(false) => {}
        Err(err) => {
            error!("{action} failed: {err}");
            *status = Some(format!("{action} failed: {err}"));
        }
    }
}

impl eframe::App for SketchpadApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let pressed = ctx.input(|i| shortcuts(&i.events));
        for shortcut in pressed {
            match shortcut {
                Shortcut::Undo => self.undo(),
                Shortcut::Redo => self.redo(),
            }
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.render_toolbar(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_canvas(ui);
        });

        self.render_confirm_clear(ctx);

        if self.session.is_restoring() {
            debug!("Snapshot restore pending, repainting");
            ctx.request_repaint();
        }
    }
}
