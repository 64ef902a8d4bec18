use base64::Engine as _;
use egui::Pos2;
use uuid::Uuid;

use crate::background::{BackgroundInput, BackgroundLoad, BackgroundSource};
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::flood_fill::flood_fill;
use crate::history::{HistoryManager, Snapshot, UndoOutcome};
use crate::input::CanvasEvent;
use crate::layer::{AspectRatio, LayerSet, fit_background_image};
use crate::pixel_buffer::PixelBuffer;
use crate::shape::{ShapeDrag, ShapeKind};
use crate::state::EditingSession;
use crate::stroke::StrokeRenderer;
use crate::text::{FontBook, TextPlacer, TextStyle};
use crate::tools::{Color, ToolConfig, ToolKind};

/// One editing session's worth of canvas state.
///
/// The engine owns every pixel buffer and the undo history. The host feeds it
/// input events together with the current [`ToolConfig`], and pulls the
/// composite back out for display or export.
pub struct Engine {
    session_id: Uuid,
    config: EngineConfig,
    layers: LayerSet,
    history: HistoryManager,
    session: EditingSession,
    fonts: FontBook,
    background_source: Option<BackgroundSource>,
    pending_background: Option<BackgroundLoad>,
    /// Bumped on every pixel change so hosts can skip redundant uploads
    revision: u64,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("session_id", &self.session_id)
            .field("size", &(self.width(), self.height()))
            .field("session", &self.session.name())
            .field("history_len", &self.history.len())
            .field("has_background", &self.background_source.is_some())
            .field("revision", &self.revision)
            .finish()
    }
}

impl Engine {
    pub fn new(width: u32, height: u32, config: EngineConfig) -> EngineResult<Self> {
        let layers = LayerSet::new(width, height)?;
        let session_id = Uuid::new_v4();
        log::info!("Editing session {} started at {}x{}", session_id, width, height);

        Ok(Self {
            session_id,
            history: HistoryManager::new(config.history_capacity),
            config,
            layers,
            session: EditingSession::Idle,
            fonts: FontBook::new(),
            background_source: None,
            pending_background: None,
            revision: 0,
        })
    }

    /// Uses the canvas size from the config
    pub fn with_config(config: EngineConfig) -> EngineResult<Self> {
        Self::new(config.width, config.height, config)
    }

    pub fn with_fonts(mut self, fonts: FontBook) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn width(&self) -> u32 {
        self.layers.width()
    }

    pub fn height(&self) -> u32 {
        self.layers.height()
    }

    pub fn layers(&self) -> &LayerSet {
        &self.layers
    }

    pub fn drawing(&self) -> &PixelBuffer {
        self.layers.drawing()
    }

    pub fn background(&self) -> &PixelBuffer {
        self.layers.background()
    }

    pub fn session(&self) -> &EditingSession {
        &self.session
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Records the drawing layer as the newest undo state
    fn commit(&mut self, what: &str) {
        self.history.push(Snapshot::new(self.layers.drawing()));
        self.touch();
        log::info!("Committed {} ({} undo states)", what, self.history.len());
    }

    /// Routes a host event to the matching handler
    pub fn handle_event(&mut self, event: CanvasEvent, tool: &ToolConfig) {
        match event {
            CanvasEvent::PointerDown(pos) => self.pointer_down(pos, tool),
            CanvasEvent::PointerMove(pos) => self.pointer_move(pos),
            CanvasEvent::PointerUp(pos) => self.pointer_up(pos),
            CanvasEvent::PointerLeave => self.pointer_leave(),
            CanvasEvent::TextChanged(text) => self.update_text(text),
            CanvasEvent::Enter { shift } => self.press_enter(shift),
            CanvasEvent::Blur => {
                self.blur();
            }
        }
    }

    pub fn pointer_down(&mut self, pos: Pos2, tool: &ToolConfig) {
        // Whatever was in progress is finished before anything new starts
        self.finish_session();

        match tool.tool {
            ToolKind::Pencil | ToolKind::Eraser => {
                let erasing = tool.tool == ToolKind::Eraser;
                let stroke = StrokeRenderer::begin(self.layers.drawing_mut(), pos, tool.color, tool.stroke_width(), erasing);
                self.session = EditingSession::Stroking(stroke);
                self.touch();
            }
            ToolKind::Rectangle | ToolKind::Ellipse => {
                let Some(kind) = ShapeKind::from_tool(tool.tool) else {
                    return;
                };
                let mut drag = ShapeDrag::start(kind, pos, tool.color, tool.stroke_width(), self.config.preview_dash);
                drag.update_preview(self.layers.scratch_mut(), pos);
                self.session = EditingSession::ShapeDragging(drag);
                self.touch();
            }
            ToolKind::Text => {
                log::debug!("Text session opened at {:?}", pos);
                self.session = EditingSession::TextEditing {
                    anchor: pos,
                    buffer: String::new(),
                    style: self.text_style(tool),
                };
            }
            ToolKind::Fill => {
                self.fill_at(pos, tool.color);
            }
        }
    }

    pub fn pointer_move(&mut self, pos: Pos2) {
        let changed = match &mut self.session {
            EditingSession::Stroking(stroke) => {
                stroke.extend(self.layers.drawing_mut(), pos);
                true
            }
            EditingSession::ShapeDragging(drag) => {
                drag.update_preview(self.layers.scratch_mut(), pos);
                true
            }
            _ => false,
        };
        if changed {
            self.touch();
        }
    }

    pub fn pointer_up(&mut self, pos: Pos2) {
        match std::mem::take(&mut self.session) {
            EditingSession::Stroking(stroke) => self.end_stroke(stroke),
            EditingSession::ShapeDragging(drag) => self.commit_shape(drag, pos),
            // A text session outlives the click that opened it
            other => self.session = other,
        }
    }

    /// Leaving the canvas ends a stroke and commits a shape at the last
    /// position the pointer was seen inside the canvas.
    pub fn pointer_leave(&mut self) {
        match std::mem::take(&mut self.session) {
            EditingSession::Stroking(stroke) => self.end_stroke(stroke),
            EditingSession::ShapeDragging(drag) => {
                let last = drag.last_point();
                self.commit_shape(drag, last);
            }
            other => self.session = other,
        }
    }

    fn end_stroke(&mut self, stroke: StrokeRenderer) {
        let erasing = stroke.is_erasing();
        let segments = stroke.end();
        log::debug!("Stroke ended after {} segments", segments);
        self.commit(if erasing { "erase" } else { "stroke" });
    }

    fn commit_shape(&mut self, drag: ShapeDrag, pos: Pos2) {
        let kind = drag.kind();
        let (drawing, scratch) = self.layers.drawing_and_scratch_mut();
        drag.commit(drawing, scratch, pos);
        self.commit(match kind {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Ellipse => "ellipse",
        });
    }

    /// Replaces the pending text of a live text session
    pub fn update_text(&mut self, text: String) {
        if let EditingSession::TextEditing { buffer, .. } = &mut self.session {
            *buffer = text;
        }
    }

    /// Enter commits the pending text; Shift+Enter leaves the session open so
    /// the editor can insert a newline.
    pub fn press_enter(&mut self, shift: bool) {
        if !shift {
            self.commit_text();
        }
    }

    /// Focus left the text editor
    pub fn blur(&mut self) -> bool {
        self.commit_text()
    }

    /// Rasterizes the pending text, if any, and closes the text session.
    /// Returns whether anything was drawn.
    pub fn commit_text(&mut self) -> bool {
        match std::mem::take(&mut self.session) {
            EditingSession::TextEditing { anchor, buffer, style } => self.place_text(anchor, &buffer, &style),
            other => {
                self.session = other;
                false
            }
        }
    }

    /// Text style for a session opened with `tool`
    fn text_style(&self, tool: &ToolConfig) -> TextStyle {
        TextStyle {
            family: tool.font_family,
            size: tool.font_size(),
            bold: tool.bold,
            color: tool.color,
            line_height: self.config.line_height,
        }
    }

    fn place_text(&mut self, anchor: Pos2, text: &str, style: &TextStyle) -> bool {
        let placed = TextPlacer::new(&self.fonts).place(self.layers.drawing_mut(), anchor, text, style);
        if placed {
            self.commit("text");
        } else {
            log::debug!("Discarded empty text session");
        }
        placed
    }

    fn finish_session(&mut self) {
        match std::mem::take(&mut self.session) {
            EditingSession::Idle => {}
            EditingSession::Stroking(stroke) => self.end_stroke(stroke),
            EditingSession::ShapeDragging(drag) => {
                let last = drag.last_point();
                self.commit_shape(drag, last);
            }
            EditingSession::TextEditing { anchor, buffer, style } => {
                self.place_text(anchor, &buffer, &style);
            }
        }
    }

    /// Ends the current interaction because the tool changed: strokes are
    /// kept, shape previews are discarded, pending text is committed.
    pub fn cancel_interaction(&mut self) {
        match std::mem::take(&mut self.session) {
            EditingSession::Idle => {}
            EditingSession::Stroking(stroke) => self.end_stroke(stroke),
            EditingSession::ShapeDragging(drag) => {
                drag.cancel(self.layers.scratch_mut());
                self.touch();
            }
            EditingSession::TextEditing { anchor, buffer, style } => {
                self.place_text(anchor, &buffer, &style);
            }
        }
    }

    /// Flood fills the region under `pos`. Returns the number of pixels changed;
    /// a fill that changes nothing leaves history alone.
    pub fn fill_at(&mut self, pos: Pos2, color: Color) -> usize {
        let (x, y) = (pos.x.floor() as i32, pos.y.floor() as i32);
        let filled = flood_fill(self.layers.drawing_mut(), x, y, color.to_rgba());
        if filled > 0 {
            self.commit("fill");
        }
        filled
    }

    /// Steps back one committed state. Returns false when there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        // A drag in progress belongs to no committed state yet
        match std::mem::take(&mut self.session) {
            EditingSession::Stroking(stroke) => self.end_stroke(stroke),
            EditingSession::ShapeDragging(drag) => drag.cancel(self.layers.scratch_mut()),
            other => self.session = other,
        }

        let restored = match self.history.undo() {
            UndoOutcome::Restore(snapshot) => {
                let drawing = self.layers.drawing_mut();
                drawing.clear();
                drawing.copy_from(snapshot.buffer());
                true
            }
            UndoOutcome::Cleared => {
                self.layers.drawing_mut().clear();
                true
            }
            UndoOutcome::Nothing => false,
        };

        if restored {
            self.touch();
            log::info!("Undo ({} undo states left)", self.history.len());
        }
        restored
    }

    /// Wipes the drawing layer and starts history over from the empty canvas.
    /// The background is kept.
    pub fn clear(&mut self) {
        if let EditingSession::ShapeDragging(drag) = std::mem::take(&mut self.session) {
            drag.cancel(self.layers.scratch_mut());
        }
        self.layers.drawing_mut().clear();
        self.history.clear();
        self.commit("clear");
    }

    /// Background and drawing flattened into one buffer
    pub fn composite(&self) -> PixelBuffer {
        self.layers.composite()
    }

    /// The composite plus the live shape preview
    pub fn composite_for_display(&self) -> PixelBuffer {
        self.layers.composite_for_display()
    }

    pub fn export_png(&self) -> EngineResult<Vec<u8>> {
        self.composite().encode_png()
    }

    /// The exported PNG as a `data:image/png;base64,...` URL
    pub fn export_data_url(&self) -> EngineResult<String> {
        let png = self.export_png()?;
        Ok(format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(png)
        ))
    }

    /// Resizes all layers. Drawing content stays anchored top-left and is
    /// never rescaled; the background is refitted from its source.
    pub fn resize_canvas(&mut self, width: u32, height: u32) -> EngineResult<()> {
        if (width, height) == (self.width(), self.height()) {
            return Ok(());
        }
        self.layers.resize(width, height, self.background_source.as_ref())?;
        self.touch();
        log::info!("Canvas resized to {}x{}", width, height);
        Ok(())
    }

    /// Resizes to the largest canvas of `ratio` inside the container
    pub fn resize_to_aspect(&mut self, ratio: AspectRatio, container_width: u32, container_height: u32) -> EngineResult<(u32, u32)> {
        let (width, height) = ratio.fit_within(container_width, container_height);
        self.resize_canvas(width, height)?;
        Ok((width, height))
    }

    /// Starts decoding a new background off the event path. A load that is
    /// still pending is superseded.
    pub fn load_background(&mut self, input: BackgroundInput) {
        if self.pending_background.is_some() {
            log::debug!("Superseding pending background load");
        }
        self.pending_background = Some(BackgroundLoad::spawn(input));
    }

    pub fn background_pending(&self) -> bool {
        self.pending_background.is_some()
    }

    /// Applies a finished background load. Returns `None` while nothing has
    /// completed. A failed decode leaves the canvas without a background.
    pub fn poll_background(&mut self) -> Option<EngineResult<()>> {
        let result = self.pending_background.as_mut()?.try_complete()?;
        self.pending_background = None;

        Some(match result {
            Ok(source) => {
                self.set_background(source);
                Ok(())
            }
            Err(err) => {
                log::warn!("Background image could not be loaded: {}", err);
                self.clear_background();
                Err(err)
            }
        })
    }

    /// Cover-fits an already decoded image into the background layer
    pub fn set_background(&mut self, source: BackgroundSource) {
        fit_background_image(self.layers.background_mut(), source.image());
        let (w, h) = source.dimensions();
        log::info!("Background set from {}x{} image", w, h);
        self.background_source = Some(source);
        self.touch();
    }

    pub fn clear_background(&mut self) {
        self.background_source = None;
        self.layers.background_mut().clear();
        self.touch();
    }

    pub fn has_background(&self) -> bool {
        self.background_source.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn engine() -> Engine {
        Engine::new(64, 64, EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_new_engine_has_empty_history() {
        let engine = engine();
        assert!(!engine.can_undo());
        assert!(engine.drawing().is_blank());
        assert!(engine.session().is_idle());
    }

    #[test]
    fn test_zero_size_engine_is_rejected() {
        assert!(Engine::new(0, 10, EngineConfig::default()).is_err());
    }

    #[test]
    fn test_stroke_commits_on_pointer_up() {
        let mut engine = engine();
        let tool = ToolConfig::default();
        engine.pointer_down(pos2(10.0, 10.0), &tool);
        assert_eq!(engine.session().name(), "Stroking");
        engine.pointer_move(pos2(30.0, 30.0));
        assert_eq!(engine.history_len(), 0);

        engine.pointer_up(pos2(30.0, 30.0));
        assert!(engine.session().is_idle());
        assert_eq!(engine.history_len(), 1);
        assert!(!engine.drawing().is_blank());
    }

    #[test]
    fn test_pointer_down_finalizes_previous_stroke() {
        let mut engine = engine();
        let tool = ToolConfig::default();
        engine.pointer_down(pos2(10.0, 10.0), &tool);
        engine.pointer_move(pos2(20.0, 10.0));
        // No pointer up before the next press
        engine.pointer_down(pos2(40.0, 40.0), &tool);
        assert_eq!(engine.history_len(), 1);
    }

    #[test]
    fn test_pointer_leave_commits_shape_at_last_point() {
        let mut engine = engine();
        let tool = ToolConfig::with_tool(ToolKind::Rectangle);
        engine.pointer_down(pos2(5.0, 5.0), &tool);
        engine.pointer_move(pos2(40.0, 40.0));
        engine.pointer_leave();

        assert!(engine.session().is_idle());
        assert_eq!(engine.history_len(), 1);
        assert!(engine.layers().scratch().is_blank());
        assert_eq!(engine.drawing().pixel(40, 20).map(|p| p[3]), Some(255));
    }

    #[test]
    fn test_cancel_discards_shape_preview() {
        let mut engine = engine();
        let tool = ToolConfig::with_tool(ToolKind::Ellipse);
        engine.pointer_down(pos2(5.0, 5.0), &tool);
        engine.pointer_move(pos2(50.0, 40.0));
        engine.cancel_interaction();

        assert!(engine.layers().scratch().is_blank());
        assert!(engine.drawing().is_blank());
        assert!(!engine.can_undo());
    }

    #[test]
    fn test_fill_noop_does_not_record_history() {
        let mut engine = engine();
        let tool = ToolConfig::with_tool(ToolKind::Fill);
        engine.pointer_down(pos2(3.0, 3.0), &tool);
        assert_eq!(engine.history_len(), 1);
        engine.pointer_down(pos2(3.0, 3.0), &tool);
        assert_eq!(engine.history_len(), 1);
    }

    #[test]
    fn test_text_click_elsewhere_commits_pending_text() {
        let mut engine = engine().with_fonts(FontBook::from_egui_defaults());
        let tool = ToolConfig {
            font_size: 16.0,
            ..ToolConfig::with_tool(ToolKind::Text)
        };

        engine.handle_event(CanvasEvent::PointerDown(pos2(2.0, 2.0)), &tool);
        engine.handle_event(CanvasEvent::PointerUp(pos2(2.0, 2.0)), &tool);
        engine.handle_event(CanvasEvent::TextChanged("Hi".to_string()), &tool);
        assert_eq!(engine.session().text(), Some((pos2(2.0, 2.0), "Hi")));

        engine.handle_event(CanvasEvent::PointerDown(pos2(30.0, 30.0)), &tool);
        assert_eq!(engine.history_len(), 1);
        assert!(!engine.drawing().is_blank());
        assert_eq!(engine.session().text(), Some((pos2(30.0, 30.0), "")));
    }

    #[test]
    fn test_pending_text_keeps_the_style_it_was_opened_with() {
        let mut engine = engine().with_fonts(FontBook::from_egui_defaults());
        let red = ToolConfig {
            color: Color::rgb(200, 0, 0),
            font_size: 18.0,
            ..ToolConfig::with_tool(ToolKind::Text)
        };
        let blue = ToolConfig {
            color: Color::rgb(0, 0, 200),
            ..red.clone()
        };

        engine.pointer_down(pos2(2.0, 2.0), &red);
        engine.update_text("Hi".to_string());
        assert_eq!(engine.session().text_style().map(|style| style.color), Some(red.color));

        // The next click comes in with a different color
        engine.pointer_down(pos2(40.0, 40.0), &blue);
        assert_eq!(engine.history_len(), 1);

        let inked: Vec<_> = engine.drawing().as_image().pixels().filter(|p| p[3] > 0).collect();
        assert!(!inked.is_empty());
        assert!(inked.iter().all(|p| [p[0], p[1], p[2]] == [200, 0, 0]));
        assert_eq!(engine.session().text_style().map(|style| style.color), Some(blue.color));
    }

    #[test]
    fn test_shift_enter_keeps_text_session() {
        let mut engine = engine().with_fonts(FontBook::from_egui_defaults());
        let tool = ToolConfig::with_tool(ToolKind::Text);
        engine.pointer_down(pos2(2.0, 2.0), &tool);
        engine.update_text("a\nb".to_string());

        engine.handle_event(CanvasEvent::Enter { shift: true }, &tool);
        assert!(engine.session().text().is_some());

        engine.handle_event(CanvasEvent::Enter { shift: false }, &tool);
        assert!(engine.session().is_idle());
        assert_eq!(engine.history_len(), 1);
    }

    #[test]
    fn test_blank_text_commit_records_nothing() {
        let mut engine = engine().with_fonts(FontBook::from_egui_defaults());
        let tool = ToolConfig::with_tool(ToolKind::Text);
        engine.pointer_down(pos2(2.0, 2.0), &tool);
        engine.update_text("   ".to_string());
        engine.handle_event(CanvasEvent::Blur, &tool);

        assert!(engine.session().is_idle());
        assert!(!engine.can_undo());
        assert!(engine.drawing().is_blank());
    }

    #[test]
    fn test_clear_leaves_single_empty_snapshot() {
        let mut engine = engine();
        let tool = ToolConfig::default();
        engine.pointer_down(pos2(10.0, 10.0), &tool);
        engine.pointer_up(pos2(10.0, 10.0));
        engine.clear();

        assert!(engine.drawing().is_blank());
        assert_eq!(engine.history_len(), 1);
        assert!(engine.undo());
        assert!(!engine.can_undo());
    }

    #[test]
    fn test_revision_tracks_changes() {
        let mut engine = engine();
        let start = engine.revision();
        engine.pointer_move(pos2(1.0, 1.0));
        assert_eq!(engine.revision(), start);
        engine.fill_at(pos2(1.0, 1.0), Color::BLACK);
        assert!(engine.revision() > start);
    }

    #[test]
    fn test_export_data_url_prefix() {
        let engine = engine();
        let url = engine.export_data_url().unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_undo_restores_snapshot_from_larger_canvas() {
        let mut engine = engine();
        engine.fill_at(pos2(0.0, 0.0), Color::rgb(9, 9, 9));
        engine.pointer_down(pos2(5.0, 5.0), &ToolConfig::with_tool(ToolKind::Eraser));
        engine.pointer_up(pos2(5.0, 5.0));
        engine.resize_canvas(32, 32).unwrap();

        assert!(engine.undo());
        assert_eq!(engine.drawing().width(), 32);
        assert_eq!(engine.drawing().pixel(5, 5), Some(image::Rgba([9, 9, 9, 255])));
    }
}
