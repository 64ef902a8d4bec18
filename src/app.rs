use egui::{Key, KeyboardShortcut, Modifiers};

use crate::background::BackgroundInput;
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::EngineResult;
use crate::input::CanvasEvent;
use crate::layer::AspectRatio;
use crate::panels::{central_panel, tools_panel};
use crate::text::FontBook;
use crate::texture_manager::TextureManager;
use crate::tools::{ToolConfig, ToolKind};

/// File name used when the composite is saved
pub const DOWNLOAD_FILE_NAME: &str = "visionary-design.png";

/// What survives an app restart. Pixels do not.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct Preferences {
    pub tool_config: ToolConfig,
    pub aspect: AspectRatio,
}

pub struct PaintApp {
    preferences: Preferences,
    engine: Engine,
    textures: TextureManager,
    /// Contents of the on-canvas text editor
    pub(crate) text_draft: String,
    pub(crate) focus_text_editor: bool,
    /// Path or data URL typed into the background field
    pub(crate) background_input: String,
    status: Option<String>,
    /// Whether the pointer was over the canvas on the previous frame
    pub(crate) pointer_inside: bool,
}

impl PaintApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, config: EngineConfig) -> EngineResult<Self> {
        let preferences: Preferences = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        Self::with_preferences(preferences, config)
    }

    pub fn with_preferences(preferences: Preferences, config: EngineConfig) -> EngineResult<Self> {
        let engine = Engine::with_config(config)?.with_fonts(FontBook::from_egui_defaults());
        Ok(Self {
            preferences,
            engine,
            textures: TextureManager::new(),
            text_draft: String::new(),
            focus_text_editor: false,
            background_input: String::new(),
            status: None,
            pointer_inside: false,
        })
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn tool_config(&self) -> &ToolConfig {
        &self.preferences.tool_config
    }

    pub fn tool_config_mut(&mut self) -> &mut ToolConfig {
        &mut self.preferences.tool_config
    }

    pub fn aspect(&self) -> AspectRatio {
        self.preferences.aspect
    }

    pub fn set_aspect(&mut self, aspect: AspectRatio) {
        self.preferences.aspect = aspect;
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub(crate) fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub(crate) fn textures_and_engine(&mut self) -> (&mut TextureManager, &Engine) {
        (&mut self.textures, &self.engine)
    }

    /// Switching tools ends whatever the previous tool had in progress
    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.preferences.tool_config.tool == tool {
            return;
        }
        self.engine.cancel_interaction();
        log::info!("Tool selected: {}", tool.name());
        self.preferences.tool_config.tool = tool;
    }

    pub fn send(&mut self, event: CanvasEvent) {
        if matches!(event, CanvasEvent::PointerDown(_)) && self.preferences.tool_config.tool == ToolKind::Text {
            self.text_draft.clear();
            self.focus_text_editor = true;
        }
        self.engine.handle_event(event, &self.preferences.tool_config);
    }

    pub fn undo(&mut self) {
        if !self.engine.undo() {
            log::debug!("Nothing to undo");
        }
    }

    pub fn clear(&mut self) {
        self.text_draft.clear();
        self.engine.clear();
    }

    /// Resizes the canvas to the preferred aspect inside the given area
    pub fn fit_canvas(&mut self, container: egui::Vec2) {
        let aspect = self.preferences.aspect;
        let (container_width, container_height) = (container.x.max(1.0) as u32, container.y.max(1.0) as u32);
        if aspect.fit_within(container_width, container_height) == (self.engine.width(), self.engine.height()) {
            return;
        }
        if let Err(err) = self.engine.resize_to_aspect(aspect, container_width, container_height) {
            log::warn!("Canvas resize rejected: {}", err);
        }
    }

    /// Starts loading whatever the background field holds: a data URL, or
    /// on native a file path.
    pub fn load_background_from_input(&mut self) {
        let input = self.background_input.trim().to_owned();
        if input.is_empty() {
            return;
        }

        if input.starts_with("data:") {
            self.engine.load_background(BackgroundInput::DataUrl(input));
            self.set_status("Loading background…");
            return;
        }

        match read_background_file(&input) {
            Ok(bytes) => {
                self.engine.load_background(BackgroundInput::Bytes(bytes));
                self.set_status("Loading background…");
            }
            Err(err) => {
                log::warn!("Could not read {}: {}", input, err);
                self.set_status(format!("Could not read {}", input));
            }
        }
    }

    pub fn clear_background(&mut self) {
        self.engine.clear_background();
    }

    /// Saves the composite. Native builds write a PNG into the working
    /// directory; web builds copy the data URL to the clipboard.
    pub fn download(&mut self, ctx: &egui::Context) {
        match self.save_export(ctx) {
            Ok(message) => self.set_status(message),
            Err(err) => {
                log::error!("Export failed: {}", err);
                self.set_status(format!("Export failed: {}", err));
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn save_export(&self, _ctx: &egui::Context) -> EngineResult<String> {
        std::fs::write(DOWNLOAD_FILE_NAME, self.engine.export_png()?)?;
        Ok(format!("Saved {}", DOWNLOAD_FILE_NAME))
    }

    #[cfg(target_arch = "wasm32")]
    fn save_export(&self, ctx: &egui::Context) -> EngineResult<String> {
        ctx.copy_text(self.engine.export_data_url()?);
        Ok("PNG data URL copied to clipboard".to_string())
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input_mut(|i| std::mem::take(&mut i.raw.dropped_files));
        let Some(file) = dropped.into_iter().next() else {
            return;
        };

        if let Some(bytes) = file.bytes {
            self.engine.load_background(BackgroundInput::Bytes(bytes.to_vec()));
            self.set_status(format!("Loading {}…", file.name));
        } else if let Some(path) = file.path {
            self.background_input = path.display().to_string();
            self.load_background_from_input();
        }
    }

    fn poll_background(&mut self, ctx: &egui::Context) {
        match self.engine.poll_background() {
            Some(Ok(())) => self.set_status("Background loaded"),
            Some(Err(err)) => self.set_status(format!("Background failed: {}", err)),
            None if self.engine.background_pending() => ctx.request_repaint(),
            None => {}
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn read_background_file(path: &str) -> EngineResult<Vec<u8>> {
    Ok(std::fs::read(path)?)
}

// The browser gives no file system access; images arrive as data URLs or drops
#[cfg(target_arch = "wasm32")]
fn read_background_file(_path: &str) -> EngineResult<Vec<u8>> {
    Err(crate::error::EngineError::Io(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "paste a data URL or drop an image instead",
    )))
}

impl eframe::App for PaintApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.preferences);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);
        self.poll_background(ctx);

        let undo = KeyboardShortcut::new(Modifiers::COMMAND, Key::Z);
        if !ctx.wants_keyboard_input() && ctx.input_mut(|i| i.consume_shortcut(&undo)) {
            self.undo();
        }

        tools_panel(self, ctx);
        central_panel(self, ctx);
    }
}
