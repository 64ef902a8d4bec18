#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod background;
pub mod config;
pub mod engine;
pub mod error;
pub mod flood_fill;
pub mod geometry;
pub mod history;
pub mod input;
pub mod layer;
pub mod panels;
pub mod pixel_buffer;
pub mod shape;
pub mod state;
pub mod stroke;
pub mod text;
pub mod texture_manager;
pub mod tools;

pub use app::{PaintApp, Preferences};
pub use background::{BackgroundInput, BackgroundLoad, BackgroundSource};
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use history::{HistoryManager, Snapshot, UndoOutcome};
pub use input::CanvasEvent;
pub use layer::{AspectRatio, LayerSet};
pub use pixel_buffer::PixelBuffer;
pub use state::EditingSession;
pub use text::FontBook;
pub use tools::{Color, FontFamily, ToolConfig, ToolKind};
