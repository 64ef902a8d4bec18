#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

/// Optional JSON file with engine settings
#[cfg(not(target_arch = "wasm32"))]
const CONFIG_ENV: &str = "LAYERED_PAINT_CONFIG";

// When compiling natively:
#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result {
    env_logger::init(); // Log to stderr (if you run with `RUST_LOG=debug`).

    let config = match std::env::var(CONFIG_ENV) {
        Ok(path) => layered_paint::EngineConfig::load(&path).unwrap_or_else(|err| {
            log::warn!("Ignoring config {}: {}", path, err);
            layered_paint::EngineConfig::default()
        }),
        Err(_) => layered_paint::EngineConfig::default(),
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Layered Paint")
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([480.0, 360.0]),
        ..Default::default()
    };
    eframe::run_native(
        "layered_paint",
        native_options,
        Box::new(move |cc| -> Result<Box<dyn eframe::App>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(Box::new(layered_paint::PaintApp::new(cc, config)?))
        }),
    )
}

// Web builds are started from JavaScript through eframe::WebRunner.
#[cfg(target_arch = "wasm32")]
fn main() {}
