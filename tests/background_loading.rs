use base64::Engine as _;
use image::{ImageFormat, Rgba, RgbaImage};
use layered_paint::{BackgroundInput, BackgroundSource, Engine, EngineConfig, EngineError, EngineResult};
use std::io::Cursor;
use std::time::{Duration, Instant};

const GREEN: Rgba<u8> = Rgba([0, 200, 0, 255]);

fn png_bytes(image: &RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
    bytes
}

fn data_url(image: &RgbaImage) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png_bytes(image))
    )
}

fn wait_for_background(engine: &mut Engine) -> EngineResult<()> {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        if let Some(result) = engine.poll_background() {
            return result;
        }
        assert!(Instant::now() < deadline, "background load timed out");
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn test_data_url_background_covers_canvas() {
    let mut engine = Engine::new(30, 20, EngineConfig::default()).unwrap();
    engine.load_background(BackgroundInput::DataUrl(data_url(&RgbaImage::from_pixel(3, 3, GREEN))));
    assert!(engine.background_pending());

    wait_for_background(&mut engine).unwrap();
    assert!(!engine.background_pending());
    assert!(engine.has_background());
    for (x, y) in [(0, 0), (29, 0), (0, 19), (29, 19), (15, 10)] {
        assert_eq!(engine.background().pixel(x, y), Some(GREEN));
    }
    // Loading a background is not an undoable edit
    assert!(!engine.can_undo());
}

#[test]
fn test_failed_decode_leaves_background_transparent() {
    let mut engine = Engine::new(10, 10, EngineConfig::default()).unwrap();
    engine.set_background(BackgroundSource::from_image(RgbaImage::from_pixel(2, 2, GREEN)));

    engine.load_background(BackgroundInput::Bytes(b"definitely not an image".to_vec()));
    let result = wait_for_background(&mut engine);

    assert!(matches!(result, Err(EngineError::Decode(_))));
    assert!(!engine.has_background());
    assert!(engine.background().is_blank());
}

#[test]
fn test_malformed_data_url_is_rejected() {
    let result = BackgroundSource::decode(BackgroundInput::DataUrl("data:image/png,rawbytes".to_string()));
    assert!(matches!(result, Err(EngineError::InvalidDataUrl(_))));

    let result = BackgroundSource::decode(BackgroundInput::DataUrl("data:image/png;base64,@@@".to_string()));
    assert!(matches!(result, Err(EngineError::Base64(_))));
}

#[test]
fn test_newer_load_replaces_pending_one() {
    let mut engine = Engine::new(8, 8, EngineConfig::default()).unwrap();
    let red = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));

    engine.load_background(BackgroundInput::Bytes(png_bytes(&red)));
    engine.load_background(BackgroundInput::Bytes(png_bytes(&RgbaImage::from_pixel(4, 4, GREEN))));

    wait_for_background(&mut engine).unwrap();
    assert_eq!(engine.background().pixel(4, 4), Some(GREEN));
    assert!(engine.poll_background().is_none());
}

#[test]
fn test_background_refits_after_resize() {
    let mut engine = Engine::new(10, 10, EngineConfig::default()).unwrap();
    engine.load_background(BackgroundInput::Bytes(png_bytes(&RgbaImage::from_pixel(5, 5, GREEN))));
    wait_for_background(&mut engine).unwrap();

    engine.resize_canvas(40, 16).unwrap();
    assert_eq!(engine.background().pixel(39, 15), Some(GREEN));
}

#[test]
fn test_load_can_be_awaited() {
    let load = layered_paint::BackgroundLoad::spawn(BackgroundInput::Bytes(png_bytes(&RgbaImage::from_pixel(2, 3, GREEN))));
    let source = futures::executor::block_on(load).unwrap();
    assert_eq!(source.dimensions(), (2, 3));
}

#[test]
fn test_extreme_aspect_background_fills_canvas() {
    let mut engine = Engine::new(1000, 1000, EngineConfig::default()).unwrap();
    engine.set_background(BackgroundSource::from_image(RgbaImage::from_pixel(1, 1000, GREEN)));

    assert!(engine.has_background());
    for (x, y) in [(0, 0), (999, 0), (500, 500), (999, 999)] {
        assert_eq!(engine.background().pixel(x, y), Some(GREEN));
    }
}
