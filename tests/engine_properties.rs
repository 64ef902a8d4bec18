use egui::pos2;
use image::{Rgba, RgbaImage};
use layered_paint::{BackgroundSource, Color, Engine, EngineConfig, EngineError, PixelBuffer, ToolConfig, ToolKind};
use layered_paint::flood_fill::flood_fill;

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

fn engine(width: u32, height: u32) -> Engine {
    Engine::new(width, height, EngineConfig::default()).unwrap()
}

fn shade(i: u8) -> Color {
    Color::rgb(i, 255 - i, i.wrapping_mul(7))
}

fn stroke(engine: &mut Engine, tool: &ToolConfig, from: (f32, f32), to: (f32, f32)) {
    engine.pointer_down(pos2(from.0, from.1), tool);
    engine.pointer_move(pos2(to.0, to.1));
    engine.pointer_up(pos2(to.0, to.1));
}

#[test]
fn test_fill_enclosed_region_changes_exactly_its_pixels() {
    let mut buffer = PixelBuffer::new(20, 20);
    let border = Rgba([10, 20, 30, 255]);
    for y in 0..20 {
        for x in 0..20 {
            let inside = (5..15).contains(&x) && (5..15).contains(&y);
            buffer.set_pixel(x, y, if inside { RED } else { border });
        }
    }

    assert_eq!(flood_fill(&mut buffer, 9, 9, BLUE), 100);
    assert_eq!(buffer.pixel(5, 5), Some(BLUE));
    assert_eq!(buffer.pixel(4, 5), Some(border));

    let before = buffer.clone();
    assert_eq!(flood_fill(&mut buffer, 9, 9, BLUE), 0);
    assert_eq!(buffer, before);
}

#[test]
fn test_undo_walks_back_to_first_commit_then_clears() {
    let mut engine = engine(30, 30);
    let pencil = ToolConfig {
        color: Color::rgb(0, 128, 0),
        ..ToolConfig::default()
    };

    let mut states = Vec::new();
    for i in 0..6u8 {
        if i % 2 == 0 {
            engine.fill_at(pos2(0.0, 0.0), shade(i * 20));
        } else {
            let y = 3.0 + i as f32 * 4.0;
            stroke(&mut engine, &pencil, (2.0, y), (27.0, y));
        }
        states.push(engine.drawing().clone());
    }
    assert_eq!(engine.history_len(), 6);

    for expected in states.iter().rev().skip(1) {
        assert!(engine.undo());
        assert_eq!(engine.drawing(), expected);
    }
    assert_eq!(engine.drawing(), &states[0]);

    assert!(engine.undo());
    assert!(engine.drawing().is_blank());
    assert!(!engine.can_undo());
    assert!(!engine.undo());
}

#[test]
fn test_history_keeps_only_the_newest_twenty_states() {
    let mut engine = engine(8, 8);
    for i in 0..25u8 {
        engine.fill_at(pos2(1.0, 1.0), shade(i * 9 + 1));
    }
    assert_eq!(engine.history_len(), 20);

    for _ in 0..19 {
        assert!(engine.undo());
    }
    // Oldest recoverable state is the sixth commit
    assert_eq!(engine.drawing().pixel(0, 0), Some(shade(5 * 9 + 1).to_rgba()));

    assert!(engine.undo());
    assert!(engine.drawing().is_blank());
    assert!(!engine.can_undo());
}

#[test]
fn test_resize_keeps_top_left_content() {
    let mut engine = engine(100, 100);
    engine.fill_at(pos2(0.0, 0.0), Color::rgb(1, 2, 3));
    let painted = Some(Rgba([1, 2, 3, 255]));

    engine.resize_canvas(200, 200).unwrap();
    assert_eq!(engine.drawing().pixel(5, 5), painted);
    assert_eq!(engine.drawing().pixel(150, 150), Some(CLEAR));
    assert_eq!(engine.background().width(), 200);

    engine.resize_canvas(3, 3).unwrap();
    assert_eq!(engine.drawing().pixel(5, 5), None);
    assert_eq!(engine.drawing().pixel(2, 2), painted);

    engine.resize_canvas(10, 10).unwrap();
    assert_eq!(engine.drawing().pixel(5, 5), Some(CLEAR));
}

#[test]
fn test_resize_to_zero_is_rejected() {
    let mut engine = engine(40, 30);
    engine.fill_at(pos2(0.0, 0.0), Color::BLACK);
    let before = engine.drawing().clone();

    assert!(matches!(
        engine.resize_canvas(0, 30),
        Err(EngineError::InvalidDimensions { width: 0, height: 30 })
    ));
    assert_eq!((engine.width(), engine.height()), (40, 30));
    assert_eq!(engine.drawing(), &before);
}

#[test]
fn test_export_composites_drawing_over_background() {
    let mut engine = engine(4, 4);
    engine.set_background(BackgroundSource::from_image(RgbaImage::from_pixel(4, 4, RED)));

    let blue_dot = ToolConfig {
        color: Color::rgb(0, 0, 255),
        stroke_width: 1.0,
        ..ToolConfig::default()
    };
    stroke(&mut engine, &blue_dot, (0.5, 0.5), (0.5, 0.5));

    let png = engine.export_png().unwrap();
    let exported = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(exported.dimensions(), (4, 4));
    for (x, y, pixel) in exported.enumerate_pixels() {
        let expected = if (x, y) == (0, 0) { BLUE } else { RED };
        assert_eq!(*pixel, expected, "pixel ({}, {})", x, y);
    }
}

#[test]
fn test_eraser_reveals_background() {
    let mut engine = engine(20, 20);
    engine.set_background(BackgroundSource::from_image(RgbaImage::from_pixel(20, 20, RED)));
    engine.fill_at(pos2(0.0, 0.0), Color::WHITE);

    let eraser = ToolConfig {
        stroke_width: 6.0,
        ..ToolConfig::with_tool(ToolKind::Eraser)
    };
    stroke(&mut engine, &eraser, (10.5, 4.5), (10.5, 15.5));

    assert_eq!(engine.drawing().pixel(10, 10), Some(CLEAR));
    assert_eq!(engine.composite().pixel(10, 10), Some(RED));
    assert_eq!(engine.composite().pixel(1, 1), Some(Rgba([255, 255, 255, 255])));
}

#[test]
fn test_shape_preview_leaves_drawing_alone_and_commit_draws_only_the_border() {
    let mut engine = engine(50, 50);
    let tool = ToolConfig {
        stroke_width: 2.0,
        ..ToolConfig::with_tool(ToolKind::Rectangle)
    };

    engine.pointer_down(pos2(10.0, 10.0), &tool);
    for step in 1..=5 {
        let t = step as f32 / 5.0;
        engine.pointer_move(pos2(10.0 + 30.0 * t, 10.0 + 20.0 * t));
        assert!(engine.drawing().is_blank());
    }
    assert!(!engine.composite_for_display().is_blank());
    assert!(engine.composite().is_blank());

    engine.pointer_up(pos2(40.0, 30.0));
    assert!(engine.layers().scratch().is_blank());
    assert_eq!(engine.history_len(), 1);

    let drawing = engine.drawing();
    assert_eq!(drawing.pixel(25, 20), Some(CLEAR));
    for y in 0..50 {
        for x in 0..50 {
            let Some(pixel) = drawing.pixel(x, y) else { continue };
            if pixel[3] == 0 {
                continue;
            }
            let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
            let dx = (10.0 - px).max(px - 40.0).max(0.0);
            let dy = (10.0 - py).max(py - 30.0).max(0.0);
            let distance = if dx > 0.0 || dy > 0.0 {
                dx.hypot(dy)
            } else {
                (px - 10.0).min(40.0 - px).min(py - 10.0).min(30.0 - py)
            };
            assert!(distance <= 2.0, "pixel ({}, {}) is {} away from the outline", x, y, distance);
        }
    }
}

#[test]
fn test_data_url_export_decodes_to_the_canvas() {
    use base64::Engine as _;

    let mut engine = engine(12, 7);
    engine.fill_at(pos2(0.0, 0.0), Color::rgb(9, 8, 7));
    let url = engine.export_data_url().unwrap();
    let payload = url.strip_prefix("data:image/png;base64,").unwrap();
    let png = base64::engine::general_purpose::STANDARD.decode(payload).unwrap();

    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (12, 7));
    assert_eq!(*decoded.get_pixel(11, 6), Rgba([9, 8, 7, 255]));
}

#[test]
fn test_clear_keeps_background() {
    let mut engine = engine(6, 6);
    engine.set_background(BackgroundSource::from_image(RgbaImage::from_pixel(6, 6, RED)));
    engine.fill_at(pos2(0.0, 0.0), Color::BLACK);

    engine.clear();
    assert!(engine.drawing().is_blank());
    assert_eq!(engine.composite().pixel(3, 3), Some(RED));
    assert_eq!(engine.history_len(), 1);
}

#[test]
fn test_shape_released_far_off_canvas_is_clipped() {
    let mut engine = engine(64, 64);
    let tool = ToolConfig::with_tool(ToolKind::Rectangle);

    engine.pointer_down(pos2(10.0, 10.0), &tool);
    engine.pointer_move(pos2(40000.0, 40000.0));
    engine.pointer_up(pos2(40000.0, 40000.0));

    assert_eq!(engine.history_len(), 1);
    assert!(engine.layers().scratch().is_blank());
    // Left and top edges run across the canvas; the rest lies outside it
    assert_eq!(engine.drawing().pixel(10, 40).map(|p| p[3]), Some(255));
    assert_eq!(engine.drawing().pixel(40, 10).map(|p| p[3]), Some(255));
    assert_eq!(engine.drawing().pixel(40, 40), Some(CLEAR));
}

#[test]
fn test_pencil_stroke_to_far_off_point() {
    let mut engine = engine(64, 64);
    stroke(&mut engine, &ToolConfig::default(), (10.0, 10.0), (6000.0, 6000.0));

    assert_eq!(engine.history_len(), 1);
    assert_eq!(engine.drawing().pixel(60, 60).map(|p| p[3]), Some(255));
}
