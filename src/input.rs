use egui::{Pos2, Rect};

/// Canvas interactions forwarded by the host, in canvas-local pixel coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// Primary button pressed over the canvas
    PointerDown(Pos2),
    /// Pointer moved; only meaningful while a stroke or shape drag is live
    PointerMove(Pos2),
    /// Primary button released
    PointerUp(Pos2),
    /// Pointer left the canvas, possibly with the button still held
    PointerLeave,
    /// The pending text of a live text session changed
    TextChanged(String),
    /// Enter was pressed in the text editor
    Enter { shift: bool },
    /// The text editor lost focus
    Blur,
}

/// Maps a screen position inside `canvas_rect` to canvas pixels, given the
/// canvas resolution. Positions outside the rect map outside the canvas.
pub fn to_canvas_coords(screen: Pos2, canvas_rect: Rect, canvas_size: [u32; 2]) -> Pos2 {
    let scale_x = canvas_size[0] as f32 / canvas_rect.width().max(1.0);
    let scale_y = canvas_size[1] as f32 / canvas_rect.height().max(1.0);
    Pos2::new(
        (screen.x - canvas_rect.min.x) * scale_x,
        (screen.y - canvas_rect.min.y) * scale_y,
    )
}

/// Inverse of [`to_canvas_coords`]
pub fn to_screen_coords(canvas: Pos2, canvas_rect: Rect, canvas_size: [u32; 2]) -> Pos2 {
    let scale_x = canvas_rect.width() / canvas_size[0].max(1) as f32;
    let scale_y = canvas_rect.height() / canvas_size[1].max(1) as f32;
    Pos2::new(canvas_rect.min.x + canvas.x * scale_x, canvas_rect.min.y + canvas.y * scale_y)
}
