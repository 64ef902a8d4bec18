use egui::{Pos2, Rect, pos2};
use std::f32::consts::TAU;

/// Bounding box spanned by a drag from `anchor` to `current`, whichever
/// direction the drag went.
pub fn normalized_bounds(anchor: Pos2, current: Pos2) -> Rect {
    Rect::from_two_pos(anchor, current)
}

/// Corners of `rect` in drawing order; close the path to get the outline.
pub fn rectangle_outline(rect: Rect) -> Vec<Pos2> {
    vec![rect.left_top(), rect.right_top(), rect.right_bottom(), rect.left_bottom()]
}

/// Closed polygon approximating the ellipse inscribed in `rect`.
///
/// Segment count grows with the circumference so each segment stays around
/// two pixels long.
pub fn ellipse_outline(rect: Rect) -> Vec<Pos2> {
    let center = rect.center();
    let rx = rect.width().abs() * 0.5;
    let ry = rect.height().abs() * 0.5;

    let circumference = std::f32::consts::PI * (rx + ry);
    let segments = ((circumference / 2.0).ceil() as usize).clamp(24, 720);

    (0..segments)
        .map(|i| {
            let angle = TAU * i as f32 / segments as f32;
            pos2(center.x + rx * angle.cos(), center.y + ry * angle.sin())
        })
        .collect()
}
