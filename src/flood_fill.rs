use image::Rgba;
use std::collections::VecDeque;

use crate::pixel_buffer::PixelBuffer;

/// Fills the 4-connected region around `(x, y)` whose pixels exactly match the
/// seed color (all four channels), returning how many pixels changed.
///
/// There is no tolerance, so anti-aliased edges next to the region keep
/// their partial colors. A seed outside the buffer, or a seed already painted
/// with `fill_color`, leaves the buffer untouched.
pub fn flood_fill(buffer: &mut PixelBuffer, x: i32, y: i32, fill_color: Rgba<u8>) -> usize {
    let Some(target) = buffer.pixel(x, y) else {
        return 0;
    };
    if target == fill_color {
        return 0;
    }

    // A pixel is recolored as it is enqueued, so it can never match the
    // target again and is visited at most once.
    let mut queue = VecDeque::new();
    buffer.set_pixel(x, y, fill_color);
    queue.push_back((x, y));
    let mut filled = 1;

    while let Some((cx, cy)) = queue.pop_front() {
        for (nx, ny) in [(cx - 1, cy), (cx + 1, cy), (cx, cy - 1), (cx, cy + 1)] {
            if buffer.pixel(nx, ny) == Some(target) {
                buffer.set_pixel(nx, ny, fill_color);
                queue.push_back((nx, ny));
                filled += 1;
            }
        }
    }

    log::debug!("Flood fill from ({}, {}) recolored {} pixels", x, y, filled);
    filled
}
