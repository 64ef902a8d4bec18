use egui::Pos2;

use crate::geometry::CoverageMask;
use crate::pixel_buffer::{Paint, PixelBuffer};
use crate::tools::Color;

/// A pencil or eraser stroke being rendered as the pointer moves.
///
/// Each pointer move rasterizes one round-capped segment straight into the
/// buffer, so there is no preview pass for freehand tools.
#[derive(Debug, Clone)]
pub struct StrokeRenderer {
    last_point: Pos2,
    paint: Paint,
    width: f32,
    segments: usize,
}

impl StrokeRenderer {
    /// Starts a stroke at `point` and stamps a round dot there, so a click
    /// without movement still leaves a mark.
    pub fn begin(buffer: &mut PixelBuffer, point: Pos2, color: Color, width: f32, erasing: bool) -> Self {
        let paint = if erasing { Paint::Erase } else { Paint::Color(color.to_rgba()) };
        let width = width.max(1.0);
        let canvas = (buffer.width(), buffer.height());
        buffer.apply_mask(&CoverageMask::segment(point, point, width, canvas), paint);

        Self {
            last_point: point,
            paint,
            width,
            segments: 0,
        }
    }

    /// Draws a segment from the last point to `point`
    pub fn extend(&mut self, buffer: &mut PixelBuffer, point: Pos2) {
        if point == self.last_point {
            return;
        }
        let canvas = (buffer.width(), buffer.height());
        let mask = CoverageMask::segment(self.last_point, point, self.width, canvas);
        buffer.apply_mask(&mask, self.paint);
        self.last_point = point;
        self.segments += 1;
    }

    /// Finishes the stroke, returning the number of segments drawn.
    /// The buffer is not touched; recording history is up to the caller.
    pub fn end(self) -> usize {
        self.segments
    }

    pub fn last_point(&self) -> Pos2 {
        self.last_point
    }

    pub fn is_erasing(&self) -> bool {
        self.paint == Paint::Erase
    }

    pub fn width(&self) -> f32 {
        self.width
    }
}
