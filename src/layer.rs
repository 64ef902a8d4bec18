use image::RgbaImage;
use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::background::BackgroundSource;
use crate::error::{EngineError, EngineResult};
use crate::pixel_buffer::PixelBuffer;

/// Rejects sizes that would leave a buffer without any pixels
pub fn validate_dimensions(width: u32, height: u32) -> EngineResult<()> {
    if width == 0 || height == 0 {
        return Err(EngineError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Flattens `drawing` over `background` into a new buffer; neither input changes.
pub fn composite(background: &PixelBuffer, drawing: &PixelBuffer) -> PixelBuffer {
    let mut flattened = background.clone();
    flattened.draw_over(drawing);
    flattened
}

/// Cover-fits `source` into `buffer`: scaled by the larger of the two axis
/// ratios so the whole buffer is covered, centered, with the overflow cropped.
///
/// Only the visible part of the source is cropped out and scaled, so the
/// work never exceeds the size of the buffer.
pub fn fit_background_image(buffer: &mut PixelBuffer, source: &RgbaImage) {
    buffer.clear();
    let (src_width, src_height) = source.dimensions();
    if src_width == 0 || src_height == 0 {
        return;
    }

    let (width, height) = (buffer.width(), buffer.height());
    let ratio = (width as f64 / src_width as f64).max(height as f64 / src_height as f64);
    let crop_width = ((width as f64 / ratio).round() as u32).clamp(1, src_width);
    let crop_height = ((height as f64 / ratio).round() as u32).clamp(1, src_height);
    let crop_x = (src_width - crop_width) / 2;
    let crop_y = (src_height - crop_height) / 2;

    let visible = imageops::crop_imm(source, crop_x, crop_y, crop_width, crop_height).to_image();
    if (crop_width, crop_height) == (width, height) {
        imageops::replace(buffer.image_mut(), &visible, 0, 0);
    } else {
        let scaled = imageops::resize(&visible, width, height, FilterType::Triangle);
        imageops::replace(buffer.image_mut(), &scaled, 0, 0);
    }
}

/// The engine's stack of congruent layers, bottom to top
#[derive(Debug, Clone)]
pub struct LayerSet {
    /// Imagery under the drawing; never touched by the tools
    background: PixelBuffer,
    /// Strokes, shapes, fills, text and erasure
    drawing: PixelBuffer,
    /// Live shape preview, shown on screen but never exported
    scratch: PixelBuffer,
}

impl LayerSet {
    pub fn new(width: u32, height: u32) -> EngineResult<Self> {
        validate_dimensions(width, height)?;
        Ok(Self {
            background: PixelBuffer::new(width, height),
            drawing: PixelBuffer::new(width, height),
            scratch: PixelBuffer::new(width, height),
        })
    }

    pub fn width(&self) -> u32 {
        self.drawing.width()
    }

    pub fn height(&self) -> u32 {
        self.drawing.height()
    }

    pub fn background(&self) -> &PixelBuffer {
        &self.background
    }

    pub fn background_mut(&mut self) -> &mut PixelBuffer {
        &mut self.background
    }

    pub fn drawing(&self) -> &PixelBuffer {
        &self.drawing
    }

    pub fn drawing_mut(&mut self) -> &mut PixelBuffer {
        &mut self.drawing
    }

    pub fn scratch(&self) -> &PixelBuffer {
        &self.scratch
    }

    pub fn scratch_mut(&mut self) -> &mut PixelBuffer {
        &mut self.scratch
    }

    /// Both layers a shape commit writes to
    pub fn drawing_and_scratch_mut(&mut self) -> (&mut PixelBuffer, &mut PixelBuffer) {
        (&mut self.drawing, &mut self.scratch)
    }

    /// Background and drawing flattened for export
    pub fn composite(&self) -> PixelBuffer {
        composite(&self.background, &self.drawing)
    }

    /// What the user sees: the export composite plus any shape preview
    pub fn composite_for_display(&self) -> PixelBuffer {
        let mut flattened = self.composite();
        flattened.draw_over(&self.scratch);
        flattened
    }

    /// Resizes every layer together. The drawing keeps its top-left content
    /// unscaled; the background is re-derived from `source` when there is one.
    pub fn resize(&mut self, width: u32, height: u32, source: Option<&BackgroundSource>) -> EngineResult<()> {
        validate_dimensions(width, height)?;

        self.drawing.resize(width, height, true);
        self.scratch.resize(width, height, false);
        self.background.resize(width, height, false);
        if let Some(source) = source {
            fit_background_image(&mut self.background, source.image());
        }
        Ok(())
    }
}

/// Canvas shapes the host can switch between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Widescreen,
    #[serde(rename = "4:3")]
    Standard,
    #[serde(rename = "9:16")]
    Portrait,
    #[serde(rename = "3:2")]
    Photo,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Square,
        AspectRatio::Widescreen,
        AspectRatio::Standard,
        AspectRatio::Portrait,
        AspectRatio::Photo,
    ];

    /// Width and height terms of the ratio
    pub fn terms(self) -> (u32, u32) {
        match self {
            AspectRatio::Square => (1, 1),
            AspectRatio::Widescreen => (16, 9),
            AspectRatio::Standard => (4, 3),
            AspectRatio::Portrait => (9, 16),
            AspectRatio::Photo => (3, 2),
        }
    }

    /// Largest canvas with this ratio that fits inside the container.
    /// Never smaller than 1×1.
    pub fn fit_within(self, container_width: u32, container_height: u32) -> (u32, u32) {
        let (w, h) = self.terms();
        let scale = (container_width as f64 / w as f64).min(container_height as f64 / h as f64);
        let width = (w as f64 * scale).floor() as u32;
        let height = (h as f64 * scale).floor() as u32;
        (width.max(1), height.max(1))
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = self.terms();
        write!(f, "{}:{}", w, h)
    }
}
