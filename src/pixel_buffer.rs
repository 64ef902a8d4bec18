use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

use crate::error::{EngineError, EngineResult};
use crate::geometry::CoverageMask;

pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// How a coverage mask is applied to a buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    /// Source-over with a solid color
    Color(Rgba<u8>),
    /// Destination-out: removes alpha, leaving true transparency
    Erase,
}

/// A width×height RGBA8 pixel array, row-major, unpremultiplied.
///
/// All coordinate-taking methods accept signed coordinates and silently
/// ignore anything outside the buffer.
#[derive(Clone, PartialEq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

// The pixel data is far too large to be useful in debug output
impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl PixelBuffer {
    /// Creates a fully transparent buffer
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn size(&self) -> [usize; 2] {
        [self.width() as usize, self.height() as usize]
    }

    /// Raw RGBA bytes, `width * height * 4` long
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub(crate) fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    fn index(&self, x: i32, y: i32) -> Option<(u32, u32)> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as u32, y as u32);
        (x < self.width() && y < self.height()).then_some((x, y))
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba<u8>> {
        self.index(x, y).map(|(x, y)| *self.image.get_pixel(x, y))
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgba<u8>) {
        if let Some((x, y)) = self.index(x, y) {
            self.image.put_pixel(x, y, color);
        }
    }

    /// Zero-fills in place, keeping the dimensions
    pub fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = TRANSPARENT;
        }
    }

    pub fn is_blank(&self) -> bool {
        self.image.pixels().all(|p| p[3] == 0)
    }

    /// Reallocates to the new size. With `preserve_top_left` the overlapping
    /// top-left region is copied across unscaled; otherwise the content is dropped.
    pub fn resize(&mut self, width: u32, height: u32, preserve_top_left: bool) {
        let mut resized = PixelBuffer::new(width, height);
        if preserve_top_left {
            resized.copy_from(self);
        }
        *self = resized;
    }

    /// Copies the overlapping top-left region of `other` over this buffer
    pub fn copy_from(&mut self, other: &PixelBuffer) {
        let width = self.width().min(other.width());
        let height = self.height().min(other.height());
        for y in 0..height {
            for x in 0..width {
                self.image.put_pixel(x, y, *other.image.get_pixel(x, y));
            }
        }
    }

    /// Source-over blend of `color` at fractional `coverage`
    pub fn blend(&mut self, x: i32, y: i32, color: Rgba<u8>, coverage: f32) {
        if let Some((x, y)) = self.index(x, y) {
            let dst = self.image.get_pixel_mut(x, y);
            let src_alpha = color[3] as f32 / 255.0 * coverage.clamp(0.0, 1.0);
            *dst = source_over(color, src_alpha, *dst);
        }
    }

    /// Destination-out: scales the existing alpha down by `coverage`
    pub fn erase(&mut self, x: i32, y: i32, coverage: f32) {
        if let Some((x, y)) = self.index(x, y) {
            let dst = self.image.get_pixel_mut(x, y);
            let alpha = (dst[3] as f32 * (1.0 - coverage.clamp(0.0, 1.0))).round() as u8;
            *dst = if alpha == 0 {
                TRANSPARENT
            } else {
                Rgba([dst[0], dst[1], dst[2], alpha])
            };
        }
    }

    pub fn apply_mask(&mut self, mask: &CoverageMask, paint: Paint) {
        for (x, y, coverage) in mask.iter() {
            match paint {
                Paint::Color(color) => self.blend(x, y, color, coverage),
                Paint::Erase => self.erase(x, y, coverage),
            }
        }
    }

    /// Composites a congruent buffer on top of this one with source-over
    pub fn draw_over(&mut self, top: &PixelBuffer) {
        let width = self.width().min(top.width());
        let height = self.height().min(top.height());
        for y in 0..height {
            for x in 0..width {
                let src = *top.image.get_pixel(x, y);
                if src[3] == 0 {
                    continue;
                }
                let dst = self.image.get_pixel_mut(x, y);
                *dst = source_over(src, src[3] as f32 / 255.0, *dst);
            }
        }
    }

    pub fn encode_png(&self) -> EngineResult<Vec<u8>> {
        let mut bytes = Cursor::new(Vec::new());
        self.image
            .write_to(&mut bytes, ImageFormat::Png)
            .map_err(|err| EngineError::Encode(err.to_string()))?;
        Ok(bytes.into_inner())
    }

    /// Converts to an egui image for display
    pub fn to_color_image(&self) -> egui::ColorImage {
        egui::ColorImage::from_rgba_unmultiplied(self.size(), self.pixels())
    }
}

/// Unpremultiplied source-over of `src` (at `src_alpha`) onto `dst`
fn source_over(src: Rgba<u8>, src_alpha: f32, dst: Rgba<u8>) -> Rgba<u8> {
    if src_alpha <= 0.0 {
        return dst;
    }
    let dst_alpha = dst[3] as f32 / 255.0;
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
    if out_alpha <= 0.0 {
        return TRANSPARENT;
    }

    let channel = |i: usize| {
        let value = (src[i] as f32 * src_alpha + dst[i] as f32 * dst_alpha * (1.0 - src_alpha)) / out_alpha;
        value.round().clamp(0.0, 255.0) as u8
    };
    Rgba([channel(0), channel(1), channel(2), (out_alpha * 255.0).round() as u8])
}
