use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont, point};
use egui::Pos2;
use std::collections::HashMap;

use crate::error::{EngineError, EngineResult};
use crate::pixel_buffer::PixelBuffer;
use crate::tools::{Color, FontFamily};

/// Font faces supplied by the host, keyed by family and weight.
///
/// The engine never loads fonts on its own; whatever is registered here is
/// all the text tool can draw with.
#[derive(Clone, Default)]
pub struct FontBook {
    faces: HashMap<(FontFamily, bool), FontArc>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.faces.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers TrueType/OpenType bytes for a family and weight
    pub fn register(&mut self, family: FontFamily, bold: bool, bytes: Vec<u8>) -> EngineResult<()> {
        let font = FontArc::try_from_vec(bytes).map_err(|err| EngineError::Font(err.to_string()))?;
        self.faces.insert((family, bold), font);
        Ok(())
    }

    /// The proportional and monospace fonts bundled with egui
    pub fn from_egui_defaults() -> Self {
        let mut book = Self::new();
        let definitions = egui::FontDefinitions::default();
        for (name, data) in &definitions.font_data {
            let lower = name.to_lowercase();
            if lower.contains("emoji") || lower.contains("icon") {
                continue;
            }
            let family = if lower.contains("hack") || lower.contains("mono") {
                FontFamily::Monospace
            } else {
                FontFamily::Inter
            };
            if book.faces.contains_key(&(family, false)) {
                continue;
            }
            if let Err(err) = book.register(family, false, data.font.to_vec()) {
                log::warn!("Skipping bundled font {}: {}", name, err);
            }
        }
        book
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Best face for the request, and whether bold has to be synthesized.
    ///
    /// Falls back to the other weight of the family, then to any family.
    pub fn resolve(&self, family: FontFamily, bold: bool) -> Option<(&FontArc, bool)> {
        if let Some(font) = self.faces.get(&(family, bold)) {
            return Some((font, false));
        }

        let fallbacks = std::iter::once(family)
            .chain(FontFamily::ALL.into_iter().filter(|f| *f != family))
            .flat_map(|f| [(f, bold), (f, !bold)]);
        for key in fallbacks {
            if let Some(font) = self.faces.get(&key) {
                return Some((font, bold && !key.1));
            }
        }
        None
    }
}

/// Everything about how a text block looks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub family: FontFamily,
    pub size: f32,
    pub bold: bool,
    pub color: Color,
    /// Multiple of `size` between consecutive line tops
    pub line_height: f32,
}

/// Top-left origin of every line of `text`, paired with the line itself
pub fn line_origins<'t>(anchor: Pos2, text: &'t str, size: f32, line_height: f32) -> Vec<(Pos2, &'t str)> {
    text.split('\n')
        .enumerate()
        .map(|(i, line)| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            (Pos2::new(anchor.x, anchor.y + i as f32 * size * line_height), line)
        })
        .collect()
}

/// Rasterizes multi-line text into a buffer
pub struct TextPlacer<'a> {
    fonts: &'a FontBook,
}

impl<'a> TextPlacer<'a> {
    pub fn new(fonts: &'a FontBook) -> Self {
        Self { fonts }
    }

    /// Draws `text` left-aligned with its first line top at `anchor`.
    ///
    /// Returns false, leaving the buffer untouched, when the text is blank or
    /// no font is available.
    pub fn place(&self, buffer: &mut PixelBuffer, anchor: Pos2, text: &str, style: &TextStyle) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        let Some((font, synthetic_bold)) = self.fonts.resolve(style.family, style.bold) else {
            log::warn!("No font registered for {}; text was not drawn", style.family.name());
            return false;
        };

        let size = style.size.max(1.0);
        let scale = em_scale(font, size);
        let ascent = font.as_scaled(scale).ascent();
        let bold_offset = (size / 24.0).max(1.0);

        for (origin, line) in line_origins(anchor, text, size, style.line_height) {
            let baseline = Pos2::new(origin.x, origin.y + ascent);
            draw_line(buffer, font, scale, baseline, line, style.color);
            if synthetic_bold {
                draw_line(buffer, font, scale, baseline + egui::vec2(bold_offset, 0.0), line, style.color);
            }
        }

        log::debug!("Placed {} line(s) of text at {:?}", text.split('\n').count(), anchor);
        true
    }
}

/// Scale at which one em is `size` pixels, the way CSS font sizes work
fn em_scale(font: &FontArc, size: f32) -> PxScale {
    let units_per_em = font.units_per_em().unwrap_or(1000.0);
    PxScale::from(size * font.height_unscaled() / units_per_em)
}

fn draw_line(buffer: &mut PixelBuffer, font: &FontArc, scale: PxScale, baseline: Pos2, line: &str, color: Color) {
    let scaled = font.as_scaled(scale);
    let rgba = color.to_rgba();
    let mut caret = baseline.x;
    let mut previous: Option<GlyphId> = None;

    for ch in line.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(previous) = previous {
            caret += scaled.kern(previous, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, baseline.y));
        caret += scaled.h_advance(id);
        previous = Some(id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            let (left, top) = (bounds.min.x as i32, bounds.min.y as i32);
            outlined.draw(|x, y, coverage| {
                buffer.blend(left + x as i32, top + y as i32, rgba, coverage);
            });
        }
    }
}
