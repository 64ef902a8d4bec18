mod color;

pub use color::{Color, PALETTE};

use serde::{Deserialize, Serialize};

/// Range offered by the size slider
pub const STROKE_WIDTH_RANGE: std::ops::RangeInclusive<f32> = 1.0..=50.0;

/// The drawing tools the engine knows how to handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Pencil,
    Eraser,
    Rectangle,
    Ellipse,
    Text,
    Fill,
}

impl ToolKind {
    pub const ALL: [ToolKind; 6] = [
        ToolKind::Pencil,
        ToolKind::Eraser,
        ToolKind::Rectangle,
        ToolKind::Ellipse,
        ToolKind::Text,
        ToolKind::Fill,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Pencil => "Pencil",
            ToolKind::Eraser => "Eraser",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Ellipse => "Ellipse",
            ToolKind::Text => "Text",
            ToolKind::Fill => "Fill",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            ToolKind::Pencil => "✎",
            ToolKind::Eraser => "⌫",
            ToolKind::Rectangle => "▭",
            ToolKind::Ellipse => "◯",
            ToolKind::Text => "T",
            ToolKind::Fill => "🪣",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Inter,
    Georgia,
    Monospace,
}

impl FontFamily {
    pub const ALL: [FontFamily; 3] = [FontFamily::Inter, FontFamily::Georgia, FontFamily::Monospace];

    pub fn name(self) -> &'static str {
        match self {
            FontFamily::Inter => "Inter",
            FontFamily::Georgia => "Georgia",
            FontFamily::Monospace => "monospace",
        }
    }
}

/// Settings the host hands to the engine with every interaction.
///
/// The engine only reads this; the host owns and edits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub tool: ToolKind,
    pub color: Color,
    pub stroke_width: f32,
    pub font_family: FontFamily,
    pub font_size: f32,
    pub bold: bool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            tool: ToolKind::Pencil,
            color: Color::BLACK,
            stroke_width: 5.0,
            font_family: FontFamily::Inter,
            font_size: 24.0,
            bold: false,
        }
    }
}

impl ToolConfig {
    pub fn with_tool(tool: ToolKind) -> Self {
        Self {
            tool,
            ..Self::default()
        }
    }

    /// Stroke width, never below one pixel
    pub fn stroke_width(&self) -> f32 {
        if self.stroke_width.is_finite() {
            self.stroke_width.max(1.0)
        } else {
            1.0
        }
    }

    /// Font size, never below one pixel
    pub fn font_size(&self) -> f32 {
        if self.font_size.is_finite() {
            self.font_size.max(1.0)
        } else {
            1.0
        }
    }
}
