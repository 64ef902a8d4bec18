use egui::Pos2;

use crate::shape::ShapeDrag;
use crate::stroke::StrokeRenderer;
use crate::text::TextStyle;

/// The interaction currently in progress on the canvas.
///
/// ```text
///            pointer down (pencil/eraser)      pointer up / leave
///   Idle ───────────────────────────────► Stroking ─────────────► Idle
///     │      pointer down (rect/ellipse)         commit / cancel
///     ├──────────────────────────────────► ShapeDragging ───────► Idle
///     │      pointer down (text)                 Enter / blur / new text click
///     └──────────────────────────────────► TextEditing ─────────► Idle
/// ```
///
/// Only one variant is live at a time, and any pointer down finalizes
/// whatever was in progress before starting something new.
#[derive(Debug, Default)]
pub enum EditingSession {
    #[default]
    Idle,
    Stroking(StrokeRenderer),
    ShapeDragging(ShapeDrag),
    /// The style is fixed when the session opens and used at commit
    TextEditing { anchor: Pos2, buffer: String, style: TextStyle },
}

impl EditingSession {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Stroking(_) => "Stroking",
            Self::ShapeDragging(_) => "ShapeDragging",
            Self::TextEditing { .. } => "TextEditing",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Anchor and pending text of a live text session
    pub fn text(&self) -> Option<(Pos2, &str)> {
        match self {
            Self::TextEditing { anchor, buffer, .. } => Some((*anchor, buffer.as_str())),
            _ => None,
        }
    }

    /// Style the pending text will be drawn with
    pub fn text_style(&self) -> Option<&TextStyle> {
        match self {
            Self::TextEditing { style, .. } => Some(style),
            _ => None,
        }
    }
}
