//! Two-phase shape drawing.
//!
//! A drag starts in the previewing state: every pointer move redraws a dashed
//! outline into the scratch layer only. Releasing the pointer commits a solid
//! outline into the drawing layer; cancelling throws the preview away. Both
//! consume the [`ShapeDrag`], which is how the machine returns to idle.

use egui::{Pos2, Rect};

use crate::geometry::{CoverageMask, DashPattern, ellipse_outline, normalized_bounds, rectangle_outline};
use crate::pixel_buffer::{Paint, PixelBuffer};
use crate::tools::{Color, ToolKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
}

impl ShapeKind {
    pub fn from_tool(tool: ToolKind) -> Option<Self> {
        match tool {
            ToolKind::Rectangle => Some(ShapeKind::Rectangle),
            ToolKind::Ellipse => Some(ShapeKind::Ellipse),
            _ => None,
        }
    }

    /// Closed outline of the shape fitted to `bounds`
    pub fn outline(self, bounds: Rect) -> Vec<Pos2> {
        match self {
            ShapeKind::Rectangle => rectangle_outline(bounds),
            ShapeKind::Ellipse => ellipse_outline(bounds),
        }
    }
}

/// A shape drag in its previewing state
#[derive(Debug, Clone)]
pub struct ShapeDrag {
    kind: ShapeKind,
    anchor: Pos2,
    last_point: Pos2,
    color: Color,
    width: f32,
    dash: DashPattern,
}

impl ShapeDrag {
    pub fn start(kind: ShapeKind, anchor: Pos2, color: Color, width: f32, dash: DashPattern) -> Self {
        Self {
            kind,
            anchor,
            last_point: anchor,
            color,
            width: width.max(1.0),
            dash,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// The most recent pointer position seen by the drag
    pub fn last_point(&self) -> Pos2 {
        self.last_point
    }

    pub fn bounds(&self, current: Pos2) -> Rect {
        normalized_bounds(self.anchor, current)
    }

    fn mask(&self, current: Pos2, dash: Option<DashPattern>, canvas: (u32, u32)) -> CoverageMask {
        let outline = self.kind.outline(self.bounds(current));
        CoverageMask::polyline(&outline, true, self.width, dash, canvas)
    }

    /// Clears the scratch layer and draws a dashed outline up to `current`
    pub fn update_preview(&mut self, scratch: &mut PixelBuffer, current: Pos2) {
        self.last_point = current;
        scratch.clear();
        let mask = self.mask(current, Some(self.dash), (scratch.width(), scratch.height()));
        scratch.apply_mask(&mask, Paint::Color(self.color.to_rgba()));
    }

    /// Draws the solid outline into `drawing` and clears the preview.
    /// Recording history is up to the caller.
    pub fn commit(self, drawing: &mut PixelBuffer, scratch: &mut PixelBuffer, current: Pos2) -> Rect {
        let mask = self.mask(current, None, (drawing.width(), drawing.height()));
        drawing.apply_mask(&mask, Paint::Color(self.color.to_rgba()));
        scratch.clear();

        let bounds = self.bounds(current);
        log::debug!("Committed {:?} with bounds {:?}", self.kind, bounds);
        bounds
    }

    /// Abandons the drag; only the scratch layer is touched
    pub fn cancel(self, scratch: &mut PixelBuffer) {
        scratch.clear();
    }
}
