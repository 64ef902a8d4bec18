//! Pixel coverage for round-capped strokes and the outlines of the shape tools.

mod coverage;
mod outline;

pub use coverage::{CoverageMask, DashPattern, distance_to_segment};
pub use outline::{ellipse_outline, normalized_bounds, rectangle_outline};
