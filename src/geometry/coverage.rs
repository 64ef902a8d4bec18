use egui::Pos2;
use serde::{Deserialize, Serialize};

/// On/off lengths of a dashed line, measured along the path in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashPattern {
    pub on: f32,
    pub off: f32,
}

impl Default for DashPattern {
    fn default() -> Self {
        Self { on: 6.0, off: 4.0 }
    }
}

impl DashPattern {
    pub fn new(on: f32, off: f32) -> Self {
        Self { on, off }
    }

    /// Whether the path is inked at `distance` pixels from its start.
    pub fn is_on(&self, distance: f32) -> bool {
        let period = self.on + self.off;
        if self.off <= 0.0 || period <= 0.0 {
            return true;
        }
        distance.rem_euclid(period) < self.on
    }
}

/// Distance from `point` to the segment `a..b`, together with the projection
/// parameter along the segment (clamped to `0.0..=1.0`).
pub fn distance_to_segment(point: Pos2, a: Pos2, b: Pos2) -> (f32, f32) {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq <= f32::EPSILON {
        return ((point - a).length(), 0.0);
    }

    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    let projection = a + ab * t;
    ((point - projection).length(), t)
}

/// Per-pixel coverage in `0.0..=1.0` over a rectangular window of the canvas.
/// The window never extends past the canvas it was built for.
///
/// Segments are accumulated with `max`, so overlapping segments of one path
/// (joins, closing corners) never cover a pixel twice. Pixel `(x, y)` is
/// sampled at its center `(x + 0.5, y + 0.5)`.
#[derive(Debug, Clone)]
pub struct CoverageMask {
    min_x: i32,
    min_y: i32,
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl CoverageMask {
    /// An empty mask large enough for a path through `points` at the given
    /// width, clipped to a canvas of `canvas` pixels.
    pub fn covering(points: &[Pos2], width: f32, canvas: (u32, u32)) -> Self {
        let empty = Self {
            min_x: 0,
            min_y: 0,
            width: 0,
            height: 0,
            values: Vec::new(),
        };
        let Some(first) = points.first() else {
            return empty;
        };

        let (mut min, mut max) = (*first, *first);
        for point in points {
            min = min.min(*point);
            max = max.max(*point);
        }

        let pad = width * 0.5 + 1.0;
        let min_x = ((min.x - pad).floor() as i32).max(0);
        let min_y = ((min.y - pad).floor() as i32).max(0);
        let max_x = ((max.x + pad).ceil() as i32).min(canvas.0.min(i32::MAX as u32) as i32);
        let max_y = ((max.y + pad).ceil() as i32).min(canvas.1.min(i32::MAX as u32) as i32);
        if max_x <= min_x || max_y <= min_y {
            return empty;
        }
        let width = (max_x - min_x) as usize;
        let height = (max_y - min_y) as usize;

        Self {
            min_x,
            min_y,
            width,
            height,
            values: vec![0.0; width * height],
        }
    }

    /// Coverage of a single round-capped segment.
    pub fn segment(a: Pos2, b: Pos2, width: f32, canvas: (u32, u32)) -> Self {
        let mut mask = Self::covering(&[a, b], width, canvas);
        mask.add_segment(a, b, width, None);
        mask
    }

    /// Coverage of a polyline with round caps and joins.
    ///
    /// With a dash pattern, the dash phase runs continuously across segments.
    pub fn polyline(points: &[Pos2], closed: bool, width: f32, dash: Option<DashPattern>, canvas: (u32, u32)) -> Self {
        let mut mask = Self::covering(points, width, canvas);
        if points.len() == 1 {
            mask.add_segment(points[0], points[0], width, None);
            return mask;
        }

        let closing = if closed && points.len() > 2 {
            Some((points[points.len() - 1], points[0]))
        } else {
            None
        };

        let mut travelled = 0.0;
        let segments = points.windows(2).map(|pair| (pair[0], pair[1])).chain(closing);
        for (a, b) in segments {
            mask.add_segment(a, b, width, dash.map(|pattern| (pattern, travelled)));
            travelled += (b - a).length();
        }
        mask
    }

    /// Rasterizes one segment into the mask. `dash` carries the pattern and the
    /// arc length already travelled when the segment starts.
    pub fn add_segment(&mut self, a: Pos2, b: Pos2, width: f32, dash: Option<(DashPattern, f32)>) {
        if self.values.is_empty() {
            return;
        }

        let half = width * 0.5;
        let reach = half + 1.0;
        let x0 = ((a.x.min(b.x) - reach).floor() as i32).max(self.min_x);
        let y0 = ((a.y.min(b.y) - reach).floor() as i32).max(self.min_y);
        let x1 = ((a.x.max(b.x) + reach).ceil() as i32).min(self.min_x + self.width as i32);
        let y1 = ((a.y.max(b.y) + reach).ceil() as i32).min(self.min_y + self.height as i32);
        let length = (b - a).length();

        for y in y0..y1 {
            for x in x0..x1 {
                let center = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
                let (distance, t) = distance_to_segment(center, a, b);
                let coverage = (half + 0.5 - distance).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                if let Some((pattern, offset)) = dash {
                    if !pattern.is_on(offset + t * length) {
                        continue;
                    }
                }

                let index = (y - self.min_y) as usize * self.width + (x - self.min_x) as usize;
                if coverage > self.values[index] {
                    self.values[index] = coverage;
                }
            }
        }
    }

    /// Covered pixels as `(x, y, coverage)`, skipping zero coverage.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, f32)> + '_ {
        self.values.iter().enumerate().filter(|(_, c)| **c > 0.0).map(|(index, coverage)| {
            let x = self.min_x + (index % self.width) as i32;
            let y = self.min_y + (index / self.width) as i32;
            (x, y, *coverage)
        })
    }

    /// Coverage at canvas pixel `(x, y)`; zero outside the mask.
    pub fn at(&self, x: i32, y: i32) -> f32 {
        let (dx, dy) = (x - self.min_x, y - self.min_y);
        if dx < 0 || dy < 0 || dx as usize >= self.width || dy as usize >= self.height {
            return 0.0;
        }
        self.values[dy as usize * self.width + dx as usize]
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|c| *c <= 0.0)
    }
}
