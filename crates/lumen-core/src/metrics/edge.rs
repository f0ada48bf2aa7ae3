//! Border-strip brightness.
//!
//! Strip thickness is 10% of the working width or height, at least one pixel.
//! Membership is a union predicate, so overlapping strips never count a pixel
//! twice.

use crate::pipeline::LuminanceArray;
use crate::types::EdgeMode;

/// Strip thickness as a divisor of the side length.
const STRIP_DIVISOR: u32 = 10;

/// The set of border pixels selected by an [`EdgeMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRegion {
    mode: EdgeMode,
    width: u32,
    height: u32,
    strip_width: u32,
    strip_height: u32,
}

impl EdgeRegion {
    /// Region for an image of the given working dimensions.
    pub fn of(mode: EdgeMode, width: u32, height: u32) -> Self {
        Self {
            mode,
            width,
            height,
            strip_width: (width / STRIP_DIVISOR).max(1),
            strip_height: (height / STRIP_DIVISOR).max(1),
        }
    }

    /// Columns in each of the left and right strips.
    pub fn strip_width(&self) -> u32 {
        self.strip_width
    }

    /// Rows in each of the top and bottom strips.
    pub fn strip_height(&self) -> u32 {
        self.strip_height
    }

    fn in_side_strips(&self, x: u32) -> bool {
        x < self.strip_width || x >= self.width.saturating_sub(self.strip_width)
    }

    fn in_end_strips(&self, y: u32) -> bool {
        y < self.strip_height || y >= self.height.saturating_sub(self.strip_height)
    }

    /// Whether pixel `(x, y)` belongs to the region.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        match self.mode {
            EdgeMode::LeftRight => self.in_side_strips(x),
            EdgeMode::TopBottom => self.in_end_strips(y),
            EdgeMode::All => self.in_side_strips(x) || self.in_end_strips(y),
        }
    }
}

/// Mean luminance over the edge region selected by `mode`.
pub fn edge_average(luminance: &LuminanceArray, mode: EdgeMode) -> f64 {
    let region = EdgeRegion::of(mode, luminance.width(), luminance.height());
    let (sum, count) = luminance
        .enumerate()
        .filter(|&(x, y, _)| region.contains(x, y))
        .fold((0.0f64, 0usize), |(sum, count), (_, _, v)| (sum + v, count + 1));

    if count == 0 {
        return 0.0;
    }
    sum / count as f64
}
