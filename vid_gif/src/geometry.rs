//! Aspect-fit arithmetic shared by the filter graph and the size estimator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// width / height; 0 for a degenerate height.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }

    pub fn pixels(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Either side is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

/// Parses `1920x1080` (or `1920×1080`).
impl FromStr for Dimensions {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (w, h) = s
            .split_once(['x', 'X', '×'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| format!("invalid dimension '{}' in '{}'", v, s))
        };
        Ok(Dimensions::new(parse(w)?, parse(h)?))
    }
}

/// Fit `source` inside `bounds`, keeping its aspect ratio and never upscaling.
///
/// The box is first clamped to the source size, then whichever side of the box
/// is relatively too long is shortened. Both sides are at least 1.
pub fn fit_within(source: Dimensions, bounds: Dimensions) -> Dimensions {
    if source.width == 0 || source.height == 0 {
        return Dimensions::new(bounds.width.max(1), bounds.height.max(1));
    }

    let box_w = bounds.width.min(source.width).max(1);
    let box_h = bounds.height.min(source.height).max(1);
    let aspect = source.aspect_ratio();

    let (w, h) = if box_w as f64 / box_h as f64 > aspect {
        ((box_h as f64 * aspect).round() as u32, box_h)
    } else {
        (box_w, (box_w as f64 / aspect).round() as u32)
    };

    Dimensions::new(w.max(1), h.max(1))
}
