mod mapper;

pub use mapper::map_click;

use serde::{Deserialize, Serialize};

/// Pointer position in viewport coordinates (CSS-style pixels, may be fractional)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportPoint {
    pub x: f64,
    pub y: f64,
}

impl ViewportPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Rectangle the video element currently occupies, in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl DisplayBox {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn contains(&self, point: ViewportPoint) -> bool {
        point.x >= self.left
            && point.y >= self.top
            && point.x <= self.left + self.width
            && point.y <= self.top + self.height
    }
}

/// Decoded pixel dimensions of the source video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeSize {
    pub width: u32,
    pub height: u32,
}

impl NativeSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Coordinates in the source video's native pixel space, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: u32,
    pub y: u32,
}

impl PixelPoint {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Clamp into `[0, width-1] x [0, height-1]`.
    ///
    /// Rounding at the right/bottom edge of the display box lands one pixel
    /// outside the native grid; callers clamp before using the point.
    pub fn clamp_to(self, native: NativeSize) -> Self {
        Self {
            x: self.x.min(native.width.saturating_sub(1)),
            y: self.y.min(native.height.saturating_sub(1)),
        }
    }
}
