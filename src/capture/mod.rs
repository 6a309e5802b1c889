mod still;

pub use still::StillFrame;

use crate::geometry::NativeSize;
use crate::playback::FrameIndex;
use anyhow::Result;
use image::RgbaImage;

/// Trait for sources of decoded frames to draw the overlay over
pub trait FrameSource {
    /// Decoded pixels of `frame`
    fn frame(&mut self, frame: FrameIndex) -> Result<RgbaImage>;

    /// Native resolution of the frames
    fn resolution(&self) -> NativeSize;
}
