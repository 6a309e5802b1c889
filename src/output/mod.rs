mod png;

pub use png::PngSink;

use crate::overlay::OverlayFrame;
use anyhow::Result;
use image::RgbaImage;

/// Trait for overlay destinations
pub trait OverlaySink {
    /// Write the overlay, drawn over `background` (native frame) when given
    fn write_overlay(
        &mut self,
        overlay: &OverlayFrame,
        background: Option<&RgbaImage>,
    ) -> Result<()>;
}
