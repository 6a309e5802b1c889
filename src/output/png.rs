use super::OverlaySink;
use crate::overlay::OverlayFrame;
use anyhow::{Context, Result};
use image::{imageops, RgbaImage};
use std::path::{Path, PathBuf};

/// Writes the overlay surface to an image file (format from the extension)
pub struct PngSink {
    path: PathBuf,
}

impl PngSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Scale the frame to the overlay's displayed size and draw the overlay on top
    pub fn composite(overlay: &OverlayFrame, background: &RgbaImage) -> RgbaImage {
        let (width, height) = (overlay.width(), overlay.height());
        let mut canvas = if background.dimensions() != (width, height) {
            imageops::resize(background, width, height, imageops::FilterType::Lanczos3)
        } else {
            background.clone()
        };
        imageops::overlay(&mut canvas, &overlay.image, 0, 0);
        canvas
    }
}

impl OverlaySink for PngSink {
    fn write_overlay(
        &mut self,
        overlay: &OverlayFrame,
        background: Option<&RgbaImage>,
    ) -> Result<()> {
        let _span = tracing::debug_span!("write_overlay").entered();

        let image = match background {
            Some(background) => Self::composite(overlay, background),
            None => overlay.image.clone(),
        };

        image
            .save(&self.path)
            .with_context(|| format!("Failed to write overlay to {}", self.path.display()))?;

        tracing::info!(
            "Wrote {}x{} overlay to {}",
            image.width(),
            image.height(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn overlay(width: u32, height: u32) -> OverlayFrame {
        let mut image = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
        image.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        OverlayFrame {
            left: 0.0,
            top: 0.0,
            image,
        }
    }

    #[test]
    fn composite_scales_background_to_overlay() {
        let background = RgbaImage::from_pixel(8, 4, Rgba([10, 20, 30, 255]));
        let out = PngSink::composite(&overlay(4, 2), &background);
        assert_eq!(out.dimensions(), (4, 2));
        assert_eq!(*out.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        let bg = out.get_pixel(3, 1);
        assert!(bg[0].abs_diff(10) <= 1 && bg[2].abs_diff(30) <= 1);
        assert_eq!(bg[3], 255);
    }

    #[test]
    fn writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlay.png");
        let mut sink = PngSink::new(&path);
        sink.write_overlay(&overlay(3, 3), None).unwrap();

        let written = image::open(&path).unwrap().to_rgba8();
        assert_eq!(written.dimensions(), (3, 3));
        assert_eq!(*written.get_pixel(0, 0), Rgba([255, 0, 0, 255]));
    }
}
