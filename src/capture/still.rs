use super::FrameSource;
use crate::geometry::NativeSize;
use crate::playback::FrameIndex;
use anyhow::{Context, Result};
use image::RgbaImage;
use std::path::Path;

/// A single exported still of the paused frame
///
/// Every frame index yields the same picture.
pub struct StillFrame {
    image: RgbaImage,
}

impl StillFrame {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!("Loading still frame from {}", path.display());

        let image = image::open(path)
            .with_context(|| format!("Failed to load still frame from {}", path.display()))?
            .to_rgba8();

        tracing::info!("Still frame is {}x{}", image.width(), image.height());
        Ok(Self { image })
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }
}

impl FrameSource for StillFrame {
    fn frame(&mut self, frame: FrameIndex) -> Result<RgbaImage> {
        tracing::debug!("Using still for frame {}", frame);
        Ok(self.image.clone())
    }

    fn resolution(&self) -> NativeSize {
        NativeSize::new(self.image.width(), self.image.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn resolution_matches_image() {
        let still = StillFrame::from_image(RgbaImage::from_pixel(6, 4, Rgba([1, 2, 3, 255])));
        assert_eq!(still.resolution(), NativeSize::new(6, 4));
    }

    #[test]
    fn any_frame_is_the_still() {
        let image = RgbaImage::from_pixel(2, 2, Rgba([9, 9, 9, 255]));
        let mut still = StillFrame::from_image(image.clone());
        assert_eq!(still.frame(0).unwrap(), image);
        assert_eq!(still.frame(120).unwrap(), image);
    }

    #[test]
    fn missing_file_has_context() {
        let err = StillFrame::open("/nonexistent/still.png").err().unwrap();
        assert!(err.to_string().contains("Failed to load still frame"));
    }
}
